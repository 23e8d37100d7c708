//! Verified token claims.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims exactly as they appear in a verified token payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub(crate) struct RawClaims {
    pub exp: u64,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Claims extracted from a credential whose signature has been verified.
///
/// Only [`CredentialValidator`](super::CredentialValidator) constructs these.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Claims {
    identity: String,
    subject: Option<String>,
    expires_at: u64,
    extra: Map<String, Value>,
}

impl Claims {
    /// Resolve the identity from `identity_claim`, falling back to `sub`.
    ///
    /// Returns `None` when neither yields a non-empty value.
    pub(crate) fn resolve(raw: RawClaims, identity_claim: &str) -> Option<Self> {
        let subject = raw.sub.filter(|s| !s.is_empty());
        let identity = raw
            .extra
            .get(identity_claim)
            .and_then(claim_as_string)
            .or_else(|| subject.clone())?;

        Some(Self {
            identity,
            subject,
            expires_at: raw.exp,
            extra: raw.extra,
        })
    }

    /// Stable caller id used for quota buckets and downstream propagation.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The `sub` claim, if the token carried one.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Human-facing name: the subject when present, otherwise the identity.
    pub fn display_name(&self) -> &str {
        self.subject.as_deref().unwrap_or(&self.identity)
    }

    /// Expiry as seconds since the Unix epoch.
    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    /// Any claim other than `exp` and `sub`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

fn claim_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
