//! Bearer credential verification.

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::auth::claims::{Claims, RawClaims};
use crate::auth::error::AuthError;
use crate::clock::{Clock, SystemClock};
use crate::config::AuthConfig;

/// Verifies HMAC-signed JWTs and extracts the caller identity.
///
/// Holds no mutable state; share it behind an `Arc` across request tasks.
pub struct CredentialValidator {
    key: DecodingKey,
    validation: Validation,
    identity_claim: String,
    leeway_secs: u64,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for CredentialValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialValidator")
            .field("identity_claim", &self.identity_claim)
            .field("leeway_secs", &self.leeway_secs)
            .finish_non_exhaustive()
    }
}

impl CredentialValidator {
    pub fn new(config: &AuthConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // Expiry is compared against our own clock below.
        validation.validate_exp = false;
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(config.signing_key.as_bytes()),
            validation,
            identity_claim: config.identity_claim.clone(),
            leeway_secs: config.leeway_secs,
            clock,
        }
    }

    /// Verify `credential` and return its claims.
    ///
    /// Every structural or cryptographic failure collapses to
    /// [`AuthError::BadSignature`].
    pub fn validate(&self, credential: &str) -> Result<Claims, AuthError> {
        if credential.is_empty() {
            return Err(AuthError::BadSignature);
        }

        let raw = decode::<RawClaims>(credential, &self.key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Credential failed verification");
                AuthError::BadSignature
            })?
            .claims;

        if self.clock.unix_secs() >= raw.exp.saturating_add(self.leeway_secs) {
            return Err(AuthError::Expired);
        }

        Claims::resolve(raw, &self.identity_claim).ok_or(AuthError::MissingIdentity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::{json, Value};

    const SECRET: &str = "unit-test-secret-that-is-long-enough";
    const NOW: u64 = 1_700_000_000;

    fn validator() -> CredentialValidator {
        let config = AuthConfig {
            signing_key: SECRET.to_string(),
            ..AuthConfig::default()
        };
        CredentialValidator::with_clock(&config, Arc::new(ManualClock::at_unix(NOW)))
    }

    fn sign(payload: Value, secret: &str) -> String {
        encode(&Header::default(), &payload, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_valid_token() {
        let token = sign(json!({"sub": "alice", "customerId": "c-1", "exp": NOW + 60}), SECRET);
        let claims = validator().validate(&token).unwrap();

        assert_eq!(claims.identity(), "c-1");
        assert_eq!(claims.display_name(), "alice");
        assert_eq!(claims.expires_at(), NOW + 60);
    }

    #[test]
    fn test_subject_fallback() {
        let token = sign(json!({"sub": "u1", "exp": NOW + 60}), SECRET);
        assert_eq!(validator().validate(&token).unwrap().identity(), "u1");
    }

    #[test]
    fn test_other_hmac_algorithms_accepted() {
        let payload = json!({"sub": "u1", "exp": NOW + 60});
        for alg in [Algorithm::HS384, Algorithm::HS512] {
            let token =
                encode(&Header::new(alg), &payload, &EncodingKey::from_secret(SECRET.as_bytes()))
                    .unwrap();
            assert!(validator().validate(&token).is_ok(), "{:?} rejected", alg);
        }
    }

    #[test]
    fn test_wrong_key() {
        let token = sign(json!({"sub": "u1", "exp": NOW + 60}), "some-other-secret-entirely");
        assert_eq!(validator().validate(&token), Err(AuthError::BadSignature));
    }

    #[test]
    fn test_garbage_and_empty() {
        let v = validator();
        assert_eq!(v.validate(""), Err(AuthError::BadSignature));
        assert_eq!(v.validate("not-a-jwt"), Err(AuthError::BadSignature));
        assert_eq!(v.validate("a.b.c"), Err(AuthError::BadSignature));
    }

    #[test]
    fn test_tampered_payload() {
        let token = sign(json!({"sub": "u1", "exp": NOW + 60}), SECRET);
        let forged = sign(json!({"sub": "admin", "exp": NOW + 60}), SECRET);

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        parts[1] = forged_parts[1];

        assert_eq!(validator().validate(&parts.join(".")), Err(AuthError::BadSignature));
    }

    #[test]
    fn test_missing_exp_is_malformed() {
        let token = sign(json!({"sub": "u1"}), SECRET);
        assert_eq!(validator().validate(&token), Err(AuthError::BadSignature));
    }

    #[test]
    fn test_expired_even_with_valid_signature() {
        let v = validator();

        let past = sign(json!({"sub": "u1", "exp": NOW - 1}), SECRET);
        assert_eq!(v.validate(&past), Err(AuthError::Expired));

        // Expiry is exclusive: a token is dead at its exp second.
        let boundary = sign(json!({"sub": "u1", "exp": NOW}), SECRET);
        assert_eq!(v.validate(&boundary), Err(AuthError::Expired));
    }

    #[test]
    fn test_leeway() {
        let config = AuthConfig {
            signing_key: SECRET.to_string(),
            leeway_secs: 30,
            ..AuthConfig::default()
        };
        let v = CredentialValidator::with_clock(&config, Arc::new(ManualClock::at_unix(NOW)));

        let token = sign(json!({"sub": "u1", "exp": NOW - 10}), SECRET);
        assert!(v.validate(&token).is_ok());
    }

    #[test]
    fn test_expiry_follows_clock() {
        let clock = ManualClock::at_unix(NOW);
        let config = AuthConfig {
            signing_key: SECRET.to_string(),
            ..AuthConfig::default()
        };
        let v = CredentialValidator::with_clock(&config, Arc::new(clock.clone()));
        let token = sign(json!({"sub": "u1", "exp": NOW + 5}), SECRET);

        assert!(v.validate(&token).is_ok());
        clock.advance(std::time::Duration::from_secs(5));
        assert_eq!(v.validate(&token), Err(AuthError::Expired));
    }

    #[test]
    fn test_missing_identity() {
        let token = sign(json!({"role": "admin", "exp": NOW + 60}), SECRET);
        assert_eq!(validator().validate(&token), Err(AuthError::MissingIdentity));
    }
}
