//! Quota bucket keys.

use std::fmt;

/// Identity used when the request reached rate limiting unauthenticated.
pub const ANONYMOUS: &str = "anonymous";

/// A key that uniquely identifies one quota counter.
///
/// Each (identity, route class) pair gets its own counter and window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuotaKey {
    pub identity: String,
    pub route_class: String,
}

impl QuotaKey {
    pub fn new(identity: impl Into<String>, route_class: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            route_class: route_class.into(),
        }
    }

    /// Key under which the counter lives in the shared store.
    pub fn storage_key(&self, prefix: &str) -> String {
        format!(
            "{}:customer:{}:route:{}",
            prefix, self.identity, self.route_class
        )
    }
}

impl fmt::Display for QuotaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.identity, self.route_class)
    }
}
