//! Path prefix matching.
//!
//! # Responsibilities
//! - Match request paths against a single prefix
//! - Match request paths against a set of prefixes (excluded-path lists)
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Plain `starts_with`, so "/eureka" also covers "/eureka/apps"
//! - No regex to guarantee O(n) matching

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// A statically configured list of path prefixes.
#[derive(Debug, Clone, Default)]
pub struct PrefixSet {
    matchers: Vec<PathPrefixMatcher>,
}

impl PrefixSet {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            matchers: prefixes.into_iter().map(PathPrefixMatcher::new).collect(),
        }
    }

    /// True if any prefix matches.
    pub fn contains(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }

    pub fn prefixes(&self) -> Vec<String> {
        self.matchers.iter().map(|m| m.prefix().to_string()).collect()
    }
}
