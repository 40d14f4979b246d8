//! Path matching logic.
//!
//! # Responsibilities
//! - Match raw path prefixes (rewrite rules)
//! - Match whole-segment prefixes (trailing `/*` redirect rules)
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching
//! - Matchers see only the path; query strings never take part in matching

/// Trait for matching request paths against a condition.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches when the path starts with the prefix, character for character.
///
/// `/hardhat-runner` matches `/hardhat-runner`, `/hardhat-runner/docs` and
/// also `/hardhat-runnerX`.
#[derive(Debug, Clone, PartialEq, Eq)]
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

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Matches the prefix itself or anything below it on a segment boundary.
///
/// `/old` matches `/old` and `/old/page`, but not `/older`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPrefixMatcher {
    prefix: String,
}

impl SegmentPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The part of `path` below the prefix, including its leading `/`.
    pub fn remainder<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}

impl Matcher for SegmentPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        self.remainder(path).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_prefix_matcher() {
        let matcher = PathPrefixMatcher::new("/hardhat-runner");

        assert!(matcher.matches("/hardhat-runner"));
        assert!(matcher.matches("/hardhat-runner/docs/config"));
        assert!(!matcher.matches("/Hardhat-Runner/docs")); // Case sensitive
        assert!(!matcher.matches("/docs/hardhat-runner"));
    }

    #[test]
    fn test_segment_prefix_matcher() {
        let matcher = SegmentPrefixMatcher::new("/old");

        assert_eq!(matcher.remainder("/old"), Some(""));
        assert_eq!(matcher.remainder("/old/a/b"), Some("/a/b"));
        assert_eq!(matcher.remainder("/older"), None);
        assert!(!matcher.matches("/new/old"));

        let root = SegmentPrefixMatcher::new("");
        assert!(root.matches("/anything"));
    }
}
