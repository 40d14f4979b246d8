//! Request-time prefix rewrites.
//!
//! # Responsibilities
//! - Decide, from path and query alone, whether a request is rewritten
//! - Build the landing URL carrying the original path and query in `r`
//!
//! # Design Decisions
//! - First matching rule wins; prefixes are expected to be disjoint
//! - `r` uses component encoding, so decoding it gives back the exact
//!   original `path?query`
//! - Stateless: the same input always produces the same action

use std::borrow::Cow;
use std::str::Utf8Error;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::schema::RewriteConfig;
use crate::redirects::rule::{InvalidStatus, RedirectStatus};
use crate::routing::matcher::{Matcher, PathPrefixMatcher};

/// Query parameter that carries the original location.
pub const REDIRECT_PARAM: &str = "r";

/// Everything but `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a value for use as a query component.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Reverse of [`encode_component`].
pub fn decode_component(value: &str) -> Result<Cow<'_, str>, Utf8Error> {
    percent_decode_str(value).decode_utf8()
}

/// A compiled rewrite rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    pub name: String,
    matcher: PathPrefixMatcher,
    pub target_path: String,
    pub status: RedirectStatus,
}

impl RewriteRule {
    pub fn new(
        name: impl Into<String>,
        path_prefix: impl Into<String>,
        target_path: impl Into<String>,
        status: RedirectStatus,
    ) -> Self {
        Self {
            name: name.into(),
            matcher: PathPrefixMatcher::new(path_prefix),
            target_path: target_path.into(),
            status,
        }
    }

    pub fn path_prefix(&self) -> &str {
        self.matcher.prefix()
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }

    /// `{target_path}?r={encode(path + search)}`.
    pub fn location(&self, path: &str, query: Option<&str>) -> String {
        let original = match query {
            Some(q) if !q.is_empty() => format!("{}?{}", path, q),
            _ => path.to_string(),
        };
        format!(
            "{}?{}={}",
            self.target_path,
            REDIRECT_PARAM,
            encode_component(&original)
        )
    }
}

/// What the middleware should do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteAction<'a> {
    PassThrough,
    Redirect {
        rule: &'a str,
        location: String,
        status: RedirectStatus,
    },
}

/// Ordered, immutable set of rewrite rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteSet {
    rules: Vec<RewriteRule>,
}

impl RewriteSet {
    pub fn new(rules: Vec<RewriteRule>) -> Self {
        Self { rules }
    }

    /// Compile rules from (already validated) configuration.
    pub fn from_config(configs: &[RewriteConfig]) -> Result<Self, InvalidStatus> {
        let rules = configs
            .iter()
            .map(|c| -> Result<RewriteRule, InvalidStatus> {
                let status = RedirectStatus::try_from(c.status)?;
                Ok(RewriteRule::new(&c.name, &c.path_prefix, &c.target_path, status))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate a request's path and query against the rules.
    pub fn evaluate(&self, path: &str, query: Option<&str>) -> RewriteAction<'_> {
        match self.rules.iter().find(|rule| rule.matches(path)) {
            Some(rule) => RewriteAction::Redirect {
                rule: &rule.name,
                location: rule.location(path, query),
                status: rule.status,
            },
            None => RewriteAction::PassThrough,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner_rules() -> RewriteSet {
        RewriteSet::new(vec![RewriteRule::new(
            "hardhat-runner",
            "/hardhat-runner",
            "/hardhat2/redirect",
            RedirectStatus::PermanentRedirect,
        )])
    }

    #[test]
    fn test_rewrite_location() {
        let rules = runner_rules();
        let action = rules.evaluate("/hardhat-runner/docs/config", Some("x=1"));
        assert_eq!(
            action,
            RewriteAction::Redirect {
                rule: "hardhat-runner",
                location: "/hardhat2/redirect?r=%2Fhardhat-runner%2Fdocs%2Fconfig%3Fx%3D1".into(),
                status: RedirectStatus::PermanentRedirect,
            }
        );
    }

    #[test]
    fn test_empty_query_is_dropped() {
        let rules = runner_rules();
        let with_empty = rules.evaluate("/hardhat-runner", Some(""));
        let without = rules.evaluate("/hardhat-runner", None);
        assert_eq!(with_empty, without);
        match without {
            RewriteAction::Redirect { location, .. } => {
                assert_eq!(location, "/hardhat2/redirect?r=%2Fhardhat-runner")
            }
            RewriteAction::PassThrough => panic!("expected redirect"),
        }
    }

    #[test]
    fn test_non_matching_paths_pass_through() {
        let rules = runner_rules();
        for path in ["/", "/docs", "/hardhat2/redirect", "/HARDHAT-RUNNER/docs", "/x/hardhat-runner"] {
            assert_eq!(rules.evaluate(path, Some("a=b")), RewriteAction::PassThrough);
        }
        assert_eq!(
            RewriteSet::default().evaluate("/hardhat-runner", None),
            RewriteAction::PassThrough
        );
    }

    #[test]
    fn test_round_trip() {
        let rules = runner_rules();
        let cases = [
            ("/hardhat-runner/docs/config", Some("x=1&y=a%20b")),
            ("/hardhat-runner/plugins/nomicfoundation-hardhat-ethers", None),
            ("/hardhat-runner/docs/guides/deploying", Some("q=hello+world&lang=español")),
            ("/hardhat-runner/docs/%E2%9C%93", Some("k=(v)*~'!")),
        ];

        for (path, query) in cases {
            let RewriteAction::Redirect { location, .. } = rules.evaluate(path, query) else {
                panic!("expected redirect for {}", path);
            };
            let encoded = location
                .strip_prefix("/hardhat2/redirect?r=")
                .expect("landing prefix");
            assert!(!encoded.contains(['/', '?', '&', '=', '+', ' ']));

            let expected = match query {
                Some(q) => format!("{}?{}", path, q),
                None => path.to_string(),
            };
            assert_eq!(decode_component(encoded).unwrap(), expected);
        }
    }

    #[test]
    fn test_from_config_rejects_bad_status() {
        let mut config = RewriteConfig::default();
        assert_eq!(RewriteSet::from_config(&[config.clone()]).unwrap().rules().len(), 1);

        config.status = 200;
        assert_eq!(RewriteSet::from_config(&[config]), Err(InvalidStatus(200)));
    }
}
