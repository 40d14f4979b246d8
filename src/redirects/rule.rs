//! Redirect rule model.
//!
//! # Responsibilities
//! - Represent a single validated redirect (source path, destination, status)
//! - Restrict status codes to the redirect family the hosting platform accepts
//! - Classify source paths as exact or trailing-wildcard patterns

use std::fmt;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Wildcard segment allowed at the end of a source path.
pub const WILDCARD_SUFFIX: &str = "/*";

/// HTTP status codes a redirect rule may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum RedirectStatus {
    /// 301, permanent.
    MovedPermanently,
    /// 302, temporary.
    Found,
    /// 307, temporary, method preserved.
    TemporaryRedirect,
    /// 308, permanent, method preserved.
    PermanentRedirect,
}

impl RedirectStatus {
    pub fn as_u16(self) -> u16 {
        match self {
            RedirectStatus::MovedPermanently => 301,
            RedirectStatus::Found => 302,
            RedirectStatus::TemporaryRedirect => 307,
            RedirectStatus::PermanentRedirect => 308,
        }
    }

    pub fn status_code(self) -> StatusCode {
        match self {
            RedirectStatus::MovedPermanently => StatusCode::MOVED_PERMANENTLY,
            RedirectStatus::Found => StatusCode::FOUND,
            RedirectStatus::TemporaryRedirect => StatusCode::TEMPORARY_REDIRECT,
            RedirectStatus::PermanentRedirect => StatusCode::PERMANENT_REDIRECT,
        }
    }

    /// True for the two codes that forbid user agents from changing the method.
    pub fn preserves_method(self) -> bool {
        matches!(
            self,
            RedirectStatus::TemporaryRedirect | RedirectStatus::PermanentRedirect
        )
    }
}

impl TryFrom<u16> for RedirectStatus {
    type Error = InvalidStatus;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            301 => Ok(RedirectStatus::MovedPermanently),
            302 => Ok(RedirectStatus::Found),
            307 => Ok(RedirectStatus::TemporaryRedirect),
            308 => Ok(RedirectStatus::PermanentRedirect),
            other => Err(InvalidStatus(other)),
        }
    }
}

impl From<RedirectStatus> for u16 {
    fn from(status: RedirectStatus) -> Self {
        status.as_u16()
    }
}

impl fmt::Display for RedirectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// A status code outside the redirect family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("status {0} is not one of 301, 302, 307, 308")]
pub struct InvalidStatus(pub u16);

/// A validated redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRule {
    pub source_path: String,
    pub destination: String,
    pub status: RedirectStatus,
}

impl RedirectRule {
    pub fn new(
        source_path: impl Into<String>,
        destination: impl Into<String>,
        status: RedirectStatus,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            destination: destination.into(),
            status,
        }
    }

    /// Prefix covered by a trailing `/*`, or `None` for exact rules.
    pub fn wildcard_prefix(&self) -> Option<&str> {
        self.source_path.strip_suffix(WILDCARD_SUFFIX)
    }
}
