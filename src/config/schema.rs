//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the redirect
//! service. All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::redirects::entries::RawEntries;

/// Root configuration for the redirect service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Origin serving the site itself. Unmatched requests go here.
    pub upstream: Option<UpstreamConfig>,

    /// Landing page that receives rewritten requests.
    pub landing: LandingConfig,

    /// Request-time prefix rewrites, evaluated in order.
    pub rewrites: Vec<RewriteConfig>,

    /// Static redirect sources, merged in order (later wins).
    pub redirects: Vec<RedirectSourceConfig>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            upstream: None,
            landing: LandingConfig::default(),
            rewrites: vec![RewriteConfig::default()],
            redirects: Vec::new(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Origin address (e.g., "127.0.0.1:4321").
    pub address: String,
}

/// Landing page configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LandingConfig {
    /// Path the landing page is served on.
    pub path: String,

    /// When set, the service answers the landing path itself and forwards
    /// the decoded `r` parameter to this origin.
    pub forward_origin: Option<String>,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            path: "/hardhat2/redirect".to_string(),
            forward_origin: None,
        }
    }
}

/// A request-time prefix rewrite.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RewriteConfig {
    /// Rule identifier for logging/metrics.
    pub name: String,

    /// Path prefix to match (case-sensitive).
    pub path_prefix: String,

    /// Fixed path the request is redirected to.
    pub target_path: String,

    /// Redirect status (307 or 308).
    #[serde(default = "default_rewrite_status")]
    pub status: u16,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            name: "hardhat-runner".to_string(),
            path_prefix: "/hardhat-runner".to_string(),
            target_path: "/hardhat2/redirect".to_string(),
            status: default_rewrite_status(),
        }
    }
}

fn default_rewrite_status() -> u16 {
    308
}

/// A named static redirect source.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedirectSourceConfig {
    /// Source identifier, reported in errors and metrics.
    pub name: String,

    #[serde(flatten)]
    pub kind: RedirectSourceKind,
}

/// Where a redirect source gets its rules from.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RedirectSourceKind {
    /// Rules written directly in the config file.
    Inline {
        #[serde(default)]
        rules: RawEntries,
    },

    /// `[path, destination]` shortlink pairs sharing one status.
    Pairs {
        #[serde(default)]
        pairs: Vec<(String, String)>,
        #[serde(default = "default_pair_status")]
        status: u16,
    },

    /// A JSON object `path -> {status, destination}` on disk.
    Json { file: PathBuf },

    /// An error catalog; one redirect per error code.
    ErrorCodes {
        file: PathBuf,
        #[serde(default = "default_error_prefix")]
        prefix: String,
        #[serde(default = "default_error_docs_path")]
        docs_path: String,
    },
}

fn default_pair_status() -> u16 {
    302
}

fn default_error_prefix() -> String {
    "hhe".to_string()
}

fn default_error_docs_path() -> String {
    "/docs/reference/errors".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: SiteConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.rewrites.len(), 1);
        assert_eq!(config.rewrites[0].path_prefix, "/hardhat-runner");
        assert_eq!(config.rewrites[0].status, 308);
        assert!(config.redirects.is_empty());
        assert!(config.upstream.is_none());
    }

    #[test]
    fn test_source_kinds() {
        let config: SiteConfig = toml::from_str(
            r#"
            rewrites = []

            [[redirects]]
            name = "shortlinks"
            kind = "inline"
            rules = { "/docs" = { status = 302, destination = "/docs/getting-started" } }

            [[redirects]]
            name = "in-app"
            kind = "pairs"
            pairs = [["/ignition-errors", "/ignition/docs/explanations/error-handling"]]

            [[redirects]]
            name = "errors"
            kind = "error-codes"
            file = "data/errors.json"
            "#,
        )
        .unwrap();

        assert!(config.rewrites.is_empty());
        assert_eq!(config.redirects.len(), 3);

        match &config.redirects[0].kind {
            RedirectSourceKind::Inline { rules } => {
                assert_eq!(rules.len(), 1);
                assert_eq!(rules.iter().next().unwrap().0, "/docs");
            }
            other => panic!("unexpected kind {:?}", other),
        }
        match &config.redirects[1].kind {
            RedirectSourceKind::Pairs { pairs, status } => {
                assert_eq!(pairs.len(), 1);
                assert_eq!(*status, 302);
            }
            other => panic!("unexpected kind {:?}", other),
        }
        match &config.redirects[2].kind {
            RedirectSourceKind::ErrorCodes { prefix, docs_path, .. } => {
                assert_eq!(prefix, "hhe");
                assert_eq!(docs_path, "/docs/reference/errors");
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }
}
