//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, timeouts and URLs
//! - Check rewrite rules (prefixes, status, loops)
//! - Check redirect source declarations (names, kinds)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SiteConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Individual redirect rules are validated when their source is loaded

use std::collections::HashSet;
use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::uri::Authority;
use thiserror::Error;

use crate::config::schema::{RedirectSourceKind, SiteConfig};
use crate::redirects::rule::RedirectStatus;

/// A semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("{field}: '{value}' must start with '/'")]
    NotAPath { field: String, value: String },

    #[error("{field}: invalid http(s) origin '{value}'")]
    InvalidOrigin { field: &'static str, value: String },

    #[error("rewrite '{name}': status {status} must be 307 or 308")]
    RewriteStatus { name: String, status: u16 },

    #[error("rewrite '{name}': target '{target}' is rewritten again by '{by}'")]
    RewriteLoop {
        name: String,
        target: String,
        by: String,
    },

    #[error("landing.path: '{path}' is rewritten by '{by}'")]
    LandingRewritten { path: String, by: String },

    #[error("redirect source '{name}': status {status} is not one of 301, 302, 307, 308")]
    SourceStatus { name: String, status: u16 },

    #[error("{kind} name must not be empty")]
    EmptyName { kind: &'static str },

    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },
}

/// Validate the whole configuration, collecting every problem.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "timeouts.connect_secs",
        });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "timeouts.request_secs",
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if let Some(upstream) = &config.upstream {
        if Authority::from_str(&upstream.address).is_err() || !upstream.address.contains(':') {
            errors.push(ValidationError::InvalidAddress {
                field: "upstream.address",
                value: upstream.address.clone(),
            });
        }
    }

    check_path(&mut errors, "landing.path".to_string(), &config.landing.path);
    if let Some(origin) = &config.landing.forward_origin {
        if !is_http_origin(origin) {
            errors.push(ValidationError::InvalidOrigin {
                field: "landing.forward_origin",
                value: origin.clone(),
            });
        }
    }

    validate_rewrites(config, &mut errors);
    validate_sources(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_rewrites(config: &SiteConfig, errors: &mut Vec<ValidationError>) {
    let mut names = HashSet::new();

    for rewrite in &config.rewrites {
        check_name(errors, "rewrite", &rewrite.name, &mut names);
        check_path(
            errors,
            format!("rewrites.{}.path_prefix", rewrite.name),
            &rewrite.path_prefix,
        );
        check_path(
            errors,
            format!("rewrites.{}.target_path", rewrite.name),
            &rewrite.target_path,
        );

        if !matches!(
            RedirectStatus::try_from(rewrite.status),
            Ok(status) if status.preserves_method()
        ) {
            errors.push(ValidationError::RewriteStatus {
                name: rewrite.name.clone(),
                status: rewrite.status,
            });
        }

        // Every rewrite runs before routing, so a target under any prefix
        // bounces between rules forever.
        if let Some(by) = rewritten_by(config, &rewrite.target_path) {
            errors.push(ValidationError::RewriteLoop {
                name: rewrite.name.clone(),
                target: rewrite.target_path.clone(),
                by: by.to_string(),
            });
        }
    }

    if config.landing.forward_origin.is_some() {
        if let Some(by) = rewritten_by(config, &config.landing.path) {
            errors.push(ValidationError::LandingRewritten {
                path: config.landing.path.clone(),
                by: by.to_string(),
            });
        }
    }
}

/// Name of the first rewrite whose prefix captures `path`.
fn rewritten_by<'a>(config: &'a SiteConfig, path: &str) -> Option<&'a str> {
    config
        .rewrites
        .iter()
        .find(|rewrite| !rewrite.path_prefix.is_empty() && path.starts_with(&rewrite.path_prefix))
        .map(|rewrite| rewrite.name.as_str())
}

fn validate_sources(config: &SiteConfig, errors: &mut Vec<ValidationError>) {
    let mut names = HashSet::new();

    for source in &config.redirects {
        check_name(errors, "redirect source", &source.name, &mut names);

        match &source.kind {
            RedirectSourceKind::Pairs { status, .. } => {
                if RedirectStatus::try_from(*status).is_err() {
                    errors.push(ValidationError::SourceStatus {
                        name: source.name.clone(),
                        status: *status,
                    });
                }
            }
            RedirectSourceKind::ErrorCodes { docs_path, .. } => {
                check_path(
                    errors,
                    format!("redirects.{}.docs_path", source.name),
                    docs_path,
                );
            }
            RedirectSourceKind::Inline { .. } | RedirectSourceKind::Json { .. } => {}
        }
    }
}

fn check_name(
    errors: &mut Vec<ValidationError>,
    kind: &'static str,
    name: &str,
    seen: &mut HashSet<String>,
) {
    if name.trim().is_empty() {
        errors.push(ValidationError::EmptyName { kind });
    } else if !seen.insert(name.to_string()) {
        errors.push(ValidationError::DuplicateName {
            kind,
            name: name.to_string(),
        });
    }
}

fn check_path(errors: &mut Vec<ValidationError>, field: String, value: &str) {
    if !value.starts_with('/') {
        errors.push(ValidationError::NotAPath {
            field,
            value: value.to_string(),
        });
    }
}

fn is_http_origin(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.has_host()
                && url.query().is_none()
                && url.fragment().is_none()
        }
        Err(_) => false,
    }
}
