//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Load every redirect source and merge them into one table
//! - Compile rewrite rules
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The same path is used by the server and the maintenance CLI, so a
//!   table that passes `redirects-cli check` is exactly the one served

use std::path::Path;

use thiserror::Error;

use crate::config::validation::validate_config;
use crate::config::{load_config, ConfigError, SiteConfig};
use crate::redirects::rule::InvalidStatus;
use crate::redirects::{load_sources, RedirectError, RedirectSource, RedirectTable};
use crate::routing::RewriteSet;

/// Fatal startup errors.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Redirects(#[from] RedirectError),

    #[error("rewrite rules: {0}")]
    Rewrite(#[from] InvalidStatus),
}

/// Everything the service needs, built once and then frozen.
#[derive(Debug, Clone)]
pub struct Site {
    pub config: SiteConfig,
    pub sources: Vec<RedirectSource>,
    pub table: RedirectTable,
    pub rewrites: RewriteSet,
}

/// Load the config file and build the site from it.
///
/// Data files referenced by redirect sources resolve against the config
/// file's directory.
pub fn load_site(path: &Path) -> Result<Site, StartupError> {
    let config = load_config(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    build_site(config, base_dir)
}

/// Build the site from a config.
///
/// The config is validated here as well, so a hand-built `SiteConfig`
/// cannot produce a site that silently degrades at runtime.
pub fn build_site(config: SiteConfig, base_dir: &Path) -> Result<Site, StartupError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    let sources = load_sources(&config.redirects, base_dir)?;
    let table = RedirectTable::merge(&sources);
    let rewrites = RewriteSet::from_config(&config.rewrites)?;

    tracing::info!(
        sources = sources.len(),
        redirects = table.len(),
        rewrites = rewrites.rules().len(),
        "Redirect tables built"
    );

    Ok(Site {
        config,
        sources,
        table,
        rewrites,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_site_resolves_relative_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("data")).unwrap();
        fs::write(
            dir.path().join("data/errors.json"),
            r#"[{ "categories": [{ "errors": [{ "code": 100, "slug": "hhe100" }] }] }]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("site.toml"),
            r#"
            [[redirects]]
            name = "error-codes"
            kind = "error-codes"
            file = "data/errors.json"

            [[redirects]]
            name = "shortlinks"
            kind = "inline"
            rules = { "/hhe100" = { status = 301, destination = "/elsewhere" } }
            "#,
        )
        .unwrap();

        let site = load_site(&dir.path().join("site.toml")).unwrap();
        assert_eq!(site.sources.len(), 2);
        assert_eq!(site.table.len(), 1);
        assert_eq!(site.table.resolve("/hhe100").unwrap().location, "/elsewhere");
        assert_eq!(site.rewrites.rules().len(), 1);
    }

    #[test]
    fn test_invalid_rule_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("site.toml"),
            r#"
            [[redirects]]
            name = "shortlinks"
            kind = "inline"
            rules = { "/docs" = { status = 302 } }
            "#,
        )
        .unwrap();

        let err = load_site(&dir.path().join("site.toml")).unwrap_err();
        assert!(matches!(err, StartupError::Redirects(RedirectError::Invalid(_))));
        assert!(err.to_string().contains("missing destination"));
    }

    #[test]
    fn test_build_site_rejects_invalid_config() {
        let mut config = SiteConfig::default();
        config.upstream = Some(crate::config::UpstreamConfig {
            address: "not an authority".into(),
        });

        let err = build_site(config, Path::new(".")).unwrap_err();
        match err {
            StartupError::Config(ConfigError::Validation(errors)) => {
                assert_eq!(
                    errors,
                    vec![crate::config::ValidationError::InvalidAddress {
                        field: "upstream.address",
                        value: "not an authority".into(),
                    }]
                );
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
