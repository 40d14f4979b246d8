//! Redirect sources.
//!
//! # Responsibilities
//! - Turn each configured source (inline table, shortlink pairs, JSON file,
//!   error catalog) into a named list of validated rules
//! - Reject malformed entries before they can reach the merged table
//!
//! # Design Decisions
//! - File problems (unreadable, unparseable) stop loading immediately
//! - Rule problems are collected across every source and reported together
//! - Relative file paths resolve against the config file's directory

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::schema::{RedirectSourceConfig, RedirectSourceKind};
use crate::redirects::entries::RawEntries;
use crate::redirects::error::{RedirectError, RuleError};
use crate::redirects::rule::{RedirectRule, RedirectStatus, WILDCARD_SUFFIX};

/// A named, validated redirect table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectSource {
    name: String,
    rules: Vec<RedirectRule>,
}

impl RedirectSource {
    /// Build a source from rules that are already known to be valid.
    pub fn new(name: impl Into<String>, rules: Vec<RedirectRule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[RedirectRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Validate a `path -> {status, destination}` map.
    pub fn from_entries(name: &str, entries: &RawEntries, errors: &mut Vec<RuleError>) -> Self {
        let mut builder = SourceBuilder::new(name, errors);
        for (path, raw) in entries.iter() {
            builder.push(path, raw.status, raw.destination.as_deref());
        }
        builder.finish()
    }

    /// Validate a list of `[path, destination]` pairs sharing one status.
    pub fn from_pairs(
        name: &str,
        pairs: &[(String, String)],
        status: u16,
        errors: &mut Vec<RuleError>,
    ) -> Self {
        let mut builder = SourceBuilder::new(name, errors);
        for (path, destination) in pairs {
            builder.push(path, Some(status), Some(destination.as_str()));
        }
        builder.finish()
    }

    /// Generate `/{prefix}{code} -> {docs_path}#{slug}` for every error in the catalog.
    pub fn from_error_catalog(
        name: &str,
        catalog: &[ErrorPackage],
        prefix: &str,
        docs_path: &str,
        errors: &mut Vec<RuleError>,
    ) -> Self {
        let prefix = prefix.trim_start_matches('/');
        let mut builder = SourceBuilder::new(name, errors);
        let descriptors = catalog
            .iter()
            .flat_map(|package| &package.categories)
            .flat_map(|category| &category.errors);

        for descriptor in descriptors {
            let path = format!("/{}{}", prefix, descriptor.code);
            let destination = format!("{}#{}", docs_path, descriptor.slug);
            builder.push(
                &path,
                Some(RedirectStatus::Found.as_u16()),
                Some(destination.as_str()),
            );
        }
        builder.finish()
    }
}

/// One package of the error catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorPackage {
    #[serde(default)]
    pub categories: Vec<ErrorCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorCategory {
    #[serde(default)]
    pub errors: Vec<ErrorDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDescriptor {
    pub code: u32,
    pub slug: String,
}

/// Load every configured source, in order.
pub fn load_sources(
    configs: &[RedirectSourceConfig],
    base_dir: &Path,
) -> Result<Vec<RedirectSource>, RedirectError> {
    let mut errors = Vec::new();
    let mut sources = Vec::with_capacity(configs.len());

    for config in configs {
        let name = config.name.as_str();
        let source = match &config.kind {
            RedirectSourceKind::Inline { rules } => {
                RedirectSource::from_entries(name, rules, &mut errors)
            }
            RedirectSourceKind::Pairs { pairs, status } => {
                RedirectSource::from_pairs(name, pairs, *status, &mut errors)
            }
            RedirectSourceKind::Json { file } => {
                let entries: RawEntries = read_json(&resolve_path(base_dir, file))?;
                RedirectSource::from_entries(name, &entries, &mut errors)
            }
            RedirectSourceKind::ErrorCodes {
                file,
                prefix,
                docs_path,
            } => {
                let catalog: Vec<ErrorPackage> = read_json(&resolve_path(base_dir, file))?;
                RedirectSource::from_error_catalog(name, &catalog, prefix, docs_path, &mut errors)
            }
        };

        tracing::debug!(source = %name, rules = source.len(), "Redirect source loaded");
        sources.push(source);
    }

    if errors.is_empty() {
        Ok(sources)
    } else {
        Err(RedirectError::Invalid(errors))
    }
}

fn resolve_path(base_dir: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        base_dir.join(file)
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, RedirectError> {
    let content = fs::read_to_string(path).map_err(|source| RedirectError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| RedirectError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Accumulates rules for one source, recording problems instead of failing.
struct SourceBuilder<'a> {
    name: &'a str,
    seen: HashSet<String>,
    rules: Vec<RedirectRule>,
    errors: &'a mut Vec<RuleError>,
}

impl<'a> SourceBuilder<'a> {
    fn new(name: &'a str, errors: &'a mut Vec<RuleError>) -> Self {
        Self {
            name,
            seen: HashSet::new(),
            rules: Vec::new(),
            errors,
        }
    }

    fn push(&mut self, path: &str, status: Option<u16>, destination: Option<&str>) {
        if !self.seen.insert(path.to_string()) {
            self.errors.push(RuleError::DuplicatePath {
                table: self.name.to_string(),
                path: path.to_string(),
            });
            return;
        }

        match check_rule(self.name, path, status, destination) {
            Ok(rule) => self.rules.push(rule),
            Err(e) => self.errors.push(e),
        }
    }

    fn finish(self) -> RedirectSource {
        RedirectSource::new(self.name, self.rules)
    }
}

fn check_rule(
    table: &str,
    path: &str,
    status: Option<u16>,
    destination: Option<&str>,
) -> Result<RedirectRule, RuleError> {
    if let Err(reason) = check_source_path(path) {
        return Err(RuleError::InvalidSourcePath {
            table: table.to_string(),
            path: path.to_string(),
            reason,
        });
    }

    let destination = match destination.map(str::trim) {
        Some(d) if !d.is_empty() => d,
        _ => {
            return Err(RuleError::MissingDestination {
                table: table.to_string(),
                path: path.to_string(),
            })
        }
    };

    if !is_valid_destination(destination) {
        return Err(RuleError::InvalidDestination {
            table: table.to_string(),
            path: path.to_string(),
            destination: destination.to_string(),
        });
    }

    let status = match status {
        Some(code) => RedirectStatus::try_from(code).map_err(|e| RuleError::InvalidStatus {
            table: table.to_string(),
            path: path.to_string(),
            status: e.0,
        })?,
        None => {
            return Err(RuleError::MissingStatus {
                table: table.to_string(),
                path: path.to_string(),
            })
        }
    };

    Ok(RedirectRule::new(path, destination, status))
}

fn check_source_path(path: &str) -> Result<(), &'static str> {
    if !path.starts_with('/') {
        return Err("must start with '/'");
    }
    if path.contains('?') || path.contains('#') {
        return Err("query and fragment are not matched");
    }
    if path.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("contains whitespace");
    }
    let stem = path.strip_suffix(WILDCARD_SUFFIX).unwrap_or(path);
    if stem.contains('*') {
        return Err("wildcard only allowed as a trailing '/*' segment");
    }
    Ok(())
}

/// Site-relative paths, or absolute http(s) URLs. Must fit in a `Location` header.
fn is_valid_destination(destination: &str) -> bool {
    if !destination.bytes().all(|b| b.is_ascii_graphic()) {
        return false;
    }
    if destination.starts_with('/') {
        return !destination.starts_with("//");
    }
    match url::Url::parse(destination) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}
