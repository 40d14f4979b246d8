//! Redirect source errors.

use std::path::PathBuf;

use thiserror::Error;

/// A single rule that cannot be accepted into a table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("[{table}] {path}: missing destination")]
    MissingDestination { table: String, path: String },

    #[error("[{table}] {path}: missing status")]
    MissingStatus { table: String, path: String },

    #[error("[{table}] {path}: status {status} is not one of 301, 302, 307, 308")]
    InvalidStatus { table: String, path: String, status: u16 },

    #[error("[{table}] {path}: invalid source path ({reason})")]
    InvalidSourcePath {
        table: String,
        path: String,
        reason: &'static str,
    },

    #[error("[{table}] {path}: invalid destination '{destination}'")]
    InvalidDestination {
        table: String,
        path: String,
        destination: String,
    },

    #[error("[{table}] {path}: duplicate source path")]
    DuplicatePath { table: String, path: String },
}

/// Errors raised while loading redirect sources.
#[derive(Debug, Error)]
pub enum RedirectError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid redirect rules: {}", join(.0))]
    Invalid(Vec<RuleError>),
}

fn join(errors: &[RuleError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
