//! Static redirect subsystem.
//!
//! # Data Flow
//! ```text
//! [[redirects]] config entries (inline, pairs, json, error-codes)
//!     → source.rs (read files, validate every rule)
//!     → RedirectSource[] (named, ordered)
//!     → table.rs (merge, last source wins)
//!     → RedirectTable (immutable, shared via Arc)
//!
//! Per request:
//!     path → RedirectTable::resolve → status + Location, or no match
//! ```
//!
//! # Design Decisions
//! - A malformed rule fails the whole load; nothing is silently dropped
//! - Merge order is the declared order of sources in the config file
//! - The table never changes after startup

pub mod entries;
pub mod error;
pub mod rule;
pub mod source;
pub mod table;

pub use error::{RedirectError, RuleError};
pub use rule::{RedirectRule, RedirectStatus};
pub use source::{load_sources, RedirectSource};
pub use table::{RedirectTable, Resolution};
