//! Request-time routing decisions.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, query)
//!     → rewrite.rs (prefix rules, first match)
//!     → matcher.rs (evaluate path conditions)
//!     → Return: Redirect to landing URL, or PassThrough
//!
//! Rule Compilation (at startup):
//!     RewriteConfig[]
//!     → Compile matchers
//!     → Freeze as immutable RewriteSet
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always produces the same action

pub mod matcher;
pub mod rewrite;

pub use rewrite::{RewriteAction, RewriteRule, RewriteSet};
