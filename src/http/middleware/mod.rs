//! Axum middleware.

pub mod rewrite;

pub use rewrite::rewrite_middleware;
