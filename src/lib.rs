//! Redirect service for the documentation site.
//!
//! Merges the site's static redirect tables, applies request-time prefix
//! rewrites, and generates the JSON-RPC methods reference page.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod redirects;
pub mod routing;
pub mod rpc_reference;

pub use config::SiteConfig;
pub use http::HttpServer;
pub use lifecycle::{Shutdown, Site};
pub use redirects::RedirectTable;
pub use routing::RewriteSet;
