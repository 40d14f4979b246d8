//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (assign request ID)
//!     → trace span, timeout
//!     → middleware/rewrite.rs (prefix rewrite → landing redirect)
//!     → landing.rs (decode `r`, forward to old origin) when enabled
//!     → server.rs fallback (static redirect table → upstream origin)
//!     → response.rs (redirect and error responses)
//!     → Send to client
//! ```

pub mod landing;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
