//! Response construction.
//!
//! # Responsibilities
//! - Build redirect responses (`Location` + status)
//! - Map local failures to plain-text error responses
//!
//! # Design Decisions
//! - Redirect bodies are empty; user agents follow the header
//! - A location that cannot be a header value is a server fault (500),
//!   never a silent pass-through

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::redirects::RedirectStatus;

/// Redirect response to `location`.
pub fn redirect(status: RedirectStatus, location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (status.status_code(), [(header::LOCATION, value)]).into_response(),
        Err(e) => {
            tracing::error!(location = %location, error = %e, "Redirect location is not a valid header value");
            (StatusCode::INTERNAL_SERVER_ERROR, "Invalid redirect location").into_response()
        }
    }
}

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

pub fn bad_request(message: &'static str) -> Response {
    (StatusCode::BAD_REQUEST, message).into_response()
}

pub fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
}
