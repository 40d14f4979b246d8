//! Landing page handler.
//!
//! Receives `{landing.path}?r=<encoded path+query>` and forwards the
//! visitor to the same location on the configured origin.

use std::time::Instant;

use axum::{
    extract::{RawQuery, State},
    response::Response,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use thiserror::Error;

use crate::http::response;
use crate::http::server::AppState;
use crate::observability::metrics::{self, Outcome};
use crate::redirects::RedirectStatus;
use crate::routing::rewrite::REDIRECT_PARAM;

/// Characters that cannot appear raw in a `Location` header.
const LOCATION: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'\\');

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LandingError {
    #[error("missing 'r' parameter")]
    MissingTarget,

    #[error("'r' must be a site-relative path")]
    NotAPath,
}

/// Build the forward location from the landing query string.
pub fn landing_location(origin: &str, query: Option<&str>) -> Result<String, LandingError> {
    let target = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .find(|(key, _)| key == REDIRECT_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or(LandingError::MissingTarget)?;

    if !target.starts_with('/') || target.starts_with("//") || target.starts_with("/\\") {
        return Err(LandingError::NotAPath);
    }

    Ok(format!(
        "{}{}",
        origin.trim_end_matches('/'),
        utf8_percent_encode(&target, LOCATION)
    ))
}

pub async fn landing_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Response {
    let start = Instant::now();
    let Some(origin) = state.landing_origin.as_deref() else {
        return response::not_found();
    };

    match landing_location(origin, query.as_deref()) {
        Ok(location) => {
            tracing::debug!(location = %location, "Forwarding landing request");
            metrics::record_request(Outcome::Landing, RedirectStatus::Found.as_u16(), start);
            response::redirect(RedirectStatus::Found, &location)
        }
        Err(e) => {
            tracing::debug!(error = %e, query = ?query, "Rejected landing request");
            metrics::record_request(Outcome::Landing, 400, start);
            response::bad_request("Invalid redirect target")
        }
    }
}
