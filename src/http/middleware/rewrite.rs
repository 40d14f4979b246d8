//! Rewrite middleware.
//! Short-circuits requests under a configured prefix with a redirect to the
//! landing page; everything else continues to the router untouched.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::http::request::request_id;
use crate::http::response;
use crate::observability::metrics::{self, Outcome};
use crate::routing::{RewriteAction, RewriteSet};

pub async fn rewrite_middleware(
    State(rewrites): State<Arc<RewriteSet>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let action = rewrites.evaluate(request.uri().path(), request.uri().query());

    match action {
        RewriteAction::PassThrough => next.run(request).await,
        RewriteAction::Redirect {
            rule,
            location,
            status,
        } => {
            tracing::debug!(
                request_id = %request_id(&request),
                rule = %rule,
                path = %request.uri().path(),
                location = %location,
                "Rewriting request to landing page"
            );
            metrics::record_rewrite(rule);
            metrics::record_request(Outcome::Rewrite, status.as_u16(), start);
            response::redirect(status, &location)
        }
    }
}
