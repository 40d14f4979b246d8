//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, rewrites)
//! - Answer static redirects from the merged table
//! - Forward everything else to the upstream origin
//! - Bind server to listener

use axum::{
    body::Body,
    extract::State,
    http::uri::{Authority, PathAndQuery, Scheme},
    http::{Request, Uri, Version},
    middleware,
    response::Response,
    routing::get,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::SiteConfig;
use crate::http::landing::landing_handler;
use crate::http::middleware::rewrite_middleware;
use crate::http::request::{request_id, x_request_id, MakeRequestUuidV4};
use crate::http::response;
use crate::lifecycle::shutdown;
use crate::lifecycle::Site;
use crate::observability::metrics::{self, Outcome};
use crate::redirects::RedirectTable;
use crate::routing::RewriteSet;

/// Upstream origin and the client used to reach it.
#[derive(Clone)]
pub struct Upstream {
    pub authority: Authority,
    pub client: Client<HttpConnector, Body>,
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RedirectTable>,
    pub upstream: Option<Upstream>,
    pub landing_origin: Option<Arc<str>>,
}

/// HTTP server for the redirect service.
pub struct HttpServer {
    router: Router,
    config: SiteConfig,
}

impl HttpServer {
    /// Create a new HTTP server from a fully built site.
    pub fn new(site: Site) -> Self {
        let Site {
            config,
            table,
            rewrites,
            ..
        } = site;

        let upstream = config.upstream.as_ref().and_then(|upstream| {
            match Authority::from_str(&upstream.address) {
                Ok(authority) => Some(Upstream {
                    authority,
                    client: build_client(&config),
                }),
                Err(e) => {
                    tracing::error!(address = %upstream.address, error = %e, "Invalid upstream address, pass-through disabled");
                    None
                }
            }
        });

        let state = AppState {
            table: Arc::new(table),
            upstream,
            landing_origin: config.landing.forward_origin.as_deref().map(Arc::from),
        };

        let router = Self::build_router(&config, state, Arc::new(rewrites));
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &SiteConfig, state: AppState, rewrites: Arc<RewriteSet>) -> Router {
        let mut router = Router::new();
        if state.landing_origin.is_some() {
            router = router.route(&config.landing.path, get(landing_handler));
        }

        router
            .fallback(fallback_handler)
            .with_state(state)
            .layer(middleware::from_fn_with_state(rewrites, rewrite_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request)
                )
            }))
            .layer(PropagateRequestIdLayer::new(x_request_id()))
            .layer(SetRequestIdLayer::new(x_request_id(), MakeRequestUuidV4))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = ?self.config.upstream.as_ref().map(|u| u.address.as_str()),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait_for(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }
}

fn build_client(config: &SiteConfig) -> Client<HttpConnector, Body> {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
    Client::builder(TokioExecutor::new()).build(connector)
}

/// Static redirect lookup, then pass-through.
async fn fallback_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();

    if let Some(hit) = state.table.resolve(request.uri().path()) {
        tracing::debug!(
            request_id = %request_id(&request),
            path = %request.uri().path(),
            source = %hit.source,
            location = %hit.location,
            status = hit.status.as_u16(),
            "Static redirect"
        );
        metrics::record_static_redirect(&hit.source, hit.status.as_u16());
        metrics::record_request(Outcome::Static, hit.status.as_u16(), start);
        return response::redirect(hit.status, &hit.location);
    }

    match &state.upstream {
        Some(upstream) => forward(upstream, request, start).await,
        None => {
            metrics::record_request(Outcome::NotFound, 404, start);
            response::not_found()
        }
    }
}

/// Forward the request to the upstream origin unchanged (apart from the URI authority).
async fn forward(upstream: &Upstream, request: Request<Body>, start: Instant) -> Response {
    let request_id = request_id(&request).to_string();
    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(upstream.authority.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to build upstream URI");
            metrics::record_request(Outcome::Upstream, 502, start);
            return response::bad_gateway();
        }
    };
    parts.version = Version::HTTP_11;

    match upstream.client.request(Request::from_parts(parts, body)).await {
        Ok(upstream_response) => {
            metrics::record_request(Outcome::Upstream, upstream_response.status().as_u16(), start);
            let (parts, body) = upstream_response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            metrics::record_request(Outcome::Upstream, 502, start);
            response::bad_gateway()
        }
    }
}
