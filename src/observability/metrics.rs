//! Metrics collection and exposition.
//!
//! # Metrics
//! - `site_redirects_requests_total` (counter): requests by outcome and status
//! - `site_redirects_request_duration_seconds` (histogram): latency by outcome
//! - `site_redirects_static_total` (counter): static redirects by source and status
//! - `site_redirects_rewrites_total` (counter): prefix rewrites by rule
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so handlers and
//!   tests never need to check whether metrics are enabled

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

pub const REQUESTS_TOTAL: &str = "site_redirects_requests_total";
pub const REQUEST_DURATION: &str = "site_redirects_request_duration_seconds";
pub const STATIC_REDIRECTS_TOTAL: &str = "site_redirects_static_total";
pub const REWRITES_TOTAL: &str = "site_redirects_rewrites_total";

/// How a request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Rewrite,
    Static,
    Landing,
    Upstream,
    NotFound,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Rewrite => "rewrite",
            Outcome::Static => "static",
            Outcome::Landing => "landing",
            Outcome::Upstream => "upstream",
            Outcome::NotFound => "not_found",
        }
    }
}

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_request(outcome: Outcome, status: u16, start: Instant) {
    counter!(
        REQUESTS_TOTAL,
        "outcome" => outcome.as_str(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(REQUEST_DURATION, "outcome" => outcome.as_str())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_static_redirect(source: &str, status: u16) {
    counter!(
        STATIC_REDIRECTS_TOTAL,
        "source" => source.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_rewrite(rule: &str) {
    counter!(REWRITES_TOTAL, "rule" => rule.to_string()).increment(1);
}
