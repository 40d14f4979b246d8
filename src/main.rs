//! Documentation site redirect service.
//!
//! # Architecture Overview
//!
//! ```text
//!                              ┌──────────────────────────────────────────────────────┐
//!                              │                  SITE REDIRECTS                       │
//!                              │                                                       │
//!     Client Request           │  ┌─────────┐    ┌──────────┐    ┌──────────────┐     │
//!     ─────────────────────────┼─▶│ request │───▶│ rewrite  │───▶│   landing    │     │
//!                              │  │   id    │    │middleware│    │   handler    │     │
//!                              │  └─────────┘    └────┬─────┘    └──────────────┘     │
//!                              │                      │ no match                       │
//!                              │                      ▼                                │
//!                              │               ┌──────────────┐                        │
//!                              │               │redirect table│  merged at startup     │
//!                              │               │   lookup     │  from config sources   │
//!                              │               └──────┬───────┘                        │
//!                              │                      │ no match                       │
//!                              │                      ▼                                │
//!     Client Response          │               ┌──────────────┐                        │
//!     ◀────────────────────────┼───────────────│   upstream   │◀───────────────────────┼──── Site
//!                              │               │ pass-through │                        │     Origin
//!                              │               └──────────────┘                        │
//!                              └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use site_redirects::config::SiteConfig;
use site_redirects::http::HttpServer;
use site_redirects::lifecycle::{self, signals, Shutdown};
use site_redirects::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "site-redirects")]
#[command(about = "Serve the documentation site's redirects", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let site = match &cli.config {
        Some(path) => lifecycle::load_site(path),
        None => lifecycle::build_site(SiteConfig::default(), std::path::Path::new(".")),
    };

    let site = match site {
        Ok(site) => site,
        Err(e) => {
            logging::init_tracing(&SiteConfig::default().observability);
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    logging::init_tracing(&site.config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "site-redirects starting");

    tracing::info!(
        bind_address = %site.config.listener.bind_address,
        redirects = site.table.len(),
        rewrites = site.rewrites.rules().len(),
        request_timeout_secs = site.config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&site.config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    if site.config.observability.metrics_enabled {
        match site.config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %site.config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    let server = HttpServer::new(site);
    server.run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
