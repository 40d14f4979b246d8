use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use site_redirects::config::ObservabilityConfig;
use site_redirects::observability::logging;
use site_redirects::rpc_reference::{self, GeneratorOptions, DEFAULT_METHODS_URL};

#[derive(Parser)]
#[command(name = "rpc-methods")]
#[command(about = "Generate the JSON-RPC methods reference page", long_about = None)]
struct Cli {
    /// Source file defining the provider's supported methods
    #[arg(long, default_value = DEFAULT_METHODS_URL)]
    url: String,

    /// Directory with per-method notes and unsupported-methods.json
    #[arg(long, default_value = "content/rpc")]
    content_dir: PathBuf,

    /// Markdown file to write
    #[arg(short, long, default_value = "content/docs/reference/json-rpc-methods.md")]
    output: PathBuf,

    /// Fetch timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_tracing(&ObservabilityConfig::default());

    let options = GeneratorOptions {
        methods_url: cli.url,
        timeout: Duration::from_secs(cli.timeout_secs),
        content_dir: cli.content_dir,
        output: cli.output,
    };

    if let Err(e) = rpc_reference::generate(&options).await {
        tracing::error!(error = %e, "JSON-RPC reference generation failed");
        return Err(e.into());
    }
    Ok(())
}
