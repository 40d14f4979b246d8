use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use site_redirects::lifecycle::{load_site, Site};
use site_redirects::observability::logging;
use site_redirects::routing::RewriteAction;

#[derive(Parser)]
#[command(name = "redirects-cli")]
#[command(about = "Validate, export and inspect the site's redirect tables", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "config/site.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the config and every redirect source
    Check,
    /// Print the merged table in the hosting platform's redirects format
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show what the service does with a path (and optional query)
    Resolve {
        /// e.g. "/hardhat-runner/docs/config?x=1"
        target: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let site = load_site(&cli.config)?;
    logging::init_tracing(&site.config.observability);

    match cli.command {
        Commands::Check => print_json(&check_summary(&site))?,
        Commands::Export { output } => {
            let rendered = serde_json::to_string_pretty(&site.table)?;
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, rendered + "\n")?;
                    eprintln!("Wrote {} redirects to {}", site.table.len(), path.display());
                }
                None => println!("{}", rendered),
            }
        }
        Commands::Resolve { target } => print_json(&resolve(&site, &target))?,
    }

    Ok(())
}

fn check_summary(site: &Site) -> Value {
    let sources: Vec<Value> = site
        .sources
        .iter()
        .map(|s| json!({ "name": s.name(), "rules": s.len() }))
        .collect();
    let rewrites: Vec<Value> = site
        .rewrites
        .rules()
        .iter()
        .map(|r| {
            json!({
                "name": r.name,
                "path_prefix": r.path_prefix(),
                "target_path": r.target_path,
                "status": r.status.as_u16(),
            })
        })
        .collect();

    json!({
        "status": "ok",
        "sources": sources,
        "redirects": site.table.len(),
        "rewrites": rewrites,
    })
}

fn resolve(site: &Site, target: &str) -> Value {
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };

    if let RewriteAction::Redirect {
        rule,
        location,
        status,
    } = site.rewrites.evaluate(path, query)
    {
        return json!({
            "action": "rewrite",
            "rule": rule,
            "status": status.as_u16(),
            "location": location,
        });
    }

    match site.table.resolve(path) {
        Some(hit) => json!({
            "action": "redirect",
            "source": hit.source,
            "status": hit.status.as_u16(),
            "location": hit.location,
        }),
        None => json!({ "action": "pass-through" }),
    }
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
