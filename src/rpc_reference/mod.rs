//! JSON-RPC methods reference generator.
//!
//! # Data Flow
//! ```text
//! provider methods.rs (remote, fetched once)
//!     → extract.rs (rename = "..." names, known namespaces only)
//!     → group by namespace
//!     → render.rs (+ per-method notes, + unsupported list)
//!     → single write of the markdown page
//! ```
//!
//! # Design Decisions
//! - Fail fast: a failed fetch or unreadable input aborts before anything
//!   is written
//! - The page is staged in the output directory and renamed over the old
//!   one, so a stale page is never half-replaced
//! - One request with a timeout, no retries

pub mod extract;
pub mod render;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub use extract::{extract_methods, group_by_prefix};
pub use render::{render_page, MethodNotes, NotesDir};

/// Where the provider defines its supported methods.
pub const DEFAULT_METHODS_URL: &str =
    "https://raw.githubusercontent.com/NomicFoundation/edr/main/crates/edr_provider/src/requests/methods.rs";

/// Errors that abort generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Failed to fetch methods source: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Failed to fetch methods source: HTTP {0}")]
    Status(u16),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Contents of `unsupported-methods.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnsupportedMethods {
    #[serde(default)]
    pub unsupported: Vec<String>,
}

/// Inputs of one generator run.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub methods_url: String,
    pub timeout: Duration,
    /// Directory with `<method>.md` notes and `unsupported-methods.json`.
    pub content_dir: PathBuf,
    pub output: PathBuf,
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorReport {
    pub methods: usize,
    pub unsupported: usize,
}

/// Fetch the provider source with a timeout; non-success statuses are errors.
pub async fn fetch_source(url: &str, timeout: Duration) -> Result<String, GeneratorError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(GeneratorError::Status(status.as_u16()));
    }
    Ok(response.text().await?)
}

/// Read the unsupported-methods list.
pub fn read_unsupported(path: &Path) -> Result<UnsupportedMethods, GeneratorError> {
    let content = fs::read_to_string(path).map_err(|source| GeneratorError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| GeneratorError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the page from an already fetched source.
pub fn build_page(
    source: &str,
    content_dir: &Path,
) -> Result<(String, GeneratorReport), GeneratorError> {
    let methods = extract_methods(source);
    let grouped = group_by_prefix(&methods);
    let unsupported = read_unsupported(&content_dir.join("unsupported-methods.json"))?;

    let page = render_page(&grouped, &unsupported.unsupported, &NotesDir::new(content_dir));
    let report = GeneratorReport {
        methods: methods.len(),
        unsupported: unsupported.unsupported.len(),
    };
    Ok((page, report))
}

/// Fetch, render and write the page.
pub async fn generate(options: &GeneratorOptions) -> Result<GeneratorReport, GeneratorError> {
    tracing::info!(url = %options.methods_url, "Fetching provider methods");
    let source = fetch_source(&options.methods_url, options.timeout).await?;

    let (page, report) = build_page(&source, &options.content_dir)?;
    write_page(&options.output, &page)?;

    tracing::info!(
        output = %options.output.display(),
        methods = report.methods,
        unsupported = report.unsupported,
        "JSON-RPC reference written"
    );
    Ok(report)
}

/// Write `page` to a temp file beside `path`, then rename it into place.
pub fn write_page(path: &Path, page: &str) -> Result<(), GeneratorError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_error = |source: std::io::Error| GeneratorError::Write {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(dir).map_err(write_error)?;
    let mut staged = tempfile::NamedTempFile::new_in(dir).map_err(write_error)?;
    staged.write_all(page.as_bytes()).map_err(write_error)?;
    staged.as_file().sync_all().map_err(write_error)?;
    staged.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one raw HTTP response to the first connection.
    async fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = vec![0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}/methods.rs", addr)
    }

    fn options(url: String, dir: &Path, timeout: Duration) -> GeneratorOptions {
        GeneratorOptions {
            methods_url: url,
            timeout,
            content_dir: dir.to_path_buf(),
            output: dir.join("out/json-rpc-methods.md"),
        }
    }

    fn write_unsupported(dir: &Path) {
        fs::write(
            dir.join("unsupported-methods.json"),
            r#"{ "unsupported": ["eth_getWork"] }"#,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_error_status_aborts_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        write_unsupported(dir.path());
        let url = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                .to_string(),
        )
        .await;

        let options = options(url, dir.path(), Duration::from_secs(5));
        let err = generate(&options).await.unwrap_err();

        assert!(matches!(err, GeneratorError::Status(500)));
        assert!(!options.output.exists());
    }

    #[tokio::test]
    async fn test_silent_server_times_out_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        write_unsupported(dir.path());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/methods.rs", listener.local_addr().unwrap());
        tokio::spawn(async move {
            // Accept and hold the connection open without answering.
            if let Ok((socket, _)) = listener.accept().await {
                tokio::time::sleep(Duration::from_secs(30)).await;
                drop(socket);
            }
        });

        let options = options(url, dir.path(), Duration::from_millis(200));
        let err = generate(&options).await.unwrap_err();

        match err {
            GeneratorError::Fetch(e) => assert!(e.is_timeout()),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(!options.output.exists());
    }

    #[tokio::test]
    async fn test_generate_writes_page() {
        let dir = tempfile::tempdir().unwrap();
        write_unsupported(dir.path());
        let body = r#"#[serde(rename = "eth_chainId")]"#;
        let url = serve_once(format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ))
        .await;

        let options = options(url, dir.path(), Duration::from_secs(5));
        let report = generate(&options).await.unwrap();

        assert_eq!(report, GeneratorReport { methods: 1, unsupported: 1 });
        let page = fs::read_to_string(&options.output).unwrap();
        assert!(page.contains("###### `eth_chainId`\n"));
        assert!(page.ends_with("###### `eth_getWork`\n"));
    }

    #[test]
    fn test_write_page_replaces_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("page.md");
        fs::write(&output, "old page that is longer than the new one").unwrap();

        write_page(&output, "new").unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_write_leaves_target_and_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("page.md");
        fs::create_dir(&output).unwrap();
        fs::write(output.join("keep.txt"), "kept").unwrap();

        let err = write_page(&output, "new").unwrap_err();

        assert!(matches!(err, GeneratorError::Write { .. }));
        assert_eq!(fs::read_to_string(output.join("keep.txt")).unwrap(), "kept");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_build_page_reads_content_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("unsupported-methods.json"),
            r#"{ "unsupported": ["eth_getWork", "eth_submitWork"] }"#,
        )
        .unwrap();
        fs::write(dir.path().join("evm_mine.md"), "Mines a block.").unwrap();

        let source = r#"
            #[serde(rename = "evm_mine")]
            #[serde(rename = "eth_chainId")]
        "#;
        let (page, report) = build_page(source, dir.path()).unwrap();

        assert_eq!(report, GeneratorReport { methods: 2, unsupported: 2 });
        assert!(page.contains("###### `eth_chainId`\n"));
        assert!(page.contains("###### `evm_mine`\n\nMines a block.\n"));
        assert!(page.ends_with("###### `eth_getWork`\n###### `eth_submitWork`\n"));
    }

    #[test]
    fn test_missing_unsupported_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_page("", dir.path()).unwrap_err();
        assert!(matches!(err, GeneratorError::Read { .. }));
    }
}
