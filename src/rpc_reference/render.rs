//! Markdown rendering of the JSON-RPC methods page.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;
use std::fs;
use std::path::PathBuf;

/// Standard namespaces, in page order.
pub const STANDARD_PREFIXES: &[&str] = &["eth", "debug", "net", "web3", "personal"];

/// Testing and debugging namespaces, in page order.
pub const SPECIAL_PREFIXES: &[&str] = &["hardhat", "evm"];

const FRONT_MATTER: &str = "---
title: JSON-RPC Methods
description: Reference of JSON-RPC methods supported by Hardhat's simulated networks
sidebar:
  label: JSON-RPC Methods
  order: 6
tableOfContents:
  minHeadingLevel: 2
  maxHeadingLevel: 3
editUrl: false
---
";

/// Optional hand-written description and examples for a method.
pub trait MethodNotes {
    fn notes(&self, method: &str) -> Option<String>;
}

/// Notes stored as `<dir>/<method>.md`.
#[derive(Debug, Clone)]
pub struct NotesDir {
    dir: PathBuf,
}

impl NotesDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl MethodNotes for NotesDir {
    fn notes(&self, method: &str) -> Option<String> {
        let content = fs::read_to_string(self.dir.join(format!("{method}.md"))).ok()?;
        let trimmed = content.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

impl MethodNotes for HashMap<String, String> {
    fn notes(&self, method: &str) -> Option<String> {
        self.get(method).map(|n| n.trim().to_string())
    }
}

/// Render the full page.
pub fn render_page(
    grouped: &BTreeMap<String, Vec<String>>,
    unsupported: &[String],
    notes: &impl MethodNotes,
) -> String {
    let mut page = String::from(FRONT_MATTER);

    page.push_str("\n## Standard Methods\n\n");
    render_section(&mut page, grouped, STANDARD_PREFIXES, notes);

    page.push_str("\n## Special Testing/Debugging Methods\n\n");
    render_section(&mut page, grouped, SPECIAL_PREFIXES, notes);

    page.push_str("\n## Unsupported Methods\n\n");
    for method in unsupported {
        let _ = writeln!(page, "###### `{method}`");
    }

    page
}

fn render_section(
    page: &mut String,
    grouped: &BTreeMap<String, Vec<String>>,
    prefixes: &[&str],
    notes: &impl MethodNotes,
) {
    let methods = prefixes
        .iter()
        .filter_map(|prefix| grouped.get(*prefix))
        .flatten();

    for method in methods {
        let _ = writeln!(page, "###### `{method}`");
        if let Some(text) = notes.notes(method).filter(|t| !t.is_empty()) {
            let _ = write!(page, "\n{text}\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grouped() -> BTreeMap<String, Vec<String>> {
        let mut grouped = BTreeMap::new();
        grouped.insert("eth".to_string(), vec!["eth_accounts".to_string()]);
        grouped.insert("net".to_string(), vec!["net_version".to_string()]);
        grouped.insert("evm".to_string(), vec!["evm_mine".to_string()]);
        grouped.insert(
            "hardhat".to_string(),
            vec!["hardhat_impersonateAccount".to_string()],
        );
        grouped
    }

    #[test]
    fn test_render_page_layout() {
        let mut notes = HashMap::new();
        notes.insert(
            "hardhat_impersonateAccount".to_string(),
            "\nSends transactions as the given account.\n\n".to_string(),
        );

        let page = render_page(&grouped(), &["eth_getWork".to_string()], &notes);

        let body = page.strip_prefix(FRONT_MATTER).unwrap();
        assert_eq!(
            body,
            "\n## Standard Methods\n\n\
             ###### `eth_accounts`\n\
             ###### `net_version`\n\
             \n## Special Testing/Debugging Methods\n\n\
             ###### `hardhat_impersonateAccount`\n\
             \nSends transactions as the given account.\n\
             ###### `evm_mine`\n\
             \n## Unsupported Methods\n\n\
             ###### `eth_getWork`\n"
        );
    }

    #[test]
    fn test_notes_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("eth_call.md"), "  Executes a call.  \n").unwrap();
        fs::write(dir.path().join("eth_empty.md"), "\n\n").unwrap();

        let notes = NotesDir::new(dir.path());
        assert_eq!(notes.notes("eth_call").as_deref(), Some("Executes a call."));
        assert_eq!(notes.notes("eth_empty"), None);
        assert_eq!(notes.notes("eth_missing"), None);
    }
}
