//! Method name extraction from the provider's request definitions.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;

/// Namespaces a method must belong to in order to be listed.
pub const KNOWN_PREFIXES: &[&str] = &["eth", "debug", "hardhat", "evm", "net", "web3", "personal"];

fn rename_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"rename\s*=\s*"([^"]+)""#).expect("rename pattern is a valid regex")
    })
}

/// Every `rename = "<ns>_<name>"` in the source, deduplicated and sorted.
pub fn extract_methods(source: &str) -> Vec<String> {
    let methods: BTreeSet<String> = rename_pattern()
        .captures_iter(source)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| {
            name.split_once('_')
                .is_some_and(|(prefix, _)| KNOWN_PREFIXES.contains(&prefix))
        })
        .map(String::from)
        .collect();

    methods.into_iter().collect()
}

/// Group methods by the text before their first `_`.
pub fn group_by_prefix(methods: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for method in methods {
        let prefix = method.split('_').next().unwrap_or(method);
        grouped
            .entry(prefix.to_string())
            .or_default()
            .push(method.clone());
    }
    grouped
}
