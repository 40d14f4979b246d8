//! Merged redirect table.
//!
//! # Responsibilities
//! - Merge named sources in declared order (last write wins)
//! - Resolve a request path to a redirect
//! - Export the hosting-platform mapping
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Exact rules are a map lookup; wildcard rules are scanned longest first
//! - Overrides are silent apart from a debug event

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::redirects::rule::{RedirectRule, RedirectStatus, WILDCARD_SUFFIX};
use crate::redirects::source::RedirectSource;
use crate::routing::matcher::SegmentPrefixMatcher;

/// A merged rule and the source it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub rule: RedirectRule,
    pub source: String,
}

/// Outcome of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub status: RedirectStatus,
    pub location: String,
    pub source: String,
}

/// The canonical, immutable redirect table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectTable {
    entries: BTreeMap<String, TableEntry>,
    /// Wildcard rules, longest prefix first.
    wildcards: Vec<(SegmentPrefixMatcher, String)>,
}

impl RedirectTable {
    /// Merge sources in order. For a path present in several sources the
    /// value from the later source wins.
    pub fn merge<'a, I>(sources: I) -> Self
    where
        I: IntoIterator<Item = &'a RedirectSource>,
    {
        let mut entries: BTreeMap<String, TableEntry> = BTreeMap::new();

        for source in sources {
            for rule in source.rules() {
                let entry = TableEntry {
                    rule: rule.clone(),
                    source: source.name().to_string(),
                };
                if let Some(previous) = entries.insert(rule.source_path.clone(), entry) {
                    tracing::debug!(
                        path = %rule.source_path,
                        previous_source = %previous.source,
                        source = %source.name(),
                        "Redirect overridden by later source"
                    );
                }
            }
        }

        let mut wildcards: Vec<(SegmentPrefixMatcher, String)> = entries
            .values()
            .filter_map(|entry| {
                entry
                    .rule
                    .wildcard_prefix()
                    .map(|prefix| (SegmentPrefixMatcher::new(prefix), entry.rule.source_path.clone()))
            })
            .collect();
        wildcards.sort_by(|a, b| {
            b.0.prefix()
                .len()
                .cmp(&a.0.prefix().len())
                .then_with(|| a.1.cmp(&b.1))
        });

        Self { entries, wildcards }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a rule by its exact source path (including `/*` patterns).
    pub fn get(&self, source_path: &str) -> Option<&TableEntry> {
        self.entries.get(source_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableEntry> {
        self.entries.values()
    }

    /// Resolve a request path.
    ///
    /// Tries the exact path, then the path without one trailing slash, then
    /// the longest matching wildcard rule.
    pub fn resolve(&self, path: &str) -> Option<Resolution> {
        if let Some(entry) = self.exact(path) {
            return Some(Self::resolution(entry, entry.rule.destination.clone()));
        }

        for (matcher, key) in &self.wildcards {
            let Some(rest) = matcher.remainder(path) else {
                continue;
            };
            let Some(entry) = self.entries.get(key) else {
                continue;
            };
            let location = match entry.rule.destination.strip_suffix(WILDCARD_SUFFIX) {
                Some(base) => splat(base, rest),
                None => entry.rule.destination.clone(),
            };
            return Some(Self::resolution(entry, location));
        }

        None
    }

    fn exact(&self, path: &str) -> Option<&TableEntry> {
        if let Some(entry) = self.entries.get(path) {
            return Some(entry);
        }
        match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => self.entries.get(trimmed),
            _ => None,
        }
    }

    fn resolution(entry: &TableEntry, location: String) -> Resolution {
        Resolution {
            status: entry.rule.status,
            location,
            source: entry.source.clone(),
        }
    }
}

fn splat(base: &str, rest: &str) -> String {
    let location = format!("{}{}", base, rest);
    if location.is_empty() {
        "/".to_string()
    } else {
        location
    }
}

#[derive(Serialize)]
struct PlatformRedirect<'a> {
    status: u16,
    destination: &'a str,
}

/// Serializes to the hosting platform shape `{ path: { status, destination } }`.
impl Serialize for RedirectTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, entry) in &self.entries {
            map.serialize_entry(
                path,
                &PlatformRedirect {
                    status: entry.rule.status.as_u16(),
                    destination: &entry.rule.destination,
                },
            )?;
        }
        map.end()
    }
}
