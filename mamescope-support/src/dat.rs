//! Text `.dat` support files (mameinfo.dat, messinfo.dat, ...) and the
//! history database built over a parsed `history.xml`.
//!
//! A text dat is a sequence of `$info=<names>` blocks terminated by `$end`;
//! the first line inside each block is a `$mame`/`$bio` marker and is
//! dropped.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use mamescope_core::{Basename, SoftwareBasename, SoftwareListBasename};
use mamescope_xml::HistoryXml;

use crate::error::SupportError;
use crate::sections::HistoryEntry;

/// Parse a `$info`-delimited dat file into basename → text. A `$info` line
/// may carry a comma-separated list of names; each gets the same text.
pub fn parse_info_dat(path: &Path) -> Result<HashMap<Basename, Arc<str>>, SupportError> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);

    let mut entries = HashMap::new();
    let mut current_names: Option<Vec<String>> = None;
    let mut current_lines: Vec<&str> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("$info") {
            let names = rest.strip_prefix('=').unwrap_or(rest);
            current_names = Some(
                names
                    .split(',')
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty())
                    .collect(),
            );
            current_lines.clear();
        } else if let Some(names) = &current_names {
            if line == "$end" {
                // Drop the first line, the $mame/$bio marker
                let body: Arc<str> = current_lines
                    .get(1..)
                    .unwrap_or_default()
                    .join("\n")
                    .into();
                for name in names {
                    entries.entry(name.clone()).or_insert_with(|| body.clone());
                }
                current_names = None;
                continue;
            }
            current_lines.push(line);
        }
    }
    Ok(entries)
}

/// History lookups over an already-parsed `history.xml`. No I/O here.
///
/// When multiple entries target the same basename, the first in document
/// order wins.
#[derive(Debug, Clone, Default)]
pub struct HistoryDb {
    systems: HashMap<Basename, Arc<str>>,
    software: HashMap<(SoftwareListBasename, SoftwareBasename), Arc<str>>,
}

impl HistoryDb {
    pub fn new(xml: &HistoryXml) -> Self {
        let mut systems: HashMap<Basename, Arc<str>> = HashMap::new();
        let mut software: HashMap<(SoftwareListBasename, SoftwareBasename), Arc<str>> =
            HashMap::new();
        for entry in &xml.entries {
            let Some(text) = entry.text.as_deref() else {
                continue;
            };
            let text: Arc<str> = text.into();
            for system in &entry.systems {
                systems
                    .entry(system.clone())
                    .or_insert_with(|| text.clone());
            }
            for (list, name) in &entry.software {
                software
                    .entry((list.clone(), name.clone()))
                    .or_insert_with(|| text.clone());
            }
        }
        Self { systems, software }
    }

    pub fn get_history(&self, basename: &str) -> Option<HistoryEntry> {
        self.systems
            .get(basename)
            .map(|text| HistoryEntry::parse(text))
    }

    pub fn get_software_history(
        &self,
        software_list: &str,
        software: &str,
    ) -> Option<HistoryEntry> {
        self.software
            .get(&(software_list.to_string(), software.to_string()))
            .map(|text| HistoryEntry::parse(text))
    }
}
