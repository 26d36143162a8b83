//! Parser for `history.xml` (the arcade history database distributed for
//! MAME frontends).
//!
//! One `<entry>` can apply to arcade systems and to software list items at
//! the same time — e.g. ST-V games target both the arcade set and the `stv`
//! software list.

use std::io::BufRead;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use mamescope_core::{Basename, SoftwareBasename, SoftwareListBasename};

use crate::error::XmlError;

/// One `<entry>`: its targets plus the raw documentation text.
#[derive(Debug, Clone, Default)]
pub struct HistoryEntryRecord {
    /// Arcade systems this entry applies to.
    pub systems: Vec<Basename>,
    /// `(list, software)` pairs this entry applies to.
    pub software: Vec<(SoftwareListBasename, SoftwareBasename)>,
    pub text: Option<String>,
}

/// The parsed `history.xml` document.
#[derive(Debug, Clone, Default)]
pub struct HistoryXml {
    pub entries: Vec<HistoryEntryRecord>,
}

impl HistoryXml {
    /// `(system, text)` pairs, skipping entries with no text.
    pub fn iter_system_histories(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|entry| {
            entry.text.as_deref().into_iter().flat_map(|text| {
                entry
                    .systems
                    .iter()
                    .map(move |system| (system.as_str(), text))
            })
        })
    }

    /// `(list, software, text)` triples, skipping entries with no text.
    pub fn iter_software_histories(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.entries.iter().flat_map(|entry| {
            entry.text.as_deref().into_iter().flat_map(|text| {
                entry
                    .software
                    .iter()
                    .map(move |(list, software)| (list.as_str(), software.as_str(), text))
            })
        })
    }
}

/// Parse a `history.xml` document.
pub fn parse_history<R: BufRead>(reader: R) -> Result<HistoryXml, XmlError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut history = HistoryXml::default();
    let mut current: Option<HistoryEntryRecord> = None;
    let mut in_text = false;
    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"entry" => current = Some(HistoryEntryRecord::default()),
                b"text" => in_text = current.is_some(),
                _ => {}
            },
            Event::Empty(ref e) => {
                let Some(ref mut entry) = current else {
                    buf.clear();
                    continue;
                };
                match e.name().as_ref() {
                    b"system" => {
                        for attr in e.attributes() {
                            let attr = attr?;
                            if attr.key.as_ref() == b"name" {
                                entry
                                    .systems
                                    .push(String::from_utf8_lossy(&attr.value).into_owned());
                            }
                        }
                    }
                    b"item" => {
                        let mut list = None;
                        let mut name = None;
                        for attr in e.attributes() {
                            let attr = attr?;
                            let value = String::from_utf8_lossy(&attr.value).into_owned();
                            match attr.key.as_ref() {
                                b"list" => list = Some(value),
                                b"name" => name = Some(value),
                                _ => {}
                            }
                        }
                        if let (Some(list), Some(name)) = (list, name) {
                            entry.software.push((list, name));
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(ref e) if in_text => {
                if let Some(ref mut entry) = current {
                    let text = e.unescape()?.into_owned();
                    match entry.text {
                        Some(ref mut existing) => existing.push_str(&text),
                        None => entry.text = Some(text),
                    }
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"text" => in_text = false,
                b"entry" => {
                    if let Some(entry) = current.take() {
                        history.entries.push(entry);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(history)
}

/// Parse `history.xml` from disk, returning `None` when the file is absent.
pub fn parse_history_file(path: &Path) -> Result<Option<HistoryXml>, XmlError> {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    parse_history(std::io::BufReader::new(file)).map(Some)
}
