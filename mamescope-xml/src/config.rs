//! Parser for per-machine `.cfg` files from the cfg directory.
//!
//! Coin and ticket counters are stored in there, so we might as well have a
//! look.

use std::io::BufRead;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::XmlError;

/// The `<counters>` element of a system config.
#[derive(Debug, Clone, Default)]
pub struct CountersRecord {
    /// `(index, count)` per coin slot.
    pub coins: Vec<(u32, u64)>,
    /// `None` when tickets are not relevant to this machine.
    pub tickets: Option<u64>,
}

impl CountersRecord {
    pub fn total_coins(&self) -> u64 {
        self.coins.iter().map(|(_, count)| count).sum()
    }

    pub fn coins_for_slot(&self, index: u32) -> Option<u64> {
        self.coins
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, count)| *count)
    }
}

/// One `<system>` element of a config file. Usually only one per file.
#[derive(Debug, Clone, Default)]
pub struct SystemConfigRecord {
    pub name: String,
    pub counters: Option<CountersRecord>,
}

/// A parsed `<mameconfig>` document.
#[derive(Debug, Clone, Default)]
pub struct ConfigFileRecord {
    pub version: Option<u32>,
    pub systems: Vec<SystemConfigRecord>,
}

impl ConfigFileRecord {
    /// Counters of the first system, the common case.
    pub fn counters(&self) -> Option<&CountersRecord> {
        self.systems.first()?.counters.as_ref()
    }
}

/// Parse a `.cfg` document.
pub fn parse_config<R: BufRead>(reader: R) -> Result<ConfigFileRecord, XmlError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut config = ConfigFileRecord::default();
    let mut current: Option<SystemConfigRecord> = None;
    let mut in_counters = false;
    let mut buf = Vec::new();
    loop {
        let event = xml.read_event_into(&mut buf)?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => match e.name().as_ref() {
                b"mameconfig" => {
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.as_ref() == b"version" {
                            config.version = String::from_utf8_lossy(&attr.value).parse().ok();
                        }
                    }
                }
                b"system" => {
                    let mut system = SystemConfigRecord::default();
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.as_ref() == b"name" {
                            system.name = String::from_utf8_lossy(&attr.value).into_owned();
                        }
                    }
                    if matches!(event, Event::Empty(_)) {
                        config.systems.push(system);
                    } else {
                        current = Some(system);
                    }
                }
                b"counters" => {
                    if let Some(ref mut system) = current {
                        system.counters = Some(CountersRecord::default());
                        in_counters = true;
                    }
                }
                b"coins" if in_counters => {
                    let mut index = 0u32;
                    let mut count = 0u64;
                    for attr in e.attributes() {
                        let attr = attr?;
                        let value = String::from_utf8_lossy(&attr.value);
                        match attr.key.as_ref() {
                            b"index" => index = value.parse().unwrap_or(0),
                            b"number" => count = value.parse().unwrap_or(0),
                            _ => {}
                        }
                    }
                    if let Some(counters) = current.as_mut().and_then(|s| s.counters.as_mut()) {
                        counters.coins.push((index, count));
                    }
                }
                b"tickets" if in_counters => {
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.as_ref() == b"number" {
                            if let Some(counters) =
                                current.as_mut().and_then(|s| s.counters.as_mut())
                            {
                                counters.tickets = String::from_utf8_lossy(&attr.value).parse().ok();
                            }
                        }
                    }
                }
                _ => {}
            },
            Event::End(ref e) => match e.name().as_ref() {
                b"counters" => in_counters = false,
                b"system" => {
                    if let Some(system) = current.take() {
                        config.systems.push(system);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(config)
}

/// Parse a `.cfg` file from disk, returning `None` when absent.
pub fn parse_config_file(path: &Path) -> Result<Option<ConfigFileRecord>, XmlError> {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    parse_config(std::io::BufReader::new(file)).map(Some)
}
