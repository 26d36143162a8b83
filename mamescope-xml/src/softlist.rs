//! Parser for MAME software list XML (the hash `.xml` files, also the
//! output of `-getsoftlist`).

use std::io::BufRead;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use mamescope_core::util::parse_int_loose;
use mamescope_core::{DumpStatus, SoftwareBasename, SoftwareListBasename, SoftwareSupport};

use crate::error::XmlError;

/// Byte order of a data area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

impl Default for Endianness {
    fn default() -> Self {
        Self::Little
    }
}

/// A `<rom>` inside a data area. Unlike machine ROMs these may be partial
/// loads with flags (`fill`, `continue`, ...) and no name.
#[derive(Debug, Clone, Default)]
pub struct SoftRomRecord {
    pub name: Option<String>,
    pub size: Option<u64>,
    pub crc: Option<u32>,
    pub sha1: Option<String>,
    /// Offset where this file is loaded into the overall ROM.
    pub offset: Option<u64>,
    /// Used with certain load flags, e.g. the byte for `fill`.
    pub value: Option<String>,
    pub status: DumpStatus,
    pub load_flag: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DataAreaRecord {
    pub name: String,
    pub size: Option<u64>,
    /// Must be 8, 16, 32, or 64.
    pub width: u32,
    pub endianness: Endianness,
    pub roms: Vec<SoftRomRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct SoftDiskRecord {
    pub name: String,
    pub sha1: Option<String>,
    pub status: DumpStatus,
    pub is_writeable: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DiskAreaRecord {
    pub name: String,
    pub disks: Vec<SoftDiskRecord>,
}

/// Software dipswitches (e.g. bootleg NES carts) have values but no
/// locations, unlike machine dipswitches.
#[derive(Debug, Clone, Default)]
pub struct SoftDipswitchRecord {
    pub name: String,
    pub tag: String,
    pub mask: String,
    pub values: Vec<(String, String, bool)>,
}

/// One `<part>` of a software item (a cartridge, one disk of a set, ...).
#[derive(Debug, Clone, Default)]
pub struct PartRecord {
    pub name: String,
    pub interface: String,
    /// `<feature>` name/value pairs; duplicate names allowed.
    pub features: Vec<(String, Option<String>)>,
    pub data_areas: Vec<DataAreaRecord>,
    pub disk_areas: Vec<DiskAreaRecord>,
    pub dipswitches: Vec<SoftDipswitchRecord>,
}

impl PartRecord {
    pub fn feature(&self, name: &str) -> Option<&str> {
        self.features
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }
}

/// A `<software>` entry.
#[derive(Debug, Clone, Default)]
pub struct SoftwareRecord {
    pub basename: SoftwareBasename,
    /// `cloneof`
    pub parent_basename: Option<SoftwareBasename>,
    pub supported: SoftwareSupport,
    pub description: Option<String>,
    pub raw_year: Option<String>,
    pub publisher: Option<String>,
    /// Compatibility notes for the current state of running this in MAME.
    pub notes: Option<String>,
    /// `<info>` name/value pairs; duplicate names allowed.
    pub infos: Vec<(String, Option<String>)>,
    /// `<sharedfeat>` name/value pairs.
    pub shared_features: Vec<(String, Option<String>)>,
    pub parts: Vec<PartRecord>,
}

impl SoftwareRecord {
    /// Human readable name, falling back to the basename.
    pub fn name(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.basename)
    }

    pub fn year(&self) -> Option<i64> {
        parse_int_loose(self.raw_year.as_deref()?)
    }

    /// First value for an `<info>` name.
    pub fn info(&self, name: &str) -> Option<&str> {
        self.infos
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    /// First value for a `<sharedfeat>` name.
    pub fn shared_feature(&self, name: &str) -> Option<&str> {
        self.shared_features
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn part(&self, name: &str) -> Option<&PartRecord> {
        self.parts.iter().find(|p| p.name == name)
    }

    /// The single part, when there is exactly one.
    pub fn only_part(&self) -> Option<&PartRecord> {
        match self.parts.as_slice() {
            [part] => Some(part),
            _ => None,
        }
    }
}

/// A fully parsed `<softwarelist>` document.
#[derive(Debug, Clone, Default)]
pub struct SoftwareListRecord {
    pub basename: SoftwareListBasename,
    pub description: Option<String>,
    pub software: Vec<SoftwareRecord>,
}

impl SoftwareListRecord {
    /// Human readable name, falling back to the basename.
    pub fn name(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.basename)
    }

    pub fn get(&self, basename: &str) -> Option<&SoftwareRecord> {
        self.software.iter().find(|s| s.basename == basename)
    }
}

/// Parse a software list document.
pub fn parse_software_list<R: BufRead>(reader: R) -> Result<SoftwareListRecord, XmlError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut list = SoftwareListRecord::default();
    let mut found = false;
    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"softwarelist" => {
                    found = true;
                    for attr in e.attributes() {
                        let attr = attr?;
                        let value = String::from_utf8_lossy(&attr.value).into_owned();
                        match attr.key.as_ref() {
                            b"name" => list.basename = value,
                            b"description" => list.description = Some(value),
                            _ => {}
                        }
                    }
                }
                b"software" => list.software.push(parse_software(&mut xml, e)?),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !found {
        return Err(XmlError::invalid_listing("No <softwarelist> element found"));
    }
    Ok(list)
}

/// Parse a software list file from disk.
pub fn parse_software_list_file(path: &Path) -> Result<SoftwareListRecord, XmlError> {
    let file = std::fs::File::open(path)?;
    parse_software_list(std::io::BufReader::new(file))
}

fn parse_software<R: BufRead>(
    xml: &mut Reader<R>,
    start: &BytesStart<'_>,
) -> Result<SoftwareRecord, XmlError> {
    let mut software = SoftwareRecord::default();
    for attr in start.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match attr.key.as_ref() {
            b"name" => software.basename = value,
            b"cloneof" => software.parent_basename = Some(value),
            b"supported" => software.supported = SoftwareSupport::from_str_loose(&value),
            _ => {}
        }
    }

    let mut buf = Vec::new();
    let mut current_tag: Vec<u8> = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"description" | b"year" | b"publisher" | b"notes" => {
                    current_tag = e.name().as_ref().to_vec();
                }
                b"part" => software.parts.push(parse_part(xml, e)?),
                b"info" => software.infos.push(parse_name_value(e)?),
                b"sharedfeat" => software.shared_features.push(parse_name_value(e)?),
                _ => {}
            },
            Event::Empty(ref e) => match e.name().as_ref() {
                b"info" => software.infos.push(parse_name_value(e)?),
                b"sharedfeat" => software.shared_features.push(parse_name_value(e)?),
                _ => {}
            },
            Event::Text(ref e) => {
                let text = e.unescape()?.into_owned();
                match current_tag.as_slice() {
                    b"description" => software.description = Some(text),
                    b"year" => software.raw_year = Some(text),
                    b"publisher" => software.publisher = Some(text),
                    b"notes" => software.notes = Some(text),
                    _ => {}
                }
            }
            Event::End(ref e) => {
                if e.name().as_ref() == b"software" {
                    break;
                }
                current_tag.clear();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(software)
}

fn parse_name_value(e: &BytesStart<'_>) -> Result<(String, Option<String>), XmlError> {
    let mut name = String::new();
    let mut value = None;
    for attr in e.attributes() {
        let attr = attr?;
        let attr_value = String::from_utf8_lossy(&attr.value).into_owned();
        match attr.key.as_ref() {
            b"name" => name = attr_value,
            b"value" => value = Some(attr_value),
            _ => {}
        }
    }
    Ok((name, value))
}

fn parse_part<R: BufRead>(
    xml: &mut Reader<R>,
    start: &BytesStart<'_>,
) -> Result<PartRecord, XmlError> {
    let mut part = PartRecord::default();
    for attr in start.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match attr.key.as_ref() {
            b"name" => part.name = value,
            b"interface" => part.interface = value,
            _ => {}
        }
    }

    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"dataarea" => part.data_areas.push(parse_data_area(xml, e)?),
                b"diskarea" => part.disk_areas.push(parse_disk_area(xml, e)?),
                b"dipswitch" => part.dipswitches.push(parse_soft_dipswitch(xml, e)?),
                b"feature" => part.features.push(parse_name_value(e)?),
                _ => {}
            },
            Event::Empty(ref e) => {
                if e.name().as_ref() == b"feature" {
                    part.features.push(parse_name_value(e)?);
                }
            }
            Event::End(ref e) if e.name().as_ref() == b"part" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(part)
}

fn parse_data_area<R: BufRead>(
    xml: &mut Reader<R>,
    start: &BytesStart<'_>,
) -> Result<DataAreaRecord, XmlError> {
    let mut area = DataAreaRecord {
        width: 8,
        ..Default::default()
    };
    for attr in start.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"name" => area.name = value.into_owned(),
            b"size" => area.size = parse_int_loose(&value).map(|v| v as u64),
            b"width" => area.width = value.parse().unwrap_or(8),
            b"endianness" => {
                area.endianness = if value.as_ref() == "big" {
                    Endianness::Big
                } else {
                    Endianness::Little
                }
            }
            _ => {}
        }
    }

    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == b"rom" => {
                area.roms.push(parse_soft_rom(e)?);
            }
            Event::End(ref e) if e.name().as_ref() == b"dataarea" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(area)
}

fn parse_soft_rom(e: &BytesStart<'_>) -> Result<SoftRomRecord, XmlError> {
    let mut rom = SoftRomRecord::default();
    for attr in e.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"name" => rom.name = Some(value.into_owned()),
            b"size" => rom.size = parse_int_loose(&value).map(|v| v as u64),
            b"crc" => rom.crc = u32::from_str_radix(&value, 16).ok(),
            b"sha1" => rom.sha1 = Some(value.to_lowercase()),
            b"offset" => rom.offset = parse_int_loose(&value).map(|v| v as u64),
            b"value" => rom.value = Some(value.into_owned()),
            b"status" => rom.status = DumpStatus::from_str_loose(&value),
            b"loadflag" => rom.load_flag = Some(value.into_owned()),
            _ => {}
        }
    }
    Ok(rom)
}

fn parse_disk_area<R: BufRead>(
    xml: &mut Reader<R>,
    start: &BytesStart<'_>,
) -> Result<DiskAreaRecord, XmlError> {
    let mut area = DiskAreaRecord::default();
    for attr in start.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"name" {
            area.name = String::from_utf8_lossy(&attr.value).into_owned();
        }
    }

    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == b"disk" => {
                let mut disk = SoftDiskRecord::default();
                for attr in e.attributes() {
                    let attr = attr?;
                    let value = String::from_utf8_lossy(&attr.value);
                    match attr.key.as_ref() {
                        b"name" => disk.name = value.into_owned(),
                        b"sha1" => disk.sha1 = Some(value.to_lowercase()),
                        b"status" => disk.status = DumpStatus::from_str_loose(&value),
                        b"writeable" => disk.is_writeable = value.as_ref() == "yes",
                        _ => {}
                    }
                }
                area.disks.push(disk);
            }
            Event::End(ref e) if e.name().as_ref() == b"diskarea" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(area)
}

fn parse_soft_dipswitch<R: BufRead>(
    xml: &mut Reader<R>,
    start: &BytesStart<'_>,
) -> Result<SoftDipswitchRecord, XmlError> {
    let mut dipswitch = SoftDipswitchRecord::default();
    for attr in start.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match attr.key.as_ref() {
            b"name" => dipswitch.name = value,
            b"tag" => dipswitch.tag = value,
            b"mask" => dipswitch.mask = value,
            _ => {}
        }
    }

    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == b"dipvalue" => {
                let mut name = String::new();
                let mut value = String::new();
                let mut is_default = false;
                for attr in e.attributes() {
                    let attr = attr?;
                    let attr_value = String::from_utf8_lossy(&attr.value).into_owned();
                    match attr.key.as_ref() {
                        b"name" => name = attr_value,
                        b"value" => value = attr_value,
                        b"default" => is_default = attr_value == "yes",
                        _ => {}
                    }
                }
                dipswitch.values.push((name, value, is_default));
            }
            Event::End(ref e) if e.name().as_ref() == b"dipswitch" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(dipswitch)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_SOFTLIST: &str = r#"<?xml version="1.0"?>
<softwarelist name="nes" description="Nintendo Entertainment System cartridges">
    <software name="smb">
        <description>Super Mario Bros.</description>
        <year>1985</year>
        <publisher>Nintendo</publisher>
        <info name="serial" value="NES-SM-USA"/>
        <info name="alt_title" value="スーパーマリオブラザーズ"/>
        <part name="cart" interface="nes_cart">
            <feature name="slot" value="nrom"/>
            <dataarea name="prg" size="32768">
                <rom name="smb-prg" size="32768" crc="5cf548d3" sha1="fefa1097449a3a11ebf8c6199e905996c5dc8fbd"/>
            </dataarea>
            <dataarea name="chr" size="8192" width="16" endianness="big">
                <rom name="smb-chr" size="8192" crc="867b51ad" sha1="394badaf0b0bdd0ea279a1bca89a9d9ddc00b1b5"/>
            </dataarea>
        </part>
    </software>
    <software name="smbb" cloneof="smb" supported="partial">
        <description>Super Mario Bros. (bootleg)</description>
        <year>1986</year>
        <publisher>&lt;bootleg&gt;</publisher>
        <notes>
Graphics glitches on level 4-2
        </notes>
        <part name="cart" interface="nes_cart">
            <dataarea name="prg" size="32768">
                <rom size="32768" status="nodump"/>
            </dataarea>
            <dipswitch name="Lives" tag="dsw" mask="1">
                <dipvalue name="3" value="0" default="yes"/>
                <dipvalue name="5" value="1"/>
            </dipswitch>
        </part>
    </software>
</softwarelist>"#;

    fn sample() -> SoftwareListRecord {
        parse_software_list(SAMPLE_SOFTLIST.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_list_header() {
        let list = sample();
        assert_eq!(list.basename, "nes");
        assert_eq!(list.name(), "Nintendo Entertainment System cartridges");
        assert_eq!(list.software.len(), 2);
    }

    #[test]
    fn test_parse_software_entry() {
        let list = sample();
        let smb = list.get("smb").unwrap();
        assert_eq!(smb.name(), "Super Mario Bros.");
        assert_eq!(smb.year(), Some(1985));
        assert_eq!(smb.publisher.as_deref(), Some("Nintendo"));
        assert_eq!(smb.supported, SoftwareSupport::Supported);
        assert_eq!(smb.info("serial"), Some("NES-SM-USA"));
        assert_eq!(smb.info("nonexistent"), None);
    }

    #[test]
    fn test_parse_parts_and_areas() {
        let list = sample();
        let smb = list.get("smb").unwrap();
        assert_eq!(smb.parts.len(), 1);
        let part = smb.only_part().unwrap();
        assert_eq!(part.interface, "nes_cart");
        assert_eq!(part.feature("slot"), Some("nrom"));
        assert_eq!(part.data_areas.len(), 2);
        assert_eq!(part.data_areas[0].width, 8);
        assert_eq!(part.data_areas[1].width, 16);
        assert_eq!(part.data_areas[1].endianness, Endianness::Big);
        assert_eq!(part.data_areas[0].roms[0].crc, Some(0x5cf548d3));
    }

    #[test]
    fn test_parse_clone_with_partial_support() {
        let list = sample();
        let bootleg = list.get("smbb").unwrap();
        assert_eq!(bootleg.parent_basename.as_deref(), Some("smb"));
        assert_eq!(bootleg.supported, SoftwareSupport::Partial);
        assert!(bootleg.notes.as_deref().unwrap().contains("level 4-2"));

        let part = bootleg.only_part().unwrap();
        assert_eq!(part.data_areas[0].roms[0].status, DumpStatus::NoDump);
        assert_eq!(part.data_areas[0].roms[0].name, None);
        assert_eq!(part.dipswitches[0].values.len(), 2);
    }

    #[test]
    fn test_missing_list_element_is_an_error() {
        let result = parse_software_list(r#"<?xml version="1.0"?><other/>"#.as_bytes());
        assert!(result.is_err());
    }
}
