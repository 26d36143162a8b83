//! Parser for MAME `-listxml` output.
//!
//! Machine elements are mapped into plain value records in a single pass,
//! so downstream code works with typed optional fields instead of poking at
//! the XML tree. Attribute-level problems (unparsable numbers, unknown
//! enumerated values) degrade to `None` or a documented default — listing
//! data is end-user managed and varies across MAME versions.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use mamescope_core::util::parse_int_loose;
use mamescope_core::{
    Basename, DriverStatus, DumpStatus, FeatureStatus, SoftwareListBasename, SoftwareListKind,
};

use crate::error::XmlError;

/// A single BIOS option (`<biosset>`).
#[derive(Debug, Clone, Default)]
pub struct BiosSetRecord {
    pub name: String,
    /// Human readable name.
    pub description: String,
    pub is_default: bool,
}

/// A `<rom>` entry of a machine.
#[derive(Debug, Clone, Default)]
pub struct RomRecord {
    pub name: String,
    pub size: Option<u64>,
    /// CRC32, parsed from hex.
    pub crc: Option<u32>,
    /// SHA1 as lowercase hex, if present.
    pub sha1: Option<String>,
    /// Name of the file in the parent set this merges with.
    pub merge: Option<String>,
    pub region: Option<String>,
    pub offset: u64,
    /// Which BIOS option this ROM belongs to, if any.
    pub part_of_bios: Option<String>,
    pub status: DumpStatus,
    pub is_optional: bool,
}

/// A `<disk>` (CHD) entry of a machine.
#[derive(Debug, Clone, Default)]
pub struct DiskRecord {
    pub name: String,
    pub sha1: Option<String>,
    pub merge: Option<String>,
    pub region: Option<String>,
    pub index: Option<u32>,
    pub is_writable: bool,
    pub status: DumpStatus,
    pub is_optional: bool,
}

/// CPU or audio chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipKind {
    Cpu,
    Audio,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct ChipRecord {
    pub name: String,
    pub tag: Option<String>,
    pub kind: ChipKind,
    /// Hz
    pub clock_speed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    Raster,
    Vector,
    Lcd,
    Svg,
    Unknown,
}

impl DisplayKind {
    fn from_str_loose(s: &str) -> Self {
        match s {
            "raster" => Self::Raster,
            "vector" => Self::Vector,
            "lcd" => Self::Lcd,
            "svg" => Self::Svg,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DisplayRecord {
    pub tag: Option<String>,
    pub kind: Option<DisplayKind>,
    /// Always one of 0, 90, 180, 270 (or absent).
    pub rotation: Option<u32>,
    pub flip_x: bool,
    /// Pixels
    pub width: Option<u32>,
    /// Pixels
    pub height: Option<u32>,
    /// Hz
    pub refresh_rate: Option<f64>,
}

impl DisplayRecord {
    /// Total pixel count, when dimensions are known.
    pub fn resolution(&self) -> Option<u64> {
        Some(u64::from(self.width?) * u64::from(self.height?))
    }

    /// Reduced aspect ratio, e.g. 640×480 → (4, 3).
    pub fn aspect_ratio(&self) -> Option<(u32, u32)> {
        mamescope_core::util::reduce_ratio(self.width?, self.height?)
    }
}

/// One `<control>` inside `<input>`.
#[derive(Debug, Clone, Default)]
pub struct ControlRecord {
    pub control_type: String,
    pub buttons: u32,
    pub required_buttons: u32,
    /// Which player this control is for, starting at 1.
    pub player: u32,
    /// Raw joystick ways value ("8", "vertical2", "3 (half4)", ...).
    pub ways: Option<String>,
    pub is_reversed: bool,
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
    pub sensitivity: Option<i64>,
    pub keydelta: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct InputRecord {
    pub coin_slots: Option<u32>,
    pub players: Option<u32>,
    pub has_service: bool,
    pub has_tilt: bool,
    pub controls: Vec<ControlRecord>,
}

impl InputRecord {
    pub fn control_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for control in &self.controls {
            if !types.contains(&control.control_type.as_str()) {
                types.push(&control.control_type);
            }
        }
        types
    }
}

#[derive(Debug, Clone, Default)]
pub struct DipValueRecord {
    pub name: String,
    pub value: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DipLocationRecord {
    pub name: String,
    pub number: String,
    pub is_inverted: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DipswitchRecord {
    pub name: String,
    pub tag: String,
    pub mask: String,
    pub values: Vec<DipValueRecord>,
    pub locations: Vec<DipLocationRecord>,
}

impl DipswitchRecord {
    pub fn default_value(&self) -> Option<&DipValueRecord> {
        self.values.iter().find(|v| v.is_default)
    }
}

/// The `<driver>` element: emulation status plus the flags added in
/// MAME 0.229 (absent in older listings, so they default to "fine").
#[derive(Debug, Clone, Default)]
pub struct DriverRecord {
    pub status: Option<DriverStatus>,
    pub emulation_status: Option<DriverStatus>,
    pub savestate_supported: bool,
    pub cocktail_status: Option<DriverStatus>,
    pub requires_artwork: bool,
    pub is_unofficial: bool,
    pub no_sound_hardware: bool,
    pub is_incomplete: bool,
}

#[derive(Debug, Clone)]
pub struct FeatureRecord {
    pub feature_type: String,
    pub status: Option<FeatureStatus>,
}

/// A media slot: `<device>` underneath `<machine>`, which despite the name
/// is not a device machine.
#[derive(Debug, Clone, Default)]
pub struct MediaSlotRecord {
    pub slot_type: String,
    pub tag: Option<String>,
    pub is_fixed_image: bool,
    pub is_mandatory: bool,
    /// Might be comma separated.
    pub interface: Option<String>,
    pub instance_name: Option<String>,
    pub instance_briefname: Option<String>,
    /// File extensions intended to be used.
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SlotOptionRecord {
    pub name: String,
    /// Basename of the device machine for this option.
    pub device_name: Basename,
    pub is_default: bool,
}

/// A pluggable slot, as with `-listslots`.
#[derive(Debug, Clone, Default)]
pub struct SlotRecord {
    pub name: String,
    pub options: Vec<SlotOptionRecord>,
}

impl SlotRecord {
    pub fn default_option(&self) -> Option<&SlotOptionRecord> {
        self.options.iter().find(|o| o.is_default)
    }
}

/// `<softwarelist>` reference inside a machine.
#[derive(Debug, Clone)]
pub struct SoftwareListRef {
    pub tag: Option<String>,
    pub name: SoftwareListBasename,
    pub kind: SoftwareListKind,
    /// Software must have this in its compatibility feature; a leading `!`
    /// inverts the filter.
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RamOptionRecord {
    pub name: String,
    pub is_default: bool,
    /// Bytes, from the element text.
    pub size: Option<u64>,
}

/// A fully parsed `<machine>` element.
#[derive(Debug, Clone, Default)]
pub struct MachineRecord {
    pub basename: Basename,
    /// `cloneof`
    pub parent_basename: Option<Basename>,
    /// `romof`. For a clone set this repeats the parent basename even when
    /// the true BIOS belongs to the parent — resolve through the parent.
    pub bios_basename: Option<Basename>,
    /// `sampleof`
    pub sample_set_basename: Option<Basename>,
    pub source_file: Option<String>,
    pub is_bios: bool,
    pub is_device: bool,
    pub is_mechanical: bool,
    pub is_runnable: bool,
    pub description: Option<String>,
    /// May include `?` or `x`; not necessarily present on devices.
    pub raw_year: Option<String>,
    pub manufacturer: Option<String>,
    pub bios_sets: Vec<BiosSetRecord>,
    pub roms: Vec<RomRecord>,
    pub disks: Vec<DiskRecord>,
    pub device_refs: Vec<Basename>,
    pub samples: Vec<String>,
    pub chips: Vec<ChipRecord>,
    pub displays: Vec<DisplayRecord>,
    pub sound_channels: Option<u32>,
    pub input: Option<InputRecord>,
    pub dipswitches: Vec<DipswitchRecord>,
    pub driver: Option<DriverRecord>,
    pub features: Vec<FeatureRecord>,
    pub media_slots: Vec<MediaSlotRecord>,
    pub slots: Vec<SlotRecord>,
    pub software_lists: Vec<SoftwareListRef>,
    pub ram_options: Vec<RamOptionRecord>,
}

impl MachineRecord {
    /// Human readable name, falling back to the basename when the listing
    /// has no description.
    pub fn name(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.basename)
    }

    pub fn year(&self) -> Option<i64> {
        parse_int_loose(self.raw_year.as_deref()?)
    }

    pub fn number_of_coin_slots(&self) -> u32 {
        self.input.as_ref().and_then(|i| i.coin_slots).unwrap_or(0)
    }

    pub fn number_of_players(&self) -> u32 {
        self.input.as_ref().and_then(|i| i.players).unwrap_or(0)
    }

    pub fn default_bios(&self) -> Option<&BiosSetRecord> {
        self.bios_sets.iter().find(|b| b.is_default)
    }

    /// Per-feature statuses; features without a status are omitted.
    pub fn feature_statuses(&self) -> HashMap<&str, FeatureStatus> {
        self.features
            .iter()
            .filter_map(|f| Some((f.feature_type.as_str(), f.status?)))
            .collect()
    }

    pub fn has_mandatory_slots(&self) -> bool {
        self.media_slots.iter().any(|slot| slot.is_mandatory)
    }

    pub fn cpus(&self) -> impl Iterator<Item = &ChipRecord> {
        self.chips.iter().filter(|c| c.kind == ChipKind::Cpu)
    }

    pub fn audio_chips(&self) -> impl Iterator<Item = &ChipRecord> {
        self.chips.iter().filter(|c| c.kind == ChipKind::Audio)
    }
}

/// Parse every `<machine>` element from `-listxml` output.
pub fn parse_machines<R: BufRead>(reader: R) -> Result<Vec<MachineRecord>, XmlError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut machines = Vec::new();
    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) if e.name().as_ref() == b"machine" => {
                machines.push(parse_machine(&mut xml, e)?);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(machines)
}

/// Parse a `-listxml` file from disk.
pub fn parse_machines_file(path: &Path) -> Result<Vec<MachineRecord>, XmlError> {
    let file = std::fs::File::open(path)?;
    parse_machines(std::io::BufReader::new(file))
}

fn parse_machine<R: BufRead>(
    xml: &mut Reader<R>,
    start: &BytesStart<'_>,
) -> Result<MachineRecord, XmlError> {
    let mut record = MachineRecord {
        is_runnable: true,
        ..Default::default()
    };

    for attr in start.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match attr.key.as_ref() {
            b"name" => record.basename = value,
            b"cloneof" => record.parent_basename = Some(value),
            b"romof" => record.bios_basename = Some(value),
            b"sampleof" => record.sample_set_basename = Some(value),
            b"sourcefile" => record.source_file = Some(value),
            b"isbios" => record.is_bios = value == "yes",
            b"isdevice" => record.is_device = value == "yes",
            b"ismechanical" => record.is_mechanical = value == "yes",
            b"runnable" => record.is_runnable = value != "no",
            _ => {}
        }
    }
    if record.basename.is_empty() {
        return Err(XmlError::invalid_listing("<machine> with no name"));
    }

    let mut buf = Vec::new();
    let mut current_tag: Vec<u8> = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"description" | b"year" | b"manufacturer" => {
                    current_tag = e.name().as_ref().to_vec();
                }
                b"input" => record.input = Some(parse_input(xml, e)?),
                b"device" => record.media_slots.push(parse_media_slot(xml, e)?),
                b"slot" => record.slots.push(parse_slot(xml, e)?),
                b"dipswitch" => record.dipswitches.push(parse_dipswitch(xml, e)?),
                b"ramoption" => {
                    let mut ram = parse_ram_option_attrs(e)?;
                    ram.size = parse_int_loose(&read_element_text(xml)?).map(|v| v as u64);
                    record.ram_options.push(ram);
                }
                other => {
                    // Leaf elements written as start/end pairs, plus
                    // unmodelled subtrees (port, adjuster, configuration)
                    let end = other.to_vec();
                    parse_leaf(&mut record, e)?;
                    skip_to_end(xml, &end)?;
                }
            },
            Event::Empty(ref e) => {
                parse_leaf(&mut record, e)?;
            }
            Event::Text(ref e) => {
                let text = e.unescape()?.into_owned();
                match current_tag.as_slice() {
                    b"description" => record.description = Some(text),
                    b"year" => record.raw_year = Some(text),
                    b"manufacturer" => record.manufacturer = Some(text),
                    _ => {}
                }
            }
            Event::End(ref e) => {
                if e.name().as_ref() == b"machine" {
                    break;
                }
                current_tag.clear();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if record.description.is_none() && !record.is_device {
        log::warn!("<machine> element {} has missing description", record.basename);
    }
    Ok(record)
}

/// Parse a childless element into the record. Returns false when the tag is
/// not one of the modelled leaves.
fn parse_leaf(record: &mut MachineRecord, e: &BytesStart<'_>) -> Result<bool, XmlError> {
    match e.name().as_ref() {
        b"biosset" => record.bios_sets.push(parse_biosset(e)?),
        b"rom" => record.roms.push(parse_rom(e)?),
        b"disk" => record.disks.push(parse_disk(e)?),
        b"device_ref" => {
            if let Some(name) = required_name(e)? {
                record.device_refs.push(name);
            }
        }
        b"sample" => {
            if let Some(name) = required_name(e)? {
                record.samples.push(name);
            }
        }
        b"chip" => record.chips.push(parse_chip(e)?),
        b"display" => record.displays.push(parse_display(e)?),
        b"sound" => {
            for attr in e.attributes() {
                let attr = attr?;
                if attr.key.as_ref() == b"channels" {
                    record.sound_channels =
                        parse_int_loose(&String::from_utf8_lossy(&attr.value)).map(|v| v as u32);
                }
            }
        }
        b"driver" => record.driver = Some(parse_driver(e)?),
        b"feature" => record.features.push(parse_feature(e)?),
        b"softwarelist" => {
            if let Some(list_ref) = parse_softwarelist_ref(e)? {
                record.software_lists.push(list_ref);
            }
        }
        b"ramoption" => record.ram_options.push(parse_ram_option_attrs(e)?),
        _ => return Ok(false),
    }
    Ok(true)
}

fn parse_biosset(e: &BytesStart<'_>) -> Result<BiosSetRecord, XmlError> {
    let mut bios = BiosSetRecord::default();
    for attr in e.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match attr.key.as_ref() {
            b"name" => bios.name = value,
            b"description" => bios.description = value,
            b"default" => bios.is_default = value == "yes",
            _ => {}
        }
    }
    Ok(bios)
}

fn parse_rom(e: &BytesStart<'_>) -> Result<RomRecord, XmlError> {
    let mut rom = RomRecord::default();
    for attr in e.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"name" => rom.name = value.into_owned(),
            b"size" => rom.size = value.parse().ok(),
            b"crc" => rom.crc = u32::from_str_radix(&value, 16).ok(),
            b"sha1" => rom.sha1 = Some(value.to_lowercase()),
            b"merge" => rom.merge = Some(value.into_owned()),
            b"region" => rom.region = Some(value.into_owned()),
            b"offset" => rom.offset = parse_int_loose(&value).unwrap_or(0) as u64,
            b"bios" => rom.part_of_bios = Some(value.into_owned()),
            b"status" => rom.status = DumpStatus::from_str_loose(&value),
            b"optional" => rom.is_optional = value == "yes",
            _ => {}
        }
    }
    Ok(rom)
}

fn parse_disk(e: &BytesStart<'_>) -> Result<DiskRecord, XmlError> {
    let mut disk = DiskRecord::default();
    for attr in e.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"name" => disk.name = value.into_owned(),
            b"sha1" => disk.sha1 = Some(value.to_lowercase()),
            b"merge" => disk.merge = Some(value.into_owned()),
            b"region" => disk.region = Some(value.into_owned()),
            b"index" => disk.index = value.parse().ok(),
            b"writable" => disk.is_writable = value == "yes",
            b"status" => disk.status = DumpStatus::from_str_loose(&value),
            b"optional" => disk.is_optional = value == "yes",
            _ => {}
        }
    }
    Ok(disk)
}

fn parse_chip(e: &BytesStart<'_>) -> Result<ChipRecord, XmlError> {
    let mut name = String::new();
    let mut tag = None;
    let mut kind = ChipKind::Unknown;
    let mut clock_speed = None;
    for attr in e.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"name" => name = value.into_owned(),
            b"tag" => tag = Some(value.into_owned()),
            b"type" => {
                kind = match value.as_ref() {
                    "cpu" => ChipKind::Cpu,
                    "audio" => ChipKind::Audio,
                    _ => ChipKind::Unknown,
                }
            }
            b"clock" => clock_speed = value.parse().ok(),
            _ => {}
        }
    }
    Ok(ChipRecord {
        name,
        tag,
        kind,
        clock_speed,
    })
}

fn parse_display(e: &BytesStart<'_>) -> Result<DisplayRecord, XmlError> {
    let mut display = DisplayRecord::default();
    for attr in e.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"tag" => display.tag = Some(value.into_owned()),
            b"type" => display.kind = Some(DisplayKind::from_str_loose(&value)),
            b"rotate" => display.rotation = value.parse().ok(),
            b"flipx" => display.flip_x = value.as_ref() == "yes",
            b"width" => display.width = value.parse().ok(),
            b"height" => display.height = value.parse().ok(),
            b"refresh" => display.refresh_rate = value.parse().ok(),
            _ => {}
        }
    }
    Ok(display)
}

fn parse_driver(e: &BytesStart<'_>) -> Result<DriverRecord, XmlError> {
    let mut driver = DriverRecord::default();
    for attr in e.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"status" => driver.status = DriverStatus::parse(&value),
            b"emulation" => driver.emulation_status = DriverStatus::parse(&value),
            b"savestate" => driver.savestate_supported = value.as_ref() == "supported",
            b"cocktail" => driver.cocktail_status = DriverStatus::parse(&value),
            b"requiresartwork" => driver.requires_artwork = value.as_ref() == "yes",
            b"unofficial" => driver.is_unofficial = value.as_ref() == "yes",
            b"nosoundhardware" => driver.no_sound_hardware = value.as_ref() == "yes",
            b"incomplete" => driver.is_incomplete = value.as_ref() == "yes",
            _ => {}
        }
    }
    Ok(driver)
}

fn parse_feature(e: &BytesStart<'_>) -> Result<FeatureRecord, XmlError> {
    let mut feature_type = String::new();
    let mut status = None;
    let mut overall = None;
    for attr in e.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"type" => feature_type = value.into_owned(),
            b"status" => status = FeatureStatus::parse(&value),
            b"overall" => overall = FeatureStatus::parse(&value),
            _ => {}
        }
    }
    // A feature carries either status or overall, not both
    Ok(FeatureRecord {
        feature_type,
        status: status.or(overall),
    })
}

fn parse_softwarelist_ref(e: &BytesStart<'_>) -> Result<Option<SoftwareListRef>, XmlError> {
    let mut tag = None;
    let mut name = None;
    let mut kind = SoftwareListKind::Original;
    let mut filter = None;
    for attr in e.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match attr.key.as_ref() {
            b"tag" => tag = Some(value),
            b"name" => name = Some(value),
            b"status" => kind = SoftwareListKind::from_str_loose(&value),
            b"filter" => filter = Some(value),
            _ => {}
        }
    }
    Ok(name.map(|name| SoftwareListRef {
        tag,
        name,
        kind,
        filter,
    }))
}

fn parse_ram_option_attrs(e: &BytesStart<'_>) -> Result<RamOptionRecord, XmlError> {
    let mut ram = RamOptionRecord::default();
    for attr in e.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match attr.key.as_ref() {
            b"name" => ram.name = value,
            b"default" => ram.is_default = value == "yes",
            _ => {}
        }
    }
    Ok(ram)
}

fn parse_input<R: BufRead>(
    xml: &mut Reader<R>,
    start: &BytesStart<'_>,
) -> Result<InputRecord, XmlError> {
    let mut input = InputRecord::default();
    for attr in start.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"coins" => input.coin_slots = value.parse().ok(),
            b"players" => input.players = value.parse().ok(),
            b"service" => input.has_service = value.as_ref() == "yes",
            b"tilt" => input.has_tilt = value.as_ref() == "yes",
            _ => {}
        }
    }

    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == b"control" => {
                input.controls.push(parse_control(e)?);
            }
            Event::End(ref e) if e.name().as_ref() == b"input" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(input)
}

fn parse_control(e: &BytesStart<'_>) -> Result<ControlRecord, XmlError> {
    let mut control = ControlRecord {
        player: 1,
        ..Default::default()
    };
    for attr in e.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"type" => control.control_type = value.into_owned(),
            b"buttons" => control.buttons = value.parse().unwrap_or(0),
            b"reqbuttons" => control.required_buttons = value.parse().unwrap_or(0),
            b"player" => control.player = value.parse().unwrap_or(1),
            b"ways" => control.ways = Some(value.into_owned()),
            b"reverse" => control.is_reversed = value.as_ref() == "yes",
            b"minimum" => control.minimum = parse_int_loose(&value),
            b"maximum" => control.maximum = parse_int_loose(&value),
            b"sensitivity" => control.sensitivity = parse_int_loose(&value),
            b"keydelta" => control.keydelta = parse_int_loose(&value),
            _ => {}
        }
    }
    Ok(control)
}

fn parse_media_slot<R: BufRead>(
    xml: &mut Reader<R>,
    start: &BytesStart<'_>,
) -> Result<MediaSlotRecord, XmlError> {
    let mut slot = MediaSlotRecord::default();
    for attr in start.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match attr.key.as_ref() {
            b"type" => slot.slot_type = value,
            b"tag" => slot.tag = Some(value),
            b"fixed_image" => slot.is_fixed_image = value == "1",
            b"mandatory" => slot.is_mandatory = value == "1",
            b"interface" => slot.interface = Some(value),
            _ => {}
        }
    }

    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) => match e.name().as_ref() {
                b"instance" => {
                    for attr in e.attributes() {
                        let attr = attr?;
                        let value = String::from_utf8_lossy(&attr.value).into_owned();
                        match attr.key.as_ref() {
                            b"name" => slot.instance_name = Some(value),
                            b"briefname" => slot.instance_briefname = Some(value),
                            _ => {}
                        }
                    }
                }
                b"extension" => {
                    if let Some(name) = required_name(e)? {
                        slot.extensions.push(name);
                    }
                }
                _ => {}
            },
            Event::End(ref e) if e.name().as_ref() == b"device" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(slot)
}

fn parse_slot<R: BufRead>(
    xml: &mut Reader<R>,
    start: &BytesStart<'_>,
) -> Result<SlotRecord, XmlError> {
    let mut slot = SlotRecord::default();
    for attr in start.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"name" {
            slot.name = String::from_utf8_lossy(&attr.value).into_owned();
        }
    }

    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == b"slotoption" => {
                let mut option = SlotOptionRecord::default();
                for attr in e.attributes() {
                    let attr = attr?;
                    let value = String::from_utf8_lossy(&attr.value).into_owned();
                    match attr.key.as_ref() {
                        b"name" => option.name = value,
                        b"devname" => option.device_name = value,
                        b"default" => option.is_default = value == "yes",
                        _ => {}
                    }
                }
                slot.options.push(option);
            }
            Event::End(ref e) if e.name().as_ref() == b"slot" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(slot)
}

fn parse_dipswitch<R: BufRead>(
    xml: &mut Reader<R>,
    start: &BytesStart<'_>,
) -> Result<DipswitchRecord, XmlError> {
    let mut dipswitch = DipswitchRecord::default();
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
            Event::Start(ref e) | Event::Empty(ref e) => match e.name().as_ref() {
                b"dipvalue" => {
                    let mut dipvalue = DipValueRecord::default();
                    for attr in e.attributes() {
                        let attr = attr?;
                        let value = String::from_utf8_lossy(&attr.value).into_owned();
                        match attr.key.as_ref() {
                            b"name" => dipvalue.name = value,
                            b"value" => dipvalue.value = value,
                            b"default" => dipvalue.is_default = value == "yes",
                            _ => {}
                        }
                    }
                    dipswitch.values.push(dipvalue);
                }
                b"diplocation" => {
                    let mut location = DipLocationRecord::default();
                    for attr in e.attributes() {
                        let attr = attr?;
                        let value = String::from_utf8_lossy(&attr.value).into_owned();
                        match attr.key.as_ref() {
                            b"name" => location.name = value,
                            b"number" => location.number = value,
                            b"inverted" => location.is_inverted = value == "yes",
                            _ => {}
                        }
                    }
                    dipswitch.locations.push(location);
                }
                _ => {}
            },
            Event::End(ref e) if e.name().as_ref() == b"dipswitch" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(dipswitch)
}

fn required_name(e: &BytesStart<'_>) -> Result<Option<String>, XmlError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"name" {
            return Ok(Some(String::from_utf8_lossy(&attr.value).into_owned()));
        }
    }
    Ok(None)
}

/// Read and discard events until the matching end tag.
fn skip_to_end<R: BufRead>(xml: &mut Reader<R>, end: &[u8]) -> Result<(), XmlError> {
    let mut buf = Vec::new();
    let mut depth = 0u32;
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) if e.name().as_ref() == end => depth += 1,
            Event::End(ref e) if e.name().as_ref() == end => {
                if depth == 0 {
                    return Ok(());
                }
                depth -= 1;
            }
            Event::Eof => return Ok(()),
            _ => {}
        }
        buf.clear();
    }
}

/// Read text content until the current element's end tag.
fn read_element_text<R: BufRead>(xml: &mut Reader<R>) -> Result<String, XmlError> {
    let mut buf = Vec::new();
    let mut text = String::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Text(ref e) => text.push_str(&e.unescape()?),
            Event::End(_) | Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}
