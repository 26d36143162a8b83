//! Typed record parsers for MAME's XML surfaces.
//!
//! Each parser maps an XML document into plain value structs in one pass —
//! `-listxml` machine listings, software list hash files, `history.xml`,
//! and per-machine `.cfg` files.

pub mod config;
pub mod error;
pub mod history;
pub mod machine;
pub mod softlist;

pub use config::{ConfigFileRecord, CountersRecord, SystemConfigRecord};
pub use error::XmlError;
pub use history::{HistoryEntryRecord, HistoryXml};
pub use machine::{
    BiosSetRecord, ChipKind, ChipRecord, ControlRecord, DipswitchRecord, DiskRecord,
    DisplayKind, DisplayRecord, DriverRecord, FeatureRecord, InputRecord, MachineRecord,
    MediaSlotRecord, RamOptionRecord, RomRecord, SlotOptionRecord, SlotRecord, SoftwareListRef,
};
pub use softlist::{
    DataAreaRecord, DiskAreaRecord, Endianness, PartRecord, SoftRomRecord, SoftwareListRecord,
    SoftwareRecord,
};
