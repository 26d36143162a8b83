//! Support-file parsing: history/mameinfo free text, text `.dat` files, and
//! category `.ini` folders.
//!
//! Everything here is pure parsing over already-read input or single files;
//! caching of loaded folders and dats lives with the caller.

pub mod cats;
pub mod dat;
pub mod error;
pub mod mameinfo;
pub mod sections;

pub use cats::{CategoryFolder, CategorySections};
pub use dat::{HistoryDb, parse_info_dat};
pub use error::SupportError;
pub use mameinfo::MameInfoEntry;
pub use sections::{HistoryEntry, split_info_sections};
