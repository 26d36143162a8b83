//! Composite views over MAME's metadata: machine and software lookups that
//! join the `-listxml` records with category folders, history/mameinfo
//! documentation, play-time tracking, and user data.
//!
//! The parsers live in the sibling crates; this crate owns settings
//! resolution, subprocess invocation, the path-keyed cache, and the views
//! themselves. Every lookup has a blocking surface and an async surface
//! that offloads the same synchronous core to a worker thread.

pub mod cache;
pub mod commands;
pub mod error;
pub mod machine;
pub mod mame;
pub mod settings;
pub mod software;
pub mod userdata;

pub use cache::{DataCache, MachineFile};
pub use commands::MameExecutable;
pub use error::Error;
pub use machine::{Machine, get_machine, get_machine_async};
pub use mame::Mame;
pub use settings::MameSettings;
pub use software::{Software, SoftwareList, get_software_list, get_software_list_async};
