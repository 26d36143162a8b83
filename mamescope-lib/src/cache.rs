//! Process-lifetime caches for loaded support data, keyed by canonicalized
//! path.
//!
//! The cache is an explicit object injected into the views rather than
//! ambient global memoization, so tests get fresh state by constructing a
//! fresh cache. Each resource has its own slot guard: the guard is acquired
//! before the "is it cached yet" check and released after the slot is
//! populated, so the first concurrent caller performs the load and everyone
//! else observes the cached result. Entries are write-once `Arc`s; a failed
//! load leaves the slot empty so a later call can retry.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use mamescope_core::Basename;
use mamescope_db::TimerDb;
use mamescope_support::{CategoryFolder, HistoryDb, parse_info_dat};
use mamescope_xml::machine::parse_machines_file;
use mamescope_xml::{HistoryXml, MachineRecord, SoftwareListRecord};

use crate::error::Error;
use crate::userdata::load_favourites;

/// A parsed `-listxml` file: machine records in file order plus a basename
/// index.
#[derive(Debug, Default)]
pub struct MachineFile {
    order: Vec<Arc<MachineRecord>>,
    by_basename: HashMap<Basename, Arc<MachineRecord>>,
}

impl MachineFile {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let mut file = MachineFile::default();
        for record in parse_machines_file(path)? {
            let record = Arc::new(record);
            file.by_basename
                .entry(record.basename.clone())
                .or_insert_with(|| record.clone());
            file.order.push(record);
        }
        Ok(file)
    }

    pub fn get(&self, basename: &str) -> Option<&Arc<MachineRecord>> {
        self.by_basename.get(basename)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<MachineRecord>> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Text dat contents: basename → entry text.
pub type InfoDat = HashMap<Basename, Arc<str>>;

struct Registry<T> {
    slots: Mutex<HashMap<PathBuf, Arc<Mutex<Option<Arc<T>>>>>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> Registry<T> {
    /// Fetch or create the slot for a path. The outer lock only guards the
    /// slot table; loads happen under the per-slot lock.
    fn slot(&self, path: &Path) -> Arc<Mutex<Option<Arc<T>>>> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.entry(key).or_default().clone()
    }

    fn get_or_load(
        &self,
        path: &Path,
        load: impl FnOnce(&Path) -> Result<T, Error>,
    ) -> Result<Arc<T>, Error> {
        let slot = self.slot(path);
        let mut guard = slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(value) = guard.as_ref() {
            return Ok(value.clone());
        }
        let value = Arc::new(load(path)?);
        *guard = Some(value.clone());
        Ok(value)
    }
}

/// All path-keyed caches, shared by every view constructed from one [`Mame`].
///
/// [`Mame`]: crate::Mame
#[derive(Default)]
pub struct DataCache {
    machine_files: Registry<MachineFile>,
    software_lists: Registry<SoftwareListRecord>,
    category_folders: Registry<CategoryFolder>,
    timer_dbs: Registry<Option<TimerDb>>,
    info_dats: Registry<InfoDat>,
    history_dbs: Registry<Option<HistoryDb>>,
    favourites: Registry<Option<HashSet<Basename>>>,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn machine_file(&self, path: &Path) -> Result<Arc<MachineFile>, Error> {
        self.machine_files.get_or_load(path, MachineFile::load)
    }

    pub fn software_list_file(&self, path: &Path) -> Result<Arc<SoftwareListRecord>, Error> {
        self.software_lists
            .get_or_load(path, |p| Ok(mamescope_xml::softlist::parse_software_list_file(p)?))
    }

    pub fn category_folder(&self, path: &Path) -> Result<Arc<CategoryFolder>, Error> {
        self.category_folders
            .get_or_load(path, |p| Ok(CategoryFolder::load_from_folder(p)?))
    }

    /// `None` inside the `Arc` when the database file does not exist.
    pub fn timer_db(&self, path: &Path) -> Result<Arc<Option<TimerDb>>, Error> {
        self.timer_dbs.get_or_load(path, |p| Ok(TimerDb::try_load(p)?))
    }

    /// A missing dat file caches as an empty mapping — the dats folder is an
    /// optional enrichment and individual files come and go.
    pub fn info_dat(&self, path: &Path) -> Result<Arc<InfoDat>, Error> {
        self.info_dats.get_or_load(path, |p| {
            if !p.exists() {
                return Ok(InfoDat::new());
            }
            Ok(parse_info_dat(p)?)
        })
    }

    /// `None` inside the `Arc` when history.xml does not exist.
    pub fn history_db(&self, path: &Path) -> Result<Arc<Option<HistoryDb>>, Error> {
        self.history_dbs.get_or_load(path, |p| {
            let xml: Option<HistoryXml> = mamescope_xml::history::parse_history_file(p)?;
            Ok(xml.map(|xml| HistoryDb::new(&xml)))
        })
    }

    /// `None` inside the `Arc` when the favourites file does not exist.
    pub fn favourites(&self, ui_path: &Path) -> Result<Arc<Option<HashSet<Basename>>>, Error> {
        self.favourites
            .get_or_load(ui_path, |p| Ok(load_favourites(p)?))
    }
}
