//! Composite views over software lists and their members.
//!
//! A software item's true identity is the `(list, basename)` pair; the
//! basename alone is only unique within one list.

use std::sync::Arc;
use std::time::Duration;

use mamescope_core::SoftwareSupport;
use mamescope_db::TimerRow;
use mamescope_support::HistoryEntry;
use mamescope_xml::{PartRecord, SoftwareListRecord, SoftwareRecord};

use crate::cache::DataCache;
use crate::commands::{MameExecutable, spawn_blocking};
use crate::error::Error;
use crate::settings::MameSettings;

/// Fetch a software list record: from the hash path .xml files when
/// configured, otherwise via `-getsoftlist`.
pub(crate) fn software_list_record(
    settings: &MameSettings,
    cache: &DataCache,
    name: &str,
) -> Result<Arc<SoftwareListRecord>, Error> {
    if settings.list_software_from_file && !settings.hash_paths.is_empty() {
        for hash_path in &settings.hash_paths {
            let xml_path = hash_path.join(format!("{name}.xml"));
            if xml_path.is_file() {
                return cache.software_list_file(&xml_path);
            }
        }
        return Err(Error::SoftwareListNotFound(name.to_string()));
    }
    match MameExecutable::new(settings).getsoftlist(name) {
        Ok(record) => Ok(Arc::new(record)),
        Err(Error::Subprocess { stderr, .. }) => {
            log::debug!("-getsoftlist {name} failed: {stderr}");
            Err(Error::SoftwareListNotFound(name.to_string()))
        }
        Err(e) => Err(e),
    }
}

/// Look up a software list and build its view.
pub fn get_software_list(
    settings: &Arc<MameSettings>,
    cache: &Arc<DataCache>,
    name: &str,
) -> Result<SoftwareList, Error> {
    let record = software_list_record(settings, cache, name)?;
    Ok(SoftwareList::new(record, settings.clone(), cache.clone()))
}

/// Async surface of [`get_software_list`].
pub async fn get_software_list_async(
    settings: &Arc<MameSettings>,
    cache: &Arc<DataCache>,
    name: &str,
) -> Result<SoftwareList, Error> {
    let settings = settings.clone();
    let cache = cache.clone();
    let name = name.to_string();
    spawn_blocking(move || get_software_list(&settings, &cache, &name)).await
}

/// View over one software list.
#[derive(Clone)]
pub struct SoftwareList {
    record: Arc<SoftwareListRecord>,
    settings: Arc<MameSettings>,
    cache: Arc<DataCache>,
    grouping: String,
    list_type: Option<String>,
}

impl SoftwareList {
    pub(crate) fn new(
        record: Arc<SoftwareListRecord>,
        settings: Arc<MameSettings>,
        cache: Arc<DataCache>,
    ) -> Self {
        // List basenames follow a "<system>_<media>" convention, e.g.
        // nes_datach; a bare name is just the grouping
        let (grouping, list_type) = match record.basename.split_once('_') {
            Some((grouping, list_type)) => (grouping.to_string(), Some(list_type.to_string())),
            None => (record.basename.clone(), None),
        };
        Self {
            record,
            settings,
            cache,
            grouping,
            list_type,
        }
    }

    pub fn record(&self) -> &Arc<SoftwareListRecord> {
        &self.record
    }

    /// Human readable name.
    pub fn name(&self) -> &str {
        self.record.name()
    }

    pub fn basename(&self) -> &str {
        &self.record.basename
    }

    /// The system part of the list basename (e.g. "nes" for "nes_datach").
    pub fn grouping(&self) -> &str {
        &self.grouping
    }

    /// The media part of the list basename, when there is one.
    pub fn list_type(&self) -> Option<&str> {
        self.list_type.as_deref()
    }

    pub fn software_count(&self) -> usize {
        self.record.software.len()
    }

    /// Views over every member, in list order.
    pub fn iter_software(&self) -> impl Iterator<Item = Software> + '_ {
        (0..self.record.software.len()).map(|index| Software {
            list: self.clone(),
            index,
        })
    }

    pub fn get_software(&self, basename: &str) -> Result<Software, Error> {
        let index = self
            .record
            .software
            .iter()
            .position(|software| software.basename == basename)
            .ok_or_else(|| Error::SoftwareNotFound {
                list: self.record.basename.clone(),
                basename: basename.to_string(),
            })?;
        Ok(Software {
            list: self.clone(),
            index,
        })
    }
}

/// View over one software item.
#[derive(Clone)]
pub struct Software {
    list: SoftwareList,
    index: usize,
}

impl Software {
    pub fn record(&self) -> &SoftwareRecord {
        &self.list.record.software[self.index]
    }

    pub fn list(&self) -> &SoftwareList {
        &self.list
    }

    /// Combination of software list basename and basename, the item's true
    /// identity.
    pub fn id(&self) -> String {
        format!("{}:{}", self.list.basename(), self.basename())
    }

    /// Human readable name.
    pub fn name(&self) -> &str {
        self.record().name()
    }

    pub fn basename(&self) -> &str {
        &self.record().basename
    }

    pub fn parent_basename(&self) -> Option<&str> {
        self.record().parent_basename.as_deref()
    }

    /// Single-hop parent resolution; a dangling parent pointer degrades to
    /// `None`.
    pub fn parent(&self) -> Option<Software> {
        let parent_basename = self.parent_basename()?;
        self.list.get_software(parent_basename).ok()
    }

    pub fn parent_name(&self) -> Option<String> {
        Some(self.parent()?.name().to_string())
    }

    pub fn supported(&self) -> SoftwareSupport {
        self.record().supported
    }

    pub fn publisher(&self) -> Option<&str> {
        self.record().publisher.as_deref()
    }

    /// Compatibility notes for the current state of running this in MAME.
    pub fn notes(&self) -> Option<&str> {
        let notes = self.record().notes.as_deref()?.trim();
        if notes.is_empty() { None } else { Some(notes) }
    }

    pub fn year(&self) -> Option<i64> {
        self.record().year()
    }

    /// All `<info>` values for a name — duplicates are allowed.
    pub fn infos(&self, name: &str) -> Vec<Option<&str>> {
        self.record()
            .infos
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, value)| value.as_deref())
            .collect()
    }

    pub fn get_info(&self, name: &str) -> Option<&str> {
        self.record().info(name)
    }

    pub fn get_shared_feature(&self, name: &str) -> Option<&str> {
        self.record().shared_feature(name)
    }

    pub fn parts(&self) -> &[PartRecord] {
        &self.record().parts
    }

    pub fn get_part(&self, name: &str) -> Option<&PartRecord> {
        self.record().part(name)
    }

    pub fn get_only_part(&self) -> Option<&PartRecord> {
        self.record().only_part()
    }

    /// History entry for this item, falling back to the parent's entry.
    pub fn history(&self) -> Option<HistoryEntry> {
        let dats_path = self.list.settings.dats_path.as_ref()?;
        let db = self
            .list
            .cache
            .history_db(&dats_path.join("history.xml"))
            .ok()?;
        let db = (*db).as_ref()?;
        db.get_software_history(self.list.basename(), self.basename())
            .or_else(|| {
                let parent_basename = self.parent_basename()?;
                db.get_software_history(self.list.basename(), parent_basename)
            })
    }

    pub async fn history_async(&self) -> Option<HistoryEntry> {
        let this = self.clone();
        spawn_blocking(move || Ok(this.history())).await.ok()?
    }

    // ── play time ───────────────────────────────────────────────────────

    fn timer_row(&self) -> Option<TimerRow> {
        let path = self.list.settings.timer_db_path()?;
        let db = self.list.cache.timer_db(&path).ok()?;
        (*db).as_ref()?
            .software(self.list.basename(), self.basename())
            .copied()
    }

    /// Zero when there is no record, never `None`.
    pub fn total_time_played(&self) -> Duration {
        self.timer_row().map(|row| row.total_time).unwrap_or_default()
    }

    pub fn play_count(&self) -> u64 {
        self.timer_row().map(|row| row.play_count).unwrap_or_default()
    }

    pub fn total_time_emulated(&self) -> Duration {
        self.timer_row()
            .map(|row| row.emulated_time)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Software {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id(), self.name())
    }
}
