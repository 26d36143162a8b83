//! The top-level facade: settings plus a shared cache, with lookups and
//! iteration over machines and software.

use std::sync::Arc;

use mamescope_support::CategoryFolder;
use mamescope_xml::MachineRecord;

use crate::cache::DataCache;
use crate::commands::{MameExecutable, spawn_blocking};
use crate::error::Error;
use crate::machine::{Machine, build_machine, default_category_folder, get_machine, get_machine_async};
use crate::settings::MameSettings;
use crate::software::{Software, SoftwareList, get_software_list, get_software_list_async};

/// Entry point once settings are known: owns the cache and hands out
/// composite views.
#[derive(Clone)]
pub struct Mame {
    settings: Arc<MameSettings>,
    cache: Arc<DataCache>,
}

impl Mame {
    pub fn new(settings: MameSettings) -> Self {
        Self::with_cache(settings, Arc::new(DataCache::new()))
    }

    /// Share an existing cache, e.g. across facades pointed at the same
    /// data for different settings.
    pub fn with_cache(settings: MameSettings, cache: Arc<DataCache>) -> Self {
        Self {
            settings: Arc::new(settings),
            cache,
        }
    }

    pub fn settings(&self) -> &MameSettings {
        &self.settings
    }

    pub fn cache(&self) -> &Arc<DataCache> {
        &self.cache
    }

    pub fn executable(&self) -> MameExecutable {
        MameExecutable::new(&self.settings)
    }

    /// The configured category folder, if any; loads are cached.
    pub fn category_folder(&self) -> Option<Arc<CategoryFolder>> {
        default_category_folder(&self.settings, &self.cache)
    }

    // ── machines ────────────────────────────────────────────────────────

    /// Look up one machine by basename.
    pub fn get_machine(&self, basename: &str) -> Result<Machine, Error> {
        get_machine(&self.settings, &self.cache, basename, self.category_folder())
    }

    pub async fn get_machine_async(&self, basename: &str) -> Result<Machine, Error> {
        let folder = {
            let this = self.clone();
            spawn_blocking(move || Ok(this.category_folder())).await?
        };
        get_machine_async(&self.settings, &self.cache, basename, folder).await
    }

    /// All machine records from the configured source: the saved listing
    /// file when `xml_path` is set, otherwise a full `-listxml` run.
    pub fn machine_records(&self) -> Result<Vec<Arc<MachineRecord>>, Error> {
        if let Some(xml_path) = &self.settings.xml_path {
            let file = self.cache.machine_file(xml_path)?;
            return Ok(file.iter().cloned().collect());
        }
        Ok(self
            .executable()
            .listxml(None)?
            .into_iter()
            .map(Arc::new)
            .collect())
    }

    pub async fn machine_records_async(&self) -> Result<Vec<Arc<MachineRecord>>, Error> {
        let this = self.clone();
        spawn_blocking(move || this.machine_records()).await
    }

    /// Composite views over every machine.
    pub fn iter_machines(&self) -> Result<impl Iterator<Item = Machine> + '_, Error> {
        let records = self.machine_records()?;
        let folder = self.category_folder();
        Ok(records.into_iter().map(move |record| {
            build_machine(&self.settings, &self.cache, record, folder.clone(), 0)
        }))
    }

    /// Composite views over machines that can actually be run — devices and
    /// non-runnable entries are skipped.
    pub fn iter_runnable_machines(&self) -> Result<impl Iterator<Item = Machine> + '_, Error> {
        let records = self.machine_records()?;
        let folder = self.category_folder();
        Ok(records
            .into_iter()
            .filter(|record| record.is_runnable && !record.is_device)
            .map(move |record| {
                build_machine(&self.settings, &self.cache, record, folder.clone(), 0)
            }))
    }

    // ── software ────────────────────────────────────────────────────────

    pub fn get_software_list(&self, name: &str) -> Result<SoftwareList, Error> {
        get_software_list(&self.settings, &self.cache, name)
    }

    pub async fn get_software_list_async(&self, name: &str) -> Result<SoftwareList, Error> {
        get_software_list_async(&self.settings, &self.cache, name).await
    }

    /// Look up one software item by `(list, basename)`.
    pub fn get_software(&self, list_name: &str, basename: &str) -> Result<Software, Error> {
        self.get_software_list(list_name)?.get_software(basename)
    }

    pub async fn get_software_async(
        &self,
        list_name: &str,
        basename: &str,
    ) -> Result<Software, Error> {
        self.get_software_list_async(list_name)
            .await?
            .get_software(basename)
    }
}
