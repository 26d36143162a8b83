//! The composite machine view: one machine record joined with category
//! data, documentation, play time, and user data, with parent/clone/BIOS
//! resolution done once at construction.
//!
//! Construction is a single synchronous core; the async entry points
//! offload it to a worker thread, so both surfaces resolve relatives and
//! the BIOS self-reference correction identically.

use std::sync::Arc;
use std::time::Duration;

use mamescope_core::catlist::CatlistCategory;
use mamescope_core::util::parse_year_prefix;
use mamescope_core::{Basename, DriverStatus, DumpStatus, MachineType, SoftwareListBasename};
use mamescope_db::TimerRow;
use mamescope_support::{CategoryFolder, HistoryEntry, MameInfoEntry};
use mamescope_xml::{ChipRecord, DisplayRecord, MachineRecord};

use crate::cache::DataCache;
use crate::commands::{MameExecutable, spawn_blocking};
use crate::error::Error;
use crate::settings::MameSettings;
use crate::userdata::load_counters;

/// Display-name prefixes that pin a machine to a particular platform,
/// matched as `"{prefix}: "` at the start of the name.
const PLATFORM_PREFIXES: &[(&str, MachineType)] = &[
    ("Game & Watch", MachineType::LcdHandheld),
    ("R-Zone", MachineType::ConsoleCartridge),
];

/// Parenthesized display-name suffixes that pin a machine to a platform.
const PLATFORM_SUFFIXES: &[(&str, MachineType)] = &[
    ("XaviXPORT", MachineType::ConsoleCartridge),
    ("CPS Changer", MachineType::ConsoleCartridge),
    ("Domyos Interactive System", MachineType::ConsoleCartridge),
];

/// Fetch one machine record from the configured entity source: a saved
/// `-listxml` file when `xml_path` is set, otherwise the executable.
pub(crate) fn machine_record(
    settings: &MameSettings,
    cache: &DataCache,
    basename: &str,
) -> Result<Arc<MachineRecord>, Error> {
    if let Some(xml_path) = &settings.xml_path {
        let file = cache.machine_file(xml_path)?;
        return file
            .get(basename)
            .cloned()
            .ok_or_else(|| Error::MachineNotFound(basename.to_string()));
    }
    let records = match MameExecutable::new(settings).listxml(Some(basename)) {
        Ok(records) => records,
        // MAME refuses unknown names with a nonzero exit
        Err(Error::Subprocess { stderr, .. }) => {
            log::debug!("-listxml {basename} failed: {stderr}");
            return Err(Error::MachineNotFound(basename.to_string()));
        }
        Err(e) => return Err(e),
    };
    // Targeted -listxml also emits referenced devices
    records
        .into_iter()
        .find(|r| r.basename == basename)
        .map(Arc::new)
        .ok_or_else(|| Error::MachineNotFound(basename.to_string()))
}

/// Load the category folder configured in the settings, degrading to `None`
/// (with a warning) when it cannot be read.
pub(crate) fn default_category_folder(
    settings: &MameSettings,
    cache: &DataCache,
) -> Option<Arc<CategoryFolder>> {
    let cat_path = settings.cat_path.as_ref()?;
    match cache.category_folder(cat_path) {
        Ok(folder) => Some(folder),
        Err(e) => {
            log::warn!("Could not load category folder {}: {e}", cat_path.display());
            None
        }
    }
}

/// Look up a machine and build its composite view.
pub fn get_machine(
    settings: &Arc<MameSettings>,
    cache: &Arc<DataCache>,
    basename: &str,
    category_folder: Option<Arc<CategoryFolder>>,
) -> Result<Machine, Error> {
    let record = machine_record(settings, cache, basename)?;
    Ok(build_machine(settings, cache, record, category_folder, 0))
}

/// Async surface of [`get_machine`]: the same synchronous construction,
/// offloaded to a worker thread.
pub async fn get_machine_async(
    settings: &Arc<MameSettings>,
    cache: &Arc<DataCache>,
    basename: &str,
    category_folder: Option<Arc<CategoryFolder>>,
) -> Result<Machine, Error> {
    let settings = settings.clone();
    let cache = cache.clone();
    let basename = basename.to_string();
    spawn_blocking(move || get_machine(&settings, &cache, &basename, category_folder)).await
}

/// Build the composite view for an already-fetched record.
///
/// `depth` limits relative resolution to a single hop: clone forests are
/// depth 0/1 in source data, and the limit terminates accidental cycles.
pub(crate) fn build_machine(
    settings: &Arc<MameSettings>,
    cache: &Arc<DataCache>,
    record: Arc<MachineRecord>,
    category_folder: Option<Arc<CategoryFolder>>,
    depth: u32,
) -> Machine {
    let parent = if depth == 0 {
        record
            .parent_basename
            .as_ref()
            .filter(|parent_basename| **parent_basename != record.basename)
            .and_then(
                |parent_basename| match machine_record(settings, cache, parent_basename) {
                    Ok(parent_record) => Some(Box::new(build_machine(
                        settings,
                        cache,
                        parent_record,
                        category_folder.clone(),
                        depth + 1,
                    ))),
                    // Missing parent data degrades to no parent
                    Err(e) => {
                        if !e.is_not_found() {
                            log::warn!("Could not resolve parent of {}: {e}", record.basename);
                        }
                        None
                    }
                },
            )
    } else {
        None
    };

    // A clone's romof usually just repeats its parent basename; the true
    // BIOS in that case is whatever the parent resolves to. Taking the
    // parent's pointer at face value here would misattribute the parent
    // itself as the BIOS.
    let effective_bios_basename = match (&record.bios_basename, &record.parent_basename) {
        (Some(bios), Some(parent_basename)) if bios == parent_basename => parent
            .as_ref()
            .and_then(|p| p.effective_bios_basename.clone()),
        (bios, _) => bios.clone(),
    };

    let bios = if depth == 0 {
        effective_bios_basename.as_ref().and_then(|bios_basename| {
            match machine_record(settings, cache, bios_basename) {
                Ok(bios_record) => Some(Box::new(build_machine(
                    settings,
                    cache,
                    bios_record,
                    category_folder.clone(),
                    depth + 1,
                ))),
                Err(e) => {
                    if !e.is_not_found() {
                        log::warn!("Could not resolve BIOS of {}: {e}", record.basename);
                    }
                    None
                }
            }
        })
    } else {
        None
    };

    let catlist_full = category_folder.as_ref().and_then(|folder| {
        folder
            .get_cat("catlist", &record.basename)
            .or_else(|| {
                // A clone set newer than the catlist file is presumably the
                // same sort of thing as its parent
                record
                    .parent_basename
                    .as_deref()
                    .and_then(|parent_basename| folder.get_cat("catlist", parent_basename))
            })
            .map(str::to_string)
    });
    let catlist = catlist_full.as_deref().map(CatlistCategory::parse);

    Machine {
        record,
        settings: settings.clone(),
        cache: cache.clone(),
        category_folder,
        parent,
        bios,
        effective_bios_basename,
        catlist_full,
        catlist,
    }
}

/// A machine record and all info related to it, and any method that might
/// be remotely convenient.
#[derive(Clone)]
pub struct Machine {
    record: Arc<MachineRecord>,
    settings: Arc<MameSettings>,
    cache: Arc<DataCache>,
    category_folder: Option<Arc<CategoryFolder>>,
    parent: Option<Box<Machine>>,
    bios: Option<Box<Machine>>,
    effective_bios_basename: Option<Basename>,
    catlist_full: Option<String>,
    catlist: Option<CatlistCategory>,
}

impl std::fmt::Display for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.basename(), self.name())
    }
}

impl Machine {
    /// The underlying listing record.
    pub fn record(&self) -> &Arc<MachineRecord> {
        &self.record
    }

    /// Human readable name.
    pub fn name(&self) -> &str {
        self.record.name()
    }

    pub fn basename(&self) -> &str {
        &self.record.basename
    }

    pub fn parent_basename(&self) -> Option<&str> {
        self.record.parent_basename.as_deref()
    }

    pub fn parent(&self) -> Option<&Machine> {
        self.parent.as_deref()
    }

    pub fn parent_name(&self) -> Option<&str> {
        Some(self.parent.as_ref()?.name())
    }

    /// The effective BIOS basename, after the clone self-reference
    /// correction.
    pub fn bios_basename(&self) -> Option<&str> {
        self.effective_bios_basename.as_deref()
    }

    pub fn bios(&self) -> Option<&Machine> {
        self.bios.as_deref()
    }

    pub fn bios_name(&self) -> Option<&str> {
        Some(self.bios.as_ref()?.name())
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.record.manufacturer.as_deref()
    }

    // ── classification ──────────────────────────────────────────────────

    /// Raw section name from catlist, before parsing, with the documented
    /// fallback to the parent basename.
    pub fn catlist_full(&self) -> Option<&str> {
        self.catlist_full.as_deref()
    }

    pub fn catlist(&self) -> Option<&CatlistCategory> {
        self.catlist.as_ref()
    }

    pub fn genre(&self) -> Option<&str> {
        self.catlist.as_ref()?.genre()
    }

    pub fn subgenre(&self) -> Option<&str> {
        self.catlist.as_ref()?.subgenre()
    }

    fn platform_prefix(&self) -> Option<(&'static str, MachineType)> {
        PLATFORM_PREFIXES
            .iter()
            .find(|(prefix, _)| {
                self.name().starts_with(prefix)
                    && self.name()[prefix.len()..].starts_with(": ")
            })
            .copied()
    }

    fn platform_suffix(&self) -> Option<(&'static str, MachineType)> {
        let (_, after) = self.name().split_once(" (")?;
        PLATFORM_SUFFIXES
            .iter()
            .find(|(suffix, _)| after.contains(suffix))
            .copied()
    }

    /// Machine type, resolved in precedence order: display-name platform
    /// markers, the BIOS flag, the catlist classification, then coin-slot /
    /// mechanical heuristics.
    pub fn machine_type(&self) -> MachineType {
        if let Some((_, machine_type)) = self.platform_prefix() {
            return machine_type;
        }
        if let Some((_, machine_type)) = self.platform_suffix() {
            return machine_type;
        }
        if self.record.is_bios {
            return MachineType::Bios;
        }
        if let Some(catlist) = &self.catlist {
            return catlist.machine_type();
        }
        if self.record.number_of_coin_slots() > 0 {
            return MachineType::Arcade;
        }
        if self.record.is_mechanical {
            return MachineType::Mechanical;
        }
        MachineType::Other
    }

    /// Platform label for display: the name marker when there is one, else
    /// derived from the machine type.
    pub fn platform(&self) -> String {
        if let Some((prefix, _)) = self.platform_prefix() {
            return prefix.to_string();
        }
        if let Some((suffix, _)) = self.platform_suffix() {
            return suffix.to_string();
        }
        match self.machine_type() {
            MachineType::PlugAndPlay => "Plug & Play".to_string(),
            MachineType::MedalGame => "Medal Game".to_string(),
            machine_type => machine_type.name().to_string(),
        }
    }

    pub fn is_mechanical(&self) -> bool {
        self.record.is_mechanical
    }

    // ── driver status ───────────────────────────────────────────────────

    /// The driver's own status field, taken as authoritative. No attempt is
    /// made to recombine per-feature statuses into an overall verdict.
    pub fn overall_status(&self) -> Option<DriverStatus> {
        self.record.driver.as_ref()?.status
    }

    pub fn emulation_status(&self) -> Option<DriverStatus> {
        self.record.driver.as_ref()?.emulation_status
    }

    pub fn cocktail_status(&self) -> Option<DriverStatus> {
        self.record.driver.as_ref()?.cocktail_status
    }

    pub fn requires_artwork(&self) -> bool {
        self.record.driver.as_ref().is_some_and(|d| d.requires_artwork)
    }

    pub fn is_incomplete(&self) -> bool {
        self.record.driver.as_ref().is_some_and(|d| d.is_incomplete)
    }

    pub fn is_unofficial(&self) -> bool {
        self.record.driver.as_ref().is_some_and(|d| d.is_unofficial)
    }

    pub fn no_sound_hardware(&self) -> bool {
        self.record.driver.as_ref().is_some_and(|d| d.no_sound_hardware)
    }

    /// Whether running this machine needs at least one CHD.
    pub fn requires_chds(&self) -> bool {
        self.record.disks.iter().any(|disk| !disk.is_optional)
    }

    /// True when there is nothing to dump: no required CHDs and every ROM
    /// is a known no-dump.
    pub fn is_romless(&self) -> bool {
        if self.requires_chds() {
            return false;
        }
        self.record
            .roms
            .iter()
            .all(|rom| rom.status == DumpStatus::NoDump)
    }

    // ── category facts ──────────────────────────────────────────────────

    fn get_cats(&self, cat: &str, fallback_parent: bool) -> Vec<String> {
        let Some(folder) = &self.category_folder else {
            return Vec::new();
        };
        let cats = folder.get_cats(cat, self.basename());
        if cats.is_empty()
            && fallback_parent
            && let Some(parent_basename) = self.parent_basename()
        {
            return folder
                .get_cats(cat, parent_basename)
                .into_iter()
                .map(str::to_string)
                .collect();
        }
        cats.into_iter().map(str::to_string).collect()
    }

    fn get_cat(&self, cat: &str, fallback_parent: bool) -> Option<String> {
        let folder = self.category_folder.as_ref()?;
        let value = folder.get_cat(cat, self.basename());
        if value.is_none()
            && fallback_parent
            && let Some(parent_basename) = self.parent_basename()
        {
            return folder.get_cat(cat, parent_basename).map(str::to_string);
        }
        value.map(str::to_string)
    }

    /// Series this machine belongs to, falling back to the parent.
    pub fn series(&self) -> Vec<String> {
        self.get_cats("series", true)
    }

    /// `None` when unsure: no explicit mature/not_mature category hit and
    /// no catlist flag to fall back on.
    pub fn is_mature(&self) -> Option<bool> {
        if self.get_cat("mature", true).is_some() {
            return Some(true);
        }
        if self.get_cat("not_mature", true).is_some() {
            return Some(false);
        }
        self.catlist.as_ref().map(|catlist| catlist.is_mature())
    }

    pub fn cabinet_types(&self) -> Vec<String> {
        self.get_cats("cabinets", false)
    }

    pub fn languages(&self) -> Vec<String> {
        self.get_cats("languages", false)
    }

    pub fn has_free_play(&self) -> bool {
        self.get_cat("freeplay", false).is_some()
    }

    pub fn monochrome_type(&self) -> Option<String> {
        self.get_cat("monochrome", false)
    }

    /// The MAME version this machine first appeared in, falling back to the
    /// parent.
    pub fn version_added(&self) -> Option<String> {
        self.get_cat("version", true)
    }

    /// The bestgames.ini rating section, e.g. "80 to 90 (Best Games)",
    /// falling back to the parent.
    pub fn bestgames_rating_name(&self) -> Option<String> {
        self.get_cat("bestgames", true)
    }

    /// Numeric form of the bestgames rating (leading bound + 10).
    pub fn bestgames_rating(&self) -> Option<i64> {
        let name = self.bestgames_rating_name()?;
        let leading = name.split(' ').next()?;
        Some(leading.parse::<i64>().ok()? + 10)
    }

    /// The nplayers.ini description when there is one, else the raw player
    /// count.
    pub fn number_of_players_description(&self) -> String {
        if let Some(nplayers) = self.get_cat("nplayers", false) {
            return nplayers;
        }
        self.number_of_players().to_string()
    }

    // ── play time ───────────────────────────────────────────────────────

    fn timer_row(&self) -> Option<TimerRow> {
        let path = self.settings.timer_db_path()?;
        let db = self.cache.timer_db(&path).ok()?;
        (*db).as_ref()?.system(self.basename()).copied()
    }

    /// Zero when there is no record — a deliberate default, distinct from
    /// the `None`-means-unknown convention of the category fields.
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

    // ── documentation ───────────────────────────────────────────────────

    fn get_dat_info(&self, kind: &str) -> Option<Arc<str>> {
        let dats_path = self.settings.dats_path.as_ref()?;
        let dat = self
            .cache
            .info_dat(&dats_path.join(format!("{kind}.dat")))
            .ok()?;
        dat.get(self.basename()).cloned()
    }

    pub fn get_history(&self) -> Option<HistoryEntry> {
        let dats_path = self.settings.dats_path.as_ref()?;
        let db = self.cache.history_db(&dats_path.join("history.xml")).ok()?;
        (*db).as_ref()?.get_history(self.basename())
    }

    pub async fn get_history_async(&self) -> Option<HistoryEntry> {
        let this = self.clone();
        spawn_blocking(move || Ok(this.get_history())).await.ok()?
    }

    pub fn get_mameinfo(&self) -> Option<MameInfoEntry> {
        let text = self.get_dat_info("mameinfo")?;
        Some(MameInfoEntry::parse(&text))
    }

    pub async fn get_mameinfo_async(&self) -> Option<MameInfoEntry> {
        let this = self.clone();
        spawn_blocking(move || Ok(this.get_mameinfo())).await.ok()?
    }

    /// The part of the messinfo entry before its DRIVER section.
    pub fn get_messinfo_summary(&self) -> Option<String> {
        let text = self.get_dat_info("messinfo")?;
        let summary = match text.split_once("\nDRIVER:") {
            Some((before, _)) => before,
            None => &text,
        };
        Some(summary.to_string())
    }

    pub async fn get_messinfo_summary_async(&self) -> Option<String> {
        let this = self.clone();
        spawn_blocking(move || Ok(this.get_messinfo_summary()))
            .await
            .ok()?
    }

    // ── user data ───────────────────────────────────────────────────────

    pub fn is_favourite(&self) -> bool {
        let Some(ui_path) = &self.settings.ui_path else {
            return false;
        };
        match self.cache.favourites(ui_path) {
            Ok(favourites) => (*favourites)
                .as_ref()
                .is_some_and(|set| set.contains(self.basename())),
            Err(e) => {
                log::warn!("Could not load favourites: {e}");
                false
            }
        }
    }

    pub async fn is_favourite_async(&self) -> bool {
        let this = self.clone();
        spawn_blocking(move || Ok(this.is_favourite()))
            .await
            .unwrap_or(false)
    }

    pub fn tickets_dispensed(&self) -> Option<u64> {
        load_counters(&self.settings, self.basename())?.tickets
    }

    pub async fn tickets_dispensed_async(&self) -> Option<u64> {
        let this = self.clone();
        spawn_blocking(move || Ok(this.tickets_dispensed())).await.ok()?
    }

    /// Total coins ever inserted, from the machine's cfg file.
    pub fn total_coins_inserted(&self) -> Option<u64> {
        Some(load_counters(&self.settings, self.basename())?.total_coins())
    }

    /// Whether any configured artwork folder has an entry for this machine.
    /// Assumes no artwork when no artwork dir is configured.
    pub fn find_if_have_artwork(&self) -> bool {
        for artwork_path in &self.settings.artwork_paths {
            let Ok(entries) = std::fs::read_dir(artwork_path) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.file_stem().and_then(|s| s.to_str()) == Some(self.basename()) {
                    return true;
                }
            }
        }
        false
    }

    pub async fn find_if_have_artwork_async(&self) -> bool {
        let this = self.clone();
        spawn_blocking(move || Ok(this.find_if_have_artwork()))
            .await
            .unwrap_or(false)
    }

    // ── hardware ────────────────────────────────────────────────────────

    pub fn number_of_players(&self) -> u32 {
        self.record.number_of_players()
    }

    pub fn control_types(&self) -> Vec<&str> {
        self.record
            .input
            .as_ref()
            .map(|input| input.control_types())
            .unwrap_or_default()
    }

    /// Decade this machine was released in, even when the exact year is
    /// unknown (as the start year, e.g. 1990).
    pub fn decade(&self) -> Option<i64> {
        Some(parse_year_prefix(self.record.raw_year.as_deref()?, 3)? * 10)
    }

    pub fn century(&self) -> Option<i64> {
        Some(parse_year_prefix(self.record.raw_year.as_deref()?, 2)? * 100)
    }

    pub fn cpus(&self) -> Vec<&ChipRecord> {
        self.record.cpus().collect()
    }

    pub fn audio_chips(&self) -> Vec<&ChipRecord> {
        self.record.audio_chips().collect()
    }

    pub fn displays(&self) -> &[DisplayRecord] {
        &self.record.displays
    }

    pub fn display_count(&self) -> usize {
        self.record.displays.len()
    }

    /// Tags of media slots that take user-supplied images.
    pub fn media_slot_tags(&self) -> Vec<&str> {
        self.record
            .media_slots
            .iter()
            .filter(|slot| !slot.is_fixed_image)
            .filter_map(|slot| slot.tag.as_deref())
            .collect()
    }

    pub fn media_slot_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for slot in &self.record.media_slots {
            if slot.tag.is_none() || slot.is_fixed_image {
                continue;
            }
            if !types.contains(&slot.slot_type.as_str()) {
                types.push(&slot.slot_type);
            }
        }
        types
    }

    pub fn slot_names(&self) -> Vec<&str> {
        self.record
            .slots
            .iter()
            .map(|slot| slot.name.as_str())
            .collect()
    }

    pub fn software_list_names(&self) -> Vec<&SoftwareListBasename> {
        self.record
            .software_lists
            .iter()
            .map(|list| &list.name)
            .collect()
    }

    /// Views of the device machines this one references.
    pub fn devices(&self) -> Vec<Machine> {
        self.record
            .device_refs
            .iter()
            .filter_map(
                |device_ref| match machine_record(&self.settings, &self.cache, device_ref) {
                    Ok(record) => Some(build_machine(
                        &self.settings,
                        &self.cache,
                        record,
                        self.category_folder.clone(),
                        1,
                    )),
                    Err(e) => {
                        log::warn!("Could not resolve device {device_ref}: {e}");
                        None
                    }
                },
            )
            .collect()
    }

    pub fn device_names(&self) -> Vec<String> {
        self.record
            .device_refs
            .iter()
            .filter_map(|device_ref| {
                machine_record(&self.settings, &self.cache, device_ref)
                    .ok()
                    .map(|record| record.name().to_string())
            })
            .collect()
    }

    pub async fn devices_async(&self) -> Vec<Machine> {
        let this = self.clone();
        spawn_blocking(move || Ok(this.devices()))
            .await
            .unwrap_or_default()
    }
}
