//! User-managed data files: the favourites list and per-machine config
//! counters.

use std::collections::HashSet;
use std::path::Path;

use mamescope_core::Basename;
use mamescope_xml::CountersRecord;
use mamescope_xml::config::parse_config_file;

use crate::error::Error;
use crate::settings::MameSettings;

/// Load `favorites.ini` from the UI folder. Records are fixed 16-line
/// blocks; the basename is the fourth line of each block. Returns `None`
/// when the file does not exist.
pub fn load_favourites(ui_path: &Path) -> Result<Option<HashSet<Basename>>, Error> {
    let ini_path = ui_path.join("favorites.ini");
    let contents = match std::fs::read_to_string(&ini_path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let favourites = contents
        .lines()
        .skip(3)
        .step_by(16)
        .map(str::to_string)
        .collect();
    Ok(Some(favourites))
}

/// Load the coin/ticket counters for one machine from its `.cfg` file.
/// `None` when the cfg directory is unconfigured, the file is absent, or
/// the config carries no counters.
pub fn load_counters(settings: &MameSettings, basename: &str) -> Option<CountersRecord> {
    let configs_path = settings.configs_path.as_ref()?;
    let cfg_path = configs_path.join(format!("{basename}.cfg"));
    let config = match parse_config_file(&cfg_path) {
        Ok(config) => config?,
        Err(e) => {
            log::warn!("Could not parse {}: {e}", cfg_path.display());
            return None;
        }
    };
    config.counters().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_favourites_stride() {
        let dir = tempfile::tempdir().unwrap();
        // Two 16-line records; basename sits on line 4 of each block
        let mut lines = Vec::new();
        for basename in ["puckman", "dkong"] {
            lines.extend(["[favorite]", "", "mame"].map(String::from));
            lines.push(basename.to_string());
            lines.extend(std::iter::repeat_n(String::new(), 12));
        }
        let mut file = std::fs::File::create(dir.path().join("favorites.ini")).unwrap();
        write!(file, "{}", lines.join("\n")).unwrap();

        let favourites = load_favourites(dir.path()).unwrap().unwrap();
        assert_eq!(
            favourites,
            HashSet::from(["puckman".to_string(), "dkong".to_string()])
        );
    }

    #[test]
    fn test_load_favourites_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_favourites(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_counters() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("gtrfrks.cfg")).unwrap();
        write!(
            file,
            r#"<mameconfig version="10"><system name="gtrfrks"><counters><coins index="0" number="5"/><tickets number="9"/></counters></system></mameconfig>"#
        )
        .unwrap();

        let settings = MameSettings {
            configs_path: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let counters = load_counters(&settings, "gtrfrks").unwrap();
        assert_eq!(counters.total_coins(), 5);
        assert_eq!(counters.tickets, Some(9));
        assert!(load_counters(&settings, "missing").is_none());

        let unconfigured = MameSettings::default();
        assert!(load_counters(&unconfigured, "gtrfrks").is_none());
    }
}
