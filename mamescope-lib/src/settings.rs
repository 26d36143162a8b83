//! Locating MAME and its data directories.
//!
//! Autodetection reads `~/.mame/mame.ini` and `ui.ini` the way MAME itself
//! resolves them: `mame.ini` supplies the home/hash/art/cfg paths and an
//! optional `inipath` pointing at where `ui.ini` lives; `ui.ini` supplies
//! the history/category/ui paths. Everything is optional — a missing ini
//! just means fewer enrichment sources.
//!
//! The executable itself resolves through a priority chain: explicit
//! override, then `settings.toml`, then `$PATH`.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Paths to the MAME executable and its data directories.
#[derive(Debug, Clone, Default)]
pub struct MameSettings {
    /// Path to the MAME executable.
    pub mame_executable_path: PathBuf,
    /// `categorypath` in ui.ini.
    pub cat_path: Option<PathBuf>,
    /// `historypath` in ui.ini — where history.xml and the .dat files live.
    pub dats_path: Option<PathBuf>,
    /// `artpath` in mame.ini.
    pub artwork_paths: Vec<PathBuf>,
    /// `homepath` in mame.ini — where plugins keep their data.
    pub plugin_config_home: Option<PathBuf>,
    /// `cfg_directory` in mame.ini.
    pub configs_path: Option<PathBuf>,
    /// `ui_path` in ui.ini — folder for favourites and other UI files.
    pub ui_path: Option<PathBuf>,
    /// `hashpath` in mame.ini — location of software list .xml files.
    pub hash_paths: Vec<PathBuf>,
    /// Read a saved `-listxml` output file instead of running MAME.
    pub xml_path: Option<PathBuf>,
    /// Read software list .xml files directly instead of `-getsoftlist`,
    /// avoiding a subprocess (and the DTD dropping the notes field).
    pub list_software_from_file: bool,
}

impl MameSettings {
    /// Path to the timer plugin's database, if the plugin home is known.
    pub fn timer_db_path(&self) -> Option<PathBuf> {
        Some(self.plugin_config_home.as_ref()?.join("timer").join("timer.db"))
    }

    /// Autodetect settings, optionally with an explicit executable path.
    pub fn autodetect(mame_path: Option<PathBuf>) -> Result<Self, Error> {
        let mame_path = mame_path
            .or_else(load_executable_override)
            .or_else(autodetect_mame_path)
            .ok_or(Error::ExecutableNotFound)?;

        let mut settings = MameSettings {
            mame_executable_path: mame_path,
            list_software_from_file: true,
            ..Default::default()
        };

        let default_ini_dir = default_mame_ini_dir();
        let mut ini_dir = default_ini_dir.clone();

        let mame_ini_path = default_ini_dir.join("mame.ini");
        if mame_ini_path.is_file() {
            let ini = read_mame_ini(&mame_ini_path)?;
            settings.plugin_config_home = try_get_path_from_ini(&ini, "homepath", "mame.ini");
            settings.hash_paths = try_get_paths_from_ini(&ini, "hashpath", "mame.ini");
            settings.artwork_paths = try_get_paths_from_ini(&ini, "artpath", "mame.ini");
            settings.configs_path = try_get_path_from_ini(&ini, "cfg_directory", "mame.ini");
            if let Some(inipath) = try_get_path_from_ini(&ini, "inipath", "mame.ini") {
                ini_dir = inipath;
            }
        } else {
            log::warn!(
                "MAME is found, but the config file is not in its default location at {}",
                mame_ini_path.display()
            );
        }

        match try_read_ini("ui.ini", &ini_dir, &default_ini_dir) {
            Some(ui_ini) => {
                settings.dats_path = try_get_path_from_ini(&ui_ini, "historypath", "ui.ini");
                settings.cat_path = try_get_path_from_ini(&ui_ini, "categorypath", "ui.ini");
                settings.ui_path = try_get_path_from_ini(&ui_ini, "ui_path", "ui.ini");
            }
            None => log::warn!("MAME is found, but ui.ini was not found"),
        }

        Ok(settings)
    }
}

/// Where MAME keeps its inis by default.
fn default_mame_ini_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mame")
}

/// Find a `mame` executable on `$PATH`.
pub fn autodetect_mame_path() -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join("mame");
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Parse a MAME ini file into key/value pairs. Lines are `key value`, `#`
/// starts a comment, a key with no value means the option is unset.
pub fn read_mame_ini(path: &Path) -> io::Result<HashMap<String, String>> {
    let contents = std::fs::read_to_string(path)?;
    let mut ini = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(char::is_whitespace) else {
            continue;
        };
        let value = match value.split_once('#') {
            Some((before, _)) => before,
            None => value,
        };
        let value = value.trim();
        if !key.is_empty() && !value.is_empty() {
            ini.insert(key.to_string(), value.to_string());
        }
    }
    Ok(ini)
}

/// Split a MAME path value into paths: strip surrounding quotes, split on
/// `;`, expand `$VAR`-style environment references.
pub fn parse_mame_ini_path(value: &str) -> Vec<PathBuf> {
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    value
        .split(';')
        .filter(|part| !part.is_empty())
        .map(|part| PathBuf::from(expand_env_vars(part)))
        .collect()
}

/// Expand `$VAR` and `${VAR}` references from the environment. Unset
/// variables are left as-is.
fn expand_env_vars(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }
        let rest = &value[i + 1..];
        let (name, consumed) = if let Some(inner) = rest.strip_prefix('{') {
            match inner.find('}') {
                Some(end) => (&inner[..end], end + 2),
                None => {
                    result.push(c);
                    continue;
                }
            }
        } else {
            let end = rest
                .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                .unwrap_or(rest.len());
            (&rest[..end], end)
        };
        if name.is_empty() {
            result.push(c);
            continue;
        }
        match std::env::var(name) {
            Ok(expanded) => result.push_str(&expanded),
            Err(_) => {
                result.push(c);
                result.push_str(&rest[..consumed]);
            }
        }
        for _ in rest[..consumed].chars() {
            chars.next();
        }
    }
    result
}

/// Every existing directory a multi-path ini key points at; missing ones
/// are warned about and dropped.
pub fn try_get_paths_from_ini(
    ini: &HashMap<String, String>,
    key: &str,
    ini_name: &str,
) -> Vec<PathBuf> {
    let Some(value) = ini.get(key) else {
        return Vec::new();
    };
    let mut exist_paths = Vec::new();
    for path in parse_mame_ini_path(value) {
        if path.is_dir() {
            exist_paths.push(path);
        } else {
            log::warn!(
                "{key} had {} in {ini_name}, but it does not exist or is not a directory",
                path.display()
            );
        }
    }
    exist_paths
}

/// The single directory a single-path ini key points at; extra values are
/// warned about and the first is kept.
pub fn try_get_path_from_ini(
    ini: &HashMap<String, String>,
    key: &str,
    ini_name: &str,
) -> Option<PathBuf> {
    let mut paths = try_get_paths_from_ini(ini, key, ini_name);
    if paths.is_empty() {
        return None;
    }
    if paths.len() > 1 {
        log::warn!("{key} in {ini_name} should only have one value, but it has: {paths:?}");
    }
    Some(paths.swap_remove(0))
}

/// Read an ini from `ini_dir`, falling back to the default directory when
/// `inipath` pointed somewhere without the file.
fn try_read_ini(
    name: &str,
    ini_dir: &Path,
    default_ini_dir: &Path,
) -> Option<HashMap<String, String>> {
    match read_mame_ini(&ini_dir.join(name)) {
        Ok(ini) => Some(ini),
        Err(_) => {
            if ini_dir != default_ini_dir {
                log::warn!(
                    "inipath was set to {} but {name} was not found in there, trying default",
                    ini_dir.display()
                );
                return read_mame_ini(&default_ini_dir.join(name)).ok();
            }
            None
        }
    }
}

// ---------------------------------------------------------------------------
// settings.toml override
// ---------------------------------------------------------------------------

/// Canonical path to the shared settings file:
/// `~/.config/mamescope/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("mamescope").join("settings.toml")
}

/// Read `mame.executable` from `settings.toml`, if set.
fn load_executable_override() -> Option<PathBuf> {
    let contents = std::fs::read_to_string(settings_path()).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    let executable = doc.get("mame")?.get("executable")?.as_str()?;
    if executable.is_empty() {
        None
    } else {
        Some(PathBuf::from(executable))
    }
}

/// Save (or clear) the executable path in `settings.toml`.
///
/// Uses `toml::Value` for a surgical update so unrelated settings are
/// preserved.
pub fn save_executable_override(path: Option<&Path>) -> io::Result<()> {
    let settings = settings_path();
    let mut doc: toml::Value = if let Ok(contents) = std::fs::read_to_string(&settings) {
        contents
            .parse()
            .unwrap_or_else(|_| toml::Value::Table(Default::default()))
    } else {
        toml::Value::Table(Default::default())
    };

    let table = doc
        .as_table_mut()
        .ok_or_else(|| io::Error::other("settings.toml root is not a table"))?;
    let mame = table
        .entry("mame")
        .or_insert_with(|| toml::Value::Table(Default::default()));
    let mame_table = mame
        .as_table_mut()
        .ok_or_else(|| io::Error::other("[mame] is not a table"))?;

    match path {
        Some(p) => {
            mame_table.insert(
                "executable".to_string(),
                toml::Value::String(p.to_string_lossy().into_owned()),
            );
        }
        None => {
            mame_table.remove("executable");
        }
    }

    // Write atomically
    if let Some(parent) = settings.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(&doc).map_err(io::Error::other)?;
    let tmp = settings.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, &settings)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_mame_ini() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mame.ini");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            "# comment\nhomepath          $HOME/.mame\nhashpath          hash\nskipinfo\n"
        )
        .unwrap();

        let ini = read_mame_ini(&path).unwrap();
        assert_eq!(ini.get("hashpath").map(String::as_str), Some("hash"));
        assert!(ini.get("homepath").is_some());
        assert!(!ini.contains_key("skipinfo"));
    }

    #[test]
    fn test_parse_multi_path_value() {
        let paths = parse_mame_ini_path("\"roms;/opt/mame/roms\"");
        assert_eq!(paths, vec![PathBuf::from("roms"), PathBuf::from("/opt/mame/roms")]);
    }

    #[test]
    fn test_expand_env_vars() {
        unsafe { std::env::set_var("MAMESCOPE_TEST_VAR", "/data") };
        assert_eq!(expand_env_vars("$MAMESCOPE_TEST_VAR/roms"), "/data/roms");
        assert_eq!(expand_env_vars("${MAMESCOPE_TEST_VAR}/roms"), "/data/roms");
        assert_eq!(expand_env_vars("$MAMESCOPE_UNSET/x"), "$MAMESCOPE_UNSET/x");
        assert_eq!(expand_env_vars("no vars here"), "no vars here");
    }

    #[test]
    fn test_single_path_keeps_first_of_many() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();

        let mut ini = HashMap::new();
        ini.insert(
            "homepath".to_string(),
            format!("{};{}", a.display(), b.display()),
        );
        assert_eq!(try_get_path_from_ini(&ini, "homepath", "test"), Some(a));
    }

    #[test]
    fn test_missing_dirs_are_dropped() {
        let mut ini = HashMap::new();
        ini.insert("artpath".to_string(), "/definitely/not/a/real/dir".to_string());
        assert!(try_get_paths_from_ini(&ini, "artpath", "test").is_empty());
    }

    #[test]
    fn test_timer_db_path() {
        let settings = MameSettings {
            plugin_config_home: Some(PathBuf::from("/home/u/.mame")),
            ..Default::default()
        };
        assert_eq!(
            settings.timer_db_path(),
            Some(PathBuf::from("/home/u/.mame/timer/timer.db"))
        );
        assert_eq!(MameSettings::default().timer_db_path(), None);
    }
}
