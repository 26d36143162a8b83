//! Reader for the SQLite database written by MAME's timer plugin.
//!
//! The plugin keeps one `timer` table with per-machine and per-software
//! rows. The whole table is read once into memory; the loaded mapping is
//! immutable for the process lifetime.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimerDbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Play-time totals for one machine or software item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerRow {
    /// Wall-clock time spent, including menus and pauses.
    pub total_time: Duration,
    pub play_count: u64,
    /// Time actually emulated.
    pub emulated_time: Duration,
}

/// The timer database, read fully into memory.
///
/// Machine rows are keyed by basename. Software rows are keyed by
/// `(software list, software)`; rows written without a softlist column fall
/// back to the running machine's basename as the first key component.
#[derive(Debug, Clone, Default)]
pub struct TimerDb {
    pub systems: HashMap<String, TimerRow>,
    pub software: HashMap<(String, String), TimerRow>,
}

impl TimerDb {
    /// Load a timer database from disk. A missing file yields `None`; any
    /// other failure is a real error.
    pub fn try_load(path: &Path) -> Result<Option<Self>, TimerDbError> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    pub fn load(path: &Path) -> Result<Self, TimerDbError> {
        let conn = rusqlite::Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        )?;
        Self::read(&conn)
    }

    fn read(conn: &rusqlite::Connection) -> Result<Self, TimerDbError> {
        let mut db = TimerDb::default();
        let mut stmt = conn.prepare(
            "SELECT driver, software, softlist, total_time, play_count, emu_sec, emu_nsec \
             FROM timer",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let driver: String = row.get(0)?;
            let software: Option<String> = row.get(1)?;
            let softlist: Option<String> = row.get(2)?;
            let total_time: i64 = row.get(3)?;
            let play_count: i64 = row.get(4)?;
            let emu_sec: i64 = row.get(5)?;
            let emu_nsec: i64 = row.get(6)?;

            let timer_row = TimerRow {
                total_time: Duration::from_secs(total_time.max(0) as u64),
                play_count: play_count.max(0) as u64,
                emulated_time: Duration::new(
                    emu_sec.max(0) as u64,
                    (emu_nsec.max(0) as u64 % 1_000_000_000) as u32,
                ),
            };

            match software.filter(|s| !s.is_empty()) {
                Some(software) => {
                    let list = match softlist.filter(|s| !s.is_empty()) {
                        Some(list) => list,
                        None => driver,
                    };
                    db.software.insert((list, software), timer_row);
                }
                None => {
                    db.systems.insert(driver, timer_row);
                }
            }
        }
        Ok(db)
    }

    pub fn system(&self, basename: &str) -> Option<&TimerRow> {
        self.systems.get(basename)
    }

    pub fn software(&self, software_list: &str, software: &str) -> Option<&TimerRow> {
        self.software
            .get(&(software_list.to_string(), software.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_db(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("timer.db");
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE timer (
                driver TEXT,
                software TEXT,
                softlist TEXT,
                total_time INTEGER,
                play_count INTEGER,
                emu_sec INTEGER,
                emu_nsec INTEGER
            );
            INSERT INTO timer VALUES ('puckman', '', '', 3600, 12, 3500, 500000000);
            INSERT INTO timer VALUES ('nes', 'smb', 'nes', 120, 2, 100, 0);
            INSERT INTO timer VALUES ('coleco', 'donkeykong', '', 60, 1, 55, 0);",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_load_system_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = TimerDb::load(&make_db(dir.path())).unwrap();

        let row = db.system("puckman").unwrap();
        assert_eq!(row.total_time, Duration::from_secs(3600));
        assert_eq!(row.play_count, 12);
        assert_eq!(row.emulated_time, Duration::new(3500, 500_000_000));
    }

    #[test]
    fn test_load_software_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = TimerDb::load(&make_db(dir.path())).unwrap();

        assert!(db.software("nes", "smb").is_some());
        // No softlist column — keyed by the running machine instead
        assert!(db.software("coleco", "donkeykong").is_some());
        assert!(db.software("nes", "donkeykong").is_none());
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = TimerDb::try_load(&dir.path().join("nope.db")).unwrap();
        assert!(loaded.is_none());
    }
}
