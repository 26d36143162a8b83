//! Parser for mameinfo.dat entries.
//!
//! The mameinfo dialect differs from the history one: headers are whole
//! lines ending in `:` from a fixed vocabulary, some sections are
//! line-oriented lists (BIOS, DEVICE, ROMS), and `Recommended Games`
//! headers carry an optional parenthesized platform and no trailing colon.
//! Parsing is a single forward pass that finishes any open section at
//! end of input.

/// Free-text section headers (matched with a trailing `:`).
const NORMAL_SECTIONS: &[&str] = &[
    "WIP",
    "CHANGES",
    "TODO",
    "TEST MODE",
    "Bugs",
    "NOTE",
    "NOTES",
    "SETUP",
    "SETUP and TEST MODE",
    "SERVICE MODE",
    "SETUP/SERVICE MODE",
    "STORY",
    "HOW TO PLAY",
];

/// Line-oriented section headers (matched with a trailing `:`).
const LIST_SECTIONS: &[&str] = &["BIOS", "DEVICE", "ROMS", "Other Emulators"];

enum Bucket {
    Summary,
    Section(String),
    List(String),
    Recommended(String),
    /// After a single-line scalar section; following stray lines go nowhere.
    Void,
}

/// A parsed mameinfo.dat entry.
///
/// The text at the top (generally "version added [author]") lands in the
/// summary; everything else is routed by header into free-text sections,
/// list sections, or recommended-games groups.
#[derive(Debug, Clone, Default)]
pub struct MameInfoEntry {
    sections: Vec<(String, String)>,
    list_sections: Vec<(String, Vec<String>)>,
    recommended_games: Vec<(String, Vec<String>)>,
}

impl MameInfoEntry {
    pub fn parse(contents: &str) -> Self {
        let contents = contents.strip_prefix("$mame\n").unwrap_or(contents);

        let mut entry = MameInfoEntry::default();
        let mut bucket = Bucket::Summary;
        let mut lines: Vec<String> = Vec::new();

        for line in contents.split('\n') {
            let header = line.strip_suffix(':');
            if let Some(header) = header.filter(|h| NORMAL_SECTIONS.contains(h)) {
                entry.finish(&mut bucket, &mut lines);
                bucket = Bucket::Section(header.to_string());
            } else if let Some(header) = header.filter(|h| LIST_SECTIONS.contains(h)) {
                entry.finish(&mut bucket, &mut lines);
                bucket = Bucket::List(header.to_string());
            } else if line.starts_with("Recommended Games") {
                // Sometimes there's a platform in parens, sometimes no colon
                // and nothing to recommend at all
                entry.finish(&mut bucket, &mut lines);
                bucket = Bucket::Recommended(recommended_key(line));
            } else if let Some(value) = line.strip_prefix("LEVELS:") {
                // Not always just an int, e.g. "50-30-45 (Cookie & Bibi ...)"
                entry.finish(&mut bucket, &mut lines);
                entry.sections.push(("Levels".to_string(), value.trim().to_string()));
                bucket = Bucket::Void;
            } else if let Some(value) = line.strip_prefix("ARCADE RELEASE:") {
                // Weird date format, e.g. 2000/Oct/18
                entry.finish(&mut bucket, &mut lines);
                entry
                    .sections
                    .push(("Release date".to_string(), value.trim().to_string()));
                bucket = Bucket::Void;
            } else if line.starts_with("Romset:") || line.starts_with("CHD:") {
                continue;
            } else {
                let stripped = line
                    .strip_prefix("- ")
                    .or_else(|| line.strip_prefix("* "))
                    .unwrap_or(line);
                lines.push(stripped.trim().to_string());
            }
        }
        entry.finish(&mut bucket, &mut lines);
        entry
    }

    /// Flush accumulated non-empty lines into the bucket being left.
    fn finish(&mut self, bucket: &mut Bucket, lines: &mut Vec<String>) {
        let kept: Vec<String> = lines.drain(..).filter(|l| !l.is_empty()).collect();
        match std::mem::replace(bucket, Bucket::Summary) {
            Bucket::Summary => self.sections.push(("summary".to_string(), kept.join("\n"))),
            Bucket::Section(name) => self.sections.push((name, kept.join("\n"))),
            Bucket::List(name) => self.list_sections.push((name, kept)),
            Bucket::Recommended(key) => self.recommended_games.push((key, kept)),
            Bucket::Void => {}
        }
    }

    /// The free-text at the top of the entry, before any header.
    pub fn summary(&self) -> Option<&str> {
        self.section("summary")
    }

    pub fn section(&self, name: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, body)| body.as_str())
    }

    pub fn list_section(&self, name: &str) -> Option<&[String]> {
        self.list_sections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, lines)| lines.as_slice())
    }

    /// Recommended games for one platform group (`"Games"` for the
    /// unqualified header).
    pub fn recommended(&self, platform: &str) -> Option<&[String]> {
        self.recommended_games
            .iter()
            .find(|(n, _)| n == platform)
            .map(|(_, games)| games.as_slice())
    }

    pub fn sections(&self) -> &[(String, String)] {
        &self.sections
    }

    pub fn list_sections(&self) -> &[(String, Vec<String>)] {
        &self.list_sections
    }

    pub fn recommended_games(&self) -> &[(String, Vec<String>)] {
        &self.recommended_games
    }
}

/// Key for a `Recommended Games` header: the parenthesized platform when
/// present, else `"Games"`.
fn recommended_key(line: &str) -> String {
    match (line.find('('), line.rfind(')')) {
        (Some(open), Some(close)) if close > open => line[open + 1..close].to_string(),
        _ => "Games".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "$mame\n\
0.37b16 [Luca Elia]\n\
Artwork available\n\
\n\
WIP:\n\
- 0.250: Fixed sprite priorities\n\
* 0.249: Added sound\n\
\n\
TEST MODE:\n\
Hold P1 start while booting\n\
\n\
LEVELS: 32\n\
\n\
ROMS:\n\
epr-12345.bin\n\
epr-12346.bin\n\
\n\
Romset: 512 KB\n\
CHD: 2 GB\n\
\n\
Recommended Games (Fighter):\n\
sf2\n\
kof98\n\
\n\
Recommended Games:\n\
pacman\n";

    #[test]
    fn test_summary() {
        let entry = MameInfoEntry::parse(SAMPLE);
        assert_eq!(entry.summary(), Some("0.37b16 [Luca Elia]\nArtwork available"));
    }

    #[test]
    fn test_normal_sections() {
        let entry = MameInfoEntry::parse(SAMPLE);
        assert_eq!(
            entry.section("WIP"),
            Some("0.250: Fixed sprite priorities\n0.249: Added sound")
        );
        assert_eq!(entry.section("TEST MODE"), Some("Hold P1 start while booting"));
    }

    #[test]
    fn test_bullets_are_stripped() {
        let entry = MameInfoEntry::parse(SAMPLE);
        assert!(!entry.section("WIP").unwrap().contains("- 0.250"));
        assert!(!entry.section("WIP").unwrap().contains("* 0.249"));
    }

    #[test]
    fn test_levels_scalar() {
        let entry = MameInfoEntry::parse(SAMPLE);
        assert_eq!(entry.section("Levels"), Some("32"));
    }

    #[test]
    fn test_list_section() {
        let entry = MameInfoEntry::parse(SAMPLE);
        assert_eq!(
            entry.list_section("ROMS"),
            Some(&["epr-12345.bin".to_string(), "epr-12346.bin".to_string()][..])
        );
    }

    #[test]
    fn test_romset_and_chd_discarded() {
        let entry = MameInfoEntry::parse(SAMPLE);
        for (_, body) in entry.sections() {
            assert!(!body.contains("Romset"));
            assert!(!body.contains("CHD"));
        }
        for (_, lines) in entry.list_sections() {
            assert!(!lines.iter().any(|l| l.contains("Romset") || l.contains("CHD")));
        }
    }

    #[test]
    fn test_recommended_games_groups() {
        let entry = MameInfoEntry::parse(SAMPLE);
        assert_eq!(
            entry.recommended("Fighter"),
            Some(&["sf2".to_string(), "kof98".to_string()][..])
        );
        assert_eq!(entry.recommended("Games"), Some(&["pacman".to_string()][..]));
    }

    #[test]
    fn test_arcade_release_scalar() {
        let entry = MameInfoEntry::parse("$mame\n0.1 [Someone]\nARCADE RELEASE: 2000/Oct/18\n");
        assert_eq!(entry.section("Release date"), Some("2000/Oct/18"));
    }

    #[test]
    fn test_open_section_finished_at_eof() {
        let entry = MameInfoEntry::parse("$mame\nsummary line\nBIOS:\nneogeo");
        assert_eq!(entry.list_section("BIOS"), Some(&["neogeo".to_string()][..]));
    }

    #[test]
    fn test_recommended_header_without_colon() {
        // Header with a platform but no colon and nothing listed
        let entry = MameInfoEntry::parse("$mame\ntop\nRecommended Games (Shooter)\n");
        assert_eq!(entry.recommended("Shooter"), Some(&[][..]));
    }
}
