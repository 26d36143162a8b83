//! Splitting of history/info documentation blobs into named sections, and
//! the structured view over a history entry.

/// Split documentation text into sections delimited by `- SECTION -` lines.
///
/// The delimiter pattern includes the preceding newline, so the very first
/// line of the blob can never be a header. Text before the first delimiter
/// is stored under the empty-string key (always present, possibly empty).
/// Bodies are trimmed; order and duplicate headers are preserved.
pub fn split_info_sections(text: &str) -> Vec<(String, String)> {
    let mut sections: Vec<(String, String)> = Vec::new();
    let mut current_name = String::new();
    let mut current_lines: Vec<&str> = Vec::new();

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 && let Some(name) = section_header(line) {
            sections.push((
                std::mem::take(&mut current_name),
                current_lines.join("\n").trim().to_string(),
            ));
            current_lines.clear();
            current_name = name.to_string();
        } else {
            current_lines.push(line);
        }
    }
    sections.push((current_name, current_lines.join("\n").trim().to_string()));
    sections
}

fn section_header(line: &str) -> Option<&str> {
    line.strip_prefix("- ")?.strip_suffix(" -")
}

/// Fixed set of section headers with named accessors on [`HistoryEntry`].
const KNOWN_SECTIONS: &[&str] = &[
    "TECHNICAL",
    "TRIVIA",
    "TIPS AND TRICKS",
    "UPDATES",
    "SCORING",
    "SERIES",
    "STAFF",
    "PORTS",
    "CAST OF CHARACTERS",
];

/// Structured view over the text of one history entry.
///
/// The leading section conventionally starts with a line like
/// `"Arcade published 5 years ago: ..."`; when it doesn't, the whole
/// leading text becomes the description. Missing sections yield `None`,
/// never an error.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    sections: Vec<(String, String)>,
    entry_type: Option<String>,
    age: Option<i64>,
    description: Option<String>,
}

impl HistoryEntry {
    pub fn parse(text: &str) -> Self {
        let sections = split_info_sections(text);
        let lead_in = sections
            .iter()
            .find(|(name, _)| name.is_empty())
            .map(|(_, body)| body.as_str())
            .unwrap_or("");
        let (entry_type, age, description) = parse_lead_in(lead_in);
        Self {
            sections,
            entry_type,
            age,
            description,
        }
    }

    /// All sections in original order, the lead-in keyed by `""`.
    pub fn sections(&self) -> &[(String, String)] {
        &self.sections
    }

    fn section(&self, name: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, body)| body.as_str())
    }

    /// The kind of entry ("Arcade", "Console", ...), from the lead-in line.
    pub fn entry_type(&self) -> Option<&str> {
        self.entry_type.as_deref()
    }

    /// Years ago (relative to when the history file was updated).
    pub fn age(&self) -> Option<i64> {
        self.age
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn technical_info(&self) -> Option<&str> {
        self.section("TECHNICAL")
    }

    pub fn trivia(&self) -> Option<&str> {
        self.section("TRIVIA")
    }

    pub fn tips_and_tricks(&self) -> Option<&str> {
        self.section("TIPS AND TRICKS")
    }

    pub fn updates(&self) -> Option<&str> {
        self.section("UPDATES")
    }

    pub fn scoring(&self) -> Option<&str> {
        self.section("SCORING")
    }

    pub fn series_info(&self) -> Option<&str> {
        self.section("SERIES")
    }

    pub fn staff(&self) -> Option<&str> {
        self.section("STAFF")
    }

    pub fn ports(&self) -> Option<&str> {
        self.section("PORTS")
    }

    pub fn cast(&self) -> Option<&str> {
        // maybe also appears as CAST OF ELEMENTS?
        self.section("CAST OF CHARACTERS")
    }

    /// Every section without a named accessor, original headers preserved.
    pub fn other_sections(&self) -> Vec<(&str, &str)> {
        self.sections
            .iter()
            .filter(|(name, _)| !name.is_empty() && !KNOWN_SECTIONS.contains(&name.as_str()))
            .map(|(name, body)| (name.as_str(), body.as_str()))
            .collect()
    }
}

/// Parse `"<TYPE> published <AGE> years ago: <DESCRIPTION>"`. When the
/// pattern doesn't match, the whole text is the description.
fn parse_lead_in(lead_in: &str) -> (Option<String>, Option<i64>, Option<String>) {
    if lead_in.is_empty() {
        return (None, None, None);
    }
    // The pattern only counts on the first line of the lead-in
    let Some((head, rest)) = lead_in.split_once(" years ago:") else {
        return (None, None, Some(lead_in.to_string()));
    };
    if head.contains('\n') {
        return (None, None, Some(lead_in.to_string()));
    }
    let Some((entry_type, age)) = head.rsplit_once(" published ") else {
        return (None, None, Some(lead_in.to_string()));
    };
    (
        Some(entry_type.to_string()),
        age.trim().parse().ok(),
        Some(rest.trim().to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_no_delimiters() {
        let sections = split_info_sections("  just some text\nover two lines  ");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, "");
        assert_eq!(sections[0].1, "just some text\nover two lines");
    }

    #[test]
    fn test_split_with_sections() {
        let text = "Intro text.\n- TECHNICAL -\nSome hardware.\n- TRIVIA -\nSome trivia.\n";
        let sections = split_info_sections(text);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0], ("".to_string(), "Intro text.".to_string()));
        assert_eq!(
            sections[1],
            ("TECHNICAL".to_string(), "Some hardware.".to_string())
        );
        assert_eq!(sections[2], ("TRIVIA".to_string(), "Some trivia.".to_string()));
    }

    #[test]
    fn test_split_round_trip() {
        // Concatenating bodies in order reproduces the content modulo the
        // delimiter markers and trimming
        let text = "lead\n- A -\nbody a\nline two\n- B -\nbody b";
        let sections = split_info_sections(text);
        let rebuilt: Vec<&str> = sections.iter().map(|(_, body)| body.as_str()).collect();
        assert_eq!(rebuilt, vec!["lead", "body a\nline two", "body b"]);
    }

    #[test]
    fn test_first_line_is_never_a_header() {
        let sections = split_info_sections("- NOT A SECTION -\nrest");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, "");
        assert!(sections[0].1.starts_with("- NOT A SECTION -"));
    }

    #[test]
    fn test_empty_lead_in_bucket_is_kept() {
        let sections = split_info_sections("\n- A -\nbody");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0], ("".to_string(), "".to_string()));
        assert_eq!(sections[1], ("A".to_string(), "body".to_string()));
    }

    #[test]
    fn test_history_entry_lead_in() {
        let entry = HistoryEntry::parse("Arcade published 5 years ago: A great game.");
        assert_eq!(entry.entry_type(), Some("Arcade"));
        assert_eq!(entry.age(), Some(5));
        assert_eq!(entry.description(), Some("A great game."));
    }

    #[test]
    fn test_history_entry_unparsable_age() {
        let entry = HistoryEntry::parse("Console published some years ago: Hmm.");
        assert_eq!(entry.entry_type(), Some("Console"));
        assert_eq!(entry.age(), None);
        assert_eq!(entry.description(), Some("Hmm."));
    }

    #[test]
    fn test_history_entry_no_pattern() {
        let entry = HistoryEntry::parse("Just a plain description.");
        assert_eq!(entry.entry_type(), None);
        assert_eq!(entry.age(), None);
        assert_eq!(entry.description(), Some("Just a plain description."));
    }

    #[test]
    fn test_history_entry_sections() {
        let text = "Arcade published 40 years ago: Maze chase.\n\
                    - TECHNICAL -\nZ80 at 3.072 MHz.\n\
                    - SCORING -\nDots are 10 points.\n\
                    - WHAT ELSE -\nSomething else.\n";
        let entry = HistoryEntry::parse(text);
        assert_eq!(entry.technical_info(), Some("Z80 at 3.072 MHz."));
        assert_eq!(entry.scoring(), Some("Dots are 10 points."));
        assert_eq!(entry.trivia(), None);
        assert_eq!(entry.other_sections(), vec![("WHAT ELSE", "Something else.")]);
    }
}
