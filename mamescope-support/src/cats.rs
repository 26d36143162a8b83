//! Category/folder `.ini` files (catlist.ini, series.ini, nplayers.ini, ...)
//! read into memory as one [`CategoryFolder`].

use std::collections::{HashMap, HashSet};
use std::path::Path;

use mamescope_core::Basename;

use crate::error::SupportError;

/// Sections of one category file, in file order, each with its member set.
///
/// File order matters: when a basename appears in more than one section, the
/// singular query deterministically yields the first one.
pub type CategorySections = Vec<(String, HashSet<Basename>)>;

/// Parse a generic category ini: bracketed `[SECTION]` headers, one basename
/// per line, `;` comments. Meta sections like `FOLDER_SETTINGS` are parsed
/// like any other; callers just never ask for them.
pub fn parse_category_ini(path: &Path) -> Result<CategorySections, SupportError> {
    // series.ini has shipped with broken UTF-8 before, so decode lossily
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);

    let mut sections: CategorySections = Vec::new();
    let mut current: Option<usize> = None;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if let Some(rest) = line.strip_prefix('[') {
            let name = rest.strip_suffix(']').unwrap_or(rest);
            current = Some(section_index(&mut sections, name));
        } else if let Some(index) = current {
            sections[index].1.insert(line.to_string());
        }
    }
    Ok(sections)
}

/// Parse nplayers.ini, whose `[NPlayers]` section maps basename → category
/// and must be inverted: group keys by their shared value. Absence of the
/// section yields an empty mapping.
pub fn parse_nplayers_ini(path: &Path) -> Result<CategorySections, SupportError> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);

    let mut sections: CategorySections = Vec::new();
    let mut in_nplayers = false;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if let Some(rest) = line.strip_prefix('[') {
            let name = rest.strip_suffix(']').unwrap_or(rest);
            in_nplayers = name == "NPlayers";
            continue;
        }
        if !in_nplayers {
            continue;
        }
        // Usually `basename = category`, but bare whitespace-separated
        // pairs show up too
        let pair = line
            .split_once('=')
            .or_else(|| line.split_once(char::is_whitespace));
        if let Some((basename, value)) = pair {
            let index = section_index(&mut sections, value.trim());
            sections[index].1.insert(basename.trim().to_string());
        }
    }
    Ok(sections)
}

fn section_index(sections: &mut CategorySections, name: &str) -> usize {
    match sections.iter().position(|(n, _)| n == name) {
        Some(index) => index,
        None => {
            sections.push((name.to_string(), HashSet::new()));
            sections.len() - 1
        }
    }
}

/// Holds every category `.ini` file of a folder after reading them all into
/// memory, keyed by file stem.
#[derive(Debug, Clone, Default)]
pub struct CategoryFolder {
    cats: HashMap<String, CategorySections>,
}

impl CategoryFolder {
    pub fn new(cats: HashMap<String, CategorySections>) -> Self {
        Self { cats }
    }

    /// Read every `.ini` file in the folder; the file stem becomes the
    /// category name. `nplayers.ini` gets the inverted dialect.
    pub fn load_from_folder(path: &Path) -> Result<Self, SupportError> {
        let mut cats = HashMap::new();
        for entry in std::fs::read_dir(path)?.flatten() {
            let file_path = entry.path();
            let is_ini = file_path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("ini"));
            if !is_ini {
                continue;
            }
            let Some(stem) = file_path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let parsed = if entry.file_name() == "nplayers.ini" {
                parse_nplayers_ini(&file_path)?
            } else {
                parse_category_ini(&file_path)?
            };
            cats.insert(stem.to_string(), parsed);
        }
        Ok(Self { cats })
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.cats.keys().map(String::as_str)
    }

    /// All section names containing `basename`, in file order. Empty when
    /// the category is unknown or nothing matches.
    pub fn get_cats(&self, cat_name: &str, basename: &str) -> Vec<&str> {
        let Some(sections) = self.cats.get(cat_name) else {
            return Vec::new();
        };
        sections
            .iter()
            .filter(|(_, names)| names.contains(basename))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// The single section containing `basename`, where only one is expected.
    /// More than one match is a warning condition, not an error; the first
    /// in file order wins.
    pub fn get_cat(&self, cat_name: &str, basename: &str) -> Option<&str> {
        let sections = self.get_cats(cat_name, basename);
        if sections.len() > 1 {
            log::warn!("More than one {cat_name} for {basename}, using first");
        }
        sections.first().copied()
    }
}
