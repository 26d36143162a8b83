use serde::{Deserialize, Serialize};

/// Quality marker for a ROM or disk image dump.
///
/// `-listxml` omits the attribute for good dumps, so absence parses as
/// [`DumpStatus::Good`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpStatus {
    Good,
    Bad,
    NoDump,
}

impl Default for DumpStatus {
    fn default() -> Self {
        Self::Good
    }
}

impl DumpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Bad => "baddump",
            Self::NoDump => "nodump",
        }
    }

    /// Parse a status attribute, treating anything unrecognized (or absent)
    /// as a good dump per the format convention.
    pub fn from_str_loose(s: &str) -> Self {
        match s {
            "baddump" => Self::Bad,
            "nodump" => Self::NoDump,
            _ => Self::Good,
        }
    }
}

/// Emulation quality of a driver (or of one aspect of it, e.g. cocktail).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    Good,
    Imperfect,
    Preliminary,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Imperfect => "imperfect",
            Self::Preliminary => "preliminary",
        }
    }

    /// Parse a driver status attribute; unrecognized values yield `None`
    /// rather than an error, since source data varies across tool versions.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "good" => Some(Self::Good),
            "imperfect" => Some(Self::Imperfect),
            "preliminary" => Some(Self::Preliminary),
            _ => None,
        }
    }
}

/// Status of an emulated feature. There is no "good" value — features that
/// work are simply not listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureStatus {
    Imperfect,
    Unemulated,
}

impl FeatureStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "imperfect" => Some(Self::Imperfect),
            "unemulated" => Some(Self::Unemulated),
            _ => None,
        }
    }
}

/// How well a software item runs. Absence of the attribute means supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoftwareSupport {
    Supported,
    Partial,
    NotSupported,
}

impl Default for SoftwareSupport {
    fn default() -> Self {
        Self::Supported
    }
}

impl SoftwareSupport {
    pub fn from_str_loose(s: &str) -> Self {
        match s {
            "partial" => Self::Partial,
            "no" => Self::NotSupported,
            _ => Self::Supported,
        }
    }
}

/// Whether a machine's software list holds its original software or
/// software it happens to be compatible with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoftwareListKind {
    Original,
    Compatible,
}

impl SoftwareListKind {
    pub fn from_str_loose(s: &str) -> Self {
        match s {
            "compatible" => Self::Compatible,
            _ => Self::Original,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_status_defaults_to_good() {
        assert_eq!(DumpStatus::default(), DumpStatus::Good);
        assert_eq!(DumpStatus::from_str_loose("nodump"), DumpStatus::NoDump);
        assert_eq!(DumpStatus::from_str_loose("whatever"), DumpStatus::Good);
    }

    #[test]
    fn test_driver_status_parse() {
        assert_eq!(DriverStatus::parse("imperfect"), Some(DriverStatus::Imperfect));
        assert_eq!(DriverStatus::parse("excellent"), None);
    }

    #[test]
    fn test_software_support_defaults() {
        assert_eq!(SoftwareSupport::from_str_loose("partial"), SoftwareSupport::Partial);
        assert_eq!(SoftwareSupport::from_str_loose("yes"), SoftwareSupport::Supported);
        assert_eq!(SoftwareSupport::default(), SoftwareSupport::Supported);
    }
}
