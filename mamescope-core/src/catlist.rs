//! Parser for catlist.ini composite category strings.
//!
//! A catlist section name packs a whole taxonomy into one string, e.g.
//! `"Arcade: Shooter / Rail / Turn-based * Mature"`: an optional `Arcade:`
//! prefix, slash-delimited genre components, and an optional `* EXTRA`
//! suffix carrying flags. Decomposition is pure and total — any string
//! yields some classification, with [`MachineType::Other`] as the fallback.

use crate::machine_type::MachineType;

/// A decomposed catlist category string.
#[derive(Debug, Clone)]
pub struct CatlistCategory {
    /// The category part, before any `" * "` separator (prefix included).
    pub category: String,
    /// The flag part after `" * "`, if any (`TTL`, `Mature`).
    pub extra: Option<String>,
    components: Vec<String>,
    is_arcade: bool,
}

impl CatlistCategory {
    pub fn parse(raw: &str) -> Self {
        let (category, extra) = match raw.split_once(" * ") {
            Some((cat, extra)) => (cat.to_string(), Some(extra.to_string())),
            None => (raw.to_string(), None),
        };
        let is_arcade = category.starts_with("Arcade: ");
        let stripped = category.strip_prefix("Arcade: ").unwrap_or(&category);
        let components = stripped.split(" / ").map(str::to_string).collect();
        Self {
            category,
            extra,
            components,
            is_arcade,
        }
    }

    /// Slash-delimited components with the `Arcade:` prefix stripped.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn is_arcade(&self) -> bool {
        self.is_arcade
    }

    /// Discrete-logic game with no CPU.
    pub fn is_ttl(&self) -> bool {
        self.extra.as_deref() == Some("TTL")
    }

    pub fn is_mature(&self) -> bool {
        self.extra.as_deref() == Some("Mature")
    }

    fn is_plug_and_play(&self) -> bool {
        self.components.first().map(String::as_str) == Some("Handheld")
            && self.components.iter().any(|c| c == "Plug n' Play TV Game")
    }

    /// Whether this type takes its genre/subgenre from components 1 and 2
    /// (the first component being the mechanical/redemption family name).
    fn is_mechanical_family(machine_type: MachineType) -> bool {
        matches!(
            machine_type,
            MachineType::Mechanical
                | MachineType::Pinball
                | MachineType::Redemption
                | MachineType::MedalGame
        )
    }

    pub fn machine_type(&self) -> MachineType {
        if self.category == "Arcade: System / BIOS" {
            return MachineType::Bios;
        }
        if let Some(first) = self.components.first() {
            let genre_type = match first.as_str() {
                "Slot Machine" | "Casino" => Some(MachineType::Gambling),
                "Redemption Game" => Some(MachineType::Redemption),
                "Medal Game" => Some(MachineType::MedalGame),
                "Coin Pusher" => Some(MachineType::CoinPusher),
                "Print Club" => Some(MachineType::PrintClub),
                _ => None,
            };
            if let Some(machine_type) = genre_type {
                return machine_type;
            }
            if first == "Electromechanical" {
                if self.components.get(1).map(String::as_str) == Some("Pinball") {
                    return MachineType::Pinball;
                }
                return MachineType::Mechanical;
            }
        }
        if self.is_arcade {
            return MachineType::Arcade;
        }
        if self.is_plug_and_play() {
            return MachineType::PlugAndPlay;
        }
        if self.category == "Handheld / Electronic Game" {
            return MachineType::LcdHandheld;
        }
        MachineType::Other
    }

    pub fn genre(&self) -> Option<&str> {
        let machine_type = self.machine_type();
        if Self::is_mechanical_family(machine_type) {
            return self.components.get(1).map(String::as_str);
        }
        if self.is_arcade {
            return self.components.first().map(String::as_str);
        }
        if self.is_plug_and_play() {
            return self.components.get(2).map(String::as_str);
        }
        None
    }

    pub fn subgenre(&self) -> Option<&str> {
        let machine_type = self.machine_type();
        if Self::is_mechanical_family(machine_type) {
            return self.components.get(2).map(String::as_str);
        }
        if self.is_arcade {
            return self.components.get(1).map(String::as_str);
        }
        None
    }
}

impl std::fmt::Display for CatlistCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Catlist ({}, type: {}, arcade: {}",
            self.components.join("/"),
            self.machine_type(),
            self.is_arcade
        )?;
        if let Some(ref extra) = self.extra {
            write!(f, ", extra: {extra}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arcade_with_subgenre_and_mature_flag() {
        let cat = CatlistCategory::parse("Arcade: Shooter / Rail / Turn-based * Mature");
        assert!(cat.is_arcade());
        assert_eq!(cat.machine_type(), MachineType::Arcade);
        assert_eq!(cat.genre(), Some("Shooter"));
        assert_eq!(cat.subgenre(), Some("Rail"));
        assert!(cat.is_mature());
        assert!(!cat.is_ttl());
    }

    #[test]
    fn test_electromechanical_pinball() {
        let cat = CatlistCategory::parse("Electromechanical / Pinball");
        assert_eq!(cat.machine_type(), MachineType::Pinball);
        assert_eq!(cat.genre(), Some("Pinball"));
        assert_eq!(cat.subgenre(), None);
    }

    #[test]
    fn test_electromechanical_without_pinball() {
        let cat = CatlistCategory::parse("Electromechanical / Utilities / Redemption Board");
        assert_eq!(cat.machine_type(), MachineType::Mechanical);
        assert_eq!(cat.genre(), Some("Utilities"));
        assert_eq!(cat.subgenre(), Some("Redemption Board"));
    }

    #[test]
    fn test_bare_electromechanical_does_not_panic() {
        let cat = CatlistCategory::parse("Electromechanical");
        assert_eq!(cat.machine_type(), MachineType::Mechanical);
        assert_eq!(cat.genre(), None);
    }

    #[test]
    fn test_slot_machine_is_gambling() {
        let cat = CatlistCategory::parse("Slot Machine");
        assert_eq!(cat.machine_type(), MachineType::Gambling);
        assert_eq!(cat.genre(), None);
    }

    #[test]
    fn test_casino_is_gambling() {
        let cat = CatlistCategory::parse("Casino / Cards");
        assert_eq!(cat.machine_type(), MachineType::Gambling);
    }

    #[test]
    fn test_system_bios() {
        let cat = CatlistCategory::parse("Arcade: System / BIOS");
        assert_eq!(cat.machine_type(), MachineType::Bios);
    }

    #[test]
    fn test_plug_and_play() {
        let cat =
            CatlistCategory::parse("Handheld / Plug n' Play TV Game / Sports / Dance");
        assert_eq!(cat.machine_type(), MachineType::PlugAndPlay);
        assert_eq!(cat.genre(), Some("Sports"));
    }

    #[test]
    fn test_plug_and_play_without_genre() {
        let cat = CatlistCategory::parse("Handheld / Plug n' Play TV Game");
        assert_eq!(cat.machine_type(), MachineType::PlugAndPlay);
        assert_eq!(cat.genre(), None);
    }

    #[test]
    fn test_lcd_handheld() {
        let cat = CatlistCategory::parse("Handheld / Electronic Game");
        assert_eq!(cat.machine_type(), MachineType::LcdHandheld);
    }

    #[test]
    fn test_unknown_category_falls_back_to_other() {
        let cat = CatlistCategory::parse("Unknown Category Type");
        assert_eq!(cat.machine_type(), MachineType::Other);
        assert_eq!(cat.genre(), None);
        assert_eq!(cat.subgenre(), None);
    }

    #[test]
    fn test_ttl_flag() {
        let cat = CatlistCategory::parse("Arcade: Ball & Paddle / Pong * TTL");
        assert!(cat.is_ttl());
        assert!(!cat.is_mature());
        assert_eq!(cat.machine_type(), MachineType::Arcade);
        assert_eq!(cat.genre(), Some("Ball & Paddle"));
    }

    #[test]
    fn test_empty_string() {
        let cat = CatlistCategory::parse("");
        assert_eq!(cat.machine_type(), MachineType::Other);
    }
}
