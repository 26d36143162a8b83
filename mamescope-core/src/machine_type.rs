use serde::{Deserialize, Serialize};

/// Kinds of things MAME emulates, which may or may not be found in an
/// arcade, and may or may not be thought of as a normal arcade game.
///
/// This enum centralizes machine identity in one place, replacing ad-hoc
/// string matching against category data throughout the codebase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineType {
    /// Normal arcade game
    Arcade,
    /// Arcade system BIOS that runs other arcade games
    Bios,
    /// Coin pusher cabinet
    CoinPusher,
    /// Cartridge for a console where the CPU lives in each cartridge, so
    /// MAME models every cartridge as its own machine
    ConsoleCartridge,
    /// Gambling machine, usually found in a casino rather than an arcade
    Gambling,
    /// Handheld game console with inbuilt games
    Handheld,
    /// Handheld game with ink/LCD graphics
    LcdHandheld,
    /// Arcade-adjacent game that is more about winning tickets than gameplay
    Redemption,
    /// Like redemption but with medals
    MedalGame,
    /// Game with mechanical elements
    Mechanical,
    /// Pinball machine
    Pinball,
    /// Home console that connects to a TV without any separate games
    PlugAndPlay,
    /// Booth for taking photos
    PrintClub,
    /// Some other thing
    Other,
}

impl MachineType {
    /// Variant name, used as the default platform label.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Arcade => "Arcade",
            Self::Bios => "BIOS",
            Self::CoinPusher => "CoinPusher",
            Self::ConsoleCartridge => "ConsoleCartridge",
            Self::Gambling => "Gambling",
            Self::Handheld => "Handheld",
            Self::LcdHandheld => "LCDHandheld",
            Self::Redemption => "Redemption",
            Self::MedalGame => "MedalGame",
            Self::Mechanical => "Mechanical",
            Self::Pinball => "Pinball",
            Self::PlugAndPlay => "PlugAndPlay",
            Self::PrintClub => "PrintClub",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for MachineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
