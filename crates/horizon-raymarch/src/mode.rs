//! The three built-in scene modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which scene is rendered. Each mode owns one compiled program.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneMode {
    /// Close-up black hole with a thin turbulent accretion disk.
    #[default]
    BlackHole,
    /// Active galactic nucleus: disk, relativistic jets and a dusty torus.
    Agn,
    /// Distant "cosmic lighthouse": core, beamed jets and a nebula disk.
    FarAway,
}

/// Error returned when a mode name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scene mode '{0}' (expected black-hole, agn or far-away)")]
pub struct ParseSceneModeError(pub String);

impl SceneMode {
    /// All modes in cycling order.
    pub const ALL: [SceneMode; 3] = [SceneMode::BlackHole, SceneMode::Agn, SceneMode::FarAway];

    /// Position of this mode in [`SceneMode::ALL`].
    pub fn index(self) -> usize {
        match self {
            SceneMode::BlackHole => 0,
            SceneMode::Agn => 1,
            SceneMode::FarAway => 2,
        }
    }

    /// Mode at `index`, wrapping around the three modes.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// The mode after this one, wrapping from `FarAway` back to `BlackHole`.
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Stable kebab-case name used on the command line and in logs.
    pub fn name(self) -> &'static str {
        match self {
            SceneMode::BlackHole => "black-hole",
            SceneMode::Agn => "agn",
            SceneMode::FarAway => "far-away",
        }
    }

    /// Human-readable title.
    pub fn title(self) -> &'static str {
        match self {
            SceneMode::BlackHole => "Black Hole",
            SceneMode::Agn => "AGN",
            SceneMode::FarAway => "Far Away",
        }
    }

    /// Text for the control that advances the mode; it names the *next* mode.
    pub fn switch_label(self) -> String {
        format!("Switch to {}", self.next().title())
    }
}

impl fmt::Display for SceneMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SceneMode {
    type Err = ParseSceneModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "black-hole" | "blackhole" | "bh" => Ok(SceneMode::BlackHole),
            "agn" | "quasar" => Ok(SceneMode::Agn),
            "far-away" | "faraway" | "far" | "lighthouse" => Ok(SceneMode::FarAway),
            _ => Err(ParseSceneModeError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_black_hole() {
        assert_eq!(SceneMode::default(), SceneMode::BlackHole);
    }

    #[test]
    fn test_cycle_wraps_after_three() {
        for mode in SceneMode::ALL {
            assert_eq!(mode.next().next().next(), mode);
            assert_ne!(mode.next(), mode);
        }
    }

    #[test]
    fn test_cycle_order_matches_all() {
        assert_eq!(SceneMode::BlackHole.next(), SceneMode::Agn);
        assert_eq!(SceneMode::Agn.next(), SceneMode::FarAway);
        assert_eq!(SceneMode::FarAway.next(), SceneMode::BlackHole);
    }

    #[test]
    fn test_index_roundtrip() {
        for mode in SceneMode::ALL {
            assert_eq!(SceneMode::from_index(mode.index()), mode);
        }
        assert_eq!(SceneMode::from_index(4), SceneMode::Agn);
    }

    #[test]
    fn test_switch_labels_name_next_mode() {
        assert_eq!(SceneMode::BlackHole.switch_label(), "Switch to AGN");
        assert_eq!(SceneMode::Agn.switch_label(), "Switch to Far Away");
        assert_eq!(SceneMode::FarAway.switch_label(), "Switch to Black Hole");
    }

    #[test]
    fn test_parse_names() {
        for mode in SceneMode::ALL {
            assert_eq!(mode.name().parse::<SceneMode>(), Ok(mode));
            assert_eq!(mode.to_string().parse::<SceneMode>(), Ok(mode));
        }
        assert_eq!("Far_Away".parse::<SceneMode>(), Ok(SceneMode::FarAway));
        assert!("wormhole".parse::<SceneMode>().is_err());
    }

    #[test]
    fn test_ron_uses_variant_identifiers() {
        let ron_str = ron::to_string(&SceneMode::FarAway).unwrap();
        assert_eq!(ron_str, "FarAway");
        let parsed: SceneMode = ron::from_str("Agn").unwrap();
        assert_eq!(parsed, SceneMode::Agn);
    }
}
