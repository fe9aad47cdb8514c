//! Difficulty profiles for the horror director.
//!
//! Profiles adjust the director knobs of a base
//! [`NightmareConfig`](nightmare_core::NightmareConfig). Observation and
//! analysis settings are left alone.

use std::fmt;

use clap::ValueEnum;
use nightmare_core::NightmareConfig;
use nightmare_core::config::MoodRule;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Difficulty Profiles
// ---------------------------------------------------------------------------

/// How hard the director pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyProfile {
    /// Rare, gentle scares with long quiet spells.
    Calm,
    /// Default tuning.
    #[default]
    Standard,
    /// Frequent, strong scares; mood follows what works.
    Relentless,
}

impl DifficultyProfile {
    /// Human-readable description.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Calm => "Calm: rare, gentle scares with long quiet spells",
            Self::Standard => "Standard: balanced pacing",
            Self::Relentless => "Relentless: frequent, escalating scares",
        }
    }

    /// Overwrite the director section of `config` with this profile's knobs.
    pub fn apply(self, config: &mut NightmareConfig) {
        let d = &mut config.director;
        match self {
            Self::Calm => {
                d.initial_mood = 0.2;
                d.tension_increment = 0.005;
                d.base_chance_factor = 0.05;
                d.first_scare_bonus = 0.15;
                d.short_gap_secs = 45.0;
                d.long_gap_secs = 90.0;
                d.sanity_cost_factor = 3.0;
                d.mood_rule = MoodRule::Fixed;
            }
            Self::Standard => {
                *d = nightmare_core::config::DirectorConfig::default();
            }
            Self::Relentless => {
                d.initial_mood = 0.5;
                d.initial_tension = 0.3;
                d.tension_increment = 0.02;
                d.base_chance_factor = 0.15;
                d.first_scare_bonus = 0.4;
                d.short_gap_secs = 20.0;
                d.short_gap_bonus = 0.15;
                d.long_gap_secs = 40.0;
                d.sanity_cost_factor = 7.0;
                d.mood_rule = MoodRule::TrackEffectiveness;
            }
        }
    }

    /// Default configuration with this profile applied.
    #[must_use]
    pub fn config(self) -> NightmareConfig {
        let mut config = NightmareConfig::default();
        self.apply(&mut config);
        config
    }
}

impl fmt::Display for DifficultyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Calm => "calm",
            Self::Standard => "standard",
            Self::Relentless => "relentless",
        };
        f.write_str(name)
    }
}
