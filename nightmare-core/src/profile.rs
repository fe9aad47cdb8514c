//! Derived player profiles.
//!
//! All profiles are fixed arrays indexed by enum ordinal. "Dominant" always
//! means the highest score with the lowest ordinal winning ties.

use crate::types::{ActionKind, FearKind, ReactorKind};
use serde::{Deserialize, Serialize};

/// Spread below which min-max normalization treats all scores as equal.
const DEGENERATE_SPREAD: f32 = 1e-6;

// ---------------------------------------------------------------------------
// Action Counts
// ---------------------------------------------------------------------------

/// Per-kind action tallies over a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCounts {
    counts: [u32; ActionKind::COUNT],
    total: u32,
}

impl ActionCounts {
    /// Count a sequence of actions.
    pub fn tally(kinds: impl IntoIterator<Item = ActionKind>) -> Self {
        let mut tally = Self::default();
        for kind in kinds {
            tally.counts[kind.index()] += 1;
            tally.total += 1;
        }
        tally
    }

    /// Occurrences of one kind.
    #[must_use]
    pub fn get(&self, kind: ActionKind) -> u32 {
        self.counts[kind.index()]
    }

    /// Total actions counted.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }
}

// ---------------------------------------------------------------------------
// Reactor Profile
// ---------------------------------------------------------------------------

/// Score per behavioural archetype, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReactorProfile {
    scores: [f32; ReactorKind::COUNT],
}

impl ReactorProfile {
    /// Every archetype at the same prior value.
    #[must_use]
    pub fn uniform(prior: f32) -> Self {
        Self {
            scores: [prior; ReactorKind::COUNT],
        }
    }

    /// Raw (unnormalized) archetype scores for a tally.
    ///
    /// ```text
    /// Cautious   = (hide + retreat - attack) / n
    /// Bold       = (attack + investigate - hide) / n
    /// Panic      = (run + freeze) / n
    /// Methodical = (investigate + interact) / n
    /// Reckless   = (run + attack - hide) / n
    /// Hesitant   = (freeze - interact) / n
    /// ```
    #[must_use]
    pub fn raw_scores(counts: &ActionCounts) -> [f32; ReactorKind::COUNT] {
        let n = counts.total().max(1) as f32;
        let c = |kind| counts.get(kind) as f32;
        let (hide, retreat, attack) = (c(ActionKind::Hide), c(ActionKind::Retreat), c(ActionKind::Attack));
        let (run, freeze) = (c(ActionKind::Run), c(ActionKind::Freeze));
        let (investigate, interact) = (c(ActionKind::Investigate), c(ActionKind::Interact));
        [
            (hide + retreat - attack) / n,
            (attack + investigate - hide) / n,
            (run + freeze) / n,
            (investigate + interact) / n,
            (run + attack - hide) / n,
            (freeze - interact) / n,
        ]
    }

    /// Min-max normalize raw scores. If every score is equal the result is
    /// 0.5 across the board.
    #[must_use]
    pub fn normalize(raw: [f32; ReactorKind::COUNT]) -> Self {
        let min = raw.iter().copied().fold(f32::INFINITY, f32::min);
        let max = raw.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let spread = max - min;
        if !spread.is_finite() || spread <= DEGENERATE_SPREAD {
            return Self::uniform(0.5);
        }
        Self {
            scores: raw.map(|s| ((s - min) / spread).clamp(0.0, 1.0)),
        }
    }

    /// Classify a tally: raw formulas followed by normalization.
    #[must_use]
    pub fn classify(counts: &ActionCounts) -> Self {
        Self::normalize(Self::raw_scores(counts))
    }

    /// Score for one archetype.
    #[must_use]
    pub fn score(&self, kind: ReactorKind) -> f32 {
        self.scores[kind.index()]
    }

    /// Highest-scoring archetype (ties: lowest ordinal).
    #[must_use]
    pub fn dominant(&self) -> ReactorKind {
        let mut best = ReactorKind::ALL[0];
        for kind in ReactorKind::ALL {
            if self.score(kind) > self.score(best) {
                best = kind;
            }
        }
        best
    }

    /// `(archetype, score)` pairs in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (ReactorKind, f32)> + '_ {
        ReactorKind::ALL.into_iter().map(|k| (k, self.score(k)))
    }
}

// ---------------------------------------------------------------------------
// Fear Profile
// ---------------------------------------------------------------------------

/// Smoothed susceptibility per fear kind, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FearProfile {
    values: [f32; FearKind::COUNT],
}

impl FearProfile {
    /// Every fear at the same prior value.
    #[must_use]
    pub fn uniform(prior: f32) -> Self {
        Self {
            values: [prior.clamp(0.0, 1.0); FearKind::COUNT],
        }
    }

    /// Blend a new observation into one kind:
    /// `new = old * retain + sample * (1 - retain)`.
    pub fn blend(&mut self, kind: FearKind, sample: f32, retain: f32) {
        let slot = &mut self.values[kind.index()];
        *slot = (*slot * retain + sample * (1.0 - retain)).clamp(0.0, 1.0);
    }

    /// Smoothed value for one kind.
    #[must_use]
    pub fn get(&self, kind: FearKind) -> f32 {
        self.values[kind.index()]
    }

    /// All kinds, strongest first (ties: lowest ordinal).
    #[must_use]
    pub fn ranked(&self) -> Vec<(FearKind, f32)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Strongest fear (ties: lowest ordinal).
    #[must_use]
    pub fn dominant(&self) -> FearKind {
        let mut best = FearKind::ALL[0];
        for kind in FearKind::ALL {
            if self.get(kind) > self.get(best) {
                best = kind;
            }
        }
        best
    }

    /// `(fear, value)` pairs in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (FearKind, f32)> + '_ {
        FearKind::ALL.into_iter().map(|k| (k, self.get(k)))
    }
}

// ---------------------------------------------------------------------------
// Action Forecast
// ---------------------------------------------------------------------------

/// Predicted distribution over the player's next action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionForecast {
    /// Archetype the forecast is based on.
    pub basis: ReactorKind,
    /// `(action, probability)`, most likely first. Sums to 1.
    pub distribution: Vec<(ActionKind, f32)>,
}

impl ActionForecast {
    /// Fixed forecast for an archetype.
    #[must_use]
    pub fn for_reactor(kind: ReactorKind) -> Self {
        use ActionKind::{Attack, Freeze, Hide, Interact, Investigate, Move, Retreat, Run};
        let table: &[(ActionKind, f32)] = match kind {
            ReactorKind::Cautious => &[(Hide, 0.4), (Retreat, 0.3), (Move, 0.2), (Investigate, 0.1)],
            ReactorKind::Bold => &[(Investigate, 0.4), (Attack, 0.3), (Move, 0.2), (Interact, 0.1)],
            ReactorKind::Panic => &[(Run, 0.5), (Freeze, 0.3), (Retreat, 0.2)],
            ReactorKind::Methodical => &[(Investigate, 0.4), (Interact, 0.3), (Move, 0.2), (Hide, 0.1)],
            ReactorKind::Reckless => &[(Run, 0.4), (Attack, 0.3), (Move, 0.2), (Investigate, 0.1)],
            ReactorKind::Hesitant => &[(Freeze, 0.4), (Move, 0.3), (Retreat, 0.2), (Hide, 0.1)],
        };
        Self {
            basis: kind,
            distribution: table.to_vec(),
        }
    }

    /// Forecast from a profile's dominant archetype.
    #[must_use]
    pub fn from_profile(profile: &ReactorProfile) -> Self {
        Self::for_reactor(profile.dominant())
    }

    /// Probability of one action (zero if absent).
    #[must_use]
    pub fn probability(&self, action: ActionKind) -> f32 {
        self.distribution
            .iter()
            .find(|(a, _)| *a == action)
            .map_or(0.0, |(_, p)| *p)
    }

    /// The single most likely next action.
    #[must_use]
    pub fn most_likely(&self) -> ActionKind {
        self.distribution.first().map_or(ActionKind::Move, |(a, _)| *a)
    }
}
