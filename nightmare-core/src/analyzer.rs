//! Behavior analyzer: histories → profiles.
//!
//! Runs once per analysis cycle. Each product follows the same rule when data
//! is thin: keep the previous value rather than inventing a new one.
//!
//! | Product | Source | Recomputed when |
//! |---|---|---|
//! | Reactor profile | action window | ≥ `min_actions_for_reactor` records |
//! | Fear profile | per-kind responses | the kind received a new response |
//! | Forecast | reactor profile | every cycle |
//! | Patterns | movement, interactions, responses | every cycle (merged) |

use crate::config::{AnalyzerConfig, ObserverConfig};
use crate::observer::Observer;
use crate::patterns::{self, BehaviorPattern, PatternBook, PatternInputs};
use crate::profile::{ActionCounts, ActionForecast, FearProfile, ReactorProfile};
use crate::spatial::{MovementAnalysis, MovementTracker};
use crate::types::{ActionKind, FearKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// How the player engages with the world and with scares.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InteractionAnalysis {
    /// Share of windowed actions that were interactions.
    pub interaction_rate: f32,
    /// Interaction counts per target name.
    pub preferred_interactions: BTreeMap<String, u64>,
    /// Mean response strength per fear kind (`None` without data).
    pub response_by_fear: [Option<f32>; FearKind::COUNT],
    /// Mean of the per-kind means over kinds with data.
    pub mean_response: Option<f32>,
    /// Mean sanity lost per recorded fear response.
    pub sanity_loss_rate: f32,
}

/// What one analysis pass changed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisSummary {
    /// Whether the reactor profile was recomputed.
    pub reactor_updated: bool,
    /// Fear kinds whose smoothed value moved.
    pub fears_updated: Vec<FearKind>,
    /// Patterns detected this pass (before merging).
    pub patterns_detected: usize,
}

/// Derives player profiles from the observer's histories.
#[derive(Debug, Clone)]
pub struct BehaviorAnalyzer {
    config: AnalyzerConfig,
    min_actions: usize,
    reactor: ReactorProfile,
    fear: FearProfile,
    forecast: ActionForecast,
    patterns: PatternBook,
    movement: Option<MovementAnalysis>,
    interaction: InteractionAnalysis,
    heatmap: Vec<Vec<f32>>,
    cycles: u64,
}

impl BehaviorAnalyzer {
    /// Create an analyzer with neutral profiles.
    #[must_use]
    pub fn new(config: AnalyzerConfig, observer: &ObserverConfig) -> Self {
        let reactor = ReactorProfile::uniform(config.neutral_prior);
        Self {
            min_actions: observer.min_actions_for_reactor,
            fear: FearProfile::uniform(config.neutral_prior),
            forecast: ActionForecast::from_profile(&reactor),
            reactor,
            patterns: PatternBook::new(),
            movement: None,
            interaction: InteractionAnalysis::default(),
            heatmap: Vec::new(),
            cycles: 0,
            config,
        }
    }

    /// Run one analysis pass.
    ///
    /// Consumes the observer's fresh-fear flags, so calling this twice
    /// without new responses leaves the fear profile untouched.
    pub fn analyze(&mut self, observer: &mut Observer, tracker: &MovementTracker) -> AnalysisSummary {
        self.cycles += 1;
        let mut summary = AnalysisSummary::default();

        // Reactor classification
        let actions = observer.actions();
        if actions.len() >= self.min_actions {
            let counts = ActionCounts::tally(actions.iter().map(|a| a.kind));
            self.reactor = ReactorProfile::classify(&counts);
            summary.reactor_updated = true;
        }
        self.forecast = ActionForecast::from_profile(&self.reactor);

        // Fear profile
        for kind in observer.drain_fresh_fear_kinds() {
            if let Some(avg) = mean(observer.fear_responses(kind).iter().map(|r| r.strength)) {
                self.fear.blend(kind, avg, self.config.fear_ema_retain);
                summary.fears_updated.push(kind);
            }
        }

        // Interactions and responses
        self.interaction = Self::interactions(observer);

        // Movement
        self.movement = tracker.compute();
        self.heatmap = tracker.heatmap();

        // Patterns
        let interaction_rate = (!observer.actions().is_empty()).then_some(self.interaction.interaction_rate);
        let found = patterns::detect(&PatternInputs {
            movement: self.movement.as_ref(),
            interaction_rate,
            mean_response: self.interaction.mean_response,
            per_fear: &self.interaction.response_by_fear,
        });
        summary.patterns_detected = found.len();
        self.patterns.extend(found);

        debug!(
            cycle = self.cycles,
            reactor_updated = summary.reactor_updated,
            fears_updated = summary.fears_updated.len(),
            patterns = summary.patterns_detected,
            dominant_reactor = %self.reactor.dominant(),
            dominant_fear = %self.fear.dominant(),
            "Behavior analysis complete"
        );
        summary
    }

    fn interactions(observer: &Observer) -> InteractionAnalysis {
        let actions = observer.actions();
        let interacts = actions.iter().filter(|a| a.kind == ActionKind::Interact).count();
        let interaction_rate = if actions.is_empty() {
            0.0
        } else {
            interacts as f32 / actions.len() as f32
        };

        let response_by_fear: [Option<f32>; FearKind::COUNT] = std::array::from_fn(|i| {
            mean(observer.fear_responses(FearKind::ALL[i]).iter().map(|r| r.strength))
        });
        let mean_response = mean(response_by_fear.iter().flatten().copied());
        let sanity_loss_rate = mean(
            FearKind::ALL
                .into_iter()
                .flat_map(|k| observer.fear_responses(k).iter().map(|r| r.sanity_loss)),
        )
        .unwrap_or(0.0);

        InteractionAnalysis {
            interaction_rate,
            preferred_interactions: observer.interaction_counts().clone(),
            response_by_fear,
            mean_response,
            sanity_loss_rate,
        }
    }

    // -- Queries ------------------------------------------------------------

    /// Current reactor profile.
    #[must_use]
    pub fn reactor_profile(&self) -> &ReactorProfile {
        &self.reactor
    }

    /// Current fear profile.
    #[must_use]
    pub fn fear_profile(&self) -> &FearProfile {
        &self.fear
    }

    /// Strongest fear (ties: lowest ordinal).
    #[must_use]
    pub fn dominant_fear(&self) -> FearKind {
        self.fear.dominant()
    }

    /// Predicted next-action distribution.
    #[must_use]
    pub fn forecast(&self) -> &ActionForecast {
        &self.forecast
    }

    /// The `n` strongest behaviour patterns.
    #[must_use]
    pub fn top_patterns(&self, n: usize) -> &[BehaviorPattern] {
        self.patterns.top(n)
    }

    /// Latest movement statistics.
    #[must_use]
    pub fn movement(&self) -> Option<&MovementAnalysis> {
        self.movement.as_ref()
    }

    /// Latest interaction statistics.
    #[must_use]
    pub fn interaction(&self) -> &InteractionAnalysis {
        &self.interaction
    }

    /// Latest visit heatmap (empty before the first pass).
    #[must_use]
    pub fn heatmap(&self) -> &[Vec<f32>] {
        &self.heatmap
    }

    /// How strongly the player reacts to scares, in `[0, 1]`.
    #[must_use]
    pub fn reactivity(&self) -> f32 {
        self.interaction
            .mean_response
            .unwrap_or(self.config.neutral_prior)
    }

    /// Analysis passes run so far.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

fn mean(values: impl Iterator<Item = f32>) -> Option<f32> {
    let (sum, n) = values.fold((0.0_f32, 0_u32), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f32)
}
