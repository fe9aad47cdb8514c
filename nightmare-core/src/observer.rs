//! Event ingestion: gameplay telemetry → action and fear-response histories.
//!
//! The observer is the only writer of the rolling histories and of the
//! [`ObservationContext`]. It never fails: malformed events are dropped and
//! logged at `trace`, and the caller learns about it through [`Ingest`].
//!
//! ## Two clocks
//!
//! - [`Observer::tick`] runs every frame and advances the fast accumulators
//!   (sanity delta, time since last scare).
//! - [`Observer::take_cycle`] opens the slow analysis gate at most once per
//!   `analysis_interval_secs` of accumulated simulation time.

use crate::config::ObserverConfig;
use crate::events::{DamageSource, GameplayEvent};
use crate::history::BoundedHistory;
use crate::types::{ActionKind, FearKind, GameTimestamp, ScareKind, Vec2};
use crate::world::{MAX_VITAL, PlayerState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::trace;

/// Intensity assumed for scare events that do not report one.
pub const DEFAULT_SCARE_INTENSITY: f32 = 0.5;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One classified player action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// What the player did.
    pub kind: ActionKind,
    /// Where.
    pub position: Vec2,
    /// Movement or facing direction.
    pub direction: Vec2,
    /// When.
    pub timestamp: GameTimestamp,
    /// Free-form details (damage amount, interaction target, ...).
    pub context: Option<serde_json::Value>,
}

/// How strongly the player reacted to something frightening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FearResponse {
    /// Fear category the reaction is attributed to.
    pub kind: FearKind,
    /// Reaction strength in `[0, 1]`.
    pub strength: f32,
    /// Sanity lost around the reaction.
    pub sanity_loss: f32,
    /// When.
    pub timestamp: GameTimestamp,
}

/// Rolling per-tick view of the player's situation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationContext {
    /// Sanity as of the last tick.
    pub current_sanity: f32,
    /// Sanity lost between the previous tick and this one (never negative).
    pub recent_sanity_loss: f32,
    /// Time since any scare fired.
    pub time_since_last_scare: Duration,
    /// Ambient light in `[0, 1]`.
    pub light_level: f32,
    /// How open the surroundings are, `[0, 1]`.
    pub open_space: f32,
    /// Escape routes nearby.
    pub nearby_exits: u32,
}

impl Default for ObservationContext {
    fn default() -> Self {
        Self {
            current_sanity: MAX_VITAL,
            recent_sanity_loss: 0.0,
            time_since_last_scare: Duration::from_secs(60),
            light_level: 0.5,
            open_space: 0.5,
            nearby_exits: 2,
        }
    }
}

/// Environment readings the host may push into the context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentHints {
    /// Ambient light in `[0, 1]`.
    pub light_level: f32,
    /// How open the surroundings are, `[0, 1]`.
    pub open_space: f32,
    /// Escape routes nearby.
    pub nearby_exits: u32,
}

/// What [`Observer::record`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingest {
    /// An action record was appended.
    Action(ActionKind),
    /// A fear response was appended.
    Fear(FearKind),
    /// Well-formed but carried nothing to record (e.g. sanity went up).
    Ignored,
    /// Malformed payload, dropped.
    Rejected,
}

impl Ingest {
    /// Whether the event was dropped as malformed.
    #[must_use]
    pub fn is_rejected(self) -> bool {
        matches!(self, Self::Rejected)
    }
}

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

/// Owner of the action history, fear histories and observation context.
#[derive(Debug, Clone)]
pub struct Observer {
    config: ObserverConfig,
    actions: BoundedHistory<ActionRecord>,
    fears: [BoundedHistory<FearResponse>; FearKind::COUNT],
    fresh: [bool; FearKind::COUNT],
    context: ObservationContext,
    interactions: BTreeMap<String, u64>,
    total_interactions: u64,
    since_cycle: Duration,
}

impl Observer {
    /// Create an observer with empty histories.
    #[must_use]
    pub fn new(config: ObserverConfig) -> Self {
        let per_kind = config.fear_capacity_per_kind;
        let context = ObservationContext {
            time_since_last_scare: Duration::try_from_secs_f64(
                config.initial_time_since_scare_secs,
            )
            .unwrap_or(Duration::from_secs(60)),
            ..ObservationContext::default()
        };
        Self {
            actions: BoundedHistory::new(config.action_capacity),
            fears: std::array::from_fn(|_| BoundedHistory::new(per_kind)),
            fresh: [false; FearKind::COUNT],
            context,
            interactions: BTreeMap::new(),
            total_interactions: 0,
            since_cycle: Duration::ZERO,
            config,
        }
    }

    /// Ingest one gameplay event. `player_position` is used for events that
    /// carry no position of their own (damage, interaction).
    pub fn record(&mut self, event: &GameplayEvent, player_position: Vec2) -> Ingest {
        if let Err(e) = event.validate() {
            trace!(error = %e, "Dropping malformed gameplay event");
            return Ingest::Rejected;
        }

        match event {
            GameplayEvent::PlayerMoved {
                position,
                old_position,
                speed,
                timestamp,
            } => {
                let kind = if *speed > self.config.run_speed_threshold {
                    ActionKind::Run
                } else {
                    ActionKind::Move
                };
                self.push_action(kind, *position, *position - *old_position, *timestamp, None)
            }
            GameplayEvent::PlayerDamaged {
                source,
                amount,
                timestamp,
            } => {
                let context = serde_json::json!({
                    "damage_amount": amount,
                    "source": source.label(),
                });
                self.push_action(
                    ActionKind::Freeze,
                    player_position,
                    Vec2::ZERO,
                    *timestamp,
                    Some(context),
                )
            }
            GameplayEvent::PlayerSanityChanged {
                old_value,
                new_value,
                cause,
                timestamp,
            } => {
                if new_value >= old_value {
                    return Ingest::Ignored;
                }
                let kind = match cause {
                    Some(DamageSource::Creature { .. }) => FearKind::Creatures,
                    _ => FearKind::Unknown,
                };
                let delta = old_value - new_value;
                let strength = (delta / self.config.sanity_fear_scale).clamp(0.0, 1.0);
                self.push_fear(kind, strength, delta, *timestamp)
            }
            GameplayEvent::PlayerInteracted { target, timestamp } => {
                *self.interactions.entry(target.clone()).or_insert(0) += 1;
                self.total_interactions += 1;
                let context = serde_json::json!({ "target": target });
                self.push_action(
                    ActionKind::Interact,
                    player_position,
                    Vec2::ZERO,
                    *timestamp,
                    Some(context),
                )
            }
            GameplayEvent::ScareTriggered {
                scare_kind,
                intensity,
                timestamp,
            } => self.record_scare(
                *scare_kind,
                intensity.unwrap_or(DEFAULT_SCARE_INTENSITY),
                *timestamp,
            ),
            GameplayEvent::PlayerAction {
                kind,
                position,
                direction,
                timestamp,
            } => self.push_action(*kind, *position, *direction, *timestamp, None),
        }
    }

    /// Record the player's reaction to a scare and restart the scare clock.
    pub fn record_scare(
        &mut self,
        scare_kind: ScareKind,
        intensity: f32,
        timestamp: GameTimestamp,
    ) -> Ingest {
        let kind = scare_kind.fear_target();
        let loss = self.context.recent_sanity_loss;
        let ingest = self.push_fear(kind, intensity.clamp(0.0, 1.0), loss, timestamp);
        self.mark_scare_fired();
        ingest
    }

    /// Advance the fast clock: refresh sanity from the live player and
    /// accumulate elapsed time.
    pub fn tick(&mut self, dt: Duration, player: &impl PlayerState) {
        let sanity = player.sanity();
        if sanity.is_finite() {
            self.context.recent_sanity_loss = (self.context.current_sanity - sanity).max(0.0);
            self.context.current_sanity = sanity;
        }
        self.context.time_since_last_scare += dt;
        self.since_cycle += dt;
    }

    /// Open the slow analysis gate if enough time has accumulated.
    ///
    /// Returns `true` at most once per analysis interval.
    pub fn take_cycle(&mut self) -> bool {
        if self.since_cycle >= self.config.analysis_interval() {
            self.since_cycle = Duration::ZERO;
            true
        } else {
            false
        }
    }

    /// Restart the time-since-last-scare clock.
    pub fn mark_scare_fired(&mut self) {
        self.context.time_since_last_scare = Duration::ZERO;
    }

    /// Replace the environment readings in the context.
    pub fn set_environment(&mut self, hints: EnvironmentHints) {
        if hints.light_level.is_finite() {
            self.context.light_level = hints.light_level.clamp(0.0, 1.0);
        }
        if hints.open_space.is_finite() {
            self.context.open_space = hints.open_space.clamp(0.0, 1.0);
        }
        self.context.nearby_exits = hints.nearby_exits;
    }

    /// Fear kinds that received responses since the last call, in ordinal order.
    pub fn drain_fresh_fear_kinds(&mut self) -> Vec<FearKind> {
        let fresh = FearKind::ALL
            .into_iter()
            .filter(|kind| self.fresh[kind.index()])
            .collect();
        self.fresh = [false; FearKind::COUNT];
        fresh
    }

    // -- Accessors --------------------------------------------------------

    /// The action history, oldest first.
    #[must_use]
    pub fn actions(&self) -> &BoundedHistory<ActionRecord> {
        &self.actions
    }

    /// Retained responses for one fear kind, oldest first.
    #[must_use]
    pub fn fear_responses(&self, kind: FearKind) -> &BoundedHistory<FearResponse> {
        &self.fears[kind.index()]
    }

    /// Total retained fear responses across all kinds.
    #[must_use]
    pub fn fear_response_count(&self) -> usize {
        self.fears.iter().map(BoundedHistory::len).sum()
    }

    /// The observation context.
    #[must_use]
    pub fn context(&self) -> &ObservationContext {
        &self.context
    }

    /// Interaction counts per target name.
    #[must_use]
    pub fn interaction_counts(&self) -> &BTreeMap<String, u64> {
        &self.interactions
    }

    /// Total interactions observed (not bounded by the action window).
    #[must_use]
    pub fn total_interactions(&self) -> u64 {
        self.total_interactions
    }

    /// Observer settings.
    #[must_use]
    pub fn config(&self) -> &ObserverConfig {
        &self.config
    }

    fn push_action(
        &mut self,
        kind: ActionKind,
        position: Vec2,
        direction: Vec2,
        timestamp: GameTimestamp,
        context: Option<serde_json::Value>,
    ) -> Ingest {
        self.actions.push(ActionRecord {
            kind,
            position,
            direction,
            timestamp,
            context,
        });
        Ingest::Action(kind)
    }

    fn push_fear(
        &mut self,
        kind: FearKind,
        strength: f32,
        sanity_loss: f32,
        timestamp: GameTimestamp,
    ) -> Ingest {
        self.fears[kind.index()].push(FearResponse {
            kind,
            strength,
            sanity_loss,
            timestamp,
        });
        self.fresh[kind.index()] = true;
        Ingest::Fear(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubPlayer {
        sanity: f32,
    }

    impl PlayerState for StubPlayer {
        fn position(&self) -> Vec2 {
            Vec2::ZERO
        }
        fn sanity(&self) -> f32 {
            self.sanity
        }
        fn health(&self) -> f32 {
            MAX_VITAL
        }
        fn reduce_sanity(&mut self, amount: f32) {
            self.sanity = (self.sanity - amount).max(0.0);
        }
    }

    fn ts() -> GameTimestamp {
        GameTimestamp::now(0, 0.0)
    }

    fn observer() -> Observer {
        Observer::new(ObserverConfig::default())
    }

    fn moved(speed: f32) -> GameplayEvent {
        GameplayEvent::PlayerMoved {
            position: Vec2::new(3.0, 4.0),
            old_position: Vec2::new(1.0, 1.0),
            speed,
            timestamp: ts(),
        }
    }

    #[test]
    fn initial_context() {
        let obs = observer();
        let ctx = obs.context();
        assert_eq!(ctx.time_since_last_scare, Duration::from_secs(60));
        assert!((ctx.light_level - 0.5).abs() < f32::EPSILON);
        assert!((ctx.open_space - 0.5).abs() < f32::EPSILON);
        assert_eq!(ctx.nearby_exits, 2);
    }

    #[test]
    fn fast_moves_are_runs() {
        let mut obs = observer();
        assert_eq!(obs.record(&moved(1.0), Vec2::ZERO), Ingest::Action(ActionKind::Move));
        assert_eq!(obs.record(&moved(1.5), Vec2::ZERO), Ingest::Action(ActionKind::Move));
        assert_eq!(obs.record(&moved(2.0), Vec2::ZERO), Ingest::Action(ActionKind::Run));
        let last = obs.actions().latest().unwrap();
        assert_eq!(last.direction, Vec2::new(2.0, 3.0));
    }

    #[test]
    fn damage_freezes_in_place() {
        let mut obs = observer();
        let event = GameplayEvent::PlayerDamaged {
            source: DamageSource::Creature {
                kind: "spider".into(),
            },
            amount: 12.0,
            timestamp: ts(),
        };
        let here = Vec2::new(7.0, -2.0);
        assert_eq!(obs.record(&event, here), Ingest::Action(ActionKind::Freeze));
        let record = obs.actions().latest().unwrap();
        assert_eq!(record.position, here);
        let context = record.context.as_ref().unwrap();
        assert_eq!(context["source"], "spider");
    }

    #[test]
    fn sanity_drop_becomes_fear_response() {
        let mut obs = observer();
        let event = GameplayEvent::PlayerSanityChanged {
            old_value: 80.0,
            new_value: 70.0,
            cause: Some(DamageSource::Creature {
                kind: "wendigo".into(),
            }),
            timestamp: ts(),
        };
        assert_eq!(obs.record(&event, Vec2::ZERO), Ingest::Fear(FearKind::Creatures));
        let response = obs.fear_responses(FearKind::Creatures).latest().unwrap();
        assert!((response.strength - 0.5).abs() < 1e-6);
        assert!((response.sanity_loss - 10.0).abs() < 1e-6);

        let huge = GameplayEvent::PlayerSanityChanged {
            old_value: 90.0,
            new_value: 10.0,
            cause: None,
            timestamp: ts(),
        };
        assert_eq!(obs.record(&huge, Vec2::ZERO), Ingest::Fear(FearKind::Unknown));
        let response = obs.fear_responses(FearKind::Unknown).latest().unwrap();
        assert!((response.strength - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn sanity_gain_is_ignored() {
        let mut obs = observer();
        let event = GameplayEvent::PlayerSanityChanged {
            old_value: 40.0,
            new_value: 60.0,
            cause: None,
            timestamp: ts(),
        };
        assert_eq!(obs.record(&event, Vec2::ZERO), Ingest::Ignored);
        assert_eq!(obs.fear_response_count(), 0);
    }

    #[test]
    fn scare_event_maps_kind_and_resets_clock() {
        let mut obs = observer();
        let mut player = StubPlayer { sanity: 100.0 };
        obs.tick(Duration::from_secs(1), &player);
        player.reduce_sanity(4.0);
        obs.tick(Duration::from_secs(1), &player);

        let event = GameplayEvent::ScareTriggered {
            scare_kind: ScareKind::Whisper,
            intensity: None,
            timestamp: ts(),
        };
        assert_eq!(obs.record(&event, Vec2::ZERO), Ingest::Fear(FearKind::Isolation));
        let response = obs.fear_responses(FearKind::Isolation).latest().unwrap();
        assert!((response.strength - DEFAULT_SCARE_INTENSITY).abs() < f32::EPSILON);
        assert!((response.sanity_loss - 4.0).abs() < 1e-6);
        assert_eq!(obs.context().time_since_last_scare, Duration::ZERO);
    }

    #[test]
    fn malformed_events_are_rejected_silently() {
        let mut obs = observer();
        let bad = GameplayEvent::PlayerInteracted {
            target: String::new(),
            timestamp: ts(),
        };
        assert!(obs.record(&bad, Vec2::ZERO).is_rejected());
        assert!(obs.actions().is_empty());
        assert_eq!(obs.total_interactions(), 0);
    }

    #[test]
    fn histories_are_bounded() {
        let mut obs = observer();
        for _ in 0..1005 {
            obs.record(&moved(1.0), Vec2::ZERO);
        }
        assert_eq!(obs.actions().len(), 1000);

        for i in 0..25 {
            let event = GameplayEvent::PlayerSanityChanged {
                old_value: 50.0,
                new_value: 50.0 - (i as f32 + 1.0) * 0.1,
                cause: None,
                timestamp: ts(),
            };
            obs.record(&event, Vec2::ZERO);
        }
        let unknown = obs.fear_responses(FearKind::Unknown);
        assert_eq!(unknown.len(), 20);
        // Oldest five evicted: first retained loss is the sixth sample.
        assert!((unknown.iter().next().unwrap().sanity_loss - 0.6).abs() < 1e-5);
    }

    #[test]
    fn sanity_loss_never_negative() {
        let mut obs = observer();
        let mut player = StubPlayer { sanity: 50.0 };
        obs.tick(Duration::from_millis(16), &player);
        assert!((obs.context().recent_sanity_loss - 50.0).abs() < f32::EPSILON);
        player.sanity = 70.0;
        obs.tick(Duration::from_millis(16), &player);
        assert_eq!(obs.context().recent_sanity_loss, 0.0);
    }

    #[test]
    fn cycle_gate_opens_once_per_interval() {
        let mut obs = observer();
        let player = StubPlayer { sanity: 100.0 };
        obs.tick(Duration::from_secs(4), &player);
        assert!(!obs.take_cycle());
        obs.tick(Duration::from_secs(1), &player);
        assert!(obs.take_cycle());
        assert!(!obs.take_cycle());
    }

    #[test]
    fn fresh_kinds_drain_once() {
        let mut obs = observer();
        obs.record_scare(ScareKind::SuddenNoise, 0.9, ts());
        obs.record_scare(ScareKind::CreatureAppearance, 0.4, ts());
        assert_eq!(
            obs.drain_fresh_fear_kinds(),
            vec![FearKind::Creatures, FearKind::SuddenNoises]
        );
        assert!(obs.drain_fresh_fear_kinds().is_empty());
    }
}
