//! Decision engine: when, what, how hard and where to frighten the player.
//!
//! ## Fire chance
//!
//! ```text
//! chance = tension × base_chance_factor
//!        + first_scare_bonus                      if no scare has been seen yet
//!        + short_gap_bonus                        if since_last > short_gap
//!        + long_gap_bonus                         if since_last > long_gap
//! fire  ⇔ uniform draw in [0, 1) < chance
//! ```
//!
//! ## Scare selection
//!
//! Without effectiveness data every kind is equally likely. Once a fired
//! scare has been evaluated, kinds are drawn with weight equal to their
//! smoothed effectiveness (untried kinds use the neutral prior; all weights
//! are floored so nothing becomes impossible).
//!
//! ## Effectiveness
//!
//! Each fire remembers the player's sanity right after the scare's own
//! sanity cost. At the next analysis cycle the further drop since then,
//! scaled to `[0, 1]`, becomes an effectiveness sample for that kind.

use crate::config::{DirectorConfig, MoodRule};
use crate::history::BoundedHistory;
use crate::observer::{ObservationContext, Observer};
use crate::profile::FearProfile;
use crate::types::{EntityId, FearKind, GameTimestamp, ScareId, ScareKind, Vec2};
use crate::world::{MAX_VITAL, PlayerState, WorldEffects};
use ordered_float::OrderedFloat;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::time::Duration;
use tracing::{debug, info};

/// Creature kinds a creature-appearance scare can spawn.
pub const CREATURE_KINDS: [&str; 6] = [
    "shadow",
    "spider",
    "phantom",
    "doppelganger",
    "wendigo",
    "faceless",
];

/// Lowest selection weight any scare kind can have.
const MIN_KIND_WEIGHT: f32 = 0.05;

/// Recommendation intensity bounds.
const MIN_RECOMMENDED_INTENSITY: f32 = 0.3;
const MAX_RECOMMENDED_INTENSITY: f32 = 1.0;

/// Suggested delay before a recommended scare, by time since the last one.
const DELAY_AFTER_RECENT_SCARE: Duration = Duration::from_secs(30);
const DELAY_AFTER_QUIET_SPELL: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A concrete scare, built and then fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScareEvent {
    /// Unique ID.
    pub id: ScareId,
    /// Scare kind.
    pub kind: ScareKind,
    /// Intensity in `[0, 1]`.
    pub intensity: f32,
    /// Where it happens (spawn point for creatures, player position otherwise).
    pub position: Vec2,
    /// How long the effect lasts.
    pub duration: Duration,
    /// Creature kind for creature appearances.
    pub creature: Option<String>,
    /// When it was built.
    pub timestamp: GameTimestamp,
}

/// A ranked suggestion for the next scare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScareRecommendation {
    /// Scare kind to use.
    pub scare_kind: ScareKind,
    /// Fear the scare targets.
    pub fear_target: FearKind,
    /// Suggested intensity in `[0.3, 1.0]`.
    pub intensity: f32,
    /// Suggested position.
    pub position: Vec2,
    /// Suggested wait before firing.
    pub delay: Duration,
    /// Ranking key; higher first.
    pub priority: f32,
}

/// Result of a fire-chance roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireDecision {
    /// Probability of firing this cycle.
    pub chance: f32,
    /// The uniform draw compared against it.
    pub draw: f32,
    /// `draw < chance`.
    pub fire: bool,
}

/// What firing a scare did to the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireOutcome {
    /// Handle of the spawned creature, if any.
    pub spawned: Option<EntityId>,
    /// Whether the environment was corrupted.
    pub environment_changed: bool,
    /// Player sanity before the scare.
    pub sanity_before: f32,
    /// Player sanity after the scare's direct cost.
    pub sanity_after: f32,
}

#[derive(Debug, Clone, Copy)]
struct PendingEvaluation {
    kind: ScareKind,
    sanity_after: f32,
}

// ---------------------------------------------------------------------------
// Director
// ---------------------------------------------------------------------------

/// Owner of mood, tension, scare history, effectiveness and recommendations.
#[derive(Debug, Clone)]
pub struct Director {
    config: DirectorConfig,
    neutral_prior: f32,
    rng: StdRng,
    mood: f32,
    tension: f32,
    history: BoundedHistory<ScareEvent>,
    total_fired: u64,
    external_scares: u64,
    effectiveness: [Option<f32>; ScareKind::COUNT],
    pending: Vec<PendingEvaluation>,
    fired_intensities: Vec<f32>,
    recommendations: Vec<ScareRecommendation>,
}

impl Director {
    /// Create a director. `seed` makes every random choice reproducible.
    #[must_use]
    pub fn new(config: DirectorConfig, neutral_prior: f32, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            neutral_prior,
            rng,
            mood: config.initial_mood.clamp(0.0, 1.0),
            tension: config.initial_tension.clamp(0.0, 1.0),
            history: BoundedHistory::new(config.scare_history_capacity),
            total_fired: 0,
            external_scares: 0,
            effectiveness: [None; ScareKind::COUNT],
            pending: Vec::new(),
            fired_intensities: Vec::new(),
            recommendations: Vec::new(),
            config,
        }
    }

    /// Per-tick tension rise, saturating at 1.
    pub fn drift(&mut self) {
        self.tension = (self.tension + self.config.tension_increment).min(1.0);
    }

    /// Probability of firing given the time since the last scare.
    #[must_use]
    pub fn fire_chance(&self, since_last_scare: Duration) -> f32 {
        let c = &self.config;
        let mut chance = self.tension * c.base_chance_factor;
        if self.scares_seen() == 0 {
            chance += c.first_scare_bonus;
        } else {
            let since = since_last_scare.as_secs_f64();
            if since > c.short_gap_secs {
                chance += c.short_gap_bonus;
            }
            if since > c.long_gap_secs {
                chance += c.long_gap_bonus;
            }
        }
        chance
    }

    /// Compare a given draw against the fire chance.
    #[must_use]
    pub fn decide(&self, draw: f32, since_last_scare: Duration) -> FireDecision {
        let chance = self.fire_chance(since_last_scare);
        FireDecision {
            chance,
            draw,
            fire: draw < chance,
        }
    }

    /// Roll for a scare this cycle.
    pub fn should_fire(&mut self, since_last_scare: Duration) -> FireDecision {
        let draw: f32 = self.rng.r#gen();
        let decision = self.decide(draw, since_last_scare);
        debug!(
            chance = decision.chance,
            draw = decision.draw,
            fire = decision.fire,
            tension = self.tension,
            "Scare roll"
        );
        decision
    }

    /// Pick a scare kind, weighted by effectiveness once any is known.
    pub fn choose_kind(&mut self) -> ScareKind {
        if self.effectiveness.iter().all(Option::is_none) {
            return self.random_kind();
        }
        let weights = self
            .effectiveness
            .map(|e| e.unwrap_or(self.neutral_prior).max(MIN_KIND_WEIGHT));
        match WeightedIndex::new(weights) {
            Ok(dist) => ScareKind::ALL[dist.sample(&mut self.rng)],
            Err(_) => self.random_kind(),
        }
    }

    fn random_kind(&mut self) -> ScareKind {
        ScareKind::ALL[self.rng.gen_range(0..ScareKind::COUNT)]
    }

    /// Build a scare around the player.
    ///
    /// `reactivity` is how strongly the player has reacted to scares so far;
    /// unreactive players get a stronger scare.
    pub fn build_event(
        &mut self,
        player_position: Vec2,
        reactivity: f32,
        now: GameTimestamp,
    ) -> ScareEvent {
        let kind = self.choose_kind();

        let r: f32 = self.rng.r#gen();
        let mut intensity = self.mood * (0.7 + r * 0.3);
        if reactivity < self.config.low_reactivity_threshold {
            intensity *= self.config.low_reactivity_boost;
        }
        let intensity = intensity.clamp(0.0, 1.0);

        let (position, creature) = if kind == ScareKind::CreatureAppearance {
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let (lo, hi) = (self.config.spawn_radius_min, self.config.spawn_radius_max);
            let radius = if hi > lo { self.rng.gen_range(lo..=hi) } else { lo };
            let creature = CREATURE_KINDS
                .choose(&mut self.rng)
                .map(|c| (*c).to_string());
            (player_position + Vec2::from_polar(angle, radius), creature)
        } else {
            (player_position, None)
        };

        ScareEvent {
            id: ScareId::new(),
            kind,
            intensity,
            position,
            duration: Duration::from_secs(self.rng.gen_range(2..=6)),
            creature,
            timestamp: now,
        }
    }

    /// Execute a scare: apply its world effect, drain sanity, record it and
    /// report it to the observer (which restarts the scare clock).
    pub fn fire(
        &mut self,
        event: ScareEvent,
        player: &mut impl PlayerState,
        world: &mut impl WorldEffects,
        observer: &mut Observer,
    ) -> FireOutcome {
        let sanity_before = player.sanity();
        let mut spawned = None;
        let mut environment_changed = false;

        match event.kind {
            ScareKind::CreatureAppearance => {
                let kind = event.creature.as_deref().unwrap_or(CREATURE_KINDS[0]);
                spawned = Some(world.spawn_creature(kind, event.position));
            }
            ScareKind::EnvironmentChange => {
                world.modify_environment(event.position, event.intensity);
                environment_changed = true;
            }
            ScareKind::AmbientSound
            | ScareKind::SuddenNoise
            | ScareKind::Hallucination
            | ScareKind::Whisper => {}
        }

        player.reduce_sanity(event.intensity * self.config.sanity_cost_factor);
        let sanity_after = player.sanity();

        observer.record_scare(event.kind, event.intensity, event.timestamp);

        self.pending.push(PendingEvaluation {
            kind: event.kind,
            sanity_after,
        });
        self.fired_intensities.push(event.intensity);
        self.total_fired += 1;

        info!(
            id = %event.id,
            kind = %event.kind,
            intensity = event.intensity,
            position = %event.position,
            creature = event.creature.as_deref().unwrap_or("-"),
            sanity_before,
            sanity_after,
            "Scare fired"
        );
        self.history.push(event);

        FireOutcome {
            spawned,
            environment_changed,
            sanity_before,
            sanity_after,
        }
    }

    /// Note a scare fired by someone else (scripted content, another
    /// system). It counts as seen for the first-scare bonus.
    pub fn note_external_scare(&mut self) {
        self.external_scares += 1;
    }

    /// Turn pending fires into effectiveness samples against the player's
    /// current sanity. The scare's own sanity cost is not part of the sample.
    pub fn evaluate_effectiveness(&mut self, current_sanity: f32) {
        let scale = self.config.effectiveness_sanity_scale;
        let weight = self.config.effectiveness_smoothing;
        for pending in std::mem::take(&mut self.pending) {
            let sample = ((pending.sanity_after - current_sanity) / scale).clamp(0.0, 1.0);
            let slot = &mut self.effectiveness[pending.kind.index()];
            *slot = Some(match *slot {
                None => sample,
                Some(old) => old * (1.0 - weight) + sample * weight,
            });
            debug!(kind = %pending.kind, sample, "Scare effectiveness sampled");
        }
    }

    /// Apply the configured mood rule.
    pub fn update_mood(&mut self) {
        let target = match self.config.mood_rule {
            MoodRule::Fixed => None,
            MoodRule::TrackEffectiveness => {
                let known: Vec<f32> = self.effectiveness.iter().flatten().copied().collect();
                (!known.is_empty()).then(|| known.iter().sum::<f32>() / known.len() as f32)
            }
            MoodRule::TrackIntensity => (!self.fired_intensities.is_empty()).then(|| {
                self.fired_intensities.iter().sum::<f32>() / self.fired_intensities.len() as f32
            }),
        };
        self.fired_intensities.clear();
        if let Some(target) = target {
            self.mood = (self.mood + (target - self.mood) * self.config.mood_smoothing).clamp(0.0, 1.0);
        }
    }

    /// Rebuild the recommendation list from the fear profile.
    ///
    /// The strongest fears (ties: lowest ordinal) each get one
    /// recommendation; the list is sorted by descending priority.
    pub fn recommend(
        &mut self,
        fear: &FearProfile,
        context: &ObservationContext,
        player_position: Vec2,
    ) -> &[ScareRecommendation] {
        let since = context.time_since_last_scare.as_secs_f32();
        let sanity = context.current_sanity.clamp(0.0, MAX_VITAL);
        let time_factor = 1.0 - (-since / 60.0).exp();
        let delay = if f64::from(since) < self.config.short_gap_secs {
            DELAY_AFTER_RECENT_SCARE
        } else {
            DELAY_AFTER_QUIET_SPELL
        };

        let mut recommendations: Vec<ScareRecommendation> = fear
            .ranked()
            .into_iter()
            .take(self.config.max_recommendations)
            .map(|(fear_target, f)| ScareRecommendation {
                scare_kind: fear_target
                    .preferred_scare()
                    .unwrap_or_else(|| self.random_kind()),
                fear_target,
                intensity: (f * (1.0 + (1.0 - sanity / MAX_VITAL)))
                    .clamp(MIN_RECOMMENDED_INTENSITY, MAX_RECOMMENDED_INTENSITY),
                position: player_position,
                delay,
                priority: f * (0.5 + 0.5 * time_factor),
            })
            .collect();
        recommendations.sort_by_key(|r| Reverse(OrderedFloat(r.priority)));

        self.recommendations = recommendations;
        &self.recommendations
    }

    // -- Queries ------------------------------------------------------------

    /// The highest-priority recommendation, if any.
    #[must_use]
    pub fn best_recommendation(&self) -> Option<&ScareRecommendation> {
        self.recommendations.first()
    }

    /// Current recommendations, highest priority first.
    #[must_use]
    pub fn recommendations(&self) -> &[ScareRecommendation] {
        &self.recommendations
    }

    /// Current mood.
    #[must_use]
    pub fn mood(&self) -> f32 {
        self.mood
    }

    /// Current tension.
    #[must_use]
    pub fn tension(&self) -> f32 {
        self.tension
    }

    /// Recent fired scares, oldest first.
    #[must_use]
    pub fn history(&self) -> &BoundedHistory<ScareEvent> {
        &self.history
    }

    /// Scares fired since creation.
    #[must_use]
    pub fn total_fired(&self) -> u64 {
        self.total_fired
    }

    /// Scares fired here plus those reported through
    /// [`Self::note_external_scare`].
    #[must_use]
    pub fn scares_seen(&self) -> u64 {
        self.total_fired + self.external_scares
    }

    /// Smoothed effectiveness of a scare kind, if it has been evaluated.
    #[must_use]
    pub fn effectiveness(&self, kind: ScareKind) -> Option<f32> {
        self.effectiveness[kind.index()]
    }

    /// Director settings.
    #[must_use]
    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ObserverConfig;

    struct Player {
        position: Vec2,
        sanity: f32,
    }

    impl PlayerState for Player {
        fn position(&self) -> Vec2 {
            self.position
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

    #[derive(Default)]
    struct World {
        spawned: Vec<(String, Vec2)>,
        corrupted: Vec<(Vec2, f32)>,
    }

    impl WorldEffects for World {
        fn spawn_creature(&mut self, kind: &str, position: Vec2) -> EntityId {
            self.spawned.push((kind.to_string(), position));
            EntityId::new()
        }
        fn modify_environment(&mut self, position: Vec2, intensity: f32) {
            self.corrupted.push((position, intensity));
        }
    }

    fn director_with(config: DirectorConfig) -> Director {
        Director::new(config, 0.5, Some(42))
    }

    fn director() -> Director {
        director_with(DirectorConfig::default())
    }

    fn scare(kind: ScareKind, intensity: f32) -> ScareEvent {
        ScareEvent {
            id: ScareId::new(),
            kind,
            intensity,
            position: Vec2::new(4.0, 4.0),
            duration: Duration::from_secs(3),
            creature: (kind == ScareKind::CreatureAppearance).then(|| "wendigo".to_string()),
            timestamp: GameTimestamp::now(0, 0.0),
        }
    }

    #[test]
    fn first_scare_chance() {
        let d = director_with(DirectorConfig {
            initial_tension: 0.5,
            ..DirectorConfig::default()
        });
        let since = Duration::from_secs(60);
        assert!((d.fire_chance(since) - 0.35).abs() < 1e-6);
        assert!(d.decide(0.30, since).fire);
        assert!(!d.decide(0.40, since).fire);
    }

    #[test]
    fn gap_bonuses_after_first_scare() {
        let mut d = director();
        let mut player = Player {
            position: Vec2::ZERO,
            sanity: 100.0,
        };
        let mut world = World::default();
        let mut observer = Observer::new(ObserverConfig::default());
        d.fire(scare(ScareKind::Whisper, 0.4), &mut player, &mut world, &mut observer);

        let base = 0.1 * 0.1;
        assert!((d.fire_chance(Duration::from_secs(10)) - base).abs() < 1e-6);
        assert!((d.fire_chance(Duration::from_secs(45)) - (base + 0.1)).abs() < 1e-6);
        assert!((d.fire_chance(Duration::from_secs(90)) - (base + 0.3)).abs() < 1e-6);
    }

    #[test]
    fn tension_saturates() {
        let mut d = director();
        for _ in 0..500 {
            d.drift();
        }
        assert!((d.tension() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn creature_fire_spawns_and_costs_sanity() {
        let mut d = director();
        let mut player = Player {
            position: Vec2::ZERO,
            sanity: 80.0,
        };
        let mut world = World::default();
        let mut observer = Observer::new(ObserverConfig::default());

        let outcome = d.fire(
            scare(ScareKind::CreatureAppearance, 0.8),
            &mut player,
            &mut world,
            &mut observer,
        );
        assert!(outcome.spawned.is_some());
        assert_eq!(world.spawned[0].0, "wendigo");
        assert!((player.sanity - 76.0).abs() < 1e-5);
        assert_eq!(observer.context().time_since_last_scare, Duration::ZERO);
        assert_eq!(observer.fear_responses(FearKind::Creatures).len(), 1);
        assert_eq!(d.total_fired(), 1);
        assert_eq!(d.history().len(), 1);
    }

    #[test]
    fn environment_fire_corrupts_and_others_do_nothing() {
        let mut d = director();
        let mut player = Player {
            position: Vec2::ZERO,
            sanity: 100.0,
        };
        let mut world = World::default();
        let mut observer = Observer::new(ObserverConfig::default());

        let outcome = d.fire(
            scare(ScareKind::EnvironmentChange, 0.5),
            &mut player,
            &mut world,
            &mut observer,
        );
        assert!(outcome.environment_changed);
        assert_eq!(world.corrupted, vec![(Vec2::new(4.0, 4.0), 0.5)]);

        d.fire(scare(ScareKind::SuddenNoise, 0.5), &mut player, &mut world, &mut observer);
        assert_eq!(world.corrupted.len(), 1);
        assert!(world.spawned.is_empty());
        assert!((player.sanity - 95.0).abs() < 1e-5);
    }

    #[test]
    fn built_events_respect_bounds() {
        let mut d = director_with(DirectorConfig {
            initial_mood: 1.0,
            ..DirectorConfig::default()
        });
        let origin = Vec2::new(100.0, 100.0);
        for _ in 0..200 {
            let event = d.build_event(origin, 0.1, GameTimestamp::now(0, 0.0));
            assert!((0.0..=1.0).contains(&event.intensity));
            assert!((2..=6).contains(&event.duration.as_secs()));
            if event.kind == ScareKind::CreatureAppearance {
                let dist = origin.distance(event.position);
                assert!((10.0 - 1e-3..=30.0 + 1e-3).contains(&dist), "{dist}");
                assert!(CREATURE_KINDS.contains(&event.creature.as_deref().unwrap()));
            } else {
                assert_eq!(event.position, origin);
                assert!(event.creature.is_none());
            }
        }
    }

    #[test]
    fn low_reactivity_boosts_intensity() {
        let mut calm = director_with(DirectorConfig {
            initial_mood: 0.5,
            ..DirectorConfig::default()
        });
        let mut numb = calm.clone();
        let ts = GameTimestamp::now(0, 0.0);
        let normal = calm.build_event(Vec2::ZERO, 0.9, ts);
        let boosted = numb.build_event(Vec2::ZERO, 0.1, ts);
        assert!((boosted.intensity - normal.intensity * 1.5).abs() < 1e-5);
    }

    #[test]
    fn effectiveness_smooths_after_first_sample() {
        let mut d = director();
        let mut player = Player {
            position: Vec2::ZERO,
            sanity: 100.0,
        };
        let mut world = World::default();
        let mut observer = Observer::new(ObserverConfig::default());

        // Fire costs 2, leaving 98; the player then drops to 88.
        d.fire(scare(ScareKind::Whisper, 0.4), &mut player, &mut world, &mut observer);
        d.evaluate_effectiveness(88.0);
        assert!((d.effectiveness(ScareKind::Whisper).unwrap() - 0.5).abs() < 1e-6);

        player.sanity = 90.0;
        d.fire(scare(ScareKind::Whisper, 0.4), &mut player, &mut world, &mut observer);
        d.evaluate_effectiveness(88.0);
        // 0.5 * 0.7 + 0.0 * 0.3
        assert!((d.effectiveness(ScareKind::Whisper).unwrap() - 0.35).abs() < 1e-6);
        assert!(d.effectiveness(ScareKind::Hallucination).is_none());
    }

    #[test]
    fn ignored_scare_scores_zero() {
        let mut d = director();
        let mut player = Player {
            position: Vec2::ZERO,
            sanity: 100.0,
        };
        let mut world = World::default();
        let mut observer = Observer::new(ObserverConfig::default());

        let outcome = d.fire(
            scare(ScareKind::CreatureAppearance, 1.0),
            &mut player,
            &mut world,
            &mut observer,
        );
        assert!((outcome.sanity_before - outcome.sanity_after - 5.0).abs() < 1e-5);
        d.evaluate_effectiveness(player.sanity);
        assert_eq!(d.effectiveness(ScareKind::CreatureAppearance), Some(0.0));
    }

    #[test]
    fn external_scare_removes_first_scare_bonus() {
        let mut d = director_with(DirectorConfig {
            initial_tension: 0.5,
            ..DirectorConfig::default()
        });
        let since = Duration::from_secs(10);
        assert!((d.fire_chance(since) - 0.35).abs() < 1e-6);

        d.note_external_scare();
        assert_eq!(d.total_fired(), 0);
        assert_eq!(d.scares_seen(), 1);
        assert!((d.fire_chance(since) - 0.05).abs() < 1e-6);
        assert!((d.fire_chance(Duration::from_secs(90)) - 0.35).abs() < 1e-6);
    }

    #[test]
    fn scare_history_capacity_is_configurable() {
        let mut d = director_with(DirectorConfig {
            scare_history_capacity: 3,
            ..DirectorConfig::default()
        });
        let mut player = Player {
            position: Vec2::ZERO,
            sanity: 100.0,
        };
        let mut world = World::default();
        let mut observer = Observer::new(ObserverConfig::default());
        for _ in 0..5 {
            d.fire(scare(ScareKind::Whisper, 0.1), &mut player, &mut world, &mut observer);
        }
        assert_eq!(d.history().len(), 3);
        assert_eq!(d.history().evicted(), 2);
        assert_eq!(d.total_fired(), 5);
    }

    #[test]
    fn weighted_choice_favours_effective_kinds() {
        let mut d = director();
        d.effectiveness = [Some(0.05), Some(0.05), Some(0.05), Some(0.05), Some(1.0), Some(0.05)];
        let picks = (0..1000)
            .filter(|_| d.choose_kind() == ScareKind::Hallucination)
            .count();
        assert!(picks > 600, "{picks}");
    }

    #[test]
    fn fixed_mood_never_moves() {
        let mut d = director();
        d.effectiveness[0] = Some(1.0);
        d.fired_intensities.push(1.0);
        d.update_mood();
        assert!((d.mood() - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn mood_tracks_effectiveness() {
        let mut d = director_with(DirectorConfig {
            mood_rule: MoodRule::TrackEffectiveness,
            ..DirectorConfig::default()
        });
        d.effectiveness[0] = Some(0.8);
        d.update_mood();
        // 0.3 + (0.8 - 0.3) * 0.2
        assert!((d.mood() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn mood_tracks_intensity() {
        let mut d = director_with(DirectorConfig {
            mood_rule: MoodRule::TrackIntensity,
            ..DirectorConfig::default()
        });
        d.update_mood();
        assert!((d.mood() - 0.3).abs() < f32::EPSILON);
        d.fired_intensities.extend([0.8, 1.0]);
        d.update_mood();
        assert!((d.mood() - 0.42).abs() < 1e-6);
    }

    #[test]
    fn recommendations_ranked_and_bounded() {
        let mut d = director();
        let mut fear = FearProfile::uniform(0.5);
        fear.blend(FearKind::SuddenNoises, 1.0, 0.1);
        fear.blend(FearKind::Isolation, 0.0, 0.1);
        fear.blend(FearKind::Darkness, 0.8, 0.5);
        let mut observer = Observer::new(ObserverConfig::default());
        observer.mark_scare_fired();
        let context = observer.context().clone();

        let recs = d.recommend(&fear, &context, Vec2::new(1.0, 2.0)).to_vec();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].fear_target, FearKind::SuddenNoises);
        assert_eq!(recs[0].scare_kind, ScareKind::SuddenNoise);
        assert_eq!(recs[1].fear_target, FearKind::Darkness);
        assert_eq!(recs[1].scare_kind, ScareKind::EnvironmentChange);
        // Creatures wins the 0.5 tie against the later kinds.
        assert_eq!(recs[2].fear_target, FearKind::Creatures);
        for pair in recs.windows(2) {
            assert!(pair[0].priority >= pair[1].priority);
        }
        for rec in &recs {
            assert!((0.3..=1.0).contains(&rec.intensity));
            assert_eq!(rec.delay, Duration::from_secs(30));
        }
        assert_eq!(d.best_recommendation(), recs.first());
    }

    #[test]
    fn recommendation_formulas() {
        let mut d = director();
        let fear = FearProfile::uniform(0.5);
        let mut context = Observer::new(ObserverConfig::default()).context().clone();
        context.current_sanity = 50.0;
        context.time_since_last_scare = Duration::from_secs(60);

        let recs = d.recommend(&fear, &context, Vec2::ZERO).to_vec();
        let expected_priority = 0.5 * (0.5 + 0.5 * (1.0 - (-1.0_f32).exp()));
        assert!((recs[0].priority - expected_priority).abs() < 1e-5);
        assert!((recs[0].intensity - 0.75).abs() < 1e-5);
        assert_eq!(recs[0].delay, Duration::from_secs(10));
    }

    #[test]
    fn unknown_fear_gets_some_scare() {
        let mut d = director_with(DirectorConfig {
            max_recommendations: 1,
            ..DirectorConfig::default()
        });
        let mut fear = FearProfile::uniform(0.1);
        fear.blend(FearKind::Unknown, 1.0, 0.0);
        let context = Observer::new(ObserverConfig::default()).context().clone();
        let recs = d.recommend(&fear, &context, Vec2::ZERO);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].fear_target, FearKind::Unknown);
        assert!(ScareKind::ALL.contains(&recs[0].scare_kind));
    }
}
