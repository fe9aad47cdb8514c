//! Integration Tests — End-to-End Director Flows
//!
//! These tests drive the public API the way a host game does: events go in
//! through a sender, `tick()` runs the loop, and the query surface is read
//! back.

use std::time::Duration;

use nightmare_core::HorrorSession;
use nightmare_core::config::{DirectorConfig, MoodRule, NightmareConfig, ObserverConfig};
use nightmare_core::director::Director;
use nightmare_core::events::{DamageSource, GameplayEvent};
use nightmare_core::observer::Observer;
use nightmare_core::patterns::{BehaviorPattern, PatternBook};
use nightmare_core::profile::FearProfile;
use nightmare_core::types::{ActionKind, EntityId, FearKind, GameTimestamp, ReactorKind, ScareKind, Vec2};
use nightmare_core::world::{MAX_VITAL, PlayerState, WorldEffects};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

struct TestPlayer {
    position: Vec2,
    sanity: f32,
}

impl TestPlayer {
    fn at(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            sanity: MAX_VITAL,
        }
    }
}

impl PlayerState for TestPlayer {
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
struct TestWorld {
    creatures: Vec<(String, Vec2)>,
    corruption: Vec<(Vec2, f32)>,
}

impl WorldEffects for TestWorld {
    fn spawn_creature(&mut self, kind: &str, position: Vec2) -> EntityId {
        self.creatures.push((kind.to_string(), position));
        EntityId::new()
    }
    fn modify_environment(&mut self, position: Vec2, intensity: f32) {
        self.corruption.push((position, intensity));
    }
}

fn ts() -> GameTimestamp {
    GameTimestamp::now(0, 0.0)
}

fn seeded_config(seed: u64) -> NightmareConfig {
    let mut config = NightmareConfig::default();
    config.general.seed = Some(seed);
    config
}

const FRAME: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// Bounded histories
// ---------------------------------------------------------------------------

#[test]
fn histories_stay_bounded_through_the_queue() {
    let mut session = HorrorSession::new(seeded_config(1));
    let sender = session.sender();
    let (mut player, mut world) = (TestPlayer::at(0.0, 0.0), TestWorld::default());

    for i in 0..1200 {
        sender.send(GameplayEvent::PlayerMoved {
            position: Vec2::new(i as f32, 0.0),
            old_position: Vec2::new(i as f32 - 1.0, 0.0),
            speed: 1.0,
            timestamp: ts(),
        });
    }
    for i in 0..30 {
        sender.send(GameplayEvent::PlayerSanityChanged {
            old_value: 100.0 - i as f32,
            new_value: 99.0 - i as f32,
            cause: None,
            timestamp: ts(),
        });
    }
    let report = session.tick(FRAME, &mut player, &mut world);
    assert_eq!(report.events_ingested, 1230);

    let actions = session.observer().actions();
    assert_eq!(actions.len(), 1000);
    // Arrival order preserved, oldest 200 evicted.
    let xs: Vec<f32> = actions.iter().map(|a| a.position.x).collect();
    assert!((xs[0] - 200.0).abs() < f32::EPSILON);
    assert!(xs.windows(2).all(|w| w[0] < w[1]));

    assert_eq!(session.observer().fear_responses(FearKind::Unknown).len(), 20);
}

// ---------------------------------------------------------------------------
// Reactor profile through a full cycle
// ---------------------------------------------------------------------------

#[test]
fn cautious_player_is_classified_after_a_cycle() {
    let mut session = HorrorSession::new(seeded_config(2));
    let sender = session.sender();
    let (mut player, mut world) = (TestPlayer::at(10.0, 10.0), TestWorld::default());

    for kind in [ActionKind::Hide, ActionKind::Hide, ActionKind::Retreat]
        .into_iter()
        .cycle()
        .take(15)
    {
        sender.send(GameplayEvent::PlayerAction {
            kind,
            position: player.position,
            direction: Vec2::ZERO,
            timestamp: ts(),
        });
    }

    // Before the first cycle the profile is neutral.
    session.tick(FRAME, &mut player, &mut world);
    assert!(session
        .reactor_profile()
        .iter()
        .all(|(_, s)| (s - 0.5).abs() < f32::EPSILON));

    for _ in 0..50 {
        session.tick(FRAME, &mut player, &mut world);
    }
    let profile = session.reactor_profile();
    assert_eq!(profile.dominant(), ReactorKind::Cautious);
    assert!((profile.score(ReactorKind::Cautious) - 1.0).abs() < 1e-6);
    assert!(profile.iter().any(|(_, s)| s.abs() < 1e-6));
    assert_eq!(session.forecast().most_likely(), ActionKind::Hide);
}

// ---------------------------------------------------------------------------
// Fear profile smoothing
// ---------------------------------------------------------------------------

#[test]
fn fear_profile_smooths_and_holds_without_new_data() {
    let mut config = seeded_config(3);
    config.general.enabled = false;
    let mut session = HorrorSession::new(config);
    let sender = session.sender();
    let (mut player, mut world) = (TestPlayer::at(0.0, 0.0), TestWorld::default());

    for intensity in [0.2, 0.4, 0.6] {
        sender.send(GameplayEvent::ScareTriggered {
            scare_kind: ScareKind::SuddenNoise,
            intensity: Some(intensity),
            timestamp: ts(),
        });
    }
    for _ in 0..50 {
        session.tick(FRAME, &mut player, &mut world);
    }
    let value = session.fear_profile().get(FearKind::SuddenNoises);
    assert!((value - 0.47).abs() < 1e-5, "{value}");

    for _ in 0..200 {
        session.tick(FRAME, &mut player, &mut world);
    }
    assert!((session.fear_profile().get(FearKind::SuddenNoises) - value).abs() < f32::EPSILON);
    assert_eq!(session.dominant_fear(), FearKind::Darkness);
}

#[test]
fn creature_panic_raises_creature_fear() {
    let mut config = seeded_config(4);
    config.general.enabled = false;
    let mut session = HorrorSession::new(config);
    let sender = session.sender();
    let (mut player, mut world) = (TestPlayer::at(0.0, 0.0), TestWorld::default());

    for _ in 0..5 {
        sender.send(GameplayEvent::PlayerSanityChanged {
            old_value: 80.0,
            new_value: 60.0,
            cause: Some(DamageSource::Creature {
                kind: "faceless".into(),
            }),
            timestamp: ts(),
        });
    }
    for _ in 0..50 {
        session.tick(FRAME, &mut player, &mut world);
    }
    assert_eq!(session.dominant_fear(), FearKind::Creatures);
    let rec = session.scare_recommendation().unwrap();
    assert_eq!(rec.fear_target, FearKind::Creatures);
    assert_eq!(rec.scare_kind, ScareKind::CreatureAppearance);
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[test]
fn recommendations_are_bounded_and_ordered() {
    let mut session = HorrorSession::new(seeded_config(5));
    let (mut player, mut world) = (TestPlayer::at(30.0, 30.0), TestWorld::default());
    player.sanity = 10.0;

    for _ in 0..300 {
        session.tick(FRAME, &mut player, &mut world);
        let recs = session.director().recommendations();
        assert!(recs.len() <= 3);
        for rec in recs {
            assert!((0.3..=1.0).contains(&rec.intensity));
        }
        assert!(recs.windows(2).all(|w| w[0].priority >= w[1].priority));
    }
}

// ---------------------------------------------------------------------------
// Fire decision
// ---------------------------------------------------------------------------

#[test]
fn first_scare_chance_matches_formula() {
    let director = Director::new(
        DirectorConfig {
            initial_tension: 0.5,
            ..DirectorConfig::default()
        },
        0.5,
        Some(0),
    );
    let since = Duration::from_secs(60);
    let decision = director.decide(0.30, since);
    assert!((decision.chance - 0.35).abs() < 1e-6);
    assert!(decision.fire);
    assert!(!director.decide(0.40, since).fire);
}

#[test]
fn fire_resets_clock_and_removes_time_bonus() {
    let mut director = Director::new(DirectorConfig::default(), 0.5, Some(9));
    let mut observer = Observer::new(ObserverConfig::default());
    let (mut player, mut world) = (TestPlayer::at(0.0, 0.0), TestWorld::default());

    let event = director.build_event(player.position, 0.5, ts());
    director.fire(event, &mut player, &mut world, &mut observer);
    assert_eq!(observer.context().time_since_last_scare, Duration::ZERO);

    for _ in 0..290 {
        observer.tick(FRAME, &player);
    }
    let since = observer.context().time_since_last_scare;
    assert!(since < Duration::from_secs(30));
    let expected = director.tension() * 0.1;
    assert!((director.fire_chance(since) - expected).abs() < 1e-6);
}

#[test]
fn fired_scares_apply_world_effects() {
    let mut config = seeded_config(11);
    config.director.first_scare_bonus = 1.0;
    config.director.short_gap_bonus = 1.0;
    let mut session = HorrorSession::new(config);
    let (mut player, mut world) = (TestPlayer::at(0.0, 0.0), TestWorld::default());

    let mut fired = Vec::new();
    for _ in 0..600 {
        if let Some(event) = session.tick(FRAME, &mut player, &mut world).fired {
            fired.push(event);
        }
    }
    assert!(!fired.is_empty());

    let creatures = fired
        .iter()
        .filter(|e| e.kind == ScareKind::CreatureAppearance)
        .count();
    let environment = fired
        .iter()
        .filter(|e| e.kind == ScareKind::EnvironmentChange)
        .count();
    assert_eq!(world.creatures.len(), creatures);
    assert_eq!(world.corruption.len(), environment);
    for (kind, position) in &world.creatures {
        assert!(nightmare_core::director::CREATURE_KINDS.contains(&kind.as_str()));
        let d = position.length();
        assert!((10.0 - 1e-3..=30.0 + 1e-3).contains(&d));
    }

    let expected_loss: f32 = fired.iter().map(|e| e.intensity * 5.0).sum();
    assert!((MAX_VITAL - player.sanity - expected_loss).abs() < 1e-3);

    let counters = session.counters();
    assert_eq!(counters.scares_fired, fired.len() as u64);
    assert_eq!(counters.creatures_spawned, creatures as u64);
}

#[test]
fn effectiveness_is_learned_from_sanity_drops() {
    let mut config = seeded_config(12);
    config.director.first_scare_bonus = 1.0;
    config.director.short_gap_bonus = 1.0;
    config.director.mood_rule = MoodRule::TrackEffectiveness;
    let mut session = HorrorSession::new(config);
    let (mut player, mut world) = (TestPlayer::at(0.0, 0.0), TestWorld::default());

    for _ in 0..1200 {
        session.tick(FRAME, &mut player, &mut world);
    }
    let director = session.director();
    assert!(director.total_fired() > 0);
    let learned = ScareKind::ALL
        .into_iter()
        .filter(|k| director.effectiveness(*k).is_some())
        .count();
    assert!(learned > 0);
    for kind in ScareKind::ALL {
        if let Some(e) = director.effectiveness(kind) {
            assert!((0.0..=1.0).contains(&e));
        }
    }
    assert!((0.0..=1.0).contains(&director.mood()));
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

#[test]
fn explorer_merges_by_averaging() {
    let mut book = PatternBook::new();
    book.add(BehaviorPattern::new("explorer", "roams", 0.8));
    book.add(BehaviorPattern::new("explorer", "roams", 0.6));
    assert_eq!(book.len(), 1);
    assert!((book.top(1)[0].weight - 0.7).abs() < 1e-6);
}

#[test]
fn wandering_player_is_an_explorer() {
    let mut config = seeded_config(13);
    config.general.enabled = false;
    let mut session = HorrorSession::new(config);
    let sender = session.sender();
    let (mut player, mut world) = (TestPlayer::at(0.0, 0.0), TestWorld::default());

    let mut last = Vec2::ZERO;
    for i in 1..=60 {
        let next = Vec2::new(i as f32 * 6.0, (i % 7) as f32 * 6.0);
        sender.send(GameplayEvent::PlayerMoved {
            position: next,
            old_position: last,
            speed: 1.2,
            timestamp: ts(),
        });
        last = next;
    }
    player.position = last;
    for _ in 0..50 {
        session.tick(FRAME, &mut player, &mut world);
    }
    let names: Vec<&str> = session.top_patterns(10).iter().map(|p| p.name.as_str()).collect();
    assert!(names.contains(&"explorer"), "{names:?}");
    assert!(!session.analyzer().heatmap().is_empty());
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

#[test]
fn malformed_events_never_disturb_the_loop() {
    let mut session = HorrorSession::new(seeded_config(14));
    let sender = session.sender();
    let (mut player, mut world) = (TestPlayer::at(0.0, 0.0), TestWorld::default());

    sender.send(GameplayEvent::PlayerMoved {
        position: Vec2::new(f32::NAN, 0.0),
        old_position: Vec2::ZERO,
        speed: 1.0,
        timestamp: ts(),
    });
    sender.send(GameplayEvent::PlayerDamaged {
        source: DamageSource::Unknown,
        amount: f32::INFINITY,
        timestamp: ts(),
    });
    sender.send(GameplayEvent::ScareTriggered {
        scare_kind: ScareKind::Whisper,
        intensity: Some(-0.5),
        timestamp: ts(),
    });
    let report = session.tick(FRAME, &mut player, &mut world);
    assert_eq!(report.events_rejected, 3);
    assert_eq!(report.events_ingested, 0);
    assert!(session.observer().actions().is_empty());
    assert_eq!(session.counters().events_rejected, 3);
}

#[test]
fn unknown_names_fall_back() {
    assert_eq!(FearKind::from_name("thalassophobia"), FearKind::Unknown);
    assert_eq!(ScareKind::from_name("laugh track"), ScareKind::AmbientSound);
}

#[test]
fn empty_profiles_answer_queries() {
    let session = HorrorSession::default();
    assert!(session.scare_recommendation().is_none());
    assert!(session.top_patterns(5).is_empty());
    assert_eq!(session.dominant_fear(), FearKind::Darkness);
    let fresh = FearProfile::uniform(0.5);
    assert_eq!(*session.fear_profile(), fresh);
}
