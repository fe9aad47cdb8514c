//! Session orchestrator: one `tick()` per simulation frame.
//!
//! ```text
//! tick(dt)
//!  ├─ drain queue → observer.record (moves also feed the tracker,
//!  │                                 host scares count as seen)
//!  ├─ observer.tick(dt)            fast clock: sanity delta, scare timer
//!  ├─ director.drift()             tension += increment
//!  └─ every analysis interval:
//!       position sample → analyzer → effectiveness → mood → recommend
//!       → should_fire → build_event → fire
//! ```

use crate::analyzer::{BehaviorAnalyzer, InteractionAnalysis};
use crate::config::NightmareConfig;
use crate::director::{Director, FireOutcome, ScareEvent, ScareRecommendation};
use crate::error::{NightmareError, Result};
use crate::events::{EventQueue, EventSender, GameplayEvent};
use crate::metrics::{CounterSnapshot, CycleTimer, DirectorCounters, TimingPercentiles, spans};
use crate::observer::{EnvironmentHints, ObservationContext, Observer};
use crate::patterns::BehaviorPattern;
use crate::profile::{ActionForecast, FearProfile, ReactorProfile};
use crate::spatial::{MovementAnalysis, MovementTracker};
use crate::types::{FearKind, GameTimestamp, ReactorKind};
use crate::world::{PlayerState, WorldEffects};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, span, warn, Level};

/// Patterns included in a snapshot.
const SNAPSHOT_PATTERNS: usize = 5;

/// What one tick did.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Tick number (starts at 1).
    pub tick: u64,
    /// Events accepted this tick.
    pub events_ingested: usize,
    /// Events rejected as malformed or dropped for capacity.
    pub events_rejected: usize,
    /// Whether the analysis cycle ran.
    pub cycle_ran: bool,
    /// The scare fired this tick, if any.
    pub fired: Option<ScareEvent>,
    /// Its effect on the world.
    pub outcome: Option<FireOutcome>,
}

/// Serializable view of the session for debug overlays and logs.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    /// Ticks run.
    pub tick: u64,
    /// Simulation seconds elapsed.
    pub sim_seconds: f64,
    /// Director mood.
    pub mood: f32,
    /// Director tension.
    pub tension: f32,
    /// Strongest fear.
    pub dominant_fear: FearKind,
    /// Fear profile in ordinal order.
    pub fear_profile: Vec<(FearKind, f32)>,
    /// Strongest archetype.
    pub dominant_reactor: ReactorKind,
    /// Reactor profile in ordinal order.
    pub reactor_profile: Vec<(ReactorKind, f32)>,
    /// Next-action forecast.
    pub forecast: ActionForecast,
    /// Strongest behaviour patterns.
    pub top_patterns: Vec<BehaviorPattern>,
    /// Current recommendations.
    pub recommendations: Vec<ScareRecommendation>,
    /// Latest movement statistics.
    pub movement: Option<MovementAnalysis>,
    /// Latest interaction statistics.
    pub interaction: InteractionAnalysis,
    /// Observation context.
    pub context: ObservationContext,
    /// Most recent scare.
    pub last_scare: Option<ScareEvent>,
    /// Counters.
    pub counters: CounterSnapshot,
    /// Analysis-cycle timing.
    pub cycle_timing: TimingPercentiles,
}

impl SessionSnapshot {
    /// Encode as pretty JSON.
    ///
    /// # Errors
    /// Returns `NightmareError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| NightmareError::Serialization(e.to_string()))
    }
}

/// The whole director loop for one player.
#[derive(Debug)]
pub struct HorrorSession {
    config: NightmareConfig,
    queue: EventQueue,
    observer: Observer,
    tracker: MovementTracker,
    analyzer: BehaviorAnalyzer,
    director: Director,
    counters: DirectorCounters,
    cycle_timer: CycleTimer,
    tick: u64,
    sim_seconds: f64,
}

impl HorrorSession {
    /// Create a session from configuration.
    #[must_use]
    pub fn new(config: NightmareConfig) -> Self {
        let observer = Observer::new(config.observer.clone());
        let analyzer = BehaviorAnalyzer::new(config.analyzer.clone(), &config.observer);
        let director = Director::new(
            config.director.clone(),
            config.analyzer.neutral_prior,
            config.general.seed,
        );
        Self {
            queue: EventQueue::new(config.observer.max_pending_events),
            tracker: MovementTracker::new(config.spatial.clone()),
            cycle_timer: CycleTimer::new(f64::from(config.telemetry.log_slow_cycles_ms)),
            counters: DirectorCounters::new(),
            observer,
            analyzer,
            director,
            tick: 0,
            sim_seconds: 0.0,
            config,
        }
    }

    /// A producer handle for gameplay events.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        self.queue.sender()
    }

    /// Enqueue an event directly (same as sending through [`Self::sender`]).
    pub fn push_event(&self, event: GameplayEvent) -> bool {
        self.queue.sender().send(event)
    }

    /// Current simulation timestamp.
    #[must_use]
    pub fn now(&self) -> GameTimestamp {
        GameTimestamp::now(self.tick, self.sim_seconds)
    }

    /// Advance the session by one frame.
    pub fn tick(
        &mut self,
        dt: Duration,
        player: &mut impl PlayerState,
        world: &mut impl WorldEffects,
    ) -> TickReport {
        let _span = span!(Level::TRACE, spans::TICK).entered();
        self.tick += 1;
        self.sim_seconds += dt.as_secs_f64();

        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        // 1. Ingest
        {
            let _ingest = span!(Level::TRACE, spans::INGEST).entered();
            let batch = self.queue.drain();
            let position = player.position();
            for event in &batch.events {
                if self.observer.record(event, position).is_rejected() {
                    report.events_rejected += 1;
                    continue;
                }
                report.events_ingested += 1;
                match event {
                    GameplayEvent::PlayerMoved { position, .. } => {
                        self.tracker.record_position(*position);
                    }
                    GameplayEvent::ScareTriggered { .. } => self.director.note_external_scare(),
                    _ => {}
                }
            }
            report.events_rejected += usize::try_from(batch.dropped).unwrap_or(usize::MAX);
            DirectorCounters::bump(&self.counters.events_ingested, report.events_ingested as u64);
            DirectorCounters::bump(&self.counters.events_rejected, report.events_rejected as u64);
        }

        // 2. Fast clock
        self.observer.tick(dt, &*player);
        self.director.drift();

        // 3. Slow clock
        if self.observer.take_cycle() {
            report.cycle_ran = true;
            if let Some((event, outcome)) = self.run_cycle(player, world) {
                report.fired = Some(event);
                report.outcome = Some(outcome);
            }
        }

        report
    }

    fn run_cycle(
        &mut self,
        player: &mut impl PlayerState,
        world: &mut impl WorldEffects,
    ) -> Option<(ScareEvent, FireOutcome)> {
        let _span = span!(Level::DEBUG, spans::CYCLE, tick = self.tick).entered();
        let timer = self.cycle_timer.start();

        let position = player.position();
        if self.tracker.positions().latest() != Some(&position) {
            self.tracker.record_position(position);
        }
        self.analyzer.analyze(&mut self.observer, &self.tracker);
        self.director.evaluate_effectiveness(player.sanity());
        self.director.update_mood();
        self.director
            .recommend(self.analyzer.fear_profile(), self.observer.context(), position);

        let mut fired = None;
        if self.config.general.enabled {
            let decision = self
                .director
                .should_fire(self.observer.context().time_since_last_scare);
            if decision.fire {
                let _fire = span!(Level::DEBUG, spans::FIRE).entered();
                let now = self.now();
                let reactivity = self.analyzer.reactivity();
                let event = self.director.build_event(position, reactivity, now);
                let outcome = self
                    .director
                    .fire(event.clone(), player, world, &mut self.observer);
                DirectorCounters::bump(&self.counters.scares_fired, 1);
                if outcome.spawned.is_some() {
                    DirectorCounters::bump(&self.counters.creatures_spawned, 1);
                }
                if outcome.environment_changed {
                    DirectorCounters::bump(&self.counters.environment_changes, 1);
                }
                fired = Some((event, outcome));
            }
        }

        DirectorCounters::bump(&self.counters.cycles_run, 1);
        let elapsed_ms = timer.elapsed_ms();
        drop(timer);
        if elapsed_ms > self.cycle_timer.budget_ms() {
            warn!(
                tick = self.tick,
                elapsed_ms,
                budget_ms = self.cycle_timer.budget_ms(),
                "Slow analysis cycle"
            );
        } else {
            debug!(tick = self.tick, elapsed_ms, fired = fired.is_some(), "Analysis cycle");
        }
        fired
    }

    /// Push environment readings (light, openness, exits) into the context.
    pub fn set_environment(&mut self, hints: EnvironmentHints) {
        self.observer.set_environment(hints);
    }

    // -- Query surface ------------------------------------------------------

    /// Strongest fear (ties: lowest ordinal).
    #[must_use]
    pub fn dominant_fear(&self) -> FearKind {
        self.analyzer.dominant_fear()
    }

    /// Current fear profile.
    #[must_use]
    pub fn fear_profile(&self) -> &FearProfile {
        self.analyzer.fear_profile()
    }

    /// Current reactor profile.
    #[must_use]
    pub fn reactor_profile(&self) -> &ReactorProfile {
        self.analyzer.reactor_profile()
    }

    /// The `n` strongest behaviour patterns.
    #[must_use]
    pub fn top_patterns(&self, n: usize) -> &[BehaviorPattern] {
        self.analyzer.top_patterns(n)
    }

    /// The highest-priority scare recommendation.
    #[must_use]
    pub fn scare_recommendation(&self) -> Option<&ScareRecommendation> {
        self.director.best_recommendation()
    }

    /// Next-action forecast.
    #[must_use]
    pub fn forecast(&self) -> &ActionForecast {
        self.analyzer.forecast()
    }

    /// The observer (histories and context).
    #[must_use]
    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    /// The analyzer (profiles, patterns, heatmap).
    #[must_use]
    pub fn analyzer(&self) -> &BehaviorAnalyzer {
        &self.analyzer
    }

    /// The director (mood, tension, history, recommendations).
    #[must_use]
    pub fn director(&self) -> &Director {
        &self.director
    }

    /// The movement tracker.
    #[must_use]
    pub fn tracker(&self) -> &MovementTracker {
        &self.tracker
    }

    /// Counter snapshot.
    #[must_use]
    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    /// Analysis-cycle timing statistics.
    #[must_use]
    pub fn cycle_timing(&self) -> TimingPercentiles {
        self.cycle_timer.percentiles()
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &NightmareConfig {
        &self.config
    }

    /// Ticks run so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Serializable view of the whole session.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            tick: self.tick,
            sim_seconds: self.sim_seconds,
            mood: self.director.mood(),
            tension: self.director.tension(),
            dominant_fear: self.dominant_fear(),
            fear_profile: self.fear_profile().iter().collect(),
            dominant_reactor: self.reactor_profile().dominant(),
            reactor_profile: self.reactor_profile().iter().collect(),
            forecast: self.forecast().clone(),
            top_patterns: self.top_patterns(SNAPSHOT_PATTERNS).to_vec(),
            recommendations: self.director.recommendations().to_vec(),
            movement: self.analyzer.movement().cloned(),
            interaction: self.analyzer.interaction().clone(),
            context: self.observer.context().clone(),
            last_scare: self.director.history().latest().cloned(),
            counters: self.counters(),
            cycle_timing: self.cycle_timing(),
        }
    }
}

impl Default for HorrorSession {
    fn default() -> Self {
        Self::new(NightmareConfig::default())
    }
}
