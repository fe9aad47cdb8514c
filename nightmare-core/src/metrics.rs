//! Runtime metrics and instrumentation.
//!
//! Counters are lock-free `AtomicU64`s bumped on the hot path and read on
//! export. Timing history sits behind a `parking_lot::Mutex` since it is
//! written once per cycle and read rarely.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Counters (lock-free)
// ---------------------------------------------------------------------------

/// Atomic counters for director activity.
pub struct DirectorCounters {
    /// Events accepted by the observer.
    pub events_ingested: AtomicU64,
    /// Events rejected as malformed or dropped by a full queue.
    pub events_rejected: AtomicU64,
    /// Analysis cycles completed.
    pub cycles_run: AtomicU64,
    /// Scares fired.
    pub scares_fired: AtomicU64,
    /// Creatures spawned by scares.
    pub creatures_spawned: AtomicU64,
    /// Environment corruption effects applied.
    pub environment_changes: AtomicU64,
}

impl DirectorCounters {
    /// Create a new set of zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events_ingested: AtomicU64::new(0),
            events_rejected: AtomicU64::new(0),
            cycles_run: AtomicU64::new(0),
            scares_fired: AtomicU64::new(0),
            creatures_spawned: AtomicU64::new(0),
            environment_changes: AtomicU64::new(0),
        }
    }

    /// Add to a counter.
    pub fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    /// Snapshot all counters for export.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            events_ingested: self.events_ingested.load(Ordering::Relaxed),
            events_rejected: self.events_rejected.load(Ordering::Relaxed),
            cycles_run: self.cycles_run.load(Ordering::Relaxed),
            scares_fired: self.scares_fired.load(Ordering::Relaxed),
            creatures_spawned: self.creatures_spawned.load(Ordering::Relaxed),
            environment_changes: self.environment_changes.load(Ordering::Relaxed),
        }
    }
}

impl Default for DirectorCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DirectorCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.snapshot().fmt(f)
    }
}

/// A snapshot of counter values at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CounterSnapshot {
    /// Events accepted.
    pub events_ingested: u64,
    /// Events rejected.
    pub events_rejected: u64,
    /// Analysis cycles completed.
    pub cycles_run: u64,
    /// Scares fired.
    pub scares_fired: u64,
    /// Creatures spawned.
    pub creatures_spawned: u64,
    /// Environment changes applied.
    pub environment_changes: u64,
}

impl CounterSnapshot {
    /// Format as Prometheus-compatible text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP nightmare_events_ingested_total Gameplay events accepted\n\
             # TYPE nightmare_events_ingested_total counter\n\
             nightmare_events_ingested_total {}\n\
             # HELP nightmare_events_rejected_total Gameplay events rejected or dropped\n\
             # TYPE nightmare_events_rejected_total counter\n\
             nightmare_events_rejected_total {}\n\
             # HELP nightmare_cycles_total Analysis cycles completed\n\
             # TYPE nightmare_cycles_total counter\n\
             nightmare_cycles_total {}\n\
             # HELP nightmare_scares_fired_total Scares fired\n\
             # TYPE nightmare_scares_fired_total counter\n\
             nightmare_scares_fired_total {}\n\
             # HELP nightmare_world_effects_total World effects applied by kind\n\
             # TYPE nightmare_world_effects_total counter\n\
             nightmare_world_effects_total{{effect=\"spawn_creature\"}} {}\n\
             nightmare_world_effects_total{{effect=\"modify_environment\"}} {}\n",
            self.events_ingested,
            self.events_rejected,
            self.cycles_run,
            self.scares_fired,
            self.creatures_spawned,
            self.environment_changes,
        )
    }
}

// ---------------------------------------------------------------------------
// Cycle Timer
// ---------------------------------------------------------------------------

const TIMER_SLOTS: usize = 128;

/// Ring of recent timings (milliseconds) checked against a budget.
///
/// Used for analysis cycles in the core and for whole frames in the host.
pub struct CycleTimer {
    budget_ms: f64,
    history: Mutex<TimerHistory>,
}

struct TimerHistory {
    timings: Vec<f64>,
    write_idx: usize,
    count: u64,
    last_over_budget: bool,
}

impl CycleTimer {
    /// Create a timer with the given budget (milliseconds).
    #[must_use]
    pub fn new(budget_ms: f64) -> Self {
        Self {
            budget_ms,
            history: Mutex::new(TimerHistory {
                timings: vec![0.0; TIMER_SLOTS],
                write_idx: 0,
                count: 0,
                last_over_budget: false,
            }),
        }
    }

    /// Start timing. The guard records elapsed time on drop.
    #[must_use]
    pub fn start(&self) -> TimerGuard<'_> {
        TimerGuard {
            timer: self,
            start: Instant::now(),
        }
    }

    /// Record a timing manually. Returns whether it exceeded the budget.
    pub fn record(&self, ms: f64) -> bool {
        let mut h = self.history.lock();
        let idx = h.write_idx;
        h.timings[idx] = ms;
        h.write_idx = (idx + 1) % TIMER_SLOTS;
        h.count += 1;
        h.last_over_budget = ms > self.budget_ms;
        h.last_over_budget
    }

    /// Most recent timing, or 0 if nothing was recorded.
    #[must_use]
    pub fn last_ms(&self) -> f64 {
        let h = self.history.lock();
        if h.count == 0 {
            return 0.0;
        }
        h.timings[(h.write_idx + TIMER_SLOTS - 1) % TIMER_SLOTS]
    }

    /// Whether the last timing exceeded the budget.
    #[must_use]
    pub fn is_over_budget(&self) -> bool {
        self.history.lock().last_over_budget
    }

    /// P50 / P95 / P99 / max over the retained timings.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percentiles(&self) -> TimingPercentiles {
        let h = self.history.lock();
        let n = usize::try_from(h.count).unwrap_or(usize::MAX).min(TIMER_SLOTS);
        if n == 0 {
            return TimingPercentiles::default();
        }

        let mut sorted = h.timings[..n].to_vec();
        sorted.sort_by(f64::total_cmp);

        let at = |q: f64| sorted[((n as f64 * q) as usize).min(n - 1)];
        let over = sorted.iter().filter(|&&t| t > self.budget_ms).count();

        TimingPercentiles {
            p50: at(0.5),
            p95: at(0.95),
            p99: at(0.99),
            max: sorted[n - 1],
            over_budget_ratio: over as f64 / n as f64,
        }
    }

    /// Total timings recorded.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.history.lock().count
    }

    /// The configured budget in milliseconds.
    #[must_use]
    pub fn budget_ms(&self) -> f64 {
        self.budget_ms
    }
}

impl std::fmt::Debug for CycleTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CycleTimer")
            .field("budget_ms", &self.budget_ms)
            .field("count", &self.count())
            .finish_non_exhaustive()
    }
}

/// RAII guard that records elapsed time when dropped.
pub struct TimerGuard<'a> {
    timer: &'a CycleTimer,
    start: Instant,
}

impl TimerGuard<'_> {
    /// Milliseconds since the guard was created.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.timer.record(self.elapsed_ms());
    }
}

/// Percentile statistics for recorded timings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TimingPercentiles {
    /// Median in milliseconds.
    pub p50: f64,
    /// 95th percentile in milliseconds.
    pub p95: f64,
    /// 99th percentile in milliseconds.
    pub p99: f64,
    /// Maximum observed timing.
    pub max: f64,
    /// Share of timings over budget (0.0–1.0).
    pub over_budget_ratio: f64,
}

impl TimingPercentiles {
    /// Format as a human-readable summary.
    #[must_use]
    pub fn summary(&self, budget_ms: f64) -> String {
        format!(
            "P50={:.3}ms  P95={:.3}ms  P99={:.3}ms  Max={:.3}ms  Budget={budget_ms:.1}ms  \
             Over-budget={:.1}%",
            self.p50,
            self.p95,
            self.p99,
            self.max,
            self.over_budget_ratio * 100.0,
        )
    }
}

// ---------------------------------------------------------------------------
// Tracing Span Names
// ---------------------------------------------------------------------------

/// Span names used with `tracing::span!`.
pub mod spans {
    /// Whole session tick.
    pub const TICK: &str = "nightmare::tick";
    /// Event drain and ingestion.
    pub const INGEST: &str = "nightmare::ingest";
    /// Slow analysis cycle.
    pub const CYCLE: &str = "nightmare::cycle";
    /// Scare execution.
    pub const FIRE: &str = "nightmare::fire";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment_and_export() {
        let c = DirectorCounters::new();
        DirectorCounters::bump(&c.events_ingested, 5);
        DirectorCounters::bump(&c.scares_fired, 1);
        let snap = c.snapshot();
        assert_eq!(snap.events_ingested, 5);
        assert_eq!(snap.scares_fired, 1);
        assert_eq!(snap.cycles_run, 0);

        let text = snap.to_prometheus();
        assert!(text.contains("nightmare_events_ingested_total 5"));
        assert!(text.contains("nightmare_world_effects_total{effect=\"spawn_creature\"} 0"));
    }

    #[test]
    fn timer_percentiles() {
        let timer = CycleTimer::new(2.0);
        for ms in 1..=10 {
            timer.record(f64::from(ms) * 0.5);
        }
        let p = timer.percentiles();
        assert!((p.max - 5.0).abs() < f64::EPSILON);
        assert!((p.p50 - 3.0).abs() < f64::EPSILON);
        assert!((p.over_budget_ratio - 0.6).abs() < 1e-9);
        assert!((timer.last_ms() - 5.0).abs() < f64::EPSILON);
        assert!(timer.is_over_budget());
    }

    #[test]
    fn timer_ring_wraps() {
        let timer = CycleTimer::new(1.0);
        for _ in 0..TIMER_SLOTS + 10 {
            timer.record(0.1);
        }
        assert_eq!(timer.count(), (TIMER_SLOTS + 10) as u64);
        assert!((timer.percentiles().max - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn guard_records_on_drop() {
        let timer = CycleTimer::new(1000.0);
        {
            let _guard = timer.start();
        }
        assert_eq!(timer.count(), 1);
        assert!(!timer.is_over_budget());
    }

    #[test]
    fn empty_timer_is_zero() {
        let timer = CycleTimer::new(1.0);
        assert_eq!(timer.percentiles(), TimingPercentiles::default());
        assert_eq!(timer.last_ms(), 0.0);
    }
}
