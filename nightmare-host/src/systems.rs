//! Frame systems for the horror director.
//!
//! ## System Budget (per frame):
//!
//! | System              | Budget   | Frequency        |
//! |---------------------|----------|------------------|
//! | Environment sample  | 0.01ms   | Every frame      |
//! | Event ingestion     | 0.05ms   | Every frame      |
//! | Analysis cycle      | 2.0ms    | Every 5 s        |
//! | Scare execution     | 0.1ms    | On fire          |

use std::time::Duration;

use nightmare_core::HorrorSession;
use nightmare_core::metrics::{CycleTimer, TimingPercentiles};
use nightmare_core::observer::EnvironmentHints;
use nightmare_core::session::TickReport;
use nightmare_core::world::PlayerState;
use tracing::warn;

use crate::components::PlayerComponent;
use crate::world::CorruptionWorld;

/// Default whole-frame budget in milliseconds.
pub const FRAME_BUDGET_MS: f64 = 2.0;

/// Creatures closer than this count as blocking an exit.
const EXIT_BLOCK_RADIUS: f32 = 15.0;

/// Exits assumed when nothing blocks the player.
const OPEN_EXITS: u32 = 4;

/// Result of one frame.
#[derive(Debug)]
pub struct FrameReport {
    /// What the session did.
    pub tick: TickReport,
    /// Wall time spent in the frame.
    pub elapsed_ms: f64,
    /// Whether the frame exceeded its budget.
    pub over_budget: bool,
}

/// Runs the director once per frame against a frame budget.
#[derive(Debug)]
pub struct FrameDriver {
    timer: CycleTimer,
}

impl FrameDriver {
    /// A driver with the given frame budget.
    #[must_use]
    pub fn new(budget_ms: f64) -> Self {
        Self {
            timer: CycleTimer::new(budget_ms),
        }
    }

    /// Sample the environment, then tick the session.
    pub fn run_frame(
        &self,
        session: &mut HorrorSession,
        dt: Duration,
        player: &mut PlayerComponent,
        world: &mut CorruptionWorld,
    ) -> FrameReport {
        let guard = self.timer.start();
        session.set_environment(sample_environment(player, world));
        let tick = session.tick(dt, player, world);
        let elapsed_ms = guard.elapsed_ms();
        drop(guard);

        let over_budget = self.timer.is_over_budget();
        if over_budget {
            warn!(
                tick = tick.tick,
                elapsed_ms,
                budget_ms = self.timer.budget_ms(),
                "Director frame over budget"
            );
        }
        FrameReport {
            tick,
            elapsed_ms,
            over_budget,
        }
    }

    /// Frame timing percentiles.
    #[must_use]
    pub fn timing(&self) -> TimingPercentiles {
        self.timer.percentiles()
    }

    /// The frame budget in milliseconds.
    #[must_use]
    pub fn budget_ms(&self) -> f64 {
        self.timer.budget_ms()
    }
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new(FRAME_BUDGET_MS)
    }
}

/// Environment readings around the player: corruption darkens the light,
/// nearby creatures close off exits.
#[must_use]
pub fn sample_environment(player: &PlayerComponent, world: &CorruptionWorld) -> EnvironmentHints {
    let position = player.position();
    let corruption = world.corruption_under(position).unwrap_or(0.0);
    let blocked = world
        .creatures()
        .iter()
        .filter(|c| c.position.distance(position) < EXIT_BLOCK_RADIUS)
        .count();
    let blocked = u32::try_from(blocked).unwrap_or(u32::MAX);

    EnvironmentHints {
        light_level: 1.0 - corruption,
        open_space: 1.0 - corruption * 0.5,
        nearby_exits: OPEN_EXITS.saturating_sub(blocked),
    }
}
