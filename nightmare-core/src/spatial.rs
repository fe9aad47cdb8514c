//! Spatial and movement analytics.
//!
//! Position samples feed a bounded path history and a cumulative grid of
//! cell visits. [`MovementTracker::compute`] turns them into a
//! [`MovementAnalysis`]:
//!
//! ```text
//!   average speed   = path length / (n - 1)
//!   turns           = # of consecutive segment pairs bending more than the threshold
//!   explored area   = distinct cells × cell area
//!   repetition      = max(0, mean visits per cell - 1)
//!   preferred areas = top-k cells by visits (ties: ascending cell), as cell centres
//! ```

use crate::config::SpatialConfig;
use crate::history::BoundedHistory;
use crate::types::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Integer grid cell. Ordered by `x`, then `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Cell {
    /// The cell containing `position` for the given cell size (floor quantization).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn containing(position: Vec2, cell_size: f32) -> Self {
        Self {
            x: (position.x / cell_size).floor() as i32,
            y: (position.y / cell_size).floor() as i32,
        }
    }

    /// World-space centre of this cell.
    #[must_use]
    pub fn center(self, cell_size: f32) -> Vec2 {
        Vec2::new(
            self.x as f32 * cell_size + cell_size / 2.0,
            self.y as f32 * cell_size + cell_size / 2.0,
        )
    }
}

/// Summary of recent player movement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MovementAnalysis {
    /// Mean distance covered per sample interval.
    pub average_speed: f32,
    /// Number of sharp direction changes along the path.
    pub direction_changes: u32,
    /// Distinct cells visited × cell area.
    pub explored_area: f32,
    /// Mean visits per cell minus one (zero when every cell was seen once).
    pub path_repetition: f32,
    /// Centres of the most-visited cells, most visited first.
    pub preferred_areas: Vec<Vec2>,
}

/// Records player positions and derives movement statistics.
#[derive(Debug, Clone)]
pub struct MovementTracker {
    config: SpatialConfig,
    positions: BoundedHistory<Vec2>,
    visits: BTreeMap<Cell, u32>,
}

impl MovementTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new(config: SpatialConfig) -> Self {
        Self {
            positions: BoundedHistory::new(config.position_capacity),
            visits: BTreeMap::new(),
            config,
        }
    }

    /// Append a position sample and count a visit to its cell.
    /// Non-finite positions are ignored.
    pub fn record_position(&mut self, position: Vec2) {
        if !position.is_finite() {
            return;
        }
        self.positions.push(position);
        *self
            .visits
            .entry(Cell::containing(position, self.config.cell_size))
            .or_insert(0) += 1;
    }

    /// Derive movement statistics. `None` with fewer than two samples.
    #[must_use]
    pub fn compute(&self) -> Option<MovementAnalysis> {
        let points: Vec<Vec2> = self.positions.iter().copied().collect();
        if points.len() < 2 {
            return None;
        }

        let path_length: f32 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
        let average_speed = path_length / (points.len() - 1) as f32;

        let threshold = self.config.turn_threshold_degrees.to_radians();
        let direction_changes = points
            .windows(3)
            .filter(|w| turn_angle(w[1] - w[0], w[2] - w[1]).is_some_and(|a| a > threshold))
            .count();

        let cell_area = self.config.cell_size * self.config.cell_size;
        let distinct = self.visits.len();
        let total: u64 = self.visits.values().map(|&v| u64::from(v)).sum();
        let path_repetition = if distinct == 0 {
            0.0
        } else {
            (total as f32 / distinct as f32 - 1.0).max(0.0)
        };

        Some(MovementAnalysis {
            average_speed,
            direction_changes: u32::try_from(direction_changes).unwrap_or(u32::MAX),
            explored_area: distinct as f32 * cell_area,
            path_repetition,
            preferred_areas: self.preferred_areas(),
        })
    }

    /// Centres of the most-visited cells. Ties break by ascending cell.
    #[must_use]
    pub fn preferred_areas(&self) -> Vec<Vec2> {
        let mut ranked: Vec<(Cell, u32)> = self.visits.iter().map(|(c, v)| (*c, *v)).collect();
        // BTreeMap order is ascending by cell and the sort is stable.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(self.config.preferred_area_count)
            .map(|(cell, _)| cell.center(self.config.cell_size))
            .collect()
    }

    /// Visit heatmap, `resolution × resolution` rows over `[0, world_extent)²`,
    /// indexed `[row][column]`. Each value is `min(1, visits / 10)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn heatmap(&self) -> Vec<Vec<f32>> {
        let resolution = self.config.heatmap_resolution;
        let bucket = self.config.world_extent / resolution as f32;
        let mut counts = vec![vec![0u64; resolution]; resolution];

        for (cell, visits) in &self.visits {
            let centre = cell.center(self.config.cell_size);
            if centre.x < 0.0 || centre.y < 0.0 {
                continue;
            }
            let column = (centre.x / bucket).floor() as usize;
            let row = (centre.y / bucket).floor() as usize;
            if column < resolution && row < resolution {
                counts[row][column] += u64::from(*visits);
            }
        }

        counts
            .into_iter()
            .map(|row| row.into_iter().map(|c| (c as f32 / 10.0).min(1.0)).collect())
            .collect()
    }

    /// Visit count for a single cell.
    #[must_use]
    pub fn visits(&self, cell: Cell) -> u32 {
        self.visits.get(&cell).copied().unwrap_or(0)
    }

    /// Retained samples, oldest first.
    #[must_use]
    pub fn positions(&self) -> &BoundedHistory<Vec2> {
        &self.positions
    }

    /// Number of distinct cells ever visited.
    #[must_use]
    pub fn distinct_cells(&self) -> usize {
        self.visits.len()
    }
}

/// Angle between two segments, or `None` if either is degenerate.
fn turn_angle(a: Vec2, b: Vec2) -> Option<f32> {
    let (la, lb) = (a.length(), b.length());
    if la <= f32::EPSILON || lb <= f32::EPSILON {
        return None;
    }
    let cos = ((a.x * b.x + a.y * b.y) / (la * lb)).clamp(-1.0, 1.0);
    Some(cos.acos())
}
