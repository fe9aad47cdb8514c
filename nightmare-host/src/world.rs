//! Corruptible tile world.
//!
//! A bounded grid of corruption levels plus a registry of creatures the
//! director has spawned. Implements the core [`WorldEffects`] seam.

use std::collections::BTreeMap;

use nightmare_core::types::{EntityId, Vec2};
use nightmare_core::world::WorldEffects;
use serde::Serialize;
use tracing::debug;

/// Corruption above which a tile counts as corrupted.
pub const CORRUPTED_THRESHOLD: f32 = 0.7;

/// A creature placed in the world by a scare.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpawnedCreature {
    /// Handle returned to the director.
    pub id: EntityId,
    /// Creature kind name.
    pub kind: String,
    /// Spawn position.
    pub position: Vec2,
}

/// Tile grid with per-tile corruption in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct CorruptionWorld {
    width: usize,
    height: usize,
    corruption: Vec<f32>,
    creatures: Vec<SpawnedCreature>,
    effects_applied: u64,
}

impl CorruptionWorld {
    /// An uncorrupted `width × height` world.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            corruption: vec![0.0; width * height],
            creatures: Vec::new(),
            effects_applied: 0,
        }
    }

    /// Grid width in tiles.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in tiles.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Corruption of one tile, `None` outside the grid.
    #[must_use]
    pub fn corruption_at(&self, x: usize, y: usize) -> Option<f32> {
        (x < self.width && y < self.height).then(|| self.corruption[y * self.width + x])
    }

    /// Corruption under a world position, `None` outside the grid.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn corruption_under(&self, position: Vec2) -> Option<f32> {
        if !position.is_finite() || position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        self.corruption_at(position.x.floor() as usize, position.y.floor() as usize)
    }

    /// Number of tiles above [`CORRUPTED_THRESHOLD`].
    #[must_use]
    pub fn corrupted_tiles(&self) -> usize {
        self.corruption
            .iter()
            .filter(|&&c| c > CORRUPTED_THRESHOLD)
            .count()
    }

    /// Mean corruption over the whole grid.
    #[must_use]
    pub fn mean_corruption(&self) -> f32 {
        if self.corruption.is_empty() {
            return 0.0;
        }
        self.corruption.iter().sum::<f32>() / self.corruption.len() as f32
    }

    /// Creatures currently in the world.
    #[must_use]
    pub fn creatures(&self) -> &[SpawnedCreature] {
        &self.creatures
    }

    /// Distance from `position` to the nearest creature.
    #[must_use]
    pub fn nearest_creature(&self, position: Vec2) -> Option<(&SpawnedCreature, f32)> {
        self.creatures
            .iter()
            .map(|c| (c, c.position.distance(position)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Remove a creature. Returns whether it existed.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let before = self.creatures.len();
        self.creatures.retain(|c| c.id != id);
        self.creatures.len() != before
    }

    /// Creature counts by kind.
    #[must_use]
    pub fn creature_census(&self) -> BTreeMap<&str, usize> {
        let mut census = BTreeMap::new();
        for c in &self.creatures {
            *census.entry(c.kind.as_str()).or_insert(0) += 1;
        }
        census
    }

    /// Environment changes applied so far.
    #[must_use]
    pub fn effects_applied(&self) -> u64 {
        self.effects_applied
    }
}

impl Default for CorruptionWorld {
    fn default() -> Self {
        Self::new(256, 256)
    }
}

impl WorldEffects for CorruptionWorld {
    fn spawn_creature(&mut self, kind: &str, position: Vec2) -> EntityId {
        let id = EntityId::new();
        self.creatures.push(SpawnedCreature {
            id,
            kind: kind.to_string(),
            position,
        });
        debug!(%id, kind, %position, "Creature spawned");
        id
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss
    )]
    fn modify_environment(&mut self, position: Vec2, intensity: f32) {
        if !position.is_finite() || !intensity.is_finite() {
            return;
        }
        let intensity = intensity.clamp(0.0, 1.0);
        let radius = 10.0 + intensity * 20.0;
        let radius_sq = radius * radius;

        let x0 = (position.x - radius).floor().max(0.0) as usize;
        let y0 = (position.y - radius).floor().max(0.0) as usize;
        let x1 = ((position.x + radius).ceil() as i64).min(self.width as i64 - 1);
        let y1 = ((position.y + radius).ceil() as i64).min(self.height as i64 - 1);
        if x1 < 0 || y1 < 0 {
            return;
        }

        let mut touched = 0usize;
        for y in y0..=y1 as usize {
            for x in x0..=x1 as usize {
                let dx = x as f32 - position.x;
                let dy = y as f32 - position.y;
                let d_sq = dx * dx + dy * dy;
                if d_sq > radius_sq {
                    continue;
                }
                let strength = (1.0 - d_sq / radius_sq) * intensity;
                let tile = &mut self.corruption[y * self.width + x];
                *tile = (*tile + strength * 0.3).min(1.0);
                touched += 1;
            }
        }
        self.effects_applied += 1;
        debug!(%position, intensity, radius, touched, "Environment corrupted");
    }
}
