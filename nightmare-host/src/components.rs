//! Player component.
//!
//! The component owns the player's body state and implements the core
//! [`PlayerState`] seam so the director can read and drain it directly.

use std::f32::consts::TAU;

use nightmare_core::types::Vec2;
use nightmare_core::world::{MAX_VITAL, PlayerState};
use serde::{Deserialize, Serialize};

/// Distance covered by one forward or backward step.
pub const MOVE_SPEED: f32 = 3.0;

/// Radians turned per turn step.
pub const ROTATION_SPEED: f32 = 0.05;

/// Where a fresh player starts (centre of a 256×256 world).
pub const SPAWN_POINT: Vec2 = Vec2::new(128.0, 128.0);

/// The player's body: position, facing, health and sanity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerComponent {
    /// World position.
    pub position: Vec2,
    /// Facing in radians, kept in `[0, 2π)`.
    pub heading: f32,
    health: f32,
    sanity: f32,
}

impl PlayerComponent {
    /// A healthy, sane player at `position` facing along +x.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            heading: 0.0,
            health: MAX_VITAL,
            sanity: MAX_VITAL,
        }
    }

    /// Unit vector along the current heading.
    #[must_use]
    pub fn facing(&self) -> Vec2 {
        Vec2::from_polar(self.heading, 1.0)
    }

    /// Step along the heading. Returns `(old, new)` positions.
    pub fn step_forward(&mut self, distance: f32) -> (Vec2, Vec2) {
        let old = self.position;
        self.position = old + self.facing() * distance;
        (old, self.position)
    }

    /// Step against the heading. Returns `(old, new)` positions.
    pub fn step_backward(&mut self, distance: f32) -> (Vec2, Vec2) {
        self.step_forward(-distance)
    }

    /// Turn by `radians` (positive is counter-clockwise).
    pub fn turn(&mut self, radians: f32) {
        if radians.is_finite() {
            self.heading = (self.heading + radians).rem_euclid(TAU);
        }
    }

    /// Remove health, never below zero.
    pub fn take_damage(&mut self, amount: f32) {
        self.health = (self.health - amount.max(0.0)).clamp(0.0, MAX_VITAL);
    }

    /// Give back sanity, never above the maximum.
    pub fn restore_sanity(&mut self, amount: f32) {
        self.sanity = (self.sanity + amount.max(0.0)).clamp(0.0, MAX_VITAL);
    }

    /// Whether the player still has health left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

impl Default for PlayerComponent {
    fn default() -> Self {
        Self::new(SPAWN_POINT)
    }
}

impl PlayerState for PlayerComponent {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn sanity(&self) -> f32 {
        self.sanity
    }

    fn health(&self) -> f32 {
        self.health
    }

    fn reduce_sanity(&mut self, amount: f32) {
        if amount.is_finite() {
            self.sanity = (self.sanity - amount.max(0.0)).clamp(0.0, MAX_VITAL);
        }
    }
}
