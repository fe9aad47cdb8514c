//! Seams to the host game.
//!
//! The director reads the player through [`PlayerState`] and changes the
//! world only through [`WorldEffects`]. Terrain, rendering, audio and
//! collision all live on the far side of these two traits.

use crate::types::{EntityId, Vec2};

/// Maximum value for player health and sanity.
pub const MAX_VITAL: f32 = 100.0;

/// Live player state.
pub trait PlayerState {
    /// Current world position.
    fn position(&self) -> Vec2;

    /// Current sanity in `[0, 100]`.
    fn sanity(&self) -> f32;

    /// Current health in `[0, 100]`.
    fn health(&self) -> f32;

    /// Remove sanity. Implementations clamp at zero.
    fn reduce_sanity(&mut self, amount: f32);
}

/// Effects the director can apply to the world.
pub trait WorldEffects {
    /// Spawn a creature of the given kind and return its handle.
    fn spawn_creature(&mut self, kind: &str, position: Vec2) -> EntityId;

    /// Raise the corruption level of the area around `position`.
    fn modify_environment(&mut self, position: Vec2, intensity: f32);
}
