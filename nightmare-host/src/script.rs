//! Scripted synthetic player for headless runs.
//!
//! Wanders the world, flees or hides from nearby creatures, loses sanity
//! to creatures and corruption, and pokes at objects now and then. Every
//! step is reported through [`DirectorHooks`].

use std::f32::consts::PI;

use nightmare_core::events::DamageSource;
use nightmare_core::types::{ActionKind, GameTimestamp, Vec2};
use nightmare_core::world::PlayerState;
use rand::prelude::*;

use crate::components::{MOVE_SPEED, PlayerComponent};
use crate::hooks::DirectorHooks;
use crate::world::CorruptionWorld;

/// Creatures closer than this frighten the player.
pub const FRIGHT_RADIUS: f32 = 20.0;

/// Objects the player may interact with.
const TARGETS: [&str; 5] = ["door", "lantern", "note", "cabinet", "radio"];

/// Distance kept from the world edge.
const EDGE_MARGIN: f32 = 5.0;

/// Drives a [`PlayerComponent`] with a seeded behaviour script.
#[derive(Debug)]
pub struct ScriptedPlayer {
    rng: StdRng,
    hooks: DirectorHooks,
}

impl ScriptedPlayer {
    /// A script with its own seed, reporting through `hooks`.
    #[must_use]
    pub fn new(seed: u64, hooks: DirectorHooks) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            hooks,
        }
    }

    /// Advance the script by one frame.
    pub fn step(&mut self, player: &mut PlayerComponent, world: &CorruptionWorld, now: GameTimestamp) {
        let threat = world
            .nearest_creature(player.position)
            .filter(|(_, d)| *d < FRIGHT_RADIUS)
            .map(|(c, d)| (c.kind.clone(), c.position, d));

        match threat {
            Some((kind, at, distance)) => {
                let loss = (FRIGHT_RADIUS - distance) / FRIGHT_RADIUS * 2.0;
                self.lose_sanity(player, loss, DamageSource::Creature { kind }, now);
                if self.rng.gen_bool(0.5) {
                    self.hooks.action(ActionKind::Hide, player, now);
                } else {
                    player.heading = (player.position - at).heading();
                    self.hooks.action(ActionKind::Retreat, player, now);
                    self.walk(player, world, MOVE_SPEED * 2.0, 2.5, now);
                }
            }
            None => {
                let turn = if self.rng.gen_bool(0.1) {
                    self.rng.gen_range(-PI..PI)
                } else {
                    self.rng.gen_range(-0.3..0.3)
                };
                player.turn(turn);
                self.walk(player, world, MOVE_SPEED * 0.5, 1.0, now);

                let roll: f32 = self.rng.r#gen();
                if roll < 0.03 {
                    if let Some(target) = TARGETS.choose(&mut self.rng) {
                        self.hooks.interact(target, now);
                    }
                } else if roll < 0.05 {
                    self.hooks.action(ActionKind::Investigate, player, now);
                }
            }
        }

        let corruption = world.corruption_under(player.position).unwrap_or(0.0);
        if corruption > 0.3 {
            self.lose_sanity(player, corruption, DamageSource::Environment, now);
        }
    }

    fn walk(
        &mut self,
        player: &mut PlayerComponent,
        world: &CorruptionWorld,
        distance: f32,
        speed: f32,
        now: GameTimestamp,
    ) {
        let ahead = player.position + player.facing() * distance;
        let max_x = world.width() as f32 - EDGE_MARGIN;
        let max_y = world.height() as f32 - EDGE_MARGIN;
        if ahead.x < EDGE_MARGIN || ahead.y < EDGE_MARGIN || ahead.x > max_x || ahead.y > max_y {
            player.turn(PI);
        }
        let (old, new) = player.step_forward(distance);
        self.hooks.player_moved(old, new, speed, now);
    }

    fn lose_sanity(
        &mut self,
        player: &mut PlayerComponent,
        amount: f32,
        cause: DamageSource,
        now: GameTimestamp,
    ) {
        let before = player.sanity();
        player.reduce_sanity(amount);
        let after = player.sanity();
        if after < before {
            self.hooks.sanity_changed(before, after, Some(cause), now);
        }
    }

    /// The hooks this script reports through.
    #[must_use]
    pub fn hooks(&self) -> &DirectorHooks {
        &self.hooks
    }
}

/// Where a fresh scripted run places the player.
#[must_use]
pub fn spawn_point(world: &CorruptionWorld) -> Vec2 {
    Vec2::new(world.width() as f32 / 2.0, world.height() as f32 / 2.0)
}
