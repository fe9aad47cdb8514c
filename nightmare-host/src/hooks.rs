//! Integration hooks for the host engine.
//!
//! The `on_*` functions turn engine callbacks (movement, combat, sanity,
//! interaction, scripted scares) into [`GameplayEvent`]s. [`DirectorHooks`]
//! wraps an [`EventSender`] so engine systems on any thread can forward them
//! to the director without touching the session.

use nightmare_core::events::{DamageSource, EventSender, GameplayEvent};
use nightmare_core::types::{ActionKind, GameTimestamp, ScareKind, Vec2};
use tracing::trace;

use crate::components::PlayerComponent;

/// Create a movement event from the engine's locomotion system.
#[must_use]
pub fn on_player_moved(
    old_position: Vec2,
    position: Vec2,
    speed: f32,
    timestamp: GameTimestamp,
) -> GameplayEvent {
    GameplayEvent::PlayerMoved {
        position,
        old_position,
        speed,
        timestamp,
    }
}

/// Create a damage event from the combat system.
#[must_use]
pub fn on_player_damaged(
    source: DamageSource,
    amount: f32,
    timestamp: GameTimestamp,
) -> GameplayEvent {
    GameplayEvent::PlayerDamaged {
        source,
        amount,
        timestamp,
    }
}

/// Create a sanity event, e.g. from standing in darkness or seeing a creature.
#[must_use]
pub fn on_sanity_changed(
    old_value: f32,
    new_value: f32,
    cause: Option<DamageSource>,
    timestamp: GameTimestamp,
) -> GameplayEvent {
    GameplayEvent::PlayerSanityChanged {
        old_value,
        new_value,
        cause,
        timestamp,
    }
}

/// Create an interaction event from the use/pick-up system.
#[must_use]
pub fn on_interact(target: impl Into<String>, timestamp: GameTimestamp) -> GameplayEvent {
    GameplayEvent::PlayerInteracted {
        target: target.into(),
        timestamp,
    }
}

/// Create a scare event for scripted (non-director) scares.
#[must_use]
pub fn on_scripted_scare(
    scare_kind: ScareKind,
    intensity: Option<f32>,
    timestamp: GameTimestamp,
) -> GameplayEvent {
    GameplayEvent::ScareTriggered {
        scare_kind,
        intensity,
        timestamp,
    }
}

/// Create a classified action event (hide, attack, investigate, retreat...)
/// at the player's current position and facing.
#[must_use]
pub fn on_player_action(
    kind: ActionKind,
    player: &PlayerComponent,
    timestamp: GameTimestamp,
) -> GameplayEvent {
    GameplayEvent::PlayerAction {
        kind,
        position: player.position,
        direction: player.facing(),
        timestamp,
    }
}

// ---------------------------------------------------------------------------
// Sender wrapper
// ---------------------------------------------------------------------------

/// Forwards hook events to a director session.
#[derive(Debug, Clone)]
pub struct DirectorHooks {
    sender: EventSender,
    sent: u64,
    dropped: u64,
}

impl DirectorHooks {
    /// Wrap a session's sender.
    #[must_use]
    pub fn new(sender: EventSender) -> Self {
        Self {
            sender,
            sent: 0,
            dropped: 0,
        }
    }

    /// Forward one event. Returns `false` if the queue was full.
    pub fn emit(&mut self, event: GameplayEvent) -> bool {
        let kind = event.kind_name();
        if self.sender.send(event) {
            self.sent += 1;
            true
        } else {
            self.dropped += 1;
            trace!(kind, "Director queue full, hook event dropped");
            false
        }
    }

    /// Report a player step computed by the engine.
    pub fn player_moved(
        &mut self,
        old_position: Vec2,
        position: Vec2,
        speed: f32,
        timestamp: GameTimestamp,
    ) -> bool {
        self.emit(on_player_moved(old_position, position, speed, timestamp))
    }

    /// Report a sanity change. Gains are forwarded too; the observer ignores them.
    pub fn sanity_changed(
        &mut self,
        old_value: f32,
        new_value: f32,
        cause: Option<DamageSource>,
        timestamp: GameTimestamp,
    ) -> bool {
        self.emit(on_sanity_changed(old_value, new_value, cause, timestamp))
    }

    /// Report an interaction.
    pub fn interact(&mut self, target: &str, timestamp: GameTimestamp) -> bool {
        self.emit(on_interact(target, timestamp))
    }

    /// Report a classified action.
    pub fn action(
        &mut self,
        kind: ActionKind,
        player: &PlayerComponent,
        timestamp: GameTimestamp,
    ) -> bool {
        self.emit(on_player_action(kind, player, timestamp))
    }

    /// Events accepted by the queue.
    #[must_use]
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Events refused by a full queue.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
