//! Gameplay telemetry consumed by the observer.
//!
//! Producers (input handlers, combat, sanity effects, other scare sources)
//! push [`GameplayEvent`]s through a cloneable [`EventSender`]. The session
//! owns the [`EventQueue`] and drains it exactly once per tick, before any
//! profile work, so a drained batch is applied as a unit.

use crate::error::{NightmareError, Result};
use crate::types::{ActionKind, GameTimestamp, ScareKind, Vec2};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What hurt the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DamageSource {
    /// A creature, identified by its kind name.
    Creature {
        /// Creature kind, e.g. `"wendigo"`.
        kind: String,
    },
    /// Falls, hazards, traps.
    Environment,
    /// Source not reported.
    Unknown,
}

impl DamageSource {
    /// Short label for logs and action context.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Creature { kind } => kind,
            Self::Environment => "environment",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this is a creature attack.
    #[must_use]
    pub fn is_creature(&self) -> bool {
        matches!(self, Self::Creature { .. })
    }
}

/// A gameplay event the observer can ingest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameplayEvent {
    /// The player moved.
    PlayerMoved {
        /// New position.
        position: Vec2,
        /// Position before the move.
        old_position: Vec2,
        /// Reported movement speed.
        speed: f32,
        /// When it happened.
        timestamp: GameTimestamp,
    },

    /// The player took damage.
    PlayerDamaged {
        /// What dealt the damage.
        source: DamageSource,
        /// Health removed (non-negative).
        amount: f32,
        /// When it happened.
        timestamp: GameTimestamp,
    },

    /// The player's sanity changed.
    PlayerSanityChanged {
        /// Sanity before the change.
        old_value: f32,
        /// Sanity after the change.
        new_value: f32,
        /// What caused the change, when known.
        cause: Option<DamageSource>,
        /// When it happened.
        timestamp: GameTimestamp,
    },

    /// The player used an object.
    PlayerInteracted {
        /// Name of the object (non-empty).
        target: String,
        /// When it happened.
        timestamp: GameTimestamp,
    },

    /// A scare fired, from the director or from scripted content.
    ScareTriggered {
        /// Scare kind.
        scare_kind: ScareKind,
        /// Scare intensity in `[0, 1]`; `None` means 0.5.
        intensity: Option<f32>,
        /// When it happened.
        timestamp: GameTimestamp,
    },

    /// A classified player action reported directly by the host
    /// (hiding, attacking, investigating, retreating, ...).
    PlayerAction {
        /// Action kind.
        kind: ActionKind,
        /// Where the player was.
        position: Vec2,
        /// Facing or movement direction.
        direction: Vec2,
        /// When it happened.
        timestamp: GameTimestamp,
    },
}

impl GameplayEvent {
    /// Get the timestamp of this event.
    #[must_use]
    pub fn timestamp(&self) -> &GameTimestamp {
        match self {
            Self::PlayerMoved { timestamp, .. }
            | Self::PlayerDamaged { timestamp, .. }
            | Self::PlayerSanityChanged { timestamp, .. }
            | Self::PlayerInteracted { timestamp, .. }
            | Self::ScareTriggered { timestamp, .. }
            | Self::PlayerAction { timestamp, .. } => timestamp,
        }
    }

    /// Stable kind name for logs.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::PlayerMoved { .. } => "player_moved",
            Self::PlayerDamaged { .. } => "player_damaged",
            Self::PlayerSanityChanged { .. } => "player_sanity_changed",
            Self::PlayerInteracted { .. } => "player_interacted",
            Self::ScareTriggered { .. } => "scare_triggered",
            Self::PlayerAction { .. } => "player_action",
        }
    }

    /// Check the payload before ingestion.
    ///
    /// # Errors
    /// Returns [`NightmareError::InvalidEvent`] for non-finite numbers,
    /// negative amounts or speeds, empty targets and out-of-range intensity.
    pub fn validate(&self) -> Result<()> {
        let kind = self.kind_name();
        let reject = |reason: &str| Err(NightmareError::invalid_event(kind, reason));
        match self {
            Self::PlayerMoved {
                position,
                old_position,
                speed,
                ..
            } => {
                if !position.is_finite() || !old_position.is_finite() {
                    return reject("non-finite position");
                }
                if !speed.is_finite() || *speed < 0.0 {
                    return reject("speed must be finite and non-negative");
                }
            }
            Self::PlayerDamaged { amount, .. } => {
                if !amount.is_finite() || *amount < 0.0 {
                    return reject("damage must be finite and non-negative");
                }
            }
            Self::PlayerSanityChanged {
                old_value,
                new_value,
                ..
            } => {
                if !old_value.is_finite() || !new_value.is_finite() {
                    return reject("non-finite sanity value");
                }
            }
            Self::PlayerInteracted { target, .. } => {
                if target.trim().is_empty() {
                    return reject("empty interaction target");
                }
            }
            Self::ScareTriggered { intensity, .. } => {
                if let Some(i) = intensity {
                    if !i.is_finite() || !(0.0..=1.0).contains(i) {
                        return reject("intensity outside [0, 1]");
                    }
                }
            }
            Self::PlayerAction {
                position,
                direction,
                ..
            } => {
                if !position.is_finite() || !direction.is_finite() {
                    return reject("non-finite position or direction");
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Event Queue
// ---------------------------------------------------------------------------

/// Multi-producer / single-consumer event queue.
///
/// The session holds the queue; producers hold [`EventSender`] clones.
pub struct EventQueue {
    inner: Arc<Mutex<QueueInner>>,
}

struct QueueInner {
    pending: Vec<GameplayEvent>,
    max_pending: usize,
    total_enqueued: u64,
    total_dropped: u64,
    dropped_since_drain: u64,
}

/// Statistics about the event queue.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct QueueStats {
    /// Events currently waiting.
    pub depth: usize,
    /// Total events accepted.
    pub total_enqueued: u64,
    /// Total events dropped because the queue was full.
    pub total_dropped: u64,
}

/// One tick's worth of events.
#[derive(Debug, Default)]
pub struct DrainedBatch {
    /// Events in arrival order.
    pub events: Vec<GameplayEvent>,
    /// Events dropped for capacity since the previous drain.
    pub dropped: u64,
}

impl EventQueue {
    /// Create a queue holding at most `max_pending` undrained events.
    #[must_use]
    pub fn new(max_pending: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(QueueInner {
                pending: Vec::new(),
                max_pending: max_pending.max(1),
                total_enqueued: 0,
                total_dropped: 0,
                dropped_since_drain: 0,
            })),
        }
    }

    /// A producer handle for this queue.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Take every pending event, in arrival order.
    pub fn drain(&self) -> DrainedBatch {
        let mut inner = self.inner.lock();
        let dropped = std::mem::take(&mut inner.dropped_since_drain);
        DrainedBatch {
            events: std::mem::take(&mut inner.pending),
            dropped,
        }
    }

    /// Current queue depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().pending.is_empty()
    }

    /// Get queue statistics.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        let inner = self.inner.lock();
        QueueStats {
            depth: inner.pending.len(),
            total_enqueued: inner.total_enqueued,
            total_dropped: inner.total_dropped,
        }
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue").field("stats", &self.stats()).finish()
    }
}

/// Cloneable producer handle.
#[derive(Clone)]
pub struct EventSender {
    inner: Arc<Mutex<QueueInner>>,
}

impl EventSender {
    /// Enqueue an event. Returns `false` if the queue was full and the
    /// event was dropped.
    pub fn send(&self, event: GameplayEvent) -> bool {
        let mut inner = self.inner.lock();
        if inner.pending.len() >= inner.max_pending {
            inner.total_dropped += 1;
            inner.dropped_since_drain += 1;
            return false;
        }
        inner.total_enqueued += 1;
        inner.pending.push(event);
        true
    }
}

impl std::fmt::Debug for EventSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSender").finish_non_exhaustive()
    }
}
