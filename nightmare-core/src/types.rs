//! Core type definitions for the horror director.
//!
//! Every classification enum carries an explicit ordinal (`index()`) and an
//! `ALL` table in declaration order. Profiles are stored as fixed arrays
//! indexed by that ordinal, so iteration order (and therefore every
//! "dominant" tie-break) is deterministic: the lowest ordinal wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Handle for an entity created by the world collaborator (e.g. a spawned creature).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a fired scare event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScareId(pub Uuid);

impl ScareId {
    /// Create a new random scare ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScareId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Spatial
// ---------------------------------------------------------------------------

/// A 2D position or direction in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Vec2 {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Vector of the given length pointing along `angle` (radians).
    #[must_use]
    pub fn from_polar(angle: f32, radius: f32) -> Self {
        Self::new(angle.cos() * radius, angle.sin() * radius)
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Heading in radians (`atan2(y, x)`).
    #[must_use]
    pub fn heading(self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Whether both components are finite numbers.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Simulation timestamp: frame tick plus accumulated simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameTimestamp {
    /// Simulation tick (monotonically increasing).
    pub tick: u64,
    /// Seconds of simulation time since the session started.
    pub sim_seconds: f64,
    /// Corresponding wall-clock time (for logs and debug overlays).
    pub real_time: DateTime<Utc>,
}

impl GameTimestamp {
    /// Create a timestamp stamped with the current wall-clock time.
    #[must_use]
    pub fn now(tick: u64, sim_seconds: f64) -> Self {
        Self {
            tick,
            sim_seconds,
            real_time: Utc::now(),
        }
    }

    /// Simulation seconds elapsed since `earlier` (never negative).
    #[must_use]
    pub fn seconds_since(&self, earlier: &Self) -> f64 {
        (self.sim_seconds - earlier.sim_seconds).max(0.0)
    }
}

impl Default for GameTimestamp {
    fn default() -> Self {
        Self::now(0, 0.0)
    }
}

/// Normalise a free-form enum name: lowercase, alphanumerics only.
fn squash(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ---------------------------------------------------------------------------
// Player Actions
// ---------------------------------------------------------------------------

/// What the player did, as classified from telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionKind {
    /// Walking.
    Move,
    /// Moving faster than the run threshold.
    Run,
    /// Taking cover or breaking line of sight.
    Hide,
    /// Using an object in the world.
    Interact,
    /// Attacking something.
    Attack,
    /// Examining something suspicious.
    Investigate,
    /// Backing away from a threat.
    Retreat,
    /// Stopping dead (also recorded on taking damage).
    Freeze,
}

impl ActionKind {
    /// Number of action kinds.
    pub const COUNT: usize = 8;

    /// Every action kind in ordinal order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Move,
        Self::Run,
        Self::Hide,
        Self::Interact,
        Self::Attack,
        Self::Investigate,
        Self::Retreat,
        Self::Freeze,
    ];

    /// Ordinal of this kind.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Move => "Move",
            Self::Run => "Run",
            Self::Hide => "Hide",
            Self::Interact => "Interact",
            Self::Attack => "Attack",
            Self::Investigate => "Investigate",
            Self::Retreat => "Retreat",
            Self::Freeze => "Freeze",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Fear Kinds
// ---------------------------------------------------------------------------

/// Category of fear a player can be susceptible to.
///
/// Deserializes leniently through [`FearKind::from_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum FearKind {
    /// Fear of the dark.
    Darkness,
    /// Fear of monsters.
    Creatures,
    /// Startle response to loud, unexpected sounds.
    SuddenNoises,
    /// Fear of being alone.
    Isolation,
    /// Fear of being pursued.
    Chasing,
    /// Fear of blood and bodies.
    Gore,
    /// Fear of tight spaces.
    Claustrophobia,
    /// Fear of exposed, open areas.
    OpenSpaces,
    /// Unclassified fear.
    Unknown,
}

impl FearKind {
    /// Number of fear kinds.
    pub const COUNT: usize = 9;

    /// Every fear kind in ordinal order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Darkness,
        Self::Creatures,
        Self::SuddenNoises,
        Self::Isolation,
        Self::Chasing,
        Self::Gore,
        Self::Claustrophobia,
        Self::OpenSpaces,
        Self::Unknown,
    ];

    /// Ordinal of this kind.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Darkness => "Darkness",
            Self::Creatures => "Creatures",
            Self::SuddenNoises => "Sudden Noises",
            Self::Isolation => "Isolation",
            Self::Chasing => "Chasing",
            Self::Gore => "Gore",
            Self::Claustrophobia => "Claustrophobia",
            Self::OpenSpaces => "Open Spaces",
            Self::Unknown => "Unknown",
        }
    }

    /// Parse a fear name leniently (`"sudden_noises"`, `"Sudden Noises"`, ...).
    ///
    /// Unrecognised names map to [`FearKind::Unknown`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let key = squash(name);
        Self::ALL
            .into_iter()
            .find(|kind| squash(kind.name()) == key)
            .unwrap_or(Self::Unknown)
    }

    /// The scare best suited to exploit this fear.
    ///
    /// `None` for [`FearKind::Unknown`]: the caller picks at random.
    #[must_use]
    pub fn preferred_scare(self) -> Option<ScareKind> {
        match self {
            Self::Darkness | Self::Claustrophobia => Some(ScareKind::EnvironmentChange),
            Self::Creatures | Self::Chasing | Self::OpenSpaces => {
                Some(ScareKind::CreatureAppearance)
            }
            Self::SuddenNoises => Some(ScareKind::SuddenNoise),
            Self::Isolation => Some(ScareKind::Whisper),
            Self::Gore => Some(ScareKind::Hallucination),
            Self::Unknown => None,
        }
    }
}

impl From<String> for FearKind {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl fmt::Display for FearKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Reactor Archetypes
// ---------------------------------------------------------------------------

/// Behavioural archetype derived from action frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReactorKind {
    /// Hides and retreats, rarely attacks.
    Cautious,
    /// Attacks and investigates, rarely hides.
    Bold,
    /// Runs and freezes.
    Panic,
    /// Investigates and interacts.
    Methodical,
    /// Runs and attacks without hiding.
    Reckless,
    /// Freezes and avoids interaction.
    Hesitant,
}

impl ReactorKind {
    /// Number of archetypes.
    pub const COUNT: usize = 6;

    /// Every archetype in ordinal order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Cautious,
        Self::Bold,
        Self::Panic,
        Self::Methodical,
        Self::Reckless,
        Self::Hesitant,
    ];

    /// Ordinal of this archetype.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Cautious => "Cautious",
            Self::Bold => "Bold",
            Self::Panic => "Panic",
            Self::Methodical => "Methodical",
            Self::Reckless => "Reckless",
            Self::Hesitant => "Hesitant",
        }
    }
}

impl fmt::Display for ReactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Scare Kinds
// ---------------------------------------------------------------------------

/// Kind of frightening event the director can inject.
///
/// Deserializes leniently through [`ScareKind::from_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum ScareKind {
    /// Low ambient drone or distant sound.
    AmbientSound,
    /// Loud, sudden noise.
    SuddenNoise,
    /// A creature appears near the player.
    CreatureAppearance,
    /// The surroundings become corrupted.
    EnvironmentChange,
    /// Visual hallucination.
    Hallucination,
    /// Whispering voices.
    Whisper,
}

impl ScareKind {
    /// Number of scare kinds.
    pub const COUNT: usize = 6;

    /// Every scare kind in ordinal order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::AmbientSound,
        Self::SuddenNoise,
        Self::CreatureAppearance,
        Self::EnvironmentChange,
        Self::Hallucination,
        Self::Whisper,
    ];

    /// Ordinal of this kind.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::AmbientSound => "Ambient Sound",
            Self::SuddenNoise => "Sudden Noise",
            Self::CreatureAppearance => "Creature Appearance",
            Self::EnvironmentChange => "Environment Change",
            Self::Hallucination => "Hallucination",
            Self::Whisper => "Whisper",
        }
    }

    /// Parse a scare name leniently. Unrecognised names map to
    /// [`ScareKind::AmbientSound`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let key = squash(name);
        Self::ALL
            .into_iter()
            .find(|kind| squash(kind.name()) == key)
            .unwrap_or(Self::AmbientSound)
    }

    /// The fear a player reveals by reacting to this scare.
    #[must_use]
    pub fn fear_target(self) -> FearKind {
        match self {
            Self::AmbientSound | Self::Hallucination | Self::Whisper => FearKind::Isolation,
            Self::SuddenNoise => FearKind::SuddenNoises,
            Self::CreatureAppearance => FearKind::Creatures,
            Self::EnvironmentChange => FearKind::Unknown,
        }
    }
}

impl From<String> for ScareKind {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl fmt::Display for ScareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
