//! # Nightmare Core
//!
//! Game-agnostic horror director. The crate watches what the player does,
//! builds a statistical picture of how they react to fear, and decides when
//! and how to frighten them next.
//!
//! The loop has four stages, leaves first:
//!
//! - **Observer** — gameplay events → bounded action and fear-response histories
//! - **Spatial** — position samples → speed, turns, explored area, repetition
//! - **Analyzer** — histories → reactor profile, fear profile, forecast, patterns
//! - **Director** — profiles + mood/tension → fire decision, scare event, recommendations
//!
//! [`HorrorSession`] wires the four together behind a single `tick()` call.
//!
//! ## Frame Contract
//!
//! Everything runs on the simulation thread:
//! - Event ingestion: once per tick, drained from an [`events::EventQueue`]
//! - Tension drift: once per tick
//! - Analysis cycle: at most once every 5 seconds of simulation time
//!
//! Nothing in the runtime path returns an error. Bad telemetry is dropped,
//! thin data keeps the previous profile, and an empty pool yields `None`.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod analyzer;
pub mod config;
pub mod director;
pub mod error;
pub mod events;
pub mod history;
pub mod metrics;
pub mod observer;
pub mod patterns;
pub mod profile;
pub mod session;
pub mod spatial;
pub mod types;
pub mod world;

pub use config::NightmareConfig;
pub use error::NightmareError;
pub use session::HorrorSession;
pub use types::*;
