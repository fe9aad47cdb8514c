//! # nightmare-host — Host Integration for the Horror Director
//!
//! This crate connects the game-agnostic `nightmare-core` director to a
//! concrete game: a player component and a corruptible tile world that
//! implement the core seams, hooks that turn engine callbacks into
//! gameplay events, difficulty profiles, and the per-frame driver.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │                 Game loop                 │
//! │  ┌────────────────────────────────────┐  │
//! │  │          nightmare-host            │  │
//! │  │  ┌────────────┐  ┌──────────────┐  │  │
//! │  │  │   hooks    │  │   systems    │  │  │
//! │  │  └─────┬──────┘  └──────┬───────┘  │  │
//! │  │        │ EventSender    │ tick()   │  │
//! │  │        ▼                ▼          │  │
//! │  │   ┌─────────────────────────────┐  │  │
//! │  │   │       nightmare-core        │  │  │
//! │  │   └─────────────────────────────┘  │  │
//! │  │  ┌────────────┐  ┌──────────────┐  │  │
//! │  │  │ components │  │    world     │  │  │
//! │  │  └────────────┘  └──────────────┘  │  │
//! │  └────────────────────────────────────┘  │
//! └──────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `components` — the player (`PlayerState` seam)
//! - `world` — creature registry and corruption grid (`WorldEffects` seam)
//! - `hooks` — engine callbacks to `GameplayEvent`s
//! - `config` — difficulty profiles
//! - `systems` — frame driver and environment sampling
//! - `script` — scripted synthetic player for headless runs

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod components;
pub mod config;
pub mod hooks;
pub mod script;
pub mod systems;
pub mod world;
