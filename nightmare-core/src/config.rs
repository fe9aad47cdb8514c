//! Configuration for the horror director.
//!
//! Maps directly to `nightmare.toml`. Every field has a default, so an empty
//! file (or no file) yields the stock tuning.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level director configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NightmareConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Event ingestion and history limits.
    #[serde(default)]
    pub observer: ObserverConfig,
    /// Movement analytics.
    #[serde(default)]
    pub spatial: SpatialConfig,
    /// Behavior analyzer tuning.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    /// Scare decision tuning.
    #[serde(default)]
    pub director: DirectorConfig,
    /// Telemetry & observability.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl NightmareConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `NightmareError::Config` if the TOML is invalid or a value is out of range.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| crate::NightmareError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Serialize back to TOML.
    ///
    /// # Errors
    /// Returns `NightmareError::Serialization` if encoding fails.
    pub fn to_toml(&self) -> crate::error::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::NightmareError::Serialization(e.to_string()))
    }

    /// Reject values that would break the runtime invariants.
    ///
    /// # Errors
    /// Returns `NightmareError::Config` naming the first offending field.
    pub fn validate(&self) -> crate::error::Result<()> {
        let bad = |field: &str, why: &str| {
            Err(crate::NightmareError::Config(format!("{field}: {why}")))
        };
        let o = &self.observer;
        if o.action_capacity == 0 || o.fear_capacity_per_kind == 0 {
            return bad("observer", "history capacities must be non-zero");
        }
        if !(o.analysis_interval_secs.is_finite() && o.analysis_interval_secs > 0.0) {
            return bad("observer.analysis_interval_secs", "must be positive");
        }
        if !positive(o.sanity_fear_scale) {
            return bad("observer.sanity_fear_scale", "must be positive");
        }
        let s = &self.spatial;
        if !positive(s.cell_size) || !positive(s.world_extent) || s.heatmap_resolution == 0 {
            return bad("spatial", "cell size, extent and resolution must be positive");
        }
        if !(0.0..=1.0).contains(&self.analyzer.fear_ema_retain) {
            return bad("analyzer.fear_ema_retain", "must be within [0, 1]");
        }
        let d = &self.director;
        for (field, value) in [
            ("director.initial_mood", d.initial_mood),
            ("director.initial_tension", d.initial_tension),
            ("director.mood_smoothing", d.mood_smoothing),
            ("director.effectiveness_smoothing", d.effectiveness_smoothing),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return bad(field, "must be within [0, 1]");
            }
        }
        if d.spawn_radius_min > d.spawn_radius_max || d.spawn_radius_min < 0.0 {
            return bad("director.spawn_radius_min", "must be non-negative and <= spawn_radius_max");
        }
        if d.short_gap_secs > d.long_gap_secs {
            return bad("director.short_gap_secs", "must not exceed long_gap_secs");
        }
        if !positive(d.effectiveness_sanity_scale) {
            return bad("director.effectiveness_sanity_scale", "must be positive");
        }
        if d.scare_history_capacity == 0 {
            return bad("director.scare_history_capacity", "must be non-zero");
        }
        Ok(())
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Whether the director is enabled. A disabled session still ingests
    /// events but never fires scares.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Fixed RNG seed for reproducible runs. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: "info".to_string(),
            seed: None,
        }
    }
}

/// Event ingestion and rolling-history configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserverConfig {
    /// Maximum retained action records.
    #[serde(default = "default_1000")]
    pub action_capacity: usize,
    /// Maximum retained fear responses per fear kind.
    #[serde(default = "default_20_usize")]
    pub fear_capacity_per_kind: usize,
    /// Seconds of simulation time between analysis cycles.
    #[serde(default = "default_5_0_f64")]
    pub analysis_interval_secs: f64,
    /// Minimum action records before the reactor profile is recomputed.
    #[serde(default = "default_10")]
    pub min_actions_for_reactor: usize,
    /// Movement speed above which a move is classified as a run.
    #[serde(default = "default_1_5")]
    pub run_speed_threshold: f32,
    /// Sanity drop that maps to a full-strength fear response.
    #[serde(default = "default_20_0")]
    pub sanity_fear_scale: f32,
    /// Time-since-last-scare at session start, in seconds.
    #[serde(default = "default_60_0")]
    pub initial_time_since_scare_secs: f64,
    /// Queue bound; events beyond it are dropped.
    #[serde(default = "default_4096")]
    pub max_pending_events: usize,
}

impl ObserverConfig {
    /// Analysis interval as a [`Duration`].
    #[must_use]
    pub fn analysis_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.analysis_interval_secs).unwrap_or(Duration::from_secs(5))
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            action_capacity: 1000,
            fear_capacity_per_kind: 20,
            analysis_interval_secs: 5.0,
            min_actions_for_reactor: 10,
            run_speed_threshold: 1.5,
            sanity_fear_scale: 20.0,
            initial_time_since_scare_secs: 60.0,
            max_pending_events: 4096,
        }
    }
}

/// Movement analytics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpatialConfig {
    /// Maximum retained position samples.
    #[serde(default = "default_1000")]
    pub position_capacity: usize,
    /// Edge length of a visit-counting grid cell.
    #[serde(default = "default_5_0")]
    pub cell_size: f32,
    /// Turn angle (degrees) above which a direction change is counted.
    #[serde(default = "default_45_0")]
    pub turn_threshold_degrees: f32,
    /// How many preferred areas to report.
    #[serde(default = "default_5_usize")]
    pub preferred_area_count: usize,
    /// Heatmap side length in cells.
    #[serde(default = "default_50")]
    pub heatmap_resolution: usize,
    /// World side length covered by the heatmap.
    #[serde(default = "default_256_0")]
    pub world_extent: f32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            position_capacity: 1000,
            cell_size: 5.0,
            turn_threshold_degrees: 45.0,
            preferred_area_count: 5,
            heatmap_resolution: 50,
            world_extent: 256.0,
        }
    }
}

/// Behavior analyzer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Weight kept from the previous fear-profile value on each update.
    #[serde(default = "default_0_7")]
    pub fear_ema_retain: f32,
    /// Starting value for every fear and reactor score.
    #[serde(default = "default_0_5")]
    pub neutral_prior: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fear_ema_retain: 0.7,
            neutral_prior: 0.5,
        }
    }
}

/// How the director's mood evolves between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodRule {
    /// Mood never changes.
    #[default]
    Fixed,
    /// Mood drifts toward the mean recorded scare effectiveness.
    TrackEffectiveness,
    /// Mood drifts toward the intensity of recently fired scares.
    TrackIntensity,
}

/// Scare decision configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorConfig {
    /// Starting mood (scales scare intensity).
    #[serde(default = "default_0_3")]
    pub initial_mood: f32,
    /// Starting tension.
    #[serde(default = "default_0_1")]
    pub initial_tension: f32,
    /// Tension added every tick.
    #[serde(default = "default_0_01")]
    pub tension_increment: f32,
    /// Tension multiplier in the fire chance.
    #[serde(default = "default_0_1")]
    pub base_chance_factor: f32,
    /// Bonus chance before any scare has fired.
    #[serde(default = "default_0_3")]
    pub first_scare_bonus: f32,
    /// Gap (seconds) after which the short-gap bonus applies.
    #[serde(default = "default_30_0")]
    pub short_gap_secs: f64,
    /// Bonus chance once the short gap has elapsed.
    #[serde(default = "default_0_1")]
    pub short_gap_bonus: f32,
    /// Gap (seconds) after which the long-gap bonus also applies.
    #[serde(default = "default_60_0")]
    pub long_gap_secs: f64,
    /// Additional bonus chance once the long gap has elapsed.
    #[serde(default = "default_0_2")]
    pub long_gap_bonus: f32,
    /// Minimum creature spawn distance from the player.
    #[serde(default = "default_10_0")]
    pub spawn_radius_min: f32,
    /// Maximum creature spawn distance from the player.
    #[serde(default = "default_30_0_f32")]
    pub spawn_radius_max: f32,
    /// Sanity removed per unit of scare intensity.
    #[serde(default = "default_5_0")]
    pub sanity_cost_factor: f32,
    /// Reactivity below which intensity is boosted.
    #[serde(default = "default_0_3")]
    pub low_reactivity_threshold: f32,
    /// Intensity multiplier for unreactive players.
    #[serde(default = "default_1_5")]
    pub low_reactivity_boost: f32,
    /// Number of recommendations kept per cycle.
    #[serde(default = "default_3_usize")]
    pub max_recommendations: usize,
    /// Mood evolution rule.
    #[serde(default)]
    pub mood_rule: MoodRule,
    /// Step size when mood tracks a target.
    #[serde(default = "default_0_2")]
    pub mood_smoothing: f32,
    /// Weight of a new effectiveness sample.
    #[serde(default = "default_0_3")]
    pub effectiveness_smoothing: f32,
    /// Sanity drop that counts as a fully effective scare.
    #[serde(default = "default_20_0")]
    pub effectiveness_sanity_scale: f32,
    /// Fired scares kept in the director's log. Older entries are evicted
    /// and counted; the total fired count is unaffected.
    #[serde(default = "default_100")]
    pub scare_history_capacity: usize,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            initial_mood: 0.3,
            initial_tension: 0.1,
            tension_increment: 0.01,
            base_chance_factor: 0.1,
            first_scare_bonus: 0.3,
            short_gap_secs: 30.0,
            short_gap_bonus: 0.1,
            long_gap_secs: 60.0,
            long_gap_bonus: 0.2,
            spawn_radius_min: 10.0,
            spawn_radius_max: 30.0,
            sanity_cost_factor: 5.0,
            low_reactivity_threshold: 0.3,
            low_reactivity_boost: 1.5,
            max_recommendations: 3,
            mood_rule: MoodRule::Fixed,
            mood_smoothing: 0.2,
            effectiveness_smoothing: 0.3,
            effectiveness_sanity_scale: 20.0,
            scare_history_capacity: 100,
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Analysis cycles slower than this (milliseconds) are logged at `warn`.
    #[serde(default = "default_2_0")]
    pub log_slow_cycles_ms: f32,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_slow_cycles_ms: 2.0,
        }
    }
}

// Default value functions for serde
fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_0_01() -> f32 { 0.01 }
fn default_0_1() -> f32 { 0.1 }
fn default_0_2() -> f32 { 0.2 }
fn default_0_3() -> f32 { 0.3 }
fn default_0_5() -> f32 { 0.5 }
fn default_0_7() -> f32 { 0.7 }
fn default_1_5() -> f32 { 1.5 }
fn default_2_0() -> f32 { 2.0 }
fn default_5_0() -> f32 { 5.0 }
fn default_10_0() -> f32 { 10.0 }
fn default_20_0() -> f32 { 20.0 }
fn default_30_0_f32() -> f32 { 30.0 }
fn default_45_0() -> f32 { 45.0 }
fn default_256_0() -> f32 { 256.0 }
fn default_5_0_f64() -> f64 { 5.0 }
fn default_30_0() -> f64 { 30.0 }
fn default_60_0() -> f64 { 60.0 }
fn default_3_usize() -> usize { 3 }
fn default_5_usize() -> usize { 5 }
fn default_10() -> usize { 10 }
fn default_20_usize() -> usize { 20 }
fn default_50() -> usize { 50 }
fn default_100() -> usize { 100 }
fn default_1000() -> usize { 1000 }
fn default_4096() -> usize { 4096 }
