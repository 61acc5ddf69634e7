//! Configuration loading and typed config structures for Furrow.
//!
//! Two YAML documents drive the system:
//!
//! - `farming.yaml` ([`FarmingConfig`]) -- auto-refarm and growth policy,
//!   per-crop XP and unlock tables, logging, and storage settings.
//! - `levels.yaml` ([`LevelsConfig`]) -- the XP curve model and its
//!   parameters.
//!
//! Parsing is strict about YAML syntax but lenient about values: numbers
//! outside their valid range are clamped and unknown names fall back to a
//! safe default, each with a warning. Nothing here is fatal once the
//! document has parsed.

use std::collections::BTreeMap;
use std::path::Path;

use furrow_progression::{ExponentialParams, LevelCurve, LinearParams};
use furrow_types::{BlockKind, CurveModel, GrowthPolicy};
use furrow_world::CropCatalog;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

// ---------------------------------------------------------------------------
// farming.yaml
// ---------------------------------------------------------------------------

/// Top-level farming configuration.
///
/// Mirrors the structure of `farming.yaml`. Every field has a default, so
/// an empty document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FarmingConfig {
    /// Automatic replanting after harvest.
    #[serde(default)]
    pub auto_refarm: AutoRefarmConfig,

    /// Crop growth policy.
    #[serde(default)]
    pub growth: GrowthConfig,

    /// XP awarded per harvested crop, keyed by block name.
    #[serde(default)]
    pub crop_xp: BTreeMap<String, i64>,

    /// Farming level required to plant, keyed by block name.
    #[serde(default)]
    pub unlock_levels: BTreeMap<String, i64>,

    /// Suffix identifying harvesting tools (`"_hoe"` matches `iron_hoe`).
    #[serde(default = "default_harvest_tool_suffix")]
    pub harvest_tool_suffix: String,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Profile persistence configuration.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for FarmingConfig {
    fn default() -> Self {
        Self {
            auto_refarm: AutoRefarmConfig::default(),
            growth: GrowthConfig::default(),
            crop_xp: BTreeMap::new(),
            unlock_levels: BTreeMap::new(),
            harvest_tool_suffix: default_harvest_tool_suffix(),
            logging: LoggingConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl FarmingConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Build the crop catalog from the XP and unlock tables.
    ///
    /// Keys are normalised to lower case. Empty keys are skipped and
    /// negative values are clamped to 0, each with a warning.
    pub fn crop_catalog(&self) -> CropCatalog {
        CropCatalog::from_tables(
            crop_table(&self.crop_xp, "crop_xp"),
            crop_table(&self.unlock_levels, "unlock_levels"),
        )
    }

    /// The configured growth policy; unknown names fall back to vanilla.
    pub fn growth_policy(&self) -> GrowthPolicy {
        GrowthPolicy::parse(&self.growth.mode).unwrap_or_else(|| {
            warn!(mode = %self.growth.mode, "Unknown growth mode, using vanilla");
            GrowthPolicy::Vanilla
        })
    }

    /// Ticks between a harvest and its replant (at least 1).
    pub fn replant_delay_ticks(&self) -> u64 {
        self.auto_refarm.delay_ticks.max(1)
    }

    /// Ticks between planting and forced maturity (at least 1).
    pub fn fixed_grow_ticks(&self) -> u64 {
        self.growth.fixed_grow_ticks.max(1)
    }
}

/// Automatic replanting settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AutoRefarmConfig {
    /// Whether mature harvests are replanted at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Delay between harvest and replant, in ticks.
    #[serde(default = "default_delay_ticks")]
    pub delay_ticks: u64,

    /// Skip replanting when the harvest was done with a harvesting tool.
    #[serde(default = "default_true")]
    pub only_when_not_using_hoe: bool,
}

impl Default for AutoRefarmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ticks: default_delay_ticks(),
            only_when_not_using_hoe: true,
        }
    }
}

/// Crop growth settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GrowthConfig {
    /// `vanilla` (host grows crops) or `fixed` (force-mature after a delay).
    #[serde(default = "default_growth_mode")]
    pub mode: String,

    /// Delay before a crop planted under the fixed policy is matured.
    #[serde(default = "default_fixed_grow_ticks")]
    pub fixed_grow_ticks: u64,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            mode: default_growth_mode(),
            fixed_grow_ticks: default_fixed_grow_ticks(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Profile persistence configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Path of the player profile file.
    #[serde(default = "default_players_file")]
    pub players_file: String,

    /// Ticks between periodic saves (0 disables autosave).
    #[serde(default = "default_autosave_interval_ticks")]
    pub autosave_interval_ticks: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            players_file: default_players_file(),
            autosave_interval_ticks: default_autosave_interval_ticks(),
        }
    }
}

// ---------------------------------------------------------------------------
// levels.yaml
// ---------------------------------------------------------------------------

/// XP curve configuration.
///
/// Mirrors the structure of `levels.yaml`. Only the section matching
/// `growth_mode` is used; the others are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LevelsConfig {
    /// `linear`, `exponential`, or `custom` (case-insensitive).
    #[serde(default = "default_curve_mode")]
    pub growth_mode: String,

    /// Cost of every level outside the precomputed or custom range.
    #[serde(default = "default_per_level")]
    pub default_per_level: i64,

    /// Linear model parameters.
    #[serde(default)]
    pub linear: LinearConfig,

    /// Exponential model parameters.
    #[serde(default)]
    pub exponential: ExponentialConfig,

    /// Custom cost table keyed by level number.
    #[serde(default)]
    pub levels: BTreeMap<String, i64>,
}

impl Default for LevelsConfig {
    fn default() -> Self {
        Self {
            growth_mode: default_curve_mode(),
            default_per_level: default_per_level(),
            linear: LinearConfig::default(),
            exponential: ExponentialConfig::default(),
            levels: BTreeMap::new(),
        }
    }
}

impl LevelsConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Build the level curve described by this configuration.
    ///
    /// Bases are clamped to at least 1, increments and rounding steps to at
    /// least 0, and the multiplier to at least 1. `default_per_level` is
    /// clamped to at least 0, where 0 caps progression. Custom costs are
    /// floored at 1; keys that are not positive integers are skipped. An
    /// unknown model name yields a curve that charges `default_per_level`
    /// for every level.
    pub fn build_curve(&self) -> LevelCurve {
        let default_cost = clamp_u64(self.default_per_level, 0);
        match CurveModel::parse(&self.growth_mode) {
            Some(CurveModel::Linear) => LevelCurve::linear(
                LinearParams {
                    base: clamp_u64(self.linear.base, 1),
                    increment: clamp_u64(self.linear.increment, 0),
                    round_to: clamp_u64(self.linear.round_to, 0),
                },
                default_cost,
            ),
            Some(CurveModel::Exponential) => LevelCurve::exponential(
                ExponentialParams {
                    base: clamp_u64(self.exponential.base, 1),
                    multiplier: self.exponential.multiplier.max(Decimal::ONE),
                    round_to: clamp_u64(self.exponential.round_to, 0),
                },
                default_cost,
            ),
            Some(CurveModel::Custom) => LevelCurve::custom(self.custom_table(), default_cost),
            None => {
                warn!(
                    mode = %self.growth_mode,
                    default_cost,
                    "Unknown curve model, charging the default cost for every level"
                );
                LevelCurve::flat(default_cost)
            }
        }
    }

    fn custom_table(&self) -> BTreeMap<u32, u64> {
        let mut table = BTreeMap::new();
        for (key, &cost) in &self.levels {
            match key.trim().parse::<u32>() {
                Ok(level) if level > 0 => {
                    table.insert(level, clamp_u64(cost, 1));
                }
                _ => warn!(key = %key, "Skipping invalid level key in custom table"),
            }
        }
        table
    }
}

/// Linear curve parameters as written in YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LinearConfig {
    /// Cost of level 1.
    #[serde(default = "default_curve_base")]
    pub base: i64,

    /// Added cost per level.
    #[serde(default = "default_linear_increment")]
    pub increment: i64,

    /// Rounding step (0 disables).
    #[serde(default = "default_round_to")]
    pub round_to: i64,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            base: default_curve_base(),
            increment: default_linear_increment(),
            round_to: default_round_to(),
        }
    }
}

/// Exponential curve parameters as written in YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ExponentialConfig {
    /// Cost of level 1.
    #[serde(default = "default_curve_base")]
    pub base: i64,

    /// Growth factor per level.
    #[serde(default = "default_multiplier")]
    pub multiplier: Decimal,

    /// Rounding step (0 disables).
    #[serde(default = "default_round_to")]
    pub round_to: i64,
}

impl Default for ExponentialConfig {
    fn default() -> Self {
        Self {
            base: default_curve_base(),
            multiplier: default_multiplier(),
            round_to: default_round_to(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn clamp_u64(value: i64, floor: u64) -> u64 {
    u64::try_from(value).map_or(floor, |v| v.max(floor))
}

fn crop_table(raw: &BTreeMap<String, i64>, table: &str) -> BTreeMap<BlockKind, u32> {
    let mut out = BTreeMap::new();
    for (key, &value) in raw {
        let kind = BlockKind::new(key);
        if kind.as_str().is_empty() {
            warn!(table, "Skipping empty crop name");
            continue;
        }
        if value < 0 {
            warn!(table, crop = %kind, value, "Negative crop value clamped to 0");
        }
        let clamped = u32::try_from(value.max(0)).unwrap_or(u32::MAX);
        out.insert(kind, clamped);
    }
    out
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

const fn default_true() -> bool {
    true
}

const fn default_delay_ticks() -> u64 {
    100
}

fn default_growth_mode() -> String {
    "vanilla".to_owned()
}

const fn default_fixed_grow_ticks() -> u64 {
    1200
}

fn default_harvest_tool_suffix() -> String {
    "_hoe".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_players_file() -> String {
    "players.yaml".to_owned()
}

const fn default_autosave_interval_ticks() -> u64 {
    6000
}

fn default_curve_mode() -> String {
    "linear".to_owned()
}

const fn default_per_level() -> i64 {
    300
}

const fn default_curve_base() -> i64 {
    100
}

const fn default_linear_increment() -> i64 {
    50
}

const fn default_round_to() -> i64 {
    5
}

const fn default_multiplier() -> Decimal {
    Decimal::from_parts(115, 0, 0, false, 2)
}
