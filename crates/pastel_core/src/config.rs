//! Runtime configuration for the board engine.
//!
//! # Responsibility
//! - Provide defaults for storage key, sweep cadence and placement viewport.
//! - Resolve overrides from process environment.
//!
//! # Invariants
//! - Blank or unparseable environment values fall back to defaults.
//! - `sweep_interval_ms` is always positive.

use std::path::PathBuf;

/// Storage key of the live persisted document.
pub const DEFAULT_STORAGE_KEY: &str = "pastel_sticky_v25_win";
/// Expiry sweep cadence.
pub const DEFAULT_SWEEP_INTERVAL_MS: i64 = 1_000;
const DEFAULT_DB_FILE_NAME: &str = "pastel_board.sqlite3";
const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;
const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;

pub const ENV_DB_PATH: &str = "PASTEL_DB_PATH";
pub const ENV_STORAGE_KEY: &str = "PASTEL_STORAGE_KEY";
pub const ENV_SWEEP_INTERVAL_MS: &str = "PASTEL_SWEEP_INTERVAL_MS";
pub const ENV_VIEWPORT: &str = "PASTEL_VIEWPORT";

/// Visible canvas size used for automatic note placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl Viewport {
    /// Returns `None` unless both sides are finite and positive.
    pub fn new(width: f64, height: f64) -> Option<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return None;
        }
        Some(Self { width, height })
    }

    /// Parses `"WIDTHxHEIGHT"`, e.g. `1920x1080`.
    pub fn parse(value: &str) -> Option<Self> {
        let (width, height) = value.trim().split_once(['x', 'X'])?;
        Self::new(width.trim().parse().ok()?, height.trim().parse().ok()?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    pub storage_key: String,
    pub sweep_interval_ms: i64,
    pub viewport: Viewport,
    /// SQLite file holding the key-value table.
    pub db_path: PathBuf,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
            viewport: Viewport::default(),
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
        }
    }
}

impl BoardConfig {
    /// Builds config from `PASTEL_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_blank = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            storage_key: non_blank(ENV_STORAGE_KEY).unwrap_or(defaults.storage_key),
            sweep_interval_ms: non_blank(ENV_SWEEP_INTERVAL_MS)
                .and_then(|value| value.parse::<i64>().ok())
                .filter(|value| *value > 0)
                .unwrap_or(defaults.sweep_interval_ms),
            viewport: non_blank(ENV_VIEWPORT)
                .and_then(|value| Viewport::parse(&value))
                .unwrap_or(defaults.viewport),
            db_path: non_blank(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
        }
    }
}
