//! Configuration – an explicit object handed to the conditioning pass,
//! optionally read from a `KEY=VALUE` file.
//!
//! Nothing here consults the process environment; callers decide where a
//! configuration comes from.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// How the artboard size is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sizing {
    /// Fixed `cell_size`; the artboard grows with the date range.
    #[default]
    Cell,
    /// Fixed `width`/`height`; the cell size is derived from them.
    Fit,
}

/// Which threshold policy classifies cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadingPolicy {
    /// Three equal-width buckets over the global `[min, max]`.
    #[default]
    Quantize,
    /// Per-activity quantile breakpoints (legacy styling).
    Quantile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Artboard width in pixels (used by [`Sizing::Fit`]).
    pub width: u32,
    /// Artboard height in pixels (used by [`Sizing::Fit`]).
    pub height: u32,
    /// Pixel size of one grid cell (used by [`Sizing::Cell`]).
    pub cell_size: u32,
    pub sizing: Sizing,
    pub shading: ShadingPolicy,
    /// Inset on the trailing and bottom edge of each cell, as a fraction
    /// of the cell size.
    pub margin_ratio: f64,
    /// Optional default range start, used by the CLI when no range is given.
    pub date_start: Option<NaiveDate>,
    /// Optional default range end (exclusive).
    pub date_end: Option<NaiveDate>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        CalendarConfig {
            width: 600,
            height: 600,
            cell_size: 10,
            sizing: Sizing::Cell,
            shading: ShadingPolicy::Quantize,
            margin_ratio: 0.1,
            date_start: None,
            date_end: None,
        }
    }
}

/// A configuration value that would make the layout meaningless.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
    #[error("margin ratio must be within [0, 0.5), got {0}")]
    MarginRatio(f64),
}

impl CalendarConfig {
    /// Check the values the layout divides by or insets with.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        match self.sizing {
            Sizing::Cell if self.cell_size == 0 => return Err(ConfigError::NotPositive("cell size")),
            Sizing::Fit if self.width == 0 => return Err(ConfigError::NotPositive("width")),
            Sizing::Fit if self.height == 0 => return Err(ConfigError::NotPositive("height")),
            _ => {}
        }
        if !(0.0..0.5).contains(&self.margin_ratio) {
            return Err(ConfigError::MarginRatio(self.margin_ratio));
        }
        Ok(())
    }
}

/// Parse a `KEY=VALUE` configuration file.
///
/// Lines starting with `#` are comments.  Values may be optionally
/// double-quoted.  Unknown keys are silently ignored; unparseable values
/// fall back to their defaults with a warning.
pub fn load(path: &Path) -> Result<CalendarConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read config: {}", path.display()))?;
    let config = from_str(&text);
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Build a configuration from `KEY=VALUE` text.
pub fn from_str(text: &str) -> CalendarConfig {
    let map = parse_conf(text);
    let defaults = CalendarConfig::default();

    fn parsed<T: std::str::FromStr>(map: &HashMap<String, String>, key: &str) -> Option<T> {
        let raw = map.get(key)?;
        match raw.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid {key}={raw}");
                None
            }
        }
    }

    let date = |key: &str| -> Option<NaiveDate> {
        let raw = map.get(key).filter(|s| !s.is_empty())?;
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(e) => {
                warn!("Ignoring invalid {key}={raw}: {e}");
                None
            }
        }
    };

    let sizing = match map.get("SIZING").map(|s| s.to_ascii_lowercase()) {
        Some(s) if s == "fit" => Sizing::Fit,
        Some(s) if s == "cell" => Sizing::Cell,
        Some(other) => {
            warn!("Unknown SIZING={other}, using cell");
            Sizing::Cell
        }
        None => defaults.sizing,
    };
    let shading = match map.get("SHADING").map(|s| s.to_ascii_lowercase()) {
        Some(s) if s == "quantile" => ShadingPolicy::Quantile,
        Some(s) if s == "quantize" => ShadingPolicy::Quantize,
        Some(other) => {
            warn!("Unknown SHADING={other}, using quantize");
            ShadingPolicy::Quantize
        }
        None => defaults.shading,
    };

    CalendarConfig {
        width: parsed(&map, "WIDTH").unwrap_or(defaults.width),
        height: parsed(&map, "HEIGHT").unwrap_or(defaults.height),
        cell_size: parsed(&map, "CELL_SIZE").unwrap_or(defaults.cell_size),
        sizing,
        shading,
        margin_ratio: parsed(&map, "MARGIN_RATIO").unwrap_or(defaults.margin_ratio),
        date_start: date("DATE_START"),
        date_end: date("DATE_END"),
    }
}

/// Parse `KEY=VALUE` lines into a map, stripping optional double-quotes.
fn parse_conf(text: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, val)) = line.split_once('=') {
            let key = key.trim();
            let val = val.trim().trim_matches('"');
            map.insert(key.to_string(), val.to_string());
        }
    }
    map
}

// ─── tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_conf() {
        let text = r#"
# comment
CELL_SIZE=12
SIZING="fit"
DATE_START=2021-01-01
"#;
        let map = parse_conf(text);
        assert_eq!(map["CELL_SIZE"], "12");
        assert_eq!(map["SIZING"], "fit");
        assert_eq!(map["DATE_START"], "2021-01-01");
    }

    #[test]
    fn test_defaults() {
        let config = CalendarConfig::default();
        assert_eq!((config.width, config.height, config.cell_size), (600, 600, 10));
        assert_eq!(config.sizing, Sizing::Cell);
        assert_eq!(config.shading, ShadingPolicy::Quantize);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_str_falls_back_on_bad_values() {
        let config = from_str("CELL_SIZE=big\nSHADING=Quantile\nDATE_END=2021-13-01\nWIDTH=800\n");
        assert_eq!(config.cell_size, 10);
        assert_eq!(config.width, 800);
        assert_eq!(config.shading, ShadingPolicy::Quantile);
        assert_eq!(config.date_end, None);
    }

    #[test]
    fn test_validate() {
        let zero_cell = CalendarConfig { cell_size: 0, ..Default::default() };
        assert_eq!(zero_cell.validate(), Err(ConfigError::NotPositive("cell size")));

        // cell size is irrelevant when fitting to the artboard
        let fit = CalendarConfig { cell_size: 0, sizing: Sizing::Fit, ..Default::default() };
        assert!(fit.validate().is_ok());

        let margin = CalendarConfig { margin_ratio: 0.5, ..Default::default() };
        assert!(matches!(margin.validate(), Err(ConfigError::MarginRatio(_))));
    }

    #[test]
    fn test_load_file() {
        let dir = std::env::temp_dir().join("calgrid_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path: PathBuf = dir.join("calendar.conf");
        std::fs::write(&path, "HEIGHT=300\nDATE_START=2021-03-01\n").unwrap();
        let config = load(&path).unwrap();
        assert_eq!(config.height, 300);
        assert_eq!(config.date_start, NaiveDate::from_ymd_opt(2021, 3, 1));
        assert!(load(&dir.join("missing.conf")).is_err());
    }
}
