//! Configuration schema types for `seasonfall.toml`
//!
//! Every field is optional; a missing file or an empty one yields the
//! built-in scene.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::animation::MAX_FRAME_MS;
use crate::color::parse_color;
use crate::particle::NOMINAL_FRAME_MS;
use crate::season::{Season, SeasonSelector, SeasonTable, CONSTRAINED_POPULATION_SCALE};
use crate::viewport::CONSTRAINED_MAX_WIDTH;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonfallConfig {
    /// Loop and device policy
    pub scene: SceneConfig,
    /// Per-season overrides keyed by season name
    pub seasons: BTreeMap<String, SeasonOverride>,
}

/// Loop timing and device policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Season selector used when none is given on the command line
    pub season: String,
    /// Upper bound on the simulated step per frame (ms)
    pub max_frame_ms: f64,
    /// Frame interval for offline rendering (ms)
    pub frame_interval_ms: f64,
    /// Viewports at most this wide are treated as constrained
    pub constrained_max_width: u32,
    /// Share of particles kept on constrained viewports
    pub constrained_scale: f64,
    /// Directory image paths are resolved against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets_dir: Option<PathBuf>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            season: "auto".to_string(),
            max_frame_ms: MAX_FRAME_MS,
            frame_interval_ms: NOMINAL_FRAME_MS,
            constrained_max_width: CONSTRAINED_MAX_WIDTH,
            constrained_scale: CONSTRAINED_POPULATION_SCALE,
            assets_dir: None,
        }
    }
}

/// Partial replacement for one season's built-in parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeasonOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaf_images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaf_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snow_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_base: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_gust: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_color: Option<String>,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "seasons.autumn.gravity")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "seasonfall.toml: '{}' {}", self.field, self.message)
    }
}

impl SeasonfallConfig {
    /// Built-in season table with this file's overrides applied.
    ///
    /// Entries under unknown season names are skipped; [`Self::validate`]
    /// reports them.
    pub fn season_table(&self) -> SeasonTable {
        let mut table = SeasonTable::default();
        for (key, patch) in &self.seasons {
            let Ok(season) = key.parse::<Season>() else {
                continue;
            };
            let params = table.get_mut(season);
            if let Some(v) = &patch.label {
                params.label = v.clone();
            }
            if let Some(v) = &patch.title {
                params.title = v.clone();
            }
            if let Some(v) = &patch.description {
                params.description = v.clone();
            }
            if let Some(v) = &patch.accent {
                params.accent = v.clone();
            }
            if let Some(v) = &patch.background {
                // An empty string removes the background
                params.background = if v.is_empty() { None } else { Some(v.clone()) };
            }
            if let Some(v) = &patch.leaf_images {
                params.leaf_images = v.clone();
            }
            if let Some(v) = patch.leaf_count {
                params.leaf_count = v;
            }
            if let Some(v) = patch.snow_count {
                params.snow_count = v;
            }
            if let Some(v) = patch.gravity {
                params.gravity = v;
            }
            if let Some(v) = patch.wind_base {
                params.wind.base = v;
            }
            if let Some(v) = patch.wind_gust {
                params.wind.gust = v;
            }
            if let Some(v) = &patch.fallback_color {
                params.fallback_color = v.clone();
            }
        }
        table
    }

    /// Default season selector from `[scene] season`.
    pub fn default_selector(&self) -> SeasonSelector {
        self.scene.season.parse().unwrap_or_default()
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: String, message: &str| {
            errors.push(ConfigValidationError { field, message: message.to_string() });
        };

        if self.scene.season.parse::<SeasonSelector>().is_err() {
            push("scene.season".to_string(), "must be auto, spring, summer, autumn or winter");
        }
        if !(self.scene.max_frame_ms > 0.0) {
            push("scene.max_frame_ms".to_string(), "must be a positive number");
        }
        if !(self.scene.frame_interval_ms > 0.0) {
            push("scene.frame_interval_ms".to_string(), "must be a positive number");
        }
        if !(0.0..=1.0).contains(&self.scene.constrained_scale) {
            push("scene.constrained_scale".to_string(), "must be between 0 and 1");
        }

        for (key, patch) in &self.seasons {
            if key.parse::<Season>().is_err() {
                push(format!("seasons.{}", key), "is not a season");
                continue;
            }
            let non_negative = [("gravity", patch.gravity), ("wind_base", patch.wind_base), ("wind_gust", patch.wind_gust)];
            for (name, value) in non_negative {
                if let Some(v) = value {
                    if !(v.is_finite() && v >= 0.0) {
                        push(format!("seasons.{}.{}", key, name), "must be a non-negative number");
                    }
                }
            }
            for (name, value) in [("accent", &patch.accent), ("fallback_color", &patch.fallback_color)] {
                if let Some(color) = value {
                    if parse_color(color).is_err() {
                        push(format!("seasons.{}.{}", key, name), "must be a CSS color");
                    }
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_defaults() {
        let config: SeasonfallConfig = toml::from_str("").unwrap();
        assert_eq!(config, SeasonfallConfig::default());
        assert!(config.validate().is_empty());
        assert_eq!(config.season_table(), SeasonTable::default());
        assert_eq!(config.default_selector(), SeasonSelector::Auto);
    }

    #[test]
    fn test_season_override_applies() {
        let config: SeasonfallConfig = toml::from_str(
            r##"
[scene]
season = "winter"

[seasons.autumn]
leaf_count = 10
wind_gust = 300.0
fallback_color = "#ff0000"

[seasons.winter]
background = ""
leaf_count = 12
"##,
        )
        .unwrap();
        assert!(config.validate().is_empty());
        let table = config.season_table();
        let autumn = table.get(Season::Autumn);
        assert_eq!(autumn.leaf_count, 10);
        assert_eq!(autumn.wind.gust, 300.0);
        assert_eq!(autumn.wind.base, 22.0);
        assert_eq!(autumn.fallback_color, "#ff0000");
        assert!(table.get(Season::Winter).background.is_none());
        assert_eq!(table.get(Season::Winter).leaf_count, 12);
        assert_eq!(config.default_selector(), SeasonSelector::Fixed(Season::Winter));
    }

    #[test]
    fn test_unknown_override_field_rejected() {
        let result: Result<SeasonfallConfig, _> = toml::from_str("[seasons.spring]\nleaves = 4\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_errors() {
        let config: SeasonfallConfig = toml::from_str(
            r##"
[scene]
season = "monsoon"
max_frame_ms = 0.0
constrained_scale = 1.5

[seasons.monsoon]
leaf_count = 3

[seasons.summer]
gravity = -1.0
accent = "not-a-color"
"##,
        )
        .unwrap();
        let errors = config.validate();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"scene.season"));
        assert!(fields.contains(&"scene.max_frame_ms"));
        assert!(fields.contains(&"scene.constrained_scale"));
        assert!(fields.contains(&"seasons.monsoon"));
        assert!(fields.contains(&"seasons.summer.gravity"));
        assert!(fields.contains(&"seasons.summer.accent"));
        assert_eq!(errors.len(), 6);
        assert!(errors[0].to_string().starts_with("seasonfall.toml:"));
    }
}
