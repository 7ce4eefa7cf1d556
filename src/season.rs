//! Seasons, their parameters, and the particle populations they own.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use image::Rgba;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::canvas::Sprite;
use crate::color::parse_color;
use crate::particle::{Leaf, Snowflake};
use crate::viewport::Viewport;
use crate::wind::WindProfile;

/// Share of the configured population kept on constrained viewports.
pub const CONSTRAINED_POPULATION_SCALE: f64 = 0.6;

/// Color used when a season's fallback color fails to parse.
const DEFAULT_FALLBACK: Rgba<u8> = Rgba([139, 90, 43, 255]);

/// One of the four seasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    /// The season that gets a snow population.
    pub const SNOW: Season = Season::Winter;

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }

    pub fn has_snow(&self) -> bool {
        *self == Season::SNOW
    }

    /// Exact lookup by table key. Unlike `FromStr` this accepts no aliases
    /// and no case or whitespace variations.
    pub fn from_key(key: &str) -> Option<Season> {
        Season::ALL.into_iter().find(|s| s.as_str() == key)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a season name outside the fixed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown season '{0}', expected one of: spring, summer, autumn, winter")]
pub struct UnknownSeason(pub String);

impl FromStr for Season {
    type Err = UnknownSeason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" | "fall" => Ok(Season::Autumn),
            "winter" => Ok(Season::Winter),
            _ => Err(UnknownSeason(s.to_string())),
        }
    }
}

/// Map a 0-based month (0 = January) to its season.
///
/// Dec/Jan/Feb are winter, then spring, summer and autumn in quarters.
/// Values past 11 wrap around.
pub fn season_for_month(month0: u32) -> Season {
    match month0 % 12 {
        11 | 0 | 1 => Season::Winter,
        2..=4 => Season::Spring,
        5..=7 => Season::Summer,
        _ => Season::Autumn,
    }
}

/// Season for a calendar date.
pub fn resolve_auto_season<D: Datelike>(date: &D) -> Season {
    season_for_month(date.month0())
}

/// User-facing season choice: a fixed season or "follow the calendar".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeasonSelector {
    #[default]
    Auto,
    Fixed(Season),
}

impl SeasonSelector {
    pub fn resolve<D: Datelike>(&self, date: &D) -> Season {
        match self {
            SeasonSelector::Auto => resolve_auto_season(date),
            SeasonSelector::Fixed(season) => *season,
        }
    }
}

impl FromStr for SeasonSelector {
    type Err = UnknownSeason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(SeasonSelector::Auto);
        }
        s.parse().map(SeasonSelector::Fixed)
    }
}

impl fmt::Display for SeasonSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeasonSelector::Auto => f.write_str("auto"),
            SeasonSelector::Fixed(season) => season.fmt(f),
        }
    }
}

/// Everything that varies between seasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonParameters {
    /// Short badge text
    pub label: String,
    pub title: String,
    pub description: String,
    /// Theme accent (CSS color)
    pub accent: String,
    /// Background image path, relative to the asset directory
    pub background: Option<String>,
    /// Leaf image paths, relative to the asset directory (may be empty)
    pub leaf_images: Vec<String>,
    pub leaf_count: u32,
    /// Snowflakes, only used by the snow season
    pub snow_count: u32,
    pub gravity: f64,
    pub wind: WindProfile,
    /// Leaf color when no image is available (CSS color)
    pub fallback_color: String,
}

impl SeasonParameters {
    /// Built-in parameters for a season.
    pub fn defaults_for(season: Season) -> Self {
        let leaves = |names: &[&str]| -> Vec<String> {
            names.iter().map(|n| format!("assets/maple/leaves/{}.png", n)).collect()
        };
        let background = Some(format!("assets/maple/tree-{}.jpg", season));

        match season {
            Season::Spring => Self {
                label: "Spring".to_string(),
                title: "Mild and bright".to_string(),
                description: "Everything wakes, buds open and pale young leaves ride a light breeze."
                    .to_string(),
                accent: "#2ecc71".to_string(),
                background,
                leaf_images: leaves(&["leaf-spring-1", "leaf-spring-2"]),
                leaf_count: 60,
                snow_count: 0,
                gravity: 18.0,
                wind: WindProfile { base: 12.0, gust: 140.0 },
                fallback_color: "#8fd694".to_string(),
            },
            Season::Summer => Self {
                label: "Summer".to_string(),
                title: "A sea of shade".to_string(),
                description: "Deep midsummer green, heavy leaves that only now and then drift loose."
                    .to_string(),
                accent: "#16a085".to_string(),
                background,
                leaf_images: leaves(&["leaf-summer-1", "leaf-summer-2"]),
                leaf_count: 36,
                snow_count: 0,
                gravity: 24.0,
                wind: WindProfile { base: 16.0, gust: 160.0 },
                fallback_color: "#2e8b57".to_string(),
            },
            Season::Autumn => Self {
                label: "Autumn".to_string(),
                title: "Frost-dyed woods".to_string(),
                description: "Maples burn red and the wind sends leaves tumbling down like rain."
                    .to_string(),
                accent: "#d35400".to_string(),
                background,
                leaf_images: leaves(&["leaf-autumn-1", "leaf-autumn-2", "leaf-autumn-3"]),
                leaf_count: 120,
                snow_count: 0,
                gravity: 30.0,
                wind: WindProfile { base: 22.0, gust: 220.0 },
                fallback_color: "#d2691e".to_string(),
            },
            Season::Winter => Self {
                label: "Winter".to_string(),
                title: "Still and silent".to_string(),
                description: "Bare branches under a plain sky, snow drifting past the last few leaves."
                    .to_string(),
                accent: "#5dade2".to_string(),
                background,
                leaf_images: Vec::new(),
                leaf_count: 0,
                snow_count: 320,
                gravity: 28.0,
                wind: WindProfile { base: 12.0, gust: 180.0 },
                fallback_color: "#8b5a2b".to_string(),
            },
        }
    }

    /// Parsed fallback color, or a neutral brown if the string is invalid.
    pub fn fallback_rgba(&self) -> Rgba<u8> {
        parse_color(&self.fallback_color).unwrap_or(DEFAULT_FALLBACK)
    }
}

/// Parameters for every season.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonTable {
    entries: HashMap<Season, SeasonParameters>,
}

impl SeasonTable {
    pub fn get(&self, season: Season) -> &SeasonParameters {
        // Every constructor fills all four seasons
        &self.entries[&season]
    }

    pub fn get_mut(&mut self, season: Season) -> &mut SeasonParameters {
        self.entries.entry(season).or_insert_with(|| SeasonParameters::defaults_for(season))
    }

    /// Seasons with their parameters in calendar order.
    pub fn iter(&self) -> impl Iterator<Item = (Season, &SeasonParameters)> {
        Season::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

impl Default for SeasonTable {
    fn default() -> Self {
        Self { entries: Season::ALL.into_iter().map(|s| (s, SeasonParameters::defaults_for(s))).collect() }
    }
}

/// Number of particles to spawn for a configured count on this viewport.
pub fn population_target(count: u32, viewport: &Viewport, constrained_scale: f64) -> usize {
    if viewport.is_constrained() {
        (count as f64 * constrained_scale).round().max(0.0) as usize
    } else {
        count as usize
    }
}

/// Active season plus the particle populations built for it.
#[derive(Debug, Clone)]
pub struct SeasonState {
    table: SeasonTable,
    active: Season,
    leaf_sprites: HashMap<Season, Vec<Sprite>>,
    leaves: Vec<Leaf>,
    snow: Vec<Snowflake>,
    constrained_scale: f64,
}

impl SeasonState {
    /// Start in `initial` with empty populations; call [`SeasonState::rebuild`]
    /// once the viewport is known.
    pub fn new(table: SeasonTable, initial: Season) -> Self {
        Self {
            table,
            active: initial,
            leaf_sprites: HashMap::new(),
            leaves: Vec::new(),
            snow: Vec::new(),
            constrained_scale: CONSTRAINED_POPULATION_SCALE,
        }
    }

    pub fn with_constrained_scale(mut self, scale: f64) -> Self {
        self.constrained_scale = scale.max(0.0);
        self
    }

    /// Register loaded leaf images for a season. Takes effect on the next rebuild.
    pub fn set_leaf_sprites(&mut self, season: Season, sprites: Vec<Sprite>) {
        self.leaf_sprites.insert(season, sprites);
    }

    /// Leaf images registered for `season`.
    pub fn leaf_sprites(&self, season: Season) -> &[Sprite] {
        self.leaf_sprites.get(&season).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn active(&self) -> Season {
        self.active
    }

    pub fn parameters(&self) -> &SeasonParameters {
        self.table.get(self.active)
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn leaves_mut(&mut self) -> &mut [Leaf] {
        &mut self.leaves
    }

    pub fn snow(&self) -> &[Snowflake] {
        &self.snow
    }

    pub fn snow_mut(&mut self) -> &mut [Snowflake] {
        &mut self.snow
    }

    /// Switch by exact key ("spring", "summer", "autumn", "winter"). Anything
    /// else leaves everything untouched and returns false.
    pub fn set_season<R: Rng + ?Sized>(&mut self, key: &str, viewport: &Viewport, rng: &mut R) -> bool {
        match Season::from_key(key) {
            Some(season) => {
                self.switch_to(season, viewport, rng);
                true
            }
            None => {
                tracing::debug!(key, "ignoring season switch: unknown key");
                false
            }
        }
    }

    /// Make `season` active and rebuild its populations from scratch.
    pub fn switch_to<R: Rng + ?Sized>(&mut self, season: Season, viewport: &Viewport, rng: &mut R) {
        self.active = season;
        self.rebuild(viewport, rng);
    }

    /// Replace the populations of the active season with fresh ones.
    pub fn rebuild<R: Rng + ?Sized>(&mut self, viewport: &Viewport, rng: &mut R) {
        let params = self.table.get(self.active);
        let color = params.fallback_rgba();
        let leaf_total = population_target(params.leaf_count, viewport, self.constrained_scale);
        let sprites = self.leaf_sprites.get(&self.active).map(Vec::as_slice).unwrap_or(&[]);

        let leaves = (0..leaf_total)
            .map(|i| {
                let sprite = if sprites.is_empty() { None } else { Some(sprites[i % sprites.len()].clone()) };
                Leaf::new(sprite, color, self.active, rng, false, viewport)
            })
            .collect();

        let snow = if self.active.has_snow() {
            let total = population_target(params.snow_count, viewport, self.constrained_scale);
            (0..total).map(|_| Snowflake::new(rng, false, viewport)).collect()
        } else {
            Vec::new()
        };

        self.leaves = leaves;
        self.snow = snow;

        tracing::debug!(
            season = %self.active,
            leaves = self.leaves.len(),
            snow = self.snow.len(),
            sprites = sprites.len(),
            "rebuilt particle populations"
        );
    }
}
