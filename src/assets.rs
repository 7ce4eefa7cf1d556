//! Image loading for backgrounds and leaf sprites.
//!
//! Everything is loaded once, up front, before the first frame. A path
//! that cannot be read or decoded is recorded as a failure and simply
//! produces no image; the scene then renders procedural leaves instead.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use rayon::prelude::*;

use crate::canvas::Sprite;
use crate::season::{Season, SeasonState, SeasonTable};

/// Outcome of loading one image path.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: PathBuf,
    /// `None` if the file was missing or not a decodable image
    pub image: Option<Sprite>,
}

impl LoadedImage {
    pub fn is_ok(&self) -> bool {
        self.image.is_some()
    }
}

/// Load every distinct path in parallel. Never fails; failures come back
/// with `image: None`, in first-seen order.
pub fn preload_images(paths: &[PathBuf]) -> Vec<LoadedImage> {
    let mut seen = HashSet::new();
    let unique: Vec<&PathBuf> = paths.iter().filter(|p| seen.insert(p.as_path())).collect();

    unique
        .into_par_iter()
        .map(|path| {
            let image = match decode(path) {
                Ok(img) => Some(Arc::new(img)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), "image unavailable, using fallback: {}", e);
                    None
                }
            };
            LoadedImage { path: path.clone(), image }
        })
        .collect()
}

/// Decode by content rather than trusting the extension.
fn decode(path: &Path) -> Result<RgbaImage, image::ImageError> {
    let reader = image::io::Reader::open(path)?.with_guessed_format()?;
    Ok(reader.decode()?.to_rgba8())
}

/// Loaded images for one season.
#[derive(Debug, Clone, Default)]
pub struct SeasonAssets {
    pub background: Option<Sprite>,
    /// Only the leaf images that loaded; may be empty
    pub leaf_sprites: Vec<Sprite>,
}

/// Loaded images for every season.
#[derive(Debug, Clone, Default)]
pub struct AssetLibrary {
    seasons: HashMap<Season, SeasonAssets>,
    failures: Vec<PathBuf>,
}

impl AssetLibrary {
    /// Load the background and leaf images of all seasons, resolving
    /// relative paths against `base_dir`. Shared paths load once.
    pub fn load(table: &SeasonTable, base_dir: &Path) -> Self {
        let resolve = |p: &String| base_dir.join(p);

        let mut wanted = Vec::new();
        for (_, params) in table.iter() {
            wanted.extend(params.background.iter().map(resolve));
            wanted.extend(params.leaf_images.iter().map(resolve));
        }

        let results = preload_images(&wanted);
        let failures: Vec<PathBuf> = results.iter().filter(|r| !r.is_ok()).map(|r| r.path.clone()).collect();
        let cache: HashMap<PathBuf, Sprite> =
            results.into_iter().filter_map(|r| r.image.map(|img| (r.path, img))).collect();

        let seasons = table
            .iter()
            .map(|(season, params)| {
                let background = params.background.as_ref().and_then(|p| cache.get(&resolve(p)).cloned());
                let leaf_sprites =
                    params.leaf_images.iter().filter_map(|p| cache.get(&resolve(p)).cloned()).collect();
                (season, SeasonAssets { background, leaf_sprites })
            })
            .collect();

        tracing::info!(loaded = cache.len(), failed = failures.len(), "preloaded season images");
        Self { seasons, failures }
    }

    /// Assets for `season`; empty if nothing was loaded for it.
    pub fn season(&self, season: Season) -> SeasonAssets {
        self.seasons.get(&season).cloned().unwrap_or_default()
    }

    /// Paths that could not be loaded.
    pub fn failures(&self) -> &[PathBuf] {
        &self.failures
    }

    /// Hand every season's leaf sprites to the season state.
    pub fn install(&self, state: &mut SeasonState) {
        for season in Season::ALL {
            state.set_leaf_sprites(season, self.season(season).leaf_sprites);
        }
    }
}
