//! WASM API module for browser/JS interop
//!
//! [`SeasonScene`] wraps the frame loop for a page that calls
//! [`SeasonScene::tick`] from `requestAnimationFrame` and blits
//! [`SeasonScene::pixels`] into a canvas. The page keeps the backdrop in CSS,
//! so the rendered frame is transparent apart from the particles.

use std::sync::Arc;

use image::RgbaImage;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use crate::animation::AnimationLoop;
use crate::canvas::{Canvas, Surface};
use crate::season::{season_for_month, Season, SeasonSelector, SeasonState, SeasonTable};
use crate::viewport::Viewport;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

fn resolve(selector: &str, month0: u32) -> Result<Season, JsError> {
    let selector: SeasonSelector = selector.parse().map_err(|e| JsError::new(&format!("{}", e)))?;
    Ok(match selector {
        SeasonSelector::Auto => season_for_month(month0),
        SeasonSelector::Fixed(season) => season,
    })
}

/// A running scene bound to one canvas.
#[wasm_bindgen]
pub struct SeasonScene {
    anim: AnimationLoop<StdRng>,
    canvas: Canvas,
}

#[wasm_bindgen]
impl SeasonScene {
    /// Create a scene for a `width` x `height` CSS-pixel viewport.
    ///
    /// `selector` is "auto" or a season name; "auto" picks the season for
    /// `month0` (0 = January), which the page takes from its local clock.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, dpr: f64, selector: &str, month0: u32, seed: u32) -> Result<SeasonScene, JsError> {
        let season = resolve(selector, month0)?;
        let viewport = Viewport::from_host(width, height, dpr);
        let state = SeasonState::new(SeasonTable::default(), season);
        let anim = AnimationLoop::new(state, viewport, StdRng::seed_from_u64(seed as u64));
        Ok(SeasonScene { anim, canvas: Canvas::new(&viewport) })
    }

    /// Advance to `now_ms` (the rAF timestamp) and render. Returns the
    /// number of particles drawn.
    pub fn tick(&mut self, now_ms: f64) -> u32 {
        let report = self.anim.advance(now_ms, &mut self.canvas);
        (report.leaves_drawn + report.snow_drawn) as u32
    }

    /// Device-pixel width of the frame buffer
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    /// Device-pixel height of the frame buffer
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    /// Raw RGBA pixel data of the last frame (4 bytes per pixel)
    pub fn pixels(&self) -> Vec<u8> {
        self.canvas.frame().as_raw().clone()
    }

    /// The active season's key
    #[wasm_bindgen(getter)]
    pub fn season(&self) -> String {
        self.anim.seasons().active().to_string()
    }

    /// The active season's accent color, for theming the page
    #[wasm_bindgen(getter)]
    pub fn accent(&self) -> String {
        self.anim.seasons().parameters().accent.clone()
    }

    /// Short display label, e.g. "Autumn"
    #[wasm_bindgen(getter)]
    pub fn label(&self) -> String {
        self.anim.seasons().parameters().label.clone()
    }

    /// Headline text for the active season
    #[wasm_bindgen(getter)]
    pub fn title(&self) -> String {
        self.anim.seasons().parameters().title.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn description(&self) -> String {
        self.anim.seasons().parameters().description.clone()
    }

    /// Pointer or touch on the page
    pub fn pointer(&mut self) {
        self.anim.pointer();
    }

    pub fn resize(&mut self, width: f64, height: f64, dpr: f64) {
        let viewport = Viewport::from_host(width, height, dpr);
        self.anim.resize(viewport);
        self.canvas.resize(&viewport);
        self.canvas.clear();
    }

    /// Switch season by exact lowercase key. Other keys are ignored and return false.
    pub fn set_season(&mut self, key: &str) -> bool {
        self.anim.set_season(key)
    }

    /// Switch via a selector ("auto" or a season name).
    pub fn set_selector(&mut self, selector: &str, month0: u32) -> Result<String, JsError> {
        let season = resolve(selector, month0)?;
        self.anim.switch_to(season);
        Ok(season.to_string())
    }

    pub fn set_leaves_visible(&mut self, visible: bool) {
        self.anim.set_leaves_visible(visible);
    }

    /// Stop the leaves where they are; wind and snow keep going
    pub fn pause(&mut self) {
        self.anim.pause();
    }

    /// Let the leaves fall again
    pub fn resume(&mut self) {
        self.anim.resume();
    }

    #[wasm_bindgen(getter)]
    pub fn paused(&self) -> bool {
        self.anim.is_paused()
    }

    /// Register a decoded leaf image (`rgba` is `width * height * 4` bytes)
    /// for a season. Leaves respawn right away if the season is active.
    pub fn add_leaf_image(&mut self, season: &str, width: u32, height: u32, rgba: Vec<u8>) -> Result<(), JsError> {
        let season: Season = season.parse().map_err(|e| JsError::new(&format!("{}", e)))?;
        let image = RgbaImage::from_raw(width, height, rgba)
            .ok_or_else(|| JsError::new("pixel buffer does not match width * height * 4"))?;

        let mut sprites = self.anim.seasons().leaf_sprites(season).to_vec();
        sprites.push(Arc::new(image));
        self.anim.set_leaf_sprites(season, sprites);
        Ok(())
    }
}
