//! The frame loop: one simulation step plus one render per display refresh.
//!
//! [`AnimationLoop::advance`] is the whole per-frame step and knows nothing
//! about how it gets scheduled. A host calls it from whatever fires once per
//! repaint (`requestAnimationFrame` in a browser, a fixed-step clock when
//! rendering offline via [`drive`]). Ticks never overlap because each one
//! runs to completion before the host schedules the next.

use chrono::Datelike;
use rand::Rng;

use crate::canvas::{Sprite, Surface};
use crate::particle::Particle;
use crate::season::{Season, SeasonSelector, SeasonState};
use crate::viewport::Viewport;
use crate::wind::WindField;

/// Longest step a single frame may take (ms); longer gaps are clamped so
/// a suspended tab does not teleport every particle.
pub const MAX_FRAME_MS: f64 = 48.0;

/// What happened during one call to [`AnimationLoop::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Elapsed time actually simulated (ms)
    pub dt: f64,
    /// Wind applied this frame (px/s), zero on the anchoring tick
    pub wind_x: f64,
    pub leaves_drawn: usize,
    pub snow_drawn: usize,
}

/// Simulation context driven one frame at a time.
///
/// Owns everything the scene mutates: viewport, season populations, wind
/// and the random source.
#[derive(Debug)]
pub struct AnimationLoop<R: Rng> {
    viewport: Viewport,
    seasons: SeasonState,
    wind: WindField,
    rng: R,
    leaves_visible: bool,
    paused: bool,
    last_time: Option<f64>,
    max_frame_ms: f64,
    frames: u64,
}

impl<R: Rng> AnimationLoop<R> {
    /// Build the loop and spawn the active season's populations.
    pub fn new(mut seasons: SeasonState, viewport: Viewport, mut rng: R) -> Self {
        seasons.rebuild(&viewport, &mut rng);
        Self {
            viewport,
            seasons,
            wind: WindField::new(),
            rng,
            leaves_visible: true,
            paused: false,
            last_time: None,
            max_frame_ms: MAX_FRAME_MS,
            frames: 0,
        }
    }

    pub fn with_max_frame_ms(mut self, max_frame_ms: f64) -> Self {
        self.max_frame_ms = max_frame_ms.max(0.0);
        self
    }

    /// Run one tick at monotonic time `now_ms`.
    ///
    /// The first tick only anchors the clock: it simulates nothing and
    /// leaves any pending gust untouched.
    pub fn advance(&mut self, now_ms: f64, surface: &mut dyn Surface) -> FrameReport {
        let anchoring = self.last_time.is_none();
        let dt = match self.last_time {
            Some(last) => (now_ms - last).clamp(0.0, self.max_frame_ms),
            None => 0.0,
        };
        self.last_time = Some(now_ms);
        self.frames += 1;

        surface.clear();

        let params = self.seasons.parameters();
        let gravity = params.gravity;
        let base_wind = params.wind.base;
        let snowing = self.seasons.active().has_snow();

        let wind_x = if anchoring { 0.0 } else { self.wind.sample(now_ms, base_wind) };

        let mut leaves_drawn = 0;
        if self.leaves_visible && !self.paused {
            for leaf in self.seasons.leaves_mut() {
                leaf.step(dt, now_ms, wind_x, gravity, &self.viewport, &mut self.rng);
                leaf.draw(surface);
                leaves_drawn += 1;
            }
        }

        let mut snow_drawn = 0;
        if snowing {
            for flake in self.seasons.snow_mut() {
                flake.step(dt, now_ms, wind_x, gravity, &self.viewport, &mut self.rng);
                flake.draw(surface);
                snow_drawn += 1;
            }
        }

        FrameReport { dt, wind_x, leaves_drawn, snow_drawn }
    }

    /// A pointer or touch on the scene: gust with the active season's strength.
    pub fn pointer(&mut self) {
        let gust = self.seasons.parameters().wind.gust;
        self.wind.trigger(gust);
    }

    /// New bounds take effect immediately; populations adapt as particles recycle.
    pub fn resize(&mut self, viewport: Viewport) {
        tracing::debug!(width = viewport.width, height = viewport.height, "viewport resized");
        self.viewport = viewport;
    }

    /// Switch season by exact key; anything else is ignored.
    pub fn set_season(&mut self, key: &str) -> bool {
        self.seasons.set_season(key, &self.viewport, &mut self.rng)
    }

    pub fn switch_to(&mut self, season: Season) {
        self.seasons.switch_to(season, &self.viewport, &mut self.rng);
    }

    /// Apply a selector, resolving "auto" against `date`. Returns the season now active.
    pub fn set_season_selector<D: Datelike>(&mut self, selector: SeasonSelector, date: &D) -> Season {
        let season = selector.resolve(date);
        self.switch_to(season);
        season
    }

    /// Register leaf images for `season`. If it is the active season the
    /// leaves are respawned so the images show up immediately.
    pub fn set_leaf_sprites(&mut self, season: Season, sprites: Vec<Sprite>) {
        self.seasons.set_leaf_sprites(season, sprites);
        if self.seasons.active() == season {
            self.seasons.rebuild(&self.viewport, &mut self.rng);
        }
    }

    /// Show or hide leaves. Hidden leaves are neither stepped nor drawn;
    /// snow is unaffected.
    pub fn set_leaves_visible(&mut self, visible: bool) {
        self.leaves_visible = visible;
    }

    pub fn leaves_visible(&self) -> bool {
        self.leaves_visible
    }

    /// Stop the leaves. Paused leaves are neither stepped nor drawn and
    /// keep their state; wind and snow carry on.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Let the leaves fall again from where they stopped.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn seasons(&self) -> &SeasonState {
        &self.seasons
    }

    pub fn wind(&self) -> &WindField {
        &self.wind
    }

    /// Ticks run so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Monotonic millisecond time source for a driver.
pub trait FrameClock {
    /// Time of the next repaint, in ms. Must never go backwards.
    fn next_frame(&mut self) -> f64;
}

/// Synthetic clock that advances a fixed interval per frame.
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    now: f64,
    interval: f64,
}

impl FixedStepClock {
    pub fn new(start_ms: f64, interval_ms: f64) -> Self {
        Self { now: start_ms, interval: interval_ms.max(0.0) }
    }
}

impl FrameClock for FixedStepClock {
    fn next_frame(&mut self) -> f64 {
        let t = self.now;
        self.now += self.interval;
        t
    }
}

/// Minimal driver: tick `frames` times on `clock`, handing the surface and
/// the frame index to `on_frame` after each tick.
pub fn drive<R, C, S, F>(anim: &mut AnimationLoop<R>, clock: &mut C, frames: u32, surface: &mut S, mut on_frame: F)
where
    R: Rng,
    C: FrameClock,
    S: Surface,
    F: FnMut(u32, &mut AnimationLoop<R>, &S),
{
    for frame in 0..frames {
        let now = clock.next_frame();
        anim.advance(now, surface);
        on_frame(frame, anim, &*surface);
    }
}
