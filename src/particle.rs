//! Falling particles: leaves and snowflakes.
//!
//! Particles integrate their own velocity and position every frame and
//! respawn at the top of the viewport as soon as they drift out of it, so a
//! population never shrinks or grows while the scene is running.
//!
//! All per-frame deltas are normalized to a nominal 16ms frame: velocities
//! are stored in pixels per nominal frame, accelerations in pixels per
//! nominal frame per second.

use std::f64::consts::TAU;

use image::Rgba;
use rand::Rng;

use crate::canvas::{Sprite, Surface, Transform2D};
use crate::season::Season;
use crate::viewport::Viewport;

/// Frame interval the integration is normalized against (ms).
pub const NOMINAL_FRAME_MS: f64 = 16.0;

/// Size of the procedural leaf shape before scaling.
pub const FALLBACK_LEAF_SIZE: (f64, f64) = (28.0, 18.0);

/// Snow responds to gravity and wind much less than leaves.
pub const SNOW_GRAVITY_SCALE: f64 = 0.1;
pub const SNOW_WIND_SCALE: f64 = 0.4;

const SNOW_COLOR: Rgba<u8> = Rgba([255, 255, 255, 235]);

/// Behavior shared by every particle variant.
pub trait Particle {
    /// Re-randomize the particle. `from_top` spawns it just above the
    /// viewport; otherwise anywhere inside it.
    fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R, from_top: bool, viewport: &Viewport);

    /// Advance by `dt` ms at scene time `t` ms under horizontal wind `wind_x`
    /// (px/s) and `gravity`. Recycles the particle if it left the viewport.
    fn step<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        t: f64,
        wind_x: f64,
        gravity: f64,
        viewport: &Viewport,
        rng: &mut R,
    );

    /// Paint at the current transform.
    fn draw(&self, surface: &mut dyn Surface);

    /// Current center in logical pixels.
    fn position(&self) -> (f64, f64);

    /// Rendered width and height in logical pixels.
    fn extent(&self) -> (f64, f64);

    /// Below the bottom edge by its own height, or past a side by twice its width.
    fn is_out_of_bounds(&self, viewport: &Viewport) -> bool {
        let (x, y) = self.position();
        let (w, h) = self.extent();
        y > viewport.height_f() + h || x < -w * 2.0 || x > viewport.width_f() + w * 2.0
    }
}

/// A single leaf, drawn from an image when one is available and as a
/// tinted ellipse otherwise.
#[derive(Debug, Clone)]
pub struct Leaf {
    sprite: Option<Sprite>,
    color: Rgba<u8>,
    season: Season,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub angle: f64,
    pub spin: f64,
    pub scale: f64,
    pub width: f64,
    pub height: f64,
    /// Lateral sway amplitude
    pub swing: f64,
    /// 1.0 or -1.0, mirrors the leaf horizontally
    pub flip: f64,
    pub opacity: f64,
}

impl Leaf {
    /// Create a leaf for `season` and give it a random initial state.
    pub fn new<R: Rng + ?Sized>(
        sprite: Option<Sprite>,
        color: Rgba<u8>,
        season: Season,
        rng: &mut R,
        from_top: bool,
        viewport: &Viewport,
    ) -> Self {
        let mut leaf = Self {
            sprite,
            color,
            season,
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            angle: 0.0,
            spin: 0.0,
            scale: 1.0,
            width: 0.0,
            height: 0.0,
            swing: 0.0,
            flip: 1.0,
            opacity: 1.0,
        };
        leaf.reset(rng, from_top, viewport);
        leaf
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn has_sprite(&self) -> bool {
        self.sprite.is_some()
    }

    /// Unscaled size of whatever this leaf renders.
    fn natural_size(&self) -> (f64, f64) {
        match &self.sprite {
            Some(sprite) => (sprite.width() as f64, sprite.height() as f64),
            None => FALLBACK_LEAF_SIZE,
        }
    }

    fn transform(&self) -> Transform2D {
        Transform2D {
            x: self.x,
            y: self.y,
            rotation: self.angle,
            scale_x: self.flip * self.scale,
            scale_y: self.scale,
        }
    }
}

impl Particle for Leaf {
    fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R, from_top: bool, viewport: &Viewport) {
        let base_scale = if viewport.is_constrained() { 0.5 } else { 1.0 };
        let (w, h) = (viewport.width_f(), viewport.height_f());
        let (natural_w, natural_h) = self.natural_size();

        self.scale = base_scale * (0.4 + rng.gen::<f64>() * 0.9);
        self.width = natural_w * self.scale;
        self.height = natural_h * self.scale;
        self.x = rng.gen::<f64>() * w;
        self.y = if from_top {
            -self.height - rng.gen::<f64>() * h * 0.6
        } else {
            rng.gen::<f64>() * h
        };
        self.vx = (rng.gen::<f64>() - 0.5) * 20.0;
        self.vy = 10.0 + rng.gen::<f64>() * 20.0;
        self.angle = rng.gen::<f64>() * TAU;
        self.spin = (rng.gen::<f64>() - 0.5) * 0.02;
        self.swing = (0.6 + rng.gen::<f64>() * 1.2) * self.scale;
        self.flip = if rng.gen_bool(0.5) { -1.0 } else { 1.0 };
        self.opacity = 0.8 + rng.gen::<f64>() * 0.2;
    }

    fn step<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        t: f64,
        wind_x: f64,
        gravity: f64,
        viewport: &Viewport,
        rng: &mut R,
    ) {
        // Coupling sway to x keeps neighbouring leaves out of lockstep
        let sway = (t * 0.003 + self.x * 0.02).sin() * self.swing;
        self.vx += (wind_x + sway * 0.2) * (dt / 1000.0);
        self.vy += gravity * (dt / 1000.0);

        self.x += self.vx * (dt / NOMINAL_FRAME_MS);
        self.y += self.vy * (dt / NOMINAL_FRAME_MS);
        self.angle += self.spin * (dt / NOMINAL_FRAME_MS);

        if self.is_out_of_bounds(viewport) {
            self.reset(rng, true, viewport);
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let transform = self.transform();
        match &self.sprite {
            Some(sprite) => surface.draw_sprite(sprite, &transform, self.opacity),
            None => {
                let (w, h) = FALLBACK_LEAF_SIZE;
                surface.fill_ellipse(&transform, w / 2.0, h / 2.0, self.color, self.opacity);
            }
        }
    }

    fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    fn extent(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

/// A snowflake: a small soft disc that drifts more gently than a leaf.
#[derive(Debug, Clone)]
pub struct Snowflake {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
    /// Sway phase offset
    pub phase: f64,
    /// Sway amplitude
    pub amplitude: f64,
    pub opacity: f64,
}

impl Snowflake {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, from_top: bool, viewport: &Viewport) -> Self {
        let mut flake = Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            radius: 1.0,
            phase: 0.0,
            amplitude: 0.0,
            opacity: 1.0,
        };
        flake.reset(rng, from_top, viewport);
        flake
    }
}

impl Particle for Snowflake {
    fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R, from_top: bool, viewport: &Viewport) {
        let (w, h) = (viewport.width_f(), viewport.height_f());
        let base = if viewport.is_constrained() { 0.75 } else { 1.0 };

        self.radius = base * (1.0 + rng.gen::<f64>() * 2.5);
        self.x = rng.gen::<f64>() * w;
        self.y = if from_top {
            -self.radius * 2.0 - rng.gen::<f64>() * h * 0.6
        } else {
            rng.gen::<f64>() * h
        };
        self.vx = rng.gen::<f64>() - 0.5;
        self.vy = 0.6 + rng.gen::<f64>() * 1.2;
        self.phase = rng.gen::<f64>() * TAU;
        self.amplitude = 0.5 + rng.gen::<f64>() * 1.5;
        self.opacity = 0.55 + rng.gen::<f64>() * 0.45;
    }

    fn step<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        t: f64,
        wind_x: f64,
        gravity: f64,
        viewport: &Viewport,
        rng: &mut R,
    ) {
        let sway = (t * 0.002 + self.phase).sin() * self.amplitude;
        self.vx += (wind_x * SNOW_WIND_SCALE + sway * 0.2) * (dt / 1000.0);
        self.vy += gravity * SNOW_GRAVITY_SCALE * (dt / 1000.0);

        self.x += self.vx * (dt / NOMINAL_FRAME_MS);
        self.y += self.vy * (dt / NOMINAL_FRAME_MS);

        if self.is_out_of_bounds(viewport) {
            self.reset(rng, true, viewport);
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.fill_circle(self.x, self.y, self.radius, SNOW_COLOR, self.opacity);
    }

    fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    fn extent(&self) -> (f64, f64) {
        (self.radius * 2.0, self.radius * 2.0)
    }
}
