//! Render surfaces for the particle scene.
//!
//! The simulation only talks to the [`Surface`] trait. [`Canvas`] is the
//! software implementation: an `RgbaImage` in device pixels with an optional
//! backdrop that `clear()` restores every frame.

use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::viewport::Viewport;

/// Shared, immutable image handle used for particle sprites and backdrops.
pub type Sprite = Arc<RgbaImage>;

/// Placement of a shape in logical viewport space.
///
/// Shapes are centered on `(x, y)`, scaled, then rotated by `rotation`
/// radians. A negative `scale_x` mirrors the shape horizontally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Transform2D {
    /// Map a logical point into the shape's unscaled local frame.
    fn to_local(&self, wx: f64, wy: f64) -> (f64, f64) {
        let (sin, cos) = self.rotation.sin_cos();
        let dx = wx - self.x;
        let dy = wy - self.y;
        let rx = cos * dx + sin * dy;
        let ry = -sin * dx + cos * dy;
        (rx / self.scale_x, ry / self.scale_y)
    }

    fn is_degenerate(&self) -> bool {
        !(self.scale_x.abs() > f64::EPSILON && self.scale_y.abs() > f64::EPSILON)
    }
}

/// Something particles can paint themselves onto.
pub trait Surface {
    /// Wipe the previous frame.
    fn clear(&mut self);

    /// Paint `sprite` centered on the transform origin.
    fn draw_sprite(&mut self, sprite: &RgbaImage, transform: &Transform2D, opacity: f64);

    /// Paint a filled ellipse with radii `rx`, `ry` in the transform's local frame.
    fn fill_ellipse(
        &mut self,
        transform: &Transform2D,
        rx: f64,
        ry: f64,
        color: Rgba<u8>,
        opacity: f64,
    );

    /// Paint a soft-edged filled circle in logical coordinates.
    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba<u8>, opacity: f64);
}

/// What `clear()` resets the canvas to.
#[derive(Debug, Clone)]
enum Backdrop {
    Transparent,
    Solid(Rgba<u8>),
    /// Source image plus its cover-fitted copy at the current physical size
    Image { source: Sprite, fitted: RgbaImage },
}

/// Software render surface backed by an `RgbaImage`.
#[derive(Debug, Clone)]
pub struct Canvas {
    frame: RgbaImage,
    dpr: f64,
    backdrop: Backdrop,
}

impl Canvas {
    /// Create a transparent canvas sized for the viewport's device pixels.
    pub fn new(viewport: &Viewport) -> Self {
        let (w, h) = viewport.physical_size();
        Self { frame: RgbaImage::new(w, h), dpr: viewport.device_pixel_ratio, backdrop: Backdrop::Transparent }
    }

    /// Fill with a solid color on every clear.
    pub fn set_backdrop_color(&mut self, color: Rgba<u8>) {
        self.backdrop = Backdrop::Solid(color);
    }

    /// Show `image` behind the particles, scaled to cover the canvas.
    pub fn set_backdrop_image(&mut self, image: Sprite) {
        let fitted = cover_fit(&image, self.frame.width(), self.frame.height());
        self.backdrop = Backdrop::Image { source: image, fitted };
    }

    /// Reallocate for a new viewport, refitting any backdrop image.
    pub fn resize(&mut self, viewport: &Viewport) {
        let (w, h) = viewport.physical_size();
        self.dpr = viewport.device_pixel_ratio;
        self.frame = RgbaImage::new(w, h);
        if let Backdrop::Image { source, fitted } = &mut self.backdrop {
            *fitted = cover_fit(source, w, h);
        }
    }

    /// The most recently rendered frame.
    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    pub fn height(&self) -> u32 {
        self.frame.height()
    }

    /// Device-pixel bounding box (inclusive-exclusive) of a logical circle.
    fn pixel_bounds(&self, cx: f64, cy: f64, radius: f64) -> Option<(u32, u32, u32, u32)> {
        let cw = self.frame.width() as f64;
        let ch = self.frame.height() as f64;
        let x0 = ((cx - radius) * self.dpr).floor().max(0.0);
        let y0 = ((cy - radius) * self.dpr).floor().max(0.0);
        let x1 = ((cx + radius) * self.dpr).ceil().min(cw);
        let y1 = ((cy + radius) * self.dpr).ceil().min(ch);
        if !(x0 < x1 && y0 < y1) {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    fn blend_pixel(&mut self, px: u32, py: u32, color: Rgba<u8>, alpha: f64) {
        if alpha <= 0.0 {
            return;
        }
        let dst = *self.frame.get_pixel(px, py);
        self.frame.put_pixel(px, py, alpha_blend(&color, &dst, alpha.min(1.0)));
    }
}

impl Surface for Canvas {
    fn clear(&mut self) {
        match &self.backdrop {
            Backdrop::Transparent => self.frame.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0])),
            Backdrop::Solid(color) => {
                let color = *color;
                self.frame.pixels_mut().for_each(|p| *p = color);
            }
            Backdrop::Image { fitted, .. } => self.frame.copy_from_slice(fitted.as_raw()),
        }
    }

    fn draw_sprite(&mut self, sprite: &RgbaImage, transform: &Transform2D, opacity: f64) {
        if transform.is_degenerate() || opacity <= 0.0 || sprite.width() == 0 || sprite.height() == 0 {
            return;
        }
        let sw = sprite.width() as f64;
        let sh = sprite.height() as f64;
        let reach = (sw * transform.scale_x).hypot(sh * transform.scale_y) / 2.0;
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(transform.x, transform.y, reach) else {
            return;
        };

        for py in y0..y1 {
            for px in x0..x1 {
                let wx = (px as f64 + 0.5) / self.dpr;
                let wy = (py as f64 + 0.5) / self.dpr;
                let (lx, ly) = transform.to_local(wx, wy);
                let u = lx + sw / 2.0;
                let v = ly + sh / 2.0;
                if u < 0.0 || v < 0.0 || u >= sw || v >= sh {
                    continue;
                }
                let src = *sprite.get_pixel(u as u32, v as u32);
                if src[3] == 0 {
                    continue;
                }
                self.blend_pixel(px, py, src, src[3] as f64 / 255.0 * opacity);
            }
        }
    }

    fn fill_ellipse(
        &mut self,
        transform: &Transform2D,
        rx: f64,
        ry: f64,
        color: Rgba<u8>,
        opacity: f64,
    ) {
        if transform.is_degenerate() || opacity <= 0.0 || rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let reach = rx.max(ry) * transform.scale_x.abs().max(transform.scale_y.abs());
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(transform.x, transform.y, reach) else {
            return;
        };
        let alpha = color[3] as f64 / 255.0 * opacity;

        for py in y0..y1 {
            for px in x0..x1 {
                let wx = (px as f64 + 0.5) / self.dpr;
                let wy = (py as f64 + 0.5) / self.dpr;
                let (lx, ly) = transform.to_local(wx, wy);
                let d = (lx / rx).powi(2) + (ly / ry).powi(2);
                if d <= 1.0 {
                    self.blend_pixel(px, py, color, alpha);
                }
            }
        }
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba<u8>, opacity: f64) {
        if radius <= 0.0 || opacity <= 0.0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(cx, cy, radius + 1.0 / self.dpr) else {
            return;
        };
        let r = radius * self.dpr;
        let (pcx, pcy) = (cx * self.dpr, cy * self.dpr);
        let alpha = color[3] as f64 / 255.0 * opacity;

        for py in y0..y1 {
            for px in x0..x1 {
                let dist = (px as f64 + 0.5 - pcx).hypot(py as f64 + 0.5 - pcy);
                // One device pixel of antialiased rim
                let coverage = (r + 0.5 - dist).clamp(0.0, 1.0);
                self.blend_pixel(px, py, color, alpha * coverage);
            }
        }
    }
}

/// Scale `image` to cover `width x height`, cropping the overflow evenly.
fn cover_fit(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.width() == 0 || image.height() == 0 || width == 0 || height == 0 {
        return RgbaImage::new(width, height);
    }
    let scale = (width as f64 / image.width() as f64).max(height as f64 / image.height() as f64);
    let sw = ((image.width() as f64 * scale).ceil() as u32).max(width);
    let sh = ((image.height() as f64 * scale).ceil() as u32).max(height);
    let scaled = imageops::resize(image, sw, sh, FilterType::Triangle);
    imageops::crop_imm(&scaled, (sw - width) / 2, (sh - height) / 2, width, height).to_image()
}

/// Source-over compositing of `src` (with alpha overridden to `src_alpha`) onto `dst`.
fn alpha_blend(src: &Rgba<u8>, dst: &Rgba<u8>, src_alpha: f64) -> Rgba<u8> {
    let sa = src_alpha;
    let da = dst[3] as f64 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |s: u8, d: u8| -> u8 {
        let out = (s as f64 / 255.0 * sa + d as f64 / 255.0 * da * (1.0 - sa)) / out_a;
        (out * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
