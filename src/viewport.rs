//! Logical viewport the particles live in.

/// Smallest logical edge the scene is laid out at.
pub const MIN_EDGE: u32 = 320;
/// Viewports at most this wide (logical px) count as constrained devices.
pub const CONSTRAINED_MAX_WIDTH: u32 = 768;

/// Viewport size in logical pixels plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f64,
    /// Width at or below which the viewport is treated as constrained
    pub constrained_max_width: u32,
}

impl Viewport {
    /// Build a viewport from raw host measurements.
    ///
    /// Logical sizes are floored and clamped to [`MIN_EDGE`]; the pixel ratio
    /// is clamped to `[1, 2]` so high-density screens stay affordable.
    pub fn from_host(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        let edge = |v: f64| {
            if v.is_finite() && v > MIN_EDGE as f64 {
                v.floor() as u32
            } else {
                MIN_EDGE
            }
        };
        let dpr = if device_pixel_ratio.is_finite() { device_pixel_ratio.clamp(1.0, 2.0) } else { 1.0 };

        Self {
            width: edge(width),
            height: edge(height),
            device_pixel_ratio: dpr,
            constrained_max_width: CONSTRAINED_MAX_WIDTH,
        }
    }

    pub fn with_constrained_max_width(mut self, width: u32) -> Self {
        self.constrained_max_width = width;
        self
    }

    pub fn width_f(&self) -> f64 {
        self.width as f64
    }

    pub fn height_f(&self) -> f64 {
        self.height as f64
    }

    /// Backing-store size in device pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        (
            (self.width as f64 * self.device_pixel_ratio).floor() as u32,
            (self.height as f64 * self.device_pixel_ratio).floor() as u32,
        )
    }

    /// Narrow viewports get fewer, smaller particles.
    pub fn is_constrained(&self) -> bool {
        self.width <= self.constrained_max_width
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_host(1280.0, 720.0, 1.0)
    }
}
