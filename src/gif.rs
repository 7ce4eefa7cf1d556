//! Animated GIF output for rendered scenes

use crate::output::{ensure_parent_dir, OutputError};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Quantizer speed passed to the encoder (1 is best quality, 30 fastest).
const QUANTIZE_SPEED: i32 = 10;

/// Streams frames into a GIF file as they are produced, so a long render
/// never holds more than one frame in memory.
pub struct GifRecorder {
    encoder: GifEncoder<BufWriter<File>>,
    delay: Delay,
    frames: u32,
}

impl GifRecorder {
    /// Create `path` (and its parent directories) and write the header.
    pub fn create(path: &Path, frame_interval_ms: f64, loop_anim: bool) -> Result<Self, OutputError> {
        ensure_parent_dir(path)?;
        let writer = BufWriter::new(File::create(path)?);
        let mut encoder = GifEncoder::new_with_speed(writer, QUANTIZE_SPEED);

        let repeat = if loop_anim { Repeat::Infinite } else { Repeat::Finite(0) };
        encoder.set_repeat(repeat)?;

        Ok(Self { encoder, delay: frame_delay(frame_interval_ms), frames: 0 })
    }

    /// Append one frame.
    pub fn push(&mut self, frame: &RgbaImage) -> Result<(), OutputError> {
        self.encoder.encode_frame(Frame::from_parts(frame.clone(), 0, 0, self.delay))?;
        self.frames += 1;
        Ok(())
    }

    /// Number of frames written so far.
    pub fn frames(&self) -> u32 {
        self.frames
    }
}

/// GIF delays are stored as 16-bit centiseconds; round to the nearest one
/// and keep it within [1, u16::MAX].
fn frame_delay(frame_interval_ms: f64) -> Delay {
    let cs = (frame_interval_ms / 10.0).round().clamp(1.0, u16::MAX as f64) as u32;
    Delay::from_numer_denom_ms(cs * 10, 1)
}
