//! Pixel output from the VIC.
//!
//! The VIC emits colour indices (0-15) at absolute screen coordinates.
//! What happens to them is up to the `PixelSink`: the machine's own
//! `FrameBuffer` converts them to ARGB32 through the palette.

use crate::palette::PALETTE;
use crate::vic::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Receiver for rendered pixels.
pub trait PixelSink {
    /// Set the pixel at (`x`, `y`) to palette entry `colour` (0-15).
    fn set_pixel(&mut self, x: u16, y: u16, colour: u8);
}

/// ARGB32 frame buffer covering the visible screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Vec<u32>,
}

impl FrameBuffer {
    /// Width in pixels.
    pub const WIDTH: u32 = SCREEN_WIDTH as u32;
    /// Height in pixels.
    pub const HEIGHT: u32 = SCREEN_HEIGHT as u32;

    /// Create a frame buffer covering the visible area, filled with black.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pixels: vec![PALETTE[0]; SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize],
        }
    }

    /// A zero-sized stand-in, used while the real buffer is lent out.
    pub(crate) const fn detached() -> Self {
        Self { pixels: Vec::new() }
    }

    /// Pixels in row-major order.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// The pixel at (`x`, `y`), or `None` off screen.
    #[must_use]
    pub fn pixel(&self, x: u16, y: u16) -> Option<u32> {
        if x < SCREEN_WIDTH && y < SCREEN_HEIGHT {
            Some(self.pixels[usize::from(y) * usize::from(SCREEN_WIDTH) + usize::from(x)])
        } else {
            None
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelSink for FrameBuffer {
    fn set_pixel(&mut self, x: u16, y: u16, colour: u8) {
        if x < SCREEN_WIDTH && y < SCREEN_HEIGHT {
            let idx = usize::from(y) * usize::from(SCREEN_WIDTH) + usize::from(x);
            self.pixels[idx] = PALETTE[usize::from(colour & 0x0F)];
        }
    }
}
