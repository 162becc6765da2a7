//! Scratch rendering surface used to quantize colors.

use image::{Rgba, RgbaImage};

use super::{Rgba8, Srgba};
use crate::{Error, Result};

/// A single RGBA pixel the normalizer paints into and reads back from.
///
/// Painting clips each channel into the 8-bit range, which is also how
/// out-of-gamut colors are mapped into sRGB.
pub struct ColorSurface {
    pixel: RgbaImage,
}

impl ColorSurface {
    pub fn create() -> Result<Self> {
        RgbaImage::from_raw(1, 1, vec![0; 4])
            .map(|pixel| ColorSurface { pixel })
            .ok_or_else(|| Error::SurfaceUnavailable("could not allocate 1x1 pixel buffer".into()))
    }

    /// Paint `color` and read back the stored pixel.
    pub fn quantize(&mut self, color: Srgba) -> Rgba8 {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        self.pixel
            .put_pixel(0, 0, Rgba([q(color.r), q(color.g), q(color.b), q(color.alpha)]));
        let [r, g, b, a] = self.pixel.get_pixel(0, 0).0;
        Rgba8 { r, g, b, a }
    }
}
