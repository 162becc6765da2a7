//! Color parsing and normalization
//!
//! The live renderer accepts modern color spaces (`oklch()`, `lab()`,
//! `color(display-p3 ...)` ...) that the rasterizer does not. This module
//! converts any such value into an 8-bit sRGB form:
//!
//! ```
//! use pagesnap::color::ColorNormalizer;
//!
//! let n = ColorNormalizer::new();
//! assert_eq!(n.normalize("oklch(1 0 0)"), "rgb(255, 255, 255)");
//! assert_eq!(n.normalize("transparent"), "transparent");
//! assert_eq!(n.normalize("not a color"), "not a color");
//! ```

use std::fmt;

mod normalize;
pub mod parse;
pub mod spaces;
mod surface;

pub use normalize::{ColorNormalizer, SurfaceFactory};
pub use parse::{parse, parse_legacy, ColorParseError, Srgba};
pub use surface::ColorSurface;

/// An 8-bit-per-channel color, the only form the rasterizer is guaranteed
/// to understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl fmt::Display for Rgba8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            // three decimals always round-trip back to the same 8-bit alpha
            let alpha = format!("{:.3}", self.a as f64 / 255.0);
            let alpha = alpha.trim_end_matches('0').trim_end_matches('.');
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_rgb_when_opaque() {
        let c = Rgba8 { r: 1, g: 2, b: 3, a: 255 };
        assert_eq!(c.to_string(), "rgb(1, 2, 3)");
    }

    #[test]
    fn display_trims_alpha() {
        assert_eq!(Rgba8 { r: 0, g: 0, b: 0, a: 0 }.to_string(), "rgba(0, 0, 0, 0)");
        assert_eq!(Rgba8 { r: 9, g: 8, b: 7, a: 128 }.to_string(), "rgba(9, 8, 7, 0.502)");
        assert_eq!(Rgba8 { r: 9, g: 8, b: 7, a: 51 }.to_string(), "rgba(9, 8, 7, 0.2)");
    }
}
