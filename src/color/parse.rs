//! CSS color syntax parsing
//!
//! [`parse`] understands everything the live renderer accepts: hex, named
//! colors, `rgb()`, `hsl()`, `hwb()`, `lab()`, `lch()`, `oklab()` and
//! `oklch()` through `csscolorparser`, plus the predefined-space `color()`
//! function. [`parse_legacy`] accepts only the subset a legacy rasterizer
//! understands (hex, named, `rgb()/rgba()`, `hsl()/hsla()`, `transparent`).

use thiserror::Error;

use super::spaces::PredefinedSpace;

/// A parsed color as gamma-encoded sRGB components. Channels may fall
/// outside `0.0..=1.0` for colors outside the sRGB gamut; alpha is always
/// clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub alpha: f64,
}

impl Srgba {
    pub const TRANSPARENT: Srgba = Srgba { r: 0.0, g: 0.0, b: 0.0, alpha: 0.0 };

    fn new(rgb: [f64; 3], alpha: f64) -> Self {
        Srgba {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
            alpha: alpha.clamp(0.0, 1.0),
        }
    }
}

impl From<csscolorparser::Color> for Srgba {
    fn from(c: csscolorparser::Color) -> Self {
        let [r, g, b, a] = c.to_array();
        Srgba::new([r as f64, g as f64, b as f64], a as f64)
    }
}

/// Parse error for color strings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorParseError {
    #[error("Invalid color format: {0}")]
    InvalidFormat(String),
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),
    #[error("Invalid color component: {0}")]
    InvalidComponent(String),
    #[error("Unsupported color function: {0}")]
    UnsupportedFunction(String),
    #[error("Keyword does not denote a fixed color: {0}")]
    Keyword(String),
}

const LEGACY_FUNCTIONS: [&str; 4] = ["rgb", "rgba", "hsl", "hsla"];
const MODERN_FUNCTIONS: [&str; 6] = ["hwb", "lab", "lch", "oklab", "oklch", "color"];

/// Parse any CSS Color 4 color.
pub fn parse(input: &str) -> Result<Srgba, ColorParseError> {
    parse_with(input, true)
}

/// Parse only the legacy color syntaxes.
pub fn parse_legacy(input: &str) -> Result<Srgba, ColorParseError> {
    parse_with(input, false)
}

fn parse_with(input: &str, modern: bool) -> Result<Srgba, ColorParseError> {
    let s = input.trim().to_ascii_lowercase();
    if s.is_empty() {
        return Err(ColorParseError::InvalidFormat(input.to_string()));
    }
    if s == "transparent" {
        return Ok(Srgba::TRANSPARENT);
    }
    if matches!(
        s.as_str(),
        "currentcolor" | "inherit" | "initial" | "unset" | "revert" | "revert-layer" | "none"
    ) {
        return Err(ColorParseError::Keyword(input.to_string()));
    }
    if let Some(hex) = s.strip_prefix('#') {
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidHex(input.to_string()));
        }
        return csscolorparser::parse(&s)
            .map(Srgba::from)
            .map_err(|_| ColorParseError::InvalidHex(input.to_string()));
    }

    let Some(open) = s.find('(') else {
        // named colors
        return csscolorparser::parse(&s)
            .map(Srgba::from)
            .map_err(|_| ColorParseError::InvalidFormat(input.to_string()));
    };
    if !s.ends_with(')') {
        return Err(ColorParseError::InvalidFormat(input.to_string()));
    }
    let name = s[..open].trim();
    let inner = &s[open + 1..s.len() - 1];
    // nested functions (calc(), var(), relative colors) are not resolved here
    if inner.contains('(') || inner.contains(')') {
        return Err(ColorParseError::InvalidFormat(input.to_string()));
    }

    let known = LEGACY_FUNCTIONS.contains(&name) || (modern && MODERN_FUNCTIONS.contains(&name));
    if !known {
        return Err(ColorParseError::UnsupportedFunction(input.to_string()));
    }
    if name == "color" {
        return parse_color_fn(inner, input);
    }

    // missing components resolve to zero
    let args = inner
        .split_whitespace()
        .map(|tok| if tok == "none" { "0" } else { tok })
        .collect::<Vec<_>>()
        .join(" ");
    csscolorparser::parse(&format!("{}({})", name, args))
        .map(Srgba::from)
        .map_err(|_| ColorParseError::InvalidComponent(input.to_string()))
}

/// `color(<space> c1 c2 c3 [/ alpha])`
fn parse_color_fn(inner: &str, input: &str) -> Result<Srgba, ColorParseError> {
    let bad = || ColorParseError::InvalidComponent(input.to_string());
    let (comps, alpha) = match inner.split_once('/') {
        Some((comps, alpha)) => (comps, Some(alpha.trim())),
        None => (inner, None),
    };
    let toks: Vec<&str> = comps.split_whitespace().collect();
    let [space, x, y, z] = toks.as_slice() else {
        return Err(bad());
    };
    let space = PredefinedSpace::from_name(space)
        .ok_or_else(|| ColorParseError::UnsupportedFunction(input.to_string()))?;

    let c = [component(x), component(y), component(z)];
    let [Some(x), Some(y), Some(z)] = c else {
        return Err(bad());
    };
    let alpha = match alpha {
        Some(tok) => component(tok).ok_or_else(bad)?,
        None => 1.0,
    };
    Ok(Srgba::new(space.to_srgb([x, y, z]), alpha))
}

/// A number, a percentage of one, or `none` (zero).
fn component(tok: &str) -> Option<f64> {
    if tok == "none" {
        return Some(0.0);
    }
    let v = match tok.strip_suffix('%') {
        Some(p) => p.parse::<f64>().ok()? / 100.0,
        None => tok.parse::<f64>().ok()?,
    };
    v.is_finite().then_some(v)
}
