//! Color normalization onto a lazily created scratch surface

use std::cell::RefCell;
use std::collections::HashMap;

use log::{trace, warn};

use super::{parse, ColorSurface};
use crate::Result;

/// Constructor for the scratch surface, called at most once per normalizer.
pub type SurfaceFactory = fn() -> Result<ColorSurface>;

enum SurfaceSlot {
    Uninitialized,
    Ready(ColorSurface),
    Unavailable,
}

/// Maps any color string the live renderer accepts onto an 8-bit sRGB
/// `rgb()` / `rgba()` string.
///
/// The normalizer owns a lazily created [`ColorSurface`]. It is confined to
/// one thread: interior `RefCell` state makes the type `!Sync`, so
/// concurrent exports must each own a normalizer or go through
/// [`crate::service::ExportService`], which serializes them.
///
/// Normalization never fails. Empty strings and `transparent` pass through,
/// values that do not parse as a single color pass through, and if the
/// surface cannot be created every value passes through.
pub struct ColorNormalizer {
    factory: SurfaceFactory,
    slot: RefCell<SurfaceSlot>,
    memo: RefCell<HashMap<String, String>>,
}

impl ColorNormalizer {
    pub fn new() -> Self {
        Self::with_factory(ColorSurface::create)
    }

    pub fn with_factory(factory: SurfaceFactory) -> Self {
        Self {
            factory,
            slot: RefCell::new(SurfaceSlot::Uninitialized),
            memo: RefCell::new(HashMap::new()),
        }
    }

    /// Whether a surface is (or can be) available. Initializes it if needed.
    pub fn is_available(&self) -> bool {
        self.ensure_surface();
        matches!(*self.slot.borrow(), SurfaceSlot::Ready(_))
    }

    pub fn normalize(&self, value: &str) -> String {
        if value.is_empty() || value == "transparent" {
            return value.to_string();
        }
        if let Some(hit) = self.memo.borrow().get(value) {
            return hit.clone();
        }
        let out = self.convert(value);
        self.memo.borrow_mut().insert(value.to_string(), out.clone());
        out
    }

    /// Drop memoized conversions. The surface is kept.
    pub fn clear_cache(&self) {
        self.memo.borrow_mut().clear();
    }

    pub fn cached_len(&self) -> usize {
        self.memo.borrow().len()
    }

    fn ensure_surface(&self) {
        let mut slot = self.slot.borrow_mut();
        if let SurfaceSlot::Uninitialized = *slot {
            *slot = match (self.factory)() {
                Ok(surface) => SurfaceSlot::Ready(surface),
                Err(e) => {
                    warn!("{}; colors will pass through unchanged", e);
                    SurfaceSlot::Unavailable
                }
            };
        }
    }

    fn convert(&self, value: &str) -> String {
        self.ensure_surface();
        let mut slot = self.slot.borrow_mut();
        let surface = match &mut *slot {
            SurfaceSlot::Ready(surface) => surface,
            _ => return value.to_string(),
        };
        match parse(value) {
            Ok(color) => surface.quantize(color).to_string(),
            Err(e) => {
                trace!("Leaving {:?} unchanged: {}", value, e);
                value.to_string()
            }
        }
    }
}

impl Default for ColorNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn no_surface() -> Result<ColorSurface> {
        Err(Error::SurfaceUnavailable("headless test".into()))
    }

    #[test]
    fn sentinels_pass_through() {
        let n = ColorNormalizer::new();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("transparent"), "transparent");
    }

    #[test]
    fn converts_modern_spaces() {
        let n = ColorNormalizer::new();
        assert_eq!(n.normalize("oklch(0 0 0)"), "rgb(0, 0, 0)");
        assert_eq!(n.normalize("color(srgb 0 0 1 / 0.5)"), "rgba(0, 0, 255, 0.502)");
        assert_eq!(n.normalize("#FFF"), "rgb(255, 255, 255)");
    }

    #[test]
    fn malformed_values_pass_through() {
        let n = ColorNormalizer::new();
        assert_eq!(n.normalize("oklch(banana)"), "oklch(banana)");
        assert_eq!(n.normalize("currentcolor"), "currentcolor");
        assert_eq!(n.normalize("0 0 4px lab(50 0 0)"), "0 0 4px lab(50 0 0)");
    }

    #[test]
    fn normalization_is_idempotent() {
        let n = ColorNormalizer::new();
        for c in [
            "oklch(0.7 0.15 140)",
            "lab(40 30 -20 / 0.3)",
            "hsl(200 50% 40% / 10%)",
            "color(display-p3 0.2 0.9 0.4)",
            "rgba(1, 2, 3, 0.777)",
            "hwb(300 10% 20%)",
        ] {
            let once = n.normalize(c);
            assert_eq!(n.normalize(&once), once, "input {}", c);
        }
    }

    #[test]
    fn missing_surface_degrades_to_pass_through() {
        let n = ColorNormalizer::with_factory(no_surface);
        assert!(!n.is_available());
        assert_eq!(n.normalize("oklch(1 0 0)"), "oklch(1 0 0)");
        assert_eq!(n.normalize("red"), "red");
    }

    #[test]
    fn clearing_the_cache_keeps_results() {
        let n = ColorNormalizer::new();
        let first = n.normalize("lab(40 30 -20)");
        n.normalize("hwb(300 10% 20%)");
        assert_eq!(n.cached_len(), 2);
        n.clear_cache();
        assert_eq!(n.cached_len(), 0);
        assert!(n.is_available());
        assert_eq!(n.normalize("lab(40 30 -20)"), first);
    }

    #[test]
    fn surface_is_created_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        fn counting() -> Result<ColorSurface> {
            CALLS.fetch_add(1, Ordering::SeqCst);
            ColorSurface::create()
        }
        let n = ColorNormalizer::with_factory(counting);
        n.normalize("red");
        n.normalize("blue");
        n.normalize("lab(1 2 3)");
        assert!(n.is_available());
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }
}
