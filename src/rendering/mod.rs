//! Rasterization boundary
//!
//! The rasterizer is an external capture service: it clones the capture
//! subtree, lets the pipeline customize the clone through a hook, and
//! paints the clone into one bitmap. [`BoxRasterizer`] is a small in-crate
//! implementation with the same limitations as the services this pipeline
//! targets: it only understands legacy sRGB color syntax.

use futures::future::LocalBoxFuture;
use image::RgbaImage;
use sha2::{Digest, Sha256};

use crate::tree::{NodeId, StyleTree};
use crate::{Error, Result};

pub mod paint;
pub mod raster;

pub use raster::BoxRasterizer;

/// Options passed through to the rasterizer
#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    /// Output pixels per CSS pixel
    pub scale: f32,
    /// Fill painted under the whole capture
    pub background: String,
    /// Force `color-scheme: light` on the clone root
    pub force_light_scheme: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: "#ffffff".to_string(),
            force_light_scheme: true,
        }
    }
}

/// Called once with `(live, live_root, clone, clone_root)` after the clone
/// is built and before it is painted.
pub type CloneHook<'a> = dyn FnMut(&StyleTree, NodeId, &mut StyleTree, NodeId) + 'a;

pub trait Rasterizer {
    /// Produce one bitmap of the subtree at `root`.
    ///
    /// The future is polled on the caller's thread; it is not `Send`.
    fn rasterize<'a>(
        &'a self,
        live: &'a StyleTree,
        root: NodeId,
        options: &'a RasterOptions,
        on_clone: &'a mut CloneHook<'a>,
    ) -> LocalBoxFuture<'a, Result<RasterImage>>;
}

/// An immutable RGBA bitmap produced once per export.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixels: RgbaImage,
}

impl RasterImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// SHA-256 over the dimensions and raw pixels, hex encoded.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.width().to_be_bytes());
        hasher.update(self.height().to_be_bytes());
        hasher.update(self.pixels.as_raw());
        hex::encode(hasher.finalize())
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut out = std::io::Cursor::new(Vec::new());
        self.pixels
            .write_to(&mut out, image::ImageFormat::Png)
            .map_err(|e| Error::RenderError(format!("PNG encoding failed: {}", e)))?;
        Ok(out.into_inner())
    }
}
