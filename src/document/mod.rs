//! Paginated document assembly
//!
//! The rasterized image is scaled to the page width and tiled vertically:
//! every page places the *whole* image at that page's offset and the page
//! box crops it. Units here are millimetres.

use serde::{Deserialize, Serialize};

use crate::paginate::{paginate, PageSpec};
use crate::rendering::RasterImage;
use crate::{Error, Result};

#[cfg(feature = "pdf")]
pub mod pdf;

#[cfg(feature = "pdf")]
pub use pdf::PdfAssembler;

/// Page dimensions in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width: 210.0,
        height: 297.0,
    };

    pub fn validate(&self) -> Result<()> {
        for (what, v) in [("width", self.width), ("height", self.height)] {
            if !(v.is_finite() && v > 0.0) {
                return Err(Error::ConfigError(format!(
                    "page {} must be positive and finite, got {}",
                    what, v
                )));
            }
        }
        Ok(())
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Where the image lands on each page.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub page_size: PageSize,
    /// Image height once scaled to the page width
    pub image_height: f64,
    pub pages: Vec<PageSpec>,
}

impl DocumentLayout {
    pub fn for_image(image: &RasterImage, page_size: PageSize) -> Result<Self> {
        page_size.validate()?;
        if image.width() == 0 {
            return Err(Error::RenderError("rasterized image has zero width".into()));
        }
        let image_height = image.height() as f64 * page_size.width / image.width() as f64;
        let pages = paginate(image_height, page_size.height)?;
        Ok(Self {
            page_size,
            image_height,
            pages,
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Builds the serialized document from a layout and its image.
pub trait DocumentAssembler {
    /// Short name of the produced format, e.g. `pdf`
    fn extension(&self) -> &'static str;

    fn assemble(&self, layout: &DocumentLayout, image: &RasterImage) -> Result<Vec<u8>>;
}
