//! Slicing one tall image into fixed-height pages

use crate::{Error, Result};

/// Most pages one export may produce.
pub const MAX_PAGES: usize = 10_000;

/// Placement of the full image on one output page.
///
/// `offset` is where the top of the image sits relative to the top of the
/// page, in document units. It is `0` on the first page and grows more
/// negative by one page height per page, so each page shows the next slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSpec {
    pub index: usize,
    pub offset: f64,
}

/// Tile an image of `image_height` across pages of `page_height`.
///
/// Produces `ceil(image_height / page_height)` pages; the last one may only
/// be partly covered. A non-positive (or NaN) image height yields no pages.
pub fn paginate(image_height: f64, page_height: f64) -> Result<Vec<PageSpec>> {
    if !(page_height.is_finite() && page_height > 0.0) {
        return Err(Error::ConfigError(format!(
            "page height must be positive and finite, got {}",
            page_height
        )));
    }
    if !(image_height > 0.0) {
        return Ok(Vec::new());
    }
    if !image_height.is_finite() {
        return Err(Error::ConfigError("image height is not finite".into()));
    }
    let estimate = (image_height / page_height).ceil();
    if estimate > MAX_PAGES as f64 {
        return Err(Error::ConfigError(format!(
            "{} over {} needs {} pages, more than the {} page limit",
            image_height, page_height, estimate, MAX_PAGES
        )));
    }

    let mut pages = Vec::new();
    let mut index = 0usize;
    loop {
        pages.push(PageSpec {
            index,
            offset: -(page_height * index as f64),
        });
        let consumed = page_height * (index + 1) as f64;
        if consumed >= image_height {
            break;
        }
        index += 1;
    }
    Ok(pages)
}
