//! pagesnap
//!
//! Snapshot a styled node tree, normalize its colors, and export it as a
//! paginated raster document.
//!
//! # Pipeline
//!
//! - **Clone**: the rasterizer builds a detached copy of the capture subtree
//! - **Sync**: computed color styles are copied from the live tree onto the
//!   clone, converted to plain sRGB ([`sync`])
//! - **Scrub**: a second sweep over the clone alone rewrites inherited
//!   colors and clears shadows ([`scrub`])
//! - **Rasterize**: the clone is painted into one bitmap ([`rendering`])
//! - **Paginate**: the bitmap is tiled over fixed-height pages ([`paginate`])
//!   and assembled into a document ([`document`])
//!
//! # Example
//!
//! ```
//! use pagesnap::{BoxRasterizer, ColorNormalizer, Rasterizer, StyleTree};
//! use pagesnap::tree::Rect;
//!
//! let mut live = StyleTree::new();
//! let root = live.add_node(None, "div");
//! live.set_bounds(root, Rect::new(0.0, 0.0, 40.0, 20.0));
//! live.set_computed(root, "background-color", "oklch(0.7 0.1 150)");
//!
//! let normalizer = ColorNormalizer::new();
//! let mut hook = |l: &StyleTree, lr, c: &mut StyleTree, cr| {
//!     pagesnap::sync_styles(l, lr, c, cr, &normalizer);
//!     pagesnap::scrub_colors(c, cr, &normalizer);
//! };
//! let options = Default::default();
//! let image = futures::executor::block_on(
//!     BoxRasterizer::new().rasterize(&live, root, &options, &mut hook),
//! )?;
//! assert_eq!((image.width(), image.height()), (80, 40));
//!
//! let pages = pagesnap::paginate(600.0, 297.0)?;
//! assert_eq!(pages.len(), 3);
//! # Ok::<(), pagesnap::Error>(())
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod color;
pub mod document;
pub mod export;
pub mod paginate;
pub mod properties;
pub mod rendering;
pub mod scrub;
pub mod service;
pub mod sync;
pub mod tree;

pub use color::{ColorNormalizer, Rgba8};
pub use document::{DocumentAssembler, DocumentLayout, PageSize};
#[cfg(feature = "pdf")]
pub use document::PdfAssembler;
pub use export::{
    export_file_name, ExportConfig, ExportNotice, ExportOutcome, ExportRequest, ExportStatus,
    Exporter, RenderedDocument,
};
pub use paginate::{paginate, PageSpec};
pub use rendering::{BoxRasterizer, RasterImage, RasterOptions, Rasterizer};
pub use scrub::{scrub_colors, ScrubReport};
pub use service::ExportService;
pub use sync::{sync_styles, SyncReport};
pub use tree::{NodeId, StyleTree};

/// Build an exporter using the in-crate rasterizer and the PDF assembler.
#[cfg(feature = "pdf")]
pub fn new_pdf_exporter(config: ExportConfig) -> Result<Exporter<BoxRasterizer, PdfAssembler>> {
    Exporter::new(config, BoxRasterizer::new(), PdfAssembler::new())
}
