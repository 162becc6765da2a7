//! Export orchestration
//!
//! [`Exporter`] drives one export end to end:
//!
//! 1. resolve the capture root in the live tree;
//! 2. ask the rasterizer for a bitmap, synchronizing and scrubbing the clone
//!    from inside its clone hook;
//! 3. lay the bitmap out over pages and hand both to the assembler;
//! 4. write the document under a timestamped name.
//!
//! Every failure is fatal for that export only and is reported once.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use log::{error, info};

use crate::color::ColorNormalizer;
use crate::document::{DocumentAssembler, DocumentLayout, PageSize};
use crate::rendering::{RasterImage, RasterOptions, Rasterizer};
use crate::scrub::{scrub_colors, ScrubReport};
use crate::sync::{sync_styles, SyncReport};
use crate::tree::{NodeId, StyleTree};
use crate::{Error, Result};

/// Configuration for an [`Exporter`].
///
/// ```
/// let cfg = pagesnap::ExportConfig::default();
/// assert_eq!(cfg.page_size.width, 210.0);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Output page size in millimetres
    pub page_size: PageSize,
    /// Options forwarded to the rasterizer
    pub raster: RasterOptions,
    /// Directory the finished document is written to
    pub output_dir: PathBuf,
    /// File name prefix, followed by the export timestamp
    pub file_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            raster: RasterOptions::default(),
            output_dir: PathBuf::from("."),
            file_prefix: "dashboard".to_string(),
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<()> {
        self.page_size.validate()?;
        let scale = self.raster.scale;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(Error::ConfigError(format!(
                "raster scale must be positive and finite, got {}",
                scale
            )));
        }
        if self.file_prefix.is_empty() || self.file_prefix.contains(['/', '\\']) {
            return Err(Error::ConfigError(format!(
                "invalid file prefix {:?}",
                self.file_prefix
            )));
        }
        Ok(())
    }
}

/// What to capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportRequest {
    /// Element id of the capture root; `None` captures the whole tree
    pub target: Option<String>,
}

impl ExportRequest {
    pub fn whole_tree() -> Self {
        Self { target: None }
    }

    pub fn element(id: impl Into<String>) -> Self {
        Self {
            target: Some(id.into()),
        }
    }

    fn describe(&self) -> &str {
        self.target.as_deref().unwrap_or("<root>")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportStatus {
    #[default]
    Idle,
    Exporting,
}

/// Terminal notification, emitted exactly once per export.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportNotice {
    Succeeded { path: PathBuf, pages: usize },
    Failed { message: String },
}

/// A document rendered in memory but not yet written.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub layout: DocumentLayout,
    pub image: RasterImage,
    pub sync: SyncReport,
    pub scrub: ScrubReport,
}

#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub page_count: usize,
    pub bytes: usize,
    /// SHA-256 of the rasterized image
    pub digest: String,
    /// The bitmap the document was assembled from
    pub image: RasterImage,
    pub sync: SyncReport,
    pub scrub: ScrubReport,
    pub elapsed: Duration,
}

type OnStatusHandler = Arc<dyn Fn(ExportStatus) + Send + Sync>;
type OnNoticeHandler = Arc<dyn Fn(&ExportNotice) + Send + Sync>;

/// `<prefix>-<unix millis>.<extension>`
pub fn export_file_name(prefix: &str, at: SystemTime, extension: &str) -> String {
    let millis = at
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{}-{}.{}", prefix, millis, extension)
}

pub struct Exporter<R, D> {
    config: ExportConfig,
    rasterizer: R,
    assembler: D,
    normalizer: ColorNormalizer,
    status: ExportStatus,
    on_status: Option<OnStatusHandler>,
    on_notice: Option<OnNoticeHandler>,
}

impl<R: Rasterizer, D: DocumentAssembler> Exporter<R, D> {
    pub fn new(config: ExportConfig, rasterizer: R, assembler: D) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rasterizer,
            assembler,
            normalizer: ColorNormalizer::new(),
            status: ExportStatus::Idle,
            on_status: None,
            on_notice: None,
        })
    }

    /// Replace the color normalizer, e.g. one built with a custom surface
    /// factory.
    pub fn with_normalizer(mut self, normalizer: ColorNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn status(&self) -> ExportStatus {
        self.status
    }

    /// Register a callback invoked on every status transition.
    pub fn on_status<F>(&mut self, cb: F)
    where
        F: Fn(ExportStatus) + Send + Sync + 'static,
    {
        self.on_status = Some(Arc::new(cb));
    }

    pub fn clear_on_status(&mut self) {
        self.on_status = None;
    }

    /// Register a callback invoked with the terminal notice of each export.
    pub fn on_notice<F>(&mut self, cb: F)
    where
        F: Fn(&ExportNotice) + Send + Sync + 'static,
    {
        self.on_notice = Some(Arc::new(cb));
    }

    pub fn clear_on_notice(&mut self) {
        self.on_notice = None;
    }

    fn resolve_target(live: &StyleTree, request: &ExportRequest) -> Result<NodeId> {
        let found = match &request.target {
            Some(id) => live.find_by_element_id(id),
            None => live.root(),
        };
        found.ok_or_else(|| Error::MissingTarget(request.describe().to_string()))
    }

    /// Run the pipeline up to an in-memory document.
    pub async fn render_document(
        &self,
        live: &StyleTree,
        request: &ExportRequest,
    ) -> Result<RenderedDocument> {
        let root = Self::resolve_target(live, request)?;

        let normalizer = &self.normalizer;
        let mut sync = None;
        let mut scrub = None;
        let mut hook = |live: &StyleTree, live_root: NodeId, clone: &mut StyleTree, clone_root: NodeId| {
            sync = Some(sync_styles(live, live_root, clone, clone_root, normalizer));
            scrub = Some(scrub_colors(clone, clone_root, normalizer));
        };

        let image = self
            .rasterizer
            .rasterize(live, root, &self.config.raster, &mut hook)
            .await?;
        let layout = DocumentLayout::for_image(&image, self.config.page_size)?;
        let bytes = self.assembler.assemble(&layout, &image)?;

        Ok(RenderedDocument {
            bytes,
            layout,
            image,
            sync: sync.unwrap_or_default(),
            scrub: scrub.unwrap_or_default(),
        })
    }

    /// Run one export and write the document to the output directory.
    ///
    /// Status goes `Exporting` then back to `Idle`, and exactly one notice
    /// is emitted, whatever the outcome. On failure nothing is written.
    pub async fn export(&mut self, live: &StyleTree, request: &ExportRequest) -> Result<ExportOutcome> {
        self.set_status(ExportStatus::Exporting);
        let result = self.run(live, request).await;
        self.normalizer.clear_cache();
        self.set_status(ExportStatus::Idle);

        let notice = match &result {
            Ok(outcome) => ExportNotice::Succeeded {
                path: outcome.path.clone(),
                pages: outcome.page_count,
            },
            Err(e) => {
                error!("Export of {} failed: {}", request.describe(), e);
                ExportNotice::Failed {
                    message: e.to_string(),
                }
            }
        };
        if let Some(cb) = &self.on_notice {
            cb(&notice);
        }
        result
    }

    async fn run(&self, live: &StyleTree, request: &ExportRequest) -> Result<ExportOutcome> {
        let t0 = Instant::now();
        let doc = self.render_document(live, request).await?;
        let t_render = t0.elapsed();

        let name = export_file_name(
            &self.config.file_prefix,
            SystemTime::now(),
            self.assembler.extension(),
        );
        let path = unused_path(self.config.output_dir.join(name));
        persist(&path, &doc.bytes)?;
        let elapsed = t0.elapsed();

        info!(
            "Exported {} page(s) to {} ({} bytes): render={:.1}ms, write={:.1}ms",
            doc.layout.page_count(),
            path.display(),
            doc.bytes.len(),
            t_render.as_secs_f64() * 1000.0,
            (elapsed - t_render).as_secs_f64() * 1000.0,
        );

        Ok(ExportOutcome {
            path,
            page_count: doc.layout.page_count(),
            bytes: doc.bytes.len(),
            digest: doc.image.digest(),
            image: doc.image,
            sync: doc.sync,
            scrub: doc.scrub,
            elapsed,
        })
    }

    fn set_status(&mut self, status: ExportStatus) {
        self.status = status;
        if let Some(cb) = &self.on_status {
            cb(status);
        }
    }
}

/// Two exports in the same millisecond get `-1`, `-2`... suffixes.
fn unused_path(path: PathBuf) -> PathBuf {
    if !path.exists() {
        return path;
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut n = 1;
    loop {
        let candidate = path.with_file_name(format!("{}-{}.{}", stem, n, ext));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Write through a temporary sibling so a failed write leaves no document.
fn persist(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let partial = path.with_extension("part");
    let written = std::fs::write(&partial, bytes).and_then(|_| std::fs::rename(&partial, path));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&partial);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::BoxRasterizer;
    use crate::tree::Rect;
    use std::sync::Mutex;

    struct StubAssembler;

    impl DocumentAssembler for StubAssembler {
        fn extension(&self) -> &'static str {
            "bin"
        }

        fn assemble(&self, layout: &DocumentLayout, _image: &RasterImage) -> Result<Vec<u8>> {
            Ok(vec![0u8; layout.page_count()])
        }
    }

    fn out_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pagesnap-export-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn live() -> StyleTree {
        let mut t = StyleTree::new();
        let root = t.add_node(None, "body");
        t.set_bounds(root, Rect::new(0.0, 0.0, 300.0, 900.0));
        let chart = t.add_node(Some(root), "section");
        t.set_element_id(chart, "chart");
        t.set_bounds(chart, Rect::new(0.0, 0.0, 210.0, 600.0));
        t.set_computed(chart, "background-color", "oklch(0.9 0.05 250)");
        t
    }

    fn exporter(dir: &Path) -> Exporter<BoxRasterizer, StubAssembler> {
        let config = ExportConfig {
            output_dir: dir.to_path_buf(),
            raster: RasterOptions {
                scale: 1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        Exporter::new(config, BoxRasterizer::new(), StubAssembler).unwrap()
    }

    #[test]
    fn file_name_embeds_unix_millis() {
        let at = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        assert_eq!(export_file_name("dashboard", at, "pdf"), "dashboard-1700000000123.pdf");
    }

    #[test]
    fn config_validation() {
        let mut cfg = ExportConfig::default();
        cfg.raster.scale = 0.0;
        assert!(matches!(cfg.validate(), Err(Error::ConfigError(_))));
        let mut cfg = ExportConfig::default();
        cfg.file_prefix = "../x".into();
        assert!(cfg.validate().is_err());
    }

    #[tokio::test]
    async fn export_writes_document_and_reports() {
        let dir = out_dir("ok");
        let mut exporter = exporter(&dir);
        let statuses = Arc::new(Mutex::new(Vec::new()));
        let notices = Arc::new(Mutex::new(Vec::new()));
        let s = statuses.clone();
        exporter.on_status(move |st| s.lock().unwrap().push(st));
        let n = notices.clone();
        exporter.on_notice(move |notice| n.lock().unwrap().push(notice.clone()));

        let outcome = exporter
            .export(&live(), &ExportRequest::element("chart"))
            .await
            .unwrap();

        // 210 px wide on a 210 mm page: 600 px -> 600 mm -> 3 pages
        assert_eq!(outcome.page_count, 3);
        assert_eq!(std::fs::read(&outcome.path).unwrap().len(), 3);
        assert!(outcome.sync.is_complete());
        assert_eq!(exporter.status(), ExportStatus::Idle);
        assert_eq!(
            *statuses.lock().unwrap(),
            vec![ExportStatus::Exporting, ExportStatus::Idle]
        );
        assert_eq!(notices.lock().unwrap().len(), 1);
        assert_eq!(outcome.image.digest(), outcome.digest);
        // conversions are not retained between exports
        assert_eq!(exporter.normalizer.cached_len(), 0);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_target_fails_without_writing() {
        let dir = out_dir("missing");
        let mut exporter = exporter(&dir);
        let notices = Arc::new(Mutex::new(Vec::new()));
        let n = notices.clone();
        exporter.on_notice(move |notice| n.lock().unwrap().push(notice.clone()));

        let err = exporter
            .export(&live(), &ExportRequest::element("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingTarget(_)));
        assert!(!dir.exists());
        assert_eq!(exporter.status(), ExportStatus::Idle);

        {
            let notices = notices.lock().unwrap();
            assert_eq!(notices.len(), 1);
            assert!(matches!(notices[0], ExportNotice::Failed { .. }));
        }

        let empty = exporter
            .export(&StyleTree::new(), &ExportRequest::whole_tree())
            .await;
        assert!(matches!(empty, Err(Error::MissingTarget(_))));
        assert_eq!(notices.lock().unwrap().len(), 2);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn render_document_leaves_live_tree_untouched() {
        let dir = out_dir("render");
        let exporter = exporter(&dir);
        let live = live();
        let before = format!("{:?}", live);
        let doc = exporter
            .render_document(&live, &ExportRequest::whole_tree())
            .await
            .unwrap();
        assert_eq!(format!("{:?}", live), before);
        assert_eq!((doc.image.width(), doc.image.height()), (300, 900));
        assert!(doc.scrub.nodes_scrubbed >= 2);
        assert!(!dir.exists());
    }
}
