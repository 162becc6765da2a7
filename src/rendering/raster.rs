/// Box rasterizer: paints node backgrounds and borders into an RGBA bitmap

use futures::future::LocalBoxFuture;
use image::RgbaImage;
use log::debug;
use tiny_skia::{Paint, Pixmap, Transform};

use super::paint::{build_paint_list, PaintCommand};
use super::{CloneHook, RasterImage, RasterOptions, Rasterizer};
use crate::color::{self, parse_legacy, ColorParseError};
use crate::properties::{ColorProperty, PropertyKind};
use crate::tree::{NodeId, StyleTree};
use crate::{Error, Result};

/// Largest bitmap edge the rasterizer will allocate, in pixels.
pub const MAX_DIMENSION: u32 = 1 << 15;

const MODERN_FUNCTIONS: [&str; 6] = ["oklch(", "oklab(", "lab(", "lch(", "hwb(", "color("];

/// Reference [`Rasterizer`].
///
/// Understands only legacy sRGB color syntax: a scrubbed property on the
/// clone that uses a modern color function, a shadow it cannot draw or a
/// non-light color scheme fails the capture with [`Error::RenderError`].
/// Properties it never reads are not checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxRasterizer;

impl BoxRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl Rasterizer for BoxRasterizer {
    fn rasterize<'a>(
        &'a self,
        live: &'a StyleTree,
        root: NodeId,
        options: &'a RasterOptions,
        on_clone: &'a mut CloneHook<'a>,
    ) -> LocalBoxFuture<'a, Result<RasterImage>> {
        Box::pin(async move {
            let (mut clone, clone_root) = live.clone_subtree(root);
            on_clone(live, root, &mut clone, clone_root);
            if options.force_light_scheme {
                clone.set_override(clone_root, "color-scheme", "light");
            }

            validate_clone(&clone, clone_root)?;
            paint(&clone, clone_root, options)
        })
    }
}

/// Check the color values this rasterizer reads from every clone node.
fn validate_clone(tree: &StyleTree, root: NodeId) -> Result<()> {
    for id in tree.descendants(root) {
        let node = tree.node(id);
        let fail = |name: &str, reason: String| {
            Error::RenderError(format!("node {} {}: {}", id.index(), name, reason))
        };
        if let Some(scheme) = node.own_value("color-scheme") {
            check_scheme(scheme).map_err(|r| fail("color-scheme", r))?;
        }
        for property in ColorProperty::SCRUBBED {
            if let Some(value) = node.own_value(property.name()) {
                check_value(property.kind(), value).map_err(|r| fail(property.name(), r))?;
            }
        }
    }
    Ok(())
}

fn check_scheme(value: &str) -> std::result::Result<(), String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "normal" | "light" | "only light" => Ok(()),
        other => Err(format!("unsupported color scheme \"{}\"", other)),
    }
}

fn check_value(kind: PropertyKind, value: &str) -> std::result::Result<(), String> {
    let lower = value.trim().to_ascii_lowercase();
    if lower.is_empty() {
        return Ok(());
    }
    match kind {
        PropertyKind::Shadow => {
            if lower == "none" {
                return Ok(());
            }
            match MODERN_FUNCTIONS.iter().find(|f| lower.contains(*f)) {
                Some(f) => Err(format!("unsupported color function {}) in shadow", f)),
                None => Ok(()),
            }
        }
        // values that are not colors at all (`auto`, `exact`...) are ignored
        PropertyKind::Color => match parse_legacy(&lower) {
            Ok(_) | Err(ColorParseError::Keyword(_)) => Ok(()),
            Err(e) if color::parse(&lower).is_ok() || looks_like_color_function(&lower) => {
                Err(e.to_string())
            }
            Err(_) => Ok(()),
        },
    }
}

fn looks_like_color_function(value: &str) -> bool {
    MODERN_FUNCTIONS.iter().any(|f| value.starts_with(f))
}

fn paint(tree: &StyleTree, root: NodeId, options: &RasterOptions) -> Result<RasterImage> {
    if !(options.scale.is_finite() && options.scale > 0.0) {
        return Err(Error::RenderError(format!("invalid scale {}", options.scale)));
    }
    let bounds = tree
        .node(root)
        .bounds
        .ok_or_else(|| Error::RenderError("capture root has no rendered size".into()))?;
    let width = (bounds.width * options.scale).ceil();
    let height = (bounds.height * options.scale).ceil();
    if !(width >= 1.0 && height >= 1.0) {
        return Err(Error::RenderError(format!(
            "capture root has empty size {}x{}",
            bounds.width, bounds.height
        )));
    }
    if width > MAX_DIMENSION as f32 || height > MAX_DIMENSION as f32 {
        return Err(Error::RenderError(format!(
            "capture of {}x{} px exceeds the {} px limit",
            width, height, MAX_DIMENSION
        )));
    }

    let commands = build_paint_list(tree, root, &options.background, options.scale)?;
    let mut pixmap = Pixmap::new(width as u32, height as u32)
        .ok_or_else(|| Error::RenderError(format!("could not allocate {}x{} pixmap", width, height)))?;
    for cmd in &commands {
        execute(&mut pixmap, cmd);
    }
    debug!(
        "Rasterized {} paint commands into {}x{}",
        commands.len(),
        pixmap.width(),
        pixmap.height()
    );
    Ok(RasterImage::new(to_rgba_image(&pixmap)?))
}

fn execute(pixmap: &mut Pixmap, cmd: &PaintCommand) {
    match *cmd {
        PaintCommand::SolidRect { x, y, width, height, rgba: (r, g, b, a) } => {
            // zero-sized rects paint nothing
            let Some(rect) = tiny_skia::Rect::from_xywh(x as f32, y as f32, width as f32, height as f32) else {
                return;
            };
            let mut paint = Paint::default();
            paint.set_color_rgba8(r, g, b, a);
            paint.anti_alias = false;
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
    }
}

/// Pixmaps store premultiplied alpha; images carry straight alpha.
fn to_rgba_image(pixmap: &Pixmap) -> Result<RgbaImage> {
    let raw: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), raw)
        .ok_or_else(|| Error::RenderError("pixmap size does not match its pixel data".into()))
}
