/// Paint commands built from a normalized clone tree

use crate::color::{parse_legacy, ColorParseError, Srgba};
use crate::tree::{NodeId, Rect, StyleTree};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: (u8, u8, u8, u8),
    },
}

const EDGES: [&str; 4] = ["top", "right", "bottom", "left"];

fn to_rgba(c: Srgba) -> (u8, u8, u8, u8) {
    let q = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    (q(c.r), q(c.g), q(c.b), q(c.alpha))
}

fn px(value: &str) -> Option<f32> {
    let v = value.trim();
    let v = v.strip_suffix("px").unwrap_or(v);
    v.trim().parse::<f32>().ok().filter(|w| *w > 0.0)
}

/// Keywords such as `currentcolor` paint nothing; anything else that does
/// not parse is an error.
fn node_color(name: &str, value: &str) -> Result<Option<Srgba>> {
    match parse_legacy(value) {
        Ok(c) => Ok(Some(c)),
        Err(ColorParseError::Keyword(_)) => Ok(None),
        Err(e) => Err(Error::RenderError(format!("{}: {}", name, e))),
    }
}

fn rect(x: f32, y: f32, w: f32, h: f32, scale: f32, rgba: (u8, u8, u8, u8)) -> PaintCommand {
    PaintCommand::SolidRect {
        x: (x * scale).round() as i32,
        y: (y * scale).round() as i32,
        width: (w * scale).round().max(0.0) as u32,
        height: (h * scale).round().max(0.0) as u32,
        rgba,
    }
}

/// Build the paint list for the subtree at `root`: the page background,
/// then per node (pre-order) its background rectangle and border edges.
///
/// Node positions are made relative to the root's bounds. Nodes without
/// bounds paint nothing but their children still do.
pub fn build_paint_list(
    tree: &StyleTree,
    root: NodeId,
    background: &str,
    scale: f32,
) -> Result<Vec<PaintCommand>> {
    let origin = tree
        .node(root)
        .bounds
        .ok_or_else(|| Error::RenderError("capture root has no rendered size".into()))?;

    let fill = parse_legacy(background)
        .map_err(|e| Error::RenderError(format!("background fill: {}", e)))?;
    let mut commands = vec![rect(0.0, 0.0, origin.width, origin.height, scale, to_rgba(fill))];

    for id in tree.descendants(root) {
        let node = tree.node(id);
        let Some(b) = node.bounds else {
            continue;
        };
        let local = Rect::new(b.x - origin.x, b.y - origin.y, b.width, b.height);

        if let Some(bg) = node.own_value("background-color") {
            if let Some(c) = node_color("background-color", bg)?.filter(|c| c.alpha > 0.0) {
                commands.push(rect(local.x, local.y, local.width, local.height, scale, to_rgba(c)));
            }
        }

        for edge in EDGES {
            let Some(width) = node.own_value(&format!("border-{}-width", edge)).and_then(px) else {
                continue;
            };
            let Some(color) = node.own_value(&format!("border-{}-color", edge)) else {
                continue;
            };
            let Some(c) = node_color(&format!("border-{}-color", edge), color)? else {
                continue;
            };
            let rgba = to_rgba(c);
            let cmd = match edge {
                "top" => rect(local.x, local.y, local.width, width, scale, rgba),
                "bottom" => rect(local.x, local.y + local.height - width, local.width, width, scale, rgba),
                "left" => rect(local.x, local.y, width, local.height, scale, rgba),
                _ => rect(local.x + local.width - width, local.y, width, local.height, scale, rgba),
            };
            commands.push(cmd);
        }
    }

    Ok(commands)
}
