//! Load a live-tree snapshot from HTML.
//!
//! Each element's inline `style` attribute is taken as its computed style.
//! `left`, `top`, `width` and `height` given in `px` become the element's
//! rendered bounds. The tree is rooted at `<body>`.

use scraper::{ElementRef, Html, Selector};

use super::{NodeId, Rect, StyleTree};
use crate::{Error, Result};

/// Split an inline declaration block into lowercase names and trimmed values.
pub fn parse_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                None
            } else {
                Some((name, value.to_string()))
            }
        })
        .collect()
}

fn px(value: &str) -> Option<f32> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}

fn bounds_from(decls: &[(String, String)]) -> Option<Rect> {
    let get = |name: &str| {
        decls
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| px(v))
    };
    let width = get("width")?;
    let height = get("height")?;
    Some(Rect::new(
        get("left").unwrap_or(0.0),
        get("top").unwrap_or(0.0),
        width,
        height,
    ))
}

impl StyleTree {
    /// Parse an HTML document into a tree rooted at its `<body>`.
    pub fn from_html(html: &str) -> Result<StyleTree> {
        let document = Html::parse_document(html);
        let body_sel = Selector::parse("body")
            .map_err(|e| Error::SnapshotError(format!("Invalid selector: {:?}", e)))?;
        let body = document
            .select(&body_sel)
            .next()
            .unwrap_or_else(|| document.root_element());

        let mut tree = StyleTree::new();
        let mut stack: Vec<(ElementRef, Option<NodeId>)> = vec![(body, None)];
        while let Some((element, parent)) = stack.pop() {
            let value = element.value();
            let id = tree.add_node(parent, value.name());
            if let Some(element_id) = value.attr("id") {
                tree.set_element_id(id, element_id);
            }
            if let Some(style) = value.attr("style") {
                let decls = parse_declarations(style);
                if let Some(bounds) = bounds_from(&decls) {
                    tree.set_bounds(id, bounds);
                }
                for (name, v) in decls {
                    tree.set_computed(id, name, v);
                }
            }
            let children: Vec<_> = element.children().filter_map(ElementRef::wrap).collect();
            for child in children.into_iter().rev() {
                stack.push((child, Some(id)));
            }
        }
        Ok(tree)
    }
}
