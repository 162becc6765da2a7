//! JSON snapshots of a live tree
//!
//! A snapshot is the nested form a host renderer dumps:
//!
//! ```json
//! { "tag": "div", "id": "dashboard",
//!   "bounds": { "x": 0, "y": 0, "width": 800, "height": 1200 },
//!   "style": { "background-color": "oklch(0.98 0.01 250)" },
//!   "children": [ ... ] }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{NodeId, Rect, StyleTree};
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotNode {
    pub tag: String,
    pub id: Option<String>,
    pub bounds: Option<Rect>,
    /// Computed style as enumerated by the live renderer
    pub style: BTreeMap<String, String>,
    pub children: Vec<SnapshotNode>,
}

impl StyleTree {
    /// Build an arena tree from a nested snapshot.
    pub fn from_snapshot(root: &SnapshotNode) -> StyleTree {
        let mut tree = StyleTree::new();
        let mut stack: Vec<(&SnapshotNode, Option<NodeId>)> = vec![(root, None)];
        while let Some((snap, parent)) = stack.pop() {
            let tag = if snap.tag.is_empty() { "div" } else { snap.tag.as_str() };
            let id = tree.add_node(parent, tag);
            if let Some(element_id) = &snap.id {
                tree.set_element_id(id, element_id.clone());
            }
            if let Some(bounds) = snap.bounds {
                tree.set_bounds(id, bounds);
            }
            for (name, value) in &snap.style {
                tree.set_computed(id, name.to_ascii_lowercase(), value.clone());
            }
            for child in snap.children.iter().rev() {
                stack.push((child, Some(id)));
            }
        }
        tree
    }

    /// Parse a JSON snapshot. Nesting depth is bounded only by memory.
    pub fn from_json(json: &str) -> Result<StyleTree> {
        let mut de = serde_json::Deserializer::from_str(json);
        de.disable_recursion_limit();
        let root = SnapshotNode::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        Ok(StyleTree::from_snapshot(&root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_json_preserves_child_order_and_styles() {
        let json = r#"{
            "tag": "main", "id": "dash",
            "bounds": {"x": 0, "y": 0, "width": 400, "height": 900},
            "style": {"Background-Color": "oklch(0.9 0.02 120)"},
            "children": [
                {"tag": "h1", "style": {"color": "black"}},
                {"id": "chart", "children": [{"tag": "svg"}]}
            ]
        }"#;
        let tree = StyleTree::from_json(json).unwrap();
        let root = tree.root().unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.node(root).tag, "main");
        assert_eq!(
            tree.node(root).computed_value("background-color"),
            Some("oklch(0.9 0.02 120)")
        );
        let kids = tree.children(root);
        assert_eq!(tree.node(kids[0]).tag, "h1");
        assert_eq!(tree.node(kids[1]).tag, "div");
        assert_eq!(tree.find_by_element_id("chart"), Some(kids[1]));
        assert_eq!(tree.node(root).bounds.map(|b| b.height), Some(900.0));
    }

    #[test]
    fn from_json_rejects_garbage() {
        let err = StyleTree::from_json("{not json").unwrap_err();
        assert!(matches!(err, crate::Error::SnapshotError(_)));
        let err = StyleTree::from_json(r#"{"tag": "div"} trailing"#).unwrap_err();
        assert!(matches!(err, crate::Error::SnapshotError(_)));
    }

    #[test]
    fn from_json_loads_deeply_nested_snapshots() {
        let depth = 300;
        let mut json = String::new();
        for _ in 0..depth {
            json.push_str(r#"{"tag":"div","children":["#);
        }
        json.push_str(r#"{"tag":"span"}"#);
        for _ in 0..depth {
            json.push_str("]}");
        }
        let tree = StyleTree::from_json(&json).unwrap();
        assert_eq!(tree.len(), depth + 1);
        let leaf = tree.descendants(tree.root().unwrap()).last().unwrap();
        assert_eq!(tree.node(leaf).tag, "span");
    }
}
