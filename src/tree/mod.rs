//! Styled node trees
//!
//! A [`StyleTree`] is an arena of [`StyledNode`]s addressed by [`NodeId`].
//! The live tree handed to an export and the clone produced for
//! rasterization are both `StyleTree`s; nodes in the two trees are related
//! by position among their siblings, never by id.
//!
//! Each node carries two style maps:
//!
//! - the *computed* map, the resolved values the live renderer reports for
//!   that node (only the properties it explicitly enumerates);
//! - the *override* map, written by the export pipeline. Overrides win over
//!   computed values and never modify the computed map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::properties;

#[cfg(feature = "html")]
pub mod html;
pub mod snapshot;

pub use snapshot::SnapshotNode;

/// Index of a node inside one [`StyleTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index
    pub fn index(self) -> usize {
        self.0
    }
}

/// Rendered geometry of a node in CSS pixels, relative to the page origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// A single visual element.
#[derive(Debug, Clone, Default)]
pub struct StyledNode {
    /// Element name, e.g. `div`
    pub tag: String,
    /// Element id used to look up capture targets
    pub element_id: Option<String>,
    /// Rendered bounds as reported by the live renderer
    pub bounds: Option<Rect>,
    computed: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl StyledNode {
    /// Computed style entries in property-name order
    pub fn computed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.computed.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Override style entries in property-name order
    pub fn overrides(&self) -> impl Iterator<Item = (&str, &str)> {
        self.overrides.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn computed_value(&self, name: &str) -> Option<&str> {
        self.computed.get(name).map(String::as_str)
    }

    pub fn override_value(&self, name: &str) -> Option<&str> {
        self.overrides.get(name).map(String::as_str)
    }

    /// Override if present, otherwise the computed value.
    pub fn own_value(&self, name: &str) -> Option<&str> {
        self.override_value(name).or_else(|| self.computed_value(name))
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Arena-backed tree of styled nodes. The first node added is the root.
///
/// Node ids are only meaningful for the tree that issued them; indexing a
/// tree with a foreign id panics or addresses an unrelated node.
#[derive(Debug, Clone, Default)]
pub struct StyleTree {
    nodes: Vec<StyledNode>,
}

impl StyleTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a node. `parent = None` is only meaningful for the first node;
    /// later parentless nodes are detached and unreachable from the root.
    pub fn add_node(&mut self, parent: Option<NodeId>, tag: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(StyledNode {
            tag: tag.into(),
            parent,
            ..Default::default()
        });
        if let Some(p) = parent {
            self.nodes[p.0].children.push(id);
        }
        id
    }

    pub fn node(&self, id: NodeId) -> &StyledNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut StyledNode {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn set_element_id(&mut self, id: NodeId, element_id: impl Into<String>) {
        self.nodes[id.0].element_id = Some(element_id.into());
    }

    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) {
        self.nodes[id.0].bounds = Some(bounds);
    }

    pub fn set_computed(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) {
        self.nodes[id.0].computed.insert(name.into(), value.into());
    }

    /// Write an override. An empty value removes any existing override,
    /// mirroring how clearing an inline declaration behaves.
    pub fn set_override(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        let overrides = &mut self.nodes[id.0].overrides;
        if value.is_empty() {
            overrides.remove(name);
        } else {
            overrides.insert(name.to_string(), value);
        }
    }

    /// The value the node would report for `name`: its override, else its
    /// computed value, else (for inherited properties) the parent's resolved
    /// value, else the empty string.
    pub fn resolved_value(&self, id: NodeId, name: &str) -> &str {
        let mut current = Some(id);
        while let Some(cur) = current {
            let node = &self.nodes[cur.0];
            if let Some(v) = node.own_value(name) {
                return v;
            }
            if !properties::is_inherited(name) {
                break;
            }
            current = node.parent;
        }
        ""
    }

    /// First node (in pre-order) whose element id equals `element_id`.
    pub fn find_by_element_id(&self, element_id: &str) -> Option<NodeId> {
        let root = self.root()?;
        self.descendants(root)
            .find(|id| self.nodes[id.0].element_id.as_deref() == Some(element_id))
    }

    /// Pre-order iterator over `root` and everything below it.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![root],
        }
    }

    /// Detached structural copy of the subtree at `root`.
    ///
    /// Computed and override maps are copied verbatim. The copy's root also
    /// receives the inherited color-bearing values it would otherwise lose by
    /// being detached from its ancestors.
    pub fn clone_subtree(&self, root: NodeId) -> (StyleTree, NodeId) {
        let mut out = StyleTree::new();
        let mut stack: Vec<(NodeId, Option<NodeId>)> = vec![(root, None)];
        while let Some((src, parent)) = stack.pop() {
            let node = &self.nodes[src.0];
            let id = out.add_node(parent, node.tag.clone());
            {
                let dst = &mut out.nodes[id.0];
                dst.element_id = node.element_id.clone();
                dst.bounds = node.bounds;
                dst.computed = node.computed.clone();
                dst.overrides = node.overrides.clone();
            }
            for child in node.children.iter().rev() {
                stack.push((*child, Some(id)));
            }
        }

        let clone_root = NodeId(0);
        if let Some(parent) = self.nodes[root.0].parent {
            for name in properties::INHERITED_COLOR_PROPERTIES {
                if out.nodes[0].own_value(name).is_some() {
                    continue;
                }
                let inherited = self.resolved_value(parent, name);
                if !inherited.is_empty() {
                    out.set_computed(clone_root, *name, inherited);
                }
            }
        }
        (out, clone_root)
    }
}

/// Pre-order traversal driven by an explicit stack.
pub struct Descendants<'a> {
    tree: &'a StyleTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.nodes[id.0].children.iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (StyleTree, NodeId, NodeId, NodeId) {
        let mut t = StyleTree::new();
        let root = t.add_node(None, "body");
        let a = t.add_node(Some(root), "section");
        let b = t.add_node(Some(a), "span");
        (t, root, a, b)
    }

    #[test]
    fn descendants_are_pre_order() {
        let mut t = StyleTree::new();
        let root = t.add_node(None, "div");
        let a = t.add_node(Some(root), "a");
        let a1 = t.add_node(Some(a), "a1");
        let b = t.add_node(Some(root), "b");
        let order: Vec<_> = t.descendants(root).collect();
        assert_eq!(order, vec![root, a, a1, b]);
    }

    #[test]
    fn resolved_value_prefers_override_then_computed() {
        let (mut t, _, a, _) = sample();
        t.set_computed(a, "background-color", "red");
        assert_eq!(t.resolved_value(a, "background-color"), "red");
        t.set_override(a, "background-color", "blue");
        assert_eq!(t.resolved_value(a, "background-color"), "blue");
        assert_eq!(t.node(a).computed_value("background-color"), Some("red"));
        t.set_override(a, "background-color", "");
        assert_eq!(t.resolved_value(a, "background-color"), "red");
    }

    #[test]
    fn inherited_properties_walk_ancestors() {
        let (mut t, root, _, b) = sample();
        t.set_computed(root, "color", "lab(50 20 10)");
        t.set_computed(root, "background-color", "white");
        assert_eq!(t.resolved_value(b, "color"), "lab(50 20 10)");
        assert_eq!(t.resolved_value(b, "background-color"), "");
    }

    #[test]
    fn find_by_element_id_searches_whole_tree() {
        let (mut t, _, _, b) = sample();
        t.set_element_id(b, "chart");
        assert_eq!(t.find_by_element_id("chart"), Some(b));
        assert_eq!(t.find_by_element_id("missing"), None);
        assert_eq!(StyleTree::new().find_by_element_id("chart"), None);
    }

    #[test]
    fn clone_subtree_is_isomorphic_and_detached() {
        let (mut t, root, a, b) = sample();
        t.set_computed(root, "color", "oklch(0.5 0.1 200)");
        t.set_computed(a, "box-shadow", "none");
        t.set_computed(b, "color", "red");
        t.set_bounds(a, Rect::new(0.0, 0.0, 100.0, 50.0));

        let (clone, croot) = t.clone_subtree(a);
        assert_eq!(clone.len(), 2);
        assert_eq!(clone.node(croot).parent(), None);
        assert_eq!(clone.children(croot).len(), 1);
        assert_eq!(clone.node(croot).bounds, Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
        // inherited color is materialized on the detached root
        assert_eq!(clone.node(croot).computed_value("color"), Some("oklch(0.5 0.1 200)"));
        let cchild = clone.children(croot)[0];
        assert_eq!(clone.node(cchild).computed_value("color"), Some("red"));
        // live tree untouched
        assert_eq!(t.node(a).computed_value("color"), None);
    }
}
