//! Deep color scrubbing of a clone tree
//!
//! A final corrective sweep run after [`crate::sync::sync_styles`]. Every
//! node below the root gets each property in [`ColorProperty::SCRUBBED`]
//! rewritten from its own resolved value, which catches inherited values
//! the synchronizer never saw because the live renderer did not enumerate
//! them on that node. Shadows are cleared outright.

use log::debug;

use crate::color::ColorNormalizer;
use crate::properties::{self, ColorProperty, Pass, Strategy, NO_SHADOW};
use crate::tree::{NodeId, StyleTree};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrubReport {
    pub nodes_scrubbed: usize,
    pub colors_rewritten: usize,
    pub shadows_cleared: usize,
}

pub fn scrub_colors(tree: &mut StyleTree, root: NodeId, normalizer: &ColorNormalizer) -> ScrubReport {
    let mut report = ScrubReport::default();
    let nodes: Vec<NodeId> = tree.descendants(root).collect();

    for id in nodes {
        for prop in ColorProperty::SCRUBBED {
            let name = prop.name();
            match properties::strategy(prop.kind(), Pass::Scrub) {
                Strategy::ForceClear => {
                    tree.set_override(id, name, NO_SHADOW);
                    report.shadows_cleared += 1;
                }
                Strategy::Normalize => {
                    let value = tree.resolved_value(id, name);
                    if value.is_empty() {
                        continue;
                    }
                    let normalized = normalizer.normalize(value);
                    tree.set_override(id, name, normalized);
                    report.colors_rewritten += 1;
                }
            }
        }
        report.nodes_scrubbed += 1;
    }

    debug!(
        "Color scrub: {} nodes, {} colors rewritten, {} shadows cleared",
        report.nodes_scrubbed, report.colors_rewritten, report.shadows_cleared
    );
    report
}
