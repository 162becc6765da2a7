//! Style synchronization between a live tree and its clone
//!
//! The two trees are walked in lockstep, pre-order, pairing children by
//! position. For each pair every color-bearing property the live node
//! enumerates is normalized and written into the clone's override map.
//!
//! A pair whose child counts differ is still synchronized itself, but its
//! children are not paired; the mismatch is recorded and the walk moves on
//! to the remaining siblings.

use log::{debug, warn};

use crate::color::ColorNormalizer;
use crate::properties::{self, Pass, Strategy, NO_SHADOW};
use crate::tree::{NodeId, StyleTree};

/// A live/clone pair whose child counts disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub live: NodeId,
    pub clone: NodeId,
    pub live_children: usize,
    pub clone_children: usize,
}

/// Result of synchronizing one node pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOutcome {
    /// Children line up and will be paired next
    Matched,
    /// Children do not line up; the subtree below this pair is skipped
    Mismatched(Mismatch),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub nodes_synced: usize,
    pub properties_written: usize,
    pub mismatches: Vec<Mismatch>,
}

impl SyncReport {
    /// True when every pair below the roots was reached.
    pub fn is_complete(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Copy color-bearing computed styles from `live` onto `clone`.
///
/// `live` is only read. The walk never fails; mismatched subtrees are
/// reported in the returned [`SyncReport`].
pub fn sync_styles(
    live: &StyleTree,
    live_root: NodeId,
    clone: &mut StyleTree,
    clone_root: NodeId,
    normalizer: &ColorNormalizer,
) -> SyncReport {
    let mut report = SyncReport::default();
    let mut stack = vec![(live_root, clone_root)];

    while let Some((l, c)) = stack.pop() {
        match sync_pair(live, l, clone, c, normalizer, &mut report) {
            PairOutcome::Matched => {
                let pairs = live.children(l).iter().zip(clone.children(c));
                stack.extend(pairs.rev().map(|(lc, cc)| (*lc, *cc)));
            }
            PairOutcome::Mismatched(m) => {
                warn!(
                    "Live node {} has {} children but clone node {} has {}; skipping its subtree",
                    m.live.index(),
                    m.live_children,
                    m.clone.index(),
                    m.clone_children
                );
                report.mismatches.push(m);
            }
        }
    }

    debug!(
        "Style sync: {} nodes, {} properties, {} mismatched subtrees",
        report.nodes_synced,
        report.properties_written,
        report.mismatches.len()
    );
    report
}

fn sync_pair(
    live: &StyleTree,
    l: NodeId,
    clone: &mut StyleTree,
    c: NodeId,
    normalizer: &ColorNormalizer,
    report: &mut SyncReport,
) -> PairOutcome {
    for (name, value) in live.node(l).computed() {
        let Some(kind) = properties::classify(name) else {
            continue;
        };
        let written = match properties::strategy(kind, Pass::Sync) {
            Strategy::Normalize => normalizer.normalize(value),
            Strategy::ForceClear => NO_SHADOW.to_string(),
        };
        clone.set_override(c, name, written);
        report.properties_written += 1;
    }
    report.nodes_synced += 1;

    let live_children = live.children(l).len();
    let clone_children = clone.children(c).len();
    if live_children == clone_children {
        PairOutcome::Matched
    } else {
        PairOutcome::Mismatched(Mismatch {
            live: l,
            clone: c,
            live_children,
            clone_children,
        })
    }
}
