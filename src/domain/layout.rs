//! Tidy tree layout for the visible part of a hierarchy.
//!
//! Subtrees are laid out bottom-up. Each subtree keeps its contour (the
//! leftmost and rightmost breadth offset on every level below its root);
//! a new child subtree is shifted right until it clears the accumulated
//! contour of its left siblings on every shared level. Siblings are kept
//! one unit apart, cousins two units. The parent is centered over its first
//! and last child.
//!
//! The result is horizontal: depth grows along x (`depth * level_spacing`)
//! and breadth along y (`offset * node_spacing`), with the root at y = 0.

use std::collections::HashMap;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::hierarchy::{Hierarchy, NodeKey};
use crate::domain::point::Point;

/// Spacing for the tree layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Distance between adjacent siblings along the breadth axis
    pub node_spacing: f64,
    /// Distance between consecutive levels along the depth axis
    pub level_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 40.0,
            level_spacing: 220.0,
        }
    }
}

const SIBLING_SEPARATION: f64 = 1.0;
const COUSIN_SEPARATION: f64 = 2.0;

/// Positions of all visible nodes after one layout run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreeLayout {
    positions: HashMap<NodeKey, Point>,
    /// Visible keys in pre-order
    order: Vec<NodeKey>,
    links: Vec<(NodeKey, NodeKey)>,
}

impl TreeLayout {
    pub fn position(&self, key: NodeKey) -> Option<Point> {
        self.positions.get(&key).copied()
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.positions.contains_key(&key)
    }

    pub fn keys(&self) -> &[NodeKey] {
        &self.order
    }

    pub fn links(&self) -> &[(NodeKey, NodeKey)] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Smallest and largest breadth (y) coordinate.
    pub fn breadth_extent(&self) -> (f64, f64) {
        self.positions
            .values()
            .fold((0.0_f64, 0.0_f64), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)))
    }

    /// Largest depth (x) coordinate.
    pub fn depth_extent(&self) -> f64 {
        self.positions.values().fold(0.0_f64, |hi, p| hi.max(p.x))
    }
}

/// Laid-out subtree in breadth units relative to its root.
struct Subtree {
    offsets: Vec<(Index, f64)>,
    /// (min, max) breadth per level, level 0 = subtree root
    contour: Vec<(f64, f64)>,
}

impl Subtree {
    fn shifted(mut self, by: f64) -> Self {
        for (_, offset) in &mut self.offsets {
            *offset += by;
        }
        for (lo, hi) in &mut self.contour {
            *lo += by;
            *hi += by;
        }
        self
    }
}

pub struct TreeLayoutEngine {
    config: LayoutConfig,
}

impl TreeLayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Lay out every node reachable through expanded children.
    #[instrument(level = "debug", skip_all)]
    pub fn compute(&self, hierarchy: &Hierarchy) -> TreeLayout {
        let subtree = Self::layout_subtree(hierarchy, hierarchy.root_index());

        let positions: HashMap<NodeKey, Point> = subtree
            .offsets
            .iter()
            .map(|&(idx, offset)| {
                let node = hierarchy.get(idx);
                (
                    node.key(),
                    Point::new(
                        node.depth() as f64 * self.config.level_spacing,
                        offset * self.config.node_spacing,
                    ),
                )
            })
            .collect();

        let order: Vec<NodeKey> = hierarchy.visible().map(|n| n.key()).collect();
        debug!("laid out {} visible nodes", order.len());

        TreeLayout {
            positions,
            order,
            links: hierarchy.visible_links(),
        }
    }

    fn layout_subtree(hierarchy: &Hierarchy, idx: Index) -> Subtree {
        let children = hierarchy.get(idx).children().unwrap_or(&[]);
        if children.is_empty() {
            return Subtree {
                offsets: vec![(idx, 0.0)],
                contour: vec![(0.0, 0.0)],
            };
        }

        let mut placed: Vec<Subtree> = Vec::with_capacity(children.len());
        // merged contour of the children placed so far, level 0 = children
        let mut merged: Vec<(f64, f64)> = Vec::new();
        let mut child_offsets: Vec<f64> = Vec::with_capacity(children.len());

        for &child in children {
            let sub = Self::layout_subtree(hierarchy, child);
            let shift = if merged.is_empty() {
                0.0
            } else {
                merged
                    .iter()
                    .zip(&sub.contour)
                    .enumerate()
                    .map(|(level, (&(_, right), &(left, _)))| {
                        let separation = if level == 0 {
                            SIBLING_SEPARATION
                        } else {
                            COUSIN_SEPARATION
                        };
                        right + separation - left
                    })
                    .fold(f64::NEG_INFINITY, f64::max)
            };
            let sub = sub.shifted(shift);
            for (level, &(lo, hi)) in sub.contour.iter().enumerate() {
                match merged.get_mut(level) {
                    Some(slot) => *slot = (slot.0.min(lo), slot.1.max(hi)),
                    None => merged.push((lo, hi)),
                }
            }
            child_offsets.push(shift);
            placed.push(sub);
        }

        let first = child_offsets.first().copied().unwrap_or(0.0);
        let last = child_offsets.last().copied().unwrap_or(0.0);
        let center = (first + last) / 2.0;

        let mut offsets = vec![(idx, 0.0)];
        for sub in placed {
            offsets.extend(sub.offsets.into_iter().map(|(i, o)| (i, o - center)));
        }
        let mut contour = vec![(0.0, 0.0)];
        contour.extend(merged.into_iter().map(|(lo, hi)| (lo - center, hi - center)));

        Subtree { offsets, contour }
    }
}
