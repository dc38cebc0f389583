/*
Text rendering of a hierarchy for terminals.

Collapsed nodes are shown with a `[+]` marker and their hidden subtree is
omitted, mirroring what the SVG view draws.
 */
use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::hierarchy::{Hierarchy, NodeState};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for Hierarchy {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(hierarchy: &Hierarchy, node_idx: Index) -> Tree<String> {
            let node = hierarchy.get(node_idx);
            let text = match node.state() {
                NodeState::Collapsed => format!("{} [+]", node.label()),
                _ => node.label().to_string(),
            };
            let leaves: Vec<_> = node
                .children()
                .unwrap_or(&[])
                .iter()
                .map(|&child| build_tree(hierarchy, child))
                .collect();
            Tree::new(text).with_leaves(leaves)
        }

        build_tree(self, self.root_index())
    }
}
