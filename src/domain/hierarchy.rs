//! Arena-backed hierarchy with per-node expand/collapse state.
//!
//! Nodes are stored in a generational arena. Each node keeps its parent
//! index (fixed at construction) and exactly one branch slot: expanded
//! children, collapsed children, or none (a true leaf).

use std::fmt;

use generational_arena::{Arena, Index};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, trace};

use crate::domain::error::DomainError;

/// Result type for hierarchy operations.
pub type HierarchyResult<T> = Result<T, DomainError>;

/// Stable node identity, assigned in pre-order at construction (root = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey(pub u32);

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Nested description a hierarchy is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeSpec>>,
}

impl NodeSpec {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: None,
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<NodeSpec>) -> Self {
        Self {
            name: name.into(),
            children: Some(children),
        }
    }

    /// Validate a JSON description, reporting the path of the first defect.
    pub fn from_json(value: &Value) -> HierarchyResult<Self> {
        Self::from_json_at(value, "$")
    }

    fn from_json_at(value: &Value, path: &str) -> HierarchyResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| DomainError::malformed(path, "node must be an object"))?;

        let name = match object.get("name") {
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(DomainError::malformed(path, "name must be a string")),
            None => return Err(DomainError::malformed(path, "missing name")),
        };

        let children = match object.get("children") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| Self::from_json_at(item, &format!("{path}.children[{i}]")))
                    .collect::<HierarchyResult<Vec<_>>>()?,
            ),
            Some(_) => {
                return Err(DomainError::malformed(
                    format!("{path}.children"),
                    "children must be a sequence",
                ))
            }
        };

        Ok(Self { name, children })
    }
}

/// Observable state of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Expanded,
    Collapsed,
    Leaf,
}

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Collapsed,
    Expanded,
    /// Leaf nodes have nothing to toggle.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Branch {
    Expanded(Vec<Index>),
    Collapsed(Vec<Index>),
    Leaf,
}

#[derive(Debug)]
pub struct HierarchyNode {
    key: NodeKey,
    label: String,
    depth: usize,
    parent: Option<Index>,
    branch: Branch,
}

impl HierarchyNode {
    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn state(&self) -> NodeState {
        match self.branch {
            Branch::Expanded(_) => NodeState::Expanded,
            Branch::Collapsed(_) => NodeState::Collapsed,
            Branch::Leaf => NodeState::Leaf,
        }
    }

    pub fn is_internal(&self) -> bool {
        !matches!(self.branch, Branch::Leaf)
    }

    /// Visible children, `None` unless expanded.
    pub(crate) fn children(&self) -> Option<&[Index]> {
        match &self.branch {
            Branch::Expanded(c) => Some(c),
            _ => None,
        }
    }

    /// Hidden children, `None` unless collapsed.
    pub(crate) fn collapsed_children(&self) -> Option<&[Index]> {
        match &self.branch {
            Branch::Collapsed(c) => Some(c),
            _ => None,
        }
    }

    /// Children regardless of expand/collapse state.
    pub(crate) fn all_children(&self) -> &[Index] {
        match &self.branch {
            Branch::Expanded(c) | Branch::Collapsed(c) => c,
            Branch::Leaf => &[],
        }
    }
}

/// Rooted, ordered tree. Structure is fixed after construction; only the
/// expand/collapse state of internal nodes changes.
#[derive(Debug)]
pub struct Hierarchy {
    arena: Arena<HierarchyNode>,
    /// `keys[k]` is the arena index of `NodeKey(k)`
    keys: Vec<Index>,
    root: Index,
}

impl Hierarchy {
    /// Build from a nested description. Every internal node starts expanded.
    #[instrument(level = "debug", skip(spec), fields(root = %spec.name))]
    pub fn from_spec(spec: &NodeSpec) -> Self {
        let mut arena = Arena::new();
        let mut keys = Vec::new();
        let mut stack: Vec<(&NodeSpec, Option<Index>, usize)> = vec![(spec, None, 0)];
        let mut root = None;

        // children pushed in reverse so pops happen in pre-order
        while let Some((current, parent, depth)) = stack.pop() {
            let key = NodeKey(keys.len() as u32);
            let has_children = current.children.as_ref().is_some_and(|c| !c.is_empty());
            let idx = arena.insert(HierarchyNode {
                key,
                label: current.name.clone(),
                depth,
                parent,
                branch: if has_children {
                    Branch::Expanded(Vec::new())
                } else {
                    Branch::Leaf
                },
            });
            keys.push(idx);

            match parent {
                Some(parent_idx) => {
                    if let Some(Branch::Expanded(siblings)) =
                        arena.get_mut(parent_idx).map(|p| &mut p.branch)
                    {
                        siblings.push(idx);
                    }
                }
                None => root = Some(idx),
            }

            if let Some(children) = &current.children {
                for child in children.iter().rev() {
                    stack.push((child, Some(idx), depth + 1));
                }
            }
        }

        debug!("built hierarchy with {} nodes", keys.len());
        Self {
            arena,
            root: root.unwrap_or_else(|| keys[0]),
            keys,
        }
    }

    /// Build from a JSON description such as `{"name": "A", "children": [..]}`.
    pub fn from_json(value: &Value) -> HierarchyResult<Self> {
        Ok(Self::from_spec(&NodeSpec::from_json(value)?))
    }

    pub fn from_json_str(s: &str) -> HierarchyResult<Self> {
        let value: Value = serde_json::from_str(s)
            .map_err(|e| DomainError::malformed("$", format!("invalid JSON: {e}")))?;
        Self::from_json(&value)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn root(&self) -> NodeKey {
        self.arena[self.root].key
    }

    pub fn node(&self, key: NodeKey) -> HierarchyResult<&HierarchyNode> {
        self.index_of(key).map(|idx| &self.arena[idx])
    }

    fn index_of(&self, key: NodeKey) -> HierarchyResult<Index> {
        self.keys
            .get(key.0 as usize)
            .copied()
            .ok_or(DomainError::UnknownNode(key))
    }

    fn node_mut(&mut self, key: NodeKey) -> HierarchyResult<&mut HierarchyNode> {
        let idx = self.index_of(key)?;
        Ok(&mut self.arena[idx])
    }

    pub(crate) fn get(&self, idx: Index) -> &HierarchyNode {
        &self.arena[idx]
    }

    pub(crate) fn root_index(&self) -> Index {
        self.root
    }

    pub fn parent(&self, key: NodeKey) -> HierarchyResult<Option<NodeKey>> {
        Ok(self.node(key)?.parent.map(|p| self.arena[p].key))
    }

    pub fn state(&self, key: NodeKey) -> HierarchyResult<NodeState> {
        Ok(self.node(key)?.state())
    }

    /// Keys of the expanded children of `key` (empty when collapsed or leaf).
    pub fn children(&self, key: NodeKey) -> HierarchyResult<Vec<NodeKey>> {
        let node = self.node(key)?;
        Ok(self.keys_of(node.children().unwrap_or(&[])))
    }

    /// Keys of the hidden children of `key` (empty unless collapsed).
    pub fn collapsed_children(&self, key: NodeKey) -> HierarchyResult<Vec<NodeKey>> {
        let node = self.node(key)?;
        Ok(self.keys_of(node.collapsed_children().unwrap_or(&[])))
    }

    fn keys_of(&self, indices: &[Index]) -> Vec<NodeKey> {
        indices.iter().map(|&i| self.arena[i].key).collect()
    }

    /// Flip a node between expanded and collapsed. Leaves are left alone.
    #[instrument(level = "debug", skip(self))]
    pub fn toggle(&mut self, key: NodeKey) -> HierarchyResult<ToggleOutcome> {
        let node = self.node_mut(key)?;
        let (branch, outcome) = match std::mem::replace(&mut node.branch, Branch::Leaf) {
            Branch::Expanded(c) => (Branch::Collapsed(c), ToggleOutcome::Collapsed),
            Branch::Collapsed(c) => (Branch::Expanded(c), ToggleOutcome::Expanded),
            Branch::Leaf => (Branch::Leaf, ToggleOutcome::Unchanged),
        };
        node.branch = branch;
        trace!(label = %node.label, ?outcome, "toggle");
        Ok(outcome)
    }

    /// Collapse `key` and every internal node below it.
    pub fn collapse_all(&mut self, key: NodeKey) -> HierarchyResult<()> {
        self.set_subtree(key, false)
    }

    /// Expand `key` and every internal node below it.
    pub fn expand_all(&mut self, key: NodeKey) -> HierarchyResult<()> {
        self.set_subtree(key, true)
    }

    fn set_subtree(&mut self, key: NodeKey, expanded: bool) -> HierarchyResult<()> {
        let mut stack = vec![self.index_of(key)?];
        while let Some(idx) = stack.pop() {
            let node = &mut self.arena[idx];
            node.branch = match std::mem::replace(&mut node.branch, Branch::Leaf) {
                Branch::Expanded(c) | Branch::Collapsed(c) => {
                    stack.extend(c.iter().copied());
                    if expanded {
                        Branch::Expanded(c)
                    } else {
                        Branch::Collapsed(c)
                    }
                }
                Branch::Leaf => Branch::Leaf,
            };
        }
        Ok(())
    }

    /// Collapse every internal node at `depth` together with its subtree, so
    /// nothing deeper than `depth` stays visible. Returns how many subtrees
    /// were collapsed.
    pub fn collapse_from_depth(&mut self, depth: usize) -> HierarchyResult<usize> {
        let targets: Vec<NodeKey> = self
            .iter()
            .filter(|n| n.depth == depth && n.is_internal())
            .map(|n| n.key)
            .collect();
        for &key in &targets {
            self.collapse_all(key)?;
        }
        Ok(targets.len())
    }

    /// Resolve a node by label, or by a `/`-separated label path from the root
    /// (the root label may be omitted). Plain labels match the first node in
    /// pre-order.
    pub fn resolve(&self, query: &str) -> HierarchyResult<NodeKey> {
        if !query.contains('/') {
            return self
                .iter()
                .find(|n| n.label == query)
                .map(|n| n.key)
                .ok_or_else(|| DomainError::UnknownLabel(query.to_string()));
        }

        let mut segments = query.split('/').map(str::trim).filter(|s| !s.is_empty()).peekable();
        let mut current = self.root;
        if segments.peek() == Some(&self.arena[self.root].label.as_str()) {
            segments.next();
        }
        for segment in segments {
            current = self.arena[current]
                .all_children()
                .iter()
                .copied()
                .find(|&c| self.arena[c].label == segment)
                .ok_or_else(|| DomainError::UnknownLabel(query.to_string()))?;
        }
        Ok(self.arena[current].key)
    }

    /// All nodes in pre-order, including hidden ones.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder::new(self, false)
    }

    /// Nodes reachable from the root through expanded children only.
    pub fn visible(&self) -> PreOrder<'_> {
        PreOrder::new(self, true)
    }

    /// Parent/child pairs between visible nodes.
    pub fn visible_links(&self) -> Vec<(NodeKey, NodeKey)> {
        self.visible()
            .flat_map(|n| {
                n.children()
                    .unwrap_or(&[])
                    .iter()
                    .map(move |&c| (n.key, self.arena[c].key))
            })
            .collect()
    }

    /// Nearest ancestor-or-self of `key` that is currently visible.
    pub fn visible_anchor(&self, key: NodeKey) -> HierarchyResult<NodeKey> {
        let mut idx = self.index_of(key)?;
        let mut anchor = idx;
        // any collapsed ancestor hides everything beneath it
        while let Some(parent) = self.arena[idx].parent {
            if self.arena[parent].collapsed_children().is_some() {
                anchor = parent;
            }
            idx = parent;
        }
        Ok(self.arena[anchor].key)
    }

    pub fn depth(&self) -> usize {
        self.iter().map(|n| n.depth + 1).max().unwrap_or(0)
    }

    /// Labels of nodes with no children in either slot.
    pub fn leaf_labels(&self) -> Vec<String> {
        self.iter()
            .filter(|n| !n.is_internal())
            .map(|n| n.label.clone())
            .collect()
    }
}

pub struct PreOrder<'a> {
    hierarchy: &'a Hierarchy,
    stack: Vec<Index>,
    visible_only: bool,
}

impl<'a> PreOrder<'a> {
    fn new(hierarchy: &'a Hierarchy, visible_only: bool) -> Self {
        Self {
            hierarchy,
            stack: vec![hierarchy.root],
            visible_only,
        }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a HierarchyNode;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let node = self.hierarchy.get(idx);
        let children = if self.visible_only {
            node.children().unwrap_or(&[])
        } else {
            node.all_children()
        };
        // reverse push keeps left-to-right order
        self.stack.extend(children.iter().rev().copied());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn abcd() -> Hierarchy {
        Hierarchy::from_spec(&NodeSpec::branch(
            "A",
            vec![
                NodeSpec::branch("B", vec![NodeSpec::leaf("D")]),
                NodeSpec::leaf("C"),
            ],
        ))
    }

    #[test]
    fn test_keys_are_assigned_in_preorder() {
        let h = abcd();
        let labels: Vec<(u32, &str)> = h.iter().map(|n| (n.key().0, n.label())).collect();
        assert_eq!(labels, vec![(0, "A"), (1, "B"), (2, "D"), (3, "C")]);
    }

    #[test]
    fn test_collapse_from_depth_hides_deeper_nodes() {
        let mut h = abcd();
        let b = h.resolve("B").unwrap();

        assert_eq!(h.collapse_from_depth(1).unwrap(), 1);

        assert_eq!(h.state(b).unwrap(), NodeState::Collapsed);
        let visible: Vec<&str> = h.visible().map(|n| n.label()).collect();
        assert_eq!(visible, vec!["A", "B", "C"]);
        assert_eq!(h.collapse_from_depth(5).unwrap(), 0);
    }

    #[test]
    fn test_parent_links_are_fixed() {
        let mut h = abcd();
        let b = h.resolve("B").unwrap();
        let d = h.resolve("D").unwrap();
        h.toggle(b).unwrap();
        assert_eq!(h.parent(d).unwrap(), Some(b));
        assert_eq!(h.parent(h.root()).unwrap(), None);
    }

    #[test]
    fn test_empty_children_array_is_a_leaf() {
        let h = Hierarchy::from_json(&json!({"name": "solo", "children": []})).unwrap();
        assert_eq!(h.state(h.root()).unwrap(), NodeState::Leaf);
    }

    #[test]
    fn test_visible_anchor_walks_to_collapsed_ancestor() {
        let mut h = abcd();
        let b = h.resolve("B").unwrap();
        let d = h.resolve("D").unwrap();
        assert_eq!(h.visible_anchor(d).unwrap(), d);
        h.toggle(b).unwrap();
        assert_eq!(h.visible_anchor(d).unwrap(), b);
    }

    #[test]
    fn test_resolve_by_path_disambiguates_repeated_labels() {
        let h = Hierarchy::from_spec(&NodeSpec::branch(
            "root",
            vec![
                NodeSpec::branch("p1", vec![NodeSpec::leaf("Tools")]),
                NodeSpec::branch("p2", vec![NodeSpec::leaf("Tools")]),
            ],
        ));
        let first = h.resolve("Tools").unwrap();
        let second = h.resolve("p2/Tools").unwrap();
        let rooted = h.resolve("root/p2/Tools").unwrap();
        assert_ne!(first, second);
        assert_eq!(second, rooted);
        assert!(h.resolve("p3/Tools").is_err());
    }
}
