//! Visibility over the hierarchy
//!
//! At most one branch of the forest is open at a time: the active node and
//! all of its ancestors. A node is visible when it carries something to draw
//! (an edge or a child) and its parent, if any, is open. Nodes below a closed
//! ancestor are represented on screen by their nearest visible ancestor.

use super::edge::EdgeData;
use super::store::{GraphResult, GraphStore};
use super::types::{EdgeId, NodeId};
use rustc_hash::FxHashSet;

impl GraphStore {
    /// Open the branch leading to `node`, or close everything with `None`
    pub fn set_active_child(&mut self, node: Option<NodeId>) -> GraphResult<()> {
        if let Some(n) = node {
            self.node_ref(n)?;
        }
        self.active_child = node;
        self.bump_version();
        Ok(())
    }

    pub fn active_child(&self) -> Option<NodeId> {
        self.active_child
    }

    fn open_set(&self) -> FxHashSet<NodeId> {
        let mut open = FxHashSet::default();
        if let Some(active) = self.active_child {
            open.insert(active);
            open.extend(self.ancestors(active));
        }
        open
    }

    /// Lazily enumerate visible nodes in index order
    ///
    /// The iterator is finite and single-pass; call again to restart.
    pub fn visible_nodes(&self) -> VisibleNodes<'_> {
        VisibleNodes {
            store: self,
            open: self.open_set(),
            next: 0,
        }
    }

    pub fn is_visible(&self, node: NodeId) -> bool {
        self.node_visible(node, &self.open_set())
    }

    fn node_visible(&self, node: NodeId, open: &FxHashSet<NodeId>) -> bool {
        let Some(data) = self.node(node) else {
            return false;
        };
        if !data.has_edges() && data.child_count == 0 {
            return false;
        }
        match data.parent_node {
            None => true,
            Some(parent) => open.contains(&parent),
        }
    }

    fn representative_in(&self, node: NodeId, open: &FxHashSet<NodeId>) -> NodeId {
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            if open.contains(&parent) {
                break;
            }
            current = parent;
        }
        current
    }

    /// The node that stands in for `node` on screen
    pub fn representative(&self, node: NodeId) -> NodeId {
        self.representative_in(node, &self.open_set())
    }

    /// Edges with both endpoints resolved to their representatives
    ///
    /// Edges that collapse inside a single closed group are skipped, except
    /// genuine self-loops.
    pub fn visible_edges(&self) -> VisibleEdges<'_> {
        VisibleEdges {
            store: self,
            open: self.open_set(),
            next: 0,
        }
    }
}

/// Iterator returned by `GraphStore::visible_nodes`
pub struct VisibleNodes<'a> {
    store: &'a GraphStore,
    open: FxHashSet<NodeId>,
    next: usize,
}

impl Iterator for VisibleNodes<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while self.next < self.store.node_count() {
            let id = NodeId::new(self.next);
            self.next += 1;
            if self.store.node_visible(id, &self.open) {
                return Some(id);
            }
        }
        None
    }
}

/// A visible edge and the representatives of its endpoints
#[derive(Debug, Clone, Copy)]
pub struct VisibleEdge<'a> {
    pub id: EdgeId,
    pub edge: &'a EdgeData,
    pub tail: NodeId,
    pub head: NodeId,
}

/// Iterator returned by `GraphStore::visible_edges`
pub struct VisibleEdges<'a> {
    store: &'a GraphStore,
    open: FxHashSet<NodeId>,
    next: usize,
}

impl<'a> Iterator for VisibleEdges<'a> {
    type Item = VisibleEdge<'a>;

    fn next(&mut self) -> Option<VisibleEdge<'a>> {
        let store: &'a GraphStore = self.store;
        while let Some(edge) = store.edges.get(self.next) {
            let id = EdgeId::new(self.next);
            self.next += 1;
            let tail = store.representative_in(edge.tail, &self.open);
            let head = store.representative_in(edge.head, &self.open);
            if tail == head && !edge.is_self_loop() {
                continue;
            }
            return Some(VisibleEdge { id, edge, tail, head });
        }
        None
    }
}
