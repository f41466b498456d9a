//! Degree-based folding of low-degree nodes into synthetic groups
//!
//! Degree here is the number of distinct neighbours a target node has
//! linked to so far, ignoring direction and self-loops. Every decision uses
//! the degrees from *before* the current edge is counted.
//!
//! A node is in at most one grouping at a time:
//! - the zero-degree group, while its only activity is self-loops;
//! - a pairs group, while it and its partner have linked only to each other;
//! - a one-degree group hung off a neighbour's anchor.
//!
//! A new link between two nodes without neighbours, or between two members
//! of the same anchor, forms a pair. Otherwise the side with fewer neighbours
//! hangs under the other side's anchor, and the other side leaves its own
//! grouping.
//!
//! Nodes leave a grouping only through the `break_*` methods, each of which
//! undoes exactly one membership kind.

use super::flat::EdgeMirror;
use super::{SourceEdge, Simplify};
use crate::graph::{GraphError, GraphResult, GraphStore, NodeId};
use crate::stats::StatsSink;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

/// Grouping a node currently belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    ZeroDegree,
    /// Mutual pair with the given partner
    Pair(NodeId),
    /// One-degree child of the given neighbour's anchor
    OneDegree(NodeId),
}

#[derive(Debug, Clone, Default)]
pub struct GroupSimplifier {
    mirror: EdgeMirror,
    links: FxHashSet<(NodeId, NodeId)>,
    link_count: FxHashMap<NodeId, usize>,
    /// node -> the real node whose anchor it hangs under
    one_degree: FxHashMap<NodeId, NodeId>,
    zero_degree: FxHashSet<NodeId>,
    /// Symmetric: both directions are stored
    pairs: FxHashMap<NodeId, NodeId>,
}

impl GroupSimplifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distinct neighbours of a target node seen so far
    pub fn degree(&self, node: NodeId) -> usize {
        self.link_count.get(&node).copied().unwrap_or(0)
    }

    pub fn membership(&self, node: NodeId) -> Option<Membership> {
        if self.zero_degree.contains(&node) {
            Some(Membership::ZeroDegree)
        } else if let Some(&partner) = self.pairs.get(&node) {
            Some(Membership::Pair(partner))
        } else {
            self.one_degree.get(&node).map(|&n| Membership::OneDegree(n))
        }
    }

    pub fn partner(&self, node: NodeId) -> Option<NodeId> {
        self.pairs.get(&node).copied()
    }

    /// Pairs with `a < b`, sorted
    pub fn pairs(&self) -> Vec<(NodeId, NodeId)> {
        let mut pairs: Vec<_> = self
            .pairs
            .iter()
            .filter(|(a, b)| a < b)
            .map(|(&a, &b)| (a, b))
            .collect();
        pairs.sort();
        pairs
    }

    pub fn zero_degree_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.zero_degree.iter().copied()
    }

    pub fn one_degree_nodes(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.one_degree.iter().map(|(&n, &a)| (n, a))
    }

    /// Fail unless `node` is free to join a grouping
    fn ensure_free(&self, graph: &GraphStore, node: NodeId) -> GraphResult<()> {
        if let Some(m) = self.membership(node) {
            return Err(GraphError::InvariantViolation(format!(
                "{} is already grouped ({:?})",
                node, m
            )));
        }
        if let Some(parent) = graph.parent(node) {
            return Err(GraphError::InvariantViolation(format!(
                "{} is already a child of {}",
                node, parent
            )));
        }
        Ok(())
    }

    fn join_zero_degree(&mut self, graph: &mut GraphStore, node: NodeId) -> GraphResult<()> {
        self.ensure_free(graph, node)?;
        let group = graph.create_zero_degree_group()?;
        graph.add_child(group, node)?;
        self.zero_degree.insert(node);
        trace!(%node, "joined zero-degree group");
        Ok(())
    }

    fn form_pair(&mut self, graph: &mut GraphStore, a: NodeId, b: NodeId) -> GraphResult<()> {
        self.ensure_free(graph, a)?;
        self.ensure_free(graph, b)?;
        let group = graph.create_pairs_group()?;
        graph.add_child(group, a)?;
        graph.add_child(group, b)?;
        self.pairs.insert(a, b);
        self.pairs.insert(b, a);
        trace!(%a, %b, "formed pair");
        Ok(())
    }

    /// Hang `node` under the one-degree anchor of `neighbor`
    fn attach_one_degree(
        &mut self,
        graph: &mut GraphStore,
        node: NodeId,
        neighbor: NodeId,
    ) -> GraphResult<()> {
        self.ensure_free(graph, node)?;
        let anchor = graph.create_one_degree_node(neighbor)?;
        graph.add_child(anchor, node)?;
        self.one_degree.insert(node, neighbor);
        trace!(%node, %neighbor, "attached one-degree node");
        Ok(())
    }

    fn break_zero_degree(&mut self, graph: &mut GraphStore, node: NodeId) -> GraphResult<()> {
        if self.zero_degree.remove(&node) {
            graph.remove_child(node)?;
        }
        Ok(())
    }

    fn break_one_degree(&mut self, graph: &mut GraphStore, node: NodeId) -> GraphResult<()> {
        if self.one_degree.remove(&node).is_some() {
            graph.remove_child(node)?;
        }
        Ok(())
    }

    /// Dissolve the pair `node` belongs to
    ///
    /// `node` is the side leaving the pair; its partner moves under `node`'s
    /// one-degree anchor.
    fn break_pair(&mut self, graph: &mut GraphStore, node: NodeId) -> GraphResult<()> {
        let Some(partner) = self.pairs.remove(&node) else {
            return Ok(());
        };
        if self.pairs.remove(&partner) != Some(node) {
            return Err(GraphError::InvariantViolation(format!(
                "pair {} <-> {} is not mutual",
                node, partner
            )));
        }
        graph.remove_child(node)?;
        graph.remove_child(partner)?;
        self.attach_one_degree(graph, partner, node)?;
        trace!(%node, %partner, "broke pair");
        Ok(())
    }

    /// Drop whatever grouping `node` is in
    fn release(&mut self, graph: &mut GraphStore, node: NodeId) -> GraphResult<()> {
        match self.membership(node) {
            Some(Membership::Pair(_)) => self.break_pair(graph, node),
            Some(Membership::OneDegree(_)) => self.break_one_degree(graph, node),
            Some(Membership::ZeroDegree) => self.break_zero_degree(graph, node),
            None => Ok(()),
        }
    }

    /// True if `a` and `b` may form a mutual pair
    fn pair_eligible(&self, a: NodeId, b: NodeId, da: usize, db: usize) -> bool {
        if da == 0 && db == 0 {
            return true;
        }
        match (self.membership(a), self.membership(b)) {
            (Some(Membership::OneDegree(x)), Some(Membership::OneDegree(y))) => x == y,
            _ => false,
        }
    }

    fn classify(&mut self, graph: &mut GraphStore, a: NodeId, b: NodeId) -> GraphResult<()> {
        let (da, db) = (self.degree(a), self.degree(b));

        if a == b {
            if da == 0 && self.membership(a).is_none() {
                self.join_zero_degree(graph, a)?;
            }
            return Ok(());
        }

        let key = if a < b { (a, b) } else { (b, a) };
        if !self.links.insert(key) {
            // Known neighbours; degrees are unchanged
            return Ok(());
        }
        *self.link_count.entry(a).or_insert(0) += 1;
        *self.link_count.entry(b).or_insert(0) += 1;

        if self.pair_eligible(a, b, da, db) {
            self.release(graph, a)?;
            self.release(graph, b)?;
            return self.form_pair(graph, a, b);
        }

        if da == db {
            // Neither side is the lesser one: both stand on their own
            self.release(graph, a)?;
            return self.release(graph, b);
        }

        let (lower, higher) = if da < db { (a, b) } else { (b, a) };
        self.release(graph, higher)?;
        self.release(graph, lower)?;
        self.attach_one_degree(graph, lower, higher)
    }
}

impl Simplify for GroupSimplifier {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn link(
        &mut self,
        target: &mut GraphStore,
        source: &GraphStore,
        edge: &SourceEdge<'_>,
        stats: &mut dyn StatsSink,
    ) -> GraphResult<bool> {
        let mirrored = self.mirror.link(target, source, edge, stats)?;
        let version = target.version();
        self.classify(target, mirrored.tail, mirrored.head)?;
        Ok(mirrored.changed || target.version() != version)
    }
}
