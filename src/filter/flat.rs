//! One-to-one copy of the windowed source edges
//!
//! `EdgeMirror` is the edge-level transform every strategy builds on: it
//! maps source nodes to target nodes, deduplicates target edges by
//! `(tail, head)` and folds coverage into existing edges. It is also the
//! single place that reports activity to the statistics sink.

use super::{SourceEdge, Simplify};
use crate::graph::{
    coverage_weight, AttributeTable, EdgeId, EdgeOptions, GraphResult, GraphStore, NodeId,
    NodeKey, NodeType,
};
use crate::stats::{Activity, StatsSink};
use rustc_hash::FxHashMap;

/// Node attribute columns copied from source to target nodes
const COPIED_COLUMNS: [&str; 6] = ["source", "id", "type", "party", "name", "uname"];

/// Result of mirroring one source edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Mirrored {
    pub tail: NodeId,
    pub head: NodeId,
    /// The target changed
    pub changed: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct EdgeMirror {
    edges: FxHashMap<(NodeId, NodeId), EdgeId>,
}

impl EdgeMirror {
    pub fn reset(&mut self) {
        self.edges.clear();
    }

    pub fn target_edge(&self, tail: NodeId, head: NodeId) -> Option<EdgeId> {
        self.edges.get(&(tail, head)).copied()
    }

    pub fn link(
        &mut self,
        target: &mut GraphStore,
        source: &GraphStore,
        accepted: &SourceEdge<'_>,
        stats: &mut dyn StatsSink,
    ) -> GraphResult<Mirrored> {
        let edge = accepted.edge;
        let activity = activity_of(source, accepted);

        if accepted.first_accepted {
            stats.add_activity(&activity);
        }
        if edge.tail != edge.head && source.node_type(edge.head) == NodeType::Actor {
            stats.add_received_activity(&activity);
        }

        let tail = mirror_node(target, source, edge.tail, stats)?;
        let head = mirror_node(target, source, edge.head, stats)?;

        match self.edges.get(&(tail, head)).copied() {
            Some(existing) => {
                let changed = target.update_edge_coverage(existing, accepted.coverage)?;
                Ok(Mirrored { tail, head, changed })
            }
            None => {
                let created = target.add_edge_with(
                    tail,
                    head,
                    EdgeOptions {
                        weight: coverage_weight(accepted.coverage),
                        coverage: accepted.coverage,
                        ..Default::default()
                    },
                )?;
                self.edges.insert((tail, head), created);
                Ok(Mirrored {
                    tail,
                    head,
                    changed: true,
                })
            }
        }
    }
}

fn activity_of(source: &GraphStore, accepted: &SourceEdge<'_>) -> Activity {
    let row = accepted.edge.tail.index();
    let columns = &source.node_columns;
    Activity {
        timestamp: accepted.face.timestamp,
        source_id: columns.get_int64(row, "source"),
        source_object_id: columns.get_int64(row, "id"),
        lang: accepted.face.lang,
        app_id: accepted.face.app_id,
        filter_id: accepted.face.filter_id,
        party: columns.get_int(row, "party"),
    }
}

/// Target node for a source node, created (with its attributes) on first use
fn mirror_node(
    target: &mut GraphStore,
    source: &GraphStore,
    node: NodeId,
    stats: &mut dyn StatsSink,
) -> GraphResult<NodeId> {
    let node_type = source.node_type(node);
    let (mirrored, created) = target.get_or_add_node(NodeKey::Source(node), node_type)?;
    if !created {
        return Ok(mirrored);
    }

    let row = node.index();
    for column in COPIED_COLUMNS {
        let value = source.node_columns.get_property(row, column);
        if !value.is_null() {
            target.node_columns.set_value(mirrored.index(), column, value);
        }
    }

    let columns = &source.node_columns;
    match node_type {
        NodeType::Hashtag => stats.add_hashtag(columns.get_text(row, "name")),
        NodeType::Url | NodeType::Image => {
            stats.add_link(columns.get_text(row, "name"), columns.get_text(row, "uname"))
        }
        NodeType::Actor => stats.add_user_type(columns.get_int(row, "type")),
        _ => {}
    }
    Ok(mirrored)
}

/// Baseline strategy: every accepted edge is copied as-is
#[derive(Debug, Clone, Default)]
pub struct FlatSimplifier {
    mirror: EdgeMirror,
}

impl FlatSimplifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target edge mirroring `tail -> head`, if any
    pub fn target_edge(&self, tail: NodeId, head: NodeId) -> Option<EdgeId> {
        self.mirror.target_edge(tail, head)
    }
}

impl Simplify for FlatSimplifier {
    fn reset(&mut self) {
        self.mirror.reset();
    }

    fn link(
        &mut self,
        target: &mut GraphStore,
        source: &GraphStore,
        edge: &SourceEdge<'_>,
        stats: &mut dyn StatsSink,
    ) -> GraphResult<bool> {
        Ok(self.mirror.link(target, source, edge, stats)?.changed)
    }
}
