//! Per-node tertiary data
//!
//! A node is only an index; everything the simplification pipeline needs to
//! know about it lives in `NodeData`: adjacency heads, weighted degrees, time
//! coverage and its place in the hierarchy forest.

use super::types::{EdgeId, NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// Tertiary data of a node
///
/// Hierarchy links form a forest: `parent_node` points up, `first_child` /
/// `next_child` form an intrusive singly-linked child list and `child_count`
/// is the length of that list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub node_type: NodeType,

    /// Head of the outgoing adjacency chain (edges whose tail is this node)
    pub first_edge: Option<EdgeId>,

    /// Head of the incoming adjacency chain (edges whose head is this node)
    pub first_in_edge: Option<EdgeId>,

    /// Weighted in-degree
    pub indegree: f64,

    /// Weighted out-degree
    pub outdegree: f64,

    /// 64 time buckets, one bit per bucket that saw activity
    pub coverage: u64,

    /// `popcount(coverage) / 64`
    pub coverage_weight: f32,

    pub parent_node: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub next_child: Option<NodeId>,
    pub child_count: u32,

    /// Highest in-degree child, chosen by community strategies
    pub group_leader: Option<NodeId>,

    /// Position; relative to the parent while the node has one
    pub position: [f32; 2],

    /// Graph version at which the node was created
    pub age: u64,
}

impl NodeData {
    pub fn new(node_type: NodeType, age: u64) -> Self {
        NodeData {
            node_type,
            first_edge: None,
            first_in_edge: None,
            indegree: 0.0,
            outdegree: 0.0,
            coverage: 0,
            coverage_weight: 0.0,
            parent_node: None,
            first_child: None,
            next_child: None,
            child_count: 0,
            group_leader: None,
            position: [0.0, 0.0],
            age,
        }
    }

    /// Total weighted degree
    pub fn degree(&self) -> f64 {
        self.indegree + self.outdegree
    }

    /// True if any edge touches this node
    pub fn has_edges(&self) -> bool {
        self.first_edge.is_some() || self.first_in_edge.is_some()
    }

    pub fn has_parent(&self) -> bool {
        self.parent_node.is_some()
    }

    /// OR `bits` into the coverage mask and refresh the derived weight
    pub fn merge_coverage(&mut self, bits: u64) -> bool {
        let merged = self.coverage | bits;
        if merged == self.coverage {
            return false;
        }
        self.coverage = merged;
        self.coverage_weight = coverage_weight(merged);
        true
    }
}

/// Fraction of the 64 buckets that are set
pub fn coverage_weight(coverage: u64) -> f32 {
    coverage.count_ones() as f32 / 64.0
}
