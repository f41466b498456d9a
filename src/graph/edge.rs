//! Per-edge attributes
//!
//! Edges are directed and append-only. Each edge is threaded onto three
//! intrusive lists: the tail's outgoing chain, the head's incoming chain and,
//! when it belongs to a face, the face's edge chain.

use super::node::coverage_weight;
use super::types::{EdgeId, FaceId, NodeId};
use serde::{Deserialize, Serialize};

/// Attributes of a directed edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    pub weight: f32,

    /// Edge goes FROM this node
    pub tail: NodeId,

    /// Edge goes TO this node
    pub head: NodeId,

    /// Next edge in the tail's outgoing chain
    pub next_node_edge: Option<EdgeId>,

    /// Next edge in the head's incoming chain
    pub next_head_edge: Option<EdgeId>,

    /// Owning face
    pub face: Option<FaceId>,

    /// Next edge sharing `face`
    pub next_face_edge: Option<EdgeId>,

    /// Opaque geometry reference, 0 when unused
    pub arc: u32,

    pub coverage: u64,

    /// Reverse edge of an undirected pair
    pub pair_edge: Option<EdgeId>,
}

impl EdgeData {
    pub fn new(tail: NodeId, head: NodeId, weight: f32) -> Self {
        EdgeData {
            weight,
            tail,
            head,
            next_node_edge: None,
            next_head_edge: None,
            face: None,
            next_face_edge: None,
            arc: 0,
            coverage: 0,
            pair_edge: None,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.tail == self.head
    }

    /// The endpoint opposite to `node`, if `node` is an endpoint
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.tail == node {
            Some(self.head)
        } else if self.head == node {
            Some(self.tail)
        } else {
            None
        }
    }

    /// Weight implied by the coverage mask
    pub fn coverage_weight(&self) -> f32 {
        coverage_weight(self.coverage)
    }
}
