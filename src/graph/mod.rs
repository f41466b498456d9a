//! Arena-indexed activity graph
//!
//! This module implements the base data model shared by source and target
//! graphs:
//! - Dense node/edge/face arenas with intrusive adjacency and face chains
//! - Weighted degrees and 64-bucket time coverage per node and edge
//! - A parent/child hierarchy forest with one open branch for display
//! - Return-or-create services for synthetic group nodes
//! - A reader/writer gate for handing graphs to render consumers

pub mod edge;
pub mod face;
pub mod gate;
pub mod groups;
pub mod hierarchy;
pub mod ids;
pub mod node;
pub mod property;
pub mod storage;
pub mod store;
pub mod types;
pub mod visible;

// Re-export main types
pub use edge::EdgeData;
pub use face::FaceData;
pub use gate::{GraphReadGuard, GraphWriteGuard, ReadGuard, ReadWriteGate, SharedGraph, WriteGuard};
pub use hierarchy::{Ancestors, Children};
pub use ids::IdAllocator;
pub use node::{coverage_weight, NodeData};
pub use property::PropertyValue;
pub use storage::{AttributeTable, Column, ColumnStore};
pub use store::{EdgeChain, EdgeOptions, GraphError, GraphResult, GraphStore};
pub use types::{EdgeId, FaceId, GraphId, NodeId, NodeKey, NodeType};
pub use visible::{VisibleEdge, VisibleEdges, VisibleNodes};
