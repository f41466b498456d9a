//! Graph Strata
//!
//! Incremental, windowed simplification of append-only activity graphs.
//!
//! # Architecture
//!
//! - `graph`: arena-indexed nodes, edges and faces with a parent/child
//!   hierarchy, version counter and a reader/writer gate for renderers
//! - `filter`: resumable strategies that fold a time/sentiment window of a
//!   source graph into a bounded target graph
//! - `algo`: Louvain community detection over the hierarchy
//! - `stats`: the statistics sink filters report activity to
//! - `config`: filter and Louvain settings, loadable from YAML
//!
//! ## Example Usage
//!
//! ```rust
//! use graph_strata::filter::{Filter, Window};
//! use graph_strata::graph::{EdgeOptions, FaceData, GraphStore, IdAllocator, NodeType};
//! use graph_strata::stats::ActivityStatistics;
//! use graph_strata::FilterConfig;
//!
//! let ids = IdAllocator::new();
//! let mut source = GraphStore::new(&ids);
//! let actor = source.add_node(NodeType::Actor).unwrap();
//! let tag = source.add_node(NodeType::Hashtag).unwrap();
//! for t in [10, 20, 30] {
//!     let face = source.add_face(FaceData::new(t, 0.0)).unwrap();
//!     source.add_edge_with(actor, tag, EdgeOptions::in_face(face)).unwrap();
//! }
//!
//! let mut target = GraphStore::new(&ids);
//! let mut stats = ActivityStatistics::new();
//! let mut filter = Filter::flat(FilterConfig::default());
//! filter.apply(&mut target, Window::time(0, 25), &source, &mut stats).unwrap();
//!
//! assert_eq!(target.edge_count(), 1);
//! assert_eq!(stats.num_raw_edges, 3);
//! assert_eq!(stats.time_range, Some((10, 20)));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod config;
pub mod filter;
pub mod graph;
pub mod stats;

// Re-export main types for convenience
pub use graph::{
    EdgeId, FaceId, GraphError, GraphResult, GraphStore, IdAllocator, NodeId, NodeKey, NodeType,
    SharedGraph,
};

pub use filter::{Filter, Strategy, Window};

pub use config::{FilterConfig, LouvainConfig};

pub use stats::{ActivityStatistics, NullStats, StatsSink};

pub use algo::{Louvain, LouvainOutcome};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.3.0");
    }
}
