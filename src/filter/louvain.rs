//! Community-detection strategy
//!
//! Edges are mirrored like the flat strategy. Above the first hierarchy
//! level an edge is only admitted when both of its source endpoints are
//! significant: their in-degree in the source graph, as snapshotted at the
//! last FRESH start, must reach `min_significance`. Source nodes added after
//! the snapshot count as insignificant until the next reset.
//!
//! After a scan that changed the target, the hierarchy is flattened, one
//! Louvain pass regroups the nodes into communities, and each community
//! gets its highest in-degree child as group leader.

use super::flat::EdgeMirror;
use super::{SourceEdge, Simplify};
use crate::algo::Louvain;
use crate::config::FilterConfig;
use crate::graph::{EdgeData, GraphResult, GraphStore, NodeId, NodeType};
use crate::stats::StatsSink;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct LouvainSimplifier {
    mirror: EdgeMirror,
    /// Source in-degree per node at the last FRESH start
    base_indegree: Vec<f64>,
    level: usize,
    min_significance: f64,
}

impl LouvainSimplifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `node` of the source graph passes the significance cutoff
    pub fn is_significant(&self, node: NodeId) -> bool {
        self.level == 0
            || self
                .base_indegree
                .get(node.index())
                .is_some_and(|&d| d >= self.min_significance)
    }
}

/// Point every non-empty community at its highest in-degree child
///
/// Ties go to the lowest node index. Empty communities lose their leader.
pub fn assign_group_leaders(graph: &mut GraphStore) -> GraphResult<usize> {
    let communities: Vec<NodeId> = graph
        .node_ids()
        .filter(|&n| graph.node_type(n) == NodeType::Community)
        .collect();

    let mut assigned = 0;
    for community in communities {
        let mut leader: Option<(NodeId, f64)> = None;
        for child in graph.children(community) {
            let indegree = graph.node(child).map_or(0.0, |d| d.indegree);
            let better = match leader {
                None => true,
                Some((best, best_degree)) => {
                    indegree > best_degree || (indegree == best_degree && child < best)
                }
            };
            if better {
                leader = Some((child, indegree));
            }
        }
        let leader = leader.map(|(n, _)| n);
        if leader.is_some() {
            assigned += 1;
        }
        graph.set_group_leader(community, leader)?;
    }
    Ok(assigned)
}

impl Simplify for LouvainSimplifier {
    fn reset(&mut self) {
        self.mirror.reset();
        self.base_indegree.clear();
    }

    fn begin(&mut self, source: &GraphStore, config: &FilterConfig) {
        self.level = config.level;
        self.min_significance = config.min_significance;
        self.base_indegree = source
            .node_ids()
            .map(|n| source.node(n).map_or(0.0, |d| d.indegree))
            .collect();
    }

    fn admits(&self, edge: &EdgeData) -> bool {
        self.is_significant(edge.tail) && self.is_significant(edge.head)
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

    fn finish(
        &mut self,
        target: &mut GraphStore,
        changed: bool,
        config: &FilterConfig,
    ) -> GraphResult<bool> {
        if !changed {
            return Ok(false);
        }
        target.remove_all_children();
        let louvain = Louvain::new(config.louvain.clone().with_max_passes(1));
        let outcome = louvain.run(target)?;
        let leaders = assign_group_leaders(target)?;
        debug!(
            modularity = outcome.modularity,
            communities = outcome.community_count,
            leaders,
            "louvain simplifier regrouped"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::IdAllocator;

    #[test]
    fn test_group_leader_is_highest_indegree_child() {
        let mut graph = GraphStore::new(&IdAllocator::new());
        let a = graph.add_node(NodeType::Actor).unwrap();
        let b = graph.add_node(NodeType::Actor).unwrap();
        let c = graph.add_node(NodeType::Actor).unwrap();
        graph.add_edge(a, b).unwrap();
        graph.add_edge(c, b).unwrap();
        graph.add_edge(b, a).unwrap();

        let community = graph.create_community(0).unwrap();
        let empty = graph.create_community(1).unwrap();
        graph.set_group_leader(empty, Some(a)).unwrap();
        for n in [a, b, c] {
            graph.add_child(community, n).unwrap();
        }

        assert_eq!(assign_group_leaders(&mut graph).unwrap(), 1);
        assert_eq!(graph.node(community).unwrap().group_leader, Some(b));
        assert_eq!(graph.node(empty).unwrap().group_leader, None);
    }

    #[test]
    fn test_significance_only_above_first_level() {
        let mut source = GraphStore::new(&IdAllocator::new());
        let a = source.add_node(NodeType::Actor).unwrap();
        let b = source.add_node(NodeType::Actor).unwrap();
        source.add_edge(a, b).unwrap();
        source.add_edge(a, b).unwrap();

        let mut simplifier = LouvainSimplifier::new();
        simplifier.begin(&source, &FilterConfig::default());
        assert!(simplifier.is_significant(a));

        let config = FilterConfig {
            level: 1,
            ..FilterConfig::default()
        };
        simplifier.begin(&source, &config);
        assert!(!simplifier.is_significant(a));
        assert!(simplifier.is_significant(b));
        assert!(!simplifier.is_significant(NodeId(7)));
    }
}
