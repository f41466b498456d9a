//! Louvain community detection on the graph hierarchy
//!
//! Communities are materialised as `NodeType::Community` nodes: a node
//! belongs to community `c` when `c` is its parent, and is a singleton when
//! it has no parent. Only real (non-synthetic) nodes that are roots or
//! children of a community take part.
//!
//! ## Modularity
//!
//! Q = Σc [ in_c / 2m − (tot_c / 2m)² ]
//!
//! Where:
//! - in_c = weight of edges inside c, each counted from both ends
//! - tot_c = summed degree of the members of c
//! - m = total weight of participating edges
//!
//! Edge direction is ignored. A node moves to the neighbouring community
//! with the largest gain Δ = d_nc − tot_c · k_n / 2m; ties keep it where it is.

use crate::config::LouvainConfig;
use crate::graph::{GraphResult, GraphStore, NodeId, NodeType};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

/// Result of one `Louvain::run` call
#[derive(Debug, Clone, PartialEq)]
pub struct LouvainOutcome {
    /// True if the call left the partition with higher modularity
    pub improved: bool,
    pub passes: usize,
    pub moves: usize,
    pub initial_modularity: f64,
    pub modularity: f64,
    /// Modularity after each pass
    pub history: Vec<f64>,
    /// Communities (including singletons) with positive degree
    pub community_count: usize,
}

impl LouvainOutcome {
    fn unchanged() -> Self {
        LouvainOutcome {
            improved: false,
            passes: 0,
            moves: 0,
            initial_modularity: 0.0,
            modularity: 0.0,
            history: Vec::new(),
            community_count: 0,
        }
    }
}

/// Louvain engine
#[derive(Debug, Clone, Default)]
pub struct Louvain {
    config: LouvainConfig,
}

impl Louvain {
    pub fn new(config: LouvainConfig) -> Self {
        Louvain { config }
    }

    pub fn config(&self) -> &LouvainConfig {
        &self.config
    }

    /// Optimise the community partition of `graph` in place
    ///
    /// Passes repeat until one moves no node, improves modularity by less
    /// than `min_modularity`, or `max_passes` is reached. If the call ends
    /// without improvement every membership it created is rolled back.
    pub fn run(&self, graph: &mut GraphStore) -> GraphResult<LouvainOutcome> {
        let Some(mut partition) = Partition::from_graph(graph) else {
            debug!("louvain: no eligible nodes");
            return Ok(LouvainOutcome::unchanged());
        };

        let initial = partition.modularity();
        let mut current = initial;
        let mut outcome = LouvainOutcome {
            initial_modularity: initial,
            modularity: initial,
            ..LouvainOutcome::unchanged()
        };

        while self.config.pass_allowed(outcome.passes) {
            let moves = partition.pass(graph)?;
            outcome.passes += 1;
            outcome.moves += moves;

            let next = partition.modularity();
            outcome.history.push(next);
            debug!(pass = outcome.passes, moves, modularity = next, "louvain pass");

            if moves == 0 {
                break;
            }
            let delta = next - current;
            current = next;
            if delta < self.config.min_modularity {
                break;
            }
        }

        outcome.modularity = current;
        outcome.improved = outcome.moves > 0 && current > initial;
        if !outcome.improved {
            partition.rollback(graph)?;
            outcome.modularity = initial;
        }
        outcome.community_count = partition.community_count();

        info!(
            passes = outcome.passes,
            moves = outcome.moves,
            modularity = outcome.modularity,
            communities = outcome.community_count,
            "louvain finished"
        );
        Ok(outcome)
    }
}

/// Modularity of the partition currently encoded in `graph`'s hierarchy
pub fn modularity(graph: &GraphStore) -> f64 {
    Partition::from_graph(graph)
        .map(|p| p.modularity())
        .unwrap_or(0.0)
}

/// Community a participating node belongs to: its community parent, or itself
fn community_of(graph: &GraphStore, node: NodeId) -> NodeId {
    match graph.parent(node) {
        Some(parent) if graph.node_type(parent) == NodeType::Community => parent,
        _ => node,
    }
}

fn participates(graph: &GraphStore, node: NodeId) -> bool {
    let Some(data) = graph.node(node) else {
        return false;
    };
    if data.node_type.is_synthetic() {
        return false;
    }
    match data.parent_node {
        None => true,
        Some(parent) => graph.node_type(parent) == NodeType::Community,
    }
}

/// Working state of one `run` call
struct Partition {
    /// Participating nodes in index order
    nodes: Vec<NodeId>,
    /// k_n, self-loops counted twice
    degree: FxHashMap<NodeId, f64>,
    /// A_nn
    loops: FxHashMap<NodeId, f64>,
    community: FxHashMap<NodeId, NodeId>,
    tot: FxHashMap<NodeId, f64>,
    inner: FxHashMap<NodeId, f64>,
    /// 2m
    m2: f64,
    /// Parent of every node touched by this call, before it was touched
    original_parent: IndexMap<NodeId, Option<NodeId>>,
    next_community_id: u64,
}

impl Partition {
    fn from_graph(graph: &GraphStore) -> Option<Self> {
        let mut degree: FxHashMap<NodeId, f64> = FxHashMap::default();
        let mut loops: FxHashMap<NodeId, f64> = FxHashMap::default();
        let mut m2 = 0.0;

        let eligible: Vec<bool> = graph.node_ids().map(|n| participates(graph, n)).collect();
        for (_, edge) in graph.edges() {
            if !eligible[edge.tail.index()] || !eligible[edge.head.index()] {
                continue;
            }
            let w = edge.weight as f64;
            if edge.is_self_loop() {
                *loops.entry(edge.tail).or_insert(0.0) += 2.0 * w;
                *degree.entry(edge.tail).or_insert(0.0) += 2.0 * w;
            } else {
                *degree.entry(edge.tail).or_insert(0.0) += w;
                *degree.entry(edge.head).or_insert(0.0) += w;
            }
            m2 += 2.0 * w;
        }
        if m2 <= 0.0 {
            return None;
        }

        let nodes: Vec<NodeId> = graph
            .node_ids()
            .filter(|n| degree.get(n).is_some_and(|&k| k > 0.0))
            .collect();

        let mut community = FxHashMap::default();
        let mut tot: FxHashMap<NodeId, f64> = FxHashMap::default();
        for &n in &nodes {
            let c = community_of(graph, n);
            community.insert(n, c);
            *tot.entry(c).or_insert(0.0) += degree[&n];
        }

        let mut inner: FxHashMap<NodeId, f64> = FxHashMap::default();
        for (_, edge) in graph.edges() {
            let (Some(&ct), Some(&ch)) = (community.get(&edge.tail), community.get(&edge.head)) else {
                continue;
            };
            if ct == ch {
                *inner.entry(ct).or_insert(0.0) += 2.0 * edge.weight as f64;
            }
        }

        Some(Partition {
            nodes,
            degree,
            loops,
            community,
            tot,
            inner,
            m2,
            original_parent: IndexMap::new(),
            next_community_id: 0,
        })
    }

    fn modularity(&self) -> f64 {
        self.tot
            .iter()
            .filter(|(_, tot)| **tot > 0.0)
            .map(|(c, tot)| {
                let inner = self.inner.get(c).copied().unwrap_or(0.0);
                inner / self.m2 - (tot / self.m2).powi(2)
            })
            .sum()
    }

    fn community_count(&self) -> usize {
        self.tot.values().filter(|&&tot| tot > 1e-12).count()
    }

    /// Weight from `node` to each neighbouring community, in discovery order
    fn neighbor_communities(&self, graph: &GraphStore, node: NodeId) -> IndexMap<NodeId, f64> {
        let mut links = IndexMap::new();
        for (edge, other) in graph.neighbors(node) {
            if other == node {
                continue;
            }
            let Some(&c) = self.community.get(&other) else {
                continue;
            };
            let w = graph.edge(edge).map(|e| e.weight as f64).unwrap_or(0.0);
            *links.entry(c).or_insert(0.0) += w;
        }
        links
    }

    /// One sweep over all nodes; returns the number of moves
    fn pass(&mut self, graph: &mut GraphStore) -> GraphResult<usize> {
        let mut moves = 0;
        for i in 0..self.nodes.len() {
            let node = self.nodes[i];
            let k = self.degree[&node];
            let own_loops = self.loops.get(&node).copied().unwrap_or(0.0);
            let current = self.community[&node];
            let links = self.neighbor_communities(graph, node);
            let d_current = links.get(&current).copied().unwrap_or(0.0);

            // Take the node out of its community
            *self.tot.entry(current).or_insert(0.0) -= k;
            *self.inner.entry(current).or_insert(0.0) -= 2.0 * d_current + own_loops;

            let mut best = current;
            let mut best_gain = d_current - self.tot[&current] * k / self.m2;
            for (&c, &dnc) in &links {
                if c == current {
                    continue;
                }
                let tot = self.tot.get(&c).copied().unwrap_or(0.0);
                let gain = dnc - tot * k / self.m2;
                if gain > best_gain {
                    best = c;
                    best_gain = gain;
                }
            }

            let d_best = links.get(&best).copied().unwrap_or(0.0);
            let target = if best != current {
                moves += 1;
                self.relocate(graph, node, best)?
            } else {
                current
            };

            *self.tot.entry(target).or_insert(0.0) += k;
            *self.inner.entry(target).or_insert(0.0) += 2.0 * d_best + own_loops;
        }
        Ok(moves)
    }

    fn remember(&mut self, graph: &GraphStore, node: NodeId) {
        self.original_parent
            .entry(node)
            .or_insert_with(|| graph.parent(node));
    }

    /// Move `node` into community `to` in the hierarchy; returns the
    /// community node it ended up under
    fn relocate(&mut self, graph: &mut GraphStore, node: NodeId, to: NodeId) -> GraphResult<NodeId> {
        self.remember(graph, node);
        if graph.parent(node).is_some() {
            graph.remove_child(node)?;
        }

        let target = if graph.node_type(to) == NodeType::Community {
            to
        } else {
            // `to` is a singleton; give it a community node first
            self.remember(graph, to);
            let community = self.free_community(graph)?;
            graph.add_child(community, to)?;
            self.community.insert(to, community);
            let tot = self.tot.remove(&to).unwrap_or(0.0);
            let inner = self.inner.remove(&to).unwrap_or(0.0);
            self.tot.insert(community, tot);
            self.inner.insert(community, inner);
            community
        };

        graph.add_child(target, node)?;
        self.community.insert(node, target);
        Ok(target)
    }

    /// An unused or empty community node
    fn free_community(&mut self, graph: &mut GraphStore) -> GraphResult<NodeId> {
        loop {
            let id = self.next_community_id;
            self.next_community_id += 1;
            match graph.community_node(id) {
                None => return graph.create_community(id),
                Some(c) if graph.node(c).is_some_and(|d| d.child_count == 0) => return Ok(c),
                Some(_) => continue,
            }
        }
    }

    /// Restore every membership this call changed
    fn rollback(&mut self, graph: &mut GraphStore) -> GraphResult<()> {
        if self.original_parent.is_empty() {
            return Ok(());
        }
        for &node in self.original_parent.keys() {
            if graph.parent(node).is_some() {
                graph.remove_child(node)?;
            }
        }
        for (&node, &parent) in &self.original_parent {
            if let Some(parent) = parent {
                graph.add_child(parent, node)?;
            }
        }
        debug!(nodes = self.original_parent.len(), "louvain rolled back");
        Ok(())
    }
}
