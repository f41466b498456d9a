//! In-memory arena graph storage
//!
//! Nodes, edges and faces live in growable vectors and are addressed by
//! index. Indices are never invalidated by appends; the only operation that
//! moves a record is `swap_remove_node`, which reports the move through a
//! remap callback and rewrites every internal reference.
//!
//! Every structural mutation bumps `version`, so consumers (renderers,
//! caches) can detect staleness without diffing.

use super::edge::EdgeData;
use super::face::FaceData;
use super::ids::IdAllocator;
use super::node::{coverage_weight, NodeData};
use super::storage::ColumnStore;
use super::types::{EdgeId, FaceId, GraphId, NodeId, NodeKey, NodeType};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Invalid edge endpoint: tail {tail}, head {head}")]
    InvalidEndpoint { tail: NodeId, head: NodeId },

    #[error("Invalid edge weight: {0}")]
    InvalidWeight(f32),

    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("Face {0} not found")]
    FaceNotFound(FaceId),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Capacity exceeded: {what} (limit {limit})")]
    CapacityExceeded { what: &'static str, limit: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Id of the next slot of an arena holding `len` records
fn next_id<I>(len: usize, what: &'static str, make: fn(usize) -> Option<I>) -> GraphResult<I> {
    make(len).ok_or(GraphError::CapacityExceeded {
        what,
        limit: u32::MAX as usize,
    })
}

/// Optional parameters of `GraphStore::add_edge_with`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeOptions {
    pub face: Option<FaceId>,
    pub weight: f32,
    pub arc: u32,
    pub coverage: u64,
}

impl Default for EdgeOptions {
    fn default() -> Self {
        EdgeOptions {
            face: None,
            weight: 1.0,
            arc: 0,
            coverage: 0,
        }
    }
}

impl EdgeOptions {
    pub fn in_face(face: FaceId) -> Self {
        EdgeOptions {
            face: Some(face),
            ..Default::default()
        }
    }
}

/// Arena graph with adjacency chains, face chains and a node hierarchy
#[derive(Debug, Clone)]
pub struct GraphStore {
    id: GraphId,

    pub(crate) nodes: Vec<NodeData>,
    pub(crate) edges: Vec<EdgeData>,
    pub(crate) faces: Vec<FaceData>,

    /// Last edge of each face chain, so the chain keeps insertion order
    face_tails: Vec<Option<EdgeId>>,

    /// Node attributes (`source`, `id`, `type`, `party`, `name`, `uname`)
    pub node_columns: ColumnStore,

    /// Face attributes beyond the fixed `FaceData` fields
    pub face_columns: ColumnStore,

    /// Node-index cache for keyed nodes
    pub(crate) node_keys: FxHashMap<NodeKey, NodeId>,
    pub(crate) key_of: FxHashMap<NodeId, NodeKey>,

    version: u64,
    total_edge_weight: f64,
    max_edge_weight: f32,
    time_range: Option<(i64, i64)>,

    /// The open hierarchy node (see `visible`)
    pub(crate) active_child: Option<NodeId>,

    /// Whether consumers of this graph need temporal coverage
    temporal_coverage: bool,

    pub(crate) synthetic_count: usize,
    pub(crate) max_synthetic_nodes: usize,
    pub(crate) next_pairs_group: u64,
}

impl GraphStore {
    /// Create a new empty graph, taking its identity from `ids`
    pub fn new(ids: &IdAllocator) -> Self {
        GraphStore {
            id: ids.next_graph_id(),
            nodes: Vec::with_capacity(1024),
            edges: Vec::with_capacity(4096),
            faces: Vec::with_capacity(1024),
            face_tails: Vec::with_capacity(1024),
            node_columns: ColumnStore::new(),
            face_columns: ColumnStore::new(),
            node_keys: FxHashMap::default(),
            key_of: FxHashMap::default(),
            version: 1,
            total_edge_weight: 0.0,
            max_edge_weight: 0.0,
            time_range: None,
            active_child: None,
            temporal_coverage: true,
            synthetic_count: 0,
            max_synthetic_nodes: usize::MAX,
            next_pairs_group: 0,
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn total_edge_weight(&self) -> f64 {
        self.total_edge_weight
    }

    pub fn max_edge_weight(&self) -> f32 {
        self.max_edge_weight
    }

    /// Earliest and latest face timestamp
    pub fn time_range(&self) -> Option<(i64, i64)> {
        self.time_range
    }

    pub fn has_temporal_coverage(&self) -> bool {
        self.temporal_coverage
    }

    pub fn set_temporal_coverage(&mut self, enabled: bool) {
        self.temporal_coverage = enabled;
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Append a node
    pub fn add_node(&mut self, node_type: NodeType) -> GraphResult<NodeId> {
        let id = next_id(self.nodes.len(), "nodes", NodeId::try_new)?;
        self.nodes.push(NodeData::new(node_type, self.version));
        if node_type.is_synthetic() {
            self.synthetic_count += 1;
        }
        self.bump_version();
        Ok(id)
    }

    /// Return the node cached under `key`, creating it if absent
    ///
    /// The boolean is `true` when the node was created by this call.
    pub fn get_or_add_node(
        &mut self,
        key: NodeKey,
        node_type: NodeType,
    ) -> GraphResult<(NodeId, bool)> {
        if let Some(&id) = self.node_keys.get(&key) {
            return Ok((id, false));
        }
        let id = self.add_node(node_type)?;
        self.key_of.insert(id, key.clone());
        self.node_keys.insert(key, id);
        Ok((id, true))
    }

    pub fn node_for_key(&self, key: &NodeKey) -> Option<NodeId> {
        self.node_keys.get(key).copied()
    }

    pub fn key_for_node(&self, node: NodeId) -> Option<&NodeKey> {
        self.key_of.get(&node)
    }

    /// Append a face
    pub fn add_face(&mut self, face: FaceData) -> GraphResult<FaceId> {
        let id = next_id(self.faces.len(), "faces", FaceId::try_new)?;
        let t = face.timestamp;
        self.time_range = Some(match self.time_range {
            Some((lo, hi)) => (lo.min(t), hi.max(t)),
            None => (t, t),
        });
        self.faces.push(face);
        self.face_tails.push(None);
        Ok(id)
    }

    /// Add an edge with weight 1 and no face, arc or coverage
    pub fn add_edge(&mut self, tail: NodeId, head: NodeId) -> GraphResult<EdgeId> {
        self.add_edge_with(tail, head, EdgeOptions::default())
    }

    /// Add an edge
    ///
    /// Updates both adjacency chains, the weighted degrees and coverage of
    /// both endpoints, the graph's total and max edge weight, and the face
    /// chain when `opts.face` is set.
    pub fn add_edge_with(
        &mut self,
        tail: NodeId,
        head: NodeId,
        opts: EdgeOptions,
    ) -> GraphResult<EdgeId> {
        if tail.index() >= self.nodes.len() || head.index() >= self.nodes.len() {
            return Err(GraphError::InvalidEndpoint { tail, head });
        }
        if !(opts.weight >= 0.0) || !opts.weight.is_finite() {
            return Err(GraphError::InvalidWeight(opts.weight));
        }
        if let Some(face) = opts.face {
            if face.index() >= self.faces.len() {
                return Err(GraphError::FaceNotFound(face));
            }
        }

        let id = next_id(self.edges.len(), "edges", EdgeId::try_new)?;
        let mut edge = EdgeData::new(tail, head, opts.weight);
        edge.arc = opts.arc;
        edge.coverage = opts.coverage;
        edge.face = opts.face;

        // Prepend to the adjacency chains
        edge.next_node_edge = self.nodes[tail.index()].first_edge.replace(id);
        edge.next_head_edge = self.nodes[head.index()].first_in_edge.replace(id);

        let weight = opts.weight as f64;
        self.nodes[tail.index()].outdegree += weight;
        self.nodes[head.index()].indegree += weight;
        if opts.coverage != 0 {
            self.nodes[tail.index()].merge_coverage(opts.coverage);
            self.nodes[head.index()].merge_coverage(opts.coverage);
        }

        self.total_edge_weight += weight;
        self.max_edge_weight = self.max_edge_weight.max(opts.weight);

        // Append to the face chain
        if let Some(face) = opts.face {
            match self.face_tails[face.index()] {
                Some(last) => self.edges[last.index()].next_face_edge = Some(id),
                None => self.faces[face.index()].first_edge = Some(id),
            }
            self.face_tails[face.index()] = Some(id);
        }

        self.edges.push(edge);
        self.bump_version();
        Ok(id)
    }

    /// Add `a -> b` and `b -> a`, linked to each other through `pair_edge`
    pub fn add_edge_pair(
        &mut self,
        a: NodeId,
        b: NodeId,
        opts: EdgeOptions,
    ) -> GraphResult<(EdgeId, EdgeId)> {
        let forward = self.add_edge_with(a, b, opts)?;
        let backward = self.add_edge_with(b, a, opts)?;
        self.edges[forward.index()].pair_edge = Some(backward);
        self.edges[backward.index()].pair_edge = Some(forward);
        Ok((forward, backward))
    }

    /// OR `bits` into an edge's coverage and re-derive its weight
    ///
    /// The new weight is `popcount(coverage) / 64`; degree accumulators and
    /// totals move by the weight delta. Returns `false` if nothing changed.
    pub fn update_edge_coverage(&mut self, edge: EdgeId, bits: u64) -> GraphResult<bool> {
        let data = self
            .edges
            .get_mut(edge.index())
            .ok_or(GraphError::EdgeNotFound(edge))?;

        let merged = data.coverage | bits;
        if merged == data.coverage {
            return Ok(false);
        }
        data.coverage = merged;
        let old_weight = data.weight;
        data.weight = coverage_weight(merged);
        let (tail, head, new_weight) = (data.tail, data.head, data.weight);

        let delta = (new_weight - old_weight) as f64;
        self.nodes[tail.index()].outdegree += delta;
        self.nodes[head.index()].indegree += delta;
        self.nodes[tail.index()].merge_coverage(bits);
        self.nodes[head.index()].merge_coverage(bits);
        self.total_edge_weight += delta;
        self.max_edge_weight = self.max_edge_weight.max(new_weight);

        self.bump_version();
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    /// Tertiary data of a node
    pub fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.index())
    }

    pub fn edge(&self, id: EdgeId) -> Option<&EdgeData> {
        self.edges.get(id.index())
    }

    pub fn face(&self, id: FaceId) -> Option<&FaceData> {
        self.faces.get(id.index())
    }

    pub(crate) fn node_ref(&self, id: NodeId) -> GraphResult<&NodeData> {
        self.nodes.get(id.index()).ok_or(GraphError::NodeNotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> GraphResult<&mut NodeData> {
        self.nodes.get_mut(id.index()).ok_or(GraphError::NodeNotFound(id))
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn node_type(&self, id: NodeId) -> NodeType {
        self.node(id).map(|n| n.node_type).unwrap_or_default()
    }

    /// Set a face's label and whether it should be displayed
    pub fn set_face_label(
        &mut self,
        face: FaceId,
        label: impl Into<String>,
        visible: bool,
    ) -> GraphResult<()> {
        let data = self
            .faces
            .get_mut(face.index())
            .ok_or(GraphError::FaceNotFound(face))?;
        data.label = label.into();
        data.label_visible = visible;
        Ok(())
    }

    /// Set a node's position (relative to its parent if it has one)
    pub fn set_position(&mut self, node: NodeId, position: [f32; 2]) -> GraphResult<()> {
        self.node_mut(node)?.position = position;
        Ok(())
    }

    pub fn set_group_leader(&mut self, group: NodeId, leader: Option<NodeId>) -> GraphResult<()> {
        self.node_mut(group)?.group_leader = leader;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// Outgoing edges of `node`, walking the `next_node_edge` chain
    pub fn out_edges(&self, node: NodeId) -> EdgeChain<'_> {
        EdgeChain {
            store: self,
            next: self.node(node).and_then(|n| n.first_edge),
            link: ChainLink::Tail,
        }
    }

    /// Incoming edges of `node`, walking the `next_head_edge` chain
    pub fn in_edges(&self, node: NodeId) -> EdgeChain<'_> {
        EdgeChain {
            store: self,
            next: self.node(node).and_then(|n| n.first_in_edge),
            link: ChainLink::Head,
        }
    }

    /// Edges of a face in insertion order
    pub fn face_edges(&self, face: FaceId) -> EdgeChain<'_> {
        EdgeChain {
            store: self,
            next: self.face(face).and_then(|f| f.first_edge),
            link: ChainLink::Face,
        }
    }

    /// Neighbours of `node` in both directions, with the connecting edge
    ///
    /// A self-loop is reported once.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, NodeId)> + '_ {
        let outgoing = self.out_edges(node).map(|(id, e)| (id, e.head));
        let incoming = self
            .in_edges(node)
            .filter(|(_, e)| !e.is_self_loop())
            .map(|(id, e)| (id, e.tail));
        outgoing.chain(incoming)
    }

    /// All edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeData)> + '_ {
        self.edges.iter().enumerate().map(|(i, e)| (EdgeId::new(i), e))
    }

    /// All node ids
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId::new)
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Drop all nodes, edges and faces; identity and settings are kept
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.faces.clear();
        self.face_tails.clear();
        self.node_columns.clear();
        self.face_columns.clear();
        self.node_keys.clear();
        self.key_of.clear();
        self.total_edge_weight = 0.0;
        self.max_edge_weight = 0.0;
        self.time_range = None;
        self.active_child = None;
        self.synthetic_count = 0;
        self.next_pairs_group = 0;
        self.bump_version();
    }

    /// Hide a node: detach it from its parent and children and clear its
    /// adjacency heads. The edges themselves stay in the arena.
    pub fn detach_node(&mut self, node: NodeId) -> GraphResult<()> {
        self.node_ref(node)?;
        if self.nodes[node.index()].parent_node.is_some() {
            self.remove_child(node)?;
        }
        let children: Vec<NodeId> = self.children(node).collect();
        for child in children {
            self.remove_child(child)?;
        }
        let data = &mut self.nodes[node.index()];
        data.first_edge = None;
        data.first_in_edge = None;
        data.group_leader = None;
        if self.active_child == Some(node) {
            self.active_child = None;
        }
        self.bump_version();
        Ok(())
    }

    /// Remove a node by moving the last node into its slot
    ///
    /// The node must not be referenced by any edge and must be outside the
    /// hierarchy. Every reference to the moved node (edges, hierarchy links,
    /// group leaders, node-key cache, attribute rows) is rewritten, and
    /// `remap(old, new)` is called so callers can fix their own indices.
    /// Any `NodeId` equal to the old last index held outside the store is
    /// invalid afterwards.
    pub fn swap_remove_node<F>(&mut self, node: NodeId, mut remap: F) -> GraphResult<()>
    where
        F: FnMut(NodeId, NodeId),
    {
        let data = self.node_ref(node)?;
        if data.parent_node.is_some() || data.child_count > 0 {
            return Err(GraphError::InvariantViolation(format!(
                "cannot swap-remove {} while it is part of the hierarchy",
                node
            )));
        }
        if self.edges.iter().any(|e| e.tail == node || e.head == node) {
            return Err(GraphError::InvariantViolation(format!(
                "cannot swap-remove {} while edges reference it",
                node
            )));
        }

        let last = NodeId::new(self.nodes.len() - 1);
        if self.nodes[node.index()].node_type.is_synthetic() {
            self.synthetic_count -= 1;
        }
        if let Some(key) = self.key_of.remove(&node) {
            self.node_keys.remove(&key);
        }
        for n in self.nodes.iter_mut() {
            if n.group_leader == Some(node) {
                n.group_leader = None;
            }
        }
        if self.active_child == Some(node) {
            self.active_child = None;
        }

        if node != last {
            for e in self.edges.iter_mut() {
                if e.tail == last {
                    e.tail = node;
                }
                if e.head == last {
                    e.head = node;
                }
            }

            // Re-point the hierarchy at the new slot
            let moved = self.nodes[last.index()].clone();
            if let Some(parent) = moved.parent_node {
                if self.nodes[parent.index()].first_child == Some(last) {
                    self.nodes[parent.index()].first_child = Some(node);
                } else {
                    let mut cursor = self.nodes[parent.index()].first_child;
                    while let Some(c) = cursor {
                        if self.nodes[c.index()].next_child == Some(last) {
                            self.nodes[c.index()].next_child = Some(node);
                            break;
                        }
                        cursor = self.nodes[c.index()].next_child;
                    }
                }
            }
            let mut child = moved.first_child;
            while let Some(c) = child {
                self.nodes[c.index()].parent_node = Some(node);
                child = self.nodes[c.index()].next_child;
            }
            for n in self.nodes.iter_mut() {
                if n.group_leader == Some(last) {
                    n.group_leader = Some(node);
                }
            }
            if self.active_child == Some(last) {
                self.active_child = Some(node);
            }

            if let Some(key) = self.key_of.remove(&last) {
                self.node_keys.insert(key.clone(), node);
                self.key_of.insert(node, key);
            }
            remap(last, node);
        }

        self.nodes.swap_remove(node.index());
        self.node_columns.swap_remove_row(node.index(), last.index());
        self.bump_version();
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum ChainLink {
    Tail,
    Head,
    Face,
}

/// Iterator over an intrusive edge chain
pub struct EdgeChain<'a> {
    store: &'a GraphStore,
    next: Option<EdgeId>,
    link: ChainLink,
}

impl<'a> Iterator for EdgeChain<'a> {
    type Item = (EdgeId, &'a EdgeData);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let edge = self.store.edges.get(id.index())?;
        self.next = match self.link {
            ChainLink::Tail => edge.next_node_edge,
            ChainLink::Head => edge.next_head_edge,
            ChainLink::Face => edge.next_face_edge,
        };
        Some((id, edge))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> GraphStore {
        GraphStore::new(&IdAllocator::new())
    }

    #[test]
    fn test_id_space_exhaustion_is_reported() {
        assert_eq!(next_id(3, "nodes", NodeId::try_new).unwrap(), NodeId::new(3));
        #[cfg(target_pointer_width = "64")]
        assert_eq!(
            next_id(u32::MAX as usize + 1, "edges", EdgeId::try_new),
            Err(GraphError::CapacityExceeded {
                what: "edges",
                limit: u32::MAX as usize
            })
        );
    }

    #[test]
    fn test_add_edge_updates_adjacency_and_degrees() {
        let mut store = store();
        let a = store.add_node(NodeType::Actor).unwrap();
        let b = store.add_node(NodeType::Hashtag).unwrap();
        let c = store.add_node(NodeType::Url).unwrap();

        store.add_edge(a, b).unwrap();
        store
            .add_edge_with(a, c, EdgeOptions { weight: 2.0, coverage: 0b10, ..Default::default() })
            .unwrap();

        assert_eq!(store.out_edges(a).count(), 2);
        assert_eq!(store.in_edges(b).count(), 1);
        assert_eq!(store.node(a).unwrap().outdegree, 3.0);
        assert_eq!(store.node(c).unwrap().indegree, 2.0);
        assert_eq!(store.node(c).unwrap().coverage, 0b10);
        assert_eq!(store.total_edge_weight(), 3.0);
        assert_eq!(store.max_edge_weight(), 2.0);
    }

    #[test]
    fn test_add_edge_rejects_bad_input() {
        let mut store = store();
        let a = store.add_node(NodeType::Actor).unwrap();
        let version = store.version();

        assert_eq!(
            store.add_edge(a, NodeId(5)),
            Err(GraphError::InvalidEndpoint { tail: a, head: NodeId(5) })
        );
        assert_eq!(
            store.add_edge_with(a, a, EdgeOptions { weight: -1.0, ..Default::default() }),
            Err(GraphError::InvalidWeight(-1.0))
        );
        assert_eq!(
            store.add_edge_with(a, a, EdgeOptions::in_face(FaceId(0))),
            Err(GraphError::FaceNotFound(FaceId(0)))
        );
        assert_eq!(store.version(), version);
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn test_face_chain_keeps_insertion_order() {
        let mut store = store();
        let a = store.add_node(NodeType::Actor).unwrap();
        let b = store.add_node(NodeType::Hashtag).unwrap();
        let c = store.add_node(NodeType::Url).unwrap();
        let face = store.add_face(FaceData::new(100, 0.5)).unwrap();

        let e1 = store.add_edge_with(a, b, EdgeOptions::in_face(face)).unwrap();
        let e2 = store.add_edge_with(a, c, EdgeOptions::in_face(face)).unwrap();

        let chain: Vec<EdgeId> = store.face_edges(face).map(|(id, _)| id).collect();
        assert_eq!(chain, vec![e1, e2]);
        assert_eq!(store.face(face).unwrap().first_edge, Some(e1));
        assert_eq!(store.time_range(), Some((100, 100)));
    }

    #[test]
    fn test_update_edge_coverage() {
        let mut store = store();
        let a = store.add_node(NodeType::Actor).unwrap();
        let b = store.add_node(NodeType::Actor).unwrap();
        let e = store
            .add_edge_with(a, b, EdgeOptions { weight: 1.0 / 64.0, coverage: 1, ..Default::default() })
            .unwrap();

        let v = store.version();
        assert!(store.update_edge_coverage(e, 0b110).unwrap());
        assert!(store.version() > v);
        assert_eq!(store.edge(e).unwrap().weight, 3.0 / 64.0);
        assert!((store.node(a).unwrap().outdegree - 3.0 / 64.0).abs() < 1e-9);
        assert_eq!(store.node(b).unwrap().coverage, 0b111);

        // No new bits: no change, no version bump
        let v = store.version();
        assert!(!store.update_edge_coverage(e, 0b010).unwrap());
        assert_eq!(store.version(), v);
    }

    #[test]
    fn test_neighbors_both_directions() {
        let mut store = store();
        let a = store.add_node(NodeType::Actor).unwrap();
        let b = store.add_node(NodeType::Actor).unwrap();
        let c = store.add_node(NodeType::Actor).unwrap();
        store.add_edge(a, b).unwrap();
        store.add_edge(c, a).unwrap();
        store.add_edge(a, a).unwrap();

        let mut neighbors: Vec<NodeId> = store.neighbors(a).map(|(_, n)| n).collect();
        neighbors.sort();
        assert_eq!(neighbors, vec![a, b, c]);
    }

    #[test]
    fn test_edge_pair() {
        let mut store = store();
        let a = store.add_node(NodeType::Actor).unwrap();
        let b = store.add_node(NodeType::Actor).unwrap();
        let (f, r) = store.add_edge_pair(a, b, EdgeOptions::default()).unwrap();
        assert_eq!(store.edge(f).unwrap().pair_edge, Some(r));
        assert_eq!(store.edge(r).unwrap().pair_edge, Some(f));
        assert_eq!(store.node(a).unwrap().degree(), 2.0);
    }

    #[test]
    fn test_keyed_nodes() {
        let mut store = store();
        let (n1, created) = store.get_or_add_node(NodeKey::External { source: 1, id: 9 }, NodeType::Actor).unwrap();
        assert!(created);
        let (n2, created) = store.get_or_add_node(NodeKey::External { source: 1, id: 9 }, NodeType::Actor).unwrap();
        assert!(!created);
        assert_eq!(n1, n2);
        assert_eq!(store.key_for_node(n1), Some(&NodeKey::External { source: 1, id: 9 }));
    }

    #[test]
    fn test_swap_remove_node_remaps() {
        let mut store = store();
        let lonely = store.add_node(NodeType::Actor).unwrap();
        let b = store.add_node(NodeType::Actor).unwrap();
        let (last, _) = store.get_or_add_node(NodeKey::External { source: 0, id: 3 }, NodeType::Actor).unwrap();
        store.node_columns.set_property(last.index(), "name", "moved".into());
        let e = store.add_edge(b, last).unwrap();

        let mut moves = Vec::new();
        store.swap_remove_node(lonely, |old, new| moves.push((old, new))).unwrap();

        assert_eq!(moves, vec![(last, lonely)]);
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.edge(e).unwrap().head, lonely);
        assert_eq!(store.node_for_key(&NodeKey::External { source: 0, id: 3 }), Some(lonely));
        assert_eq!(store.node_columns.get_property(lonely.index(), "name").as_text(), Some("moved"));
        assert_eq!(store.in_edges(lonely).count(), 1);
    }

    #[test]
    fn test_swap_remove_rejects_connected_node() {
        let mut store = store();
        let a = store.add_node(NodeType::Actor).unwrap();
        let b = store.add_node(NodeType::Actor).unwrap();
        store.add_edge(a, b).unwrap();
        assert!(matches!(
            store.swap_remove_node(a, |_, _| {}),
            Err(GraphError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_clear_keeps_identity() {
        let mut store = store();
        let id = store.id();
        let a = store.add_node(NodeType::Actor).unwrap();
        store.add_edge(a, a).unwrap();
        store.clear();
        assert_eq!(store.id(), id);
        assert_eq!(store.node_count(), 0);
        assert_eq!(store.edge_count(), 0);
        assert_eq!(store.total_edge_weight(), 0.0);
    }
}
