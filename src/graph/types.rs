//! Core type definitions for the activity graph
//!
//! All records live in dense arenas, so identifiers are plain indices. Links
//! that may be absent are expressed as `Option<NodeId>` / `Option<EdgeId>`
//! instead of a `-1` sentinel.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node inside one `GraphStore`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Id of an existing arena slot
    ///
    /// Arenas only grow through `try_new`, so any index below their length
    /// fits in 32 bits.
    pub fn new(idx: usize) -> Self {
        debug_assert!(idx <= u32::MAX as usize, "index out of id range");
        NodeId(idx as u32)
    }

    /// Id for a new arena slot, or `None` once the 32-bit id space is used up
    pub fn try_new(idx: usize) -> Option<Self> {
        u32::try_from(idx).ok().map(NodeId)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl From<usize> for NodeId {
    fn from(idx: usize) -> Self {
        NodeId::new(idx)
    }
}

/// Index of an edge inside one `GraphStore`
///
/// Edge indices are stable for the lifetime of a store: edges are append-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Id of an existing arena slot
    ///
    /// Arenas only grow through `try_new`, so any index below their length
    /// fits in 32 bits.
    pub fn new(idx: usize) -> Self {
        debug_assert!(idx <= u32::MAX as usize, "index out of id range");
        EdgeId(idx as u32)
    }

    /// Id for a new arena slot, or `None` once the 32-bit id space is used up
    pub fn try_new(idx: usize) -> Option<Self> {
        u32::try_from(idx).ok().map(EdgeId)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

impl From<usize> for EdgeId {
    fn from(idx: usize) -> Self {
        EdgeId::new(idx)
    }
}

/// Index of a face (one source activity) inside one `GraphStore`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct FaceId(pub u32);

impl FaceId {
    /// Id of an existing arena slot
    ///
    /// Arenas only grow through `try_new`, so any index below their length
    /// fits in 32 bits.
    pub fn new(idx: usize) -> Self {
        debug_assert!(idx <= u32::MAX as usize, "index out of id range");
        FaceId(idx as u32)
    }

    /// Id for a new arena slot, or `None` once the 32-bit id space is used up
    pub fn try_new(idx: usize) -> Option<Self> {
        u32::try_from(idx).ok().map(FaceId)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FaceId({})", self.0)
    }
}

/// Process-unique identity of a graph, handed out by an `IdAllocator`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct GraphId(pub u64);

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GraphId({})", self.0)
    }
}

/// Kind of a node
///
/// Source graphs only contain the content kinds (`Actor` .. `Image`); the
/// remaining kinds are synthetic nodes created by simplification strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NodeType {
    #[default]
    Unknown,
    Actor,
    Hashtag,
    Url,
    Image,
    Community,
    ZeroDegreeGroup,
    PairsGroup,
    OneDegreeGroup,
    Language,
    Application,
    Male,
    Female,
}

impl NodeType {
    /// True for nodes created by a simplification strategy rather than ingestion
    pub fn is_synthetic(&self) -> bool {
        matches!(
            self,
            NodeType::Community
                | NodeType::ZeroDegreeGroup
                | NodeType::PairsGroup
                | NodeType::OneDegreeGroup
                | NodeType::Language
                | NodeType::Application
                | NodeType::Male
                | NodeType::Female
        )
    }

    /// True for hashtag/link style content nodes
    pub fn is_content(&self) -> bool {
        matches!(self, NodeType::Hashtag | NodeType::Url | NodeType::Image)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeType::Unknown => "unknown",
            NodeType::Actor => "actor",
            NodeType::Hashtag => "hashtag",
            NodeType::Url => "url",
            NodeType::Image => "image",
            NodeType::Community => "community",
            NodeType::ZeroDegreeGroup => "zero-degree-group",
            NodeType::PairsGroup => "pairs-group",
            NodeType::OneDegreeGroup => "one-degree-group",
            NodeType::Language => "language",
            NodeType::Application => "application",
            NodeType::Male => "male",
            NodeType::Female => "female",
        };
        write!(f, "{}", s)
    }
}

/// Key of the node-index cache
///
/// Used by the return-or-create node services and by filters mapping source
/// nodes to target nodes. Swap-remove compaction keeps this cache consistent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKey {
    /// Target node standing for a node of the source graph
    Source(NodeId),
    /// External identity of an ingested node: (source system, object id)
    External { source: i64, id: i64 },
    Community(u64),
    ZeroDegreeGroup,
    PairsGroup(u64),
    /// Anchor collecting the one-degree neighbours of the given node
    OneDegree(NodeId),
    Language(String),
    Application(i64),
    Male,
    Female,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(42);
        assert_eq!(id.index(), 42);
        assert_eq!(format!("{}", id), "NodeId(42)");

        let id2: NodeId = 100usize.into();
        assert_eq!(id2.index(), 100);
    }

    #[test]
    fn test_try_new_stays_in_id_space() {
        assert_eq!(NodeId::try_new(7), Some(NodeId(7)));
        assert_eq!(FaceId::try_new(u32::MAX as usize), Some(FaceId(u32::MAX)));
        #[cfg(target_pointer_width = "64")]
        {
            assert_eq!(EdgeId::try_new(u32::MAX as usize + 1), None);
            assert_eq!(NodeId::try_new(usize::MAX), None);
        }
    }

    #[test]
    fn test_edge_id() {
        let id = EdgeId::new(99);
        assert_eq!(id.index(), 99);
        assert_eq!(format!("{}", id), "EdgeId(99)");
    }

    #[test]
    fn test_node_type_classes() {
        assert!(NodeType::PairsGroup.is_synthetic());
        assert!(NodeType::Community.is_synthetic());
        assert!(!NodeType::Actor.is_synthetic());
        assert!(NodeType::Url.is_content());
        assert!(!NodeType::Actor.is_content());
        assert_eq!(format!("{}", NodeType::OneDegreeGroup), "one-degree-group");
    }

    #[test]
    fn test_id_ordering() {
        assert!(NodeId::new(1) < NodeId::new(2));
        assert!(FaceId::new(0) < FaceId::new(7));
    }
}
