//! Synthetic node services
//!
//! Return-or-create constructors for the group and attribute nodes that
//! simplification strategies hang real nodes under. All of them count
//! against the store's synthetic node budget.

use super::store::{GraphError, GraphResult, GraphStore};
use super::types::{NodeId, NodeKey, NodeType};

impl GraphStore {
    /// Cap the number of synthetic nodes this graph may hold
    pub fn set_max_synthetic_nodes(&mut self, limit: usize) {
        self.max_synthetic_nodes = limit;
    }

    pub fn synthetic_node_count(&self) -> usize {
        self.synthetic_count
    }

    fn synthetic(&mut self, key: NodeKey, node_type: NodeType) -> GraphResult<NodeId> {
        if let Some(id) = self.node_for_key(&key) {
            return Ok(id);
        }
        if self.synthetic_count >= self.max_synthetic_nodes {
            return Err(GraphError::CapacityExceeded {
                what: "synthetic nodes",
                limit: self.max_synthetic_nodes,
            });
        }
        Ok(self.get_or_add_node(key, node_type)?.0)
    }

    /// Community node with the given id
    pub fn create_community(&mut self, id: u64) -> GraphResult<NodeId> {
        self.synthetic(NodeKey::Community(id), NodeType::Community)
    }

    pub fn community_node(&self, id: u64) -> Option<NodeId> {
        self.node_for_key(&NodeKey::Community(id))
    }

    /// The single group collecting nodes that only ever loop onto themselves
    pub fn create_zero_degree_group(&mut self) -> GraphResult<NodeId> {
        self.synthetic(NodeKey::ZeroDegreeGroup, NodeType::ZeroDegreeGroup)
    }

    /// A fresh group for one mutual pair
    pub fn create_pairs_group(&mut self) -> GraphResult<NodeId> {
        let seq = self.next_pairs_group;
        let id = self.synthetic(NodeKey::PairsGroup(seq), NodeType::PairsGroup)?;
        self.next_pairs_group += 1;
        Ok(id)
    }

    /// Existing one-degree anchor of `node`, if any
    pub fn one_degree_node(&self, node: NodeId) -> Option<NodeId> {
        self.node_for_key(&NodeKey::OneDegree(node))
    }

    /// One-degree anchor of `node`, created on first use
    pub fn create_one_degree_node(&mut self, node: NodeId) -> GraphResult<NodeId> {
        self.node_ref(node)?;
        self.synthetic(NodeKey::OneDegree(node), NodeType::OneDegreeGroup)
    }

    pub fn create_language_node(&mut self, lang: &str) -> GraphResult<NodeId> {
        self.synthetic(NodeKey::Language(lang.to_string()), NodeType::Language)
    }

    pub fn create_application_node(&mut self, app_id: i64) -> GraphResult<NodeId> {
        self.synthetic(NodeKey::Application(app_id), NodeType::Application)
    }

    pub fn create_male_node(&mut self) -> GraphResult<NodeId> {
        self.synthetic(NodeKey::Male, NodeType::Male)
    }

    pub fn create_female_node(&mut self) -> GraphResult<NodeId> {
        self.synthetic(NodeKey::Female, NodeType::Female)
    }
}
