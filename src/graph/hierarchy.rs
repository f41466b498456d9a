//! Node hierarchy (parent/child forest)
//!
//! Invariants kept by every operation here:
//! - a node has at most one parent and is never its own ancestor;
//! - `child_count` equals the length of the node's child list, which equals
//!   the number of nodes whose `parent_node` points at it;
//! - a child's `position` is relative to its parent, a root's is absolute.
//!
//! Violations are reported as `GraphError::InvariantViolation` and leave the
//! store untouched.

use super::store::{GraphError, GraphResult, GraphStore};
use super::types::NodeId;

impl GraphStore {
    /// Attach `child` under `parent`
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> GraphResult<()> {
        self.node_ref(parent)?;
        let child_data = self.node_ref(child)?;
        if parent == child {
            return Err(GraphError::InvariantViolation(format!(
                "{} cannot be its own parent",
                child
            )));
        }
        if let Some(existing) = child_data.parent_node {
            return Err(GraphError::InvariantViolation(format!(
                "{} already has parent {}",
                child, existing
            )));
        }
        if self.ancestors(parent).any(|a| a == child) {
            return Err(GraphError::InvariantViolation(format!(
                "attaching {} under {} would create a cycle",
                child, parent
            )));
        }

        let origin = self.absolute_position(parent);
        let first = self.nodes[parent.index()].first_child;

        let c = &mut self.nodes[child.index()];
        c.parent_node = Some(parent);
        c.next_child = first;
        c.position = [c.position[0] - origin[0], c.position[1] - origin[1]];

        let p = &mut self.nodes[parent.index()];
        p.first_child = Some(child);
        p.child_count += 1;

        self.bump_version();
        Ok(())
    }

    /// Detach `child` from its parent and return the former parent
    pub fn remove_child(&mut self, child: NodeId) -> GraphResult<NodeId> {
        let parent = self.node_ref(child)?.parent_node.ok_or_else(|| {
            GraphError::InvariantViolation(format!("{} has no parent", child))
        })?;
        let origin = self.absolute_position(parent);

        // Unlink from the parent's child list
        let next = self.nodes[child.index()].next_child;
        if self.nodes[parent.index()].first_child == Some(child) {
            self.nodes[parent.index()].first_child = next;
        } else {
            let mut cursor = self.nodes[parent.index()].first_child;
            let mut unlinked = false;
            while let Some(c) = cursor {
                if self.nodes[c.index()].next_child == Some(child) {
                    self.nodes[c.index()].next_child = next;
                    unlinked = true;
                    break;
                }
                cursor = self.nodes[c.index()].next_child;
            }
            if !unlinked {
                return Err(GraphError::InvariantViolation(format!(
                    "{} missing from child list of {}",
                    child, parent
                )));
            }
        }

        let p = &mut self.nodes[parent.index()];
        p.child_count -= 1;
        if p.group_leader == Some(child) {
            p.group_leader = None;
        }

        let c = &mut self.nodes[child.index()];
        c.parent_node = None;
        c.next_child = None;
        c.position = [c.position[0] + origin[0], c.position[1] + origin[1]];

        self.bump_version();
        Ok(parent)
    }

    /// Flatten the whole hierarchy, restoring absolute positions
    pub fn remove_all_children(&mut self) {
        let absolute: Vec<[f32; 2]> = self.node_ids().map(|n| self.absolute_position(n)).collect();
        for (node, position) in self.nodes.iter_mut().zip(absolute) {
            node.parent_node = None;
            node.first_child = None;
            node.next_child = None;
            node.child_count = 0;
            node.group_leader = None;
            node.position = position;
        }
        self.active_child = None;
        self.bump_version();
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent_node)
    }

    /// Direct children of `node`, most recently attached first
    pub fn children(&self, node: NodeId) -> Children<'_> {
        Children {
            store: self,
            next: self.node(node).and_then(|n| n.first_child),
        }
    }

    /// Strict ancestors of `node`, nearest first
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            store: self,
            next: self.parent(node),
            steps: 0,
        }
    }

    /// The root of the tree containing `node`
    pub fn root_of(&self, node: NodeId) -> NodeId {
        self.ancestors(node).last().unwrap_or(node)
    }

    /// Position of `node` summed along its ancestor chain
    pub fn absolute_position(&self, node: NodeId) -> [f32; 2] {
        let mut pos = self.node(node).map(|n| n.position).unwrap_or_default();
        for a in self.ancestors(node) {
            let p = self.nodes[a.index()].position;
            pos[0] += p[0];
            pos[1] += p[1];
        }
        pos
    }

    /// Verify the forest invariants over the whole graph
    pub fn check_hierarchy(&self) -> GraphResult<()> {
        let mut pointing = vec![0u32; self.nodes.len()];
        for (idx, node) in self.nodes.iter().enumerate() {
            if let Some(parent) = node.parent_node {
                let slot = pointing.get_mut(parent.index()).ok_or_else(|| {
                    GraphError::InvariantViolation(format!(
                        "{} has dangling parent {}",
                        NodeId::new(idx),
                        parent
                    ))
                })?;
                *slot += 1;
            }
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            let id = NodeId::new(idx);
            let listed = self.children(id).take(self.nodes.len() + 1).count();
            if node.child_count != pointing[idx] || listed as u32 != pointing[idx] {
                return Err(GraphError::InvariantViolation(format!(
                    "{} has child_count {}, list length {}, {} nodes pointing at it",
                    id, node.child_count, listed, pointing[idx]
                )));
            }
            if self.children(id).any(|c| self.parent(c) != Some(id)) {
                return Err(GraphError::InvariantViolation(format!(
                    "child list of {} contains a foreign node",
                    id
                )));
            }

            // Walk up; more steps than nodes means a cycle
            let mut steps = 0usize;
            let mut cursor = node.parent_node;
            while let Some(p) = cursor {
                if p == id || steps > self.nodes.len() {
                    return Err(GraphError::InvariantViolation(format!(
                        "{} is its own ancestor",
                        id
                    )));
                }
                steps += 1;
                cursor = self.nodes[p.index()].parent_node;
            }
        }
        Ok(())
    }
}

/// Iterator over a node's child list
pub struct Children<'a> {
    store: &'a GraphStore,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.store.node(id).and_then(|n| n.next_child);
        Some(id)
    }
}

/// Iterator up the parent chain
pub struct Ancestors<'a> {
    store: &'a GraphStore,
    next: Option<NodeId>,
    steps: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        // The forest is acyclic; the bound only stops a corrupted chain
        self.steps += 1;
        if self.steps > self.store.node_count() {
            self.next = None;
            return None;
        }
        self.next = self.store.parent(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::{GraphError, GraphStore, IdAllocator, NodeType};

    fn store_with(n: usize) -> GraphStore {
        let mut store = GraphStore::new(&IdAllocator::new());
        for _ in 0..n {
            store.add_node(NodeType::Actor).unwrap();
        }
        store
    }

    #[test]
    fn test_add_and_remove_child() {
        let mut store = store_with(3);
        let (p, a, b) = (0usize.into(), 1usize.into(), 2usize.into());

        store.add_child(p, a).unwrap();
        store.add_child(p, b).unwrap();
        assert_eq!(store.node(p).unwrap().child_count, 2);
        assert_eq!(store.children(p).collect::<Vec<_>>(), vec![b, a]);
        store.check_hierarchy().unwrap();

        assert_eq!(store.remove_child(a).unwrap(), p);
        assert_eq!(store.node(p).unwrap().child_count, 1);
        assert_eq!(store.parent(a), None);
        store.check_hierarchy().unwrap();
    }

    #[test]
    fn test_double_parent_rejected() {
        let mut store = store_with(3);
        let (p, q, c) = (0usize.into(), 1usize.into(), 2usize.into());
        store.add_child(p, c).unwrap();
        let version = store.version();

        assert!(matches!(store.add_child(q, c), Err(GraphError::InvariantViolation(_))));
        assert_eq!(store.parent(c), Some(p));
        assert_eq!(store.version(), version);
    }

    #[test]
    fn test_cycles_rejected() {
        let mut store = store_with(3);
        let (a, b, c) = (0usize.into(), 1usize.into(), 2usize.into());
        assert!(store.add_child(a, a).is_err());

        store.add_child(a, b).unwrap();
        store.add_child(b, c).unwrap();
        assert!(matches!(store.add_child(c, a), Err(GraphError::InvariantViolation(_))));
        assert_eq!(store.root_of(c), a);
        store.check_hierarchy().unwrap();
    }

    #[test]
    fn test_remove_child_of_orphan_fails() {
        let mut store = store_with(1);
        assert!(matches!(
            store.remove_child(0usize.into()),
            Err(GraphError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_positions_are_relative_to_parent() {
        let mut store = store_with(2);
        let (p, c) = (0usize.into(), 1usize.into());
        store.set_position(p, [10.0, 5.0]).unwrap();
        store.set_position(c, [12.0, 9.0]).unwrap();

        store.add_child(p, c).unwrap();
        assert_eq!(store.node(c).unwrap().position, [2.0, 4.0]);
        assert_eq!(store.absolute_position(c), [12.0, 9.0]);

        store.remove_child(c).unwrap();
        assert_eq!(store.node(c).unwrap().position, [12.0, 9.0]);
    }

    #[test]
    fn test_remove_all_children() {
        let mut store = store_with(4);
        let (a, b, c, d) = (0usize.into(), 1usize.into(), 2usize.into(), 3usize.into());
        store.set_position(a, [1.0, 1.0]).unwrap();
        store.set_position(c, [3.0, 3.0]).unwrap();
        store.add_child(a, b).unwrap();
        store.add_child(b, c).unwrap();
        store.add_child(a, d).unwrap();

        store.remove_all_children();
        for n in store.node_ids() {
            assert_eq!(store.parent(n), None);
            assert_eq!(store.node(n).unwrap().child_count, 0);
        }
        assert_eq!(store.node(c).unwrap().position, [3.0, 3.0]);
        store.check_hierarchy().unwrap();
    }
}
