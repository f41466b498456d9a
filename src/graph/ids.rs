//! Graph identity allocation
//!
//! Every `GraphStore` carries a `GraphId` so that caches keyed by graph can
//! tell a replaced source graph from the one they were built against. The
//! allocator is passed to constructors explicitly; there is no global counter.

use super::types::GraphId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe, monotonic generator of graph identities
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        IdAllocator {
            next: AtomicU64::new(first),
        }
    }

    pub fn next_graph_id(&self) -> GraphId {
        GraphId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_ids_are_unique_across_threads() {
        let ids = Arc::new(IdAllocator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..100).map(|_| ids.next_graph_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<GraphId> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 400);
    }

    #[test]
    fn test_starting_at() {
        let ids = IdAllocator::starting_at(10);
        assert_eq!(ids.next_graph_id(), GraphId(10));
        assert_eq!(ids.next_graph_id(), GraphId(11));
    }
}
