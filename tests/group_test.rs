use graph_strata::filter::group::{GroupSimplifier, Membership};
use graph_strata::filter::{Filter, Strategy, Window};
use graph_strata::graph::{EdgeOptions, FaceData, GraphStore, IdAllocator, NodeId, NodeKey, NodeType};
use graph_strata::stats::ActivityStatistics;
use graph_strata::FilterConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

fn group_state(filter: &Filter) -> &GroupSimplifier {
    match filter.strategy() {
        Strategy::Group(group) => group,
        other => panic!("expected group strategy, got {}", other.name()),
    }
}

fn add_activity(source: &mut GraphStore, t: i64, edges: &[(NodeId, NodeId)]) {
    let face = source.add_face(FaceData::new(t, 0.0)).unwrap();
    for &(a, b) in edges {
        source.add_edge_with(a, b, EdgeOptions::in_face(face)).unwrap();
    }
}

fn target_of(target: &GraphStore, node: NodeId) -> NodeId {
    target.node_for_key(&NodeKey::Source(node)).unwrap()
}

/// Every grouped node sits under the right kind of group, nothing else has a parent
fn assert_groups_consistent(group: &GroupSimplifier, target: &GraphStore) {
    let mut seen: HashMap<NodeId, usize> = HashMap::new();
    for n in group.zero_degree_nodes() {
        *seen.entry(n).or_default() += 1;
    }
    for (a, b) in group.pairs() {
        *seen.entry(a).or_default() += 1;
        *seen.entry(b).or_default() += 1;
    }
    for (n, _) in group.one_degree_nodes() {
        *seen.entry(n).or_default() += 1;
    }
    assert!(seen.values().all(|&count| count == 1), "node in two groupings");

    for node in target.node_ids() {
        if target.node_type(node).is_synthetic() {
            continue;
        }
        let parent = target.parent(node);
        match group.membership(node) {
            None => assert_eq!(parent, None, "{} has a parent but no grouping", node),
            Some(Membership::ZeroDegree) => {
                assert_eq!(target.node_type(parent.unwrap()), NodeType::ZeroDegreeGroup)
            }
            Some(Membership::Pair(partner)) => {
                assert_eq!(target.node_type(parent.unwrap()), NodeType::PairsGroup);
                assert_eq!(target.parent(partner), parent);
                assert_eq!(group.partner(partner), Some(node));
            }
            Some(Membership::OneDegree(neighbor)) => {
                assert_eq!(parent, target.one_degree_node(neighbor));
                assert!(group.degree(node) >= 1);
            }
        }
    }
    target.check_hierarchy().unwrap();
}

#[test]
fn test_two_pairs_scenario() {
    let mut source = GraphStore::new(&IdAllocator::new());
    let n: Vec<NodeId> = (0..4).map(|_| source.add_node(NodeType::Actor).unwrap()).collect();
    add_activity(&mut source, 1, &[(n[0], n[1])]);
    add_activity(&mut source, 2, &[(n[2], n[3])]);

    let mut target = GraphStore::new(&IdAllocator::new());
    let mut filter = Filter::group(FilterConfig::default());
    filter
        .apply(&mut target, Window::unbounded(), &source, &mut ActivityStatistics::new())
        .unwrap();

    let group = group_state(&filter);
    let [a, b, c, d] = [0, 1, 2, 3].map(|i| target_of(&target, n[i]));
    assert_eq!(group.pairs(), vec![(a, b), (c, d)]);
    assert_eq!(group.partner(a), Some(b));
    assert_eq!(group.partner(c), Some(d));

    let first = target.parent(a).unwrap();
    let second = target.parent(c).unwrap();
    assert_ne!(first, second);
    assert_eq!(target.parent(b), Some(first));
    assert_eq!(target.parent(d), Some(second));
    assert_eq!(target.children(first).count(), 2);
    assert_eq!(target.children(second).count(), 2);
    assert_groups_consistent(group, &target);

    // Both pairs render collapsed until one is opened
    let visible: Vec<NodeId> = target.visible_nodes().collect();
    assert_eq!(visible, vec![first, second]);
    target.set_active_child(Some(a)).unwrap();
    let visible: Vec<NodeId> = target.visible_nodes().collect();
    assert_eq!(visible, vec![a, b, first, second]);
}

#[test]
fn test_star_folds_leaves_under_hub_anchor() {
    let mut source = GraphStore::new(&IdAllocator::new());
    let hub = source.add_node(NodeType::Actor).unwrap();
    let leaves: Vec<NodeId> = (0..5).map(|_| source.add_node(NodeType::Hashtag).unwrap()).collect();
    for (i, &leaf) in leaves.iter().enumerate() {
        add_activity(&mut source, i as i64, &[(hub, leaf)]);
    }

    let mut target = GraphStore::new(&IdAllocator::new());
    let mut filter = Filter::group(FilterConfig::default());
    filter
        .apply(&mut target, Window::unbounded(), &source, &mut ActivityStatistics::new())
        .unwrap();

    let group = group_state(&filter);
    let hub_t = target_of(&target, hub);
    let anchor = target.one_degree_node(hub_t).unwrap();
    assert_eq!(target.parent(hub_t), None);
    assert_eq!(target.node(anchor).unwrap().child_count, 5);
    assert!(group.pairs().is_empty());
    for &leaf in &leaves {
        let leaf_t = target_of(&target, leaf);
        assert_eq!(group.membership(leaf_t), Some(Membership::OneDegree(hub_t)));
    }
    assert_groups_consistent(group, &target);

    // Hub and anchor are what remains on screen; the edges collapse onto them
    let visible: Vec<NodeId> = target.visible_nodes().collect();
    assert_eq!(visible, vec![hub_t, anchor]);
    for edge in target.visible_edges() {
        assert_eq!((edge.tail, edge.head), (hub_t, anchor));
    }
}

#[test]
fn test_triangle_closes_into_pair() {
    let mut source = GraphStore::new(&IdAllocator::new());
    let n: Vec<NodeId> = (0..3).map(|_| source.add_node(NodeType::Actor).unwrap()).collect();
    add_activity(&mut source, 1, &[(n[0], n[1])]);
    add_activity(&mut source, 2, &[(n[0], n[2])]);
    add_activity(&mut source, 3, &[(n[1], n[2])]);

    let mut target = GraphStore::new(&IdAllocator::new());
    let mut filter = Filter::group(FilterConfig::default());
    filter
        .apply(&mut target, Window::unbounded(), &source, &mut ActivityStatistics::new())
        .unwrap();

    let group = group_state(&filter);
    let [a, b, c] = [0, 1, 2].map(|i| target_of(&target, n[i]));
    assert_eq!(group.membership(a), None);
    assert_eq!(group.membership(b), Some(Membership::Pair(c)));
    assert_eq!(group.membership(c), Some(Membership::Pair(b)));
    assert_eq!(group.pairs(), vec![(b, c)]);

    let anchor = target.one_degree_node(a).unwrap();
    assert_eq!(target.node(anchor).unwrap().child_count, 0);
    assert_eq!(target.node_type(target.parent(b).unwrap()), NodeType::PairsGroup);
    assert_groups_consistent(group, &target);
}

#[test]
fn test_random_streams_keep_groupings_exclusive() {
    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut source = GraphStore::new(&IdAllocator::new());
        let nodes: Vec<NodeId> = (0..30).map(|_| source.add_node(NodeType::Actor).unwrap()).collect();

        let mut target = GraphStore::new(&IdAllocator::new());
        let mut filter = Filter::group(FilterConfig::default());
        let mut stats = ActivityStatistics::new();

        for t in 0..200 {
            let a = nodes[rng.gen_range(0..nodes.len())];
            // Mostly sparse links, some self-loops
            let b = if rng.gen_bool(0.1) { a } else { nodes[rng.gen_range(0..nodes.len())] };
            add_activity(&mut source, t, &[(a, b)]);

            if t % 7 == 0 {
                filter.apply(&mut target, Window::unbounded(), &source, &mut stats).unwrap();
                assert_groups_consistent(group_state(&filter), &target);
            }
        }
        filter.apply(&mut target, Window::unbounded(), &source, &mut stats).unwrap();
        assert_groups_consistent(group_state(&filter), &target);
    }
}

#[test]
fn test_reset_clears_groupings() {
    let mut source = GraphStore::new(&IdAllocator::new());
    let n: Vec<NodeId> = (0..2).map(|_| source.add_node(NodeType::Actor).unwrap()).collect();
    add_activity(&mut source, 1, &[(n[0], n[1])]);

    let mut target = GraphStore::new(&IdAllocator::new());
    let mut filter = Filter::group(FilterConfig::default());
    filter
        .apply(&mut target, Window::unbounded(), &source, &mut ActivityStatistics::new())
        .unwrap();
    assert_eq!(group_state(&filter).pairs().len(), 1);

    filter.reset();
    assert!(group_state(&filter).pairs().is_empty());
    assert_eq!(group_state(&filter).degree(NodeId(0)), 0);
}
