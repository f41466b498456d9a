use anyhow::Context;
use graph_strata::filter::{Filter, Window};
use graph_strata::graph::{AttributeTable, EdgeOptions, FaceData, PropertyValue};
use graph_strata::{
    ActivityStatistics, FilterConfig, GraphResult, GraphStore, IdAllocator, NodeId, NodeType,
    SharedGraph,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ACTORS: usize = 200;
const HASHTAGS: usize = 40;
const FACES: usize = 2_000;
const SPAN_SECS: i64 = 7 * 24 * 3600;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Graph Strata v{}", graph_strata::version());
    println!("==========================================");
    println!();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let yaml = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path))?;
            FilterConfig::from_yaml_str(&yaml).with_context(|| format!("parsing config {}", path))?
        }
        None => FilterConfig::default(),
    };

    let ids = IdAllocator::new();
    let source = synthetic_source(&ids, 7)?;
    println!(
        "Source graph: {} nodes, {} edges, {} faces",
        source.node_count(),
        source.edge_count(),
        source.face_count()
    );

    // First half of the week
    let window = Window::time(0, SPAN_SECS / 2);

    for mut filter in [
        Filter::flat(config.clone()),
        Filter::group(config.clone()),
        Filter::louvain(config.clone()),
    ] {
        let name = filter.strategy().name();
        println!("\n=== Strategy: {} ===", name);

        let target = SharedGraph::new(GraphStore::new(&ids));
        let mut stats = ActivityStatistics::new();
        let changed = filter
            .apply_shared(&target, window, &source, &mut stats)
            .with_context(|| format!("{} filter failed", name))?;

        let graph = target.read();
        println!("changed: {}", changed);
        println!(
            "target: {} nodes ({} synthetic), {} edges, {} visible",
            graph.node_count(),
            graph.synthetic_node_count(),
            graph.edge_count(),
            graph.visible_nodes().count()
        );
        println!("top hashtags: {:?}", stats.top_hashtags(3));
        if name == "flat" {
            println!("{}", stats.to_json()?);
        }
    }

    Ok(())
}

/// Actors posting hashtags and replying to each other over one week
fn synthetic_source(ids: &IdAllocator, seed: u64) -> GraphResult<GraphStore> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = GraphStore::new(ids);

    let mut actors: Vec<NodeId> = Vec::with_capacity(ACTORS);
    for i in 0..ACTORS {
        let n = graph.add_node(NodeType::Actor)?;
        graph.node_columns.set_value(n.index(), "source", PropertyValue::Int(1));
        graph.node_columns.set_value(n.index(), "id", PropertyValue::Int(i as i64));
        graph.node_columns.set_value(n.index(), "type", PropertyValue::Int((i % 3) as i64));
        actors.push(n);
    }
    let mut hashtags: Vec<NodeId> = Vec::with_capacity(HASHTAGS);
    for i in 0..HASHTAGS {
        let n = graph.add_node(NodeType::Hashtag)?;
        graph.node_columns.set_value(n.index(), "name", format!("#topic{}", i).into());
        hashtags.push(n);
    }

    let mut times: Vec<i64> = (0..FACES).map(|_| rng.gen_range(0..SPAN_SECS)).collect();
    times.sort_unstable();

    for t in times {
        let face = graph.add_face(
            FaceData::new(t, rng.gen_range(-1.0..=1.0)).with_lang(rng.gen_range(0..4)),
        )?;
        // Low-index actors are far more active
        let author = actors[(rng.gen::<f64>().powi(3) * ACTORS as f64) as usize];
        let tag = hashtags[rng.gen_range(0..HASHTAGS)];
        graph.add_edge_with(author, tag, EdgeOptions::in_face(face))?;
        if rng.gen_bool(0.3) {
            let other = actors[rng.gen_range(0..ACTORS)];
            graph.add_edge_with(author, other, EdgeOptions::in_face(face))?;
        }
    }
    Ok(graph)
}
