//! Windowed, resumable simplification of a source graph into a target graph
//!
//! A `Filter` owns a cursor into the source graph's edge sequence. The first
//! `apply` after construction or `reset` starts FRESH: the target graph,
//! statistics and strategy state are cleared and the scan starts at edge 0.
//! Later calls RESUME from the stored offset, which is sound only because
//! source edges are append-only and never reordered. Call `reset` whenever
//! the source graph is replaced or truncated.
//!
//! All strategies share one scan routine (`Filter::scan`); they differ only
//! in what they do with each accepted edge.

pub mod flat;
pub mod group;
pub mod louvain;

pub use flat::FlatSimplifier;
pub use group::GroupSimplifier;
pub use louvain::LouvainSimplifier;

use crate::config::FilterConfig;
use crate::graph::{
    EdgeData, EdgeId, FaceData, FaceId, GraphError, GraphResult, GraphStore, SharedGraph,
};
use crate::stats::StatsSink;
use tracing::{debug, error, info, warn};

/// Time and sentiment bounds of an `apply` call
///
/// Times are half-open (`start <= t < end`), sentiments closed
/// (`start <= s <= end`). A `None` bound is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Window {
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub start_sentiment: Option<f32>,
    pub end_sentiment: Option<f32>,
}

impl Window {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn time(start: i64, end: i64) -> Self {
        Window {
            start_time: Some(start),
            end_time: Some(end),
            ..Self::default()
        }
    }

    /// Build a window from raw bounds where `0` means unbounded
    pub fn from_raw(start_time: i64, end_time: i64, start_sentiment: f32, end_sentiment: f32) -> Self {
        fn bound<T: PartialEq + Default>(v: T) -> Option<T> {
            (v != T::default()).then_some(v)
        }
        Window {
            start_time: bound(start_time),
            end_time: bound(end_time),
            start_sentiment: bound(start_sentiment),
            end_sentiment: bound(end_sentiment),
        }
    }

    pub fn with_sentiment(mut self, start: f32, end: f32) -> Self {
        self.start_sentiment = Some(start);
        self.end_sentiment = Some(end);
        self
    }

    /// False if both time bounds are set and `end <= start`
    pub fn is_valid(&self) -> bool {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end > start,
            _ => true,
        }
    }

    pub fn contains(&self, timestamp: i64, sentiment: f32) -> bool {
        self.start_time.map_or(true, |s| s <= timestamp)
            && self.end_time.map_or(true, |e| timestamp < e)
            && self.start_sentiment.map_or(true, |s| s <= sentiment)
            && self.end_sentiment.map_or(true, |e| sentiment <= e)
    }

    /// Coverage bit of `timestamp`
    ///
    /// A fully bounded window is split into 64 equal buckets; otherwise the
    /// bit is `(t / bucket_secs) mod 64`.
    pub fn coverage_bit(&self, timestamp: i64, bucket_secs: i64) -> u64 {
        let bucket = match (self.start_time, self.end_time) {
            (Some(start), Some(end)) if end > start => {
                let offset = (timestamp - start) as i128 * 64 / (end - start) as i128;
                offset.clamp(0, 63) as u32
            }
            _ => timestamp.div_euclid(bucket_secs.max(1)).rem_euclid(64) as u32,
        };
        1u64 << bucket
    }
}

/// Resumable position in the source edge sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cursor {
    position: Option<usize>,
    window: Option<Window>,
    time_range: Option<(i64, i64)>,
}

impl Cursor {
    /// Next source edge to scan; `None` while FRESH
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn is_fresh(&self) -> bool {
        self.position.is_none()
    }

    /// Window the cursor was started with
    pub fn window(&self) -> Option<Window> {
        self.window
    }

    /// Earliest and latest timestamp of the accepted edges
    pub fn time_range(&self) -> Option<(i64, i64)> {
        self.time_range
    }

    fn start(&mut self, window: Window) {
        self.position = Some(0);
        self.window = Some(window);
        self.time_range = None;
    }

    fn observe(&mut self, timestamp: i64) {
        self.time_range = Some(match self.time_range {
            Some((lo, hi)) => (lo.min(timestamp), hi.max(timestamp)),
            None => (timestamp, timestamp),
        });
    }
}

/// A source edge that passed the window, as seen by a strategy
#[derive(Debug, Clone, Copy)]
pub struct SourceEdge<'a> {
    pub id: EdgeId,
    pub edge: &'a EdgeData,
    pub face_id: FaceId,
    pub face: &'a FaceData,
    /// Single coverage bit for the face's timestamp
    pub coverage: u64,
    /// True for the first edge of its face the strategy admitted
    pub first_accepted: bool,
}

/// Per-strategy hooks driven by the shared scan
pub(crate) trait Simplify {
    /// Drop all strategy-local state
    fn reset(&mut self);

    /// Called once per FRESH start, after the target has been cleared
    fn begin(&mut self, _source: &GraphStore, _config: &FilterConfig) {}

    /// Extra admission test after the window predicate
    fn admits(&self, _edge: &EdgeData) -> bool {
        true
    }

    /// Fold one accepted edge into the target; returns true if it changed
    fn link(
        &mut self,
        target: &mut GraphStore,
        source: &GraphStore,
        edge: &SourceEdge<'_>,
        stats: &mut dyn StatsSink,
    ) -> GraphResult<bool>;

    /// Called after every scan with the accumulated change flag
    fn finish(
        &mut self,
        _target: &mut GraphStore,
        changed: bool,
        _config: &FilterConfig,
    ) -> GraphResult<bool> {
        Ok(changed)
    }
}

/// The available simplification strategies
#[derive(Debug, Clone)]
pub enum Strategy {
    Flat(FlatSimplifier),
    Group(GroupSimplifier),
    Louvain(LouvainSimplifier),
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Flat(_) => "flat",
            Strategy::Group(_) => "group",
            Strategy::Louvain(_) => "louvain",
        }
    }

    fn as_simplify(&mut self) -> &mut dyn Simplify {
        match self {
            Strategy::Flat(s) => s,
            Strategy::Group(s) => s,
            Strategy::Louvain(s) => s,
        }
    }
}

/// A simplification strategy together with its cursor and settings
#[derive(Debug, Clone)]
pub struct Filter {
    strategy: Strategy,
    cursor: Cursor,
    config: FilterConfig,
}

impl Filter {
    pub fn new(strategy: Strategy, config: FilterConfig) -> Self {
        Filter {
            strategy,
            cursor: Cursor::default(),
            config,
        }
    }

    pub fn flat(config: FilterConfig) -> Self {
        Self::new(Strategy::Flat(FlatSimplifier::new()), config)
    }

    pub fn group(config: FilterConfig) -> Self {
        Self::new(Strategy::Group(GroupSimplifier::new()), config)
    }

    pub fn louvain(config: FilterConfig) -> Self {
        Self::new(Strategy::Louvain(LouvainSimplifier::new()), config)
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Whether the strategy lays out node positions
    pub fn has_position(&self) -> bool {
        !matches!(self.strategy, Strategy::Flat(_))
    }

    /// Return to FRESH; the next `apply` rebuilds the target from scratch
    pub fn reset(&mut self) {
        self.cursor = Cursor::default();
        self.strategy.as_simplify().reset();
    }

    /// Fold the source edges not yet scanned into `target`
    ///
    /// Returns whether the target changed. A time window with
    /// `end <= start` is rejected with a warning and `Ok(false)` when the
    /// target tracks temporal coverage. A window different from the previous
    /// call restarts from FRESH. On error the target is restored to its
    /// state at call start (if `rollback_on_error` is set) and the filter is
    /// reset.
    pub fn apply(
        &mut self,
        target: &mut GraphStore,
        window: Window,
        source: &GraphStore,
        stats: &mut dyn StatsSink,
    ) -> GraphResult<bool> {
        if !window.is_valid() && target.has_temporal_coverage() {
            warn!(
                start = ?window.start_time,
                end = ?window.end_time,
                "rejecting empty time window"
            );
            self.publish(source, stats);
            return Ok(false);
        }

        if !self.cursor.is_fresh() && self.cursor.window != Some(window) {
            info!(strategy = self.strategy.name(), "window changed, restarting filter");
            self.reset();
        }

        let snapshot = self.config.rollback_on_error.then(|| target.clone());
        if snapshot.is_some() {
            stats.checkpoint();
        }
        match self.scan(target, window, source, stats) {
            Ok(changed) => Ok(changed),
            Err(e) => {
                error!(strategy = self.strategy.name(), error = %e, "filter apply failed");
                if let Some(snapshot) = snapshot {
                    *target = snapshot;
                    stats.restore_checkpoint();
                }
                self.reset();
                Err(e)
            }
        }
    }

    /// Report the scanned time range and raw graph size
    fn publish(&self, source: &GraphStore, stats: &mut dyn StatsSink) {
        if let Some((lo, hi)) = self.cursor.time_range {
            stats.set_time_range(lo, hi);
        }
        stats.set_num_raw_nodes(source.node_count());
        stats.set_num_raw_edges(self.cursor.position.unwrap_or(0));
    }

    /// `apply` against a gated graph, holding its write guard for the call
    pub fn apply_shared(
        &mut self,
        target: &SharedGraph,
        window: Window,
        source: &GraphStore,
        stats: &mut dyn StatsSink,
    ) -> GraphResult<bool> {
        let mut guard = target.write();
        self.apply(&mut guard, window, source, stats)
    }

    fn scan(
        &mut self,
        target: &mut GraphStore,
        window: Window,
        source: &GraphStore,
        stats: &mut dyn StatsSink,
    ) -> GraphResult<bool> {
        let name = self.strategy.name();
        let config = &self.config;
        let strategy = self.strategy.as_simplify();
        let mut changed = false;

        if self.cursor.is_fresh() {
            info!(strategy = name, "starting filter from scratch");
            target.clear();
            target.set_max_synthetic_nodes(config.max_synthetic_nodes);
            stats.clear();
            strategy.reset();
            strategy.begin(source, config);
            self.cursor.start(window);
            changed = true;
        }

        let start = self.cursor.position.unwrap_or(0);
        let end = source.edge_count();
        let mut position = start;

        while position < end {
            let id = EdgeId::new(position);
            let edge = source.edge(id).ok_or(GraphError::EdgeNotFound(id))?;
            let face = match edge.face {
                Some(face_id) => Some((
                    face_id,
                    source.face(face_id).ok_or(GraphError::FaceNotFound(face_id))?,
                )),
                None => None,
            };
            let starts_face = face.map_or(true, |(_, f)| f.first_edge == Some(id));

            // Budgeted scans only stop where a new face begins
            if let Some(budget) = config.max_edges_per_apply {
                if position - start >= budget && starts_face {
                    break;
                }
            }
            position += 1;

            // Edges outside any face carry no timestamp
            let Some((face_id, face)) = face else {
                continue;
            };
            if !window.contains(face.timestamp, face.sentiment) || !strategy.admits(edge) {
                continue;
            }
            self.cursor.observe(face.timestamp);
            // The window test is per face, so only `admits` can reject earlier edges
            let first_accepted = source
                .face_edges(face_id)
                .take_while(|&(earlier, _)| earlier != id)
                .all(|(_, earlier)| !strategy.admits(earlier));

            let accepted = SourceEdge {
                id,
                edge,
                face_id,
                face,
                coverage: window.coverage_bit(face.timestamp, config.coverage_bucket_secs),
                first_accepted,
            };
            changed |= strategy.link(target, source, &accepted, stats)?;
        }
        self.cursor.position = Some(position);

        let changed = strategy.finish(target, changed, config)?;
        self.publish(source, stats);

        debug!(
            strategy = name,
            from = start,
            to = position,
            changed,
            version = target.version(),
            "filter scan"
        );
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_predicate() {
        let window = Window::time(0, 25).with_sentiment(-0.5, 0.5);
        assert!(window.contains(0, 0.0));
        assert!(window.contains(24, 0.5));
        assert!(!window.contains(25, 0.0));
        assert!(!window.contains(10, 0.6));

        let raw = Window::from_raw(0, 100, 0.0, 0.0);
        assert_eq!(raw.start_time, None);
        assert_eq!(raw.end_time, Some(100));
        assert!(raw.contains(-5, 9.0));
    }

    #[test]
    fn test_window_validity() {
        assert!(Window::unbounded().is_valid());
        assert!(Window::time(5, 6).is_valid());
        assert!(!Window::time(5, 5).is_valid());
        assert!(Window::from_raw(5, 0, 0.0, 0.0).is_valid());
    }

    #[test]
    fn test_coverage_bits() {
        let window = Window::time(0, 64);
        assert_eq!(window.coverage_bit(0, 3600), 1);
        assert_eq!(window.coverage_bit(63, 3600), 1 << 63);
        assert_eq!(window.coverage_bit(500, 3600), 1 << 63);

        let open = Window::unbounded();
        assert_eq!(open.coverage_bit(0, 10), 1);
        assert_eq!(open.coverage_bit(25, 10), 1 << 2);
        assert_eq!(open.coverage_bit(650, 10), 1 << 1);
        assert_eq!(open.coverage_bit(-1, 10), 1 << 63);
    }

    #[test]
    fn test_has_position() {
        let config = FilterConfig::default();
        assert!(!Filter::flat(config.clone()).has_position());
        assert!(Filter::group(config.clone()).has_position());
        assert!(Filter::louvain(config).has_position());
    }
}
