//! Statistics collected while a filter scans the source graph
//!
//! Filters only talk to the `StatsSink` trait; `ActivityStatistics` is the
//! collecting implementation and `NullStats` discards everything.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::Serialize;

/// One activity as reported to a `StatsSink`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Activity {
    pub timestamp: i64,
    pub source_id: i64,
    pub source_object_id: i64,
    pub lang: i16,
    pub app_id: i64,
    pub filter_id: i64,
    pub party: i32,
}

/// Receiver of the events produced by `Filter::apply`
pub trait StatsSink {
    /// An actor performed an activity
    fn add_activity(&mut self, activity: &Activity);
    /// An actor was the target of an activity
    fn add_received_activity(&mut self, activity: &Activity);
    fn add_hashtag(&mut self, text: &str);
    fn add_link(&mut self, title: &str, url: &str);
    fn add_user_type(&mut self, user_type: i32);
    fn set_time_range(&mut self, start: i64, end: i64);
    fn set_num_raw_nodes(&mut self, n: usize);
    fn set_num_raw_edges(&mut self, n: usize);
    /// Forget everything; called when a filter starts from scratch
    fn clear(&mut self);

    /// Remember the current state so a failed apply can undo its events
    ///
    /// Sinks that do not override this pair keep whatever a failed apply
    /// reported.
    fn checkpoint(&mut self) {}

    /// Return to the last checkpoint, if any
    fn restore_checkpoint(&mut self) {}
}

/// Sink that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStats;

impl StatsSink for NullStats {
    fn add_activity(&mut self, _activity: &Activity) {}
    fn add_received_activity(&mut self, _activity: &Activity) {}
    fn add_hashtag(&mut self, _text: &str) {}
    fn add_link(&mut self, _title: &str, _url: &str) {}
    fn add_user_type(&mut self, _user_type: i32) {}
    fn set_time_range(&mut self, _start: i64, _end: i64) {}
    fn set_num_raw_nodes(&mut self, _n: usize) {}
    fn set_num_raw_edges(&mut self, _n: usize) {}
    fn clear(&mut self) {}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkStats {
    pub title: String,
    pub count: u64,
}

/// In-memory statistics for the current window
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivityStatistics {
    pub activity_count: u64,
    pub received_activity_count: u64,
    pub activities_by_lang: IndexMap<i16, u64>,
    pub activities_by_app: IndexMap<i64, u64>,
    pub activities_by_party: IndexMap<i32, u64>,
    pub hashtags: IndexMap<String, u64>,
    /// Keyed by URL
    pub links: IndexMap<String, LinkStats>,
    pub user_types: IndexMap<i32, u64>,
    pub time_range: Option<(i64, i64)>,
    pub num_raw_nodes: usize,
    pub num_raw_edges: usize,
    #[serde(skip)]
    active_actors: FxHashSet<(i64, i64)>,
    #[serde(skip)]
    saved: Option<Box<ActivityStatistics>>,
}

impl ActivityStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_time(&self) -> Option<i64> {
        self.time_range.map(|(lo, _)| lo)
    }

    pub fn max_time(&self) -> Option<i64> {
        self.time_range.map(|(_, hi)| hi)
    }

    /// Number of distinct actors that performed at least one activity
    pub fn active_actor_count(&self) -> usize {
        self.active_actors.len()
    }

    /// The `n` most used hashtags, most used first; ties keep first-seen order
    pub fn top_hashtags(&self, n: usize) -> Vec<(&str, u64)> {
        let mut all: Vec<(&str, u64)> = self.hashtags.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        all.sort_by(|a, b| b.1.cmp(&a.1));
        all.truncate(n);
        all
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl StatsSink for ActivityStatistics {
    fn add_activity(&mut self, activity: &Activity) {
        self.activity_count += 1;
        *self.activities_by_lang.entry(activity.lang).or_insert(0) += 1;
        *self.activities_by_app.entry(activity.app_id).or_insert(0) += 1;
        *self.activities_by_party.entry(activity.party).or_insert(0) += 1;
        self.active_actors
            .insert((activity.source_id, activity.source_object_id));
    }

    fn add_received_activity(&mut self, _activity: &Activity) {
        self.received_activity_count += 1;
    }

    fn add_hashtag(&mut self, text: &str) {
        *self.hashtags.entry(text.to_string()).or_insert(0) += 1;
    }

    fn add_link(&mut self, title: &str, url: &str) {
        let entry = self.links.entry(url.to_string()).or_insert_with(|| LinkStats {
            title: title.to_string(),
            count: 0,
        });
        entry.count += 1;
    }

    fn add_user_type(&mut self, user_type: i32) {
        *self.user_types.entry(user_type).or_insert(0) += 1;
    }

    fn set_time_range(&mut self, start: i64, end: i64) {
        self.time_range = Some((start, end));
    }

    fn set_num_raw_nodes(&mut self, n: usize) {
        self.num_raw_nodes = n;
    }

    fn set_num_raw_edges(&mut self, n: usize) {
        self.num_raw_edges = n;
    }

    fn clear(&mut self) {
        let saved = self.saved.take();
        *self = Self::default();
        self.saved = saved;
    }

    fn checkpoint(&mut self) {
        self.saved = None;
        self.saved = Some(Box::new(self.clone()));
    }

    fn restore_checkpoint(&mut self) {
        if let Some(saved) = self.saved.take() {
            *self = *saved;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(source_object_id: i64) -> Activity {
        Activity {
            timestamp: 10,
            source_id: 1,
            source_object_id,
            lang: 3,
            app_id: 7,
            filter_id: 0,
            party: 0,
        }
    }

    #[test]
    fn test_collects_activity() {
        let mut stats = ActivityStatistics::new();
        stats.add_activity(&activity(100));
        stats.add_activity(&activity(100));
        stats.add_activity(&activity(101));
        stats.add_received_activity(&activity(102));

        assert_eq!(stats.activity_count, 3);
        assert_eq!(stats.received_activity_count, 1);
        assert_eq!(stats.active_actor_count(), 2);
        assert_eq!(stats.activities_by_lang.get(&3), Some(&3));
    }

    #[test]
    fn test_top_hashtags_and_links() {
        let mut stats = ActivityStatistics::new();
        for tag in ["#a", "#b", "#b", "#c", "#b", "#c"] {
            stats.add_hashtag(tag);
        }
        assert_eq!(stats.top_hashtags(2), vec![("#b", 3), ("#c", 2)]);

        stats.add_link("Home", "https://example.org");
        stats.add_link("Home page", "https://example.org");
        let link = stats.links.get("https://example.org").unwrap();
        assert_eq!(link.count, 2);
        assert_eq!(link.title, "Home");
    }

    #[test]
    fn test_restore_checkpoint_survives_clear() {
        let mut stats = ActivityStatistics::new();
        stats.add_hashtag("#kept");
        stats.set_num_raw_edges(7);
        stats.checkpoint();

        stats.clear();
        stats.add_hashtag("#lost");
        stats.restore_checkpoint();

        assert_eq!(stats.hashtags.get("#kept"), Some(&1));
        assert!(stats.hashtags.get("#lost").is_none());
        assert_eq!(stats.num_raw_edges, 7);
        // Restoring twice is a no-op
        stats.restore_checkpoint();
        assert_eq!(stats.num_raw_edges, 7);
    }

    #[test]
    fn test_clear_and_json() {
        let mut stats = ActivityStatistics::new();
        stats.set_time_range(5, 9);
        stats.set_num_raw_edges(4);
        let json = stats.to_json().unwrap();
        assert!(json.contains("\"num_raw_edges\": 4"));

        stats.clear();
        assert_eq!(stats.time_range, None);
        assert_eq!(stats.num_raw_edges, 0);
    }
}
