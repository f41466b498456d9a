//! Faces: one record per source activity (post, reply, share, ...)

use super::types::EdgeId;
use serde::{Deserialize, Serialize};

/// A source activity owning a chain of edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceData {
    /// Unix seconds
    pub timestamp: i64,
    pub sentiment: f32,
    pub lang: i16,
    pub app_id: i64,
    pub filter_id: i64,
    pub label: String,
    pub label_visible: bool,
    pub first_edge: Option<EdgeId>,
}

impl FaceData {
    pub fn new(timestamp: i64, sentiment: f32) -> Self {
        FaceData {
            timestamp,
            sentiment,
            lang: 0,
            app_id: 0,
            filter_id: 0,
            label: String::new(),
            label_visible: false,
            first_edge: None,
        }
    }

    pub fn with_lang(mut self, lang: i16) -> Self {
        self.lang = lang;
        self
    }

    pub fn with_app(mut self, app_id: i64) -> Self {
        self.app_id = app_id;
        self
    }

    pub fn with_filter(mut self, filter_id: i64) -> Self {
        self.filter_id = filter_id;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}
