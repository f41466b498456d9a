//! Filter configuration
//!
//! Defaults are usable as-is; a YAML document only needs the keys it changes.

use crate::graph::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};

/// Louvain engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LouvainConfig {
    /// Stop when a pass improves modularity by less than this
    pub min_modularity: f64,
    /// Maximum passes per call; -1 means unbounded
    pub max_passes: i32,
}

impl Default for LouvainConfig {
    fn default() -> Self {
        Self {
            min_modularity: 1e-6,
            max_passes: -1,
        }
    }
}

impl LouvainConfig {
    pub fn with_max_passes(mut self, max_passes: i32) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// True if another pass is allowed after `done` passes
    pub fn pass_allowed(&self, done: usize) -> bool {
        self.max_passes < 0 || done < self.max_passes as usize
    }
}

/// Settings shared by all simplification strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Step budget per `apply`; scanning stops at the first face boundary
    /// after this many source edges. `None` scans to the end.
    pub max_edges_per_apply: Option<usize>,

    /// Bucket width in seconds when the time window is not fully bounded
    pub coverage_bucket_secs: i64,

    /// Restore the target graph when `apply` fails
    pub rollback_on_error: bool,

    /// Cap on synthetic nodes in the target graph
    pub max_synthetic_nodes: usize,

    /// Minimum base-graph in-degree for the Louvain simplifier (levels > 0)
    pub min_significance: f64,

    /// Hierarchy level of the Louvain simplifier; 0 is the first level
    pub level: usize,

    pub louvain: LouvainConfig,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_edges_per_apply: None,
            coverage_bucket_secs: 3600,
            rollback_on_error: true,
            max_synthetic_nodes: 1_000_000,
            min_significance: 2.0,
            level: 0,
            louvain: LouvainConfig::default(),
        }
    }
}

impl FilterConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> GraphResult<Self> {
        let config: FilterConfig =
            serde_yaml::from_str(yaml).map_err(|e| GraphError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GraphResult<()> {
        if self.coverage_bucket_secs <= 0 {
            return Err(GraphError::InvalidConfig(format!(
                "coverage_bucket_secs must be positive, got {}",
                self.coverage_bucket_secs
            )));
        }
        if self.louvain.max_passes < -1 {
            return Err(GraphError::InvalidConfig(format!(
                "louvain.max_passes must be -1 or non-negative, got {}",
                self.louvain.max_passes
            )));
        }
        if self.max_edges_per_apply == Some(0) {
            return Err(GraphError::InvalidConfig(
                "max_edges_per_apply must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
