//! Invocation config and state snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agent_graph_checkpoint::CheckpointMetadata;

use crate::error::{GraphError, Result};

/// Addresses a thread and, optionally, one checkpoint within it.
///
/// # Example
///
/// ```
/// use agent_graph::types::RunConfig;
///
/// let config = RunConfig::new("thread-1").with_checkpoint_id("0190f1c2");
/// assert_eq!(config.thread_id.as_deref(), Some("thread-1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub thread_id: Option<String>,
    pub checkpoint_id: Option<String>,
}

impl RunConfig {
    /// Config for the head of a thread.
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            checkpoint_id: None,
        }
    }

    /// Pin the config to a checkpoint.
    pub fn with_checkpoint_id(mut self, checkpoint_id: impl Into<String>) -> Self {
        self.checkpoint_id = Some(checkpoint_id.into());
        self
    }

    pub(crate) fn require_thread_id(&self) -> Result<&str> {
        self.thread_id.as_deref().ok_or(GraphError::MissingThreadId)
    }
}

/// Graph state as of one checkpoint.
#[derive(Debug, Clone)]
pub struct StateSnapshot<S> {
    /// The state values.
    pub values: S,
    /// Nodes that run next when resuming. Empty once the run finished.
    pub next: Vec<String>,
    /// Config addressing this checkpoint.
    pub config: RunConfig,
    /// Config addressing the parent checkpoint.
    pub parent_config: Option<RunConfig>,
    pub metadata: CheckpointMetadata,
    pub created_at: DateTime<Utc>,
}

impl<S> StateSnapshot<S> {
    /// Id of the checkpoint this snapshot was read from.
    pub fn checkpoint_id(&self) -> Option<&str> {
        self.config.checkpoint_id.as_deref()
    }
}
