//! Checkpoint model and the saver interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// What produced a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointSource {
    /// New input was merged into the thread state before a run.
    Input,
    /// A node ran as part of a run.
    Loop,
    /// State was edited from outside a run.
    Update,
}

/// Metadata recorded next to each checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    /// What produced the checkpoint.
    pub source: CheckpointSource,
    /// Step number, counted from the thread's first checkpoint.
    pub step: i64,
    /// The node that wrote (or is treated as having written) the state.
    pub writer: Option<String>,
}

impl CheckpointMetadata {
    /// Metadata for an input checkpoint.
    pub fn input(step: i64) -> Self {
        Self {
            source: CheckpointSource::Input,
            step,
            writer: None,
        }
    }

    /// Metadata for a checkpoint written after `node` ran.
    pub fn from_node(step: i64, node: impl Into<String>) -> Self {
        Self {
            source: CheckpointSource::Loop,
            step,
            writer: Some(node.into()),
        }
    }

    /// Metadata for an external state edit attributed to `node`.
    pub fn update(step: i64, node: impl Into<String>) -> Self {
        Self {
            source: CheckpointSource::Update,
            step,
            writer: Some(node.into()),
        }
    }
}

/// An immutable snapshot of graph state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Unique id. UUIDv7, so ids sort by creation time.
    pub id: String,
    /// When the checkpoint was created.
    pub ts: DateTime<Utc>,
    /// The serialized graph state.
    pub values: serde_json::Value,
    /// Nodes still pending. Empty once the run reached the end.
    pub next: Vec<String>,
}

impl Checkpoint {
    /// Create a checkpoint with a fresh id.
    pub fn new(values: serde_json::Value, next: Vec<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            ts: Utc::now(),
            values,
            next,
        }
    }

    /// Whether nothing is left to run from this checkpoint.
    pub fn is_terminal(&self) -> bool {
        self.next.is_empty()
    }
}

/// A checkpoint together with where it sits in its thread.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointTuple {
    pub thread_id: String,
    pub checkpoint: Checkpoint,
    pub metadata: CheckpointMetadata,
    /// The checkpoint this one was derived from. `None` for a thread root.
    pub parent_id: Option<String>,
}

/// Interface for checkpoint savers.
///
/// Checkpoints of a thread form a tree through their parent ids. Each thread
/// also has a *head*: the checkpoint most recently appended to its default
/// chain. Writing without an explicit parent, or with the head as parent,
/// extends the default chain and moves the head. Writing under any other
/// parent starts a branch that is only reachable by checkpoint id.
#[async_trait]
pub trait BaseCheckpointSaver: Send + Sync {
    /// Fetch a checkpoint.
    ///
    /// With `checkpoint_id` the exact checkpoint is returned, or
    /// [`Error::NotFound`](crate::Error::NotFound) if the thread does not
    /// contain it. Without an id the thread head is returned, or `None` for a
    /// thread that has no checkpoints yet.
    async fn get_tuple(
        &self,
        thread_id: &str,
        checkpoint_id: Option<&str>,
    ) -> Result<Option<CheckpointTuple>>;

    /// The default chain of a thread, newest first.
    ///
    /// Unknown threads yield an empty list.
    async fn list(&self, thread_id: &str) -> Result<Vec<CheckpointTuple>>;

    /// Store a checkpoint and return its id.
    ///
    /// `parent_id` of `None` appends to the thread head.
    async fn put(
        &self,
        thread_id: &str,
        parent_id: Option<&str>,
        checkpoint: Checkpoint,
        metadata: CheckpointMetadata,
    ) -> Result<String>;

    /// Ids of all threads with at least one checkpoint.
    async fn list_threads(&self) -> Result<Vec<String>>;

    /// Drop every checkpoint of a thread. Returns whether the thread existed.
    async fn delete_thread(&self, thread_id: &str) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_checkpoint_ids_sort_by_creation() {
        let first = Checkpoint::new(json!({}), vec![]);
        let second = Checkpoint::new(json!({}), vec![]);

        assert_ne!(first.id, second.id);
        assert!(first.ts <= second.ts);
    }

    #[test]
    fn test_terminal_checkpoint() {
        let done = Checkpoint::new(json!({}), vec![]);
        let pending = Checkpoint::new(json!({}), vec!["respond".to_string()]);

        assert!(done.is_terminal());
        assert!(!pending.is_terminal());
    }

    #[test]
    fn test_metadata_constructors() {
        let input = CheckpointMetadata::input(0);
        assert_eq!(input.source, CheckpointSource::Input);
        assert_eq!(input.writer, None);

        let step = CheckpointMetadata::from_node(2, "respond");
        assert_eq!(step.source, CheckpointSource::Loop);
        assert_eq!(step.writer.as_deref(), Some("respond"));

        let edit = CheckpointMetadata::update(3, "load_memories");
        assert_eq!(edit.source, CheckpointSource::Update);
        assert_eq!(edit.step, 3);
    }

    #[test]
    fn test_source_serializes_lowercase() {
        let encoded = serde_json::to_value(CheckpointSource::Update).unwrap();
        assert_eq!(encoded, json!("update"));
    }
}
