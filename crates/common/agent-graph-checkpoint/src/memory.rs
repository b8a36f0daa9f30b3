//! In-memory checkpoint saver for agent state persistence.
//!
//! Checkpoints are kept per thread in an arena indexed by checkpoint id. Each
//! record holds its parent id, and the thread remembers its head, so history
//! is a walk from the head back to the root.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::base::{BaseCheckpointSaver, Checkpoint, CheckpointMetadata, CheckpointTuple};
use crate::error::{Error, Result};
use crate::serializer;

/// A checkpoint as held by the saver. State is kept encoded.
#[derive(Debug, Clone)]
struct StoredCheckpoint {
    parent_id: Option<String>,
    ts: DateTime<Utc>,
    next: Vec<String>,
    metadata: CheckpointMetadata,
    values: Vec<u8>,
}

#[derive(Debug, Default)]
struct ThreadLog {
    records: HashMap<String, StoredCheckpoint>,
    head: Option<String>,
}

/// In-memory checkpoint saver.
///
/// Each thread has its own checkpoint tree. Cloning the saver shares the
/// underlying storage.
///
/// Note: Only use `InMemorySaver` for debugging or testing purposes.
/// Everything is lost when the process exits.
///
/// # Example
///
/// ```ignore
/// use agent_graph_checkpoint::{BaseCheckpointSaver, Checkpoint, CheckpointMetadata, InMemorySaver};
///
/// let saver = InMemorySaver::new();
/// let root = saver
///     .put("thread-1", None, Checkpoint::new(json!({}), vec![]), CheckpointMetadata::input(0))
///     .await?;
///
/// let history = saver.list("thread-1").await?;
/// assert_eq!(history[0].checkpoint.id, root);
/// ```
#[derive(Clone, Default)]
pub struct InMemorySaver {
    /// Thread ID -> checkpoint tree
    storage: Arc<RwLock<HashMap<String, ThreadLog>>>,
}

impl InMemorySaver {
    /// Create a new in-memory checkpoint saver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of checkpoints stored for a thread, across all branches.
    pub fn checkpoint_count(&self, thread_id: &str) -> usize {
        self.storage
            .read()
            .get(thread_id)
            .map_or(0, |thread| thread.records.len())
    }

    fn to_tuple(thread_id: &str, id: &str, stored: &StoredCheckpoint) -> Result<CheckpointTuple> {
        Ok(CheckpointTuple {
            thread_id: thread_id.to_string(),
            checkpoint: Checkpoint {
                id: id.to_string(),
                ts: stored.ts,
                values: serializer::loads(&stored.values)?,
                next: stored.next.clone(),
            },
            metadata: stored.metadata.clone(),
            parent_id: stored.parent_id.clone(),
        })
    }
}

#[async_trait]
impl BaseCheckpointSaver for InMemorySaver {
    async fn get_tuple(
        &self,
        thread_id: &str,
        checkpoint_id: Option<&str>,
    ) -> Result<Option<CheckpointTuple>> {
        let storage = self.storage.read();
        let thread = storage.get(thread_id);

        match checkpoint_id {
            Some(id) => {
                let stored = thread
                    .and_then(|thread| thread.records.get(id))
                    .ok_or_else(|| Error::not_found(thread_id, id))?;
                Self::to_tuple(thread_id, id, stored).map(Some)
            }
            None => {
                let Some(thread) = thread else {
                    return Ok(None);
                };
                let Some(head) = thread.head.as_deref() else {
                    return Ok(None);
                };
                let stored = thread
                    .records
                    .get(head)
                    .ok_or_else(|| Error::not_found(thread_id, head))?;
                Self::to_tuple(thread_id, head, stored).map(Some)
            }
        }
    }

    async fn list(&self, thread_id: &str) -> Result<Vec<CheckpointTuple>> {
        let storage = self.storage.read();
        let Some(thread) = storage.get(thread_id) else {
            return Ok(Vec::new());
        };

        let mut history = Vec::new();
        let mut cursor = thread.head.clone();
        while let Some(id) = cursor {
            let stored = thread
                .records
                .get(&id)
                .ok_or_else(|| Error::not_found(thread_id, id.as_str()))?;
            history.push(Self::to_tuple(thread_id, &id, stored)?);
            cursor = stored.parent_id.clone();
        }

        Ok(history)
    }

    async fn put(
        &self,
        thread_id: &str,
        parent_id: Option<&str>,
        checkpoint: Checkpoint,
        metadata: CheckpointMetadata,
    ) -> Result<String> {
        let values = serializer::dumps(&checkpoint.values)?;
        let mut storage = self.storage.write();

        if let Some(parent) = parent_id {
            let known = storage
                .get(thread_id)
                .is_some_and(|thread| thread.records.contains_key(parent));
            if !known {
                return Err(Error::not_found(thread_id, parent));
            }
        }

        let thread = storage.entry(thread_id.to_string()).or_default();
        if thread.records.contains_key(&checkpoint.id) {
            return Err(Error::Duplicate {
                thread_id: thread_id.to_string(),
                checkpoint_id: checkpoint.id,
            });
        }

        let extends_head = match parent_id {
            None => true,
            Some(parent) => thread.head.as_deref() == Some(parent),
        };
        let parent_id = parent_id
            .map(str::to_string)
            .or_else(|| thread.head.clone());

        thread.records.insert(
            checkpoint.id.clone(),
            StoredCheckpoint {
                parent_id: parent_id.clone(),
                ts: checkpoint.ts,
                next: checkpoint.next,
                metadata,
                values,
            },
        );
        if extends_head {
            thread.head = Some(checkpoint.id.clone());
        }

        tracing::debug!(
            thread_id,
            checkpoint_id = %checkpoint.id,
            parent_id = ?parent_id,
            extends_head,
            "checkpoint written"
        );

        Ok(checkpoint.id)
    }

    async fn list_threads(&self) -> Result<Vec<String>> {
        let storage = self.storage.read();
        let mut threads: Vec<String> = storage.keys().cloned().collect();
        threads.sort();
        Ok(threads)
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<bool> {
        let mut storage = self.storage.write();
        Ok(storage.remove(thread_id).is_some())
    }
}

impl std::fmt::Debug for InMemorySaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let storage = self.storage.read();
        f.debug_struct("InMemorySaver")
            .field("threads", &storage.len())
            .finish()
    }
}
