//! Base interfaces for agent-graph checkpoint savers and long-term stores.
//!
//! A checkpoint saver keeps an immutable snapshot of graph state after every
//! step of a run, keyed by thread. Snapshots link to their parent, so a
//! thread's history is a tree: replaying or editing an old checkpoint adds a
//! new branch without touching what was already written.
//!
//! A store is the cross-thread counterpart: JSON records partitioned by a
//! [`Namespace`], readable from any thread that knows the namespace.
//!
//! # Example
//!
//! ```ignore
//! use agent_graph_checkpoint::{BaseCheckpointSaver, Checkpoint, CheckpointMetadata, InMemorySaver};
//!
//! let saver = InMemorySaver::new();
//! let checkpoint = Checkpoint::new(serde_json::json!({"count": 1}), vec!["node_a".into()]);
//! let id = saver.put("thread-1", None, checkpoint, CheckpointMetadata::input(0)).await?;
//!
//! let latest = saver.get_tuple("thread-1", None).await?.unwrap();
//! assert_eq!(latest.checkpoint.id, id);
//! ```

pub mod base;
pub mod error;
pub mod memory;
pub mod serializer;
pub mod store;

pub use base::{
    BaseCheckpointSaver, Checkpoint, CheckpointMetadata, CheckpointSource, CheckpointTuple,
};
pub use error::{Error, Result};
pub use memory::InMemorySaver;
pub use store::{BaseStore, InMemoryStore, Item, Namespace};
