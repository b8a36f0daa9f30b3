//! Checkpoint module for persisting agent state across invocations.
//!
//! Re-exports the saver and store interfaces a compiled graph is wired to,
//! so graph users do not need a direct dependency on the checkpoint crate.

pub use agent_graph_checkpoint::{
    BaseCheckpointSaver, BaseStore, Checkpoint, CheckpointMetadata, CheckpointSource,
    CheckpointTuple, InMemorySaver, InMemoryStore, Item, Namespace,
};
