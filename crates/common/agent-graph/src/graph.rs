//! Graph module for checkpointed workflows.
//!
//! This module provides the core graph building blocks:
//! - `GraphState` - The contract a state type fulfils to flow through a graph
//! - `StateGraph` - A builder for creating stateful workflows
//! - `CompiledGraph` - The executor, with checkpointing, replay and forking

pub mod state;

use serde::{Serialize, de::DeserializeOwned};

pub use state::{CompiledGraph, GraphStructure, StateGraph};

pub use crate::constants::{END, START};

/// State that flows through a [`StateGraph`].
///
/// Nodes do not return a whole new state; they return an `Update` that the
/// state folds in with [`GraphState::apply`]. The same update type is used
/// for new input and for external state edits, so `apply` is where reducer
/// semantics live, e.g. appending to a log instead of replacing it.
///
/// The state must round-trip through JSON because checkpoints store it in
/// serialized form.
pub trait GraphState: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// A partial update produced by a node.
    type Update: Send + 'static;

    /// Fold an update into the state.
    fn apply(&mut self, update: Self::Update);
}
