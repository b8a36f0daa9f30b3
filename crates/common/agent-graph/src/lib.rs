//! Agent Graph - checkpointed, LangGraph-style state graphs.
//!
//! Nodes read a shared state and return partial updates that the state
//! folds in. With a checkpointer attached, every step of a run is persisted
//! per thread, which makes runs inspectable, resumable, replayable from any
//! earlier step, and forkable by editing state at a chosen node.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use agent_graph::{GraphState, InMemorySaver, RunConfig, StateGraph, END, START};
//!
//! #[derive(Clone, Default, Serialize, Deserialize)]
//! struct State {
//!     text: String,
//! }
//!
//! impl GraphState for State {
//!     type Update = String;
//!
//!     fn apply(&mut self, update: String) {
//!         self.text.push_str(&update);
//!     }
//! }
//!
//! let mut graph = StateGraph::<State>::new();
//! graph.add_node("node_a", |_state, _runtime| async move { Ok("a".to_string()) });
//! graph.add_node("node_b", |_state, _runtime| async move { Ok("b".to_string()) });
//! graph.add_edge(START, "node_a");
//! graph.add_edge("node_a", "node_b");
//! graph.add_edge("node_b", END);
//!
//! let compiled = graph.compile()?.with_checkpointer(Arc::new(InMemorySaver::new()));
//! let config = RunConfig::new("thread-1");
//! let result = compiled.invoke(Some(String::new()), &config, ()).await?;
//! // result.text == "ab"
//!
//! let history = compiled.get_state_history(&config).await?;
//! // history.len() == 3: the input checkpoint plus one per node
//! ```

pub mod checkpoint;
pub mod constants;
pub mod error;
pub mod graph;
pub mod runtime;
pub mod types;

pub use checkpoint::{BaseCheckpointSaver, BaseStore, InMemorySaver, InMemoryStore};
pub use constants::{END, START};
pub use error::{GraphError, NodeError, Result};
pub use graph::{CompiledGraph, GraphState, GraphStructure, StateGraph};
pub use runtime::Runtime;
pub use types::{RunConfig, StateSnapshot};
