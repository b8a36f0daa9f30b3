//! A conversational agent with durable, checkpointed state.
//!
//! Every turn runs `load_memories -> remember_fact -> respond` and writes a
//! checkpoint per step, so a thread can be inspected, replayed from any
//! earlier step, or forked by editing its state. Facts about a user live in
//! a namespaced store shared by all of that user's threads.

pub mod agent;
pub mod config;
pub mod error;
pub mod facts;
pub mod nodes;
pub mod responder;
pub mod state;
pub mod tools;

pub use agent::{AgentGraph, make_config};
pub use config::{
    AgentSettings, McpClientEntry, McpServerConfig, McpServers, McpTransport, OpenAiSettings,
    build_mcp_servers_from_env, require_mcp_servers,
};
pub use error::{Error, ResponderError, Result};
pub use facts::{Fact, FactKind, FactMatch, extract_fact, memory_namespace};
pub use responder::{OpenAiResponder, Responder, TemplateResponder};
pub use state::{AgentContext, AgentState, AgentStateUpdate};
pub use tools::{FACT_ALREADY_STORED, SaveOutcome, SearchOutcome, save_memory, search_memories};
