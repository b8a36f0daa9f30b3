//! The agent graph and the turn-level API over it.

use std::sync::Arc;

use agent_graph::{
    BaseCheckpointSaver, BaseStore, CompiledGraph, END, InMemorySaver, InMemoryStore, RunConfig,
    START, StateGraph, StateSnapshot,
};
use bon::bon;

use crate::config::AgentSettings;
use crate::error::Result;
use crate::nodes::{self, LOAD_MEMORIES, REMEMBER_FACT, RESPOND};
use crate::responder::{OpenAiResponder, Responder, TemplateResponder};
use crate::state::{AgentContext, AgentState, AgentStateUpdate};

/// Config addressing a thread, or one checkpoint of it.
pub fn make_config(thread_id: &str, checkpoint_id: Option<&str>) -> RunConfig {
    let config = RunConfig::new(thread_id);
    match checkpoint_id {
        Some(id) => config.with_checkpoint_id(id),
        None => config,
    }
}

/// `load_memories -> remember_fact -> respond`.
fn build_graph(responder: Arc<dyn Responder>) -> Result<CompiledGraph<AgentState, AgentContext>> {
    let mut graph = StateGraph::<AgentState, AgentContext>::new();

    graph.add_node(LOAD_MEMORIES, nodes::load_memories);
    graph.add_node(REMEMBER_FACT, nodes::remember_fact);
    graph.add_node(RESPOND, move |state, _runtime| {
        let responder = responder.clone();
        async move { nodes::respond(state, responder.as_ref()).await }
    });

    graph.add_edge(START, LOAD_MEMORIES);
    graph.add_edge(LOAD_MEMORIES, REMEMBER_FACT);
    graph.add_edge(REMEMBER_FACT, RESPOND);
    graph.add_edge(RESPOND, END);

    Ok(graph.compile()?)
}

/// A conversational agent whose every step is checkpointed per thread.
///
/// Facts are shared between all threads of a user through the store.
///
/// # Example
///
/// ```ignore
/// let agent = AgentGraph::builder().build()?;
///
/// let state = agent
///     .run_turn()
///     .thread_id("t-1")
///     .user_id("u-1")
///     .message("my name is Jon")
///     .call()
///     .await?;
/// ```
pub struct AgentGraph {
    graph: CompiledGraph<AgentState, AgentContext>,
    checkpointer: Arc<dyn BaseCheckpointSaver>,
    store: Arc<dyn BaseStore>,
}

#[bon]
impl AgentGraph {
    /// Build the agent. Missing parts default to in-memory backends and the
    /// template responder.
    #[builder]
    pub fn new(
        checkpointer: Option<Arc<dyn BaseCheckpointSaver>>,
        store: Option<Arc<dyn BaseStore>>,
        responder: Option<Arc<dyn Responder>>,
    ) -> Result<Self> {
        let checkpointer = checkpointer.unwrap_or_else(|| Arc::new(InMemorySaver::new()));
        let store = store.unwrap_or_else(|| Arc::new(InMemoryStore::new()));
        let responder = responder.unwrap_or_else(|| Arc::new(TemplateResponder));

        let graph = build_graph(responder)?
            .with_checkpointer(checkpointer.clone())
            .with_store(store.clone());

        Ok(Self {
            graph,
            checkpointer,
            store,
        })
    }

    /// Run a turn.
    ///
    /// With a `message`, a new turn starts on top of the addressed checkpoint
    /// (the thread head by default). Without one, execution resumes from the
    /// addressed checkpoint: a replay when it is a past step, or a
    /// continuation of an edited state.
    #[builder]
    pub async fn run_turn(
        &self,
        #[builder(into)] thread_id: String,
        #[builder(into)] user_id: String,
        #[builder(into)] message: Option<String>,
        #[builder(into)] checkpoint_id: Option<String>,
    ) -> Result<AgentState> {
        let config = make_config(&thread_id, checkpoint_id.as_deref());
        let replay = message.is_none();
        let input = message.map(AgentStateUpdate::new_turn);

        let state = self
            .graph
            .invoke(input, &config, AgentContext::new(&user_id))
            .await?;

        tracing::info!(
            thread_id = %thread_id,
            user_id = %user_id,
            checkpoint_id = ?config.checkpoint_id,
            replay,
            "turn completed"
        );
        Ok(state)
    }

    /// Edit the state at a checkpoint (the thread head by default) as if
    /// `as_node` produced `values`, creating a fork.
    ///
    /// Returns the config of the new checkpoint. Resume it with
    /// [`AgentGraph::run_turn`] and no message.
    #[builder]
    pub async fn edit_state(
        &self,
        #[builder(into)] thread_id: String,
        values: AgentStateUpdate,
        #[builder(into)] checkpoint_id: Option<String>,
        #[builder(into)] as_node: Option<String>,
    ) -> Result<RunConfig> {
        let config = make_config(&thread_id, checkpoint_id.as_deref());
        Ok(self
            .graph
            .update_state(&config, values, as_node.as_deref())
            .await?)
    }
}

impl AgentGraph {
    /// Build the agent from settings, using OpenAI when a key is configured.
    pub fn from_settings(settings: &AgentSettings) -> Result<Self> {
        let responder: Arc<dyn Responder> = match &settings.openai {
            Some(openai) => {
                let responder = OpenAiResponder::new(openai.clone())?;
                tracing::info!(model = %responder.model(), "using OpenAI responder");
                Arc::new(responder)
            }
            None => Arc::new(TemplateResponder),
        };
        Self::builder().responder(responder).build()
    }

    /// State at a checkpoint, or at the thread head. `None` for an unknown thread.
    pub async fn latest_state(
        &self,
        thread_id: &str,
        checkpoint_id: Option<&str>,
    ) -> Result<Option<StateSnapshot<AgentState>>> {
        Ok(self
            .graph
            .get_state(&make_config(thread_id, checkpoint_id))
            .await?)
    }

    /// The thread's default chain of states, newest first.
    pub async fn state_history(&self, thread_id: &str) -> Result<Vec<StateSnapshot<AgentState>>> {
        Ok(self
            .graph
            .get_state_history(&make_config(thread_id, None))
            .await?)
    }

    pub fn graph(&self) -> &CompiledGraph<AgentState, AgentContext> {
        &self.graph
    }

    pub fn checkpointer(&self) -> &Arc<dyn BaseCheckpointSaver> {
        &self.checkpointer
    }

    pub fn store(&self) -> &Arc<dyn BaseStore> {
        &self.store
    }
}

impl std::fmt::Debug for AgentGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentGraph")
            .field("graph", &self.graph.get_graph())
            .finish_non_exhaustive()
    }
}
