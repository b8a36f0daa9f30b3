//! State graph module for checkpointed workflows.
//!
//! This module provides the StateGraph builder which allows you to create
//! graphs where nodes communicate by reading and writing to a shared state,
//! and the CompiledGraph that runs them. With a checkpointer attached, every
//! step is persisted per thread, so runs can be inspected, resumed, replayed
//! from any past step and forked by editing state.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use agent_graph_checkpoint::{
    BaseCheckpointSaver, BaseStore, Checkpoint, CheckpointMetadata, CheckpointTuple,
};

use super::GraphState;
use crate::constants::{END, START};
use crate::error::{GraphError, NodeError, Result};
use crate::runtime::Runtime;
use crate::types::{RunConfig, StateSnapshot};

/// Future returned by a node.
pub type NodeFuture<U> = Pin<Box<dyn Future<Output = std::result::Result<U, NodeError>> + Send>>;

/// A node action: takes the current state and runtime, returns a state update.
pub type NodeAction<S, C> =
    Arc<dyn Fn(S, Runtime<C>) -> NodeFuture<<S as GraphState>::Update> + Send + Sync>;

/// A conditional edge function that returns the next node name.
pub type ConditionalEdge<S> =
    Arc<dyn Fn(&S) -> Pin<Box<dyn Future<Output = String> + Send>> + Send + Sync>;

/// Specification for a conditional branch.
pub struct BranchSpec<S> {
    /// The condition function that determines the next node.
    pub condition: ConditionalEdge<S>,
    /// Mapping from condition result to node name.
    pub path_map: Option<HashMap<String, String>>,
}

/// A graph whose nodes communicate by reading and writing to a shared state.
///
/// The signature of each node is `(State, Runtime<Context>) -> Result<Update>`.
///
/// # Example
///
/// ```ignore
/// use agent_graph::graph::{StateGraph, START, END};
///
/// let mut graph = StateGraph::<Counter, ()>::new();
///
/// graph.add_node("add_one", |state, _runtime| async move {
///     Ok(CounterUpdate::add(1))
/// });
///
/// graph.add_edge(START, "add_one");
/// graph.add_edge("add_one", END);
///
/// let compiled = graph.compile()?.with_checkpointer(Arc::new(InMemorySaver::new()));
/// let result = compiled
///     .invoke(Some(CounterUpdate::add(5)), &RunConfig::new("thread-1"), ())
///     .await?;
/// ```
pub struct StateGraph<S, C = ()>
where
    S: GraphState,
{
    /// Nodes in the graph.
    nodes: HashMap<String, NodeAction<S, C>>,
    /// Edges in the graph (from -> to).
    edges: Vec<(String, String)>,
    /// Conditional branches (from -> branch spec).
    branches: HashMap<String, BranchSpec<S>>,
}

impl<S, C> Default for StateGraph<S, C>
where
    S: GraphState,
    C: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, C> StateGraph<S, C>
where
    S: GraphState,
    C: Send + Sync + 'static,
{
    /// Create a new StateGraph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            branches: HashMap::new(),
        }
    }

    /// Add a new node to the StateGraph.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the node.
    /// * `action` - The async function to execute for this node.
    ///
    /// # Returns
    ///
    /// `&mut Self` for method chaining.
    ///
    /// # Panics
    ///
    /// Panics if a node with the same name already exists, or if the name
    /// is a reserved value (START or END).
    pub fn add_node<F, Fut>(&mut self, name: impl Into<String>, action: F) -> &mut Self
    where
        F: Fn(S, Runtime<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<S::Update, NodeError>> + Send + 'static,
    {
        let name = name.into();

        if name == START || name == END {
            panic!("Node name '{}' is reserved", name);
        }

        if self.nodes.contains_key(&name) {
            panic!("Node '{}' already exists", name);
        }

        let action: NodeAction<S, C> = Arc::new(move |state, runtime| {
            let fut = action(state, runtime);
            Box::pin(fut)
        });

        self.nodes.insert(name, action);
        self
    }

    /// Add a directed edge from the start node to the end node.
    ///
    /// # Panics
    ///
    /// Panics if END is used as a start node, or if START is used as an end node.
    pub fn add_edge(&mut self, start: impl Into<String>, end: impl Into<String>) -> &mut Self {
        let start = start.into();
        let end = end.into();

        if start == END {
            panic!("END cannot be a start node");
        }

        if end == START {
            panic!("START cannot be an end node");
        }

        self.edges.push((start, end));
        self
    }

    /// Add a conditional edge from the source node to one of several destinations.
    ///
    /// # Arguments
    ///
    /// * `source` - The source node name.
    /// * `path` - An async function that returns the next node name based on the state.
    /// * `path_map` - Optional mapping from path function result to actual node names.
    pub fn add_conditional_edges<F, Fut>(
        &mut self,
        source: impl Into<String>,
        path: F,
        path_map: Option<HashMap<String, String>>,
    ) -> &mut Self
    where
        F: Fn(&S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = String> + Send + 'static,
    {
        let source = source.into();

        let condition: ConditionalEdge<S> = Arc::new(move |state| {
            let fut = path(state);
            Box::pin(fut)
        });

        self.branches.insert(
            source,
            BranchSpec {
                condition,
                path_map,
            },
        );

        self
    }

    /// Set the entry point of the graph.
    ///
    /// Equivalent to `add_edge(START, key)`.
    pub fn set_entry_point(&mut self, key: impl Into<String>) -> &mut Self {
        self.add_edge(START, key)
    }

    /// Set a finish point of the graph.
    ///
    /// Equivalent to `add_edge(key, END)`.
    pub fn set_finish_point(&mut self, key: impl Into<String>) -> &mut Self {
        self.add_edge(key, END)
    }

    /// Validate the graph structure.
    fn validate(&self) -> std::result::Result<(), String> {
        let has_start_edge = self.edges.iter().any(|(from, _)| from == START);
        let has_start_branch = self.branches.contains_key(START);

        if !has_start_edge && !has_start_branch {
            return Err(
                "Graph must have an entrypoint: add at least one edge from START to another node"
                    .to_string(),
            );
        }

        for (from, _) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(format!("Edge source '{}' not found in nodes", from));
            }
        }

        for (_, to) in &self.edges {
            if to != END && !self.nodes.contains_key(to) {
                return Err(format!("Edge target '{}' not found in nodes", to));
            }
        }

        for (source, branch) in &self.branches {
            if source != START && !self.nodes.contains_key(source) {
                return Err(format!("Branch source '{}' not found in nodes", source));
            }
            for to in branch.path_map.iter().flat_map(HashMap::values) {
                if to != END && !self.nodes.contains_key(to) {
                    return Err(format!(
                        "Branch target '{}' of '{}' not found in nodes",
                        to, source
                    ));
                }
            }
        }

        Ok(())
    }

    /// Compile the StateGraph into a CompiledGraph that can be invoked.
    ///
    /// The compiled graph has no checkpointer or store; attach them with
    /// [`CompiledGraph::with_checkpointer`] and [`CompiledGraph::with_store`].
    pub fn compile(self) -> Result<CompiledGraph<S, C>> {
        self.validate().map_err(GraphError::InvalidGraph)?;

        Ok(CompiledGraph {
            nodes: self.nodes,
            edges: self.edges,
            branches: self.branches,
            checkpointer: None,
            store: None,
        })
    }
}

/// Where the next checkpoint of a run goes.
struct Cursor<'a> {
    saver: &'a dyn BaseCheckpointSaver,
    thread_id: &'a str,
    parent_id: String,
    step: i64,
}

/// A compiled state graph that can be invoked.
pub struct CompiledGraph<S, C = ()>
where
    S: GraphState,
{
    nodes: HashMap<String, NodeAction<S, C>>,
    edges: Vec<(String, String)>,
    branches: HashMap<String, BranchSpec<S>>,
    checkpointer: Option<Arc<dyn BaseCheckpointSaver>>,
    store: Option<Arc<dyn BaseStore>>,
}

impl<S, C> CompiledGraph<S, C>
where
    S: GraphState,
    C: Send + Sync + 'static,
{
    /// Persist every step of every run to `checkpointer`.
    pub fn with_checkpointer(mut self, checkpointer: Arc<dyn BaseCheckpointSaver>) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    /// Make `store` available to nodes through their [`Runtime`].
    pub fn with_store(mut self, store: Arc<dyn BaseStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// The attached checkpointer, if any.
    pub fn checkpointer(&self) -> Option<&Arc<dyn BaseCheckpointSaver>> {
        self.checkpointer.as_ref()
    }

    /// The attached store, if any.
    pub fn store(&self) -> Option<&Arc<dyn BaseStore>> {
        self.store.as_ref()
    }

    fn saver(&self) -> Result<&dyn BaseCheckpointSaver> {
        self.checkpointer
            .as_deref()
            .ok_or(GraphError::NoCheckpointer)
    }

    /// Find the next node(s) to execute after the given node.
    ///
    /// END is never returned; an empty list means the run is complete. A
    /// router naming a node the graph does not have is an error, so that
    /// name never reaches a checkpoint.
    async fn get_next_nodes(&self, current: &str, state: &S) -> Result<Vec<String>> {
        if let Some(branch) = self.branches.get(current) {
            let result = (branch.condition)(state).await;
            let next = if let Some(ref path_map) = branch.path_map {
                path_map.get(&result).cloned().unwrap_or(result)
            } else {
                result
            };
            if next == END {
                return Ok(Vec::new());
            }
            if !self.nodes.contains_key(&next) {
                tracing::warn!(from = %current, to = %next, "branch routed to an unknown node");
                return Err(GraphError::UnknownNode(next));
            }
            return Ok(vec![next]);
        }

        Ok(self
            .edges
            .iter()
            .filter(|(from, _)| from == current)
            .filter(|(_, to)| to != END)
            .map(|(_, to)| to.clone())
            .collect())
    }

    fn encode(state: &S) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(state)?)
    }

    fn decode(tuple: &CheckpointTuple) -> Result<S> {
        Ok(serde_json::from_value(tuple.checkpoint.values.clone())?)
    }

    fn snapshot(tuple: CheckpointTuple) -> Result<StateSnapshot<S>> {
        let values = Self::decode(&tuple)?;
        let config = RunConfig::new(&tuple.thread_id).with_checkpoint_id(&tuple.checkpoint.id);
        let parent_config = tuple
            .parent_id
            .map(|parent| RunConfig::new(&tuple.thread_id).with_checkpoint_id(parent));

        Ok(StateSnapshot {
            values,
            next: tuple.checkpoint.next,
            config,
            parent_config,
            metadata: tuple.metadata,
            created_at: tuple.checkpoint.ts,
        })
    }

    /// Invoke the graph.
    ///
    /// With `input`, a new run starts: the input is folded into the state of
    /// the addressed checkpoint (the thread head unless `config` pins one, or
    /// the default state for a new thread), an input checkpoint is written,
    /// and the graph runs from START.
    ///
    /// Without `input`, the run resumes from the addressed checkpoint and
    /// executes its pending nodes. Resuming a past checkpoint replays the rest
    /// of that run on a new branch; resuming a finished checkpoint returns its
    /// state unchanged.
    ///
    /// Each completed node writes one checkpoint. If a node fails, nothing is
    /// written for it and the error is returned.
    pub async fn invoke(
        &self,
        input: Option<S::Update>,
        config: &RunConfig,
        context: C,
    ) -> Result<S> {
        let runtime = Runtime::new(context, self.store.clone());

        let Some(saver) = self.checkpointer.as_deref() else {
            let input = input.ok_or(GraphError::EmptyInput)?;
            let mut state = S::default();
            state.apply(input);
            let pending = self.get_next_nodes(START, &state).await?;
            return self.run(state, pending, &runtime, None).await;
        };

        let thread_id = config.require_thread_id()?;
        let base = saver
            .get_tuple(thread_id, config.checkpoint_id.as_deref())
            .await?;

        match input {
            Some(input) => {
                let (mut state, parent_id, step) = match &base {
                    Some(tuple) => (
                        Self::decode(tuple)?,
                        Some(tuple.checkpoint.id.as_str()),
                        tuple.metadata.step + 1,
                    ),
                    None => (S::default(), None, 0),
                };
                state.apply(input);
                let pending = self.get_next_nodes(START, &state).await?;

                let checkpoint = Checkpoint::new(Self::encode(&state)?, pending.clone());
                let input_id = saver
                    .put(
                        thread_id,
                        parent_id,
                        checkpoint,
                        CheckpointMetadata::input(step),
                    )
                    .await?;
                tracing::debug!(thread_id, checkpoint_id = %input_id, "run started");

                let cursor = Cursor {
                    saver,
                    thread_id,
                    parent_id: input_id,
                    step,
                };
                self.run(state, pending, &runtime, Some(cursor)).await
            }
            None => {
                let tuple = base.ok_or_else(|| GraphError::NothingToResume {
                    thread_id: thread_id.to_string(),
                })?;
                let state = Self::decode(&tuple)?;
                tracing::debug!(
                    thread_id,
                    checkpoint_id = %tuple.checkpoint.id,
                    next = ?tuple.checkpoint.next,
                    "resuming run"
                );

                let cursor = Cursor {
                    saver,
                    thread_id,
                    parent_id: tuple.checkpoint.id,
                    step: tuple.metadata.step,
                };
                self.run(state, tuple.checkpoint.next, &runtime, Some(cursor))
                    .await
            }
        }
    }

    async fn run(
        &self,
        mut state: S,
        mut pending: Vec<String>,
        runtime: &Runtime<C>,
        mut cursor: Option<Cursor<'_>>,
    ) -> Result<S> {
        while !pending.is_empty() {
            let current = pending.remove(0);

            let action = self
                .nodes
                .get(&current)
                .ok_or_else(|| GraphError::UnknownNode(current.clone()))?;

            tracing::debug!(node = %current, "running node");
            let update = action(state.clone(), runtime.clone())
                .await
                .map_err(|source| {
                    tracing::warn!(node = %current, error = %source, "node failed");
                    GraphError::NodeFailed {
                        node: current.clone(),
                        source,
                    }
                })?;
            state.apply(update);

            let next = self.get_next_nodes(&current, &state).await?;
            pending.extend(next);

            if let Some(cursor) = cursor.as_mut() {
                cursor.step += 1;
                let checkpoint = Checkpoint::new(Self::encode(&state)?, pending.clone());
                cursor.parent_id = cursor
                    .saver
                    .put(
                        cursor.thread_id,
                        Some(cursor.parent_id.as_str()),
                        checkpoint,
                        CheckpointMetadata::from_node(cursor.step, &current),
                    )
                    .await?;
            }
        }

        Ok(state)
    }

    /// Get the state at the addressed checkpoint (the thread head by default).
    ///
    /// Returns `None` for a thread without checkpoints.
    pub async fn get_state(&self, config: &RunConfig) -> Result<Option<StateSnapshot<S>>> {
        let saver = self.saver()?;
        let thread_id = config.require_thread_id()?;

        saver
            .get_tuple(thread_id, config.checkpoint_id.as_deref())
            .await?
            .map(Self::snapshot)
            .transpose()
    }

    /// Get the thread's default chain of states, newest first.
    pub async fn get_state_history(&self, config: &RunConfig) -> Result<Vec<StateSnapshot<S>>> {
        let saver = self.saver()?;
        let thread_id = config.require_thread_id()?;

        saver
            .list(thread_id)
            .await?
            .into_iter()
            .map(Self::snapshot)
            .collect()
    }

    /// Edit the state at the addressed checkpoint as if `as_node` produced
    /// `values`.
    ///
    /// A new checkpoint is written as a child of the addressed one, holding
    /// the merged state and the nodes that follow `as_node`. Nothing already
    /// written is changed. When `as_node` is `None`, the writer of the
    /// addressed checkpoint is used.
    ///
    /// Returns the config of the new checkpoint; invoke it without input to
    /// continue from there.
    pub async fn update_state(
        &self,
        config: &RunConfig,
        values: S::Update,
        as_node: Option<&str>,
    ) -> Result<RunConfig> {
        let saver = self.saver()?;
        let thread_id = config.require_thread_id()?;
        let base = saver
            .get_tuple(thread_id, config.checkpoint_id.as_deref())
            .await?;

        let as_node = match as_node {
            Some(node) => node.to_string(),
            None => base
                .as_ref()
                .and_then(|tuple| tuple.metadata.writer.clone())
                .ok_or_else(|| {
                    GraphError::InvalidUpdate(
                        "as_node is required when the checkpoint has no writer".to_string(),
                    )
                })?,
        };
        if as_node != START && !self.nodes.contains_key(&as_node) {
            return Err(GraphError::UnknownNode(as_node));
        }

        let (mut state, parent_id, step) = match &base {
            Some(tuple) => (
                Self::decode(tuple)?,
                Some(tuple.checkpoint.id.as_str()),
                tuple.metadata.step + 1,
            ),
            None => (S::default(), None, 0),
        };
        state.apply(values);
        let next = self.get_next_nodes(&as_node, &state).await?;

        let checkpoint = Checkpoint::new(Self::encode(&state)?, next);
        let checkpoint_id = saver
            .put(
                thread_id,
                parent_id,
                checkpoint,
                CheckpointMetadata::update(step, &as_node),
            )
            .await?;

        tracing::info!(
            thread_id,
            checkpoint_id = %checkpoint_id,
            parent_id = ?parent_id,
            as_node = %as_node,
            "state updated"
        );

        Ok(RunConfig::new(thread_id).with_checkpoint_id(checkpoint_id))
    }

    /// Get the graph structure for visualization.
    pub fn get_graph(&self) -> GraphStructure {
        let mut nodes: Vec<String> = self.nodes.keys().cloned().collect();
        nodes.sort();
        let mut branches: Vec<String> = self.branches.keys().cloned().collect();
        branches.sort();

        GraphStructure {
            nodes,
            edges: self.edges.clone(),
            branches,
        }
    }
}

/// Structure representing the graph for visualization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStructure {
    /// Node names.
    pub nodes: Vec<String>,
    /// Edges as (from, to) pairs.
    pub edges: Vec<(String, String)>,
    /// Nodes with conditional branches.
    pub branches: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    struct TestState {
        value: i32,
    }

    enum Op {
        Set(i32),
        Add(i32),
        Double,
    }

    impl GraphState for TestState {
        type Update = Op;

        fn apply(&mut self, update: Op) {
            match update {
                Op::Set(value) => self.value = value,
                Op::Add(n) => self.value += n,
                Op::Double => self.value *= 2,
            }
        }
    }

    #[tokio::test]
    async fn test_simple_graph() {
        let mut graph = StateGraph::<TestState>::new();

        graph.add_node("add_one", |_state, _runtime| async move { Ok(Op::Add(1)) });
        graph.add_node("double", |_state, _runtime| async move { Ok(Op::Double) });

        graph.add_edge(START, "add_one");
        graph.add_edge("add_one", "double");
        graph.add_edge("double", END);

        let compiled = graph.compile().unwrap();
        let result = compiled
            .invoke(Some(Op::Set(5)), &RunConfig::default(), ())
            .await
            .unwrap();

        assert_eq!(result.value, 12); // (5 + 1) * 2 = 12
    }

    #[tokio::test]
    async fn test_conditional_edges() {
        let mut graph = StateGraph::<TestState>::new();

        graph.add_node("check", |_state, _runtime| async move { Ok(Op::Add(0)) });
        graph.add_node("positive", |_state, _runtime| async move { Ok(Op::Set(100)) });
        graph.add_node("negative", |_state, _runtime| async move { Ok(Op::Set(-100)) });

        graph.add_edge(START, "check");
        graph.add_conditional_edges(
            "check",
            |state: &TestState| {
                let value = state.value;
                async move {
                    if value >= 0 {
                        "positive".to_string()
                    } else {
                        "negative".to_string()
                    }
                }
            },
            None,
        );
        graph.add_edge("positive", END);
        graph.add_edge("negative", END);

        let compiled = graph.compile().unwrap();

        let result = compiled
            .invoke(Some(Op::Set(5)), &RunConfig::default(), ())
            .await
            .unwrap();
        assert_eq!(result.value, 100);

        let result = compiled
            .invoke(Some(Op::Set(-5)), &RunConfig::default(), ())
            .await
            .unwrap();
        assert_eq!(result.value, -100);
    }

    #[tokio::test]
    async fn test_invoke_without_input_or_checkpointer() {
        let mut graph = StateGraph::<TestState>::new();
        graph.add_node("noop", |_state, _runtime| async move { Ok(Op::Add(0)) });
        graph.set_entry_point("noop");
        graph.set_finish_point("noop");

        let compiled = graph.compile().unwrap();
        let err = compiled
            .invoke(None, &RunConfig::default(), ())
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::EmptyInput));
        assert!(matches!(
            compiled.get_state(&RunConfig::new("t-1")).await,
            Err(GraphError::NoCheckpointer)
        ));
    }

    #[test]
    fn test_compile_requires_entrypoint() {
        let mut graph = StateGraph::<TestState>::new();
        graph.add_node("orphan", |_state, _runtime| async move { Ok(Op::Add(0)) });

        assert!(matches!(graph.compile(), Err(GraphError::InvalidGraph(_))));
    }

    #[test]
    fn test_compile_rejects_unknown_edge_target() {
        let mut graph = StateGraph::<TestState>::new();
        graph.add_node("a", |_state, _runtime| async move { Ok(Op::Add(0)) });
        graph.add_edge(START, "a");
        graph.add_edge("a", "missing");

        let Err(GraphError::InvalidGraph(message)) = graph.compile() else {
            panic!("expected an invalid graph");
        };
        assert!(message.contains("missing"));
    }

    #[test]
    fn test_compile_rejects_unknown_branch_target() {
        let mut graph = StateGraph::<TestState>::new();
        graph.add_node("check", |_state, _runtime| async move { Ok(Op::Add(0)) });
        graph.add_edge(START, "check");
        graph.add_conditional_edges(
            "check",
            |_state: &TestState| async move { "yes".to_string() },
            Some(HashMap::from([
                ("yes".to_string(), "missing".to_string()),
                ("no".to_string(), END.to_string()),
            ])),
        );

        let Err(GraphError::InvalidGraph(message)) = graph.compile() else {
            panic!("expected an invalid graph");
        };
        assert!(message.contains("missing"));
    }

    #[tokio::test]
    async fn test_unknown_route_leaves_thread_resumable() {
        let mut graph = StateGraph::<TestState>::new();
        graph.add_node("check", |_state, _runtime| async move { Ok(Op::Add(1)) });
        graph.add_node("done", |_state, _runtime| async move { Ok(Op::Double) });
        graph.add_edge(START, "check");
        graph.add_conditional_edges(
            "check",
            |state: &TestState| {
                let value = state.value;
                async move {
                    if value > 10 {
                        "done".to_string()
                    } else {
                        "nowhere".to_string()
                    }
                }
            },
            None,
        );
        graph.add_edge("done", END);

        let saver = Arc::new(agent_graph_checkpoint::InMemorySaver::new());
        let compiled = graph.compile().unwrap().with_checkpointer(saver.clone());
        let config = RunConfig::new("t-1");

        let err = compiled
            .invoke(Some(Op::Set(1)), &config, ())
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::UnknownNode(ref name) if name == "nowhere"));

        let head = compiled.get_state(&config).await.unwrap().unwrap();
        assert_eq!(head.next, vec!["check"]);
        assert_eq!(compiled.get_state_history(&config).await.unwrap().len(), 1);

        let fixed = compiled
            .update_state(&config, Op::Set(20), Some(START))
            .await
            .unwrap();
        let result = compiled.invoke(None, &fixed, ()).await.unwrap();
        assert_eq!(result.value, 42);
    }

    #[test]
    #[should_panic(expected = "reserved")]
    fn test_reserved_node_name() {
        let mut graph = StateGraph::<TestState>::new();
        graph.add_node(END, |_state, _runtime| async move { Ok(Op::Add(0)) });
    }

    #[test]
    fn test_get_graph() {
        let mut graph = StateGraph::<TestState>::new();
        graph.add_node("b", |_state, _runtime| async move { Ok(Op::Add(0)) });
        graph.add_node("a", |_state, _runtime| async move { Ok(Op::Add(0)) });
        graph.add_edge(START, "a");
        graph.add_edge("a", "b");
        graph.add_edge("b", END);

        let structure = graph.compile().unwrap().get_graph();
        assert_eq!(structure.nodes, vec!["a", "b"]);
        assert_eq!(structure.edges.len(), 3);
        assert!(structure.branches.is_empty());
    }
}
