//! The three steps of a turn.

use agent_graph::{NodeError, Runtime};

use crate::error::ResponderError;
use crate::facts::{Fact, extract_fact};
use crate::responder::Responder;
use crate::state::{AgentContext, AgentState, AgentStateUpdate};
use crate::tools::{save_memory, search_memories};

pub const LOAD_MEMORIES: &str = "load_memories";
pub const REMEMBER_FACT: &str = "remember_fact";
pub const RESPOND: &str = "respond";

/// Records read from the store per turn.
pub const MEMORY_SEARCH_LIMIT: usize = 10;
/// Facts kept in `memory_hits`.
pub const MEMORY_HITS: usize = 3;

const NO_PRIOR_MEMORY: &str = "no prior memory";

impl From<ResponderError> for NodeError {
    fn from(err: ResponderError) -> Self {
        if err.is_retryable() {
            NodeError::retryable(err.to_string())
        } else {
            NodeError::new(err.to_string())
        }
    }
}

/// Load the most recent facts of the user. Never writes to the store.
pub async fn load_memories(
    _state: AgentState,
    runtime: Runtime<AgentContext>,
) -> Result<AgentStateUpdate, NodeError> {
    let user_id = &runtime.context().user_id;
    let found = search_memories(runtime.store(), user_id, None, MEMORY_SEARCH_LIMIT).await;
    if let Some(reason) = &found.reason {
        tracing::warn!(user_id = %user_id, reason = %reason, "memories unavailable");
    }

    let count = found.facts.len();
    // Newest first from the store; keep the latest few, oldest of them first.
    let mut hits: Vec<String> = found.facts.into_iter().take(MEMORY_HITS).collect();
    hits.reverse();

    Ok(AgentStateUpdate::event(format!("loaded_memories:{count}")).with_memory_hits(hits))
}

/// Extract at most one fact from the message and remember it.
///
/// `stored_fact` holds the fact the message states once it is in the store,
/// whether written by this step or already known. It is cleared when the
/// message states no fact or the store cannot take it. Only a new write
/// counts as `remembered_fact:1`.
pub async fn remember_fact(
    state: AgentState,
    runtime: Runtime<AgentContext>,
) -> Result<AgentStateUpdate, NodeError> {
    let found = extract_fact(&state.user_message);
    let Some(fact) = Fact::from_match(&found, &state.user_message) else {
        return Ok(AgentStateUpdate::event("remembered_fact:0").with_stored_fact(None));
    };

    let outcome = save_memory(runtime.store(), &runtime.context().user_id, &fact).await;
    let event = if outcome.saved {
        "remembered_fact:1"
    } else {
        tracing::debug!(fact = %fact.text(), reason = ?outcome.reason, "fact not written");
        "remembered_fact:0"
    };

    Ok(AgentStateUpdate::event(event).with_stored_fact(outcome.fact))
}

/// `memory_hits` plus the turn's stored fact, joined by `" | "`.
pub fn memory_summary(state: &AgentState) -> String {
    let mut facts: Vec<&str> = state.memory_hits.iter().map(String::as_str).collect();
    if let Some(stored) = state.stored_fact.as_deref()
        && !facts.contains(&stored)
    {
        facts.push(stored);
    }

    if facts.is_empty() {
        NO_PRIOR_MEMORY.to_string()
    } else {
        facts.join(" | ")
    }
}

/// Produce the reply for the turn.
pub async fn respond(
    state: AgentState,
    responder: &dyn Responder,
) -> Result<AgentStateUpdate, NodeError> {
    let summary = memory_summary(&state);
    let text = responder.respond(&state.user_message, &summary).await?;

    Ok(AgentStateUpdate::event("responded").with_response(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use agent_graph::{BaseStore, GraphState, InMemoryStore};
    use serde_json::json;

    use crate::facts::memory_namespace;
    use crate::responder::TemplateResponder;

    fn runtime(store: &Arc<dyn BaseStore>, user_id: &str) -> Runtime<AgentContext> {
        Runtime::new(AgentContext::new(user_id), Some(store.clone()))
    }

    fn state(message: &str) -> AgentState {
        AgentState {
            user_message: message.to_string(),
            ..AgentState::default()
        }
    }

    #[tokio::test]
    async fn test_load_memories_empty() {
        let store: Arc<dyn BaseStore> = Arc::new(InMemoryStore::new());
        let update = load_memories(state("hi"), runtime(&store, "u-1")).await.unwrap();

        assert_eq!(update.memory_hits, Some(vec![]));
        assert_eq!(update.timeline, vec!["loaded_memories:0"]);
    }

    #[tokio::test]
    async fn test_load_memories_keeps_latest_three_in_order() {
        let store: Arc<dyn BaseStore> = Arc::new(InMemoryStore::new());
        let namespace = memory_namespace("u-1");
        for (i, fact) in ["name: Jon", "likes: pizza", "likes: tea", "likes: ramen"]
            .iter()
            .enumerate()
        {
            store
                .put(&namespace, &format!("k{i}"), json!({ "fact": fact }))
                .await
                .unwrap();
        }
        store.put(&namespace, "junk", json!({ "fact": 1 })).await.unwrap();

        let update = load_memories(state("hi"), runtime(&store, "u-1")).await.unwrap();

        assert_eq!(
            update.memory_hits,
            Some(vec![
                "likes: pizza".to_string(),
                "likes: tea".to_string(),
                "likes: ramen".to_string(),
            ])
        );
        assert_eq!(update.timeline, vec!["loaded_memories:4"]);
    }

    #[tokio::test]
    async fn test_load_memories_without_store() {
        let update = load_memories(state("hi"), Runtime::new(AgentContext::new("u-1"), None))
            .await
            .unwrap();
        assert_eq!(update.timeline, vec!["loaded_memories:0"]);
    }

    #[tokio::test]
    async fn test_remember_fact_stores_once() {
        let store: Arc<dyn BaseStore> = Arc::new(InMemoryStore::new());

        let first = remember_fact(state("my name is Jon"), runtime(&store, "u-1"))
            .await
            .unwrap();
        assert_eq!(first.stored_fact, Some(Some("name: Jon".to_string())));
        assert_eq!(first.timeline, vec!["remembered_fact:1"]);

        let again = remember_fact(state("My name is jon"), runtime(&store, "u-1"))
            .await
            .unwrap();
        assert_eq!(again.stored_fact, Some(Some("name: Jon".to_string())));
        assert_eq!(again.timeline, vec!["remembered_fact:0"]);

        let records = store.search(&memory_namespace("u-1"), None, 10).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_known_fact_older_than_hits_reaches_summary() {
        let store: Arc<dyn BaseStore> = Arc::new(InMemoryStore::new());
        for message in ["i like pizza", "i like tea", "i like ramen", "my name is Jon"] {
            remember_fact(state(message), runtime(&store, "u-1"))
                .await
                .unwrap();
        }

        let mut s = state("I like pizza");
        let loaded = load_memories(s.clone(), runtime(&store, "u-1")).await.unwrap();
        s.apply(loaded);
        assert!(!s.memory_hits.contains(&"likes: pizza".to_string()));

        let remembered = remember_fact(s.clone(), runtime(&store, "u-1")).await.unwrap();
        s.apply(remembered);
        assert_eq!(
            memory_summary(&s),
            "likes: tea | likes: ramen | name: Jon | likes: pizza"
        );
    }

    #[tokio::test]
    async fn test_remember_fact_no_match() {
        let store: Arc<dyn BaseStore> = Arc::new(InMemoryStore::new());
        let update = remember_fact(state("what do you remember?"), runtime(&store, "u-1"))
            .await
            .unwrap();

        assert_eq!(update.timeline, vec!["remembered_fact:0"]);
        assert!(store.search(&memory_namespace("u-1"), None, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remember_fact_without_store_continues() {
        let update = remember_fact(
            state("my name is Jon"),
            Runtime::new(AgentContext::new("u-1"), None),
        )
        .await
        .unwrap();
        assert_eq!(update.timeline, vec!["remembered_fact:0"]);
        assert_eq!(update.stored_fact, Some(None));
    }

    #[test]
    fn test_memory_summary() {
        let mut s = state("hi");
        assert_eq!(memory_summary(&s), "no prior memory");

        s.memory_hits = vec!["name: Jon".into()];
        s.stored_fact = Some("name: Jon".into());
        assert_eq!(memory_summary(&s), "name: Jon");

        s.stored_fact = Some("likes: pizza".into());
        assert_eq!(memory_summary(&s), "name: Jon | likes: pizza");
    }

    #[tokio::test]
    async fn test_respond_with_template() {
        let mut s = state("my name is Jon");
        let update = respond(s.clone(), &TemplateResponder).await.unwrap();
        s.apply(update);

        assert_eq!(
            s.response.as_deref(),
            Some("You said: my name is Jon\nMemory: no prior memory")
        );
        assert_eq!(s.timeline, vec!["responded"]);
    }

    #[test]
    fn test_responder_errors_map_to_node_errors() {
        let err: NodeError = ResponderError::api(503, "overloaded").into();
        assert!(err.retryable);

        let err: NodeError = ResponderError::api(400, "bad request").into();
        assert!(!err.retryable);
    }
}
