//! Agent state, its partial updates, and the per-invocation context.

use agent_graph::GraphState;
use serde::{Deserialize, Serialize};

/// State carried through one turn and checkpointed after every step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentState {
    pub user_message: String,
    #[serde(default)]
    pub memory_hits: Vec<String>,
    /// Event tags, one or more per completed step. Only ever appended to.
    #[serde(default)]
    pub timeline: Vec<String>,
    /// The fact remembered during the current turn, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_fact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

/// A partial [`AgentState`] update.
///
/// Present scalar fields overwrite, `timeline` entries are appended. The
/// optional fields take `Some(None)` to clear the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentStateUpdate {
    pub user_message: Option<String>,
    pub memory_hits: Option<Vec<String>>,
    pub timeline: Vec<String>,
    pub stored_fact: Option<Option<String>>,
    pub response: Option<Option<String>>,
}

impl AgentStateUpdate {
    /// Input for a new turn: sets the message and resets per-turn fields.
    pub fn new_turn(message: impl Into<String>) -> Self {
        Self {
            user_message: Some(message.into()),
            memory_hits: Some(Vec::new()),
            timeline: Vec::new(),
            stored_fact: Some(None),
            response: Some(None),
        }
    }

    /// Replace the user message, leaving everything else as is.
    pub fn user_message(message: impl Into<String>) -> Self {
        Self {
            user_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Append a single timeline event.
    pub fn event(tag: impl Into<String>) -> Self {
        Self {
            timeline: vec![tag.into()],
            ..Self::default()
        }
    }

    pub fn with_memory_hits(mut self, hits: Vec<String>) -> Self {
        self.memory_hits = Some(hits);
        self
    }

    pub fn with_stored_fact(mut self, fact: Option<String>) -> Self {
        self.stored_fact = Some(fact);
        self
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(Some(response.into()));
        self
    }
}

impl GraphState for AgentState {
    type Update = AgentStateUpdate;

    fn apply(&mut self, update: AgentStateUpdate) {
        if let Some(message) = update.user_message {
            self.user_message = message;
        }
        if let Some(hits) = update.memory_hits {
            self.memory_hits = hits;
        }
        self.timeline.extend(update.timeline);
        if let Some(fact) = update.stored_fact {
            self.stored_fact = fact;
        }
        if let Some(response) = update.response {
            self.response = response;
        }
    }
}

/// Per-invocation context. Never written to a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentContext {
    /// Selects the memory namespace the turn reads and writes.
    pub user_id: String,
}

impl AgentContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeline_is_appended() {
        let mut state = AgentState::default();
        state.apply(AgentStateUpdate::event("loaded_memories:0"));
        state.apply(AgentStateUpdate::event("remembered_fact:1"));

        assert_eq!(state.timeline, vec!["loaded_memories:0", "remembered_fact:1"]);
    }

    #[test]
    fn test_new_turn_clears_previous_turn() {
        let mut state = AgentState {
            user_message: "my name is Jon".into(),
            memory_hits: vec!["name: Jon".into()],
            timeline: vec!["responded".into()],
            stored_fact: Some("name: Jon".into()),
            response: Some("You said: my name is Jon".into()),
        };

        state.apply(AgentStateUpdate::new_turn("what do you remember?"));

        assert_eq!(state.user_message, "what do you remember?");
        assert!(state.memory_hits.is_empty());
        assert_eq!(state.timeline, vec!["responded"]);
        assert_eq!(state.stored_fact, None);
        assert_eq!(state.response, None);
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let mut state = AgentState {
            user_message: "i like pizza".into(),
            stored_fact: Some("likes: pizza".into()),
            ..AgentState::default()
        };

        state.apply(AgentStateUpdate::user_message("i like ramen"));

        assert_eq!(state.user_message, "i like ramen");
        assert_eq!(state.stored_fact.as_deref(), Some("likes: pizza"));
    }

    #[test]
    fn test_optional_fields_skipped_when_empty() {
        let value = serde_json::to_value(AgentState::default()).unwrap();
        assert!(value.get("stored_fact").is_none());
        assert!(value.get("response").is_none());

        let state: AgentState = serde_json::from_value(serde_json::json!({
            "user_message": "hi"
        }))
        .unwrap();
        assert!(state.timeline.is_empty());
    }
}
