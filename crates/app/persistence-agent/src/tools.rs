//! Memory tools over the shared store.
//!
//! Both tools degrade instead of failing: when no store is wired in, or the
//! store errors, they report a structured reason and the turn carries on.

use std::sync::Arc;

use agent_graph_checkpoint::BaseStore;
use serde::Serialize;

use crate::facts::{Fact, memory_namespace};

/// Reason reported when an equal fact is already in the namespace.
pub const FACT_ALREADY_STORED: &str = "fact already stored";

/// Result of [`save_memory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub saved: bool,
    /// Store key of the record holding the fact, new or already present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Display text of that record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SaveOutcome {
    fn saved(key: String, fact: String) -> Self {
        Self {
            saved: true,
            key: Some(key),
            fact: Some(fact),
            reason: None,
        }
    }

    fn known(key: String, fact: String) -> Self {
        Self {
            saved: false,
            key: Some(key),
            fact: Some(fact),
            reason: Some(FACT_ALREADY_STORED.to_string()),
        }
    }

    fn skipped(reason: impl Into<String>) -> Self {
        Self {
            saved: false,
            key: None,
            fact: None,
            reason: Some(reason.into()),
        }
    }

    /// Whether the fact is in the store after the call, written now or before.
    pub fn is_stored(&self) -> bool {
        self.fact.is_some()
    }
}

/// Result of [`search_memories`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    /// Fact texts, most recent first.
    pub facts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SearchOutcome {
    fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            facts: Vec::new(),
            reason: Some(reason.into()),
        }
    }
}

/// Persist `fact` in the user's namespace unless an equal fact is already there.
pub async fn save_memory(
    store: Option<&Arc<dyn BaseStore>>,
    user_id: &str,
    fact: &Fact,
) -> SaveOutcome {
    let Some(store) = store else {
        return SaveOutcome::skipped("memory store is not available");
    };
    if user_id.is_empty() {
        return SaveOutcome::skipped("user context is not available");
    }

    let namespace = memory_namespace(user_id);
    let key = fact.id.to_string();

    let existing = match store
        .put_unique(&namespace, &key, fact.to_record(), "fingerprint")
        .await
    {
        Ok(existing) => existing,
        Err(err) => {
            tracing::warn!(user_id, error = %err, "memory write failed");
            return SaveOutcome::skipped(format!("memory store error: {err}"));
        }
    };

    match existing {
        Some(item) => {
            let text = item
                .value
                .get("fact")
                .and_then(|v| v.as_str())
                .map_or_else(|| fact.text(), str::to_string);
            tracing::debug!(user_id, key = %item.key, fact = %text, "fact already known");
            SaveOutcome::known(item.key, text)
        }
        None => {
            tracing::info!(user_id, key = %key, fact = %fact.text(), "fact remembered");
            SaveOutcome::saved(key, fact.text())
        }
    }
}

/// Up to `limit` fact texts from the user's namespace, most recent first.
///
/// Records without a string `fact` field are skipped.
pub async fn search_memories(
    store: Option<&Arc<dyn BaseStore>>,
    user_id: &str,
    query: Option<&str>,
    limit: usize,
) -> SearchOutcome {
    let Some(store) = store else {
        return SearchOutcome::unavailable("memory store is not available");
    };
    if user_id.is_empty() {
        return SearchOutcome::unavailable("user context is not available");
    }

    match store.search(&memory_namespace(user_id), query, limit).await {
        Ok(items) => SearchOutcome {
            facts: items
                .into_iter()
                .filter_map(|item| {
                    item.value
                        .get("fact")
                        .and_then(|fact| fact.as_str())
                        .map(str::to_string)
                })
                .collect(),
            reason: None,
        },
        Err(err) => {
            tracing::warn!(user_id, error = %err, "memory search failed");
            SearchOutcome::unavailable(format!("memory store error: {err}"))
        }
    }
}
