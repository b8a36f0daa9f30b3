//! In-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::{BaseStore, Item, Namespace};
use crate::error::Result;

#[derive(Debug, Clone)]
struct Entry {
    /// Write order across the whole store, used for recency ranking.
    revision: u64,
    item: Item,
}

#[derive(Debug, Default)]
struct Records {
    namespaces: HashMap<Namespace, HashMap<String, Entry>>,
    revision: u64,
}

impl Records {
    /// Insert or overwrite under the caller's write lock.
    fn upsert(&mut self, namespace: &Namespace, key: &str, value: serde_json::Value) {
        let now = Utc::now();
        self.revision += 1;
        let revision = self.revision;

        let entries = self.namespaces.entry(namespace.clone()).or_default();
        match entries.get_mut(key) {
            Some(entry) => {
                entry.revision = revision;
                entry.item.value = value;
                entry.item.updated_at = now;
            }
            None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        revision,
                        item: Item {
                            namespace: namespace.clone(),
                            key: key.to_string(),
                            value,
                            created_at: now,
                            updated_at: now,
                        },
                    },
                );
            }
        }

        tracing::trace!(%namespace, key, revision, "store record written");
    }
}

/// In-memory implementation of [`BaseStore`].
///
/// Uses an `Arc<RwLock<..>>` internally, so clones share the same records and
/// writes from concurrent tasks are serialized.
///
/// # Examples
///
/// ```ignore
/// use agent_graph_checkpoint::{BaseStore, InMemoryStore, Namespace};
/// use serde_json::json;
///
/// let store = InMemoryStore::new();
/// let ns = Namespace::new(["u-1", "memories"]);
/// store.put(&ns, "k1", json!({"fact": "name: Jon"})).await?;
///
/// let hits = store.search(&ns, None, 10).await?;
/// assert_eq!(hits[0].value["fact"], "name: Jon");
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    records: Arc<RwLock<Records>>,
}

impl InMemoryStore {
    /// Initialize an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a namespace.
    pub fn len(&self, namespace: &Namespace) -> usize {
        self.records
            .read()
            .namespaces
            .get(namespace)
            .map_or(0, HashMap::len)
    }
}

#[async_trait]
impl BaseStore for InMemoryStore {
    async fn put(&self, namespace: &Namespace, key: &str, value: serde_json::Value) -> Result<()> {
        let mut records = self.records.write();
        records.upsert(namespace, key, value);
        Ok(())
    }

    async fn put_unique(
        &self,
        namespace: &Namespace,
        key: &str,
        value: serde_json::Value,
        unique_by: &str,
    ) -> Result<Option<Item>> {
        let mut records = self.records.write();

        if let Some(wanted) = value.get(unique_by) {
            let existing = records.namespaces.get(namespace).and_then(|entries| {
                entries
                    .values()
                    .find(|entry| entry.item.value.get(unique_by) == Some(wanted))
            });
            if let Some(entry) = existing {
                tracing::trace!(
                    %namespace,
                    key = %entry.item.key,
                    unique_by,
                    "store record already present"
                );
                return Ok(Some(entry.item.clone()));
            }
        }

        records.upsert(namespace, key, value);
        Ok(None)
    }

    async fn get(&self, namespace: &Namespace, key: &str) -> Result<Option<Item>> {
        let records = self.records.read();
        Ok(records
            .namespaces
            .get(namespace)
            .and_then(|entries| entries.get(key))
            .map(|entry| entry.item.clone()))
    }

    async fn search(
        &self,
        namespace: &Namespace,
        query: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Item>> {
        let records = self.records.read();
        let Some(entries) = records.namespaces.get(namespace) else {
            return Ok(Vec::new());
        };

        let query = query.map(str::to_lowercase);
        let mut matches: Vec<&Entry> = entries
            .values()
            .filter(|entry| match &query {
                Some(query) => entry.item.value.to_string().to_lowercase().contains(query),
                None => true,
            })
            .collect();
        matches.sort_by(|a, b| b.revision.cmp(&a.revision));

        Ok(matches
            .into_iter()
            .take(limit)
            .map(|entry| entry.item.clone())
            .collect())
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let records = self.records.read();
        f.debug_struct("InMemoryStore")
            .field("namespaces", &records.namespaces.len())
            .finish()
    }
}
