//! Long-term key/value store shared across threads.
//!
//! Records are JSON values grouped by a [`Namespace`]. Unlike checkpoints,
//! store records are mutable and visible to every thread that addresses the
//! same namespace.

pub mod memory;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use memory::InMemoryStore;

/// A hierarchical key that partitions store records, e.g. `("u-1", "memories")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Namespace(Vec<String>);

impl Namespace {
    /// Build a namespace from its labels.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }

    /// The labels making up this namespace.
    pub fn labels(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// A record held by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub namespace: Namespace,
    pub key: String,
    pub value: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Interface for long-term stores.
///
/// Implementations serialize concurrent writes; the last write to a key wins.
#[async_trait]
pub trait BaseStore: Send + Sync {
    /// Insert or overwrite the record at `key`.
    async fn put(&self, namespace: &Namespace, key: &str, value: serde_json::Value) -> Result<()>;

    /// Insert `value` at `key` unless a record of `namespace` already has the
    /// same top-level `unique_by` field.
    ///
    /// The check and the write happen as one operation, so concurrent calls
    /// with equal values write exactly once. Returns the existing record when
    /// one matched; nothing is written then. A value without `unique_by` is
    /// always written.
    async fn put_unique(
        &self,
        namespace: &Namespace,
        key: &str,
        value: serde_json::Value,
        unique_by: &str,
    ) -> Result<Option<Item>>;

    /// Fetch a single record.
    async fn get(&self, namespace: &Namespace, key: &str) -> Result<Option<Item>>;

    /// Up to `limit` records of exactly `namespace`, most recently written
    /// first. With a `query`, only records whose JSON text contains it
    /// (case-insensitively) are returned.
    async fn search(
        &self,
        namespace: &Namespace,
        query: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Item>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_display() {
        let ns = Namespace::new(["u-1", "memories"]);
        assert_eq!(ns.to_string(), "u-1.memories");
        assert_eq!(ns.labels(), ["u-1".to_string(), "memories".to_string()]);
    }

    #[test]
    fn test_namespaces_compare_by_labels() {
        assert_eq!(
            Namespace::new(["u-1", "memories"]),
            Namespace::new(vec!["u-1".to_string(), "memories".to_string()])
        );
        assert_ne!(
            Namespace::new(["u-1", "memories"]),
            Namespace::new(["u-2", "memories"])
        );
    }
}
