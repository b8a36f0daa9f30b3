//! Per-invocation runtime handed to every node.

use std::sync::Arc;

use agent_graph_checkpoint::BaseStore;

/// What a node can reach besides its state: the invocation context and the
/// long-term store the graph was compiled with.
///
/// The context is supplied per call and is never written to a checkpoint.
pub struct Runtime<C> {
    context: Arc<C>,
    store: Option<Arc<dyn BaseStore>>,
}

impl<C> Clone for Runtime<C> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            store: self.store.clone(),
        }
    }
}

impl<C> Runtime<C> {
    /// Create a runtime.
    pub fn new(context: C, store: Option<Arc<dyn BaseStore>>) -> Self {
        Self {
            context: Arc::new(context),
            store,
        }
    }

    /// The invocation context.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// The long-term store, if the graph has one.
    pub fn store(&self) -> Option<&Arc<dyn BaseStore>> {
        self.store.as_ref()
    }
}

impl<C: std::fmt::Debug> std::fmt::Debug for Runtime<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("context", &self.context)
            .field("store", &self.store.is_some())
            .finish()
    }
}
