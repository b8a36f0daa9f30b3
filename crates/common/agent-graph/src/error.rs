//! Error types for graph construction and execution.

use thiserror::Error;

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Failure reported by a node.
///
/// A node that returns an error writes no checkpoint, so the thread stays
/// resumable from the last completed step.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct NodeError {
    /// Terse, user-presentable reason.
    pub message: String,
    /// Whether re-running the node may succeed, e.g. after a timeout.
    pub retryable: bool,
}

impl NodeError {
    /// A failure that will not resolve on retry.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }

    /// A transient failure, typically from an external call.
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }
}

/// Main error type for graph operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The graph structure failed validation at compile time.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// A checkpointed graph was invoked without a thread id.
    #[error("a thread_id is required when the graph has a checkpointer")]
    MissingThreadId,

    /// State inspection or editing was requested on a graph without a checkpointer.
    #[error("the graph was compiled without a checkpointer")]
    NoCheckpointer,

    /// Invoked without input on a graph that cannot resume anything.
    #[error("no input given and nothing to resume")]
    EmptyInput,

    /// Invoked without input on a thread that has no checkpoints.
    #[error("no input given and thread '{thread_id}' has nothing to resume")]
    NothingToResume { thread_id: String },

    /// A node name that the graph does not contain.
    #[error("unknown node '{0}'")]
    UnknownNode(String),

    /// A state edit that cannot be applied.
    #[error("invalid state update: {0}")]
    InvalidUpdate(String),

    /// A node returned an error.
    #[error("node '{node}' failed: {source}")]
    NodeFailed {
        node: String,
        #[source]
        source: NodeError,
    },

    /// The checkpoint saver failed, including unknown checkpoint ids.
    #[error(transparent)]
    Checkpoint(#[from] agent_graph_checkpoint::Error),

    /// Graph state could not be converted to or from its stored form.
    #[error("failed to convert graph state: {0}")]
    State(#[from] serde_json::Error),
}

impl GraphError {
    /// Whether the error refers to a checkpoint id that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Checkpoint(err) if err.is_not_found())
    }

    /// Whether retrying the same invocation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NodeFailed { source, .. } if source.retryable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_node_failure() {
        let err = GraphError::NodeFailed {
            node: "respond".to_string(),
            source: NodeError::retryable("timed out"),
        };
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "node 'respond' failed: timed out");

        let err = GraphError::NodeFailed {
            node: "respond".to_string(),
            source: NodeError::new("bad input"),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_not_found_detection() {
        let err = GraphError::from(agent_graph_checkpoint::Error::not_found("t-1", "cp"));
        assert!(err.is_not_found());
        assert!(!GraphError::MissingThreadId.is_not_found());
    }
}
