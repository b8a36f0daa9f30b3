use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid external configuration. Raised before any graph runs.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Graph(#[from] agent_graph::GraphError),

    #[error("responder error: {0}")]
    Responder(#[from] ResponderError),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the error refers to a checkpoint that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Graph(err) if err.is_not_found())
    }

    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Graph(err) => err.is_retryable(),
            Self::Responder(err) => err.is_retryable(),
            Self::Config(_) => false,
        }
    }
}

/// Failure while producing response text.
#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ResponderError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Transport failures, rate limits and server errors are worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Malformed(_) => false,
        }
    }
}
