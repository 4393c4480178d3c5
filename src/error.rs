use thiserror::Error;

/// Failures reported by the cluster collaborator.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("not found: {0}")]
    NotFound(String),
    /// The source is not installed or not serving, e.g. metrics-server.
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Errors surfaced by aggregator operations. Enrichment failures never end up
/// here; they are absorbed into defaults.
#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Upstream(String),
    #[error("pod {namespace}/{name} has no status phase")]
    MissingPhase { namespace: String, name: String },
    #[error("{0}")]
    InvalidRequest(String),
}

impl AggregatorError {
    pub fn code(&self) -> &'static str {
        match self {
            AggregatorError::NotFound(_) => "NOT_FOUND",
            AggregatorError::Upstream(_) => "UPSTREAM_FAILURE",
            AggregatorError::MissingPhase { .. } => "INCOMPLETE_OBJECT",
            AggregatorError::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }
}

impl From<ClusterError> for AggregatorError {
    fn from(err: ClusterError) -> Self {
        match err {
            ClusterError::NotFound(msg) => AggregatorError::NotFound(msg),
            other => AggregatorError::Upstream(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("{0}")]
    Invalid(String),
}
