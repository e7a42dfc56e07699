pub type Result<T> = std::result::Result<T, SourceError>;

/// Failures an adapter reports at its boundary.
///
/// Callers treat every variant as "the upstream could not be used this time";
/// a query that legitimately matched nothing is never an error.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The request did not complete within its timeout.
    #[error("Request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    /// The upstream answered with a non-2xx status.
    #[error("HTTP request failed with status {0}")]
    Status(u16),

    #[error("Invalid url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The upstream answered but flagged the call as failed.
    #[error("Upstream rejected the request: {0}")]
    Upstream(String),

    /// A record was found but its id or title could not be recovered.
    #[error("Record is missing its id or title")]
    MissingIdentity,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}

impl From<reqwest::Error> for SourceError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            SourceError::Timeout
        } else if let Some(status) = value.status() {
            SourceError::Status(status.as_u16())
        } else {
            SourceError::Transport(value.to_string())
        }
    }
}

impl From<eyre::Report> for SourceError {
    fn from(err: eyre::Report) -> Self {
        SourceError::Parse(err.to_string())
    }
}
