use serde::Deserialize;

/// Structured error returned by the API in the `error` field of a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiStatus {
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub status: String,
}

impl std::fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}", self.message, self.code)?;
        if !self.status.is_empty() {
            write!(f, ", {}", self.status)?;
        }
        write!(f, ")")
    }
}

/// Envelope wrapping [`ApiStatus`] in error response bodies.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ApiStatus,
}

/// Errors that can occur when talking to the Photos Library API.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Could not decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(ApiStatus),

    #[error("Resource not found")]
    NotFound,

    #[error("Unexpected response status: '{status}' with body: '{body}'")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Too many ids: got {count}, at most {max} allowed per request")]
    TooManyIds { count: usize, max: usize },

    #[error("Could not read file '{path}'")]
    Io {
        path: String,
        #[source]
        io_error: std::io::Error,
    },

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Operation was cancelled")]
    Cancelled,
}

impl ApiError {
    /// The structured server error, if this is one.
    pub fn api_status(&self) -> Option<&ApiStatus> {
        match self {
            Self::Api(status) => Some(status),
            _ => None,
        }
    }
}
