//! Infrastructure-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::traits::HttpMethod;

/// Infrastructure errors wrap application errors and add I/O-level concerns.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{method} {url} returned {status}: {body}")]
    Http {
        method: HttpMethod,
        url: String,
        status: u16,
        body: String,
    },

    #[error("{method} {url} failed")]
    Transport {
        method: HttpMethod,
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("unexpected JSON from {context}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl InfraError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Raw response body of a non-200 reply, if this is one.
    pub fn http_body(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
