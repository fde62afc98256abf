/*!
 * Error types for the storyfy pipeline.
 *
 * This module contains custom error types for the different layers of the
 * pipeline, using the thiserror crate for ergonomic error definitions.
 * `PipelineError` is the one entry points convert into response envelopes.
 */

use thiserror::Error;

/// Errors that can occur when working with model provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The response parsed but carried no generated text
    #[error("Response contained no generated text")]
    EmptyResponse,
}

impl ProviderError {
    /// Map a non-success HTTP status and body to the matching variant
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Errors raised by object storage backends
#[derive(Error, Debug)]
pub enum StorageError {
    /// The requested object does not exist
    #[error("Object not found: {bucket}/{key}")]
    NotFound {
        /// Bucket name
        bucket: String,
        /// Object key
        key: String,
    },

    /// The bucket or key cannot be mapped onto the backend
    #[error("Invalid object location: {0}")]
    InvalidLocation(String),

    /// Underlying I/O failure
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while invoking another entry point
#[derive(Error, Debug)]
pub enum InvocationError {
    /// No entry point is registered under this name
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Transport failure reaching a remote function
    #[error("Invocation transport error: {0}")]
    Transport(String),

    /// The invoked function answered with a payload we cannot read
    #[error("Invalid invocation response: {0}")]
    InvalidResponse(String),
}

/// Errors surfaced by the pipeline entry points.
///
/// Each variant maps onto one HTTP-like status code of the response envelope.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Missing or malformed request fields
    #[error("{0}")]
    InvalidInput(String),

    /// The submitted document is not a well-formed tree
    #[error("Invalid XML content")]
    Parse(String),

    /// A storage event record exists but lacks a required field
    #[error("Error reading event details: missing field '{0}'")]
    EventMetadata(&'static str),

    /// Object storage failure on a gating read or the first write
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A model call failed or returned an unexpected shape
    #[error("Inference error for {dimension}: {message}")]
    Inference {
        /// Dimension or function name the call was made for
        dimension: String,
        /// Failure detail
        message: String,
    },

    /// Downstream function invocation failed
    #[error("Invocation error: {0}")]
    Invocation(#[from] InvocationError),

    /// Anything else
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl PipelineError {
    /// Status code reported in the response envelope
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) | Self::Parse(_) => 400,
            _ => 500,
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Boundary errors carry their specific message; backend failures are
    /// reported opaquely and only logged in full.
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidInput(_) | Self::Parse(_) | Self::EventMetadata(_) => self.to_string(),
            Self::Storage(inner @ StorageError::NotFound { .. }) => {
                format!("Error reading from storage: {}", inner)
            }
            _ => "Internal server error".to_string(),
        }
    }
}
