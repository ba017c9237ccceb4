//! Request construction and mutation errors.

use thiserror::Error;

/// Errors raised while building or mutating a [`Request`](crate::request::Request).
#[derive(Debug, Error)]
pub enum RequestError {
    /// Scheme other than `http` or `https`.
    #[error("Unsupported scheme \"{0}\"")]
    InvalidScheme(String),

    /// The URL could not be parsed at all.
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The method is not a valid HTTP token.
    #[error("Invalid method \"{0}\"")]
    InvalidMethod(String),
}

/// Result type for request operations.
pub type RequestResult<T> = Result<T, RequestError>;
