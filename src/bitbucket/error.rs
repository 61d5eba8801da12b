//! Error types surfaced by the Bitbucket REST client.

use thiserror::Error;

/// Errors surfaced while communicating with the Bitbucket API.
///
/// The client performs no retries; every variant is terminal for the call
/// that produced it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The API answered with a non-2xx status.
    #[error("{endpoint} answered {status}: {body}")]
    Transport {
        /// Endpoint the request was sent to.
        endpoint: String,
        /// HTTP status code of the response.
        status: u16,
        /// Raw response body, for causal traceability.
        body: String,
    },

    /// The connection failed before a status was received.
    #[error("network error talking to {endpoint}: {message}")]
    Network {
        /// Endpoint the request was sent to.
        endpoint: String,
        /// Transport-level error detail.
        message: String,
    },

    /// The response body was not the JSON the client expected.
    #[error("decoding response from {endpoint} failed: {message}")]
    Decode {
        /// Endpoint the response came from.
        endpoint: String,
        /// Parser error detail.
        message: String,
    },

    /// A request URL could not be constructed.
    #[error("invalid API URL: {message}")]
    InvalidUrl {
        /// URL parser error detail.
        message: String,
    },
}
