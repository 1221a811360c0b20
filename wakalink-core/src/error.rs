use serde_json::Value;

/// Errors that can occur during the authentication process.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The requested grant type is not supported
    #[error("Unsupported grant type: {0}")]
    InvalidGrant(String),
    /// A parameter required by the grant was not supplied
    #[error("Required parameter not passed: {0}")]
    MissingParameter(&'static str),
    /// The authorization server answered with a body that is not a key/value document
    #[error("Invalid response received from authorization server: {0}")]
    UnexpectedResponseFormat(String),
    /// The authorization server reported an error in the response body
    #[error(transparent)]
    IdentityProvider(#[from] IdentityProviderError),
    /// The HTTP transport failed before a response was received
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The CSRF state parameter does not match the expected value
    #[error("CSRF state mismatch")]
    CsrfMismatch,
    /// The client configuration is incomplete
    #[error("Configuration error: {0}")]
    Config(String),
}

/// An error reported by the identity provider inside a response body.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Identity provider error ({status}): {message}")]
pub struct IdentityProviderError {
    /// Human-readable message, taken from the body or the HTTP reason phrase.
    pub message: String,
    /// HTTP status code of the response.
    pub status: u16,
    /// The decoded response body.
    pub body: Value,
}

impl IdentityProviderError {
    /// Creates a new provider error.
    pub fn new(message: impl Into<String>, status: u16, body: Value) -> Self {
        Self {
            message: message.into(),
            status,
            body,
        }
    }
}

/// Errors produced by an [`HttpTransport`](crate::transport::HttpTransport).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The underlying HTTP client failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Any other transport failure
    #[error("Transport failure: {0}")]
    Other(String),
}
