//! Unified error handling for the client.

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Local storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),

    #[error("Connectivity failure: {0}")]
    ConnectivityFailure(String),

    #[error("Remote rejected request ({status}): {body}")]
    RemoteRejected { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Engine error: {0}")]
    Engine(#[from] turbo_engine::Error),
}

impl ClientError {
    /// Whether the request never reached the server.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ClientError::ConnectivityFailure(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::InvalidResponse(e.to_string())
        } else {
            // connect, timeout, request building and body transfer errors
            ClientError::ConnectivityFailure(e.to_string())
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
