#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("Request to {url} timed out after {attempts} attempt(s)")]
    Timeout { url: String, attempts: u32 },
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Error raised by a [`Transport`](super::Transport) for a single attempt
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("timed out")]
    Timeout,
    #[error("{0}")]
    Io(String),
}

/// Status codes worth another attempt
pub const fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}
