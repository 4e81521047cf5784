//! HTTP transport

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::RANGE;

use super::error::{FetchError, TransportError};
use super::request::ByteRange;

/// Raw answer to a single GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One-shot GET with an optional byte range. Retries live in the client.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, range: Option<ByteRange>) -> Result<TransportResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get(&self, url: &str, range: Option<ByteRange>) -> Result<TransportResponse, TransportError> {
        (**self).get(url, range)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str, range: Option<ByteRange>) -> Result<TransportResponse, TransportError> {
        (**self).get(url, range)
    }
}

/// Blocking reqwest transport
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Create a transport with a fixed user agent and per-request timeout
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, range: Option<ByteRange>) -> Result<TransportResponse, TransportError> {
        let mut request = self.client.get(url);
        if let Some(range) = range {
            request = request.header(RANGE, range.header_value());
        }

        let response = request.send().map_err(from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            return Ok(TransportResponse::new(status.as_u16(), Vec::new()));
        }

        // A server that ignores Range answers 200 with the whole file; never
        // read past the last byte we asked for.
        let mut body = Vec::new();
        let read = match range {
            Some(range) => response
                .take(range.end.saturating_add(1))
                .read_to_end(&mut body),
            None => {
                let mut response = response;
                response.read_to_end(&mut body)
            }
        };
        read.map_err(from_io)?;

        Ok(TransportResponse::new(status.as_u16(), body))
    }
}

fn from_reqwest(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Io(e.to_string())
    }
}

fn from_io(e: std::io::Error) -> TransportError {
    if e.kind() == std::io::ErrorKind::TimedOut {
        TransportError::Timeout
    } else {
        TransportError::Io(e.to_string())
    }
}
