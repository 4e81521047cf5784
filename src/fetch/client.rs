//! Range fetch client with retries and exponential backoff

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::error::{is_retryable_status, FetchError, TransportError};
use super::request::{ByteRange, FetchRequest};
use super::transport::{HttpTransport, Transport, TransportResponse};
use crate::config::InspectConfig;

type Sleeper = Arc<dyn Fn(Duration) + Send + Sync>;

/// Fetches whole files or byte windows from a templated endpoint
pub struct RangeFetchClient<T = HttpTransport> {
    transport: T,
    url_template: String,
    retries: u32,
    backoff: Duration,
    sleeper: Sleeper,
}

impl RangeFetchClient<HttpTransport> {
    /// Create a client backed by reqwest, configured from `config`
    pub fn from_config(config: &InspectConfig) -> Result<Self, FetchError> {
        let transport = HttpTransport::new(&config.user_agent, config.timeout)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> RangeFetchClient<T> {
    /// Create a client over an arbitrary transport
    pub fn new(transport: T, config: &InspectConfig) -> Self {
        Self {
            transport,
            url_template: config.url_template(),
            retries: config.retries,
            backoff: config.backoff,
            sleeper: Arc::new(std::thread::sleep),
        }
    }

    /// Replace the function used to wait between attempts
    pub fn with_sleeper<F>(mut self, sleeper: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    /// Describe a fetch without issuing it
    pub fn request(
        &self,
        repo: &str,
        filename: &str,
        revision: &str,
        range: Option<ByteRange>,
    ) -> FetchRequest {
        FetchRequest::new(&self.url_template, repo, filename, revision, range)
    }

    /// Fetch `filename` (or the inclusive `range` of it) from `repo` at `revision`
    pub fn fetch(
        &self,
        repo: &str,
        filename: &str,
        revision: &str,
        range: Option<ByteRange>,
    ) -> Result<Vec<u8>, FetchError> {
        self.execute(&self.request(repo, filename, revision, range))
    }

    /// Issue a request, retrying transport failures and 429/5xx answers
    pub fn execute(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        let mut attempt: u32 = 0;

        loop {
            debug!(url = %request.url, range = ?request.range, attempt, "GET");

            let error = match self.transport.get(&request.url, request.range) {
                Ok(response) if response.is_success() => {
                    return Ok(take_window(response, request.range));
                }
                Ok(response) if is_retryable_status(response.status) => FetchError::Status {
                    url: request.url.clone(),
                    status: response.status,
                },
                Ok(response) => {
                    return Err(FetchError::Status {
                        url: request.url.clone(),
                        status: response.status,
                    });
                }
                Err(TransportError::Timeout) => FetchError::Timeout {
                    url: request.url.clone(),
                    attempts: attempt.saturating_add(1),
                },
                Err(TransportError::Io(message)) => FetchError::Transport {
                    url: request.url.clone(),
                    message,
                },
            };

            if attempt >= self.retries {
                return Err(error);
            }

            let delay = backoff_delay(self.backoff, attempt);
            attempt += 1;
            warn!(
                url = %request.url,
                attempt,
                retry_in = ?delay,
                error = %error,
                "Request failed, retrying"
            );
            (self.sleeper)(delay);
        }
    }
}

impl<T> fmt::Debug for RangeFetchClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeFetchClient")
            .field("url_template", &self.url_template)
            .field("retries", &self.retries)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

/// Delay before retry number `attempt + 1`: `base * 2^attempt`
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

// A 206 body already is the window. A 200 body is the file from offset 0.
fn take_window(response: TransportResponse, range: Option<ByteRange>) -> Vec<u8> {
    match range {
        Some(range) if response.status == 200 => {
            let mut body = response.body;
            let len = body.len() as u64;
            if range.start >= len {
                return Vec::new();
            }
            body.truncate(range.end.saturating_add(1).min(len) as usize);
            body.drain(..range.start as usize);
            body
        }
        _ => response.body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_schedule() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(100));
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(200));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(400));
        assert_eq!(backoff_delay(base, 40), base.saturating_mul(u32::MAX));
    }

    #[test]
    fn test_take_window_partial_content() {
        let response = TransportResponse::new(206, vec![1, 2, 3]);
        assert_eq!(take_window(response, Some(ByteRange::new(8, 10))), vec![1, 2, 3]);
    }

    #[test]
    fn test_take_window_full_body() {
        let body: Vec<u8> = (0..20).collect();
        let response = TransportResponse::new(200, body);
        assert_eq!(
            take_window(response, Some(ByteRange::new(8, 10))),
            vec![8, 9, 10]
        );
    }

    #[test]
    fn test_take_window_short_full_body() {
        let response = TransportResponse::new(200, vec![0, 1, 2]);
        assert!(take_window(response.clone(), Some(ByteRange::new(8, 10))).is_empty());
        assert_eq!(take_window(response, Some(ByteRange::new(1, 10))), vec![1, 2]);
    }
}
