//! Range-request fetching of remote repository files

mod client;
mod error;
mod request;
mod transport;

pub use client::{backoff_delay, RangeFetchClient};
pub use error::{is_retryable_status, FetchError, TransportError};
pub use request::{render_url, ByteRange, FetchRequest};
pub use transport::{HttpTransport, Transport, TransportResponse};
