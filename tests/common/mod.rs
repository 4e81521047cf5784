#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use model_inspect::config::InspectConfig;
use model_inspect::fetch::{ByteRange, RangeFetchClient, Transport, TransportError, TransportResponse};

pub const TEMPLATE: &str = "mock://{repo}/{revision}/{filename}";
pub const REPO: &str = "org/model";

/// Canned failure returned before a file is served
#[derive(Debug, Clone, Copy)]
pub enum Scripted {
    Status(u16),
    Timeout,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedRequest {
    pub url: String,
    pub range: Option<ByteRange>,
}

/// In-memory file server with HTTP range semantics
#[derive(Default)]
pub struct MockHub {
    files: Mutex<HashMap<String, Vec<u8>>>,
    scripted: Mutex<HashMap<String, VecDeque<Scripted>>>,
    log: Mutex<Vec<LoggedRequest>>,
    ignore_range: bool,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer ranged requests with `200` and the full body
    pub fn ignoring_range() -> Self {
        Self {
            ignore_range: true,
            ..Self::default()
        }
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub fn add_file(&self, repo: &str, filename: &str, bytes: Vec<u8>) {
        self.files.lock().unwrap().insert(url(repo, filename), bytes);
    }

    /// Queue failures for the next requests to `filename`
    pub fn script(&self, repo: &str, filename: &str, failures: &[Scripted]) {
        self.scripted
            .lock()
            .unwrap()
            .entry(url(repo, filename))
            .or_default()
            .extend(failures.iter().copied());
    }

    pub fn requests(&self) -> Vec<LoggedRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn requests_for(&self, repo: &str, filename: &str) -> Vec<LoggedRequest> {
        let target = url(repo, filename);
        self.requests().into_iter().filter(|r| r.url == target).collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn serve(&self, url: &str, range: Option<ByteRange>) -> Result<TransportResponse, TransportError> {
        let scripted = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(|queue| queue.pop_front());
        match scripted {
            Some(Scripted::Status(status)) => return Ok(TransportResponse::new(status, Vec::new())),
            Some(Scripted::Timeout) => return Err(TransportError::Timeout),
            Some(Scripted::Reset) => return Err(TransportError::Io("connection reset".into())),
            None => {}
        }

        let files = self.files.lock().unwrap();
        let Some(bytes) = files.get(url) else {
            return Ok(TransportResponse::new(404, Vec::new()));
        };

        match range {
            Some(range) if !self.ignore_range => {
                let len = bytes.len() as u64;
                if range.start >= len {
                    return Ok(TransportResponse::new(416, Vec::new()));
                }
                let end = range.end.min(len - 1);
                Ok(TransportResponse::new(
                    206,
                    bytes[range.start as usize..=end as usize].to_vec(),
                ))
            }
            _ => Ok(TransportResponse::new(200, bytes.clone())),
        }
    }
}

impl Transport for MockHub {
    fn get(&self, url: &str, range: Option<ByteRange>) -> Result<TransportResponse, TransportError> {
        self.log.lock().unwrap().push(LoggedRequest {
            url: url.to_string(),
            range,
        });

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }
        let response = self.serve(url, range);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}

pub fn url(repo: &str, filename: &str) -> String {
    format!("mock://{}/main/{}", repo, filename)
}

/// Config pointing at the mock hub, with millisecond backoff
pub fn config() -> InspectConfig {
    InspectConfig::new()
        .with_mirror(TEMPLATE)
        .with_backoff(Duration::from_millis(1))
}

/// Client over `hub` that never actually sleeps
pub fn client(hub: &Arc<MockHub>, config: &InspectConfig) -> RangeFetchClient<Arc<MockHub>> {
    RangeFetchClient::new(Arc::clone(hub), config).with_sleeper(|_| {})
}

/// JSON header text with entries in the given order
pub fn header_json(tensors: &[(&str, &str, Vec<u64>)], metadata: Option<&str>) -> String {
    let mut entries = Vec::new();
    if let Some(metadata) = metadata {
        entries.push(format!("\"__metadata__\":{}", metadata));
    }
    let mut offset = 0u64;
    for (name, dtype, shape) in tensors {
        let end = offset + shape.iter().product::<u64>();
        entries.push(format!(
            "\"{}\":{{\"dtype\":\"{}\",\"shape\":{:?},\"data_offsets\":[{},{}]}}",
            name, dtype, shape, offset, end
        ));
        offset = end;
    }
    format!("{{{}}}", entries.join(","))
}

/// A safetensors file image: length prefix, header, then fake tensor data
pub fn safetensors_bytes(header: &str) -> Vec<u8> {
    let mut bytes = (header.len() as u64).to_le_bytes().to_vec();
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend(std::iter::repeat(0xAB).take(64));
    bytes
}

pub fn safetensors_file(tensors: &[(&str, &str, Vec<u64>)]) -> Vec<u8> {
    safetensors_bytes(&header_json(tensors, None))
}

pub fn index_json(weight_map: &[(&str, &str)]) -> Vec<u8> {
    let entries: Vec<String> = weight_map
        .iter()
        .map(|(tensor, shard)| format!("\"{}\":\"{}\"", tensor, shard))
        .collect();
    format!(
        "{{\"metadata\":{{\"total_size\":0}},\"weight_map\":{{{}}}}}",
        entries.join(",")
    )
    .into_bytes()
}
