//! Inspection configuration
//!
//! Everything the core needs from the outside world arrives through
//! [`InspectConfig`]. The defaults mirror the public Hugging Face hub.

use std::time::Duration;

/// Default endpoint template for file resolution on the public hub
pub const HF_URL_TEMPLATE: &str = "https://huggingface.co/{repo}/resolve/{revision}/{filename}";

/// Canonical single-file checkpoint name
pub const SAFETENSORS_FILE: &str = "model.safetensors";

/// Canonical sharded index manifest name
pub const SAFETENSORS_INDEX_FILE: &str = "model.safetensors.index.json";

/// Revision used when none is given
pub const DEFAULT_REVISION: &str = "main";

/// Upper bound on the header length prefix, in bytes
pub const MAX_HEADER_LENGTH: u64 = 25_000_000;

/// User agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("model-inspect/", env!("CARGO_PKG_VERSION"));

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// When a failed sharded resolution falls back to the single-file layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Any sharded-path failure triggers the fallback
    #[default]
    AnyError,
    /// Only a 404 on the index manifest triggers the fallback
    IndexNotFound,
}

/// How unrecognized dtype tags are sized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DtypePolicy {
    /// Unknown dtypes count as one byte per element
    #[default]
    Lenient,
    /// Unknown dtypes fail the catalog build
    Strict,
}

/// Configuration for one inspection run
#[derive(Debug, Clone)]
pub struct InspectConfig {
    /// Branch, tag or commit to resolve files against
    pub revision: String,

    /// Number of shard headers fetched in parallel
    pub concurrency: usize,

    /// Mirror endpoint, either a full `{repo}/{revision}/{filename}` template
    /// or a base URL
    pub mirror: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,

    /// Retries after the first attempt for retryable failures
    pub retries: u32,

    /// Base delay for exponential backoff
    pub backoff: Duration,

    pub fallback: FallbackPolicy,

    pub dtype_policy: DtypePolicy,

    pub user_agent: String,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            revision: DEFAULT_REVISION.to_string(),
            concurrency: 1,
            mirror: None,
            timeout: Duration::from_secs(30),
            retries: 3,
            backoff: Duration::from_secs(1),
            fallback: FallbackPolicy::default(),
            dtype_policy: DtypePolicy::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl InspectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the revision
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    /// Set the shard concurrency (0 is treated as 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set a mirror template or base URL
    pub fn with_mirror(mut self, mirror: impl Into<String>) -> Self {
        self.mirror = Some(mirror.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_dtype_policy(mut self, policy: DtypePolicy) -> Self {
        self.dtype_policy = policy;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Effective shard concurrency, never below one
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    /// URL template requests are resolved against. The mirror wins when set.
    pub fn url_template(&self) -> String {
        match self.mirror.as_deref() {
            Some(mirror) if mirror.contains("{filename}") => mirror.to_string(),
            Some(base) => format!(
                "{}/{{repo}}/resolve/{{revision}}/{{filename}}",
                base.trim_end_matches('/')
            ),
            None => HF_URL_TEMPLATE.to_string(),
        }
    }

    /// Load overrides from environment variables on top of the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(mirror) = lookup("MODEL_INSPECT_MIRROR").or_else(|| lookup("HF_ENDPOINT")) {
            if !mirror.is_empty() {
                config.mirror = Some(mirror);
            }
        }

        if let Some(secs) = lookup("MODEL_INSPECT_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse_var("MODEL_INSPECT_TIMEOUT_SECS", &secs)?);
        }

        if let Some(retries) = lookup("MODEL_INSPECT_RETRIES") {
            config.retries = parse_var("MODEL_INSPECT_RETRIES", &retries)?;
        }

        if let Some(ms) = lookup("MODEL_INSPECT_BACKOFF_MS") {
            config.backoff = Duration::from_millis(parse_var("MODEL_INSPECT_BACKOFF_MS", &ms)?);
        }

        if let Some(n) = lookup("MODEL_INSPECT_CONCURRENCY") {
            config.concurrency = parse_var::<usize>("MODEL_INSPECT_CONCURRENCY", &n)?.max(1);
        }

        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: value.to_string(),
    })
}
