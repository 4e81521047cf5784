//! Request descriptions and URL templating

use std::fmt;

/// Inclusive byte range, as sent in an HTTP `Range` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Range covering `start..=end`
    pub const fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Range of `len` bytes starting at `start`. `None` when `len` is zero
    /// or the last byte would lie past `u64::MAX`.
    pub fn with_len(start: u64, len: u64) -> Option<Self> {
        let end = start.checked_add(len.checked_sub(1)?)?;
        Some(Self { start, end })
    }

    /// Number of bytes covered, zero when `end < start`
    pub const fn len(&self) -> u64 {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start).saturating_add(1)
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Value for the `Range` request header
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A single file fetch against a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub repo: String,
    pub filename: String,
    pub revision: String,
    pub range: Option<ByteRange>,
    pub url: String,
}

impl FetchRequest {
    /// Build a request, resolving its URL from `template`
    pub fn new(
        template: &str,
        repo: &str,
        filename: &str,
        revision: &str,
        range: Option<ByteRange>,
    ) -> Self {
        Self {
            repo: repo.to_string(),
            filename: filename.to_string(),
            revision: revision.to_string(),
            range,
            url: render_url(template, repo, revision, filename),
        }
    }
}

/// Substitute `{repo}`, `{revision}` and `{filename}` into a URL template.
/// Values are inserted verbatim.
pub fn render_url(template: &str, repo: &str, revision: &str, filename: &str) -> String {
    template
        .replace("{repo}", repo)
        .replace("{revision}", revision)
        .replace("{filename}", filename)
}
