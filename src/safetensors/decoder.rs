//! Remote header decoding via two range requests

use tracing::debug;

use super::error::DecodeError;
use super::header::{read_header_length, SafetensorsHeader, HEADER_PREFIX_LEN};
use crate::config::MAX_HEADER_LENGTH;
use crate::fetch::{ByteRange, RangeFetchClient, Transport};

/// Decodes safetensors headers without downloading tensor data
///
/// Each decode issues exactly two ranged GETs: `bytes=0-7` for the length
/// prefix `L`, then `bytes=8-(8+L-1)` for the JSON header itself.
#[derive(Debug)]
pub struct HeaderDecoder<'a, T> {
    client: &'a RangeFetchClient<T>,
    max_header_length: u64,
}

impl<'a, T: Transport> HeaderDecoder<'a, T> {
    pub fn new(client: &'a RangeFetchClient<T>) -> Self {
        Self {
            client,
            max_header_length: MAX_HEADER_LENGTH,
        }
    }

    /// Override the header length ceiling
    pub fn with_max_header_length(mut self, limit: u64) -> Self {
        self.max_header_length = limit;
        self
    }

    pub fn decode(
        &self,
        repo: &str,
        filename: &str,
        revision: &str,
    ) -> Result<SafetensorsHeader, DecodeError> {
        let prefix = self.client.fetch(
            repo,
            filename,
            revision,
            Some(ByteRange::new(0, HEADER_PREFIX_LEN - 1)),
        )?;
        let length = read_header_length(&prefix)?;

        if length > self.max_header_length {
            return Err(DecodeError::HeaderTooLarge {
                length,
                limit: self.max_header_length,
            });
        }
        let range = match ByteRange::with_len(HEADER_PREFIX_LEN, length) {
            Some(range) => range,
            None if length == 0 => return SafetensorsHeader::from_slice(&[]),
            None => {
                return Err(DecodeError::HeaderTooLarge {
                    length,
                    limit: u64::MAX - HEADER_PREFIX_LEN,
                });
            }
        };

        let body = self.client.fetch(repo, filename, revision, Some(range))?;
        if (body.len() as u64) < length {
            return Err(DecodeError::UnexpectedEof {
                expected: length,
                got: body.len() as u64,
            });
        }

        let header = SafetensorsHeader::from_slice(&body[..length as usize])?;
        debug!(repo, filename, header_len = length, tensors = header.len(), "Decoded header");
        Ok(header)
    }
}
