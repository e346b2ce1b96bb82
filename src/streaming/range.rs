//! `Range` header parsing (RFC 9110 §14.2), single span only.
//!
//! Accepted form: `bytes=<start>-<end>` with `<end>` optional. Suffix spans
//! (`bytes=-500`) and multi-span requests (`bytes=0-10,20-30`) are rejected;
//! the caller answers them with `416` like any other unsatisfiable range.

use std::fmt;

/// An inclusive byte span `[start, end]` inside a resource of known size.
///
/// Only [`ByteRange::parse`] builds one, so `start <= end < size` always
/// holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    start: u64,
    end: u64,
}

/// Why a `Range` header could not be honoured.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("malformed range header `{0}`")]
    Malformed(String),
    #[error("multiple ranges are not supported")]
    MultipleRanges,
    #[error("range {start}-{end:?} not satisfiable for {size} bytes")]
    Unsatisfiable { start: u64, end: Option<u64>, size: u64 },
}

impl ByteRange {
    /// Parses a `Range` header against a resource of `size` bytes.
    pub fn parse(header: &str, size: u64) -> Result<Self, RangeError> {
        let malformed = || RangeError::Malformed(header.to_owned());

        let (unit, spec) = header.trim().split_once('=').ok_or_else(malformed)?;
        if !unit.trim().eq_ignore_ascii_case("bytes") {
            return Err(malformed());
        }
        if spec.contains(',') {
            return Err(RangeError::MultipleRanges);
        }

        let (start, end) = spec.split_once('-').ok_or_else(malformed)?;
        let start = parse_offset(start).ok_or_else(malformed)?;
        let end = match end.trim() {
            "" => None,
            e => Some(parse_offset(e).ok_or_else(malformed)?),
        };

        let unsatisfiable = RangeError::Unsatisfiable { start, end, size };
        let last = end.or_else(|| size.checked_sub(1)).ok_or(unsatisfiable.clone())?;
        if start > last || last >= size {
            return Err(unsatisfiable);
        }
        Ok(Self { start, end: last })
    }

    pub fn start(&self) -> u64 { self.start }
    pub fn end(&self) -> u64 { self.end }

    /// Number of bytes in the span; never zero.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` value for a `206` response.
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{size}", self.start, self.end)
    }
}

/// `Content-Range` value for a `416` response.
pub fn unsatisfied_content_range(size: u64) -> String {
    format!("bytes */{size}")
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

// `u64::from_str` accepts a leading `+`, which is not valid in a byte position.
fn parse_offset(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
