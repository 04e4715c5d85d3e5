//! `Range` header parsing for partial asset delivery (RFC 9110 §14).
//!
//! Only a single `bytes=` range is honoured; multi-range requests are served
//! in full.

/// A resolved, inclusive byte range within an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub const fn len(self) -> usize {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for an asset of `total` bytes.
    pub fn content_range(self, total: usize) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

/// Outcome of evaluating a `Range` header against an asset size.
#[derive(Debug, PartialEq, Eq)]
pub enum RangeOutcome {
    /// Serve the given slice with 206
    Partial(ByteRange),
    /// Answer 416
    NotSatisfiable,
    /// No usable Range header; serve the whole asset
    Full,
}

/// Evaluate a `Range` header for an asset of `size` bytes.
///
/// Accepted forms: `bytes=start-end`, `bytes=start-`, `bytes=-suffix`.
/// Malformed headers and other units are ignored rather than rejected.
pub fn parse_range_header(range_header: Option<&str>, size: usize) -> RangeOutcome {
    let Some(spec) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeOutcome::Full;
    };
    if spec.contains(',') {
        return RangeOutcome::Full;
    }
    let Some((first, last)) = spec.split_once('-') else {
        return RangeOutcome::Full;
    };
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        return suffix_range(last, size);
    }

    let Ok(start) = first.parse::<usize>() else {
        return RangeOutcome::Full;
    };
    if start >= size {
        return RangeOutcome::NotSatisfiable;
    }

    let end = if last.is_empty() {
        size - 1
    } else {
        match last.parse::<usize>() {
            Ok(end) if end < start => return RangeOutcome::NotSatisfiable,
            Ok(end) => end.min(size - 1),
            Err(_) => return RangeOutcome::Full,
        }
    };

    RangeOutcome::Partial(ByteRange { start, end })
}

fn suffix_range(last: &str, size: usize) -> RangeOutcome {
    match last.parse::<usize>() {
        Ok(0) => RangeOutcome::NotSatisfiable,
        Ok(_) if size == 0 => RangeOutcome::NotSatisfiable,
        Ok(n) => RangeOutcome::Partial(ByteRange {
            start: size.saturating_sub(n),
            end: size - 1,
        }),
        Err(_) => RangeOutcome::Full,
    }
}
