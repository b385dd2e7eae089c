/// Resolution of an optional `Range` request header against a file's total
/// size. Pure computation, no I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedRange {
    /// Serve the whole file with status 200. Also the fallback for malformed
    /// or multi-range headers, which degrade rather than fail.
    Full,
    /// Serve `[start, end]` inclusive with status 206.
    Partial { start: u64, end: u64 },
    /// Syntactically valid but not satisfiable (start beyond EOF, inverted
    /// bounds, empty suffix). Status 416 with `Content-Range: bytes */total`.
    Unsatisfiable,
}

impl ResolvedRange {
    pub fn len(&self, total_size: u64) -> u64 {
        match self {
            ResolvedRange::Full => total_size,
            ResolvedRange::Partial { start, end } => end - start + 1,
            ResolvedRange::Unsatisfiable => 0,
        }
    }
}

/// Parses a single-range `bytes=<start>-<end>` header (either bound may be
/// omitted, not both) and clamps it to `total_size`. Multi-range requests and
/// anything unparseable fall back to `Full`.
pub fn resolve(header: Option<&str>, total_size: u64) -> ResolvedRange {
    let value = match header {
        Some(h) => h.trim(),
        None => return ResolvedRange::Full,
    };
    let Some(rest) = value.strip_prefix("bytes=") else {
        return ResolvedRange::Full;
    };
    if rest.contains(',') {
        // multi-range is unsupported; degrade to the whole file
        return ResolvedRange::Full;
    }
    let parts: Vec<&str> = rest.split('-').collect();
    if parts.len() != 2 {
        return ResolvedRange::Full;
    }
    let start = match parts[0] {
        "" => None,
        s => match s.trim().parse::<u64>() {
            Ok(n) => Some(n),
            Err(_) => return ResolvedRange::Full,
        },
    };
    let end = match parts[1] {
        "" => None,
        s => match s.trim().parse::<u64>() {
            Ok(n) => Some(n),
            Err(_) => return ResolvedRange::Full,
        },
    };

    match (start, end) {
        (Some(start), Some(end)) => {
            if start > end || start >= total_size {
                return ResolvedRange::Unsatisfiable;
            }
            ResolvedRange::Partial {
                start,
                end: end.min(total_size - 1),
            }
        }
        (Some(start), None) => {
            if start >= total_size {
                return ResolvedRange::Unsatisfiable;
            }
            ResolvedRange::Partial {
                start,
                end: total_size - 1,
            }
        }
        // suffix form: last `n` bytes
        (None, Some(n)) => {
            if n == 0 || total_size == 0 {
                return ResolvedRange::Unsatisfiable;
            }
            ResolvedRange::Partial {
                start: total_size.saturating_sub(n),
                end: total_size - 1,
            }
        }
        (None, None) => ResolvedRange::Full,
    }
}

pub fn content_range(start: u64, end: u64, total_size: u64) -> String {
    format!("bytes {}-{}/{}", start, end, total_size)
}

pub fn content_range_unsatisfied(total_size: u64) -> String {
    format!("bytes */{}", total_size)
}
