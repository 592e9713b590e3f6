#![forbid(unsafe_code)]

//! Index normalization for splice and slice positions.
//!
//! Positions are signed so callers can address the sequence from either end.
//! Both helpers are total: every input maps to a valid position, so the
//! controller never has to report an out-of-range error for these calls.
//!
//! | Input            | Resolved position          |
//! |------------------|----------------------------|
//! | `0..=len`        | unchanged                  |
//! | `> len`          | `len`                      |
//! | `-n` (n <= len)  | `len - n`                  |
//! | `-n` (n > len)   | `0`                        |

use std::ops::Range;

/// Resolve a signed position against a sequence of length `len`.
///
/// Negative positions count back from the end; the result is clamped to
/// `0..=len`.
#[inline]
#[must_use]
pub fn resolve_position(position: isize, len: usize) -> usize {
    match usize::try_from(position) {
        Ok(p) => p.min(len),
        Err(_) => len.saturating_sub(position.unsigned_abs()),
    }
}

/// Insertion point for a splice at `index` into a sequence of length `len`.
///
/// `index > len` appends, `index < -len` prepends.
#[inline]
#[must_use]
pub fn splice_index(index: isize, len: usize) -> usize {
    resolve_position(index, len)
}

/// Half-open range selected by `slice(start, end)`.
///
/// An omitted `start` means the beginning and an omitted `end` means the
/// end of the sequence. A range whose start lands at or after its end is
/// empty (it never panics when used to index a slice of length `len`).
#[must_use]
pub fn slice_range(start: Option<isize>, end: Option<isize>, len: usize) -> Range<usize> {
    let start = start.map_or(0, |s| resolve_position(s, len));
    let end = end.map_or(len, |e| resolve_position(e, len));
    start..end.max(start)
}
