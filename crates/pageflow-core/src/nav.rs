//! Pure page-index arithmetic.
//!
//! All functions map `(current, max)` to a new in-range index. Boundaries
//! wrap around instead of clamping, so navigation never produces an
//! out-of-range index.

/// Index of the first page.
pub fn first() -> usize {
    0
}

/// One page back, wrapping to the end.
pub fn backward(current: usize, max: usize) -> usize {
    if current == 0 {
        max
    } else {
        current - 1
    }
}

/// One page forward, wrapping to the start.
pub fn forward(current: usize, max: usize) -> usize {
    if current == max {
        0
    } else {
        current + 1
    }
}

/// Index of the last page.
pub fn last(max: usize) -> usize {
    max
}

/// Index for a 1-based page number.
///
/// Callers must validate `1 <= number <= max + 1` first; out-of-range input
/// is rejected upstream, never clamped here.
pub fn jump_to(number: usize) -> usize {
    debug_assert!(number >= 1, "page numbers are 1-based");
    number - 1
}
