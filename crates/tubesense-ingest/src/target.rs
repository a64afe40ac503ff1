//! How many comments a collection run aims for.

use std::fmt;

/// Derived once per run from the platform's total, the requested share, and
/// an optional hard cap. Immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionTarget {
    /// Keep going until the API has no further pages.
    Unbounded,
    Limit(usize),
}

impl CollectionTarget {
    /// A full share with no cap is unbounded; otherwise the target is
    /// `min(hard_cap, floor(total * percentage))`.
    pub fn compute(total_available: u64, percentage: f64, hard_cap: Option<usize>) -> Self {
        if hard_cap.is_none() && percentage >= 1.0 {
            return Self::Unbounded;
        }
        let share = (total_available as f64 * percentage).floor() as usize;
        match hard_cap {
            Some(cap) => Self::Limit(cap.min(share)),
            None => Self::Limit(share),
        }
    }

    pub fn is_reached(&self, collected: usize) -> bool {
        match self {
            Self::Unbounded => false,
            Self::Limit(n) => collected >= *n,
        }
    }
}

impl fmt::Display for CollectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => f.write_str("unbounded"),
            Self::Limit(n) => write!(f, "{n}"),
        }
    }
}
