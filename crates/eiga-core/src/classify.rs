//! Confidence-gated classification of resolution results.

use serde::{Deserialize, Serialize};

use crate::error::EigaError;

/// The two cut points partitioning scores into accept, review, and reject
/// bands. Construct through [`Thresholds::new`], which rejects inverted or
/// out-of-range pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub high: f64,
    pub low: f64,
}

impl Thresholds {
    pub const DEFAULT_HIGH: f64 = 82.0;
    pub const DEFAULT_LOW: f64 = 70.0;

    /// Validate and build a threshold pair. Requires `0 <= low <= high <= 100`.
    pub fn new(high: f64, low: f64) -> Result<Self, EigaError> {
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if high < low || !in_range(high) || !in_range(low) {
            return Err(EigaError::InvalidThresholds { high, low });
        }
        Ok(Self { high, low })
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high: Self::DEFAULT_HIGH,
            low: Self::DEFAULT_LOW,
        }
    }
}

/// Where a scored candidate ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Confident match: write the catalog entry, no human step.
    Accept,
    /// Plausible match: ask a human to confirm, rename, or ignore.
    Review,
    /// No candidate worth showing.
    Reject,
}

/// Route a confidence score into exactly one band.
///
/// Boundary scores land in the higher band: a score equal to `high` is
/// accepted, a score equal to `low` goes to review.
pub fn route(score: f64, thresholds: &Thresholds) -> Classification {
    if score >= thresholds.high {
        Classification::Accept
    } else if score >= thresholds.low {
        Classification::Review
    } else {
        Classification::Reject
    }
}
