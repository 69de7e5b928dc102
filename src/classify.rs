//! Qualitative labels for closeness scores.
//!
//! Thresholds 0.7 / 0.5 / 0.3. Under the canonical `Strict` policy a score
//! sitting exactly on a threshold falls into the lower band (0.7 → Good);
//! `Inclusive` moves it to the upper band (0.7 → Excellent).

use serde::{Deserialize, Serialize};
use std::fmt;

pub const EXCELLENT_ABOVE: f64 = 0.7;
pub const GOOD_ABOVE: f64 = 0.5;
pub const AVERAGE_ABOVE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Label {
    Poor,
    Average,
    Good,
    Excellent,
}

impl Label {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::Poor => "Poor",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of a threshold a boundary score belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// `score > threshold` (canonical).
    #[default]
    Strict,
    /// `score >= threshold`.
    Inclusive,
}

impl BoundaryPolicy {
    fn above(self, score: f64, threshold: f64) -> bool {
        match self {
            Self::Strict => score > threshold,
            Self::Inclusive => score >= threshold,
        }
    }
}

impl std::str::FromStr for BoundaryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" | ">" => Ok(Self::Strict),
            "inclusive" | ">=" => Ok(Self::Inclusive),
            other => Err(format!("unknown boundary policy `{other}`")),
        }
    }
}

/// Label under the canonical strict convention.
pub fn classify(score: f64) -> Label {
    classify_with(score, BoundaryPolicy::Strict)
}

pub fn classify_with(score: f64, policy: BoundaryPolicy) -> Label {
    if policy.above(score, EXCELLENT_ABOVE) {
        Label::Excellent
    } else if policy.above(score, GOOD_ABOVE) {
        Label::Good
    } else if policy.above(score, AVERAGE_ABOVE) {
        Label::Average
    } else {
        Label::Poor
    }
}
