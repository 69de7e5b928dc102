//! Error types for the evaluation core.
//!
//! Every failure is deterministic: the same input fails the same way on
//! retry, so nothing here is retried by callers.

use thiserror::Error;

/// Conditions that abort an evaluation run before any ranking is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Malformed, empty, negative, non-finite or out-of-range input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Manual weights add up to zero and cannot be normalised.
    #[error("manual weights sum to zero; at least one criterion needs a positive weight")]
    ZeroWeightSum,

    /// A criterion mean is not positive, so mean ratios are undefined.
    #[error("criterion {criterion} has non-positive mean score {mean}; pairwise ratios are undefined")]
    DegenerateAverage { criterion: usize, mean: f64 },
}

impl EvalError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Stable machine-readable label (used in HTTP bodies, logs and metrics).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::ZeroWeightSum => "zero_weight_sum",
            Self::DegenerateAverage { .. } => "degenerate_average",
        }
    }
}

pub type EvalResult<T> = Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(EvalError::invalid("x").kind(), "invalid_input");
        assert_eq!(EvalError::ZeroWeightSum.kind(), "zero_weight_sum");
        assert_eq!(
            EvalError::DegenerateAverage {
                criterion: 2,
                mean: 0.0
            }
            .kind(),
            "degenerate_average"
        );
    }

    #[test]
    fn display_carries_detail() {
        let e = EvalError::invalid("matrix has no rows");
        assert_eq!(e.to_string(), "invalid input: matrix has no rows");
    }
}
