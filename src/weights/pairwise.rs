//! Pairwise-average weighting (simplified AHP).
//!
//! From each criterion's mean raw score `avg_j` build the ratio matrix
//! `M[j][k] = avg_j / avg_k`, take row means as priorities and normalise them.
//! The ratios are perfectly consistent by construction, so there is no
//! eigenvector or consistency-ratio step.

use crate::error::{EvalError, EvalResult};
use crate::matrix::ScoreMatrix;

use super::CriterionWeights;

pub fn pairwise_average_weights(scores: &ScoreMatrix) -> EvalResult<CriterionWeights> {
    let means = scores.column_means();

    // A zero mean would put a division by zero into the ratio matrix.
    if let Some((j, &mean)) = means.iter().enumerate().find(|(_, m)| **m <= 0.0) {
        return Err(EvalError::DegenerateAverage {
            criterion: j + 1,
            mean,
        });
    }

    let ratios = ratio_matrix(&means);
    let n = means.len() as f64;
    let priorities: Vec<f64> = ratios.iter().map(|row| row.iter().sum::<f64>() / n).collect();

    CriterionWeights::from_raw(priorities)
}

/// `M[j][k] = avg_j / avg_k`; callers guarantee every mean is positive.
fn ratio_matrix(means: &[f64]) -> Vec<Vec<f64>> {
    means
        .iter()
        .map(|a| means.iter().map(|b| a / b).collect())
        .collect()
}
