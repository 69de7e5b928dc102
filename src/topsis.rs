//! # TOPSIS ranking
//! Distance of every weighted row to the ideal-best and ideal-worst profiles,
//! folded into a closeness index in `[0, 1]` (higher is closer to ideal-best).
//!
//! All criteria are benefit criteria: the best profile takes the column
//! maximum, the worst profile the column minimum.

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};
use crate::matrix::NormalizedMatrix;
use crate::normalize::STABILIZER;
use crate::weights::CriterionWeights;

/// Closeness of a row that coincides with both ideal profiles.
pub const NEUTRAL_CLOSENESS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    /// L1 distance; offered as an alternative to the Euclidean default.
    Manhattan,
}

impl DistanceMetric {
    fn distance(self, a: &[f64], b: &[f64]) -> f64 {
        let diffs = a.iter().zip(b).map(|(x, y)| x - y);
        match self {
            Self::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            Self::Manhattan => diffs.map(f64::abs).sum(),
        }
    }
}

impl std::str::FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(Self::Euclidean),
            "manhattan" | "l1" => Ok(Self::Manhattan),
            other => Err(format!("unknown distance metric `{other}`")),
        }
    }
}

/// Per-row distances and closeness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RowScore {
    pub distance_best: f64,
    pub distance_worst: f64,
    pub closeness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopsisOutcome {
    pub rows: Vec<RowScore>,
    /// 1-based competition ranks ("min" method), aligned with `rows`.
    pub ranks: Vec<usize>,
    pub ideal_best: Vec<f64>,
    pub ideal_worst: Vec<f64>,
}

impl TopsisOutcome {
    pub fn closeness(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|r| r.closeness)
    }

    /// Arithmetic mean of closeness over all rows; the single score of an
    /// item rated by an expert panel.
    pub fn mean_closeness(&self) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        self.closeness().sum::<f64>() / self.rows.len() as f64
    }
}

/// Weight `matrix` column-wise and score every row.
pub fn rank(
    matrix: &NormalizedMatrix,
    weights: &CriterionWeights,
    metric: DistanceMetric,
) -> EvalResult<TopsisOutcome> {
    if weights.len() != matrix.cols() {
        return Err(EvalError::invalid(format!(
            "{} weights for {} criteria",
            weights.len(),
            matrix.cols()
        )));
    }

    let weighted: Vec<Vec<f64>> = matrix
        .row_iter()
        .map(|row| {
            row.iter()
                .zip(weights.as_slice())
                .map(|(r, w)| r * w)
                .collect()
        })
        .collect();

    let cols = matrix.cols();
    let column = |j: usize| weighted.iter().filter_map(move |r| r.get(j).copied());
    let ideal_best: Vec<f64> = (0..cols)
        .map(|j| column(j).fold(f64::NEG_INFINITY, f64::max))
        .collect();
    let ideal_worst: Vec<f64> = (0..cols)
        .map(|j| column(j).fold(f64::INFINITY, f64::min))
        .collect();

    let rows: Vec<RowScore> = weighted
        .iter()
        .map(|v| {
            let distance_best = metric.distance(v, &ideal_best);
            let distance_worst = metric.distance(v, &ideal_worst);
            RowScore {
                distance_best,
                distance_worst,
                closeness: closeness(distance_best, distance_worst),
            }
        })
        .collect();

    let ranks = min_ranks(&rows.iter().map(|r| r.closeness).collect::<Vec<_>>());

    Ok(TopsisOutcome {
        rows,
        ranks,
        ideal_best,
        ideal_worst,
    })
}

/// `d⁻ / (d⁺ + d⁻ + ε)`. A row sitting on both ideals at once (every row
/// equal on every criterion) has no direction and gets `NEUTRAL_CLOSENESS`.
pub fn closeness(distance_best: f64, distance_worst: f64) -> f64 {
    let span = distance_best + distance_worst;
    if span <= STABILIZER {
        return NEUTRAL_CLOSENESS;
    }
    (distance_worst / (span + STABILIZER)).clamp(0.0, 1.0)
}

/// Descending competition ranking: rank = 1 + number of strictly better
/// values. Ties share the best rank and the next value skips the tied count
/// (`[0.9, 0.7, 0.7, 0.2]` → `[1, 2, 2, 4]`).
pub fn min_ranks(values: &[f64]) -> Vec<usize> {
    values
        .iter()
        .map(|v| 1 + values.iter().filter(|o| *o > v).count())
        .collect()
}
