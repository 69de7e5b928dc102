//! Criterion weight derivation.
//!
//! Three independent sources, all ending in a `CriterionWeights` vector whose
//! entries are non-negative and sum to 1:
//! - `manual`: expert-entered weights (one vector or one per expert),
//!   column-averaged over experts and divided by their total;
//! - `pairwise_average`: mean-score ratio matrix, see [`pairwise`];
//! - `entropy`: Shannon diversity of raw score proportions, see [`entropy`].

pub mod entropy;
pub mod hot_reload;
pub mod pairwise;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EvalError, EvalResult};
use crate::matrix::ScoreMatrix;

pub use entropy::entropy_weights;
pub use hot_reload::{load_weights_file, HotReloadWeights};
pub use pairwise::pairwise_average_weights;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightMethod {
    /// Expert-supplied weights (labelled "AHP" in the evaluation forms).
    #[serde(alias = "expert", alias = "ahp")]
    Manual,
    /// Simplified AHP: ratios of criterion mean scores, no consistency check.
    PairwiseAverage,
    Entropy,
}

impl WeightMethod {
    pub const ALL: [WeightMethod; 3] = [Self::Manual, Self::PairwiseAverage, Self::Entropy];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::PairwiseAverage => "pairwise_average",
            Self::Entropy => "entropy",
        }
    }
}

impl fmt::Display for WeightMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WeightMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" | "expert" | "ahp" => Ok(Self::Manual),
            "pairwise_average" | "pairwise" => Ok(Self::PairwiseAverage),
            "entropy" => Ok(Self::Entropy),
            other => Err(format!("unknown weighting method `{other}`")),
        }
    }
}

/// Normalised weight vector: entries in `[0, 1]`, summing to 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CriterionWeights(Vec<f64>);

impl CriterionWeights {
    /// Divide raw non-negative weights by their total.
    pub fn from_raw(raw: Vec<f64>) -> EvalResult<Self> {
        if raw.is_empty() {
            return Err(EvalError::invalid("weight vector is empty"));
        }
        if let Some(pos) = raw.iter().position(|w| !w.is_finite() || *w < 0.0) {
            return Err(EvalError::invalid(format!(
                "weight for criterion {} must be a finite non-negative number",
                pos + 1
            )));
        }
        // Rescale by the largest entry first so the total cannot overflow.
        let max = raw.iter().copied().fold(0.0, f64::max);
        if max == 0.0 {
            return Err(EvalError::ZeroWeightSum);
        }
        let scaled: Vec<f64> = raw.into_iter().map(|w| w / max).collect();
        let total: f64 = scaled.iter().sum();
        Ok(Self(scaled.into_iter().map(|w| w / total).collect()))
    }

    /// `1/n` for every criterion.
    pub(crate) fn uniform(n: usize) -> Self {
        let w = 1.0 / n.max(1) as f64;
        Self(vec![w; n])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<f64> {
        self.0.get(idx).copied()
    }
}

/// Expert-entered weights: one row per expert, one column per criterion.
/// A single vector is a panel of one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ManualWeightsRepr", into = "Vec<Vec<f64>>")]
pub struct ManualWeights {
    panel: Vec<Vec<f64>>,
}

/// Accepted wire shapes for expert weights.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ManualWeightsRepr {
    Single(Vec<f64>),
    Panel(Vec<Vec<f64>>),
}

impl ManualWeights {
    pub fn single(weights: Vec<f64>) -> EvalResult<Self> {
        Self::panel(vec![weights])
    }

    pub fn panel(panel: Vec<Vec<f64>>) -> EvalResult<Self> {
        let width = panel.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(EvalError::invalid("manual weights are empty"));
        }
        for (i, row) in panel.iter().enumerate() {
            if row.len() != width {
                return Err(EvalError::invalid(format!(
                    "expert {} supplied {} weights, expected {}",
                    i + 1,
                    row.len(),
                    width
                )));
            }
            if row.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(EvalError::invalid(format!(
                    "expert {} supplied a negative or non-finite weight",
                    i + 1
                )));
            }
        }
        Ok(Self { panel })
    }

    /// Number of criteria covered.
    pub fn width(&self) -> usize {
        self.panel.first().map_or(0, Vec::len)
    }

    pub fn experts(&self) -> usize {
        self.panel.len()
    }

    /// Per-criterion mean across experts (before normalisation).
    pub fn column_means(&self) -> Vec<f64> {
        let n = self.panel.len() as f64;
        (0..self.width())
            .map(|j| self.panel.iter().filter_map(|r| r.get(j)).map(|w| w / n).sum::<f64>())
            .collect()
    }
}

impl TryFrom<ManualWeightsRepr> for ManualWeights {
    type Error = EvalError;

    fn try_from(repr: ManualWeightsRepr) -> Result<Self, Self::Error> {
        match repr {
            ManualWeightsRepr::Single(v) => Self::single(v),
            ManualWeightsRepr::Panel(p) => Self::panel(p),
        }
    }
}

impl From<ManualWeights> for Vec<Vec<f64>> {
    fn from(w: ManualWeights) -> Self {
        w.panel
    }
}

/// Expert weights averaged over the panel, then normalised to sum 1.
pub fn manual_weights(manual: &ManualWeights) -> EvalResult<CriterionWeights> {
    CriterionWeights::from_raw(manual.column_means())
}

/// Derive one weight vector for `scores` with `method`.
///
/// `manual` is only consulted for `WeightMethod::Manual` and must then cover
/// exactly `scores.cols()` criteria.
pub fn derive_weights(
    method: WeightMethod,
    scores: &ScoreMatrix,
    manual: Option<&ManualWeights>,
) -> EvalResult<CriterionWeights> {
    match method {
        WeightMethod::Manual => {
            let manual = manual.ok_or_else(|| {
                EvalError::invalid("manual weighting requested but no expert weights supplied")
            })?;
            if manual.width() != scores.cols() {
                return Err(EvalError::invalid(format!(
                    "expert weights cover {} criteria, scores cover {}",
                    manual.width(),
                    scores.cols()
                )));
            }
            manual_weights(manual)
        }
        WeightMethod::PairwiseAverage => pairwise_average_weights(scores),
        WeightMethod::Entropy => Ok(entropy_weights(scores)),
    }
}

#[cfg(test)]
pub(crate) fn assert_unit_sum(w: &CriterionWeights) {
    let total: f64 = w.as_slice().iter().sum();
    assert!((total - 1.0).abs() < 1e-6, "weights sum to {total}");
    assert!(w.as_slice().iter().all(|v| *v >= 0.0), "negative weight in {w:?}");
}
