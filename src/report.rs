//! Output shapes of one evaluation run.
//!
//! This is the JSON the API returns and what the result log is built from:
//! a comparison table (method → score, label, per-row ranking) plus a
//! weight-comparison table (criterion → weight per method).

use serde::Serialize;
use std::collections::BTreeMap;

use crate::classify::{BoundaryPolicy, Label};
use crate::normalize::Normalization;
use crate::pipeline::RankingUnit;
use crate::topsis::DistanceMetric;
use crate::weights::{CriterionWeights, WeightMethod};

/// One ranked row (an expert's view of the item, or one alternative).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    pub identifier: String,
    pub closeness: f64,
    /// Competition rank, 1 = best; ties share the best rank.
    pub rank: usize,
    pub label: Label,
    pub distance_best: f64,
    pub distance_worst: f64,
}

/// Single score for the evaluated item: mean closeness across expert rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aggregate {
    pub score: f64,
    pub label: Label,
}

/// Everything one weighting method produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodOutcome {
    pub method: WeightMethod,
    pub weights: CriterionWeights,
    pub rows: Vec<RankedRow>,
    /// Present when rows are experts rating one item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<Aggregate>,
}

impl MethodOutcome {
    /// Rows ordered best first (stable for ties).
    pub fn leaderboard(&self) -> Vec<&RankedRow> {
        let mut rows: Vec<&RankedRow> = self.rows.iter().collect();
        rows.sort_by_key(|r| r.rank);
        rows
    }
}

/// Criterion name with its weight under every method that ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightRow {
    pub criterion: String,
    pub weights: BTreeMap<WeightMethod, f64>,
}

/// Settings the run actually used, echoed back for traceability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSettings {
    pub normalization: Normalization,
    pub distance: DistanceMetric,
    pub boundary: BoundaryPolicy,
    pub ranking_unit: RankingUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub item_name: String,
    pub settings: RunSettings,
    pub comparison: Vec<MethodOutcome>,
    pub weight_comparison: Vec<WeightRow>,
}

impl Evaluation {
    pub fn outcome(&self, method: WeightMethod) -> Option<&MethodOutcome> {
        self.comparison.iter().find(|o| o.method == method)
    }

    /// Aggregate score per method, in run order (empty for alternative rankings).
    pub fn scores(&self) -> Vec<(WeightMethod, f64, Label)> {
        self.comparison
            .iter()
            .filter_map(|o| o.aggregate.map(|a| (o.method, a.score, a.label)))
            .collect()
    }
}

/// Build the weight-comparison table from `(method, weights)` pairs.
pub fn weight_table(criteria: &[String], per_method: &[(WeightMethod, &CriterionWeights)]) -> Vec<WeightRow> {
    criteria
        .iter()
        .enumerate()
        .map(|(j, name)| WeightRow {
            criterion: name.clone(),
            weights: per_method
                .iter()
                .filter_map(|(m, w)| w.get(j).map(|v| (*m, v)))
                .collect(),
        })
        .collect()
}
