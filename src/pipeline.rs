//! # Evaluation Pipeline
//! Pure, testable orchestration that maps `(config, request)` → `Evaluation`.
//! No I/O, no shared state; safe to run concurrently on independent requests.
//!
//! Order: validate everything → normalise once → derive every requested
//! weight vector → TOPSIS per method → classify. Any failure aborts before
//! a single ranking is produced.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classify::{classify_with, BoundaryPolicy};
use crate::config::default_criteria;
use crate::error::{EvalError, EvalResult};
use crate::matrix::ScoreMatrix;
use crate::normalize::{normalize, Normalization};
use crate::report::{weight_table, Aggregate, Evaluation, MethodOutcome, RankedRow, RunSettings};
use crate::topsis::{self, DistanceMetric};
use crate::weights::{derive_weights, CriterionWeights, ManualWeights, WeightMethod};

/// What the matrix rows stand for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingUnit {
    /// Rows are experts scoring one item; the item score is the mean closeness.
    #[default]
    ExpertPanel,
    /// Rows are distinct alternatives; each closeness is its own score.
    Alternatives,
}

impl std::str::FromStr for RankingUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expert_panel" | "experts" | "panel" => Ok(Self::ExpertPanel),
            "alternatives" => Ok(Self::Alternatives),
            other => Err(format!("unknown ranking unit `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Ordered criterion names; matrix columns align with them 1:1.
    pub criteria: Vec<String>,
    /// Inclusive `(min, max)` bound on every raw score, if enforced.
    pub score_range: Option<(f64, f64)>,
    pub normalization: Normalization,
    pub distance: DistanceMetric,
    pub boundary: BoundaryPolicy,
    pub ranking_unit: RankingUnit,
    pub methods: Vec<WeightMethod>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            criteria: default_criteria(),
            score_range: Some((1.0, 10.0)),
            normalization: Normalization::default(),
            distance: DistanceMetric::default(),
            boundary: BoundaryPolicy::default(),
            ranking_unit: RankingUnit::default(),
            methods: vec![WeightMethod::Manual, WeightMethod::Entropy],
        }
    }
}

/// Immutable input of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRequest {
    pub item_name: String,
    pub scores: ScoreMatrix,
    pub manual_weights: Option<ManualWeights>,
    pub row_labels: Option<Vec<String>>,
}

impl EvaluationRequest {
    pub fn new(item_name: impl Into<String>, scores: ScoreMatrix) -> Self {
        Self {
            item_name: item_name.into(),
            scores,
            manual_weights: None,
            row_labels: None,
        }
    }

    pub fn with_manual_weights(mut self, weights: ManualWeights) -> Self {
        self.manual_weights = Some(weights);
        self
    }

    pub fn with_row_labels(mut self, labels: Vec<String>) -> Self {
        self.row_labels = Some(labels);
        self
    }
}

/// Run the whole pipeline.
pub fn evaluate(config: &PipelineConfig, request: &EvaluationRequest) -> EvalResult<Evaluation> {
    let methods = distinct_methods(&config.methods);
    validate(config, request, &methods)?;

    let scores = &request.scores;
    let normalized = normalize(scores, config.normalization);

    // All weight vectors first: a failing method must not leave partial rankings.
    let derived: Vec<(WeightMethod, CriterionWeights)> = methods
        .iter()
        .map(|&m| derive_weights(m, scores, request.manual_weights.as_ref()).map(|w| (m, w)))
        .collect::<EvalResult<_>>()?;

    let identifiers = row_identifiers(request, config.ranking_unit);

    let mut comparison = Vec::with_capacity(derived.len());
    for (method, weights) in &derived {
        let ranked = topsis::rank(&normalized, weights, config.distance)?;

        let rows = ranked
            .rows
            .iter()
            .zip(&ranked.ranks)
            .zip(&identifiers)
            .map(|((r, &rank), id)| RankedRow {
                identifier: id.clone(),
                closeness: r.closeness,
                rank,
                label: classify_with(r.closeness, config.boundary),
                distance_best: r.distance_best,
                distance_worst: r.distance_worst,
            })
            .collect();

        let aggregate = match config.ranking_unit {
            RankingUnit::ExpertPanel => {
                let score = ranked.mean_closeness();
                Some(Aggregate {
                    score,
                    label: classify_with(score, config.boundary),
                })
            }
            RankingUnit::Alternatives => None,
        };

        debug!(
            item = %request.item_name,
            %method,
            score = ?aggregate.map(|a| a.score),
            "method ranked"
        );

        comparison.push(MethodOutcome {
            method: *method,
            weights: weights.clone(),
            rows,
            aggregate,
        });
    }

    let pairs: Vec<(WeightMethod, &CriterionWeights)> =
        derived.iter().map(|(m, w)| (*m, w)).collect();
    let weight_comparison = weight_table(&config.criteria, &pairs);

    info!(
        item = %request.item_name,
        rows = scores.rows(),
        criteria = scores.cols(),
        methods = comparison.len(),
        "evaluation complete"
    );

    Ok(Evaluation {
        item_name: request.item_name.clone(),
        settings: RunSettings {
            normalization: config.normalization,
            distance: config.distance,
            boundary: config.boundary,
            ranking_unit: config.ranking_unit,
        },
        comparison,
        weight_comparison,
    })
}

/// Fail-fast checks over the whole request before any computation.
fn validate(
    config: &PipelineConfig,
    request: &EvaluationRequest,
    methods: &[WeightMethod],
) -> EvalResult<()> {
    if request.item_name.trim().is_empty() {
        return Err(EvalError::invalid("item name is empty"));
    }
    if methods.is_empty() {
        return Err(EvalError::invalid("no weighting method selected"));
    }

    let scores = &request.scores;
    if scores.cols() != config.criteria.len() {
        return Err(EvalError::invalid(format!(
            "scores cover {} criteria, expected {}",
            scores.cols(),
            config.criteria.len()
        )));
    }

    if let Some((lo, hi)) = config.score_range {
        let (min, max) = scores.bounds();
        if min < lo || max > hi {
            return Err(EvalError::invalid(format!(
                "scores must lie within [{lo}, {hi}], got [{min}, {max}]"
            )));
        }
    }

    if let Some(labels) = &request.row_labels {
        if labels.len() != scores.rows() {
            return Err(EvalError::invalid(format!(
                "{} row labels for {} rows",
                labels.len(),
                scores.rows()
            )));
        }
    }

    if methods.contains(&WeightMethod::Manual) {
        match &request.manual_weights {
            None => {
                return Err(EvalError::invalid(
                    "manual weighting requested but no expert weights supplied",
                ))
            }
            Some(w) if w.width() != scores.cols() => {
                return Err(EvalError::invalid(format!(
                    "expert weights cover {} criteria, expected {}",
                    w.width(),
                    scores.cols()
                )))
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// Keep first occurrence of each method, preserving order.
fn distinct_methods(methods: &[WeightMethod]) -> Vec<WeightMethod> {
    let mut out: Vec<WeightMethod> = Vec::with_capacity(methods.len());
    for m in methods {
        if !out.contains(m) {
            out.push(*m);
        }
    }
    out
}

fn row_identifiers(request: &EvaluationRequest, unit: RankingUnit) -> Vec<String> {
    if let Some(labels) = &request.row_labels {
        return labels.clone();
    }
    let prefix = match unit {
        RankingUnit::ExpertPanel => "expert",
        RankingUnit::Alternatives => "alternative",
    };
    (1..=request.scores.rows())
        .map(|i| format!("{prefix} {i}"))
        .collect()
}
