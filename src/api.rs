use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::classify::BoundaryPolicy;
use crate::config::EvaluatorConfig;
use crate::error::EvalError;
use crate::history::{History, ResultLog, ResultRecord};
use crate::matrix::ScoreMatrix;
use crate::metrics;
use crate::normalize::Normalization;
use crate::pipeline::{self, EvaluationRequest, PipelineConfig, RankingUnit};
use crate::report::Evaluation;
use crate::topsis::DistanceMetric;
use crate::weights::{HotReloadWeights, ManualWeights, ManualWeightsRepr, WeightMethod};

const DEFAULT_HISTORY_N: usize = 10;

#[derive(Clone)]
pub struct AppState {
    config: Arc<EvaluatorConfig>,
    history: Arc<History>,
    log: Arc<ResultLog>,
    default_weights: Arc<HotReloadWeights>,
}

impl AppState {
    pub fn new(config: EvaluatorConfig) -> Self {
        let history = History::with_capacity(config.history.capacity);
        let log = ResultLog::new(config.history.log_path.clone());
        let default_weights = HotReloadWeights::new(Some(&config.history.default_weights_path));
        Self {
            config: Arc::new(config),
            history: Arc::new(history),
            log: Arc::new(log),
            default_weights: Arc::new(default_weights),
        }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    pub fn result_log(&self) -> &ResultLog {
        &self.log
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/criteria", get(criteria))
        .route("/evaluate", post(evaluate))
        .route("/history", get(history))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Failures surfaced to HTTP clients as `{ "error": kind, "message": .. }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("result log write failed: {0}")]
    ResultLog(#[from] std::io::Error),
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Eval(e) => e.kind(),
            Self::ResultLog(_) => "result_log",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Eval(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ResultLog(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ScoreRange {
    min: f64,
    max: f64,
}

#[derive(Serialize)]
struct CriteriaOut {
    criteria: Vec<String>,
    score_range: Option<ScoreRange>,
    methods: Vec<WeightMethod>,
}

async fn criteria(State(state): State<AppState>) -> Json<CriteriaOut> {
    let cfg = &state.config;
    Json(CriteriaOut {
        criteria: cfg.criteria.names.clone(),
        score_range: cfg.score_range().map(|(min, max)| ScoreRange { min, max }),
        methods: cfg.pipeline.methods.clone(),
    })
}

/// Raw request body; matrices and weights are validated in the handler so
/// their failures come back as structured errors.
#[derive(Deserialize)]
struct EvaluateBody {
    item_name: String,
    scores: Vec<Vec<f64>>,
    #[serde(default)]
    manual_weights: Option<ManualWeightsRepr>,
    #[serde(default)]
    row_labels: Option<Vec<String>>,
    #[serde(default)]
    methods: Option<Vec<WeightMethod>>,
    #[serde(default)]
    normalization: Option<Normalization>,
    #[serde(default)]
    distance: Option<DistanceMetric>,
    #[serde(default)]
    boundary: Option<BoundaryPolicy>,
    #[serde(default)]
    ranking_unit: Option<RankingUnit>,
}

impl EvaluateBody {
    fn pipeline_config(&self, base: PipelineConfig) -> PipelineConfig {
        PipelineConfig {
            methods: self.methods.clone().unwrap_or(base.methods),
            normalization: self.normalization.unwrap_or(base.normalization),
            distance: self.distance.unwrap_or(base.distance),
            boundary: self.boundary.unwrap_or(base.boundary),
            ranking_unit: self.ranking_unit.unwrap_or(base.ranking_unit),
            ..base
        }
    }
}

async fn evaluate(
    State(state): State<AppState>,
    Json(body): Json<EvaluateBody>,
) -> Result<Json<Evaluation>, ApiError> {
    let started = Instant::now();
    let result = run_evaluation(&state, body);
    metrics::record_duration_ms(started.elapsed().as_secs_f64() * 1000.0);

    let ev = result.map_err(|e| {
        warn!(kind = e.kind(), error = %e, "evaluation rejected");
        metrics::record_failure(e.kind());
        ApiError::from(e)
    })?;
    for o in &ev.comparison {
        metrics::record_evaluation(o.method);
    }

    let records = ResultRecord::from_evaluation(&ev, Utc::now());
    // History only shows rows that made it to disk.
    state.log.append(&records).map_err(|e| {
        warn!(path = %state.log.path().display(), error = %e, "result log append failed");
        metrics::record_failure("result_log");
        ApiError::from(e)
    })?;
    state.history.push(&records);

    info!(item = %ev.item_name, records = records.len(), "evaluation recorded");
    Ok(Json(ev))
}

fn run_evaluation(state: &AppState, body: EvaluateBody) -> Result<Evaluation, EvalError> {
    let config = body.pipeline_config(state.config.pipeline_config());

    let manual = match body.manual_weights {
        Some(repr) => Some(ManualWeights::try_from(repr)?),
        // fall back to the file-configured panel only when it is needed
        None if config.methods.contains(&WeightMethod::Manual) => state.default_weights.current(),
        None => None,
    };

    let mut request = EvaluationRequest::new(body.item_name, ScoreMatrix::from_rows(body.scores)?);
    if let Some(w) = manual {
        request = request.with_manual_weights(w);
    }
    if let Some(labels) = body.row_labels {
        request = request.with_row_labels(labels);
    }

    pipeline::evaluate(&config, &request)
}

#[derive(Deserialize)]
struct HistoryQuery {
    n: Option<usize>,
}

async fn history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Json<Vec<ResultRecord>> {
    Json(state.history.snapshot_last_n(q.n.unwrap_or(DEFAULT_HISTORY_N)))
}
