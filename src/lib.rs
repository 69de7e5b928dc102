// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod history;
pub mod matrix;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod topsis;
pub mod weights;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::classify::{classify, classify_with, BoundaryPolicy, Label};
pub use crate::error::{EvalError, EvalResult};
pub use crate::matrix::ScoreMatrix;
pub use crate::pipeline::{evaluate, EvaluationRequest, PipelineConfig, RankingUnit};
pub use crate::report::Evaluation;
pub use crate::weights::{CriterionWeights, ManualWeights, WeightMethod};
