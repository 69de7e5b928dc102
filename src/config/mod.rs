//! Runtime configuration.

pub mod evaluator;

pub use evaluator::{
    default_criteria, CriteriaSection, EvaluatorConfig, HistorySection, PipelineSection,
    ScoresSection, ServerSection, DEFAULT_CONFIG_PATH, ENV_ADDR, ENV_BOUNDARY, ENV_CONFIG_PATH,
    ENV_RESULT_LOG,
};
