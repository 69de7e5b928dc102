// src/config/evaluator.rs
//! Evaluator configuration (TOML).
//!
//! Resolution order:
//! 1) $EVALUATOR_CONFIG_PATH (must exist)
//! 2) config/evaluator.toml
//! 3) built-in defaults
//!
//! Then env overrides: EVALUATOR_BOUNDARY, EVALUATOR_RESULT_LOG, EVALUATOR_ADDR.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::classify::BoundaryPolicy;
use crate::normalize::Normalization;
use crate::pipeline::{PipelineConfig, RankingUnit};
use crate::topsis::DistanceMetric;
use crate::weights::WeightMethod;

pub const DEFAULT_CONFIG_PATH: &str = "config/evaluator.toml";

pub const ENV_CONFIG_PATH: &str = "EVALUATOR_CONFIG_PATH";
pub const ENV_BOUNDARY: &str = "EVALUATOR_BOUNDARY";
pub const ENV_RESULT_LOG: &str = "EVALUATOR_RESULT_LOG";
pub const ENV_ADDR: &str = "EVALUATOR_ADDR";

const MAX_HISTORY_CAPACITY: usize = 10_000;

/// The nine lecture-quality criteria used by the evaluation forms.
pub fn default_criteria() -> Vec<String> {
    [
        "Real-world inquiry and knowledge construction",
        "Promotes active learning and authentic assessment",
        "Engages students through motivation and challenge",
        "Provides tools that raise learning productivity",
        "Provides tools that support higher-order thinking",
        "Increases learner independence",
        "Strengthens cooperation and collaboration",
        "Curriculum designed around the learner",
        "Compensates for physical impairments",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub criteria: CriteriaSection,
    pub scores: ScoresSection,
    pub pipeline: PipelineSection,
    pub history: HistorySection,
    pub server: ServerSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriteriaSection {
    pub names: Vec<String>,
}

impl Default for CriteriaSection {
    fn default() -> Self {
        Self {
            names: default_criteria(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoresSection {
    pub min: f64,
    pub max: f64,
    /// When false, any non-negative score is accepted.
    pub enforce_range: bool,
}

impl Default for ScoresSection {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: 10.0,
            enforce_range: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    pub normalization: Normalization,
    pub distance: DistanceMetric,
    pub boundary: BoundaryPolicy,
    pub ranking_unit: RankingUnit,
    pub methods: Vec<WeightMethod>,
}

impl Default for PipelineSection {
    fn default() -> Self {
        let base = PipelineConfig::default();
        Self {
            normalization: base.normalization,
            distance: base.distance,
            boundary: base.boundary,
            ranking_unit: base.ranking_unit,
            methods: base.methods,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySection {
    /// Append-only result log (JSON Lines).
    pub log_path: PathBuf,
    /// In-memory recent-history ring size.
    pub capacity: usize,
    /// Hot-reloaded default expert weights.
    pub default_weights_path: PathBuf,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("data/results.jsonl"),
            capacity: 500,
            default_weights_path: PathBuf::from(crate::weights::hot_reload::DEFAULT_WEIGHTS_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub addr: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8000".to_string(),
        }
    }
}

impl EvaluatorConfig {
    /// Resolve, parse and sanitise; env overrides applied last.
    pub fn load() -> Result<Self> {
        let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let path = PathBuf::from(p);
                if !path.exists() {
                    return Err(anyhow!(
                        "{ENV_CONFIG_PATH} points to non-existent path {}",
                        path.display()
                    ));
                }
                Self::load_from(&path)?
            }
            Err(_) => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::load_from(&path)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading evaluator config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing evaluator config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: Self = toml::from_str(s)?;
        cfg.sanitize()?;
        Ok(cfg)
    }

    fn sanitize(&mut self) -> Result<()> {
        let names: Vec<String> = self
            .criteria
            .names
            .iter()
            .map(|n| n.trim().to_string())
            .collect();
        if names.is_empty() {
            bail!("criteria.names must list at least one criterion");
        }
        if let Some(pos) = names.iter().position(String::is_empty) {
            bail!("criteria.names[{pos}] is blank");
        }
        self.criteria.names = names;

        if !self.scores.min.is_finite() || !self.scores.max.is_finite() {
            let d = ScoresSection::default();
            self.scores.min = d.min;
            self.scores.max = d.max;
        }
        if self.scores.min > self.scores.max {
            // swap to keep a valid interval
            std::mem::swap(&mut self.scores.min, &mut self.scores.max);
        }
        if self.scores.min < 0.0 {
            bail!("scores.min must not be negative");
        }

        self.history.capacity = self.history.capacity.clamp(1, MAX_HISTORY_CAPACITY);

        if self.pipeline.methods.is_empty() {
            self.pipeline.methods = PipelineSection::default().methods;
        }
        Ok(())
    }

    /// Env overrides; unparsable values are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var(ENV_BOUNDARY) {
            match raw.parse::<BoundaryPolicy>() {
                Ok(b) => self.pipeline.boundary = b,
                Err(e) => warn!(var = ENV_BOUNDARY, error = %e, "ignoring override"),
            }
        }
        if let Ok(raw) = std::env::var(ENV_RESULT_LOG) {
            let raw = raw.trim();
            if raw.is_empty() {
                warn!(var = ENV_RESULT_LOG, "ignoring empty override");
            } else {
                self.history.log_path = PathBuf::from(raw);
            }
        }
        if let Ok(raw) = std::env::var(ENV_ADDR) {
            match raw.trim().parse::<std::net::SocketAddr>() {
                Ok(_) => self.server.addr = raw.trim().to_string(),
                Err(e) => warn!(var = ENV_ADDR, error = %e, "ignoring override"),
            }
        }
    }

    pub fn score_range(&self) -> Option<(f64, f64)> {
        self.scores
            .enforce_range
            .then_some((self.scores.min, self.scores.max))
    }

    /// Pipeline settings for one run with the configured defaults.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            criteria: self.criteria.names.clone(),
            score_range: self.score_range(),
            normalization: self.pipeline.normalization,
            distance: self.pipeline.distance,
            boundary: self.pipeline.boundary,
            ranking_unit: self.pipeline.ranking_unit,
            methods: self.pipeline.methods.clone(),
        }
    }
}
