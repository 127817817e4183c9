use anyhow::{ensure, Context, Result};
use modelport_core::{InferenceLearner, ModelCompiler, OptimizeRequest, Optimizer};
use tracing::{info, warn};

use crate::{registry, DebugLog, HardwareCapabilities, Metric};

/// Outcome of one backend attempt. A failed attempt has no learner and an
/// infinite score.
#[derive(Debug)]
pub struct ScoredLearner {
    pub backend: String,
    pub learner: Option<InferenceLearner>,
    pub score: f64,
}

impl ScoredLearner {
    pub fn failed(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            learner: None,
            score: f64::INFINITY,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.learner.is_none()
    }
}

pub fn optimize_with_compiler(
    compiler: ModelCompiler,
    capabilities: &HardwareCapabilities,
    metric: &dyn Metric,
    request: &OptimizeRequest<'_>,
    debug_log: Option<&DebugLog>,
) -> ScoredLearner {
    let optimizer = registry::optimizer_for(compiler, capabilities);
    optimize_with_optimizer(optimizer.as_ref(), metric, request, debug_log)
}

/// Compiles and scores with one optimizer. Never fails: any error becomes a
/// warning and an infinite score.
pub fn optimize_with_optimizer(
    optimizer: &dyn Optimizer,
    metric: &dyn Metric,
    request: &OptimizeRequest<'_>,
    debug_log: Option<&DebugLog>,
) -> ScoredLearner {
    let name = optimizer.name().to_string();
    let scored = match compile_and_score(optimizer, metric, request) {
        Ok((learner, score)) => {
            info!(optimizer = %name, score, "optimizer finished");
            ScoredLearner {
                backend: name,
                learner: Some(learner),
                score,
            }
        }
        Err(err) => {
            let reason = format!("{err:#}");
            warn!(optimizer = %name, error = %reason, "compilation failed, skipping optimizer");
            ScoredLearner::failed(name)
        }
    };

    if let Some(log) = debug_log {
        if let Err(err) = log.record(&scored.backend, scored.score) {
            warn!(path = %log.path().display(), error = %err, "failed to update debug log");
        }
    }
    scored
}

fn compile_and_score(
    optimizer: &dyn Optimizer,
    metric: &dyn Metric,
    request: &OptimizeRequest<'_>,
) -> Result<(InferenceLearner, f64)> {
    let mut learner = optimizer.optimize(request)?;
    let score = metric
        .score(&mut learner)
        .context("failed to score optimized model")?;
    ensure!(!score.is_nan(), "metric returned NaN");
    ensure!(score >= 0.0, "metric returned {score}, scores must be non-negative");
    // -0.0 passes the check above; `abs` folds it into 0.0 so zero scores tie.
    Ok((learner, score.abs()))
}
