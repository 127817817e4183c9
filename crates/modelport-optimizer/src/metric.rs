use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use modelport_core::InferenceLearner;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Scores a compiled learner; lower is better.
pub trait Metric {
    fn score(&self, learner: &mut InferenceLearner) -> Result<f64>;
}

impl<F> Metric for F
where
    F: Fn(&mut InferenceLearner) -> Result<f64>,
{
    fn score(&self, learner: &mut InferenceLearner) -> Result<f64> {
        self(learner)
    }
}

/// Mean wall-clock latency of one inference on a random batch, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyBenchmark {
    pub warmup_runs: usize,
    pub runs: usize,
}

impl Default for LatencyBenchmark {
    fn default() -> Self {
        Self {
            warmup_runs: 10,
            runs: 100,
        }
    }
}

impl LatencyBenchmark {
    pub fn new(warmup_runs: usize, runs: usize) -> Self {
        Self {
            warmup_runs,
            runs: runs.max(1),
        }
    }
}

impl Metric for LatencyBenchmark {
    fn score(&self, learner: &mut InferenceLearner) -> Result<f64> {
        let inputs = learner
            .network_parameters()
            .random_inputs()
            .context("failed to build benchmark inputs")?;

        for _ in 0..self.warmup_runs {
            learner.predict_native(inputs.clone())?;
        }

        let runs = self.runs.max(1);
        let mut total = Duration::ZERO;
        for _ in 0..runs {
            let batch = inputs.clone();
            let start = Instant::now();
            learner.predict_native(batch)?;
            total += start.elapsed();
        }

        let mean = total.as_secs_f64() / runs as f64;
        debug!(
            warmup_runs = self.warmup_runs,
            runs,
            mean_latency_s = mean,
            "benchmark finished"
        );
        Ok(mean)
    }
}
