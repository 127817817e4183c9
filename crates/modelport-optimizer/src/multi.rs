use std::path::Path;

use modelport_core::{
    InferenceLearner, ModelCompiler, ModelParams, OptimizeRequest, Optimizer, TensorFramework,
};
use tracing::{debug, info};

use crate::runner::{optimize_with_compiler, optimize_with_optimizer, ScoredLearner};
use crate::{DebugLog, HardwareCapabilities, LatencyBenchmark, Metric, OptimizerConfig};

/// Runs every usable compiler on a model and keeps the best-scoring result.
///
/// Probed compilers run first, in probe order, followed by the extra
/// optimizers in the order they were added. A backend that fails is skipped
/// with a warning; the sweep itself never fails.
pub struct MultiCompilerOptimizer {
    capabilities: HardwareCapabilities,
    compilers: Vec<ModelCompiler>,
    extra_optimizers: Vec<Box<dyn Optimizer>>,
    debug_log: Option<DebugLog>,
    benchmark: LatencyBenchmark,
}

impl Default for MultiCompilerOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiCompilerOptimizer {
    pub fn new() -> Self {
        Self::with_capabilities(HardwareCapabilities::detect())
    }

    pub fn with_capabilities(capabilities: HardwareCapabilities) -> Self {
        let compilers = capabilities.compilers();
        Self {
            capabilities,
            compilers,
            extra_optimizers: Vec::new(),
            debug_log: None,
            benchmark: LatencyBenchmark::default(),
        }
    }

    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new()
            .ignore_compilers(&config.ignore_compilers)
            .with_benchmark(config.benchmark)
            .with_debug_mode(config.debug_mode, &config.debug_dir, &config.debug_file_suffix)
    }

    pub fn ignore_compilers(mut self, ignored: &[ModelCompiler]) -> Self {
        self.compilers.retain(|compiler| !ignored.contains(compiler));
        self
    }

    pub fn with_extra_optimizer(mut self, optimizer: Box<dyn Optimizer>) -> Self {
        self.extra_optimizers.push(optimizer);
        self
    }

    pub fn with_extra_optimizers(
        mut self,
        optimizers: impl IntoIterator<Item = Box<dyn Optimizer>>,
    ) -> Self {
        self.extra_optimizers.extend(optimizers);
        self
    }

    pub fn with_debug_log(mut self, debug_log: DebugLog) -> Self {
        self.debug_log = Some(debug_log);
        self
    }

    /// When enabled, scores go to a fresh `<uuid>_<suffix>` file in `dir`.
    pub fn with_debug_mode(mut self, enabled: bool, dir: &Path, suffix: &str) -> Self {
        self.debug_log = enabled.then(|| DebugLog::unique_in(dir, suffix));
        self
    }

    pub fn with_benchmark(mut self, benchmark: LatencyBenchmark) -> Self {
        self.benchmark = benchmark;
        self
    }

    /// Probed compilers minus the ignored ones.
    pub fn compilers(&self) -> &[ModelCompiler] {
        &self.compilers
    }

    pub fn debug_log(&self) -> Option<&DebugLog> {
        self.debug_log.as_ref()
    }

    pub fn benchmark(&self) -> LatencyBenchmark {
        self.benchmark
    }

    pub fn usable(&self) -> bool {
        !self.compilers.is_empty() || !self.extra_optimizers.is_empty()
    }

    /// Best learner by mean inference latency, or `None` if every backend
    /// failed.
    pub fn optimize(
        &self,
        model_path: &Path,
        framework: TensorFramework,
        params: &ModelParams,
    ) -> Option<InferenceLearner> {
        let benchmark = self.benchmark;
        self.optimize_on_custom_metric(&benchmark, model_path, framework, params)
    }

    pub fn optimize_on_custom_metric(
        &self,
        metric: &dyn Metric,
        model_path: &Path,
        framework: TensorFramework,
        params: &ModelParams,
    ) -> Option<InferenceLearner> {
        let best = select_best(self.evaluate_all(metric, model_path, framework, params))?;
        info!(optimizer = %best.backend, score = best.score, "selected best optimizer");
        best.learner
    }

    /// Every attempt in discovery order, failures included.
    pub fn evaluate_all(
        &self,
        metric: &dyn Metric,
        model_path: &Path,
        framework: TensorFramework,
        params: &ModelParams,
    ) -> Vec<ScoredLearner> {
        let request = OptimizeRequest {
            model_path,
            framework,
            params,
        };
        info!(
            model = %model_path.display(),
            compilers = ?self.compilers,
            extra_optimizers = self.extra_optimizers.len(),
            "starting multi-compiler sweep"
        );

        let debug_log = self.debug_log.as_ref();
        let mut results = Vec::with_capacity(self.compilers.len() + self.extra_optimizers.len());
        for &compiler in &self.compilers {
            debug!(%compiler, "running compiler");
            results.push(optimize_with_compiler(
                compiler,
                &self.capabilities,
                metric,
                &request,
                debug_log,
            ));
        }
        for optimizer in &self.extra_optimizers {
            debug!(optimizer = optimizer.name(), "running extra optimizer");
            results.push(optimize_with_optimizer(
                optimizer.as_ref(),
                metric,
                &request,
                debug_log,
            ));
        }
        results
    }
}

/// Candidates ordered by ascending score; ties keep their incoming order.
pub fn rank(mut candidates: Vec<ScoredLearner>) -> Vec<ScoredLearner> {
    candidates.sort_by(|a, b| a.score.total_cmp(&b.score));
    candidates
}

/// Lowest-scoring successful candidate, if any.
pub fn select_best(candidates: Vec<ScoredLearner>) -> Option<ScoredLearner> {
    rank(candidates)
        .into_iter()
        .next()
        .filter(|best| best.learner.is_some() && best.score != f64::INFINITY)
}
