//! In-process optimizers whose "compiled model" reports a fixed score.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{bail, ensure, Context, Result};
use modelport_core::{
    CompiledModel, DType, InferenceLearner, ModelCompiler, ModelParams, NativeArray, OptimizeRequest,
    Optimizer, RuntimeKind,
};
use modelport_optimizer::{HardwareCapabilities, MultiCompilerOptimizer};
use ndarray::{ArrayD, IxDyn};

/// Emits `score` and `id` for every batch row, after sleeping for `delay`.
/// Rejects inputs whose element type is not `input_dtype`.
struct ConstantModel {
    score: f32,
    id: f32,
    delay: Duration,
    input_dtype: DType,
}

impl CompiledModel for ConstantModel {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::OnnxRuntime
    }

    fn run(
        &mut self,
        inputs: Vec<(String, NativeArray)>,
        output_names: &[String],
    ) -> Result<Vec<NativeArray>> {
        for (name, array) in &inputs {
            ensure!(
                array.dtype() == self.input_dtype,
                "input {name} is {:?}, model takes {:?}",
                array.dtype(),
                self.input_dtype
            );
        }
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        let rows = inputs
            .first()
            .and_then(|(_, array)| array.shape().first().copied())
            .unwrap_or(1);
        output_names
            .iter()
            .map(|name| {
                let value = match name.as_str() {
                    "score" => self.score,
                    "id" => self.id,
                    other => bail!("unknown output {other}"),
                };
                Ok(NativeArray::F32(ArrayD::from_elem(IxDyn(&[rows, 1]), value)))
            })
            .collect()
    }

    fn save_artifact(&self, dir: &Path) -> Result<()> {
        fs::write(
            dir.join(RuntimeKind::OnnxRuntime.artifact_file_name()),
            format!("{} {}", self.score, self.id),
        )?;
        Ok(())
    }
}

enum Behavior {
    Score(f32),
    Sleep(Duration),
    Fail,
}

pub struct MockOptimizer {
    name: String,
    id: f32,
    input_dtype: DType,
    behavior: Behavior,
}

impl MockOptimizer {
    pub fn scoring(name: &str, id: f32, score: f32) -> Box<dyn Optimizer> {
        Self::boxed(name, id, Behavior::Score(score))
    }

    pub fn sleeping(name: &str, id: f32, delay: Duration) -> Box<dyn Optimizer> {
        Self::boxed(name, id, Behavior::Sleep(delay))
    }

    pub fn failing(name: &str) -> Box<dyn Optimizer> {
        Self::boxed(name, -1.0, Behavior::Fail)
    }

    /// Scores `score`, but only accepts inputs of `input_dtype`.
    pub fn typed(name: &str, id: f32, score: f32, input_dtype: DType) -> Box<dyn Optimizer> {
        Box::new(Self {
            name: name.to_string(),
            id,
            input_dtype,
            behavior: Behavior::Score(score),
        })
    }

    fn boxed(name: &str, id: f32, behavior: Behavior) -> Box<dyn Optimizer> {
        Box::new(Self {
            name: name.to_string(),
            id,
            input_dtype: DType::F32,
            behavior,
        })
    }
}

impl Optimizer for MockOptimizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn optimize(&self, request: &OptimizeRequest<'_>) -> Result<InferenceLearner> {
        let model = match self.behavior {
            Behavior::Fail => bail!("{} cannot compile {}", self.name, request.model_path.display()),
            Behavior::Score(score) => ConstantModel {
                score,
                id: self.id,
                delay: Duration::ZERO,
                input_dtype: self.input_dtype,
            },
            Behavior::Sleep(delay) => ConstantModel {
                score: 0.0,
                id: self.id,
                delay,
                input_dtype: self.input_dtype,
            },
        };
        Ok(InferenceLearner::new(
            Box::new(model),
            request.framework,
            request.params.clone(),
            vec!["x".to_string()],
            vec!["score".to_string(), "id".to_string()],
        ))
    }
}

pub fn params() -> ModelParams {
    ModelParams::new(1, vec![vec![4]], vec![vec![1], vec![1]])
}

/// True for learners produced by [`MockOptimizer`].
pub fn is_mock(learner: &InferenceLearner) -> bool {
    learner.output_names() == ["score".to_string(), "id".to_string()]
}

/// Metric that trusts the score a mock learner reports.
pub fn reported_score(learner: &mut InferenceLearner) -> Result<f64> {
    let outputs = learner.predict_native(learner.network_parameters().random_inputs()?)?;
    Ok(f64::from(first_value(&outputs[0])?))
}

pub fn learner_id(learner: &mut InferenceLearner) -> Result<f32> {
    let outputs = learner.predict_native(learner.network_parameters().random_inputs()?)?;
    first_value(&outputs[1])
}

fn first_value(array: &NativeArray) -> Result<f32> {
    match array {
        NativeArray::F32(values) => values.iter().next().copied().context("empty output"),
        other => bail!("expected f32 output, got {:?}", other.dtype()),
    }
}

/// A sweep with every probed compiler ignored, so only extras run.
pub fn extras_only() -> MultiCompilerOptimizer {
    MultiCompilerOptimizer::with_capabilities(HardwareCapabilities::default())
        .ignore_compilers(&ModelCompiler::ALL)
}
