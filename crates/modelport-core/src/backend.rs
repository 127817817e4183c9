use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{InferenceLearner, ModelParams, NativeArray, TensorFramework};

/// Families of compiled runtime handles a learner can wrap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuntimeKind {
    OnnxRuntime,
}

impl RuntimeKind {
    /// File the handle's serialized form is stored under inside a learner directory.
    pub fn artifact_file_name(self) -> &'static str {
        match self {
            RuntimeKind::OnnxRuntime => "model.onnx",
        }
    }
}

/// Everything a backend needs to compile one model.
#[derive(Clone, Copy, Debug)]
pub struct OptimizeRequest<'a> {
    /// Model in the intermediate exchange format (ONNX).
    pub model_path: &'a Path,
    pub framework: TensorFramework,
    pub params: &'a ModelParams,
}

/// A compiler backend. Failures are opaque to the caller.
pub trait Optimizer: Send + Sync {
    /// Stable name, used as the key in debug logs.
    fn name(&self) -> &str;

    fn optimize(&self, request: &OptimizeRequest<'_>) -> Result<InferenceLearner>;
}

/// Compiled runtime wrapped by an [`InferenceLearner`].
pub trait CompiledModel: Send + 'static {
    fn kind(&self) -> RuntimeKind;

    /// Inputs are zipped with the learner's input names; outputs come back in
    /// the order of `output_names`.
    fn run(
        &mut self,
        inputs: Vec<(String, NativeArray)>,
        output_names: &[String],
    ) -> Result<Vec<NativeArray>>;

    /// Writes the handle's artifact into `dir` under [`RuntimeKind::artifact_file_name`].
    fn save_artifact(&self, dir: &Path) -> Result<()>;

    /// Settings needed to reopen the handle, persisted next to the artifact.
    fn runtime_options(&self) -> Map<String, Value> {
        Map::new()
    }
}
