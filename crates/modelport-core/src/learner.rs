use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use serde_json::{Map, Value};
use tracing::warn;

use crate::{
    CompiledModel, FrameworkTensor, LearnerMetadata, ModelParams, NativeArray, RuntimeKind,
    TensorFramework,
};

/// A compiled model, invocable through one calling convention whatever
/// runtime produced it.
pub struct InferenceLearner {
    runtime: Box<dyn CompiledModel>,
    framework: TensorFramework,
    network_parameters: ModelParams,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl fmt::Debug for InferenceLearner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceLearner")
            .field("runtime", &self.runtime.kind())
            .field("framework", &self.framework)
            .field("network_parameters", &self.network_parameters)
            .field("input_names", &self.input_names)
            .field("output_names", &self.output_names)
            .finish()
    }
}

impl InferenceLearner {
    pub fn new(
        runtime: Box<dyn CompiledModel>,
        framework: TensorFramework,
        network_parameters: ModelParams,
        input_names: Vec<String>,
        output_names: Vec<String>,
    ) -> Self {
        Self {
            runtime,
            framework,
            network_parameters,
            input_names,
            output_names,
        }
    }

    pub fn runtime_kind(&self) -> RuntimeKind {
        self.runtime.kind()
    }

    pub fn runtime_options(&self) -> Map<String, Value> {
        self.runtime.runtime_options()
    }

    pub fn framework(&self) -> TensorFramework {
        self.framework
    }

    pub fn network_parameters(&self) -> &ModelParams {
        &self.network_parameters
    }

    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    /// Rewraps the same compiled handle under another calling convention.
    pub fn with_framework(mut self, framework: TensorFramework) -> Self {
        self.framework = framework;
        self
    }

    /// Runs the model on one batch.
    ///
    /// Inputs bind positionally to [`input_names`](Self::input_names). Outputs
    /// follow [`output_names`](Self::output_names); they are the model's
    /// outputs, not one output per input.
    pub fn predict<T: FrameworkTensor>(&mut self, inputs: Vec<T>) -> Result<Vec<T>> {
        ensure!(
            T::FRAMEWORK == self.framework,
            "learner exposes {} tensors, got {} tensors",
            self.framework,
            T::FRAMEWORK
        );
        let arrays = inputs
            .into_iter()
            .map(FrameworkTensor::into_native)
            .collect::<Result<Vec<_>>>()?;
        self.predict_native(arrays)?
            .into_iter()
            .map(T::from_native)
            .collect()
    }

    /// Framework-free inference on native arrays.
    pub fn predict_native(&mut self, inputs: Vec<NativeArray>) -> Result<Vec<NativeArray>> {
        ensure!(
            inputs.len() == self.input_names.len(),
            "expected {} inputs ({}), got {}",
            self.input_names.len(),
            self.input_names.join(", "),
            inputs.len()
        );
        check_same_batch(&inputs)?;

        let named = self.input_names.iter().cloned().zip(inputs).collect();
        let outputs = self.runtime.run(named, &self.output_names)?;
        ensure!(
            outputs.len() == self.output_names.len(),
            "runtime returned {} outputs, expected {}",
            outputs.len(),
            self.output_names.len()
        );
        Ok(outputs)
    }

    /// Writes the runtime artifact, then the metadata record, into `path`.
    ///
    /// A directory holding `metadata.json` always holds a complete artifact.
    pub fn save(&self, path: impl AsRef<Path>, extra: BTreeMap<String, Value>) -> Result<()> {
        let path = path.as_ref();
        let metadata = LearnerMetadata::from_learner(self, extra)?;
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create learner directory {}", path.display()))?;
        self.runtime
            .save_artifact(path)
            .with_context(|| format!("failed to save runtime artifact into {}", path.display()))?;
        metadata.save(path)
    }

    /// Rebuilds a saved learner; `open` reopens the runtime handle from its
    /// artifact path.
    ///
    /// Extra load arguments are not understood by any runtime yet. They are
    /// reported and ignored.
    pub fn load_with<F>(path: impl AsRef<Path>, extra: &BTreeMap<String, Value>, open: F) -> Result<Self>
    where
        F: FnOnce(&LearnerMetadata, &Path) -> Result<Box<dyn CompiledModel>>,
    {
        let path = path.as_ref();
        if !extra.is_empty() {
            warn!(?extra, "no extra arguments expected when loading a learner, ignoring them");
        }

        let metadata = LearnerMetadata::read(path)?;
        let artifact = path.join(metadata.runtime.artifact_file_name());
        let runtime = open(&metadata, &artifact)?;
        if runtime.kind() != metadata.runtime {
            bail!(
                "metadata declares a {:?} runtime but the opener produced {:?}",
                metadata.runtime,
                runtime.kind()
            );
        }

        let LearnerMetadata {
            framework,
            network_parameters,
            input_names,
            output_names,
            ..
        } = metadata;
        Ok(Self::new(runtime, framework, network_parameters, input_names, output_names))
    }
}

fn check_same_batch(inputs: &[NativeArray]) -> Result<()> {
    let mut batch = None;
    for input in inputs {
        let Some(&leading) = input.shape().first() else {
            continue;
        };
        match batch {
            None => batch = Some(leading),
            Some(expected) => ensure!(
                leading == expected,
                "inputs must share one batch: got leading dims {expected} and {leading}"
            ),
        }
    }
    Ok(())
}
