mod convert;
mod optimizer;
mod session;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use modelport_core::{CompiledModel, LearnerMetadata, NativeArray, RuntimeKind};
use ort::session::{Session, SessionInputValue};
use serde_json::{Map, Value};

pub use optimizer::*;
pub use session::{ExecutionTarget, OrtSessionConfig};

/// A compiled ONNX Runtime session.
///
/// Keeps the path of the model it was built from: ORT sessions cannot be
/// serialized, so saving copies the source model and reloading rebuilds the
/// session with the same [`OrtSessionConfig`].
pub struct OrtRuntime {
    session: Session,
    model_path: PathBuf,
    config: OrtSessionConfig,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl OrtRuntime {
    pub fn open(model_path: &Path, config: OrtSessionConfig) -> Result<Self> {
        let session = session::open_session(model_path, &config)?;

        let input_names = session
            .inputs
            .iter()
            .map(|input| input.name.clone())
            .collect();
        let output_names = session
            .outputs
            .iter()
            .map(|output| output.name.clone())
            .collect();

        Ok(Self {
            session,
            model_path: model_path.to_path_buf(),
            config,
            input_names,
            output_names,
        })
    }

    /// Reopens a saved runtime with the session policy recorded in its metadata.
    pub fn reopen(metadata: &LearnerMetadata, artifact: &Path) -> Result<Box<dyn CompiledModel>> {
        let config = OrtSessionConfig::from_options(&metadata.runtime_options)?;
        Ok(Box::new(Self::open(artifact, config)?))
    }

    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }
}

impl CompiledModel for OrtRuntime {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::OnnxRuntime
    }

    fn run(
        &mut self,
        inputs: Vec<(String, NativeArray)>,
        output_names: &[String],
    ) -> Result<Vec<NativeArray>> {
        let mut ort_inputs = Vec::with_capacity(inputs.len());
        for (name, input) in inputs {
            let value = convert::native_to_value(input)
                .with_context(|| format!("failed to convert input `{name}`"))?;
            ort_inputs.push((name, SessionInputValue::from(value)));
        }

        let outputs = self.session.run(ort_inputs)?;
        let mut by_name = HashMap::with_capacity(output_names.len());
        for (name, value) in outputs.iter() {
            if output_names.iter().any(|wanted| wanted == name) {
                by_name.insert(name.to_string(), convert::value_to_native(&value)?);
            }
        }

        output_names
            .iter()
            .map(|name| {
                by_name
                    .remove(name)
                    .with_context(|| format!("model produced no output named `{name}`"))
            })
            .collect()
    }

    fn save_artifact(&self, dir: &Path) -> Result<()> {
        let dest = dir.join(RuntimeKind::OnnxRuntime.artifact_file_name());
        if dest.exists() && fs::canonicalize(&dest)? == fs::canonicalize(&self.model_path)? {
            return Ok(());
        }
        fs::copy(&self.model_path, &dest).with_context(|| {
            format!(
                "failed to copy {} to {}",
                self.model_path.display(),
                dest.display()
            )
        })?;
        Ok(())
    }

    fn runtime_options(&self) -> Map<String, Value> {
        self.config.to_options()
    }
}
