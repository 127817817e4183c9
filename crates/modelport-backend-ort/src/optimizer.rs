use anyhow::{ensure, Result};
use modelport_core::{InferenceLearner, OptimizeRequest, Optimizer};
use tracing::debug;

use crate::{ExecutionTarget, OrtRuntime, OrtSessionConfig};

/// Compiles a model into an ONNX Runtime session on one execution target.
///
/// The same optimizer drives the baseline runtime and the execution-provider
/// backends (TensorRT, OpenVINO); only the session policy differs.
#[derive(Clone, Debug)]
pub struct OrtOptimizer {
    name: &'static str,
    config: OrtSessionConfig,
}

impl OrtOptimizer {
    pub fn onnx_runtime(config: OrtSessionConfig) -> Self {
        Self {
            name: "OnnxRuntimeOptimizer",
            config,
        }
    }

    pub fn tensor_rt(device_id: u32) -> Self {
        Self {
            name: "TensorRtOptimizer",
            config: OrtSessionConfig::with_target(ExecutionTarget::TensorRt { device_id }),
        }
    }

    pub fn openvino() -> Self {
        Self {
            name: "OpenVinoOptimizer",
            config: OrtSessionConfig::with_target(ExecutionTarget::OpenVino {
                device_type: "CPU".to_string(),
            }),
        }
    }

    pub fn config(&self) -> &OrtSessionConfig {
        &self.config
    }
}

impl Optimizer for OrtOptimizer {
    fn name(&self) -> &str {
        self.name
    }

    fn optimize(&self, request: &OptimizeRequest<'_>) -> Result<InferenceLearner> {
        ensure!(
            request.model_path.is_file(),
            "model file {} does not exist",
            request.model_path.display()
        );

        let runtime = OrtRuntime::open(request.model_path, self.config.clone())?;
        ensure!(
            runtime.input_names().len() == request.params.input_count(),
            "model declares {} inputs but model params describe {}",
            runtime.input_names().len(),
            request.params.input_count()
        );

        let input_names = runtime.input_names().to_vec();
        let output_names = runtime.output_names().to_vec();
        debug!(
            optimizer = self.name,
            target = ?self.config.target,
            inputs = ?input_names,
            outputs = ?output_names,
            "ORT session ready"
        );

        Ok(InferenceLearner::new(
            Box::new(runtime),
            request.framework,
            request.params.clone(),
            input_names,
            output_names,
        ))
    }
}
