use std::path::Path;

use anyhow::{bail, Context, Result};
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where an ORT session executes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ExecutionTarget {
    Cpu,
    Cuda { device_id: u32 },
    TensorRt { device_id: u32 },
    OpenVino { device_type: String },
}

/// Session policy, persisted with a saved learner so it reopens the same way.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrtSessionConfig {
    pub target: ExecutionTarget,
    /// Intra-op threads for CPU sessions; defaults to the number of cores.
    #[serde(default)]
    pub intra_threads: Option<usize>,
    /// Flush denormal floats to zero; only honoured by CPU sessions.
    #[serde(default)]
    pub denormal_as_zero: bool,
}

impl Default for OrtSessionConfig {
    fn default() -> Self {
        Self::cpu()
    }
}

impl OrtSessionConfig {
    pub fn cpu() -> Self {
        Self {
            target: ExecutionTarget::Cpu,
            intra_threads: None,
            denormal_as_zero: false,
        }
    }

    pub fn with_target(target: ExecutionTarget) -> Self {
        Self {
            target,
            intra_threads: None,
            denormal_as_zero: false,
        }
    }

    pub fn with_denormal_as_zero(mut self, enabled: bool) -> Self {
        self.denormal_as_zero = enabled;
        self
    }

    /// Baseline policy for this host: CUDA when a GPU is present and CUDA
    /// support was compiled in, CPU otherwise.
    pub fn for_host(gpu_available: bool) -> Self {
        if gpu_available && cfg!(feature = "cuda") {
            Self::with_target(ExecutionTarget::Cuda { device_id: 0 })
        } else {
            Self::cpu()
        }
    }

    pub fn to_options(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    pub fn from_options(options: &Map<String, Value>) -> Result<Self> {
        if options.is_empty() {
            return Ok(Self::cpu());
        }
        serde_json::from_value(Value::Object(options.clone()))
            .context("invalid ONNX Runtime session options")
    }
}

pub(crate) fn open_session(path: &Path, config: &OrtSessionConfig) -> Result<Session> {
    let builder = Session::builder()
        .context("failed to create ORT session builder")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("failed to configure ORT session builder")?;

    let builder = configure_target(builder, config)?;

    builder
        .commit_from_file(path)
        .with_context(|| format!("failed to load ONNX model {}", path.display()))
}

fn configure_target(builder: SessionBuilder, config: &OrtSessionConfig) -> Result<SessionBuilder> {
    match &config.target {
        ExecutionTarget::Cpu => {
            let threads = config.intra_threads.unwrap_or_else(num_cpus::get).max(1);
            let builder = builder
                .with_parallel_execution(true)
                .and_then(|b| b.with_inter_threads(1))
                .and_then(|b| b.with_intra_threads(threads))
                .context("failed to configure ORT CPU threading")?;
            if config.denormal_as_zero {
                builder
                    .with_denormal_as_zero()
                    .context("failed to enable ORT denormal-as-zero")
            } else {
                Ok(builder)
            }
        }
        ExecutionTarget::Cuda { device_id } => configure_cuda(builder, *device_id),
        ExecutionTarget::TensorRt { device_id } => configure_tensorrt(builder, *device_id),
        ExecutionTarget::OpenVino { device_type } => configure_openvino(builder, device_type),
    }
}

fn configure_cuda(builder: SessionBuilder, device_id: u32) -> Result<SessionBuilder> {
    #[cfg(feature = "cuda")]
    {
        use ort::execution_providers::cuda::CUDAExecutionProvider;
        let ep = CUDAExecutionProvider::default()
            .with_device_id(device_id as i32)
            .build()
            .error_on_failure();
        builder
            .with_execution_providers([ep])
            .context("failed to enable ORT CUDA execution provider")
    }
    #[cfg(not(feature = "cuda"))]
    {
        let _ = (builder, device_id);
        bail!("CUDA requested but modelport-backend-ort was built without the `cuda` feature")
    }
}

fn configure_tensorrt(builder: SessionBuilder, device_id: u32) -> Result<SessionBuilder> {
    #[cfg(feature = "tensorrt")]
    {
        use ort::execution_providers::cuda::CUDAExecutionProvider;
        use ort::execution_providers::tensorrt::TensorRTExecutionProvider;
        let trt = TensorRTExecutionProvider::default()
            .with_device_id(device_id as i32)
            .build()
            .error_on_failure();
        // Nodes TensorRT rejects fall through to CUDA.
        let cuda = CUDAExecutionProvider::default()
            .with_device_id(device_id as i32)
            .build();
        builder
            .with_execution_providers([trt, cuda])
            .context("failed to enable ORT TensorRT execution provider")
    }
    #[cfg(not(feature = "tensorrt"))]
    {
        let _ = (builder, device_id);
        bail!("TensorRT requested but modelport-backend-ort was built without the `tensorrt` feature")
    }
}

fn configure_openvino(builder: SessionBuilder, device_type: &str) -> Result<SessionBuilder> {
    #[cfg(feature = "openvino")]
    {
        use ort::execution_providers::openvino::OpenVINOExecutionProvider;
        let ep = OpenVINOExecutionProvider::default()
            .with_device_type(device_type)
            .build()
            .error_on_failure();
        builder
            .with_execution_providers([ep])
            .context("failed to enable ORT OpenVINO execution provider")
    }
    #[cfg(not(feature = "openvino"))]
    {
        let _ = (builder, device_type);
        bail!("OpenVINO requested but modelport-backend-ort was built without the `openvino` feature")
    }
}
