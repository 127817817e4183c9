use modelport_backend_ort::{ExecutionTarget, OrtOptimizer, OrtSessionConfig};
use modelport_core::{ModelCompiler, Optimizer};

use crate::{HardwareCapabilities, TvmOptimizer};

/// Builds a fresh optimizer for `compiler`.
pub fn optimizer_for(
    compiler: ModelCompiler,
    capabilities: &HardwareCapabilities,
) -> Box<dyn Optimizer> {
    match compiler {
        ModelCompiler::OnnxRuntime => Box::new(baseline_optimizer(capabilities)),
        ModelCompiler::ApacheTvm => Box::new(TvmOptimizer::new()),
        ModelCompiler::TensorRt => Box::new(OrtOptimizer::tensor_rt(0)),
        ModelCompiler::OpenVino => Box::new(OrtOptimizer::openvino()),
    }
}

/// ONNX Runtime on the host's default target. CPU sessions on Intel parts
/// flush denormals to zero.
pub fn baseline_optimizer(capabilities: &HardwareCapabilities) -> OrtOptimizer {
    let config = OrtSessionConfig::for_host(capabilities.gpu_available);
    let flush = config.target == ExecutionTarget::Cpu && capabilities.is_intel_cpu();
    OrtOptimizer::onnx_runtime(config.with_denormal_as_zero(flush))
}
