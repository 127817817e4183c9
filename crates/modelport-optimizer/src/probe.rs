//! Hardware discovery: which compilers can run on this machine.

use modelport_core::ModelCompiler;
use nvml_wrapper::Nvml;
use sysinfo::{CpuRefreshKind, RefreshKind, System};
use tracing::debug;

/// What the prober found. Every probe degrades to "absent" on failure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HardwareCapabilities {
    pub gpu_available: bool,
    pub cpu_brand: String,
    pub tvm_available: bool,
}

impl HardwareCapabilities {
    pub fn detect() -> Self {
        let capabilities = Self {
            gpu_available: detect_gpu(),
            cpu_brand: detect_cpu_brand(),
            tvm_available: detect_tvm(),
        };
        debug!(?capabilities, "probed hardware");
        capabilities
    }

    pub fn is_intel_cpu(&self) -> bool {
        self.cpu_brand.to_lowercase().contains("intel")
    }

    /// Compilers usable with these capabilities, in probing order.
    ///
    /// ONNX Runtime is always present; it is the baseline every other
    /// backend is measured against.
    pub fn compilers(&self) -> Vec<ModelCompiler> {
        let mut compilers = vec![ModelCompiler::OnnxRuntime];
        if self.tvm_available {
            compilers.push(ModelCompiler::ApacheTvm);
        }
        if self.gpu_available {
            compilers.push(ModelCompiler::TensorRt);
        }
        if self.is_intel_cpu() {
            compilers.push(ModelCompiler::OpenVino);
        }
        compilers
    }
}

pub fn select_compilers_from_hardware() -> Vec<ModelCompiler> {
    HardwareCapabilities::detect().compilers()
}

fn detect_gpu() -> bool {
    match Nvml::init().and_then(|nvml| nvml.device_count()) {
        Ok(count) => count > 0,
        Err(err) => {
            debug!(error = %err, "NVML unavailable, assuming no GPU");
            false
        }
    }
}

fn detect_cpu_brand() -> String {
    let system =
        System::new_with_specifics(RefreshKind::new().with_cpu(CpuRefreshKind::everything()));
    let Some(cpu) = system.cpus().first() else {
        debug!("no CPU information available");
        return String::new();
    };
    if cpu.brand().trim().is_empty() {
        cpu.vendor_id().to_string()
    } else {
        cpu.brand().to_string()
    }
}

fn detect_tvm() -> bool {
    match which::which("tvmc") {
        Ok(path) => {
            debug!(path = %path.display(), "found TVM toolchain");
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_is_always_available() {
        assert_eq!(
            HardwareCapabilities::default().compilers(),
            vec![ModelCompiler::OnnxRuntime]
        );
    }

    #[test]
    fn full_machine_lists_every_compiler_in_probe_order() {
        let capabilities = HardwareCapabilities {
            gpu_available: true,
            cpu_brand: "Intel(R) Xeon(R) Platinum 8375C CPU @ 2.90GHz".to_string(),
            tvm_available: true,
        };
        assert_eq!(
            capabilities.compilers(),
            vec![
                ModelCompiler::OnnxRuntime,
                ModelCompiler::ApacheTvm,
                ModelCompiler::TensorRt,
                ModelCompiler::OpenVino,
            ]
        );
    }

    #[test]
    fn vendor_match_is_case_insensitive() {
        let mut capabilities = HardwareCapabilities {
            cpu_brand: "GenuineINTEL".to_string(),
            ..Default::default()
        };
        assert!(capabilities.is_intel_cpu());

        capabilities.cpu_brand = "AMD Ryzen 9 7950X 16-Core Processor".to_string();
        assert!(!capabilities.is_intel_cpu());
        assert!(!capabilities.compilers().contains(&ModelCompiler::OpenVino));
    }

    #[test]
    fn detection_never_panics() {
        let capabilities = HardwareCapabilities::detect();
        assert_eq!(capabilities.compilers()[0], ModelCompiler::OnnxRuntime);
    }
}
