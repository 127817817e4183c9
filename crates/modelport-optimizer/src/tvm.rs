use std::path::PathBuf;

use anyhow::{bail, Result};
use modelport_core::{InferenceLearner, OptimizeRequest, Optimizer};

/// Apache TVM backend.
///
/// TVM is an external toolchain (`tvmc`). No TVM runtime is linked into this
/// build, so a compiled module could not be executed here; every attempt is
/// reported as a failed compilation and the sweep moves on.
#[derive(Clone, Debug, Default)]
pub struct TvmOptimizer {
    tvmc: Option<PathBuf>,
}

impl TvmOptimizer {
    pub fn new() -> Self {
        Self {
            tvmc: which::which("tvmc").ok(),
        }
    }
}

impl Optimizer for TvmOptimizer {
    fn name(&self) -> &str {
        "ApacheTvmOptimizer"
    }

    fn optimize(&self, request: &OptimizeRequest<'_>) -> Result<InferenceLearner> {
        match &self.tvmc {
            None => bail!("apache tvm toolchain (tvmc) not found on PATH"),
            Some(tvmc) => bail!(
                "found {} but no TVM runtime is linked into this build, cannot run {}",
                tvmc.display(),
                request.model_path.display()
            ),
        }
    }
}
