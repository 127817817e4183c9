use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Compiler backends the optimizer knows how to drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelCompiler {
    OnnxRuntime,
    ApacheTvm,
    TensorRt,
    #[serde(rename = "openvino")]
    OpenVino,
}

impl ModelCompiler {
    pub const ALL: [ModelCompiler; 4] = [
        ModelCompiler::OnnxRuntime,
        ModelCompiler::ApacheTvm,
        ModelCompiler::TensorRt,
        ModelCompiler::OpenVino,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ModelCompiler::OnnxRuntime => "onnx-runtime",
            ModelCompiler::ApacheTvm => "apache-tvm",
            ModelCompiler::TensorRt => "tensor-rt",
            ModelCompiler::OpenVino => "openvino",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelCompiler::OnnxRuntime => "ONNX Runtime",
            ModelCompiler::ApacheTvm => "Apache TVM",
            ModelCompiler::TensorRt => "TensorRT",
            ModelCompiler::OpenVino => "OpenVINO",
        }
    }
}

impl fmt::Display for ModelCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelCompiler {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let normalized = squash(raw);
        match ModelCompiler::ALL
            .into_iter()
            .find(|compiler| squash(compiler.name()) == normalized)
        {
            Some(compiler) => Ok(compiler),
            None => bail!(
                "unknown compiler: {raw} (expected one of onnx-runtime, apache-tvm, tensor-rt, openvino)"
            ),
        }
    }
}

/// Lowercases and drops separators, so `TensorRT`, `tensor-rt` and
/// `tensor_rt` compare equal.
fn squash(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kebab_and_snake_case() {
        assert_eq!("tensor-rt".parse::<ModelCompiler>().ok(), Some(ModelCompiler::TensorRt));
        assert_eq!("ONNX_RUNTIME".parse::<ModelCompiler>().ok(), Some(ModelCompiler::OnnxRuntime));
        assert!("tflite".parse::<ModelCompiler>().is_err());
    }

    #[test]
    fn parses_display_spellings() {
        for compiler in ModelCompiler::ALL {
            assert_eq!(compiler.display_name().parse::<ModelCompiler>().ok(), Some(compiler));
        }
        assert_eq!("TensorRT".parse::<ModelCompiler>().ok(), Some(ModelCompiler::TensorRt));
        assert_eq!("ApacheTVM".parse::<ModelCompiler>().ok(), Some(ModelCompiler::ApacheTvm));
        assert_eq!("OpenVINO".parse::<ModelCompiler>().ok(), Some(ModelCompiler::OpenVino));
    }

    #[test]
    fn serde_names_match_display() {
        for compiler in ModelCompiler::ALL {
            let json = serde_json::to_string(&compiler).unwrap();
            assert_eq!(json, format!("\"{compiler}\""));
        }
    }
}
