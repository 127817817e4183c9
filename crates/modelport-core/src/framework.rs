use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use crate::{NativeArray, Tensor};

/// Calling convention a learner exposes to its caller.
///
/// Independent of which runtime compiled the model: any runtime handle can be
/// wrapped with any framework.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TensorFramework {
    /// Byte-backed [`Tensor`].
    Tensor,
    /// `ndarray::ArrayD<f32>`.
    Ndarray,
    /// [`NativeArray`], passed through untouched.
    Raw,
}

impl TensorFramework {
    pub const ALL: [TensorFramework; 3] = [
        TensorFramework::Tensor,
        TensorFramework::Ndarray,
        TensorFramework::Raw,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TensorFramework::Tensor => "tensor",
            TensorFramework::Ndarray => "ndarray",
            TensorFramework::Raw => "raw",
        }
    }
}

impl fmt::Display for TensorFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TensorFramework {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        match TensorFramework::ALL
            .into_iter()
            .find(|fw| fw.name().eq_ignore_ascii_case(raw))
        {
            Some(fw) => Ok(fw),
            None => bail!("unsupported tensor framework: {raw} (expected tensor, ndarray or raw)"),
        }
    }
}

/// Conversion pair between a caller-side tensor type and [`NativeArray`].
pub trait FrameworkTensor: Sized {
    const FRAMEWORK: TensorFramework;

    fn into_native(self) -> Result<NativeArray>;
    fn from_native(array: NativeArray) -> Result<Self>;
}

impl FrameworkTensor for Tensor {
    const FRAMEWORK: TensorFramework = TensorFramework::Tensor;

    fn into_native(self) -> Result<NativeArray> {
        NativeArray::from_tensor(&self)
    }

    fn from_native(array: NativeArray) -> Result<Self> {
        Ok(array.to_tensor())
    }
}

impl FrameworkTensor for ArrayD<f32> {
    const FRAMEWORK: TensorFramework = TensorFramework::Ndarray;

    fn into_native(self) -> Result<NativeArray> {
        Ok(NativeArray::F32(self))
    }

    fn from_native(array: NativeArray) -> Result<Self> {
        match array {
            NativeArray::F32(array) => Ok(array),
            other => bail!(
                "ndarray callers only receive f32 outputs, model produced {:?}",
                other.dtype()
            ),
        }
    }
}

impl FrameworkTensor for NativeArray {
    const FRAMEWORK: TensorFramework = TensorFramework::Raw;

    fn into_native(self) -> Result<NativeArray> {
        Ok(self)
    }

    fn from_native(array: NativeArray) -> Result<Self> {
        Ok(array)
    }
}
