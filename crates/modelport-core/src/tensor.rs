use std::str::FromStr;

use anyhow::{bail, ensure, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    F32,
    F16,
    I64,
    I32,
    U8,
}

impl DType {
    pub fn byte_size(self) -> usize {
        match self {
            DType::F32 => 4,
            DType::F16 => 2,
            DType::I64 => 8,
            DType::I32 => 4,
            DType::U8 => 1,
        }
    }
}

impl FromStr for DType {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        Ok(match raw.trim().to_ascii_lowercase().as_str() {
            "f32" | "float" | "float32" => DType::F32,
            "f16" | "half" | "float16" => DType::F16,
            "i64" | "int64" => DType::I64,
            "i32" | "int32" => DType::I32,
            "u8" | "uint8" => DType::U8,
            _ => bail!("unsupported dtype: {raw} (expected f32, f16, i64, i32 or u8)"),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape(pub SmallVec<[usize; 6]>);

impl Shape {
    pub fn from_slice(d: &[usize]) -> Self {
        Self(d.iter().copied().collect())
    }
    pub fn numel(&self) -> usize {
        self.0.iter().product::<usize>()
    }
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TensorDesc {
    pub dtype: DType,
    pub shape: Shape,
}

/// Host tensor stored as little-endian bytes.
///
/// This is the calling convention of [`TensorFramework::Tensor`](crate::TensorFramework):
/// callers that already move data around as raw buffers (wire protocols, mmap'd
/// files) hand these to a learner without going through `ndarray` themselves.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    pub desc: TensorDesc,
    pub bytes: Bytes,
}

impl Tensor {
    pub fn from_cpu_bytes(dtype: DType, shape: Shape, bytes: Bytes) -> Self {
        Self {
            desc: TensorDesc { dtype, shape },
            bytes,
        }
    }

    pub fn from_f32(shape: &[usize], data: &[f32]) -> Result<Self> {
        let shape = Shape::from_slice(shape);
        ensure!(
            shape.numel() == data.len(),
            "f32 tensor of shape {:?} needs {} values, got {}",
            shape.as_slice(),
            shape.numel(),
            data.len()
        );
        let bytes = data.iter().flat_map(|v| v.to_le_bytes()).collect::<Vec<u8>>();
        Ok(Self::from_cpu_bytes(DType::F32, shape, Bytes::from(bytes)))
    }

    pub fn dtype(&self) -> DType {
        self.desc.dtype
    }

    pub fn shape(&self) -> &[usize] {
        self.desc.shape.as_slice()
    }

    /// Checks that the buffer length agrees with dtype and shape.
    pub fn validate(&self) -> Result<()> {
        let expected = self.desc.shape.numel() * self.desc.dtype.byte_size();
        ensure!(
            self.bytes.len() == expected,
            "tensor byte size mismatch: got {}, expected {}",
            self.bytes.len(),
            expected
        );
        Ok(())
    }
}
