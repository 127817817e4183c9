use anyhow::{bail, ensure, Context, Result};
use bytes::Bytes;
use ndarray::{ArrayD, IxDyn};
use rand::Rng;

use crate::{DType, Shape, Tensor};

/// The array representation every compiled runtime consumes and produces.
#[derive(Clone, Debug, PartialEq)]
pub enum NativeArray {
    F32(ArrayD<f32>),
    I64(ArrayD<i64>),
    I32(ArrayD<i32>),
    U8(ArrayD<u8>),
}

impl NativeArray {
    pub fn dtype(&self) -> DType {
        match self {
            NativeArray::F32(_) => DType::F32,
            NativeArray::I64(_) => DType::I64,
            NativeArray::I32(_) => DType::I32,
            NativeArray::U8(_) => DType::U8,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            NativeArray::F32(a) => a.shape(),
            NativeArray::I64(a) => a.shape(),
            NativeArray::I32(a) => a.shape(),
            NativeArray::U8(a) => a.shape(),
        }
    }

    /// Random array used as benchmark input.
    ///
    /// Integer inputs are kept small and non-negative so that models treating
    /// them as indices (token ids, class ids) stay in range.
    pub fn random<R: Rng>(dtype: DType, shape: &[usize], rng: &mut R) -> Result<Self> {
        let dim = IxDyn(shape);
        Ok(match dtype {
            DType::F32 => NativeArray::F32(ArrayD::from_shape_fn(dim, |_| rng.gen::<f32>())),
            DType::I64 => NativeArray::I64(ArrayD::from_shape_fn(dim, |_| rng.gen_range(0..16))),
            DType::I32 => NativeArray::I32(ArrayD::from_shape_fn(dim, |_| rng.gen_range(0..16))),
            DType::U8 => NativeArray::U8(ArrayD::from_shape_fn(dim, |_| rng.gen::<u8>())),
            DType::F16 => bail!("f16 inputs are not supported yet"),
        })
    }

    pub fn from_tensor(tensor: &Tensor) -> Result<Self> {
        tensor.validate()?;
        let dim = IxDyn(tensor.shape());
        let bytes = &tensor.bytes;
        let array = match tensor.dtype() {
            DType::F32 => NativeArray::F32(
                ArrayD::from_shape_vec(dim, decode(bytes, f32::from_le_bytes)?)
                    .context("f32 tensor shape mismatch")?,
            ),
            DType::I64 => NativeArray::I64(
                ArrayD::from_shape_vec(dim, decode(bytes, i64::from_le_bytes)?)
                    .context("i64 tensor shape mismatch")?,
            ),
            DType::I32 => NativeArray::I32(
                ArrayD::from_shape_vec(dim, decode(bytes, i32::from_le_bytes)?)
                    .context("i32 tensor shape mismatch")?,
            ),
            DType::U8 => NativeArray::U8(
                ArrayD::from_shape_vec(dim, bytes.to_vec()).context("u8 tensor shape mismatch")?,
            ),
            DType::F16 => bail!("f16 tensors are not supported yet"),
        };
        Ok(array)
    }

    pub fn to_tensor(&self) -> Tensor {
        let shape = Shape::from_slice(self.shape());
        let (dtype, bytes) = match self {
            NativeArray::F32(a) => (DType::F32, encode(a.iter().copied(), f32::to_le_bytes)),
            NativeArray::I64(a) => (DType::I64, encode(a.iter().copied(), i64::to_le_bytes)),
            NativeArray::I32(a) => (DType::I32, encode(a.iter().copied(), i32::to_le_bytes)),
            NativeArray::U8(a) => (DType::U8, Bytes::from(a.iter().copied().collect::<Vec<_>>())),
        };
        Tensor::from_cpu_bytes(dtype, shape, bytes)
    }
}

fn decode<T, const N: usize>(bytes: &[u8], from_le: fn([u8; N]) -> T) -> Result<Vec<T>> {
    ensure!(
        bytes.len() % N == 0,
        "buffer of {} bytes is not a multiple of the {N}-byte element size",
        bytes.len()
    );
    Ok(bytes
        .chunks_exact(N)
        .map(|chunk| {
            let mut raw = [0u8; N];
            raw.copy_from_slice(chunk);
            from_le(raw)
        })
        .collect())
}

fn encode<T, const N: usize>(values: impl Iterator<Item = T>, to_le: fn(T) -> [u8; N]) -> Bytes {
    Bytes::from(values.flat_map(to_le).collect::<Vec<u8>>())
}
