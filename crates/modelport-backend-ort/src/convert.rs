use anyhow::{bail, Result};
use modelport_core::NativeArray;
use ort::tensor::TensorElementType;
use ort::value::{DynValue, ValueType};

pub(crate) fn native_to_value(array: NativeArray) -> Result<DynValue> {
    let shape = array.shape().to_vec();
    let value = match array {
        NativeArray::F32(a) => {
            let data = a.iter().copied().collect::<Vec<f32>>();
            ort::value::Tensor::from_array((shape, data))?.into_dyn()
        }
        NativeArray::I64(a) => {
            let data = a.iter().copied().collect::<Vec<i64>>();
            ort::value::Tensor::from_array((shape, data))?.into_dyn()
        }
        NativeArray::I32(a) => {
            let data = a.iter().copied().collect::<Vec<i32>>();
            ort::value::Tensor::from_array((shape, data))?.into_dyn()
        }
        NativeArray::U8(a) => {
            let data = a.iter().copied().collect::<Vec<u8>>();
            ort::value::Tensor::from_array((shape, data))?.into_dyn()
        }
    };
    Ok(value)
}

pub(crate) fn value_to_native(value: &ort::value::ValueRef<'_>) -> Result<NativeArray> {
    let ValueType::Tensor { ty, .. } = value.dtype() else {
        bail!("non-tensor outputs are not supported");
    };

    match *ty {
        TensorElementType::Float32 => Ok(NativeArray::F32(
            value.try_extract_array::<f32>()?.to_owned(),
        )),
        TensorElementType::Int64 => Ok(NativeArray::I64(
            value.try_extract_array::<i64>()?.to_owned(),
        )),
        TensorElementType::Int32 => Ok(NativeArray::I32(
            value.try_extract_array::<i32>()?.to_owned(),
        )),
        TensorElementType::Uint8 => Ok(NativeArray::U8(
            value.try_extract_array::<u8>()?.to_owned(),
        )),
        TensorElementType::Float16 => bail!("f16 outputs are not supported yet"),
        _ => bail!("unsupported output tensor element type: {ty:?}"),
    }
}
