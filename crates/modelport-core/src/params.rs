use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{DType, NativeArray};

/// Batch size and tensor shapes of an exported model.
///
/// Shapes in `input_sizes`/`output_sizes` exclude the batch dimension.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelParams {
    pub batch_size: usize,
    pub input_sizes: Vec<Vec<usize>>,
    #[serde(default)]
    pub output_sizes: Vec<Vec<usize>>,
    /// Element type per input; missing entries are f32.
    #[serde(default)]
    pub input_types: Vec<DType>,
}

impl ModelParams {
    pub fn new(batch_size: usize, input_sizes: Vec<Vec<usize>>, output_sizes: Vec<Vec<usize>>) -> Self {
        Self {
            batch_size,
            input_sizes,
            output_sizes,
            input_types: Vec::new(),
        }
    }

    pub fn with_input_types(mut self, input_types: Vec<DType>) -> Self {
        self.input_types = input_types;
        self
    }

    pub fn input_count(&self) -> usize {
        self.input_sizes.len()
    }

    pub fn input_dtype(&self, idx: usize) -> DType {
        self.input_types.get(idx).copied().unwrap_or(DType::F32)
    }

    /// Full input shapes, batch dimension first.
    pub fn input_shapes(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        self.input_sizes.iter().map(move |dims| {
            let mut shape = Vec::with_capacity(dims.len() + 1);
            shape.push(self.batch_size);
            shape.extend_from_slice(dims);
            shape
        })
    }

    /// One random batch matching the declared inputs.
    pub fn random_inputs(&self) -> Result<Vec<NativeArray>> {
        let mut rng = rand::thread_rng();
        self.input_shapes()
            .enumerate()
            .map(|(idx, shape)| NativeArray::random(self.input_dtype(idx), &shape, &mut rng))
            .collect()
    }
}
