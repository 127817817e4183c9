use std::path::PathBuf;

use clap::{Parser, Subcommand};
use modelport_core::{DType, ModelCompiler, TensorFramework};

#[derive(Parser, Debug)]
#[command(
    name = "modelport",
    version,
    about = "Compile a model with every available backend and keep the fastest"
)]
pub struct Cli {
    /// Log filter (RUST_LOG syntax); defaults to RUST_LOG, then info
    #[arg(long, global = true)]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the compilers usable on this machine
    Probe,

    /// Benchmark every usable compiler on an ONNX model
    Optimize {
        /// Path to the ONNX model
        #[arg(long)]
        model: PathBuf,

        #[arg(long, default_value_t = 1)]
        batch_size: usize,

        /// Input shape without the batch dimension, e.g. 3,224,224; repeat per input
        #[arg(long = "input-shape", required = true)]
        input_shapes: Vec<String>,

        /// Output shape without the batch dimension; repeat per output
        #[arg(long = "output-shape")]
        output_shapes: Vec<String>,

        /// Element type per input, in input order (f32, i64, i32, u8); missing ones are f32
        #[arg(long = "input-type")]
        input_types: Vec<DType>,

        /// Tensor type the saved learner is called with (raw, ndarray, tensor)
        #[arg(long, default_value = "ndarray")]
        framework: TensorFramework,

        /// Compiler to skip (onnx-runtime, apache-tvm, tensor-rt, openvino)
        #[arg(long = "ignore")]
        ignore: Vec<ModelCompiler>,

        /// Record every backend's score in a JSON debug log
        #[arg(long)]
        debug: bool,

        /// Directory for the debug log
        #[arg(long)]
        debug_dir: Option<PathBuf>,

        /// Untimed inferences before measuring
        #[arg(long)]
        warmup: Option<usize>,

        /// Timed inferences per backend
        #[arg(long)]
        runs: Option<usize>,

        /// Save the winning learner into this directory
        #[arg(long)]
        output: Option<PathBuf>,
    },
}
