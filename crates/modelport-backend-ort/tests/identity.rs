mod common;

use std::collections::BTreeMap;

use anyhow::Result;
use modelport_backend_ort::{OrtOptimizer, OrtRuntime, OrtSessionConfig};
use modelport_core::{
    InferenceLearner, LearnerMetadata, ModelParams, NativeArray, OptimizeRequest, Optimizer,
    RuntimeKind, Tensor, TensorFramework,
};
use ndarray::{ArrayD, IxDyn};
use serde_json::json;

fn params() -> ModelParams {
    ModelParams::new(2, vec![vec![3]], vec![vec![3]])
}

fn batch() -> ArrayD<f32> {
    ArrayD::from_shape_vec(IxDyn(&[2, 3]), (0..6).map(|i| i as f32).collect()).unwrap()
}

fn compile(dir: &std::path::Path, framework: TensorFramework) -> Result<InferenceLearner> {
    let model_path = common::write_identity_model(dir, 3)?;
    let params = params();
    let optimizer = OrtOptimizer::onnx_runtime(OrtSessionConfig::cpu());
    optimizer.optimize(&OptimizeRequest {
        model_path: &model_path,
        framework,
        params: &params,
    })
}

#[test]
fn ort_identity_cpu() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut learner = compile(dir.path(), TensorFramework::Ndarray)?;

    assert_eq!(learner.runtime_kind(), RuntimeKind::OnnxRuntime);
    assert_eq!(learner.input_names(), ["x".to_string()]);
    assert_eq!(learner.output_names(), ["y".to_string()]);

    let outputs = learner.predict(vec![batch()])?;
    assert_eq!(outputs, vec![batch()]);
    Ok(())
}

#[test]
fn byte_tensors_pass_through_ort() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut learner = compile(dir.path(), TensorFramework::Tensor)?;

    let input = Tensor::from_f32(&[2, 3], batch().as_slice().unwrap())?;
    let outputs = learner.predict(vec![input.clone()])?;
    assert_eq!(outputs, vec![input]);
    Ok(())
}

#[test]
fn random_benchmark_inputs_are_accepted() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut learner = compile(dir.path(), TensorFramework::Raw)?;

    let inputs = learner.network_parameters().random_inputs()?;
    let outputs = learner.predict_native(inputs.clone())?;
    assert_eq!(outputs, inputs);
    Ok(())
}

#[test]
fn save_then_load_reproduces_predictions() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut original = compile(dir.path(), TensorFramework::Ndarray)?;

    let saved = dir.path().join("learner");
    let mut extra = BTreeMap::new();
    extra.insert("compiler".to_string(), json!("onnx-runtime"));
    original.save(&saved, extra)?;
    assert!(saved.join("model.onnx").is_file());

    let metadata = LearnerMetadata::read(&saved)?;
    assert_eq!(metadata.network_parameters, params());
    assert_eq!(metadata.extra.get("compiler"), Some(&json!("onnx-runtime")));

    let mut loaded = InferenceLearner::load_with(&saved, &BTreeMap::new(), OrtRuntime::reopen)?;
    assert_eq!(loaded.input_names(), original.input_names());
    assert_eq!(loaded.output_names(), original.output_names());
    assert_eq!(loaded.network_parameters(), original.network_parameters());
    assert_eq!(loaded.predict(vec![batch()])?, original.predict(vec![batch()])?);
    Ok(())
}

#[test]
fn saving_over_the_load_directory_keeps_the_model() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let saved = dir.path().join("learner");
    compile(dir.path(), TensorFramework::Raw)?.save(&saved, BTreeMap::new())?;

    let loaded = InferenceLearner::load_with(&saved, &BTreeMap::new(), OrtRuntime::reopen)?;
    loaded.save(&saved, BTreeMap::new())?;

    let mut reloaded = InferenceLearner::load_with(&saved, &BTreeMap::new(), OrtRuntime::reopen)?;
    let input = NativeArray::F32(batch());
    assert_eq!(reloaded.predict(vec![input.clone()])?, vec![input]);
    Ok(())
}

#[test]
fn missing_model_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let params = params();
    let missing = dir.path().join("absent.onnx");
    let result = OrtOptimizer::onnx_runtime(OrtSessionConfig::cpu()).optimize(&OptimizeRequest {
        model_path: &missing,
        framework: TensorFramework::Raw,
        params: &params,
    });
    assert!(result.is_err());
}

#[test]
fn input_count_must_match_model_params() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let model_path = common::write_identity_model(dir.path(), 3)?;
    let params = ModelParams::new(2, vec![vec![3], vec![3]], vec![vec![3]]);

    let err = OrtOptimizer::onnx_runtime(OrtSessionConfig::cpu())
        .optimize(&OptimizeRequest {
            model_path: &model_path,
            framework: TensorFramework::Raw,
            params: &params,
        })
        .unwrap_err();
    assert!(err.to_string().contains("model declares 1 inputs"));
    Ok(())
}

#[cfg(not(feature = "tensorrt"))]
#[test]
fn tensor_rt_needs_its_feature() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let model_path = common::write_identity_model(dir.path(), 3)?;
    let params = params();

    let optimizer = OrtOptimizer::tensor_rt(0);
    assert_eq!(optimizer.name(), "TensorRtOptimizer");
    let err = optimizer
        .optimize(&OptimizeRequest {
            model_path: &model_path,
            framework: TensorFramework::Raw,
            params: &params,
        })
        .unwrap_err();
    assert!(format!("{err:#}").contains("`tensorrt` feature"));
    Ok(())
}
