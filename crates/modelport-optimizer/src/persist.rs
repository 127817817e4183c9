use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use modelport_backend_ort::OrtRuntime;
use modelport_core::{InferenceLearner, RuntimeKind};
use serde_json::Value;

/// Reloads a learner written by [`InferenceLearner::save`], whatever runtime
/// produced it.
pub fn load_learner(path: impl AsRef<Path>, extra: &BTreeMap<String, Value>) -> Result<InferenceLearner> {
    InferenceLearner::load_with(path, extra, |metadata, artifact| match metadata.runtime {
        RuntimeKind::OnnxRuntime => OrtRuntime::reopen(metadata, artifact),
    })
}
