use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{InferenceLearner, ModelParams, RuntimeKind, TensorFramework};

pub const METADATA_FILE_NAME: &str = "metadata.json";

const RESERVED_KEYS: [&str; 6] = [
    "runtime",
    "framework",
    "network_parameters",
    "input_names",
    "output_names",
    "runtime_options",
];

/// Record stored next to a saved learner's artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearnerMetadata {
    pub runtime: RuntimeKind,
    pub framework: TensorFramework,
    pub network_parameters: ModelParams,
    pub input_names: Vec<String>,
    pub output_names: Vec<String>,
    #[serde(default)]
    pub runtime_options: Map<String, Value>,
    /// Caller-supplied extras, stored as top-level keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl LearnerMetadata {
    pub fn from_learner(learner: &InferenceLearner, extra: BTreeMap<String, Value>) -> Result<Self> {
        if let Some(key) = extra.keys().find(|key| RESERVED_KEYS.contains(&key.as_str())) {
            bail!("metadata key `{key}` is reserved");
        }
        Ok(Self {
            runtime: learner.runtime_kind(),
            framework: learner.framework(),
            network_parameters: learner.network_parameters().clone(),
            input_names: learner.input_names().to_vec(),
            output_names: learner.output_names().to_vec(),
            runtime_options: learner.runtime_options(),
            extra,
        })
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create learner directory {}", dir.display()))?;
        let blob = serde_json::to_vec_pretty(self)?;
        fs::write(dir.join(METADATA_FILE_NAME), blob)
            .with_context(|| format!("failed to write metadata in {}", dir.display()))?;
        Ok(())
    }

    pub fn read(dir: &Path) -> Result<Self> {
        let path = dir.join(METADATA_FILE_NAME);
        ensure!(path.exists(), "no learner metadata found at {}", path.display());
        let data = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
        let metadata = serde_json::from_slice(&data)
            .with_context(|| format!("malformed learner metadata in {}", path.display()))?;
        Ok(metadata)
    }
}
