use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use uuid::Uuid;

pub const DEFAULT_DEBUG_FILE_SUFFIX: &str = "debug_info.json";

/// JSON file mapping optimizer names to the score they reached.
///
/// Every update rewrites the whole file. There is no locking; two sweeps
/// sharing a path race and the last writer wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugLog {
    path: PathBuf,
}

impl DebugLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A fresh `<uuid>_<suffix>` file under `dir`.
    pub fn unique_in(dir: impl AsRef<Path>, suffix: &str) -> Self {
        Self::new(dir.as_ref().join(format!("{}_{}", Uuid::new_v4(), suffix)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, optimizer: &str, score: f64) -> Result<()> {
        let mut entries = self.read()?;
        entries.insert(optimizer.to_string(), score.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, text)
            .with_context(|| format!("failed to write debug log {}", self.path.display()))?;
        Ok(())
    }

    /// Current contents; a log that was never written is empty.
    pub fn read(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read debug log {}", self.path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("debug log {} is not a JSON object", self.path.display()))
    }
}
