use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use modelport_core::ModelCompiler;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{LatencyBenchmark, DEFAULT_DEBUG_FILE_SUFFIX};

pub const ENV_IGNORE_COMPILERS: &str = "MODELPORT_IGNORE_COMPILERS";
pub const ENV_DEBUG: &str = "MODELPORT_DEBUG";
pub const ENV_DEBUG_DIR: &str = "MODELPORT_DEBUG_DIR";
pub const ENV_DEBUG_SUFFIX: &str = "MODELPORT_DEBUG_SUFFIX";
pub const ENV_BENCH_WARMUP: &str = "MODELPORT_BENCH_WARMUP";
pub const ENV_BENCH_RUNS: &str = "MODELPORT_BENCH_RUNS";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub ignore_compilers: Vec<ModelCompiler>,
    pub debug_mode: bool,
    pub debug_dir: PathBuf,
    pub debug_file_suffix: String,
    pub benchmark: LatencyBenchmark,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            ignore_compilers: Vec::new(),
            debug_mode: false,
            debug_dir: PathBuf::from("."),
            debug_file_suffix: DEFAULT_DEBUG_FILE_SUFFIX.to_string(),
            benchmark: LatencyBenchmark::default(),
        }
    }
}

impl OptimizerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from `lookup`, which maps a variable name to its value.
    /// Values that fail to parse are logged and replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(list) = lookup(ENV_IGNORE_COMPILERS) {
            config.ignore_compilers = list
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .filter_map(|item| match ModelCompiler::from_str(item) {
                    Ok(compiler) => Some(compiler),
                    Err(err) => {
                        warn!(var = ENV_IGNORE_COMPILERS, value = item, error = %err, "ignoring unknown compiler");
                        None
                    }
                })
                .collect();
        }
        if let Some(value) = lookup(ENV_DEBUG) {
            config.debug_mode = parse_flag(&value).unwrap_or_else(|| {
                warn!(var = ENV_DEBUG, value = %value, "expected a boolean, debug mode stays off");
                false
            });
        }
        if let Some(dir) = lookup(ENV_DEBUG_DIR).filter(|d| !d.trim().is_empty()) {
            config.debug_dir = PathBuf::from(dir);
        }
        if let Some(suffix) = lookup(ENV_DEBUG_SUFFIX).filter(|s| !s.trim().is_empty()) {
            config.debug_file_suffix = suffix;
        }

        let defaults = LatencyBenchmark::default();
        let warmup = parse_count(&lookup, ENV_BENCH_WARMUP, defaults.warmup_runs);
        let runs = parse_count(&lookup, ENV_BENCH_RUNS, defaults.runs);
        config.benchmark = LatencyBenchmark::new(warmup, runs);
        config
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn parse_count(lookup: &impl Fn(&str) -> Option<String>, var: &str, default: usize) -> usize {
    let Some(value) = lookup(var) else {
        return default;
    };
    match value.trim().parse::<usize>() {
        Ok(count) => count,
        Err(err) => {
            warn!(var, value = %value, error = %err, default, "invalid count, using default");
            default
        }
    }
}
