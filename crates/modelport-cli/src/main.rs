mod cli;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use modelport_core::{ModelCompiler, ModelParams, TensorFramework};
use modelport_optimizer::{
    select_best, HardwareCapabilities, LatencyBenchmark, MultiCompilerOptimizer, OptimizerConfig,
    ScoredLearner,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref())?;

    match cli.command {
        Command::Probe => probe(),
        Command::Optimize {
            model,
            batch_size,
            input_shapes,
            output_shapes,
            input_types,
            framework,
            ignore,
            debug,
            debug_dir,
            warmup,
            runs,
            output,
        } => {
            let params = ModelParams::new(
                batch_size,
                parse_shapes(&input_shapes)?,
                parse_shapes(&output_shapes)?,
            )
            .with_input_types(input_types);
            let mut config = OptimizerConfig::from_env();
            config.ignore_compilers.extend(ignore);
            config.debug_mode |= debug;
            if let Some(dir) = debug_dir {
                config.debug_dir = dir;
            }
            config.benchmark = LatencyBenchmark::new(
                warmup.unwrap_or(config.benchmark.warmup_runs),
                runs.unwrap_or(config.benchmark.runs),
            );
            optimize(&config, &model, framework, &params, output)
        }
    }
}

fn init_tracing(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter: {directives}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn probe() -> Result<()> {
    let capabilities = HardwareCapabilities::detect();
    println!("gpu:  {}", yes_no(capabilities.gpu_available));
    println!("cpu:  {}", capabilities.cpu_brand);
    println!("tvmc: {}", yes_no(capabilities.tvm_available));
    println!();
    for compiler in capabilities.compilers() {
        println!("{:<14} {}", compiler.name(), compiler.display_name());
    }
    Ok(())
}

fn optimize(
    config: &OptimizerConfig,
    model: &Path,
    framework: TensorFramework,
    params: &ModelParams,
    output: Option<PathBuf>,
) -> Result<()> {
    let sweep = MultiCompilerOptimizer::from_config(config);
    ensure!(
        sweep.usable(),
        "every compiler was ignored ({}), nothing to run",
        join_names(&config.ignore_compilers)
    );
    if let Some(log) = sweep.debug_log() {
        tracing::info!(path = %log.path().display(), "writing debug log");
    }

    let results = sweep.evaluate_all(&sweep.benchmark(), model, framework, params);
    for result in &results {
        if result.is_failure() {
            println!("{:<24} failed", result.backend);
        } else {
            println!("{:<24} {:>12.4} ms", result.backend, result.score * 1e3);
        }
    }

    let Some(ScoredLearner {
        backend,
        learner: Some(learner),
        score,
    }) = select_best(results)
    else {
        bail!("no backend could compile {}", model.display());
    };
    println!("best: {backend} ({:.4} ms)", score * 1e3);

    if let Some(dir) = output {
        let mut extra = BTreeMap::new();
        extra.insert("optimizer".to_string(), json!(backend));
        extra.insert("latency_s".to_string(), json!(score));
        learner.save(&dir, extra)?;
        println!("saved to {}", dir.display());
    }
    Ok(())
}

fn parse_shapes(raw: &[String]) -> Result<Vec<Vec<usize>>> {
    raw.iter().map(|shape| parse_shape(shape)).collect()
}

fn parse_shape(raw: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(str::trim)
        .filter(|dim| !dim.is_empty())
        .map(|dim| {
            dim.parse::<usize>()
                .with_context(|| format!("invalid dimension {dim:?} in shape {raw:?}"))
        })
        .collect()
}

fn join_names(compilers: &[ModelCompiler]) -> String {
    compilers
        .iter()
        .map(|compiler| compiler.name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
