use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;

use edge_inference::config::{ConfigOverrides, DEFAULT_LOG_LEVEL};
use edge_inference::logging::init_logging;
use edge_inference::preprocessing::Transformer;
use edge_inference::readings::{read_readings_file, write_features};
use edge_inference::{
    load_entrypoint, process_or_none, EntrypointKind, ModelArtifact, PipelineSpec, Samples,
    ServiceConfig,
};

/// Offline runner for the inference entrypoints and preprocessing pipelines.
#[derive(Parser)]
#[command(name = "edge-inference", version)]
struct Cli {
    /// Log level used when RUST_LOG is not set; overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process one payload and print the result (`null` on failure)
    Run {
        /// Service config file; flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long, value_enum)]
        entrypoint: Option<EntrypointKind>,

        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Payload JSON file; reads stdin when omitted
        payload: Option<PathBuf>,
    },
    /// Print a summary of a model artifact
    Inspect { model: PathBuf },
    /// Turn a CSV of readings into a CSV of features
    Features {
        /// Pipeline spec JSON
        #[arg(short, long)]
        pipeline: PathBuf,

        input: PathBuf,

        /// Output CSV; writes stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn read_payload(path: Option<&PathBuf>) -> Result<Value> {
    let text = match path {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("cannot read payload {}", p.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("cannot read stdin")?;
            buf
        }
    };
    serde_json::from_str(&text).context("payload is not valid JSON")
}

fn resolve_config(
    config: Option<PathBuf>,
    entrypoint: Option<EntrypointKind>,
    model: Option<PathBuf>,
    log_level: Option<String>,
) -> Result<ServiceConfig> {
    let overrides = ConfigOverrides { entrypoint, model_path: model, log_level, listen_addr: None };
    ServiceConfig::resolve(config.as_deref(), overrides).context("cannot resolve service config")
}

fn run(service: ServiceConfig, payload: Option<PathBuf>) -> Result<()> {
    init_logging(&service.log_level);

    let mut ep = load_entrypoint(service.entrypoint, service.model_path.as_deref())
        .with_context(|| format!("cannot build entrypoint '{}'", service.entrypoint))?;
    if let Some(params) = &service.parameters {
        ep.update_parameters(params).context("invalid initial parameters")?;
    }

    let input = read_payload(payload.as_ref())?;
    let result = process_or_none(&*ep, &input).unwrap_or(Value::Null);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn inspect(model: PathBuf) -> Result<()> {
    let artifact = ModelArtifact::load_json(&model)
        .with_context(|| format!("cannot load model {}", model.display()))?;
    for line in artifact.summary() {
        println!("{}", line);
    }
    Ok(())
}

fn features(pipeline: PathBuf, input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let spec = PipelineSpec::load_json(&pipeline)
        .with_context(|| format!("cannot load pipeline {}", pipeline.display()))?;
    let pipeline = spec.build()?;
    let readings = read_readings_file(&input)
        .with_context(|| format!("cannot read readings {}", input.display()))?;
    info!(rows = readings.values.nrows(), steps = pipeline.len(), "extracting features");

    let features = pipeline
        .transform(&Samples::Single(readings.values))?
        .into_single("features")
        .context("pipeline must end in a 2-D step")?;

    match output {
        Some(path) => {
            let file = std::fs::File::create(&path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            write_features(file, &features)?;
            info!(path = %path.display(), rows = features.nrows(), "features written");
        }
        None => write_features(std::io::stdout().lock(), &features)?,
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run { config, entrypoint, model, payload } => {
            let service = resolve_config(config, entrypoint, model, cli.log_level)?;
            run(service, payload)
        }
        Command::Inspect { model } => {
            init_logging(cli.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL));
            inspect(model)
        }
        Command::Features { pipeline, input, output } => {
            init_logging(cli.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL));
            features(pipeline, input, output)
        }
    }
}
