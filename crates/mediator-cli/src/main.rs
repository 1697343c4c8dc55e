//! # mediator-cli
//!
//! Command-line entry point of the schema mediator.
//!
//! Reads one XML document conforming to the old schema, mediates it and
//! prints the resulting new-schema document on stdout. Logs and errors go
//! to stderr so stdout carries nothing but the document.

use anyhow::Context;
use clap::{ArgAction, Parser};
use mediator_mapping::ValueCase;
use mediator_pipeline::{MediationContext, Pipeline, PipelineConfig};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const USAGE_HINT: &str = "Please provide the path to an XML file to mediate.";

#[derive(Parser)]
#[command(name = "mediator")]
#[command(about = "Mediate an old-schema XML document into the new schema")]
#[command(version)]
struct Cli {
    /// XML document conforming to the old schema
    input: Option<PathBuf>,

    /// Path to a YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// How the detail value is copied: pass-through or lower-case
    #[arg(long, value_name = "POLICY")]
    value_case: Option<ValueCase>,

    /// Indent the output document
    #[arg(long)]
    pretty: bool,

    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Configuration file values with command-line overrides applied
    fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(value_case) = self.value_case {
            config.value_case = value_case;
        }
        if self.pretty {
            config.output.pretty = true;
        }
        Ok(config)
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(input) = cli.input.as_deref() else {
        println!("{USAGE_HINT}");
        return Ok(());
    };

    let config = cli.pipeline_config()?;
    let context = MediationContext::bundled().context("Failed to load the bundled schemas")?;
    let pipeline = Pipeline::new(context, &config);

    let output = pipeline
        .process_file(input)
        .with_context(|| format!("Failed to mediate {}", input.display()))?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&output)
        .and_then(|()| stdout.write_all(b"\n"))
        .and_then(|()| stdout.flush())
        .context("Failed to write the mediated document")?;

    tracing::info!("Mediated {}", input.display());
    Ok(())
}
