//! lead-intake: parse message files and print leads or quote forms as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use lead_intake::config::FallbackConfig;
use lead_intake::{
    init_tracing, load_message_file, AlptisTransformer, LeadPipeline, PlatformTransformer,
    SwissLifeTransformer,
};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Target {
    Alptis,
    Swisslife,
}

/// Command-line arguments for lead-intake
#[derive(Parser, Debug)]
#[command(name = "lead-intake")]
#[command(about = "Extract insurance leads from partner emails")]
#[command(version)]
struct Args {
    /// Message files (plain text or HTML)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Map each lead to this platform's quote form instead of printing it
    #[arg(short, long, value_enum)]
    platform: Option<Target>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let fallback = FallbackConfig::from_env().context("Invalid fallback configuration")?;
    let pipeline = LeadPipeline::from_config(fallback.as_ref())
        .context("Failed to initialize text-understanding fallback")?;

    let inputs = args
        .files
        .iter()
        .map(|path| load_message_file(path).with_context(|| format!("Cannot read {}", path.display())))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(messages = inputs.len(), fallback = pipeline.has_fallback(), "Parsing messages");
    let leads = pipeline.parse_messages(&inputs);

    let output = match args.platform {
        None => serde_json::to_value(&leads)?,
        Some(Target::Alptis) => serde_json::to_value(
            leads.iter().map(|l| AlptisTransformer.try_transform(l)).collect::<Vec<_>>(),
        )?,
        Some(Target::Swisslife) => serde_json::to_value(
            leads.iter().map(|l| SwissLifeTransformer.try_transform(l)).collect::<Vec<_>>(),
        )?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
