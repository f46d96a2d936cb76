use anyhow::Context;
use raftsnap_sdk::{InspectConfig, Inspector};
use tracing::warn;

use crate::cli::*;
use crate::render;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Inspect(args) => cmd_inspect(args, cli.format).await,
    }
}

async fn cmd_inspect(args: InspectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = inspect_config(&args)?;
    let inspector = Inspector::new(config)?;
    let report = inspector
        .inspect_path(&args.file)
        .await
        .with_context(|| format!("error reading snapshot {}", args.file.display()))?;

    let out = match format {
        OutputFormat::Text => render::text(&report),
        OutputFormat::Json => render::json(&report)?,
    };
    println!("{}", out.trim_end());
    Ok(())
}

/// Config file values, overridden by whichever flags were given.
fn inspect_config(args: &InspectArgs) -> anyhow::Result<InspectConfig> {
    let mut config = match &args.config {
        Some(path) => InspectConfig::load(path)?,
        None => InspectConfig::default(),
    };
    if args.kvdetails {
        config.kv.enabled = true;
    }
    if let Some(depth) = args.kvdepth {
        config.kv.depth = depth;
    }
    if let Some(filter) = &args.kvfilter {
        config.kv.filter = filter.clone();
    }
    if !config.kv.enabled && (args.kvdepth.is_some() || args.kvfilter.is_some()) {
        warn!("--kvdepth and --kvfilter have no effect without --kvdetails");
    }
    Ok(config)
}
