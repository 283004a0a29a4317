use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use jscd::cli::args::{parse_define, Cli, Commands, EnvironmentArg, OutputFormat};
use jscd::cli::output::OutputFormatter;
use jscd::compile::externs::load_builtins;
use jscd::daemon::codec::FrameCodec;
use jscd::daemon::protocol::BuildRequest;
use jscd::daemon::server::Daemon;
use jscd::engine::passthrough::PassthroughEngine;

// One request at a time, by design: a single-threaded runtime is all the
// daemon ever needs.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries protocol frames; everything we log goes to stderr.
    let filter = if cli.verbose { "jscd=debug" } else { "jscd=info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { externs_dir, environment, max_frame_size } => {
            serve(externs_dir, environment, max_frame_size).await
        }
        Commands::Check {
            files,
            base_dir,
            defines,
            entry_points,
            source_map,
            format,
            externs_dir,
            environment,
        } => check(files, &base_dir, &defines, entry_points, source_map, format, externs_dir, environment),
    }
}

async fn serve(
    externs_dir: Option<PathBuf>,
    environment: EnvironmentArg,
    max_frame_size: Option<u32>,
) -> Result<()> {
    let externs = load_builtins(environment.into(), externs_dir.as_deref())
        .context("could not load builtin externs")?;
    tracing::info!(externs = externs.len(), "daemon ready, awaiting requests");

    let codec = max_frame_size.map_or_else(FrameCodec::new, FrameCodec::with_max_frame_size);
    let mut daemon = Daemon::with_codec(PassthroughEngine, externs, codec);
    daemon.run(tokio::io::stdin(), tokio::io::stdout()).await
}

#[allow(clippy::too_many_arguments)]
fn check(
    files: Vec<String>,
    base_dir: &Path,
    defines: &[String],
    entry_points: Vec<String>,
    source_map: String,
    format: OutputFormat,
    externs_dir: Option<PathBuf>,
    environment: EnvironmentArg,
) -> Result<()> {
    let externs = load_builtins(environment.into(), externs_dir.as_deref())
        .context("could not load builtin externs")?;

    let defines = defines.iter().map(|spec| parse_define(spec)).collect::<Result<Vec<_>>>()?;

    let request = BuildRequest {
        base_directory: base_dir.display().to_string(),
        files,
        defines,
        entry_points,
        output_source_map: source_map,
    };

    let response = jscd::compile::compile(&PassthroughEngine, &externs, &request);
    let failed = response.has_errors();

    println!("{}", OutputFormatter::new(format).format_response(&response));

    if failed {
        anyhow::bail!("compilation failed");
    }
    Ok(())
}
