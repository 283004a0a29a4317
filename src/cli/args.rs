use clap::builder::styling::{AnsiColor, Styles};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::compile::externs::Environment;
use crate::daemon::protocol::{Define, DefineValue};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().bold())
    .literal(AnsiColor::Cyan.on_default().bold())
    .placeholder(AnsiColor::Cyan.on_default())
    .error(AnsiColor::Red.on_default().bold());

#[derive(Parser)]
#[command(name = "jscd")]
#[command(about = "Persistent JavaScript compiler daemon speaking length-prefixed frames over stdio")]
#[command(version)]
#[command(styles = STYLES)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve compilation requests over stdin/stdout until the peer closes the stream
    #[command(
        long_about = "Serve compilation requests over stdin/stdout. The peer (normally a \
        build server that keeps this process alive across builds) sends one framed request \
        at a time and reads one framed response back. Closing the input stream between \
        frames shuts the daemon down cleanly; any framing violation is fatal.\n\n\
        All logging goes to stderr — stdout carries protocol frames."
    )]
    Serve {
        /// Directory of additional extern files (*.js), loaded in name order
        #[arg(long, value_name = "DIR")]
        externs_dir: Option<PathBuf>,

        /// Builtin environment whose ambient declarations are loaded at startup
        #[arg(long, value_enum, default_value_t = EnvironmentArg::Browser)]
        environment: EnvironmentArg,

        /// Maximum frame size in bytes, both directions
        #[arg(long, value_name = "BYTES")]
        max_frame_size: Option<u32>,
    },

    /// Compile once and print the diagnostics (debugging aid for daemon deployments)
    #[command(
        long_about = "Run a single compilation through the same adapter the daemon uses and \
        print the resulting diagnostics, without speaking the wire protocol. Useful for \
        checking what a request would produce before pointing a build server at the daemon.\n\n\
        Exits non-zero when any ERROR-severity diagnostic is reported.\n\n\
        Examples:\n  \
        jscd check --base-dir ./game main.js util.js\n  \
        jscd check --base-dir ./game main.js --define DEBUG=false --entry-point main.js\n  \
        jscd check --base-dir ./game main.js --format json"
    )]
    Check {
        /// Source files, relative to --base-dir, in compilation order
        #[arg(required = true, num_args = 1..)]
        files: Vec<String>,

        /// Directory the relative source paths resolve against
        #[arg(long, value_name = "DIR")]
        base_dir: PathBuf,

        /// Compile-time constant NAME=VALUE (value parses as boolean, number, or string)
        #[arg(long = "define", value_name = "NAME=VALUE")]
        defines: Vec<String>,

        /// Entry point for dead-code pruning (repeatable)
        #[arg(long = "entry-point", value_name = "PATH")]
        entry_points: Vec<String>,

        /// Request a source map, to be written at this path by the client
        #[arg(long, value_name = "PATH", default_value = "")]
        source_map: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,

        /// Directory of additional extern files (*.js)
        #[arg(long, value_name = "DIR")]
        externs_dir: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = EnvironmentArg::Browser)]
        environment: EnvironmentArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum EnvironmentArg {
    Browser,
}

impl From<EnvironmentArg> for Environment {
    fn from(arg: EnvironmentArg) -> Self {
        match arg {
            EnvironmentArg::Browser => Self::Browser,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Parse a `NAME=VALUE` define from the command line.
///
/// The value tries boolean, then number, then falls back to string —
/// the same three types the wire protocol carries. The name is not
/// validated here; an empty name flows into the adapter and is rejected
/// the same way a malformed daemon request would be.
pub fn parse_define(spec: &str) -> anyhow::Result<Define> {
    let Some((name, value)) = spec.split_once('=') else {
        anyhow::bail!("define must look like NAME=VALUE, got: {spec}");
    };
    let value = match value {
        "true" => DefineValue::Boolean(true),
        "false" => DefineValue::Boolean(false),
        _ => value
            .parse::<f64>()
            .map_or_else(|_| DefineValue::String(value.to_string()), DefineValue::Number),
    };
    Ok(Define { name: name.to_string(), value: Some(value) })
}
