//! linesh CLI - run reduced shell scripts against the host system
//!
//! Usage:
//!   linesh -c 'echo hello'          # Execute a command string
//!   linesh script.sh [ARGS...]      # Execute a script file
//!
//! Builtin output goes straight to stdout/stderr; every other command is run
//! through `sh -c`. The process exits with the code given to `exit`, or 0
//! when the script runs to its end.

use anyhow::{Context, Result};
use clap::Parser;
use linesh::{ControlFlow, ExecutionLimits, Shell};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// linesh - line-oriented shell interpreter
#[derive(Parser, Debug)]
#[command(name = "linesh")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Execute the given command string
    #[arg(short = 'c')]
    command: Option<String>,

    /// Script file to execute (with -c: the value of $0)
    #[arg()]
    script: Option<PathBuf>,

    /// Arguments to pass to the script
    #[arg(trailing_var_arg = true)]
    args: Vec<String>,

    /// Maximum passes through a single while loop
    #[arg(long, default_value_t = ExecutionLimits::default().max_loop_iterations)]
    max_loop_iterations: usize,

    /// Log filter (e.g. "debug", "linesh=trace"); overrides RUST_LOG
    #[arg(long)]
    log_level: Option<String>,
}

fn init_tracing(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).context("Invalid --log-level")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref())?;

    let limits = ExecutionLimits::new().max_loop_iterations(args.max_loop_iterations);

    let (script, script_name) = match (args.command, args.script) {
        (Some(cmd), name) => {
            let name = name.map_or_else(|| "linesh".to_string(), |p| p.display().to_string());
            (cmd, name)
        }
        (None, Some(path)) => {
            let script = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read script: {}", path.display()))?;
            (script, path.display().to_string())
        }
        (None, None) => {
            eprintln!("Usage: linesh -c 'command' or linesh script.sh [ARGS...]");
            std::process::exit(1);
        }
    };

    let mut shell = Shell::builder()
        .limits(limits)
        .args(script_name, args.args)
        .inherit_output(true)
        .build();

    let result = shell
        .exec(&script)
        .await
        .context("Failed to execute script")?;

    let code = match result.control_flow {
        ControlFlow::Exit(code) => code,
        ControlFlow::None => 0,
    };
    std::process::exit(code);
}
