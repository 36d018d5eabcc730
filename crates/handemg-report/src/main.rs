//! HandEMG report tool

use anyhow::{Context, Result};
use handemg_report::{run, Invocation, USAGE};
use std::io;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let invocation = match Invocation::parse(std::env::args().skip(1)) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let config = invocation.load_config().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    info!("Inputs: {} and {}", config.inputs.hand_data.display(), config.inputs.emg_data.display());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(invocation.command, &config, &mut out)
        .with_context(|| format!("'{}' failed", invocation.command))?;

    Ok(())
}
