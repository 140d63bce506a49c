use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use csim::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let counters = csim::run(&cli)
        .with_context(|| format!("failed to simulate trace {}", cli.trace.display()))?;
    csim::io::print_summary(&counters);

    Ok(())
}
