#![forbid(unsafe_code)]

use clap::Parser;
use config::Config;
use monotime::SystemClock;
use mtime::cli::Cli;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(cli.verbosity.tracing_level_filter().into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    debug!(config = ?cli);

    let config = match &cli.conffile {
        Some(path) => Config::load(path)?,
        _ => Config::from_env()?,
    };
    debug!(?config, "loaded configuration");

    let mut stdout = std::io::stdout().lock();
    mtime::run(&cli.command, &config, &SystemClock, &mut stdout)?;
    Ok(())
}
