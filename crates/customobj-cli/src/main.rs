use clap::Parser;
use tracing::Level;

mod cli;
mod commands;
mod config;
mod statefile;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    customobj_reconcile::guard::init();

    commands::run_command(cli)
}
