mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{color, export, render, stats};
use tracing_subscriber::{EnvFilter, fmt};

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match &cli.command {
        Commands::Render(args) => render::run(&cli, args),
        Commands::Export(args) => export::run(&cli, args),
        Commands::Stats(args) => stats::run(&cli, args),
        Commands::Color(args) => color::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
