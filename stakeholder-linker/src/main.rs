mod cli;

use anyhow::Result;
use clap::Parser;
use colored::*;

use cli::commands::config::handle_config_command;
use cli::commands::link::handle_link_command;
use cli::commands::list::handle_list_command;
use cli::commands::pick::handle_pick_command;
use cli::commands::query::handle_query_command;
use cli::{Cli, Commands};
use stakeholder_linker::config::Config;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("{} {:#}", "Error:".red().bold(), error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load(Some(&config_path))?;

    match cli.command {
        Commands::List(args) => handle_list_command(args, &config).await,
        Commands::Query(args) => handle_query_command(args, &config),
        Commands::Link(args) => handle_link_command(args, &config).await,
        Commands::Pick(args) => handle_pick_command(args, &config).await,
        Commands::Config { command } => handle_config_command(command, &config, &config_path),
    }
}

/// `RUST_LOG` wins; otherwise warn, raised by `-v`/`-vv`
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
