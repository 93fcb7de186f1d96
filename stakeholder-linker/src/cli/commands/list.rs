//! `list` command

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use std::fs;
use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::cli::context::build_controller;
use crate::cli::output::{format_stakeholders, print_header};
use stakeholder_linker::config::Config;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Opportunity id
    #[arg(long)]
    pub parent: String,

    /// Only rows whose name or GUID contains this text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Opportunity title shown above the table
    #[arg(long)]
    pub title: Option<String>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn handle_list_command(args: ListArgs, config: &Config) -> Result<()> {
    let mut controller = build_controller(config, &args.parent)?;
    controller.load().await;
    if let Some(term) = args.search {
        controller.state_mut().set_search_term(term);
    }

    let state = controller.state();
    if let Some(error) = state.last_fetch_error() {
        eprintln!(
            "{} Could not load stakeholders, showing an empty list: {}",
            "Warning:".yellow().bold(),
            error
        );
    }

    let formatted = format_stakeholders(state.display(), args.format)?;

    match args.output {
        Some(path) => {
            fs::write(&path, &formatted)
                .with_context(|| format!("Failed to write output to: {}", path.display()))?;
            println!(
                "{} rows saved to: {}",
                state.display().len(),
                path.display().to_string().bright_green()
            );
        }
        None => {
            if args.format == OutputFormat::Table {
                print_header(args.title.as_deref(), controller.parent_id());
            }
            println!("{}", formatted);
        }
    }

    Ok(())
}
