//! Command-line surface

pub mod commands;
pub mod context;
pub mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use commands::config::ConfigCommands;
use commands::link::LinkArgs;
use commands::list::ListArgs;
use commands::pick::PickArgs;
use commands::query::QueryCommands;

#[derive(Parser, Debug)]
#[command(
    name = "stakeholder-linker",
    version,
    about = "Link Dynamics 365 stakeholders to an opportunity"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List stakeholders not yet linked to the opportunity
    List(ListArgs),
    /// Print the FetchXML used to find unlinked stakeholders
    Query(QueryCommands),
    /// Link stakeholders by row number or id
    Link(LinkArgs),
    /// Interactively search, select and link stakeholders
    Pick(PickArgs),
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    JsonCompact,
    Csv,
}
