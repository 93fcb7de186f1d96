//! `query` command: show the anti-join FetchXML without running it

pub mod handler;

use clap::Args;
use std::path::PathBuf;

pub use handler::handle_query_command;

#[derive(Args, Debug)]
pub struct QueryCommands {
    /// Opportunity id the query excludes linked stakeholders for
    #[arg(long)]
    pub parent: String,

    /// Print the percent-encoded `?fetchXml=` options instead of XML
    #[arg(long)]
    pub encoded: bool,

    /// Print the XML on a single line
    #[arg(long, conflicts_with = "encoded")]
    pub compact: bool,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
