//! `config` command

use anyhow::{Result, bail};
use clap::Subcommand;
use colored::*;
use std::path::Path;

use stakeholder_linker::config::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print where the config file is read from
    Path,
    /// Print the effective config (file plus environment), secrets redacted
    Show,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

const REDACTED: &str = "********";

pub fn handle_config_command(command: ConfigCommands, config: &Config, path: &Path) -> Result<()> {
    match command {
        ConfigCommands::Path => {
            let marker = if path.exists() {
                "".normal()
            } else {
                " (not created yet)".dimmed()
            };
            println!("{}{}", path.display(), marker);
        }
        ConfigCommands::Show => {
            println!("{}", redacted(config).to_toml()?);
        }
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                bail!(
                    "Config file already exists at {}; pass --force to overwrite",
                    path.display()
                );
            }
            Config::default().save(path)?;
            println!(
                "Config written to: {}",
                path.display().to_string().bright_green()
            );
        }
    }
    Ok(())
}

fn redacted(config: &Config) -> Config {
    let mut copy = config.clone();
    if copy.auth.access_token.is_some() {
        copy.auth.access_token = Some(REDACTED.to_string());
    }
    if copy.auth.client_secret.is_some() {
        copy.auth.client_secret = Some(REDACTED.to_string());
    }
    copy
}
