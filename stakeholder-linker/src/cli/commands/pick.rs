//! `pick` command: interactive search, select and link loop

use anyhow::{Result, bail};
use clap::Args;
use colored::*;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, MultiSelect};
use is_terminal::IsTerminal;

use crate::cli::context::build_controller;
use crate::cli::output::{picker_label, print_header, report_outcome};
use stakeholder_linker::config::Config;

#[derive(Args, Debug)]
pub struct PickArgs {
    /// Opportunity id
    #[arg(long)]
    pub parent: String,

    /// Opportunity title shown above the list
    #[arg(long)]
    pub title: Option<String>,
}

pub async fn handle_pick_command(args: PickArgs, config: &Config) -> Result<()> {
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        bail!("`pick` needs an interactive terminal; use `list` and `link` instead");
    }

    let theme = ColorfulTheme::default();
    let mut controller = build_controller(config, &args.parent)?;
    controller.load().await;

    loop {
        print_header(args.title.as_deref(), controller.parent_id());

        if let Some(error) = controller.state().last_fetch_error() {
            eprintln!(
                "{} Could not load stakeholders: {}",
                "Warning:".yellow().bold(),
                error
            );
        }

        let term: String = Input::with_theme(&theme)
            .with_prompt("Search (name or GUID, empty for all)")
            .with_initial_text(controller.state().search_term())
            .allow_empty(true)
            .interact_text()?;
        controller.state_mut().set_search_term(term);

        let labels: Vec<String> = controller.state().display().iter().map(picker_label).collect();
        if labels.is_empty() {
            println!("{}", "No unlinked stakeholders match.".dimmed());
        } else {
            let chosen = MultiSelect::with_theme(&theme)
                .with_prompt(format!(
                    "Select stakeholders ({} shown, space to toggle, enter to confirm)",
                    labels.len()
                ))
                .items(&labels)
                .interact()?;
            controller.state_mut().set_selection(chosen);

            let count = controller.state().selection().len();
            let go = count == 0
                || Confirm::with_theme(&theme)
                    .with_prompt(format!("Link {} stakeholder(s)?", count))
                    .default(true)
                    .interact()?;
            if go {
                let outcome = controller.associate_selected().await;
                report_outcome(&outcome);
            }
        }

        let again = Confirm::with_theme(&theme)
            .with_prompt("Continue?")
            .default(true)
            .interact()?;
        if !again {
            return Ok(());
        }
    }
}
