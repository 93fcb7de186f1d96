//! `link` command: non-interactive association

use anyhow::{Result, bail};
use clap::Args;
use colored::*;
use dialoguer::Confirm;
use dialoguer::theme::ColorfulTheme;
use is_terminal::IsTerminal;

use crate::cli::context::build_controller;
use crate::cli::output::{render_table, report_outcome};
use stakeholder_linker::config::Config;
use stakeholder_linker::services::stakeholders::{AssociationOutcome, Stakeholder};

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Opportunity id
    #[arg(long)]
    pub parent: String,

    /// Stakeholder GUIDs to link (comma separated)
    #[arg(long, value_delimiter = ',', conflicts_with = "rows", required_unless_present = "rows")]
    pub ids: Vec<String>,

    /// Row numbers as printed by `list` with the same --search (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub rows: Vec<usize>,

    /// Search term applied before row numbers are resolved
    #[arg(short, long)]
    pub search: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

pub async fn handle_link_command(args: LinkArgs, config: &Config) -> Result<()> {
    let mut controller = build_controller(config, &args.parent)?;
    controller.load().await;
    if let Some(term) = &args.search {
        controller.state_mut().set_search_term(term.clone());
    }

    if let Some(error) = controller.state().last_fetch_error() {
        bail!("Could not load stakeholders: {}", error);
    }

    let rows = resolve_rows(controller.state().display(), &args.rows, &args.ids)?;
    controller.state_mut().set_selection(rows);

    let selection = controller.state().current_selection();
    if !selection.is_empty() && !args.yes {
        if !std::io::stdin().is_terminal() {
            bail!("Refusing to link without confirmation on a non-interactive terminal; pass --yes");
        }
        println!("{}", render_table(&selection));
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Link {} stakeholder(s) to {}?", selection.len(), args.parent))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let outcome = controller.associate_selected().await;
    if !report_outcome(&outcome) {
        if matches!(outcome, AssociationOutcome::NoSelection) {
            return Ok(());
        }
        bail!("Association failed");
    }

    println!(
        "{} stakeholders still unlinked",
        controller.state().display().len().to_string().bold()
    );
    Ok(())
}

/// Map 1-based row numbers, or GUIDs, onto display positions
fn resolve_rows(display: &[Stakeholder], rows: &[usize], ids: &[String]) -> Result<Vec<usize>> {
    if !rows.is_empty() {
        let mut resolved = Vec::with_capacity(rows.len());
        for row in rows {
            if *row == 0 || *row > display.len() {
                bail!("Row {} is out of range (1..={})", row, display.len());
            }
            resolved.push(row - 1);
        }
        return Ok(resolved);
    }

    let mut resolved = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.trim();
        match display.iter().position(|s| s.id.eq_ignore_ascii_case(id)) {
            Some(position) => resolved.push(position),
            None => eprintln!(
                "{} {} is not in the list (already linked, filtered out, or unknown)",
                "Warning:".yellow().bold(),
                id
            ),
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display() -> Vec<Stakeholder> {
        vec![
            Stakeholder::new("AAAA", "alice", ""),
            Stakeholder::new("bbbb", "Bob", ""),
        ]
    }

    #[test]
    fn test_rows_are_one_based() {
        assert_eq!(resolve_rows(&display(), &[2, 1], &[]).unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_row_zero_and_overflow_rejected() {
        assert!(resolve_rows(&display(), &[0], &[]).is_err());
        assert!(resolve_rows(&display(), &[3], &[]).is_err());
    }

    #[test]
    fn test_ids_match_case_insensitively_and_skip_unknown() {
        let ids = vec!["aaaa".to_string(), "zzzz".to_string(), " BBBB ".to_string()];
        assert_eq!(resolve_rows(&display(), &[], &ids).unwrap(), vec![0, 1]);
    }
}
