//! Rendering stakeholder lists and association outcomes

use anyhow::{Context, Result, anyhow};
use colored::*;
use unicode_width::UnicodeWidthStr;

use super::OutputFormat;
use stakeholder_linker::services::stakeholders::{AssociationOutcome, Stakeholder};

const HEADERS: [&str; 4] = ["#", "Name", "Contact Info", "GUID"];
const MAX_NAME_WIDTH: usize = 40;
const MAX_CONTACT_WIDTH: usize = 50;

/// "Opportunity Topic Name / Record ID" banner
pub fn print_header(title: Option<&str>, parent_id: &str) {
    println!(
        "Opportunity Topic Name: {}",
        title.unwrap_or("Unknown Title").bright_white().bold()
    );
    println!("Record ID: {}", parent_id.dimmed());
    println!();
}

pub fn format_stakeholders(rows: &[Stakeholder], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(rows)),
        OutputFormat::Json => serde_json::to_string_pretty(rows).context("Failed to format JSON output"),
        OutputFormat::JsonCompact => serde_json::to_string(rows).context("Failed to format JSON output"),
        OutputFormat::Csv => render_csv(rows),
    }
}

fn render_csv(rows: &[Stakeholder]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["id", "name", "contact_info"])?;
    for row in rows {
        writer.write_record([&row.id, &row.name, &row.contact_info])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV output: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Plain-text table with 1-based row numbers (the numbers `link --rows` takes)
pub fn render_table(rows: &[Stakeholder]) -> String {
    let cells: Vec<[String; 4]> = rows
        .iter()
        .enumerate()
        .map(|(i, s)| {
            [
                (i + 1).to_string(),
                truncate(&s.name, MAX_NAME_WIDTH),
                truncate(&s.contact_info, MAX_CONTACT_WIDTH),
                s.id.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.width());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.width());
        }
    }

    let mut out = String::new();
    out.push_str(&render_row(&HEADERS.map(str::to_string), &widths));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');
    for row in &cells {
        out.push_str(&render_row(row, &widths));
        out.push('\n');
    }
    out.push_str(&format!("\nRows: {}", rows.len()));
    out
}

fn render_row(cells: &[String; 4], widths: &[usize; 4]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, width)| format!("{}{}", cell, " ".repeat(width.saturating_sub(cell.width()))))
        .collect();
    padded.join(" | ").trim_end().to_string()
}

fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    for c in text.chars() {
        if out.width() + c.to_string().width() >= max_width {
            break;
        }
        out.push(c);
    }
    out.push('…');
    out
}

/// One line per selected row, used by the interactive picker
pub fn picker_label(stakeholder: &Stakeholder) -> String {
    let contact = if stakeholder.contact_info.is_empty() {
        String::new()
    } else {
        format!(" <{}>", stakeholder.contact_info)
    };
    format!("{}{} ({})", stakeholder.name, contact, stakeholder.id)
}

/// Print the outcome; returns whether the association went through
pub fn report_outcome(outcome: &AssociationOutcome) -> bool {
    match outcome {
        AssociationOutcome::NoSelection => {
            println!(
                "{} No row is selected. Please select a row.",
                "Warning:".yellow().bold()
            );
            false
        }
        AssociationOutcome::Associated { member_count, .. } => {
            println!(
                "{} Linked {} stakeholder(s)",
                "✓".bright_green().bold(),
                member_count
            );
            true
        }
        AssociationOutcome::Failed { stage, error } => {
            eprintln!(
                "{} Failed to link stakeholders ({}): {}",
                "✗".bright_red().bold(),
                stage,
                error
            );
            false
        }
    }
}
