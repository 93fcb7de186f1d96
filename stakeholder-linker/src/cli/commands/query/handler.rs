//! Query command handler

use anyhow::{Context, Result};
use colored::*;
use std::fs;

use super::QueryCommands;
use stakeholder_linker::config::Config;
use stakeholder_linker::services::stakeholders::build_unlinked_stakeholder_query;

/// Build the unlinked-stakeholder FetchXML and print or save it
pub fn handle_query_command(args: QueryCommands, config: &Config) -> Result<()> {
    let query = build_unlinked_stakeholder_query(&args.parent, &config.schema);

    let text = if args.encoded {
        query.to_options()
    } else if args.compact {
        query.to_xml()
    } else {
        pretty_xml(&query.to_xml())
    };

    if let Some(output_path) = args.output {
        fs::write(&output_path, &text)
            .with_context(|| format!("Failed to write output to: {}", output_path.display()))?;
        println!(
            "Query saved to: {}",
            output_path.display().to_string().bright_green()
        );
    } else {
        println!("{}", text);
    }

    Ok(())
}

/// Indent XML for display; falls back to the input when it can't be re-read
fn pretty_xml(xml: &str) -> String {
    let mut reader = quick_xml::reader::Reader::from_str(xml);
    let mut writer = quick_xml::Writer::new_with_indent(Vec::new(), b' ', 2);
    loop {
        match reader.read_event() {
            Ok(quick_xml::events::Event::Eof) => break,
            Ok(event) => {
                if writer.write_event(event).is_err() {
                    return xml.to_string();
                }
            }
            Err(_) => return xml.to_string(),
        }
    }
    String::from_utf8(writer.into_inner()).unwrap_or_else(|_| xml.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_xml_indents_nested_elements() {
        let pretty = pretty_xml("<fetch><entity name='a'><attribute name='b' /></entity></fetch>");
        let lines: Vec<&str> = pretty.lines().collect();
        assert_eq!(lines[0], "<fetch>");
        assert!(lines[1].starts_with("  <entity"));
        assert!(lines[2].starts_with("    <attribute"));
    }

    #[test]
    fn test_pretty_xml_falls_back_on_garbage() {
        assert_eq!(pretty_xml("<fetch><entity></fetch>"), "<fetch><entity></fetch>");
    }
}
