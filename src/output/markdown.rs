//! Markdown report generation
//!
//! This module writes human-readable reports of finished searches:
//! - A session export with the statistics and every site's properties
//! - A history export listing stored summaries for one search term

use crate::output::stats::format_mean;
use crate::output::traits::{ExportSink, OutputError, OutputResult, SessionReport, Summary};
use chrono::{NaiveDate, Utc};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Writes markdown reports into an export directory
#[derive(Debug, Clone)]
pub struct MarkdownExporter {
    export_dir: PathBuf,
}

impl MarkdownExporter {
    /// Creates an exporter writing into `export_dir`
    ///
    /// The directory is created on first export if it does not exist.
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    fn write(&self, file_name: &str, markdown: &str) -> OutputResult<PathBuf> {
        fs::create_dir_all(&self.export_dir)?;

        let path = self.export_dir.join(file_name);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => {
                    OutputError::Write(format!("{} already exists", path.display()))
                }
                _ => OutputError::Io(e),
            })?;
        file.write_all(markdown.as_bytes())?;

        tracing::info!("Wrote {}", path.display());
        Ok(path)
    }
}

impl ExportSink for MarkdownExporter {
    fn export_session(&self, report: &SessionReport) -> OutputResult<PathBuf> {
        let file_name = format!(
            "search_{}_export.md",
            report.summary.timestamp.timestamp_millis()
        );
        self.write(&file_name, &format_session_report(report))
    }

    fn export_history(
        &self,
        destination: &str,
        date: NaiveDate,
        history: &[Summary],
    ) -> OutputResult<PathBuf> {
        let file_name = format!(
            "search_term_history_{}_export.md",
            Utc::now().timestamp_millis()
        );
        self.write(&file_name, &format_history(destination, date, history))
    }
}

/// Formats a session report as markdown
///
/// # Arguments
///
/// * `report` - The finished session
///
/// # Returns
///
/// A formatted markdown string
pub fn format_session_report(report: &SessionReport) -> String {
    let summary = &report.summary;
    let mut md = String::new();

    md.push_str("# Stay-Scout Search Export\n\n");

    md.push_str("## Search Terms\n\n");
    if let Some(id) = summary.id {
        md.push_str(&format!("- **Search id**: {}\n", id));
    }
    md.push_str(&format!("- **Destination**: {}\n", summary.destination));
    md.push_str(&format!(
        "- **Date**: {}\n",
        summary.date.format(crate::session::DATE_FORMAT)
    ));
    md.push_str(&format!(
        "- **Searched at**: {}\n\n",
        summary.timestamp.to_rfc3339()
    ));

    md.push_str("## Statistics\n\n");
    push_statistics(&mut md, summary);
    md.push('\n');

    for outcome in &report.outcomes {
        md.push_str(&format!("## Properties found in {}\n\n", outcome.site));
        md.push_str(&format!(
            "{} properties, {} requests, {}\n\n",
            outcome.properties.len(),
            outcome.pages_fetched,
            outcome.stop_reason
        ));

        if outcome.properties.is_empty() {
            continue;
        }

        md.push_str("| Name | Score | Price |\n");
        md.push_str("|------|-------|-------|\n");
        for property in outcome.properties.iter() {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&property.name),
                format_mean(property.score),
                format_mean(property.price)
            ));
        }
        md.push('\n');
    }

    md
}

/// Formats stored summaries for one search term as markdown
pub fn format_history(destination: &str, date: NaiveDate, history: &[Summary]) -> String {
    let mut md = String::new();

    md.push_str("# Stay-Scout Search History\n\n");
    md.push_str(&format!("- **Destination**: {}\n", destination));
    md.push_str(&format!(
        "- **Date**: {}\n",
        date.format(crate::session::DATE_FORMAT)
    ));
    md.push_str(&format!("- **Searches**: {}\n\n", history.len()));

    if history.is_empty() {
        md.push_str("No previous searches for these terms.\n");
        return md;
    }

    md.push_str("| Searched at | Found | Unavailable | Mean score | Mean price |\n");
    md.push_str("|-------------|-------|-------------|------------|------------|\n");
    for summary in history {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            summary.timestamp.format("%Y-%m-%d %H:%M:%S"),
            summary.properties_found,
            summary.unavailable_properties,
            format_mean(summary.score_mean),
            format_mean(summary.price_mean)
        ));
    }

    md
}

fn push_statistics(md: &mut String, summary: &Summary) {
    md.push_str(&format!(
        "- **Properties found**: {}\n",
        summary.properties_found
    ));
    md.push_str(&format!(
        "- **Unavailable properties**: {}\n",
        summary.unavailable_properties
    ));
    md.push_str(&format!(
        "- **Mean score**: {}\n",
        format_mean(summary.score_mean)
    ));
    md.push_str(&format!(
        "- **Mean price**: {}\n",
        format_mean(summary.price_mean)
    ));
}

// Names come from third-party pages and may contain table syntax
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
