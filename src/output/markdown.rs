//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a crawl:
//! run metadata, statistics, and the invalid links grouped by status.

use crate::crawler::{CrawlReport, InvalidLink};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Writes a markdown summary of `report` to `output_path`
///
/// # Arguments
///
/// * `base_address` - The address the crawl started from
/// * `report` - The finished crawl
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(io::Error)` - Failed to create or write the file
pub fn generate_markdown_summary(
    base_address: &str,
    report: &CrawlReport,
    output_path: &Path,
) -> io::Result<()> {
    let markdown = format_markdown_summary(base_address, report, Utc::now());

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Wrote crawl summary to {}", output_path.display());
    Ok(())
}

/// Formats a crawl report as markdown
///
/// # Arguments
///
/// * `base_address` - The address the crawl started from
/// * `report` - The finished crawl
/// * `finished_at` - Timestamp recorded in the run information
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_summary(
    base_address: &str,
    report: &CrawlReport,
    finished_at: DateTime<Utc>,
) -> String {
    let stats = &report.stats;
    let mut md = String::new();

    md.push_str("# Linkspider Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Base Address**: {}\n", base_address));
    md.push_str(&format!("- **Finished**: {}\n", finished_at.to_rfc3339()));
    md.push_str(&format!("- **Duration**: {} ms\n\n", stats.elapsed_ms()));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Addresses Visited | {} |\n", stats.urls_visited));
    md.push_str(&format!("| Pages Expanded | {} |\n", stats.pages_expanded));
    md.push_str(&format!("| Non-HTML Pages | {} |\n", stats.non_html_pages));
    md.push_str(&format!("| Links Found | {} |\n", stats.links_found));
    md.push_str(&format!("| GET Requests | {} |\n", stats.get_requests));
    md.push_str(&format!("| HEAD Requests | {} |\n", stats.head_requests));
    md.push_str(&format!("| Invalid Links | {} |\n", stats.invalid_links));
    md.push_str(&format!(
        "| Network Failures | {} |\n\n",
        stats.network_failures
    ));

    if report.invalid_links.is_empty() {
        md.push_str("No invalid links found.\n");
        return md;
    }

    md.push_str("## Invalid Links\n\n");
    for (status, links) in group_by_status(&report.invalid_links) {
        if status == 0 {
            md.push_str(&format!("### Network failure ({})\n\n", links.len()));
        } else {
            md.push_str(&format!("### Status {} ({})\n\n", status, links.len()));
        }

        md.push_str("| Target | Found On | Line |\n");
        md.push_str("|--------|----------|------|\n");
        for invalid in links {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                invalid.link.target, invalid.link.page_url, invalid.link.line
            ));
        }
        md.push('\n');
    }

    md
}

/// Groups links by status, ascending, keeping recording order within a group
fn group_by_status(links: &[InvalidLink]) -> BTreeMap<u16, Vec<&InvalidLink>> {
    let mut groups: BTreeMap<u16, Vec<&InvalidLink>> = BTreeMap::new();
    for invalid in links {
        groups.entry(invalid.status).or_default().push(invalid);
    }
    groups
}
