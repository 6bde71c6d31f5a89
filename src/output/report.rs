//! Console report
//!
//! One line per invalid link followed by a `TIME` line:
//!
//! ```text
//! http://example.com/about/ 404 http://example.com/ 12
//! http://other.com/gone 000 http://example.com/links.html 3
//! TIME 1520
//! ```

use crate::crawler::InvalidLink;
use std::io::{self, Write};

/// Formats one invalid link as a report line (without the newline)
///
/// The status is zero-padded to three digits so network failures print
/// as `000`.
pub fn format_invalid_link(invalid: &InvalidLink) -> String {
    invalid.to_string()
}

/// Writes the full report to `out`
///
/// # Arguments
///
/// * `out` - Destination, normally a locked stdout
/// * `links` - Invalid links in the order they were recorded
/// * `elapsed_ms` - Crawl duration for the trailing `TIME` line
pub fn write_report<W: Write>(out: &mut W, links: &[InvalidLink], elapsed_ms: u128) -> io::Result<()> {
    for invalid in links {
        writeln!(out, "{}", format_invalid_link(invalid))?;
    }
    writeln!(out, "TIME {}", elapsed_ms)?;
    out.flush()
}
