//! Line-oriented link extraction
//!
//! Links are found by matching `href` attributes line by line rather than
//! by parsing HTML; this keeps line numbers exact and memory flat.

use crate::crawler::link::Link;
use crate::url::{host_of, page_directory, resolve};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::VecDeque;
use std::io::BufRead;
use std::iter::FusedIterator;

// Quoted values end at their quote, unquoted ones at a space, quote, `<` or `>`
static HREF_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)href=(?:"([^"'<> ]*)"|'([^"'<> ]*)'|([^"'<> ]+))"#)
        .expect("Invalid href pattern")
});

/// Lazy, single-pass sequence of the links on one page
///
/// Each line is read only when the links of the previous one have been
/// handed out. The reader is dropped on exhaustion or on the first read
/// error, after which the iterator only yields `None`.
pub struct LinkExtractor<R> {
    reader: Option<R>,
    page_url: String,
    directory: String,
    host: String,
    line_no: usize,
    pending: VecDeque<Link>,
}

impl<R: BufRead> LinkExtractor<R> {
    /// Creates an extractor for the page at `page_url`
    ///
    /// Relative links resolve against the page's directory, rooted links
    /// against its host.
    pub fn new(reader: R, page_url: &str) -> Self {
        Self {
            reader: Some(reader),
            page_url: page_url.to_string(),
            directory: page_directory(page_url),
            host: host_of(page_url).unwrap_or_default().to_string(),
            line_no: 0,
            pending: VecDeque::new(),
        }
    }

    /// Number of lines consumed so far
    pub fn lines_read(&self) -> usize {
        self.line_no
    }

    fn scan_line(&mut self, line: &str) {
        for captures in HREF_PATTERN.captures_iter(line) {
            let Some(raw) = captures
                .get(1)
                .or_else(|| captures.get(2))
                .or_else(|| captures.get(3))
            else {
                continue;
            };

            if let Some(target) = resolve(raw.as_str(), &self.directory, &self.host) {
                self.pending
                    .push_back(Link::new(self.page_url.as_str(), target, self.line_no));
            }
        }
    }
}

impl<R: BufRead> Iterator for LinkExtractor<R> {
    type Item = Link;

    fn next(&mut self) -> Option<Link> {
        let mut buf = Vec::new();

        loop {
            if let Some(link) = self.pending.pop_front() {
                return Some(link);
            }

            let reader = self.reader.as_mut()?;
            buf.clear();

            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => {
                    self.reader = None;
                    return None;
                }
                Ok(_) => {
                    self.line_no += 1;
                    let line = String::from_utf8_lossy(&buf);
                    self.scan_line(&line);
                }
                Err(e) => {
                    tracing::debug!(
                        "Stopping link extraction on {} at line {}: {}",
                        self.page_url,
                        self.line_no,
                        e
                    );
                    self.reader = None;
                    return None;
                }
            }
        }
    }
}

impl<R: BufRead> FusedIterator for LinkExtractor<R> {}

/// Extracts the links of an in-memory page body
///
/// # Example
///
/// ```
/// use linkspider::crawler::extract_links;
///
/// let body = b"<p>\n<a href=\"b.html\">B</a> <A HREF='/c/'>C</a>\n";
/// let links: Vec<_> = extract_links(body, "http://example.com/a/index.html").collect();
///
/// assert_eq!(links[0].target, "http://example.com/a/b.html");
/// assert_eq!(links[1].target, "http://example.com/c/");
/// assert_eq!(links[1].line, 2);
/// ```
pub fn extract_links<'a>(body: &'a [u8], page_url: &str) -> LinkExtractor<&'a [u8]> {
    LinkExtractor::new(body, page_url)
}
