use std::fmt;

/// Referrer recorded for the synthetic link that starts a crawl
pub const ROOT_REFERRER: &str = "<base>";

/// Status recorded when no HTTP response could be obtained at all
pub const NETWORK_FAILURE: u16 = 0;

/// A hyperlink found on a page
///
/// `target` is always an absolute, normalized `http://` address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    /// Address of the page the link was found on
    pub page_url: String,

    /// Address the link points to
    pub target: String,

    /// 1-based line of the page the link was found on (0 for the root link)
    pub line: usize,
}

impl Link {
    pub fn new(page_url: impl Into<String>, target: impl Into<String>, line: usize) -> Self {
        Self {
            page_url: page_url.into(),
            target: target.into(),
            line,
        }
    }

    /// The synthetic link a crawl of `base_address` starts from
    pub fn root(base_address: &str) -> Self {
        Self::new(ROOT_REFERRER, base_address, 0)
    }
}

/// A link that failed to resolve, with the status it failed with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLink {
    pub link: Link,

    /// HTTP status, or `NETWORK_FAILURE` when no response was obtained
    pub status: u16,
}

impl InvalidLink {
    pub fn new(link: Link, status: u16) -> Self {
        Self { link, status }
    }

    pub fn network_failure(link: Link) -> Self {
        Self::new(link, NETWORK_FAILURE)
    }

    pub fn is_network_failure(&self) -> bool {
        self.status == NETWORK_FAILURE
    }
}

impl fmt::Display for InvalidLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:03} {} {}",
            self.link.target, self.status, self.link.page_url, self.link.line
        )
    }
}
