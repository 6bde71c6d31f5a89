use crate::url::host::host_of;
use crate::url::normalize::normalize;
use crate::{UrlError, UrlResult};

/// Removes the fragment (`#...`) from a link
///
/// The fragment never changes which resource a link points to.
pub fn strip_anchor(link: &str) -> &str {
    match link.find('#') {
        Some(idx) => &link[..idx],
        None => link,
    }
}

/// Resolves a candidate link into an absolute, normalized `http://` address
///
/// Candidates are handled by shape:
///
/// - `http:...` is already absolute and is only normalized
/// - anything else containing `:` uses another scheme and is rejected
/// - `/...` is rooted at `base_host`
/// - everything else is relative to `base_address`
///
/// # Errors
///
/// Returns `UrlError::UnsupportedScheme` for non-http schemes and the
/// normalization error for malformed links.
pub fn try_resolve(candidate: &str, base_address: &str, base_host: &str) -> UrlResult<String> {
    let candidate = strip_anchor(candidate.trim());

    if candidate.starts_with("http:") {
        normalize(candidate)
    } else if candidate.contains(':') {
        Err(UrlError::UnsupportedScheme(candidate.to_string()))
    } else if candidate.starts_with('/') {
        normalize(&format!("http://{}{}", base_host, candidate))
    } else {
        normalize(&format!("{}{}", base_address, candidate))
    }
}

/// Resolves a candidate link, dropping it if it cannot be resolved
///
/// This is the form the crawler uses: malformed links and foreign schemes
/// are silently discarded rather than reported.
///
/// # Examples
///
/// ```
/// use linkspider::url::resolve;
///
/// let base = "http://example.com/docs/";
/// assert_eq!(
///     resolve("intro.html#top", base, "example.com").as_deref(),
///     Some("http://example.com/docs/intro.html")
/// );
/// assert_eq!(resolve("mailto:me@example.com", base, "example.com"), None);
/// ```
pub fn resolve(candidate: &str, base_address: &str, base_host: &str) -> Option<String> {
    match try_resolve(candidate, base_address, base_host) {
        Ok(resolved) => Some(resolved),
        Err(e) => {
            tracing::trace!("Dropping link {:?}: {}", candidate, e);
            None
        }
    }
}

/// Returns the directory a page's relative links are resolved against
///
/// That is the page address up to and including its last `/`. An address
/// with no path (`http://host`) resolves against `http://host/`.
pub fn page_directory(page_url: &str) -> String {
    let page_url = strip_anchor(page_url);

    let Some(host) = host_of(page_url) else {
        return page_url.to_string();
    };
    let path_start = "http://".len() + host.len();
    let path = &page_url[path_start..];

    match path.rfind('/') {
        Some(idx) => page_url[..path_start + idx + 1].to_string(),
        None => format!("{}/", &page_url[..path_start]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://example.com/dir/";
    const HOST: &str = "example.com";

    #[test]
    fn test_absolute_link() {
        assert_eq!(
            resolve("http://other.com/x/../y", BASE, HOST).as_deref(),
            Some("http://other.com/y")
        );
    }

    #[test]
    fn test_rooted_link() {
        assert_eq!(
            resolve("/about/", BASE, HOST).as_deref(),
            Some("http://example.com/about/")
        );
    }

    #[test]
    fn test_relative_link() {
        assert_eq!(
            resolve("page.html", BASE, HOST).as_deref(),
            Some("http://example.com/dir/page.html")
        );
        assert_eq!(
            resolve("../up.html", BASE, HOST).as_deref(),
            Some("http://example.com/up.html")
        );
    }

    #[test]
    fn test_anchor_stripping() {
        assert_eq!(
            resolve("page.html#section", BASE, HOST),
            resolve("page.html", BASE, HOST)
        );
        assert_eq!(
            resolve("http://other.com/a#b", BASE, HOST).as_deref(),
            Some("http://other.com/a")
        );
    }

    #[test]
    fn test_fragment_only_link_points_at_base() {
        assert_eq!(resolve("#top", BASE, HOST).as_deref(), Some(BASE));
    }

    #[test]
    fn test_other_schemes_rejected() {
        assert_eq!(resolve("https://example.com/", BASE, HOST), None);
        assert_eq!(resolve("mailto:a@b.c", BASE, HOST), None);
        assert_eq!(resolve("javascript:void(0)", BASE, HOST), None);
        assert!(matches!(
            try_resolve("ftp://x/", BASE, HOST),
            Err(UrlError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_malformed_links_dropped() {
        assert_eq!(resolve("../../../x", BASE, HOST), None);
        assert_eq!(resolve("/../x", BASE, HOST), None);
    }

    #[test]
    fn test_page_directory() {
        assert_eq!(page_directory("http://example.com/"), "http://example.com/");
        assert_eq!(
            page_directory("http://example.com/a/b.html"),
            "http://example.com/a/"
        );
        assert_eq!(page_directory("http://example.com"), "http://example.com/");
        assert_eq!(
            page_directory("http://example.com/a/"),
            "http://example.com/a/"
        );
    }
}
