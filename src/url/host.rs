use std::borrow::Cow;

const HTTP_PREFIX: &str = "http://";

/// Returns the authority (`host` or `host:port`) of an `http://` address
///
/// The authority ends at the first `/` or `?` after the scheme. Returns
/// `None` for anything that does not start with `http://` or carries an
/// empty authority.
///
/// # Examples
///
/// ```
/// use linkspider::url::host_of;
///
/// assert_eq!(host_of("http://example.com/a/b"), Some("example.com"));
/// assert_eq!(host_of("http://127.0.0.1:8080"), Some("127.0.0.1:8080"));
/// assert_eq!(host_of("ftp://example.com/"), None);
/// ```
pub fn host_of(address: &str) -> Option<&str> {
    let rest = address.strip_prefix(HTTP_PREFIX)?;
    let end = rest.find(['/', '?']).unwrap_or(rest.len());
    let host = &rest[..end];

    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Returns the request path of an `http://` address
///
/// An address without a path yields `/`. A query that directly follows the
/// authority is rooted (`http://h?q` yields `/?q`).
pub fn path_of(address: &str) -> Cow<'_, str> {
    let rest = address.strip_prefix(HTTP_PREFIX).unwrap_or(address);

    match rest.find(['/', '?']) {
        Some(idx) if rest[idx..].starts_with('/') => Cow::Borrowed(&rest[idx..]),
        Some(idx) => Cow::Owned(format!("/{}", &rest[idx..])),
        None => Cow::Borrowed("/"),
    }
}

/// Splits an authority into host name and port
///
/// Authorities without an explicit port, or with one that does not parse,
/// fall back to `default_port`.
pub fn split_host_port(authority: &str, default_port: u16) -> (&str, u16) {
    match authority.rsplit_once(':') {
        Some((name, port)) if !name.is_empty() => match port.parse::<u16>() {
            Ok(port) => (name, port),
            Err(_) => (authority, default_port),
        },
        _ => (authority, default_port),
    }
}
