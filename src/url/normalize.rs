use crate::url::host::host_of;
use crate::{UrlError, UrlResult};

/// Normalizes a link by collapsing its dot segments
///
/// # Normalization Steps
///
/// 1. Split the link on runs of `/` (`http://host/a` becomes
///    `["http:", "host", "a"]`; a leading `/` leaves an empty first segment)
/// 2. Drop every `.` segment; drop every `..` segment together with the
///    segment before it. A `..` with nothing before it is an underflow
/// 3. Re-validate the shape: an `http:` link must still start with `http:`
///    and its original host, a rooted link must still start with `/`
/// 4. Join the segments back with `/`, restoring the `//` after `http:` and
///    any trailing `/` of the input
///
/// # Arguments
///
/// * `link` - An absolute `http:` link, a rooted path, or a relative path
///
/// # Returns
///
/// * `Ok(String)` - The normalized link
/// * `Err(UrlError)` - The link climbs above its root or lost its host
///
/// # Examples
///
/// ```
/// use linkspider::url::normalize;
///
/// assert_eq!(normalize("http://host/a/../b").unwrap(), "http://host/b");
/// assert!(normalize("http://host/a/../../b").is_err());
/// ```
pub fn normalize(link: &str) -> UrlResult<String> {
    let mut segments: Vec<&str> = Vec::new();

    for (idx, segment) in link.split('/').enumerate() {
        match segment {
            // Only the leading empty segment is meaningful: it marks a rooted link
            "" if idx > 0 => continue,
            "." => continue,
            ".." => {
                if segments.pop().is_none() {
                    return Err(UrlError::Underflow(link.to_string()));
                }
            }
            _ => segments.push(segment),
        }
    }

    if link.starts_with("http:") {
        let host = host_of(link);
        if segments.first() != Some(&"http:") || host.is_none() || segments.get(1).copied() != host
        {
            return Err(UrlError::Malformed(link.to_string()));
        }
    } else if link.starts_with('/') && segments.first() != Some(&"") {
        return Err(UrlError::Malformed(link.to_string()));
    }

    let mut normalized = String::with_capacity(link.len());
    for (idx, segment) in segments.iter().enumerate() {
        if idx > 0 {
            normalized.push('/');
        }
        normalized.push_str(segment);
        if idx == 0 && *segment == "http:" {
            normalized.push('/');
        }
    }

    if link.ends_with('/') {
        normalized.push('/');
    }

    Ok(normalized)
}
