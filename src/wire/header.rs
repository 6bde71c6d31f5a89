//! Response header parsing

use crate::{WireError, WireResult};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Upper bound on a response header block
const MAX_HEADER_BYTES: usize = 64 * 1024;

/// Parsed response metadata
///
/// Only the fields the crawler acts on are kept; all other header lines
/// are ignored. Absent fields stay at their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    /// Protocol version without the `HTTP/` prefix (`"1.1"`)
    pub version: String,

    /// Numeric status code
    pub status: u16,

    /// Media type, lowercased, without parameters (`"text/html"`)
    pub content_type: Option<String>,

    /// Declared body length
    pub content_length: Option<u64>,

    /// `Connection` directive, lowercased
    pub connection: Option<String>,

    /// `Transfer-Encoding` value, lowercased
    pub transfer_encoding: Option<String>,
}

/// How the body following a header is delimited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// No body follows (HEAD responses, 1xx, 204, 304)
    Empty,
    /// Chunked transfer-encoding
    Chunked,
    /// Exactly this many bytes
    Length(u64),
    /// Everything up to end-of-stream
    UntilEof,
}

impl Header {
    /// Parses a complete header block (status line plus header lines)
    ///
    /// # Errors
    ///
    /// * `MalformedStatusLine` - the first line is not `HTTP/<version> <code>`
    /// * `UnsupportedVersion` - the version is neither 1.0 nor 1.1
    /// * `MalformedHeader` - a `Content-Length` value is not a number
    pub fn parse(block: &str) -> WireResult<Self> {
        let mut lines = block.lines().map(|l| l.trim_end_matches('\r'));

        let status_line = lines.next().unwrap_or_default();
        let mut parts = status_line.split_whitespace();

        let version = parts
            .next()
            .and_then(|p| p.strip_prefix("HTTP/"))
            .ok_or_else(|| WireError::MalformedStatusLine(status_line.to_string()))?;
        let status = parts
            .next()
            .and_then(|code| code.parse::<u16>().ok())
            .ok_or_else(|| WireError::MalformedStatusLine(status_line.to_string()))?;

        if version != "1.1" && version != "1.0" {
            return Err(WireError::UnsupportedVersion(version.to_string()));
        }

        let mut header = Header {
            version: version.to_string(),
            status,
            ..Default::default()
        };

        for line in lines {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match name.trim().to_ascii_lowercase().as_str() {
                "content-type" => {
                    let media_type = value.split(';').next().unwrap_or_default().trim();
                    header.content_type = Some(media_type.to_ascii_lowercase());
                }
                "content-length" => {
                    let length = value.parse::<u64>().map_err(|_| {
                        WireError::MalformedHeader(format!("Content-Length: {}", value))
                    })?;
                    header.content_length = Some(length);
                }
                "connection" => header.connection = Some(value.to_ascii_lowercase()),
                "transfer-encoding" => {
                    header.transfer_encoding = Some(value.to_ascii_lowercase())
                }
                _ => {}
            }
        }

        Ok(header)
    }

    pub fn is_chunked(&self) -> bool {
        self.transfer_encoding
            .as_deref()
            .is_some_and(|te| te.split(',').any(|coding| coding.trim() == "chunked"))
    }

    /// Whether the body is HTML; an unspecified content-type counts as HTML
    pub fn is_html(&self) -> bool {
        match self.content_type.as_deref() {
            None | Some("") => true,
            Some(media_type) => media_type == "text/html",
        }
    }

    /// Selects the body framing: chunked, then length, then end-of-stream
    pub fn framing(&self) -> Framing {
        if (100..200).contains(&self.status) || self.status == 204 || self.status == 304 {
            Framing::Empty
        } else if self.is_chunked() && self.version == "1.1" {
            Framing::Chunked
        } else if let Some(length) = self.content_length {
            Framing::Length(length)
        } else {
            Framing::UntilEof
        }
    }

    /// Whether the server is willing to keep the connection open
    pub fn keep_alive(&self) -> bool {
        match self.connection.as_deref() {
            Some(directive) if directive.contains("close") => false,
            Some(directive) if directive.contains("keep-alive") => true,
            _ => self.version == "1.1",
        }
    }
}

/// Reads a header block up to the blank line that ends it and parses it
///
/// # Errors
///
/// Returns `UnexpectedEof` if the stream ends before the blank line, and
/// `MalformedHeader` if the block grows past 64 KiB.
pub async fn read_header<R>(reader: &mut R) -> WireResult<Header>
where
    R: AsyncBufRead + Unpin,
{
    let mut block = Vec::with_capacity(512);

    loop {
        let start = block.len();
        let read = reader.read_until(b'\n', &mut block).await?;
        if read == 0 {
            return Err(WireError::UnexpectedEof);
        }

        let line = &block[start..];
        if line == b"\r\n" || line == b"\n" {
            // Tolerate stray blank lines left ahead of the status line
            if start == 0 {
                block.clear();
                continue;
            }
            break;
        }

        if block.len() > MAX_HEADER_BYTES {
            return Err(WireError::MalformedHeader(format!(
                "header block exceeds {} bytes",
                MAX_HEADER_BYTES
            )));
        }
    }

    let block = String::from_utf8_lossy(&block);
    tracing::trace!("Response header: {:?}", block);
    Header::parse(&block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[test]
    fn test_parse_full_header() {
        let header = Header::parse(
            "HTTP/1.1 200 OK\r\n\
             Content-Type: text/html; charset=UTF-8\r\n\
             Content-Length: 42\r\n\
             Connection: keep-alive\r\n\
             Server: test\r\n",
        )
        .unwrap();

        assert_eq!(header.version, "1.1");
        assert_eq!(header.status, 200);
        assert_eq!(header.content_type.as_deref(), Some("text/html"));
        assert_eq!(header.content_length, Some(42));
        assert_eq!(header.connection.as_deref(), Some("keep-alive"));
        assert!(header.transfer_encoding.is_none());
    }

    #[test]
    fn test_header_names_are_case_insensitive() {
        let header = Header::parse(
            "HTTP/1.1 404 Not Found\r\nCONTENT-TYPE: TEXT/HTML\r\ntransfer-encoding: Chunked\r\n",
        )
        .unwrap();

        assert_eq!(header.status, 404);
        assert!(header.is_html());
        assert!(header.is_chunked());
    }

    #[test]
    fn test_defaults_when_fields_absent() {
        let header = Header::parse("HTTP/1.0 301 Moved\r\n").unwrap();

        assert_eq!(header.version, "1.0");
        assert!(header.content_type.is_none());
        assert!(header.content_length.is_none());
        assert_eq!(header.framing(), Framing::UntilEof);
    }

    #[test]
    fn test_malformed_status_line() {
        assert!(matches!(
            Header::parse("garbage\r\n"),
            Err(WireError::MalformedStatusLine(_))
        ));
        assert!(matches!(
            Header::parse("HTTP/1.1 abc\r\n"),
            Err(WireError::MalformedStatusLine(_))
        ));
    }

    #[test]
    fn test_unsupported_version() {
        assert!(matches!(
            Header::parse("HTTP/2 200\r\n"),
            Err(WireError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_bad_content_length() {
        assert!(matches!(
            Header::parse("HTTP/1.1 200 OK\r\nContent-Length: lots\r\n"),
            Err(WireError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_framing_precedence() {
        let chunked_and_length = Header::parse(
            "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nContent-Length: 10\r\n",
        )
        .unwrap();
        assert_eq!(chunked_and_length.framing(), Framing::Chunked);

        let length = Header::parse("HTTP/1.1 200 OK\r\nContent-Length: 10\r\n").unwrap();
        assert_eq!(length.framing(), Framing::Length(10));

        let no_content = Header::parse("HTTP/1.1 204 No Content\r\n").unwrap();
        assert_eq!(no_content.framing(), Framing::Empty);
    }

    #[test]
    fn test_is_html() {
        let mut header = Header::default();
        assert!(header.is_html());

        header.content_type = Some("text/html".to_string());
        assert!(header.is_html());

        header.content_type = Some("application/pdf".to_string());
        assert!(!header.is_html());
    }

    #[test]
    fn test_keep_alive() {
        let http11 = Header::parse("HTTP/1.1 200 OK\r\n").unwrap();
        assert!(http11.keep_alive());

        let closing = Header::parse("HTTP/1.1 200 OK\r\nConnection: close\r\n").unwrap();
        assert!(!closing.keep_alive());

        let http10 = Header::parse("HTTP/1.0 200 OK\r\n").unwrap();
        assert!(!http10.keep_alive());

        let http10_kept = Header::parse("HTTP/1.0 200 OK\r\nConnection: Keep-Alive\r\n").unwrap();
        assert!(http10_kept.keep_alive());
    }

    #[tokio::test]
    async fn test_read_header_stops_at_blank_line() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello";
        let mut reader = BufReader::new(&raw[..]);

        let header = read_header(&mut reader).await.unwrap();
        assert_eq!(header.content_length, Some(5));

        let mut rest = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut reader, &mut rest)
            .await
            .unwrap();
        assert_eq!(rest, "hello");
    }

    #[tokio::test]
    async fn test_read_header_eof() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Le";
        let mut reader = BufReader::new(&raw[..]);

        assert!(matches!(
            read_header(&mut reader).await,
            Err(WireError::UnexpectedEof)
        ));
    }
}
