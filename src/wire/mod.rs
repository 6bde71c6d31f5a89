//! HTTP/1.x wire client
//!
//! This module speaks HTTP directly over TCP sockets:
//! - Framing `GET`/`HEAD` requests
//! - Parsing the status line and the headers the crawler cares about
//! - Decoding bodies framed by `Content-Length`, chunked transfer-encoding,
//!   or end-of-stream (with a read timeout)
//! - Pooling one idle connection set per host and retrying once on a
//!   fresh connection when a request fails mid-flight

mod body;
mod client;
mod header;
mod pool;

pub use body::{read_body, read_chunked, read_exact_or_skip, read_until_eof};
pub use client::{build_request, Method, WireClient};
pub use header::{read_header, Framing, Header};
pub use pool::{Connection, ConnectionPool};

/// A fetched page: the parsed header plus whatever body was kept
///
/// Bodies are only buffered for successful HTML responses; every other
/// response carries an empty body even when the server sent one.
#[derive(Debug, Clone)]
pub struct Page {
    pub header: Header,
    body: Vec<u8>,
}

impl Page {
    pub fn new(header: Header, body: Vec<u8>) -> Self {
        Self { header, body }
    }

    pub fn status(&self) -> u16 {
        self.header.status
    }

    pub fn is_html(&self) -> bool {
        self.header.is_html()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as UTF-8, with invalid sequences replaced
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
