//! The HTTP client the crawler fetches and checks links with

use crate::config::WireConfig;
use crate::url::{host_of, path_of};
use crate::wire::body::read_body;
use crate::wire::header::{read_header, Framing, Header};
use crate::wire::pool::{Connection, ConnectionPool};
use crate::wire::Page;
use crate::{WireError, WireResult};
use std::fmt;

/// Request methods the crawler issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Head => f.write_str("HEAD"),
        }
    }
}

/// Frames a request
///
/// ```
/// use linkspider::wire::{build_request, Method};
///
/// assert_eq!(
///     build_request(Method::Get, "/a/", "example.com", true),
///     "GET /a/ HTTP/1.1\r\nHost:example.com\r\n\r\n"
/// );
/// ```
pub fn build_request(method: Method, path: &str, authority: &str, keep_alive: bool) -> String {
    if keep_alive {
        format!("{} {} HTTP/1.1\r\nHost:{}\r\n\r\n", method, path, authority)
    } else {
        format!(
            "{} {} HTTP/1.1\r\nHost:{}\r\nConnection: close\r\n\r\n",
            method, path, authority
        )
    }
}

/// HTTP/1.x client over raw TCP sockets
///
/// Connections are pooled per host. A request that fails after its socket
/// was established is retried exactly once on a freshly opened connection;
/// a second failure is returned to the caller.
#[derive(Debug)]
pub struct WireClient {
    config: WireConfig,
    pool: ConnectionPool,
}

impl WireClient {
    pub fn new(config: WireConfig) -> Self {
        let pool = ConnectionPool::new(config.max_idle_per_host);
        Self { config, pool }
    }

    /// Fetches only the header of `url`
    pub async fn head(&self, url: &str) -> WireResult<Header> {
        let page = self.execute(Method::Head, url).await?;
        Ok(page.header)
    }

    /// Fetches `url`, buffering the body only for successful HTML responses
    pub async fn get(&self, url: &str) -> WireResult<Page> {
        self.execute(Method::Get, url).await
    }

    /// The connection pool backing this client
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    async fn execute(&self, method: Method, url: &str) -> WireResult<Page> {
        let authority =
            host_of(url).ok_or_else(|| WireError::InvalidTarget(url.to_string()))?;
        let path = path_of(url);
        let request = build_request(method, &path, authority, self.config.keep_alive);

        let connection = match self.pool.checkout(authority) {
            Some(connection) => {
                tracing::trace!("Reusing pooled connection to {}", authority);
                connection
            }
            None => self.open(authority).await?,
        };

        match self.exchange(connection, method, request.as_bytes()).await {
            Ok(page) => Ok(page),
            Err(e) if e.is_retryable() => {
                tracing::debug!("{} {} failed ({}), retrying on a new connection", method, url, e);
                let connection = self.open(authority).await?;
                self.exchange(connection, method, request.as_bytes()).await
            }
            Err(e) => Err(e),
        }
    }

    async fn open(&self, authority: &str) -> WireResult<Connection> {
        Connection::open(authority, self.config.port, self.config.connect_timeout()).await
    }

    /// Sends one request and reads its complete response
    ///
    /// The connection goes back to the pool only if the response was framed
    /// so that its end is known and both sides agreed to keep it open.
    async fn exchange(
        &self,
        mut connection: Connection,
        method: Method,
        request: &[u8],
    ) -> WireResult<Page> {
        connection.send(request).await?;
        let header = read_header(connection.reader()).await?;

        let framing = match method {
            Method::Head => Framing::Empty,
            Method::Get => header.framing(),
        };
        let keep = method == Method::Get && header.status == 200 && header.is_html();

        tracing::trace!(
            "{} on {} -> {} ({:?})",
            method,
            connection.authority(),
            header.status,
            framing
        );

        let body = read_body(
            connection.reader(),
            framing,
            keep,
            self.config.eof_read_timeout(),
        )
        .await?;

        if self.config.keep_alive && header.keep_alive() && framing != Framing::UntilEof {
            self.pool.checkin(connection);
        }

        Ok(Page::new(header, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_get_request() {
        assert_eq!(
            build_request(Method::Get, "/", "example.com", true),
            "GET / HTTP/1.1\r\nHost:example.com\r\n\r\n"
        );
    }

    #[test]
    fn test_build_head_request_with_close() {
        assert_eq!(
            build_request(Method::Head, "/x?y=1", "example.com:8080", false),
            "HEAD /x?y=1 HTTP/1.1\r\nHost:example.com:8080\r\nConnection: close\r\n\r\n"
        );
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Head.to_string(), "HEAD");
    }

    #[tokio::test]
    async fn test_invalid_target() {
        let client = WireClient::new(WireConfig::default());
        assert!(matches!(
            client.get("https://example.com/").await,
            Err(WireError::InvalidTarget(_))
        ));
    }
}
