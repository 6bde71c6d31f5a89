//! Integration tests for the HTTP wire client
//!
//! These tests run against hand-scripted TCP servers so that framing,
//! connection reuse and mid-request failures can be controlled byte by byte.

use linkspider::config::WireConfig;
use linkspider::{WireClient, WireError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

const HTML_OK: &str =
    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 13\r\n\r\n<p>hello</p>\n";

/// What a scripted connection does after reading one request
#[derive(Debug, Clone, Copy)]
enum Reply {
    /// Writes the response and waits for the next request
    Send(&'static str),
    /// Writes the response and closes the connection
    SendAndClose(&'static str),
    /// Writes the response and holds the connection open without writing more
    SendAndHold(&'static str),
    /// Closes the connection without responding
    Close,
}

struct TestServer {
    authority: String,
    accepts: Arc<AtomicUsize>,
    requests: mpsc::UnboundedReceiver<String>,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.authority, path)
    }

    fn accepts(&self) -> usize {
        self.accepts.load(Ordering::SeqCst)
    }
}

/// Starts a server that accepts one connection per script, in order
async fn spawn_server(scripts: Vec<Vec<Reply>>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let authority = listener.local_addr().unwrap().to_string();
    let accepts = Arc::new(AtomicUsize::new(0));
    let (tx, requests) = mpsc::unbounded_channel();

    let counter = Arc::clone(&accepts);
    tokio::spawn(async move {
        for script in scripts {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(serve_connection(stream, script, tx.clone()));
        }
    });

    TestServer {
        authority,
        accepts,
        requests,
    }
}

async fn serve_connection(stream: TcpStream, script: Vec<Reply>, tx: mpsc::UnboundedSender<String>) {
    let mut reader = BufReader::new(stream);

    for reply in script {
        let Some(request) = read_request(&mut reader).await else {
            return;
        };
        let _ = tx.send(request);

        match reply {
            Reply::Send(response) => {
                if reader.get_mut().write_all(response.as_bytes()).await.is_err() {
                    return;
                }
            }
            Reply::SendAndClose(response) => {
                let _ = reader.get_mut().write_all(response.as_bytes()).await;
                return;
            }
            Reply::SendAndHold(response) => {
                let _ = reader.get_mut().write_all(response.as_bytes()).await;
                tokio::time::sleep(Duration::from_secs(30)).await;
                return;
            }
            Reply::Close => return,
        }
    }

    // Script finished: keep the connection until the client hangs up
    let mut rest = Vec::new();
    let _ = reader.read_to_end(&mut rest).await;
}

async fn read_request(reader: &mut BufReader<TcpStream>) -> Option<String> {
    let mut request = String::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await.ok()? == 0 {
            return None;
        }
        request.push_str(&line);
        if line == "\r\n" {
            return Some(request);
        }
    }
}

fn test_config() -> WireConfig {
    WireConfig {
        connect_timeout: 1_000,
        eof_read_timeout: 200,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_request_bytes_on_the_wire() {
    let mut server = spawn_server(vec![vec![Reply::Send(HTML_OK)]]).await;
    let client = WireClient::new(test_config());

    client.get(&server.url("/a/b.html?x=1")).await.unwrap();

    let request = server.requests.recv().await.unwrap();
    assert_eq!(
        request,
        format!("GET /a/b.html?x=1 HTTP/1.1\r\nHost:{}\r\n\r\n", server.authority)
    );
}

#[tokio::test]
async fn test_missing_path_requests_root() {
    let mut server = spawn_server(vec![vec![Reply::Send(HTML_OK)]]).await;
    let client = WireClient::new(test_config());

    client.head(&server.url("")).await.unwrap();

    let request = server.requests.recv().await.unwrap();
    assert!(request.starts_with("HEAD / HTTP/1.1\r\n"), "{:?}", request);
}

#[tokio::test]
async fn test_chunked_body_decoded() {
    let server = spawn_server(vec![vec![Reply::Send(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n",
    )]])
    .await;
    let client = WireClient::new(test_config());

    let page = client.get(&server.url("/")).await.unwrap();

    assert_eq!(page.status(), 200);
    assert_eq!(page.body(), b"Wikipedia");
    assert_eq!(client.pool().idle_count(&server.authority), 1);
}

#[tokio::test]
async fn test_http10_body_read_to_eof() {
    let server = spawn_server(vec![vec![Reply::SendAndClose(
        "HTTP/1.0 200 OK\r\nContent-Type: text/html\r\n\r\n<a href=\"/x\">x</a>\n",
    )]])
    .await;
    let client = WireClient::new(test_config());

    let page = client.get(&server.url("/")).await.unwrap();

    assert_eq!(page.header.version, "1.0");
    assert_eq!(page.text(), "<a href=\"/x\">x</a>\n");
    assert_eq!(client.pool().idle_count(&server.authority), 0);
}

#[tokio::test]
async fn test_unframed_body_ends_on_read_timeout() {
    let server = spawn_server(vec![vec![Reply::SendAndHold(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n<p>partial",
    )]])
    .await;
    let client = WireClient::new(test_config());

    let started = Instant::now();
    let page = tokio::time::timeout(Duration::from_secs(5), client.get(&server.url("/")))
        .await
        .expect("read timeout should end the body")
        .unwrap();

    assert_eq!(page.body(), b"<p>partial");
    assert!(started.elapsed() < Duration::from_secs(5));
    // An EOF-framed connection is never reused
    assert_eq!(client.pool().idle_count(&server.authority), 0);
}

#[tokio::test]
async fn test_connection_reused_across_requests() {
    let server = spawn_server(vec![vec![Reply::Send(HTML_OK), Reply::Send(HTML_OK)]]).await;
    let client = WireClient::new(test_config());

    client.get(&server.url("/one.html")).await.unwrap();
    client.get(&server.url("/two.html")).await.unwrap();

    assert_eq!(server.accepts(), 1);
}

#[tokio::test]
async fn test_non_html_body_skipped_and_connection_kept() {
    let server = spawn_server(vec![vec![
        Reply::Send("HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: 5\r\n\r\nabcde"),
        Reply::Send(HTML_OK),
    ]])
    .await;
    let client = WireClient::new(test_config());

    let image = client.get(&server.url("/logo.png")).await.unwrap();
    assert!(!image.is_html());
    assert!(image.body().is_empty());

    let page = client.get(&server.url("/")).await.unwrap();
    assert_eq!(page.body(), b"<p>hello</p>\n");
    assert_eq!(server.accepts(), 1);
}

#[tokio::test]
async fn test_error_body_skipped_and_connection_kept() {
    let server = spawn_server(vec![vec![
        Reply::Send("HTTP/1.1 404 Not Found\r\nContent-Type: text/html\r\nContent-Length: 9\r\n\r\nnot found"),
        Reply::Send(HTML_OK),
    ]])
    .await;
    let client = WireClient::new(test_config());

    let missing = client.get(&server.url("/missing")).await.unwrap();
    assert_eq!(missing.status(), 404);
    assert!(missing.body().is_empty());

    client.get(&server.url("/")).await.unwrap();
    assert_eq!(server.accepts(), 1);
}

#[tokio::test]
async fn test_head_reads_no_body() {
    let server = spawn_server(vec![vec![
        Reply::Send("HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 1000\r\n\r\n"),
        Reply::Send(HTML_OK),
    ]])
    .await;
    let client = WireClient::new(test_config());

    let header = client.head(&server.url("/")).await.unwrap();
    assert_eq!(header.status, 200);
    assert_eq!(header.content_length, Some(1000));

    // The declared length must not be read from the next response
    let page = client.get(&server.url("/")).await.unwrap();
    assert_eq!(page.body(), b"<p>hello</p>\n");
}

#[tokio::test]
async fn test_dropped_connection_retried_once() {
    let server = spawn_server(vec![vec![Reply::Close], vec![Reply::Send(HTML_OK)]]).await;
    let client = WireClient::new(test_config());

    let page = client.get(&server.url("/")).await.unwrap();

    assert_eq!(page.status(), 200);
    assert_eq!(server.accepts(), 2);
}

#[tokio::test]
async fn test_stale_pooled_connection_replaced() {
    let server = spawn_server(vec![
        vec![Reply::Send(HTML_OK), Reply::Close],
        vec![Reply::Send(HTML_OK)],
    ])
    .await;
    let client = WireClient::new(test_config());

    client.get(&server.url("/one.html")).await.unwrap();
    let page = client.get(&server.url("/two.html")).await.unwrap();

    assert_eq!(page.status(), 200);
    assert_eq!(server.accepts(), 2);
}

#[tokio::test]
async fn test_second_failure_surfaces() {
    let server = spawn_server(vec![vec![Reply::Close], vec![Reply::Close]]).await;
    let client = WireClient::new(test_config());

    let result = client.get(&server.url("/")).await;

    let err = result.unwrap_err();
    assert!(err.is_retryable(), "{:?}", err);
    assert_eq!(server.accepts(), 2);
}

#[tokio::test]
async fn test_connect_failure_not_retried() {
    let client = WireClient::new(test_config());

    // Nothing listens on port 1
    let err = client.get("http://127.0.0.1:1/").await.unwrap_err();

    assert!(matches!(err, WireError::Connect { .. }), "{:?}", err);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_keep_alive_disabled() {
    let mut server = spawn_server(vec![vec![Reply::Send(HTML_OK)]]).await;
    let client = WireClient::new(WireConfig {
        keep_alive: false,
        ..test_config()
    });

    client.get(&server.url("/")).await.unwrap();

    let request = server.requests.recv().await.unwrap();
    assert!(request.contains("Connection: close\r\n"));
    assert_eq!(client.pool().idle_count(&server.authority), 0);
}

#[tokio::test]
async fn test_connection_close_header_not_pooled() {
    let server = spawn_server(vec![vec![Reply::Send(
        "HTTP/1.1 200 OK\r\nConnection: close\r\nContent-Type: text/html\r\nContent-Length: 2\r\n\r\nok",
    )]])
    .await;
    let client = WireClient::new(test_config());

    let page = client.get(&server.url("/")).await.unwrap();

    assert_eq!(page.body(), b"ok");
    assert_eq!(client.pool().idle_count(&server.authority), 0);
}
