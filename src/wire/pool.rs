//! Per-host connection pool
//!
//! A connection is owned by exactly one request at a time: it is taken out
//! of the pool for the request and only put back once the response has been
//! read completely. Two tasks can therefore never interleave on one socket.

use crate::url::split_host_port;
use crate::{WireError, WireResult};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// An open socket to one host
#[derive(Debug)]
pub struct Connection {
    authority: String,
    stream: BufReader<TcpStream>,
    requests: u32,
}

impl Connection {
    /// Opens a new connection
    ///
    /// # Arguments
    ///
    /// * `authority` - `host` or `host:port`
    /// * `default_port` - Port used when the authority has none
    /// * `connect_timeout` - Limit on DNS resolution plus TCP connect
    pub async fn open(
        authority: &str,
        default_port: u16,
        connect_timeout: Duration,
    ) -> WireResult<Self> {
        let (host, port) = split_host_port(authority, default_port);

        let stream = match tokio::time::timeout(connect_timeout, TcpStream::connect((host, port)))
            .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(WireError::Connect {
                    host: authority.to_string(),
                    source,
                })
            }
            Err(_) => {
                return Err(WireError::ConnectTimeout {
                    host: authority.to_string(),
                })
            }
        };

        // Requests are written in one piece; don't hold them back
        stream.set_nodelay(true)?;

        tracing::debug!("Opened new connection to {}", authority);

        Ok(Self {
            authority: authority.to_string(),
            stream: BufReader::new(stream),
            requests: 0,
        })
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Number of requests sent on this connection so far
    pub fn requests(&self) -> u32 {
        self.requests
    }

    /// Writes a complete request
    pub async fn send(&mut self, request: &[u8]) -> WireResult<()> {
        let stream = self.stream.get_mut();
        stream.write_all(request).await?;
        stream.flush().await?;
        self.requests += 1;
        Ok(())
    }

    /// The buffered read side of the socket
    pub fn reader(&mut self) -> &mut BufReader<TcpStream> {
        &mut self.stream
    }
}

/// Idle connections, keyed by authority
#[derive(Debug)]
pub struct ConnectionPool {
    idle: Mutex<HashMap<String, Vec<Connection>>>,
    max_idle_per_host: usize,
}

impl ConnectionPool {
    pub fn new(max_idle_per_host: usize) -> Self {
        Self {
            idle: Mutex::new(HashMap::new()),
            max_idle_per_host,
        }
    }

    /// Takes an idle connection to `authority` out of the pool, if any
    pub fn checkout(&self, authority: &str) -> Option<Connection> {
        let mut idle = self.idle.lock().unwrap_or_else(|e| e.into_inner());
        idle.get_mut(authority).and_then(Vec::pop)
    }

    /// Returns a connection whose last response was fully read
    ///
    /// The connection is closed instead when the host already has
    /// `max_idle_per_host` idle connections.
    pub fn checkin(&self, connection: Connection) {
        let mut idle = self.idle.lock().unwrap_or_else(|e| e.into_inner());
        let slot = idle.entry(connection.authority.clone()).or_default();

        if slot.len() < self.max_idle_per_host {
            slot.push(connection);
        } else {
            tracing::trace!("Pool full for {}, closing connection", connection.authority);
        }
    }

    /// Number of idle connections held for `authority`
    pub fn idle_count(&self, authority: &str) -> usize {
        let idle = self.idle.lock().unwrap_or_else(|e| e.into_inner());
        idle.get(authority).map_or(0, Vec::len)
    }
}
