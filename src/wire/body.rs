//! Body decoders for the three framing rules
//!
//! Each decoder either materializes the body or consumes it unread, so the
//! connection is left positioned at the next response either way.

use crate::wire::header::Framing;
use crate::{WireError, WireResult};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt};

const READ_BUF_SIZE: usize = 10 * 1024;

/// Reads a response body according to its framing
///
/// # Arguments
///
/// * `reader` - The connection, positioned just after the header block
/// * `framing` - How the body is delimited
/// * `keep` - Whether to buffer the body or discard it
/// * `eof_timeout` - Read timeout used only for `Framing::UntilEof`
///
/// # Returns
///
/// The body bytes (empty when `keep` is false)
pub async fn read_body<R>(
    reader: &mut R,
    framing: Framing,
    keep: bool,
    eof_timeout: Duration,
) -> WireResult<Vec<u8>>
where
    R: AsyncBufRead + Unpin,
{
    let mut body = Vec::new();
    let sink = keep.then_some(&mut body);

    match framing {
        Framing::Empty => {}
        Framing::Chunked => read_chunked(reader, sink).await?,
        Framing::Length(length) => read_exact_or_skip(reader, length, sink).await?,
        Framing::UntilEof => read_until_eof(reader, sink, eof_timeout).await?,
    }

    Ok(body)
}

/// Decodes a chunked body
///
/// Reads a hexadecimal size line, then exactly that many data bytes, then
/// the CRLF that closes the chunk, until a zero-size chunk arrives. Chunk
/// extensions are ignored and trailer lines are consumed.
pub async fn read_chunked<R>(reader: &mut R, mut sink: Option<&mut Vec<u8>>) -> WireResult<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Err(WireError::UnexpectedEof);
        }

        let size_field = line.split(';').next().unwrap_or_default().trim();
        let size = u64::from_str_radix(size_field, 16)
            .map_err(|_| WireError::MalformedChunk(line.trim_end().to_string()))?;

        if size == 0 {
            break;
        }

        read_exact_or_skip(reader, size, sink.as_deref_mut()).await?;

        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Err(WireError::UnexpectedEof);
        }
        if !line.trim().is_empty() {
            return Err(WireError::MalformedChunk(line.trim_end().to_string()));
        }
    }

    // Trailer section, ended by a blank line
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 || line.trim().is_empty() {
            break;
        }
        tracing::trace!("Ignoring chunked trailer: {}", line.trim_end());
    }

    Ok(())
}

/// Reads exactly `length` bytes into `sink`, or skips them if there is none
pub async fn read_exact_or_skip<R>(
    reader: &mut R,
    length: u64,
    sink: Option<&mut Vec<u8>>,
) -> WireResult<()>
where
    R: AsyncRead + Unpin,
{
    let mut limited = reader.take(length);

    let copied = match sink {
        Some(buf) => limited.read_to_end(buf).await? as u64,
        None => tokio::io::copy(&mut limited, &mut tokio::io::sink()).await?,
    };

    if copied < length {
        return Err(WireError::UnexpectedEof);
    }

    Ok(())
}

/// Reads until end-of-stream or until a read stalls for `timeout`
///
/// Used for responses that declare neither a length nor chunking; the
/// timeout keeps a persistent connection that never closes from blocking
/// the caller forever. A stall counts as the end of the body.
pub async fn read_until_eof<R>(
    reader: &mut R,
    mut sink: Option<&mut Vec<u8>>,
    timeout: Duration,
) -> WireResult<()>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_BUF_SIZE];

    loop {
        match tokio::time::timeout(timeout, reader.read(&mut buf)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(read)) => {
                if let Some(body) = sink.as_deref_mut() {
                    body.extend_from_slice(&buf[..read]);
                }
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                tracing::debug!("No data for {:?}, treating body as complete", timeout);
                break;
            }
        }
    }

    Ok(())
}
