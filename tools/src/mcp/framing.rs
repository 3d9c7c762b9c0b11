//! Message framing for the MCP stdio transport
//!
//! Accepts LSP-style `Content-Length` frames and newline-delimited JSON.
//! Responses are written in whichever format the client used.

use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// `Content-Length: N\r\n\r\n` followed by N bytes
    ContentLength,
    /// One JSON object per line
    Ndjson,
}

/// Read one framed message. `Ok(None)` on EOF.
pub async fn read_message<R>(reader: &mut R) -> io::Result<Option<(Vec<u8>, WireFormat)>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(len) = trimmed.strip_prefix("Content-Length:") {
            let len: usize = len.trim().parse().map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidData, "Invalid Content-Length header")
            })?;

            // Skip remaining headers up to the blank separator line
            loop {
                let mut header = String::new();
                if reader.read_line(&mut header).await? == 0 {
                    return Ok(None);
                }
                if header.trim().is_empty() {
                    break;
                }
            }

            let mut body = vec![0u8; len];
            reader.read_exact(&mut body).await?;
            return Ok(Some((body, WireFormat::ContentLength)));
        }

        if trimmed.starts_with('{') {
            return Ok(Some((trimmed.as_bytes().to_vec(), WireFormat::Ndjson)));
        }

        let preview: String = trimmed.chars().take(50).collect();
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Unknown message format, expected Content-Length or JSON, got: {preview}"),
        ));
    }
}

/// Serialize `message` and write it in `format`, then flush
pub async fn write_message<W, T>(writer: &mut W, message: &T, format: WireFormat) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
    T: serde::Serialize,
{
    let body = serde_json::to_vec(message)?;

    match format {
        WireFormat::ContentLength => {
            let header = format!("Content-Length: {}\r\n\r\n", body.len());
            writer.write_all(header.as_bytes()).await?;
            writer.write_all(&body).await?;
        }
        WireFormat::Ndjson => {
            writer.write_all(&body).await?;
            writer.write_all(b"\n").await?;
        }
    }

    writer.flush().await
}
