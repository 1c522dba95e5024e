use serde::Serialize;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest body a peer may declare. Anything larger means framing is lost.
pub const MAX_MESSAGE_BYTES: usize = if cfg!(test) { 1024 } else { 16 * 1024 * 1024 };
const MAX_HEADER_LINE_BYTES: u64 = 8 * 1024;

const CONTENT_LENGTH: &[u8] = b"content-length:";
const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

enum Header {
    ContentLength(usize),
    Other,
    Malformed,
}

const fn is_ascii_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|b| is_ascii_whitespace(*b))
}

fn parse_header(raw: &[u8]) -> Header {
    let raw = raw.strip_prefix(BOM).unwrap_or(raw);
    let Ok(line) = std::str::from_utf8(raw) else {
        return Header::Malformed;
    };
    let line = line.trim();

    if line.len() >= CONTENT_LENGTH.len()
        && line.as_bytes()[..CONTENT_LENGTH.len()].eq_ignore_ascii_case(CONTENT_LENGTH)
    {
        return match line[CONTENT_LENGTH.len()..].trim().parse::<usize>() {
            Ok(n) => Header::ContentLength(n),
            Err(_) => Header::Malformed,
        };
    }

    match line.split_once(':') {
        Some((name, _)) if !name.trim().is_empty() => Header::Other,
        _ => Header::Malformed,
    }
}

/// Reads one frame body from `reader`.
///
/// Returns `Ok(None)` when the stream ends before a complete frame is read, and also when the
/// header block is malformed (no `Content-Length`, non-integer length, oversized length):
/// once framing is lost there is no point to resynchronise from.
pub async fn read_frame<R>(reader: &mut R) -> io::Result<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut content_length: Option<usize> = None;
    let mut saw_header = false;
    let mut line = Vec::new();

    loop {
        line.clear();
        let n = (&mut *reader)
            .take(MAX_HEADER_LINE_BYTES)
            .read_until(b'\n', &mut line)
            .await?;
        if n == 0 {
            if saw_header {
                log::debug!("stream ended inside a frame header block");
            }
            return Ok(None);
        }
        if !line.ends_with(b"\n") {
            log::warn!("unterminated or oversized frame header line ({n} bytes)");
            return Ok(None);
        }
        if is_blank(&line) {
            if saw_header {
                break;
            }
            // Stray blank lines between frames.
            continue;
        }

        saw_header = true;
        match parse_header(&line) {
            Header::ContentLength(len) => content_length = Some(len),
            Header::Other => {}
            Header::Malformed => {
                log::warn!(
                    "malformed frame header: {:?}",
                    String::from_utf8_lossy(&line).trim_end()
                );
                return Ok(None);
            }
        }
    }

    let Some(len) = content_length else {
        log::warn!("frame header block without Content-Length");
        return Ok(None);
    };
    if len > MAX_MESSAGE_BYTES {
        log::warn!("frame length {len} exceeds limit {MAX_MESSAGE_BYTES}");
        return Ok(None);
    }

    let mut body = vec![0u8; len];
    match reader.read_exact(&mut body).await {
        Ok(_) => {
            log::trace!("read frame ({len} bytes)");
            Ok(Some(body))
        }
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
            log::warn!("stream ended inside a frame body (declared {len} bytes)");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Serializes `value` as one frame: `Content-Length: <bytes>\r\n\r\n<json>`.
///
/// Nothing follows the body; receivers rely on the declared length alone.
pub fn encode_frame<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let body = serde_json::to_vec(value)?;
    let header = format!("Content-Length: {}\r\n\r\n", body.len());
    let mut out = Vec::with_capacity(header.len() + body.len());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}

pub async fn write_frame<W, T>(writer: &mut W, value: &T) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let bytes = encode_frame(value)?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    log::trace!("wrote frame ({} bytes)", bytes.len());
    Ok(())
}
