//! `Content-Length` framing for bus messages over byte streams.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::types::BusMessage;
use crate::{Error, Result};

const CONTENT_LENGTH: &str = "Content-Length: ";

/// Upper bound for a single frame body.
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Upper bound for a single header line, terminator included.
pub const MAX_HEADER_LINE: usize = 1024;

/// Writes one framed message and flushes.
///
/// # Errors
///
/// Returns [`Error::Io`] if the writer fails.
pub async fn write_message(output: &mut (impl AsyncWrite + Unpin), msg: &BusMessage) -> Result<()> {
	let json = serde_json::to_string(msg)?;
	let frame = format!("{CONTENT_LENGTH}{}\r\n\r\n{json}", json.len());
	output.write_all(frame.as_bytes()).await?;
	output.flush().await?;
	Ok(())
}

/// Reads one framed message.
///
/// Returns `Ok(None)` on a clean EOF between frames.
///
/// # Errors
///
/// - [`Error::Protocol`] for a missing or oversized `Content-Length`, or a
///   header line longer than [`MAX_HEADER_LINE`].
/// - [`Error::Eof`] when the stream ends inside a frame.
/// - [`Error::Deserialize`] when the body is not a bus message.
pub async fn read_message(input: &mut (impl AsyncBufRead + Unpin), buf: &mut String) -> Result<Option<BusMessage>> {
	let mut content_length: Option<usize> = None;
	let mut saw_header = false;
	loop {
		buf.clear();
		let read = (&mut *input).take(MAX_HEADER_LINE as u64).read_line(buf).await?;
		if read == 0 {
			return if saw_header { Err(Error::Eof) } else { Ok(None) };
		}
		if read == MAX_HEADER_LINE && !buf.ends_with('\n') {
			return Err(Error::Protocol(format!("header line exceeds {MAX_HEADER_LINE} bytes")));
		}
		let line = buf.trim();
		if line.is_empty() {
			if saw_header {
				break;
			}
			continue;
		}
		saw_header = true;
		if let Some(len) = line.strip_prefix(CONTENT_LENGTH) {
			content_length = Some(len.parse().map_err(|_| Error::Protocol(format!("bad Content-Length `{len}`")))?);
		}
	}

	let length = content_length.ok_or_else(|| Error::Protocol("missing Content-Length".into()))?;
	if length > MAX_FRAME_LEN {
		return Err(Error::Protocol(format!("frame of {length} bytes exceeds limit")));
	}

	let mut body = vec![0u8; length];
	input.read_exact(&mut body).await.map_err(|e| match e.kind() {
		std::io::ErrorKind::UnexpectedEof => Error::Eof,
		_ => Error::Io(e),
	})?;
	Ok(Some(serde_json::from_slice(&body)?))
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use tokio::io::BufReader;

	use super::*;

	#[tokio::test]
	async fn frames_back_to_back_messages() {
		let mut bytes = Vec::new();
		let first = BusMessage::notification("a__first", vec![json!(1)]);
		let second = BusMessage::notification("a__second", vec![json!("ü")]);
		write_message(&mut bytes, &first).await.unwrap();
		write_message(&mut bytes, &second).await.unwrap();

		let mut reader = BufReader::new(&bytes[..]);
		let mut buf = String::new();
		assert_eq!(read_message(&mut reader, &mut buf).await.unwrap(), Some(first));
		assert_eq!(read_message(&mut reader, &mut buf).await.unwrap(), Some(second));
		assert_eq!(read_message(&mut reader, &mut buf).await.unwrap(), None);
	}

	#[tokio::test]
	async fn missing_length_is_rejected() {
		let mut reader = BufReader::new(&b"X-Other: 1\r\n\r\n{}"[..]);
		let mut buf = String::new();
		assert!(matches!(read_message(&mut reader, &mut buf).await, Err(Error::Protocol(_))));
	}

	#[tokio::test]
	async fn endless_header_line_is_rejected() {
		let mut bytes = b"Content-Length: ".to_vec();
		bytes.extend(std::iter::repeat_n(b'7', 4 * MAX_HEADER_LINE));
		let mut reader = BufReader::new(&bytes[..]);
		let mut buf = String::new();
		assert!(matches!(read_message(&mut reader, &mut buf).await, Err(Error::Protocol(_))));
		assert!(buf.len() <= MAX_HEADER_LINE);
	}

	#[tokio::test]
	async fn truncated_body_is_eof() {
		let mut reader = BufReader::new(&b"Content-Length: 50\r\n\r\n{\"purpose\""[..]);
		let mut buf = String::new();
		assert!(matches!(read_message(&mut reader, &mut buf).await, Err(Error::Eof)));
	}
}
