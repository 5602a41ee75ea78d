//! Framed transport over async byte streams.

use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::{Transport, origin_matches};
use crate::codec::{read_message, write_message};
use crate::types::BusMessage;
use crate::{Error, Result};

const INBOUND_QUEUE_LEN: usize = 256;

/// Transport carrying `Content-Length` framed JSON over a reader/writer pair.
///
/// Decoding runs on a dedicated reader task feeding a bounded queue so that
/// [`Transport::next_message`] stays cancel-safe.
pub struct StreamTransport<W> {
	peer_origin: String,
	output: W,
	inbound: mpsc::Receiver<Result<BusMessage>>,
	reader: JoinHandle<()>,
}

impl<W> std::fmt::Debug for StreamTransport<W> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("StreamTransport")
			.field("peer_origin", &self.peer_origin)
			.finish_non_exhaustive()
	}
}

impl<W> StreamTransport<W>
where
	W: AsyncWrite + Unpin + Send + 'static,
{
	/// Creates a transport talking to `peer_origin` over `input`/`output`.
	///
	/// Must be called from within a Tokio runtime.
	pub fn new(peer_origin: impl Into<String>, input: impl AsyncRead + Unpin + Send + 'static, output: W) -> Self {
		let (tx, inbound) = mpsc::channel(INBOUND_QUEUE_LEN);
		let reader = tokio::spawn(read_loop(BufReader::new(input), tx));
		Self {
			peer_origin: peer_origin.into(),
			output,
			inbound,
			reader,
		}
	}
}

async fn read_loop(mut input: BufReader<impl AsyncRead + Unpin>, tx: mpsc::Sender<Result<BusMessage>>) {
	let mut buf = String::new();
	loop {
		let item = match read_message(&mut input, &mut buf).await {
			Ok(Some(msg)) => Ok(msg),
			Ok(None) => {
				trace!("stream transport reached EOF");
				return;
			}
			Err(e @ Error::Deserialize(_)) => {
				// A bad body does not desynchronize framing; keep reading.
				debug!(error = %e, "undecodable frame");
				if tx.send(Err(e)).await.is_err() {
					return;
				}
				continue;
			}
			Err(e) => Err(e),
		};
		let fatal = item.is_err();
		if tx.send(item).await.is_err() || fatal {
			return;
		}
	}
}

impl<W> Drop for StreamTransport<W> {
	fn drop(&mut self) {
		self.reader.abort();
	}
}

impl<W> Transport for StreamTransport<W>
where
	W: AsyncWrite + Unpin + Send + 'static,
{
	fn peer_origin(&self) -> &str {
		&self.peer_origin
	}

	async fn post_message(&mut self, message: BusMessage, target_origin: &str) -> Result<()> {
		if !origin_matches(target_origin, &self.peer_origin) {
			trace!(target_origin, peer = %self.peer_origin, method = %message.method, "origin mismatch, message dropped");
			return Ok(());
		}
		write_message(&mut self.output, &message).await
	}

	async fn next_message(&mut self) -> Option<Result<BusMessage>> {
		self.inbound.recv().await
	}
}
