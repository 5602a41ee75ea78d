//! In-process transport pair.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::{Transport, origin_matches};
use crate::Result;
use crate::types::BusMessage;

/// The two ends of an in-process window, one per side.
///
/// Each end only receives once it has started listening, like a frame whose
/// document has not loaded yet.
#[derive(Debug)]
pub struct MemoryWindow {
	/// End used by the channel; posts reach the envelope.
	pub channel: MemoryTransport,
	/// End used by the envelope; posts reach the channel.
	pub envelope: MemoryTransport,
}

impl MemoryWindow {
	/// Opens a window between a channel and an envelope living at the given origins.
	#[must_use]
	pub fn open(channel_origin: impl Into<String>, envelope_origin: impl Into<String>) -> Self {
		let channel_origin = channel_origin.into();
		let envelope_origin = envelope_origin.into();
		let (channel_tx, channel_rx) = mpsc::unbounded_channel();
		let (envelope_tx, envelope_rx) = mpsc::unbounded_channel();
		let channel_listening = Arc::new(AtomicBool::new(false));
		let envelope_listening = Arc::new(AtomicBool::new(false));

		let channel = MemoryTransport {
			origin: channel_origin.clone(),
			peer_origin: envelope_origin.clone(),
			inbox: channel_rx,
			listening: Arc::clone(&channel_listening),
			peer_tx: envelope_tx,
			peer_listening: Arc::clone(&envelope_listening),
		};
		let envelope = MemoryTransport {
			origin: envelope_origin,
			peer_origin: channel_origin,
			inbox: envelope_rx,
			listening: envelope_listening,
			peer_tx: channel_tx,
			peer_listening: channel_listening,
		};
		Self { channel, envelope }
	}
}

/// One end of a [`MemoryWindow`].
#[derive(Debug)]
pub struct MemoryTransport {
	origin: String,
	peer_origin: String,
	inbox: mpsc::UnboundedReceiver<BusMessage>,
	listening: Arc<AtomicBool>,
	peer_tx: mpsc::UnboundedSender<BusMessage>,
	peer_listening: Arc<AtomicBool>,
}

impl MemoryTransport {
	/// Origin of this end.
	#[must_use]
	pub fn origin(&self) -> &str {
		&self.origin
	}
}

impl Transport for MemoryTransport {
	fn peer_origin(&self) -> &str {
		&self.peer_origin
	}

	async fn post_message(&mut self, message: BusMessage, target_origin: &str) -> Result<()> {
		if !origin_matches(target_origin, &self.peer_origin) {
			trace!(target_origin, peer = %self.peer_origin, method = %message.method, "origin mismatch, message dropped");
			return Ok(());
		}
		if !self.peer_listening.load(Ordering::Acquire) {
			debug!(peer = %self.peer_origin, method = %message.method, "peer not listening, message dropped");
			return Ok(());
		}
		if self.peer_tx.send(message).is_err() {
			debug!(peer = %self.peer_origin, "peer window closed");
		}
		Ok(())
	}

	async fn next_message(&mut self) -> Option<Result<BusMessage>> {
		self.inbox.recv().await.map(Ok)
	}

	fn start_listening(&mut self) {
		self.listening.store(true, Ordering::Release);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn drops_until_peer_listens() {
		let MemoryWindow { mut channel, mut envelope } = MemoryWindow::open("http://host", "http://frame");

		channel.post_message(BusMessage::notification("early", vec![]), "*").await.unwrap();
		envelope.start_listening();
		channel.post_message(BusMessage::notification("late", vec![]), "*").await.unwrap();
		drop(channel);

		let got = envelope.next_message().await.unwrap().unwrap();
		assert_eq!(got.method, "late");
		assert!(envelope.next_message().await.is_none());
	}

	#[tokio::test]
	async fn origin_mismatch_is_dropped() {
		let MemoryWindow { mut channel, mut envelope } = MemoryWindow::open("http://host", "http://frame");
		channel.start_listening();

		envelope.post_message(BusMessage::notification("wrong", vec![]), "http://evil").await.unwrap();
		envelope.post_message(BusMessage::notification("right", vec![]), "http://host").await.unwrap();
		drop(envelope);

		assert_eq!(channel.next_message().await.unwrap().unwrap().method, "right");
		assert!(channel.next_message().await.is_none());
	}
}
