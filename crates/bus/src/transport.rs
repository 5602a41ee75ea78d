//! Transports carrying bus messages between a channel and an envelope.
//!
//! A transport mirrors the browser `postMessage` contract: messages are posted
//! with a target origin and silently dropped when the receiver's origin does
//! not match. Two implementations ship with the crate:
//!
//! - [`MemoryWindow`]: an in-process pair, for embedding and tests.
//! - [`StreamTransport`]: framed JSON over any async byte stream.

use std::future::Future;

use crate::Result;
use crate::types::{ANY_ORIGIN, BusMessage};

mod memory;
mod stream;

pub use memory::{MemoryTransport, MemoryWindow};
pub use stream::StreamTransport;

/// Bidirectional message carrier used by a [`BusEndpoint`](crate::BusEndpoint).
pub trait Transport: Send + 'static {
	/// Origin of the peer on the other side.
	fn peer_origin(&self) -> &str;

	/// Posts a message to the peer.
	///
	/// Messages whose `target_origin` does not match [`Transport::peer_origin`]
	/// are dropped without error.
	fn post_message(&mut self, message: BusMessage, target_origin: &str) -> impl Future<Output = Result<()>> + Send;

	/// Waits for the next inbound message.
	///
	/// Returns `None` once the peer is gone. Must be cancel-safe.
	fn next_message(&mut self) -> impl Future<Output = Option<Result<BusMessage>>> + Send;

	/// Marks this side as ready to receive. Messages posted before are lost.
	fn start_listening(&mut self) {}
}

/// Returns true when a message posted with `target_origin` reaches `peer_origin`.
#[must_use]
pub fn origin_matches(target_origin: &str, peer_origin: &str) -> bool {
	target_origin == ANY_ORIGIN || target_origin == peer_origin
}
