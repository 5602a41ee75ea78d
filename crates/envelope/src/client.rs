//! Envelope-side bus client.

use async_trait::async_trait;
use mfe_bus::{Association, JsonValue, PeerSocket, Result, SharedAssociation};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::Associate;
use crate::feature::RequestSender;

/// The envelope's handle on its channel.
///
/// Requests and notifications are routed to the association recorded by the
/// most recent init; before any init they fail with
/// [`Error::NotAssociated`](mfe_bus::Error::NotAssociated).
#[derive(Debug, Clone)]
pub struct EnvelopeClient {
	socket: PeerSocket,
	association: SharedAssociation,
	envelope_id: Option<String>,
}

impl EnvelopeClient {
	pub(crate) fn new(socket: PeerSocket, association: SharedAssociation, envelope_id: Option<String>) -> Self {
		Self {
			socket,
			association,
			envelope_id,
		}
	}

	/// The channel this envelope currently talks to.
	#[must_use]
	pub fn association(&self) -> Option<Association> {
		self.association.read().clone()
	}

	/// This envelope's id, if it has one.
	#[must_use]
	pub fn envelope_id(&self) -> Option<&str> {
		self.envelope_id.as_deref()
	}

	/// Underlying socket.
	#[must_use]
	pub fn socket(&self) -> &PeerSocket {
		&self.socket
	}

	/// Sends a channel API request and decodes its result.
	///
	/// # Errors
	///
	/// See [`PeerSocket::call`].
	pub async fn call<R: DeserializeOwned>(&self, method: &str, args: Vec<JsonValue>) -> Result<R> {
		self.socket.call(method, args).await
	}

	/// Sends a channel API notification.
	///
	/// # Errors
	///
	/// See [`PeerSocket::notify`].
	pub async fn notify(&self, method: &str, args: Vec<JsonValue>) -> Result<()> {
		self.socket.notify(method, args).await
	}

	/// Stops the envelope's bus endpoint.
	///
	/// # Errors
	///
	/// Returns [`Error::ServiceStopped`](mfe_bus::Error::ServiceStopped) if it already stopped.
	pub fn shutdown(&self) -> Result<()> {
		self.socket.shutdown()
	}
}

impl Associate for EnvelopeClient {
	fn associate(&self, origin: &str, envelope_server_id: &str) {
		let next = Association::new(origin, envelope_server_id);
		let previous = self.association.write().replace(next);
		if previous.as_ref().is_none_or(|p| p.envelope_server_id != envelope_server_id) {
			debug!(origin, server_id = envelope_server_id, "envelope associated");
		}
	}
}

#[async_trait]
impl RequestSender for EnvelopeClient {
	async fn request(&self, method: &str, args: Vec<JsonValue>) -> Result<JsonValue> {
		self.socket.request(method, args).await
	}
}
