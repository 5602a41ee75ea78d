//! Handles for talking to a running [`BusEndpoint`](crate::BusEndpoint).

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::sync::{mpsc, oneshot};
use tracing::trace;

use crate::types::BusMessage;
use crate::{Error, Result};

/// Internal events sent from sockets to the endpoint pump.
#[derive(Debug)]
pub enum MainLoopEvent {
	/// A request awaiting its response.
	OutgoingRequest(BusMessage, oneshot::Sender<Result<JsonValue>>),
	/// A notification, acknowledged once posted.
	Outgoing(BusMessage, Option<oneshot::Sender<Result<()>>>),
	/// Stop the pump.
	Shutdown,
}

/// Cloneable handle to an endpoint.
///
/// Every clone talks to the same pump; the pump exits once all handles are
/// dropped or [`PeerSocket::shutdown`] is called.
#[derive(Debug, Clone)]
pub struct PeerSocket {
	pub(crate) tx: mpsc::UnboundedSender<MainLoopEvent>,
	pub(crate) request_timeout: Option<Duration>,
}

impl PeerSocket {
	/// Creates a socket whose endpoint is already gone.
	#[must_use]
	pub fn new_closed() -> Self {
		let (tx, _rx) = mpsc::unbounded_channel();
		Self {
			tx,
			request_timeout: None,
		}
	}

	/// Returns a copy of this socket giving up on requests after `timeout`.
	#[must_use]
	pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
		self.request_timeout = timeout;
		self
	}

	/// Sends an event to the pump.
	pub(crate) fn send(&self, event: MainLoopEvent) -> Result<()> {
		self.tx.send(event).map_err(|_| Error::ServiceStopped)
	}

	/// Sends a request with positional arguments and waits for the raw result.
	///
	/// # Errors
	///
	/// - [`Error::Response`] when the peer answers with an error.
	/// - [`Error::NotAssociated`] when an envelope has no channel yet.
	/// - [`Error::RequestTimeout`] when a timeout is set and elapses.
	/// - [`Error::ServiceStopped`] when the endpoint is gone.
	pub async fn request(&self, method: impl Into<String>, args: Vec<JsonValue>) -> Result<JsonValue> {
		let method = method.into();
		trace!(%method, "outgoing request");
		let (tx, rx) = oneshot::channel();
		self.send(MainLoopEvent::OutgoingRequest(BusMessage::request(method.clone(), args), tx))?;
		let resp = match self.request_timeout {
			None => rx.await,
			Some(dur) => tokio::time::timeout(dur, rx)
				.await
				.map_err(|_| Error::RequestTimeout(method))?,
		};
		resp.map_err(|_| Error::ServiceStopped)?
	}

	/// Sends a request and decodes its result.
	///
	/// # Errors
	///
	/// Same as [`PeerSocket::request`], plus [`Error::Deserialize`] when the
	/// result does not decode as `R`.
	pub async fn call<R: DeserializeOwned>(&self, method: impl Into<String>, args: Vec<JsonValue>) -> Result<R> {
		let value = self.request(method, args).await?;
		Ok(serde_json::from_value(value)?)
	}

	/// Posts a notification and waits until the pump has handed it to the transport.
	///
	/// # Errors
	///
	/// - [`Error::NotAssociated`] when an envelope has no channel yet.
	/// - [`Error::ServiceStopped`] when the endpoint is gone.
	pub async fn notify(&self, method: impl Into<String>, args: Vec<JsonValue>) -> Result<()> {
		let (tx, rx) = oneshot::channel();
		self.send(MainLoopEvent::Outgoing(BusMessage::notification(method, args), Some(tx)))?;
		rx.await.map_err(|_| Error::ServiceStopped)?
	}

	/// Asks the endpoint pump to stop.
	///
	/// # Errors
	///
	/// Returns [`Error::ServiceStopped`] if it already stopped.
	pub fn shutdown(&self) -> Result<()> {
		self.send(MainLoopEvent::Shutdown)
	}

	/// Returns true once the endpoint pump is gone.
	#[must_use]
	pub fn is_closed(&self) -> bool {
		self.tx.is_closed()
	}
}

/// Encodes one positional argument.
///
/// # Errors
///
/// Returns [`Error::Deserialize`] when the value cannot be represented as JSON.
pub fn to_arg(value: impl Serialize) -> Result<JsonValue> {
	Ok(serde_json::to_value(value)?)
}

#[cfg(test)]
mod tests;
