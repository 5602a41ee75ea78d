//! Channel side: embedding an envelope and driving its init handshake.

use std::marker::PhantomData;
use std::time::Duration;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use mfe_bus::{Association, BusEndpoint, Error, JsonValue, PeerSocket, Result, Role, Router, Transport, to_arg};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::feature::Feature;

/// Channel-side settings for one embedded envelope.
#[derive(Debug, Clone)]
pub struct ChannelOptions {
	/// Origin of the channel itself, sent to the envelope in its association.
	pub origin: String,
	/// Origin of the envelope; `*` for any.
	pub target_origin: String,
	/// Id stamped on every message of this mount.
	pub server_id: String,
	/// Envelope id to address, if known.
	pub envelope_id: Option<String>,
	/// Timeout applied to requests sent to the envelope.
	pub request_timeout: Option<Duration>,
}

/// Cadence of [`EnvelopeServer::poll_init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitPolling {
	/// Delay between two init attempts.
	pub interval: Duration,
	/// Give up after this long without any answer.
	pub timeout: Duration,
}

impl Default for InitPolling {
	fn default() -> Self {
		Self {
			interval: Duration::from_millis(100),
			timeout: Duration::from_secs(60),
		}
	}
}

/// The channel's handle on one embedded envelope of feature `F`.
pub struct EnvelopeServer<F: Feature> {
	socket: PeerSocket,
	origin: String,
	server_id: String,
	_feature: PhantomData<fn() -> F>,
}

impl<F: Feature> Clone for EnvelopeServer<F> {
	fn clone(&self) -> Self {
		Self {
			socket: self.socket.clone(),
			origin: self.origin.clone(),
			server_id: self.server_id.clone(),
			_feature: PhantomData,
		}
	}
}

impl<F: Feature> std::fmt::Debug for EnvelopeServer<F> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EnvelopeServer")
			.field("feature", &F::NAME)
			.field("origin", &self.origin)
			.field("server_id", &self.server_id)
			.finish_non_exhaustive()
	}
}

impl<F: Feature> EnvelopeServer<F> {
	/// Server id of this mount.
	#[must_use]
	pub fn server_id(&self) -> &str {
		&self.server_id
	}

	/// Association handed to the envelope on init.
	#[must_use]
	pub fn association(&self) -> Association {
		Association::new(&self.origin, &self.server_id)
	}

	/// Underlying socket, for envelope API requests beyond init.
	#[must_use]
	pub fn socket(&self) -> &PeerSocket {
		&self.socket
	}

	/// Sends a single `<feature>__init` attempt.
	///
	/// # Errors
	///
	/// Returns the envelope's error response or a transport error.
	pub async fn request_init(&self, init_args: &F::InitArgs) -> Result<()> {
		let args = vec![to_arg(self.association())?, to_arg(init_args)?];
		self.socket.request(F::init_method(), args).await.map(drop)
	}

	/// Polls `<feature>__init` until the envelope answers.
	///
	/// A new attempt goes out every `polling.interval`; attempts sent before
	/// the envelope listens are lost, later ones are answered. The first
	/// answer decides the outcome.
	///
	/// # Errors
	///
	/// - [`Error::Response`] when the envelope answers with an error.
	/// - [`Error::InitTimeout`] when nothing answers within `polling.timeout`.
	/// - [`Error::ServiceStopped`] when the channel endpoint stops.
	pub async fn poll_init(&self, init_args: F::InitArgs, polling: InitPolling) -> Result<()> {
		let method = F::init_method();
		let args = vec![to_arg(self.association())?, to_arg(&init_args)?];

		let deadline = tokio::time::sleep(polling.timeout);
		tokio::pin!(deadline);
		let mut ticks = tokio::time::interval(polling.interval);
		ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
		let mut attempts = FuturesUnordered::new();
		let mut sent = 0u32;

		loop {
			tokio::select! {
				biased;

				Some(res) = attempts.next(), if !attempts.is_empty() => match res {
					Ok(_) => {
						info!(feature = F::NAME, server_id = %self.server_id, attempts = sent, "envelope initialized");
						return Ok(());
					}
					Err(Error::RequestTimeout(_)) => {}
					Err(e) => {
						warn!(feature = F::NAME, error = %e, "envelope init failed");
						return Err(e);
					}
				},

				() = &mut deadline => {
					warn!(feature = F::NAME, attempts = sent, "envelope never answered init");
					return Err(Error::InitTimeout(method));
				}

				_ = ticks.tick() => {
					sent += 1;
					debug!(feature = F::NAME, attempt = sent, "polling envelope init");
					let socket = self.socket.clone();
					let method = method.clone();
					let args: Vec<JsonValue> = args.clone();
					attempts.push(async move { socket.request(method, args).await });
				}
			}
		}
	}

	/// Stops the channel endpoint of this mount.
	///
	/// # Errors
	///
	/// Returns [`Error::ServiceStopped`] if it already stopped.
	pub fn shutdown(&self) -> Result<()> {
		self.socket.shutdown()
	}
}

/// A mounted envelope from the channel's point of view: the endpoint serving
/// the feature's channel API, and the server handle driving the envelope.
pub struct EmbeddedEnvelope<F: Feature, T: Transport> {
	endpoint: BusEndpoint<T>,
	server: EnvelopeServer<F>,
}

impl<F: Feature, T: Transport> std::fmt::Debug for EmbeddedEnvelope<F, T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EmbeddedEnvelope")
			.field("server", &self.server)
			.field("endpoint", &self.endpoint)
			.finish()
	}
}

impl<F: Feature, T: Transport> EmbeddedEnvelope<F, T> {
	/// Builds the channel endpoint. `register` installs the feature's channel API.
	pub fn new(transport: T, options: ChannelOptions, register: impl FnOnce(&mut Router)) -> Self {
		let role = Role::Channel {
			server_id: options.server_id.clone(),
			target_origin: options.target_origin,
			envelope_id: options.envelope_id,
		};
		let (endpoint, socket) = BusEndpoint::new(transport, role, |_socket| {
			let mut router = Router::new();
			register(&mut router);
			router
		});
		let server = EnvelopeServer {
			socket: socket.with_request_timeout(options.request_timeout),
			origin: options.origin,
			server_id: options.server_id,
			_feature: PhantomData,
		};
		Self { endpoint, server }
	}

	/// Handle driving the envelope.
	#[must_use]
	pub fn server(&self) -> &EnvelopeServer<F> {
		&self.server
	}

	/// Splits into the endpoint (to spawn) and the server handle.
	#[must_use]
	pub fn into_parts(self) -> (BusEndpoint<T>, EnvelopeServer<F>) {
		(self.endpoint, self.server)
	}
}

#[cfg(test)]
mod tests;
