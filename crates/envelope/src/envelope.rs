//! Envelope bootstrap: the embedded side of a feature.

use std::sync::Arc;
use std::time::Duration;

use mfe_bus::{BusEndpoint, Result, Role, Router, SharedAssociation, Transport};

use crate::api::EnvelopeApiImpl;
use crate::client::EnvelopeClient;
use crate::feature::{Feature, ViewDelegate};

/// Envelope-side settings.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeOptions {
	/// Id this envelope answers to; messages addressed to other ids are ignored.
	pub envelope_id: Option<String>,
	/// Timeout applied to channel API requests.
	pub request_timeout: Option<Duration>,
}

/// A started envelope for feature `F`, ready to run on transport `T`.
///
/// The init handshake is served as soon as [`Envelope::run`] is polled. The
/// view can be mounted later through the view delegate.
pub struct Envelope<F: Feature, T: Transport> {
	endpoint: BusEndpoint<T>,
	client: EnvelopeClient,
	api: Arc<EnvelopeApiImpl<F, EnvelopeClient>>,
}

impl<F: Feature, T: Transport> std::fmt::Debug for Envelope<F, T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Envelope")
			.field("feature", &F::NAME)
			.field("client", &self.client)
			.field("state", &self.api.state())
			.finish_non_exhaustive()
	}
}

impl<F: Feature, T: Transport> Envelope<F, T> {
	/// Builds the envelope endpoint and serves `<feature>__init` on it.
	pub fn new(transport: T, options: EnvelopeOptions, view_delegate: Arc<dyn ViewDelegate<F>>) -> Self {
		Self::with_router(transport, options, view_delegate, |_| {})
	}

	/// Like [`Envelope::new`], letting the caller serve extra requests or notifications.
	pub fn with_router(
		transport: T,
		options: EnvelopeOptions,
		view_delegate: Arc<dyn ViewDelegate<F>>,
		extend: impl FnOnce(&mut Router),
	) -> Self {
		let association = SharedAssociation::default();
		let role = Role::Envelope {
			envelope_id: options.envelope_id.clone(),
			association: Arc::clone(&association),
		};

		let mut parts = None;
		let (endpoint, _socket) = BusEndpoint::new(transport, role, |socket| {
			let client = EnvelopeClient::new(
				socket.with_request_timeout(options.request_timeout),
				association,
				options.envelope_id,
			);
			let api = Arc::new(EnvelopeApiImpl::new(client.clone(), view_delegate));
			let mut router = Router::new();
			Arc::clone(&api).register(&mut router);
			extend(&mut router);
			parts = Some((client, api));
			router
		});
		let (client, api) = parts.expect("endpoint builder runs synchronously");
		Self { endpoint, client, api }
	}

	/// Client for channel API requests, to hand to the view's driver.
	#[must_use]
	pub fn client(&self) -> &EnvelopeClient {
		&self.client
	}

	/// The init handshake implementation.
	#[must_use]
	pub fn api(&self) -> &Arc<EnvelopeApiImpl<F, EnvelopeClient>> {
		&self.api
	}

	/// Runs the envelope until its client shuts it down or the channel goes away.
	///
	/// # Errors
	///
	/// See [`BusEndpoint::run`].
	pub async fn run(self) -> Result<()> {
		self.endpoint.run().await
	}
}
