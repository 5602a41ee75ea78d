//! Envelope-side implementation of the `<feature>__init` handshake.

use std::sync::Arc;

use mfe_bus::{Association, Error, Result, Router, reply};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::feature::{Feature, InitState, ViewDelegate};

/// Binds the envelope's bus client to the channel that initialized it.
pub trait Associate: Send + Sync {
	/// Routes every later outbound message to `origin`, stamped with `envelope_server_id`.
	fn associate(&self, origin: &str, envelope_server_id: &str);
}

/// The envelope API of feature `F`: a single init entry point.
///
/// Every init call re-associates the client, so a channel that reconnects
/// under a new server id is followed. Only the first call reaches the view;
/// duplicates (polling retries, late messages) leave it untouched.
pub struct EnvelopeApiImpl<F: Feature, C> {
	client: C,
	view_delegate: Arc<dyn ViewDelegate<F>>,
	state: Mutex<InitState>,
}

impl<F: Feature, C: Associate> EnvelopeApiImpl<F, C> {
	/// Creates the API around a bus client and the delegate resolving the view.
	pub fn new(client: C, view_delegate: Arc<dyn ViewDelegate<F>>) -> Self {
		Self {
			client,
			view_delegate,
			state: Mutex::new(InitState::Uninitialized),
		}
	}

	/// The client this API associates.
	pub fn client(&self) -> &C {
		&self.client
	}

	/// Current handshake state.
	pub fn state(&self) -> InitState {
		*self.state.lock()
	}

	/// Handles `<feature>__init`.
	///
	/// # Errors
	///
	/// - [`Error::InvalidAssociation`] for an empty origin or server id.
	/// - Whatever the view delegate or the view's `initialize` returns. The
	///   state stays [`InitState::Initialized`]; there is no retry.
	pub async fn init(&self, association: Association, init_args: F::InitArgs) -> Result<()> {
		if !association.is_valid() {
			return Err(Error::InvalidAssociation);
		}
		self.client.associate(&association.origin, &association.envelope_server_id);

		{
			let mut state = self.state.lock();
			if *state == InitState::Initialized {
				debug!(feature = F::NAME, server_id = %association.envelope_server_id, "duplicate init, re-associated only");
				return Ok(());
			}
			*state = InitState::Initialized;
		}

		info!(feature = F::NAME, origin = %association.origin, "initializing view");
		let view = self.view_delegate.view().await?;
		view.initialize(init_args).await
	}
}

impl<F: Feature, C: Associate + 'static> EnvelopeApiImpl<F, C> {
	/// Serves `<feature>__init(association, initArgs)` from `router`.
	pub fn register(self: Arc<Self>, router: &mut Router) {
		router.request(F::init_method(), move |mut args| {
			let api = Arc::clone(&self);
			async move {
				let association: Association = args.next()?;
				let init_args: F::InitArgs = args.next()?;
				reply(api.init(association, init_args).await)
			}
		});
	}
}

#[cfg(test)]
mod tests;
