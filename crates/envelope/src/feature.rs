//! Feature, view, and view delegate contracts.

use std::sync::Arc;

use async_trait::async_trait;
use mfe_bus::{Error, ErrorCode, JsonValue, PeerSocket, ResponseError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;

/// One embeddable feature: its wire prefix and the payload its view starts from.
pub trait Feature: Send + Sync + 'static {
	/// Wire prefix, e.g. `formsList`.
	const NAME: &'static str;

	/// Payload handed to the view by `<feature>__init`. Use `()` for none.
	type InitArgs: Serialize + DeserializeOwned + Send + Sync + 'static;

	/// Wire name of the init request.
	#[must_use]
	fn init_method() -> String {
		Self::method("init")
	}

	/// Wire name of `operation`, `<feature>__<operation>`.
	#[must_use]
	fn method(operation: &str) -> String {
		format!("{}__{operation}", Self::NAME)
	}
}

/// Lifecycle of an envelope's view. One-way; there is no reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InitState {
	/// No init request captured yet.
	#[default]
	Uninitialized,
	/// The first init request was captured; later ones only re-associate.
	Initialized,
}

/// Imperative handle of a rendered view.
#[async_trait]
pub trait View<F: Feature>: Send + Sync {
	/// Hands the init payload to the view. Called at most once per envelope.
	async fn initialize(&self, args: F::InitArgs) -> Result<()>;
}

/// Resolves the rendered view, waiting for it to mount if necessary.
#[async_trait]
pub trait ViewDelegate<F: Feature>: Send + Sync {
	/// Returns the view once it is rendered.
	async fn view(&self) -> Result<Arc<dyn View<F>>>;
}

/// Delegate for a view that is already rendered.
pub struct ReadyView<F: Feature>(pub Arc<dyn View<F>>);

#[async_trait]
impl<F: Feature> ViewDelegate<F> for ReadyView<F> {
	async fn view(&self) -> Result<Arc<dyn View<F>>> {
		Ok(Arc::clone(&self.0))
	}
}

/// Delegate resolving once the paired [`Mounter`] mounts a view.
///
/// Init requests arriving before the mount wait for it instead of being
/// dropped. If the mounter goes away without mounting, waiting fails.
pub struct MountSlot<F: Feature> {
	rx: watch::Receiver<Option<Arc<dyn View<F>>>>,
}

/// Mounts the view into its [`MountSlot`].
pub struct Mounter<F: Feature> {
	tx: watch::Sender<Option<Arc<dyn View<F>>>>,
}

impl<F: Feature> MountSlot<F> {
	/// Creates an empty slot and its mounter.
	#[must_use]
	pub fn new() -> (Self, Mounter<F>) {
		let (tx, rx) = watch::channel(None);
		(Self { rx }, Mounter { tx })
	}

	/// Returns true once a view is mounted.
	#[must_use]
	pub fn is_mounted(&self) -> bool {
		self.rx.borrow().is_some()
	}
}

impl<F: Feature> Mounter<F> {
	/// Publishes the rendered view, releasing every waiting init.
	pub fn mount(self, view: Arc<dyn View<F>>) {
		self.tx.send_replace(Some(view));
	}
}

#[async_trait]
impl<F: Feature> ViewDelegate<F> for MountSlot<F> {
	async fn view(&self) -> Result<Arc<dyn View<F>>> {
		let mut rx = self.rx.clone();
		loop {
			let current = rx.borrow_and_update().clone();
			if let Some(view) = current {
				return Ok(view);
			}
			if rx.changed().await.is_err() {
				return Err(view_failed(format!("`{}` view was dropped before it mounted", F::NAME)));
			}
		}
	}
}

/// Builds the error reported when a view cannot be rendered or initialized.
#[must_use]
pub fn view_failed(message: impl std::fmt::Display) -> Error {
	Error::Response(ResponseError::new(ErrorCode::VIEW_FAILED, message))
}

/// Anything able to send a named request with positional arguments to the channel.
///
/// Envelope view drivers are written against this so that they can run over
/// the bus or against a test double.
#[async_trait]
pub trait RequestSender: Send + Sync {
	/// Sends `method` with `args` and returns the raw result.
	async fn request(&self, method: &str, args: Vec<JsonValue>) -> Result<JsonValue>;
}

#[async_trait]
impl RequestSender for PeerSocket {
	async fn request(&self, method: &str, args: Vec<JsonValue>) -> Result<JsonValue> {
		PeerSocket::request(self, method, args).await
	}
}

#[async_trait]
impl<S: RequestSender + ?Sized> RequestSender for Arc<S> {
	async fn request(&self, method: &str, args: Vec<JsonValue>) -> Result<JsonValue> {
		(**self).request(method, args).await
	}
}
