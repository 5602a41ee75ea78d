//! Method-name dispatch for inbound requests and notifications.

use std::collections::HashMap;
use std::future::Future;
use std::ops::ControlFlow;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::types::{ErrorCode, ResponseError};
use crate::{Error, Result};

type RequestHandler = Arc<dyn Fn(Args) -> BoxFuture<'static, Result<JsonValue, ResponseError>> + Send + Sync>;
type NotificationHandler = Box<dyn FnMut(Args) -> ControlFlow<Result<()>> + Send>;
type UnhandledNotification = Box<dyn FnMut(&str, Args) -> ControlFlow<Result<()>> + Send>;

/// Positional arguments of an inbound request or notification.
#[derive(Debug, Default)]
pub struct Args(std::vec::IntoIter<JsonValue>);

impl Args {
	/// Wraps decoded positional arguments.
	#[must_use]
	pub fn new(args: Vec<JsonValue>) -> Self {
		Self(args.into_iter())
	}

	/// Decodes the next argument. A missing argument decodes from `null`.
	///
	/// # Errors
	///
	/// Returns [`Error::Deserialize`] when the argument does not decode as `T`.
	#[allow(clippy::should_implement_trait, reason = "typed decoding, not iteration")]
	pub fn next<T: DeserializeOwned>(&mut self) -> Result<T> {
		let value = self.0.next().unwrap_or(JsonValue::Null);
		Ok(serde_json::from_value(value)?)
	}

	/// Number of arguments not yet decoded.
	#[must_use]
	pub fn remaining(&self) -> usize {
		self.0.len()
	}
}

/// Request table of an endpoint.
///
/// Request handlers run concurrently on the endpoint's task set. Notification
/// handlers run synchronously on the pump, in arrival order, and decide
/// whether the pump keeps running.
#[derive(Default)]
pub struct Router {
	requests: HashMap<String, RequestHandler>,
	notifications: HashMap<String, NotificationHandler>,
	unhandled_notification: Option<UnhandledNotification>,
}

impl std::fmt::Debug for Router {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut requests: Vec<_> = self.requests.keys().collect();
		requests.sort();
		let mut notifications: Vec<_> = self.notifications.keys().collect();
		notifications.sort();
		f.debug_struct("Router")
			.field("requests", &requests)
			.field("notifications", &notifications)
			.finish_non_exhaustive()
	}
}

impl Router {
	/// Creates an empty router.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a request handler.
	///
	/// # Panics
	///
	/// Panics if `method` already has a request handler.
	pub fn request<F, Fut>(&mut self, method: impl Into<String>, handler: F) -> &mut Self
	where
		F: Fn(Args) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<JsonValue, ResponseError>> + Send + 'static,
	{
		let method = method.into();
		let handler: RequestHandler = Arc::new(move |args| handler(args).boxed());
		assert!(
			self.requests.insert(method.clone(), handler).is_none(),
			"duplicate request handler for `{method}`"
		);
		self
	}

	/// Registers a notification handler.
	///
	/// # Panics
	///
	/// Panics if `method` already has a notification handler.
	pub fn notification<F>(&mut self, method: impl Into<String>, handler: F) -> &mut Self
	where
		F: FnMut(Args) -> ControlFlow<Result<()>> + Send + 'static,
	{
		let method = method.into();
		assert!(
			self.notifications.insert(method.clone(), Box::new(handler)).is_none(),
			"duplicate notification handler for `{method}`"
		);
		self
	}

	/// Installs a catch-all for notifications without a handler.
	pub fn unhandled_notification<F>(&mut self, handler: F) -> &mut Self
	where
		F: FnMut(&str, Args) -> ControlFlow<Result<()>> + Send + 'static,
	{
		self.unhandled_notification = Some(Box::new(handler));
		self
	}

	/// Returns true if a request handler is registered under `method`.
	#[must_use]
	pub fn has_request(&self, method: &str) -> bool {
		self.requests.contains_key(method)
	}

	/// Starts handling a request. Panics inside the handler become error responses.
	pub(crate) fn call(&self, method: &str, args: Vec<JsonValue>) -> BoxFuture<'static, Result<JsonValue, ResponseError>> {
		let Some(handler) = self.requests.get(method) else {
			debug!(%method, "no request handler");
			let err = ResponseError::from(Error::Routing(format!("no handler for `{method}`")));
			return futures::future::ready(Err(err)).boxed();
		};
		let fut = handler(Args::new(args));
		let method = method.to_owned();
		AssertUnwindSafe(fut)
			.catch_unwind()
			.map(move |res| {
				res.unwrap_or_else(|_| {
					tracing::error!(%method, "request handler panicked");
					Err(ResponseError::new(ErrorCode::INTERNAL_ERROR, format!("handler for `{method}` panicked")))
				})
			})
			.boxed()
	}

	/// Delivers a notification.
	pub(crate) fn notify(&mut self, method: &str, args: Vec<JsonValue>) -> ControlFlow<Result<()>> {
		if let Some(handler) = self.notifications.get_mut(method) {
			return handler(Args::new(args));
		}
		if let Some(handler) = self.unhandled_notification.as_mut() {
			return handler(method, Args::new(args));
		}
		debug!(%method, "unhandled notification");
		ControlFlow::Continue(())
	}
}

/// Adapts a typed async result into a request handler result.
///
/// # Errors
///
/// Converts both encode failures and handler errors into a [`ResponseError`].
pub fn reply<T: serde::Serialize>(result: Result<T>) -> Result<JsonValue, ResponseError> {
	let value = result.map_err(ResponseError::from)?;
	serde_json::to_value(value).map_err(|e| ResponseError::from(Error::Deserialize(e)))
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[tokio::test]
	async fn unknown_method_is_not_found() {
		let router = Router::new();
		let err = router.call("nope__x", vec![]).await.unwrap_err();
		assert_eq!(err.code, ErrorCode::METHOD_NOT_FOUND);
		assert_eq!(err.message, "no handler for `nope__x`");
	}

	#[tokio::test]
	async fn handler_receives_positional_args() {
		let mut router = Router::new();
		router.request("calc__add", |mut args| async move {
			let a: i64 = args.next()?;
			let b: i64 = args.next()?;
			reply(Ok(a + b))
		});
		assert_eq!(router.call("calc__add", vec![json!(2), json!(3)]).await, Ok(json!(5)));
		assert!(router.has_request("calc__add"));
	}

	#[tokio::test]
	async fn bad_argument_is_invalid_params() {
		let mut router = Router::new();
		router.request("calc__neg", |mut args| async move {
			let a: i64 = args.next()?;
			reply(Ok(-a))
		});
		let err = router.call("calc__neg", vec![json!("x")]).await.unwrap_err();
		assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
	}

	#[tokio::test]
	async fn panicking_handler_becomes_internal_error() {
		let mut router = Router::new();
		router.request("bad__op", |_args| async move {
			if true {
				panic!("boom");
			}
			reply(Ok(()))
		});
		let err = router.call("bad__op", vec![]).await.unwrap_err();
		assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
	}

	#[test]
	fn missing_argument_decodes_as_none() {
		let mut args = Args::new(vec![json!(1)]);
		assert_eq!(args.next::<u8>().unwrap(), 1);
		assert_eq!(args.remaining(), 0);
		assert_eq!(args.next::<Option<String>>().unwrap(), None);
	}

	#[test]
	fn notifications_fall_through_to_catch_all() {
		let mut router = Router::new();
		let seen = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
		let sink = seen.clone();
		router.unhandled_notification(move |method, _args| {
			sink.lock().push(method.to_owned());
			ControlFlow::Continue(())
		});
		assert!(router.notify("x__y", vec![]).is_continue());
		assert_eq!(*seen.lock(), vec!["x__y".to_owned()]);
	}

	#[test]
	#[should_panic(expected = "duplicate request handler")]
	fn duplicate_registration_panics() {
		let mut router = Router::new();
		router.request("a__b", |_| async { reply(Ok(())) });
		router.request("a__b", |_| async { reply(Ok(())) });
	}
}
