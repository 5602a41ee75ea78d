//! Message classification and request id generation.

use serde_json::Value as JsonValue;

use crate::types::{BusMessage, Purpose, RequestId, ResponseError};
use crate::{Error, Result};

/// Simple counter-based request id generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct CounterIdGen(pub u64);

impl CounterIdGen {
	/// Creates a new counter starting at 0.
	#[must_use]
	pub const fn new() -> Self {
		Self(0)
	}

	/// Generates the next unique ID and increments the counter.
	#[allow(clippy::should_implement_trait, reason = "convention")]
	pub fn next(&mut self) -> RequestId {
		let id = RequestId(self.0);
		self.0 += 1;
		id
	}
}

/// An incoming request, with everything needed to answer it.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundRequest {
	/// Correlation id to echo.
	pub id: RequestId,
	/// Method name.
	pub method: String,
	/// Positional arguments.
	pub args: Vec<JsonValue>,
	/// Server id the request was stamped with, echoed on the response.
	pub server_id: Option<String>,
}

/// An incoming response.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundResponse {
	/// Id of the request being answered.
	pub id: RequestId,
	/// Method name of the request being answered.
	pub method: String,
	/// Result value or peer error.
	pub result: std::result::Result<JsonValue, ResponseError>,
}

/// Classification of an inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
	/// An incoming request.
	Request(InboundRequest),
	/// An incoming response.
	Response(InboundResponse),
	/// An incoming notification.
	Notification {
		/// Method name.
		method: String,
		/// Positional arguments.
		args: Vec<JsonValue>,
	},
}

impl Inbound {
	/// Classifies a decoded message.
	///
	/// # Errors
	///
	/// Returns [`Error::Protocol`] for requests or responses missing their id.
	pub fn classify(msg: BusMessage) -> Result<Self> {
		match msg.purpose {
			Purpose::Request => {
				let id = msg
					.request_id
					.ok_or_else(|| Error::Protocol(format!("request `{}` has no requestId", msg.method)))?;
				let server_id = msg.target_envelope_server_id.clone();
				let method = msg.method.clone();
				Ok(Self::Request(InboundRequest {
					id,
					method,
					args: msg.into_args(),
					server_id,
				}))
			}
			Purpose::Response => {
				let id = msg
					.request_id
					.ok_or_else(|| Error::Protocol(format!("response `{}` has no requestId", msg.method)))?;
				let result = match msg.error {
					Some(err) => Err(err),
					None => Ok(msg.data),
				};
				Ok(Self::Response(InboundResponse {
					id,
					method: msg.method,
					result,
				}))
			}
			Purpose::Notification => {
				let method = msg.method.clone();
				Ok(Self::Notification {
					method,
					args: msg.into_args(),
				})
			}
		}
	}
}
