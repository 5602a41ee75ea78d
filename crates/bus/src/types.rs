//! Wire types exchanged between a channel and its envelopes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Target origin accepted by every receiver.
pub const ANY_ORIGIN: &str = "*";

/// Identifier correlating a response with its request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Identifies the calling channel for message routing.
///
/// Created by the channel once per envelope mount and handed to the envelope
/// inside every `<feature>__init` request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Association {
	/// Origin the envelope posts its messages to.
	pub origin: String,
	/// Server id the envelope stamps on its messages.
	pub envelope_server_id: String,
}

impl Association {
	/// Creates a new association.
	pub fn new(origin: impl Into<String>, envelope_server_id: impl Into<String>) -> Self {
		Self {
			origin: origin.into(),
			envelope_server_id: envelope_server_id.into(),
		}
	}

	/// Returns true when both fields are non-empty.
	#[must_use]
	pub fn is_valid(&self) -> bool {
		!self.origin.is_empty() && !self.envelope_server_id.is_empty()
	}
}

/// What a [`BusMessage`] is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
	/// Expects exactly one response with the same request id.
	Request,
	/// Answers a request.
	Response,
	/// Fire-and-forget.
	Notification,
}

/// Numeric error code carried by a [`ResponseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
	/// The message could not be decoded.
	pub const PARSE_ERROR: Self = Self(-32700);
	/// The message is not a valid request.
	pub const INVALID_REQUEST: Self = Self(-32600);
	/// No handler is registered under the requested name.
	pub const METHOD_NOT_FOUND: Self = Self(-32601);
	/// The positional arguments could not be decoded.
	pub const INVALID_PARAMS: Self = Self(-32602);
	/// The handler failed.
	pub const INTERNAL_ERROR: Self = Self(-32603);
	/// The envelope view failed to render or initialize.
	pub const VIEW_FAILED: Self = Self(-32001);
	/// The envelope was not associated with a channel.
	pub const NOT_ASSOCIATED: Self = Self(-32002);
}

impl fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

/// Error payload of a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct ResponseError {
	/// Error class.
	pub code: ErrorCode,
	/// Human readable description.
	pub message: String,
	/// Optional structured detail.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<JsonValue>,
}

impl ResponseError {
	/// Creates a response error without extra data.
	#[must_use]
	pub fn new(code: ErrorCode, message: impl fmt::Display) -> Self {
		Self {
			code,
			message: message.to_string(),
			data: None,
		}
	}

	/// Attaches structured data to the error.
	#[must_use]
	pub fn with_data(mut self, data: JsonValue) -> Self {
		self.data = Some(data);
		self
	}
}

/// One message on the bus.
///
/// Requests and notifications carry their positional arguments as a JSON array
/// in `data`; responses carry the result value or an `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusMessage {
	/// Correlation id, present on requests and responses.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub request_id: Option<RequestId>,
	/// Server id of the channel this message belongs to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub target_envelope_server_id: Option<String>,
	/// Envelope this message is addressed to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub target_envelope_id: Option<String>,
	/// Kind of message.
	pub purpose: Purpose,
	/// Method name, `<feature>__<operation>`.
	#[serde(rename = "type")]
	pub method: String,
	/// Arguments or result.
	#[serde(default)]
	pub data: JsonValue,
	/// Failure of a response.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<ResponseError>,
}

impl BusMessage {
	/// Builds an unstamped request. The id is assigned by the endpoint.
	#[must_use]
	pub fn request(method: impl Into<String>, args: Vec<JsonValue>) -> Self {
		Self {
			request_id: None,
			target_envelope_server_id: None,
			target_envelope_id: None,
			purpose: Purpose::Request,
			method: method.into(),
			data: JsonValue::Array(args),
			error: None,
		}
	}

	/// Builds an unstamped notification.
	#[must_use]
	pub fn notification(method: impl Into<String>, args: Vec<JsonValue>) -> Self {
		Self {
			purpose: Purpose::Notification,
			..Self::request(method, args)
		}
	}

	/// Builds the response to a request.
	#[must_use]
	pub fn response(id: RequestId, method: impl Into<String>, result: Result<JsonValue, ResponseError>) -> Self {
		let (data, error) = match result {
			Ok(v) => (v, None),
			Err(e) => (JsonValue::Null, Some(e)),
		};
		Self {
			request_id: Some(id),
			target_envelope_server_id: None,
			target_envelope_id: None,
			purpose: Purpose::Response,
			method: method.into(),
			data,
			error,
		}
	}

	/// Splits `data` into positional arguments.
	///
	/// A non-array payload is treated as a single argument; `null` as none.
	#[must_use]
	pub fn into_args(self) -> Vec<JsonValue> {
		match self.data {
			JsonValue::Array(args) => args,
			JsonValue::Null => Vec::new(),
			other => vec![other],
		}
	}
}
