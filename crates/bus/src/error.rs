//! Error type shared by every bus participant.

use std::io;

use crate::types::{ErrorCode, ResponseError};

/// A convenient type alias for `Result` with `E` = [`enum@crate::Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Possible errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// The endpoint message pump stopped.
	#[error("service stopped")]
	ServiceStopped,
	/// A payload could not be encoded or decoded.
	#[error("deserialization failed: {0}")]
	Deserialize(#[from] serde_json::Error),
	/// The peer answered with an error.
	#[error("{0}")]
	Response(#[from] ResponseError),
	/// The peer sent something that is not a valid bus message.
	#[error("protocol error: {0}")]
	Protocol(String),
	/// Input/output errors from the underlying transport.
	#[error("{0}")]
	Io(#[from] io::Error),
	/// The underlying transport reached EOF.
	#[error("the underlying transport reached EOF")]
	Eof,
	/// The envelope tried to talk to its channel before `associate`.
	#[error("envelope is not associated with a channel")]
	NotAssociated,
	/// An association had an empty origin or server id.
	#[error("invalid association: origin and envelope server id must be non-empty")]
	InvalidAssociation,
	/// The envelope never answered the init handshake.
	#[error("envelope did not answer `{0}` in time")]
	InitTimeout(String),
	/// A request got no response within the configured timeout.
	#[error("request `{0}` timed out")]
	RequestTimeout(String),
	/// No handler is able to accept a message.
	#[error("{0}")]
	Routing(String),
}

impl From<Error> for ResponseError {
	fn from(err: Error) -> Self {
		match err {
			Error::Response(resp) => resp,
			Error::Deserialize(e) => ResponseError::new(ErrorCode::INVALID_PARAMS, e),
			Error::NotAssociated => ResponseError::new(ErrorCode::NOT_ASSOCIATED, Error::NotAssociated),
			Error::Routing(msg) => ResponseError::new(ErrorCode::METHOD_NOT_FOUND, msg),
			other => ResponseError::new(ErrorCode::INTERNAL_ERROR, other),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn response_errors_pass_through_unchanged() {
		let original = ResponseError::new(ErrorCode(42), "backend down");
		let converted = ResponseError::from(Error::Response(original.clone()));
		assert_eq!(converted, original);
	}

	#[test]
	fn local_errors_map_to_codes() {
		assert_eq!(ResponseError::from(Error::ServiceStopped).code, ErrorCode::INTERNAL_ERROR);
		assert_eq!(ResponseError::from(Error::NotAssociated).code, ErrorCode::NOT_ASSOCIATED);
		assert_eq!(
			ResponseError::from(Error::Routing("no handler".into())),
			ResponseError::new(ErrorCode::METHOD_NOT_FOUND, "no handler")
		);
		let bad = serde_json::from_str::<u32>("\"x\"").unwrap_err();
		assert_eq!(ResponseError::from(Error::Deserialize(bad)).code, ErrorCode::INVALID_PARAMS);
	}
}
