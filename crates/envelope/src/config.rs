//! Bus configuration, loaded from TOML.
//!
//! ```toml
//! poll-interval-ms = 100
//! init-timeout-ms = 60000
//! request-timeout-ms = 30000
//! channel-origin = "http://localhost:9000"
//! envelope-origin = "*"
//! envelope-id = "forms-list"
//! ```
//!
//! Every key is optional; unknown keys are rejected.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::channel::{ChannelOptions, InitPolling};
use crate::envelope::EnvelopeOptions;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or an unknown key.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// A value is out of range.
	#[error("invalid value for `{key}`: {reason}")]
	Invalid {
		/// Offending key.
		key: &'static str,
		/// Why it was rejected.
		reason: &'static str,
	},
}

/// Settings shared by the channel and envelope sides of a bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct BusConfig {
	/// Delay between two `<feature>__init` attempts.
	pub poll_interval_ms: u64,
	/// How long the channel polls before giving up on the envelope.
	pub init_timeout_ms: u64,
	/// Per-request timeout; unset waits forever.
	pub request_timeout_ms: Option<u64>,
	/// Origin of the channel, handed to envelopes in their association.
	pub channel_origin: String,
	/// Origin the channel posts to; `*` for any.
	pub envelope_origin: String,
	/// Envelope id the channel addresses and the envelope answers to.
	pub envelope_id: Option<String>,
}

impl Default for BusConfig {
	fn default() -> Self {
		Self {
			poll_interval_ms: 100,
			init_timeout_ms: 60_000,
			request_timeout_ms: None,
			channel_origin: "http://localhost".to_owned(),
			envelope_origin: mfe_bus::ANY_ORIGIN.to_owned(),
			envelope_id: None,
		}
	}
}

impl BusConfig {
	/// Parses and validates a TOML document.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::Toml`] for syntax errors or unknown keys and
	/// [`ConfigError::Invalid`] for out-of-range values.
	pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads, parses, and validates a TOML file.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::Io`] when the file cannot be read, otherwise
	/// as [`BusConfig::from_toml_str`].
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&text)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.poll_interval_ms == 0 {
			return Err(ConfigError::Invalid {
				key: "poll-interval-ms",
				reason: "must be greater than zero",
			});
		}
		if self.init_timeout_ms < self.poll_interval_ms {
			return Err(ConfigError::Invalid {
				key: "init-timeout-ms",
				reason: "must not be shorter than poll-interval-ms",
			});
		}
		if self.request_timeout_ms == Some(0) {
			return Err(ConfigError::Invalid {
				key: "request-timeout-ms",
				reason: "must be greater than zero",
			});
		}
		if self.channel_origin.is_empty() {
			return Err(ConfigError::Invalid {
				key: "channel-origin",
				reason: "must not be empty",
			});
		}
		Ok(())
	}

	/// Per-request timeout.
	#[must_use]
	pub fn request_timeout(&self) -> Option<Duration> {
		self.request_timeout_ms.map(Duration::from_millis)
	}

	/// Init polling cadence.
	#[must_use]
	pub fn init_polling(&self) -> InitPolling {
		InitPolling {
			interval: Duration::from_millis(self.poll_interval_ms),
			timeout: Duration::from_millis(self.init_timeout_ms),
		}
	}

	/// Channel-side options with a freshly generated server id.
	#[must_use]
	pub fn channel_options(&self) -> ChannelOptions {
		ChannelOptions {
			origin: self.channel_origin.clone(),
			target_origin: self.envelope_origin.clone(),
			server_id: uuid::Uuid::new_v4().to_string(),
			envelope_id: self.envelope_id.clone(),
			request_timeout: self.request_timeout(),
		}
	}

	/// Envelope-side options.
	#[must_use]
	pub fn envelope_options(&self) -> EnvelopeOptions {
		EnvelopeOptions {
			envelope_id: self.envelope_id.clone(),
			request_timeout: self.request_timeout(),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_document_yields_defaults() {
		assert_eq!(BusConfig::from_toml_str("").unwrap(), BusConfig::default());
	}

	#[test]
	fn kebab_case_keys_override_defaults() {
		let config = BusConfig::from_toml_str(
			r#"
			poll-interval-ms = 25
			request-timeout-ms = 500
			envelope-id = "forms"
			"#,
		)
		.unwrap();
		assert_eq!(config.poll_interval_ms, 25);
		assert_eq!(config.request_timeout(), Some(Duration::from_millis(500)));
		assert_eq!(config.envelope_options().envelope_id.as_deref(), Some("forms"));
		assert_eq!(config.init_polling().interval, Duration::from_millis(25));
	}

	#[test]
	fn unknown_keys_are_rejected() {
		assert!(matches!(BusConfig::from_toml_str("poll-interval = 1"), Err(ConfigError::Toml(_))));
	}

	#[test]
	fn zero_interval_is_invalid() {
		let err = BusConfig::from_toml_str("poll-interval-ms = 0").unwrap_err();
		assert!(matches!(err, ConfigError::Invalid { key: "poll-interval-ms", .. }));
	}

	#[test]
	fn zero_request_timeout_is_invalid() {
		let err = BusConfig::from_toml_str("request-timeout-ms = 0").unwrap_err();
		assert!(matches!(err, ConfigError::Invalid { key: "request-timeout-ms", .. }));
	}

	#[test]
	fn channel_options_get_unique_server_ids() {
		let config = BusConfig::default();
		let a = config.channel_options();
		let b = config.channel_options();
		assert_ne!(a.server_id, b.server_id);
		assert_eq!(a.target_origin, "*");
	}

	#[test]
	fn load_reads_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "channel-origin = \"http://console\"").unwrap();
		let config = BusConfig::load(file.path()).unwrap();
		assert_eq!(config.channel_origin, "http://console");
	}

	#[test]
	fn missing_file_is_io_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = BusConfig::load(dir.path().join("absent.toml")).unwrap_err();
		assert!(matches!(err, ConfigError::Io { .. }));
	}
}
