//! Generic envelope abstraction over the envelope bus.
//!
//! A feature is declared once with [`define_feature!`]; this crate supplies
//! everything both sides of it share:
//! * [`Envelope`]: The embedded side, serving `<feature>__init` and holding the view
//! * [`EnvelopeApiImpl`]: The init-once handshake with re-association
//! * [`EnvelopeClient`]: Envelope-side requests to the associated channel
//! * [`EmbeddedEnvelope`] / [`EnvelopeServer`]: The channel side, including init polling
//! * [`BusConfig`]: Polling, timeout, and origin settings loaded from TOML

#![warn(missing_docs)]

pub mod api;
pub mod channel;
pub mod client;
pub mod config;
pub mod envelope;
pub mod feature;
pub mod macros;

pub use api::{Associate, EnvelopeApiImpl};
pub use channel::{ChannelOptions, EmbeddedEnvelope, EnvelopeServer, InitPolling};
pub use client::EnvelopeClient;
pub use config::{BusConfig, ConfigError};
pub use envelope::{Envelope, EnvelopeOptions};
pub use feature::{Feature, InitState, MountSlot, Mounter, ReadyView, RequestSender, View, ViewDelegate, view_failed};

/// Items used by [`define_feature!`] expansions.
#[doc(hidden)]
pub mod __private {
	pub use std::sync::Arc;

	pub use async_trait::async_trait;
	pub use mfe_bus::{JsonValue, Result, Router, reply, to_arg};
	pub use serde_json;
}
