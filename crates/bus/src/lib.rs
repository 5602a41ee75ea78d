//! Envelope bus: typed request/notification messaging between a channel (the
//! embedding host) and the envelopes (embedded views) it mounts.
//!
//! This crate provides the transport-agnostic plumbing:
//! * [`BusMessage`]: The wire message, `postMessage`-shaped JSON
//! * [`Transport`]: Message carriers ([`MemoryWindow`], [`StreamTransport`])
//! * [`BusEndpoint`]: A tokio-driven message pump for either side
//! * [`Router`]: Method-name dispatch for inbound requests and notifications
//! * [`PeerSocket`]: Cloneable handle for outbound requests and notifications

#![warn(missing_docs)]

pub mod codec;
pub mod endpoint;
mod error;
pub mod protocol;
pub mod router;
pub mod socket;
pub mod transport;
pub mod types;

pub use endpoint::{BusEndpoint, Role, SharedAssociation};
pub use error::{Error, Result};
pub use protocol::{CounterIdGen, Inbound};
pub use router::{Args, Router, reply};
pub use serde_json::Value as JsonValue;
pub use socket::{MainLoopEvent, PeerSocket, to_arg};
pub use transport::{MemoryTransport, MemoryWindow, StreamTransport, Transport};
pub use types::{ANY_ORIGIN, Association, BusMessage, ErrorCode, Purpose, RequestId, ResponseError};
