//! Message pump driving one side of the bus.

use std::collections::HashMap;
use std::future::Future;
use std::ops::ControlFlow;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use parking_lot::RwLock;
use pin_project_lite::pin_project;
use serde_json::Value as JsonValue;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, trace, warn};

use crate::protocol::{CounterIdGen, Inbound, InboundRequest};
use crate::router::Router;
use crate::socket::{MainLoopEvent, PeerSocket};
use crate::transport::Transport;
use crate::types::{ANY_ORIGIN, Association, BusMessage, Purpose, RequestId, ResponseError};
use crate::{Error, Result};

/// Association slot shared between an envelope endpoint and its client.
pub type SharedAssociation = Arc<RwLock<Option<Association>>>;

/// Which side of the bus an endpoint serves, and how it addresses messages.
#[derive(Debug, Clone)]
pub enum Role {
	/// The embedding host.
	Channel {
		/// Server id stamped on every outbound message and required on inbound ones.
		server_id: String,
		/// Origin of the embedded envelope.
		target_origin: String,
		/// Envelope id to address, when the host knows it.
		envelope_id: Option<String>,
	},
	/// The embedded view.
	Envelope {
		/// This envelope's id; inbound messages addressed elsewhere are ignored.
		envelope_id: Option<String>,
		/// Set by `associate`; routes outbound messages.
		association: SharedAssociation,
	},
}

impl Role {
	/// Returns false when `msg` is addressed to somebody else.
	fn accepts(&self, msg: &BusMessage) -> bool {
		match self {
			Self::Channel { server_id, .. } => msg.target_envelope_server_id.as_deref() == Some(server_id.as_str()),
			Self::Envelope { envelope_id, .. } => match (&msg.target_envelope_id, envelope_id) {
				(Some(target), Some(mine)) => target == mine,
				_ => true,
			},
		}
	}

	/// Addresses an outbound message and returns the origin to post it to.
	fn stamp(&self, msg: &mut BusMessage) -> Result<String> {
		match self {
			Self::Channel {
				server_id,
				target_origin,
				envelope_id,
			} => {
				msg.target_envelope_server_id = Some(server_id.clone());
				msg.target_envelope_id.clone_from(envelope_id);
				Ok(target_origin.clone())
			}
			Self::Envelope { association, .. } => {
				let association = association.read();
				match (association.as_ref(), msg.purpose) {
					(Some(assoc), Purpose::Response) => {
						if msg.target_envelope_server_id.is_none() {
							msg.target_envelope_server_id = Some(assoc.envelope_server_id.clone());
						}
						Ok(assoc.origin.clone())
					}
					(Some(assoc), _) => {
						msg.target_envelope_server_id = Some(assoc.envelope_server_id.clone());
						Ok(assoc.origin.clone())
					}
					(None, Purpose::Response) => Ok(ANY_ORIGIN.to_owned()),
					(None, _) => Err(Error::NotAssociated),
				}
			}
		}
	}
}

/// Drives one side of the bus: reads inbound messages, runs request handlers,
/// resolves pending requests, and posts everything outbound.
pub struct BusEndpoint<T: Transport> {
	/// Message carrier.
	transport: T,
	/// Inbound request and notification table.
	router: Router,
	/// Addressing rules.
	role: Role,
	/// Receiver for internal events from sockets.
	rx: mpsc::UnboundedReceiver<MainLoopEvent>,
	/// Generator for outgoing request ids.
	ids: CounterIdGen,
	/// Pending outgoing requests awaiting responses.
	outgoing: HashMap<RequestId, oneshot::Sender<Result<JsonValue>>>,
	/// Concurrent request handlers in flight.
	tasks: tokio::task::JoinSet<BusMessage>,
}

impl<T: Transport> std::fmt::Debug for BusEndpoint<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BusEndpoint")
			.field("role", &self.role)
			.field("router", &self.router)
			.field("pending", &self.outgoing.len())
			.field("in_flight", &self.tasks.len())
			.finish_non_exhaustive()
	}
}

impl<T: Transport> BusEndpoint<T> {
	/// Creates an endpoint and the socket to talk through it.
	///
	/// `builder` receives a clone of the socket so that handlers can call back
	/// into the peer.
	#[must_use]
	pub fn new(transport: T, role: Role, builder: impl FnOnce(PeerSocket) -> Router) -> (Self, PeerSocket) {
		let (tx, rx) = mpsc::unbounded_channel();
		let socket = PeerSocket {
			tx,
			request_timeout: None,
		};
		let this = Self {
			transport,
			router: builder(socket.clone()),
			role,
			rx,
			ids: CounterIdGen::new(),
			outgoing: HashMap::new(),
			tasks: tokio::task::JoinSet::new(),
		};
		(this, socket)
	}

	/// Addressing rules of this endpoint.
	#[must_use]
	pub fn role(&self) -> &Role {
		&self.role
	}

	/// Runs the pump until shutdown, transport EOF, or all sockets are dropped.
	///
	/// Pending requests fail with [`Error::ServiceStopped`] once this returns.
	///
	/// # Errors
	///
	/// - [`Error::Io`] when the transport fails.
	/// - Errors returned by notification handlers that break the loop.
	pub async fn run(mut self) -> Result<()> {
		self.transport.start_listening();
		debug!(role = ?self.role, "bus endpoint listening");

		let ret = loop {
			let ctl = tokio::select! {
				biased;

				resp = self.tasks.join_next(), if !self.tasks.is_empty() => match resp {
					Some(Ok(resp)) => ControlFlow::Continue(Some(resp)),
					Some(Err(e)) => {
						error!(error = %e, "request task panicked or was cancelled");
						ControlFlow::Continue(None)
					}
					None => ControlFlow::Continue(None),
				},

				event = self.rx.recv() => match event {
					Some(e) => self.dispatch_event(e),
					None => break Ok(()),
				},

				msg = self.transport.next_message() => match msg {
					Some(Ok(msg)) => self.dispatch_message(msg),
					Some(Err(Error::Deserialize(e))) => {
						warn!(error = %e, "dropping undecodable message");
						ControlFlow::Continue(None)
					}
					Some(Err(e)) => break Err(e),
					None => break Ok(()),
				},
			};

			match ctl {
				ControlFlow::Continue(Some(resp)) => {
					if let Err(e) = self.post(resp).await {
						break Err(e);
					}
				}
				ControlFlow::Continue(None) => {}
				ControlFlow::Break(ret) => break ret,
			}
		};

		debug!(pending = self.outgoing.len(), "bus endpoint stopped");
		ret
	}

	/// Stamps and posts one outbound message.
	async fn post(&mut self, mut msg: BusMessage) -> Result<()> {
		let origin = self.role.stamp(&mut msg)?;
		trace!(method = %msg.method, purpose = ?msg.purpose, %origin, "post");
		self.transport.post_message(msg, &origin).await
	}

	/// Routes an internal event from a socket.
	fn dispatch_event(&mut self, event: MainLoopEvent) -> ControlFlow<Result<()>, Option<BusMessage>> {
		match event {
			MainLoopEvent::OutgoingRequest(msg, resp_tx) => {
				let mut msg = msg;
				let id = self.ids.next();
				msg.request_id = Some(id);
				if let Err(e) = self.role.stamp(&mut msg) {
					let _ = resp_tx.send(Err(e));
					return ControlFlow::Continue(None);
				}
				// Requesters that timed out or gave up never get their entry answered.
				self.outgoing.retain(|_, tx| !tx.is_closed());
				self.outgoing.insert(id, resp_tx);
				ControlFlow::Continue(Some(msg))
			}
			MainLoopEvent::Outgoing(mut msg, ack) => {
				let res = self.role.stamp(&mut msg);
				match (res, ack) {
					(Ok(_), Some(ack)) => {
						let _ = ack.send(Ok(()));
						ControlFlow::Continue(Some(msg))
					}
					(Ok(_), None) => ControlFlow::Continue(Some(msg)),
					(Err(e), Some(ack)) => {
						let _ = ack.send(Err(e));
						ControlFlow::Continue(None)
					}
					(Err(e), None) => {
						warn!(method = %msg.method, error = %e, "notification dropped");
						ControlFlow::Continue(None)
					}
				}
			}
			MainLoopEvent::Shutdown => ControlFlow::Break(Ok(())),
		}
	}

	/// Routes an inbound message from the transport.
	fn dispatch_message(&mut self, msg: BusMessage) -> ControlFlow<Result<()>, Option<BusMessage>> {
		if !self.role.accepts(&msg) {
			trace!(
				method = %msg.method,
				server_id = ?msg.target_envelope_server_id,
				envelope_id = ?msg.target_envelope_id,
				"ignoring message addressed elsewhere"
			);
			return ControlFlow::Continue(None);
		}

		let inbound = match Inbound::classify(msg) {
			Ok(inbound) => inbound,
			Err(e) => {
				warn!(error = %e, "dropping malformed message");
				return ControlFlow::Continue(None);
			}
		};

		match inbound {
			Inbound::Request(mut req) => {
				trace!(method = %req.method, id = %req.id, "inbound request");
				let args = std::mem::take(&mut req.args);
				let fut = self.router.call(&req.method, args);
				self.tasks.spawn(RequestFuture::new(fut, req));
			}
			Inbound::Response(resp) => match self.outgoing.remove(&resp.id) {
				Some(tx) => {
					// The requester may have given up.
					let _ = tx.send(resp.result.map_err(Error::Response));
				}
				None => debug!(id = %resp.id, method = %resp.method, "response for unknown request"),
			},
			Inbound::Notification { method, args } => {
				trace!(%method, "inbound notification");
				self.router.notify(&method, args)?;
			}
		}
		ControlFlow::Continue(None)
	}
}

pin_project! {
	/// Turns a handler future into the response message for its request.
	struct RequestFuture<Fut> {
		#[pin]
		fut: Fut,
		req: Option<InboundRequest>,
	}
}

impl<Fut> RequestFuture<Fut> {
	fn new(fut: Fut, req: InboundRequest) -> Self {
		Self { fut, req: Some(req) }
	}
}

impl<Fut> Future for RequestFuture<Fut>
where
	Fut: Future<Output = std::result::Result<JsonValue, ResponseError>>,
{
	type Output = BusMessage;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		let this = self.project();
		let result = ready!(this.fut.poll(cx));
		let req = this.req.take().expect("future polled after completion");
		let mut resp = BusMessage::response(req.id, req.method, result);
		resp.target_envelope_server_id = req.server_id;
		Poll::Ready(resp)
	}
}
