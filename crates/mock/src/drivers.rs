//! Host-side drivers backed by in-memory stores.
//!
//! Each store implements the Driver trait(s) of the features it serves, so
//! the channel can register it directly with the feature's channel API.
//! Lookups of unknown names or ids fail with a [`NOT_FOUND`] error response.

mod dashboards;
mod forms;
mod jobs;
mod processes;
mod workflows;

use mfe_bus::{Error, ErrorCode, ResponseError};
use mfe_features::ProcessDefinition;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::json;

pub use dashboards::DashboardStore;
pub use forms::FormStore;
pub use jobs::JobStore;
pub use processes::ProcessStore;
pub use workflows::WorkflowFormHost;

/// Error code of a lookup that found nothing.
pub const NOT_FOUND: ErrorCode = ErrorCode(-32004);

pub(crate) fn not_found(kind: &'static str, name: &str) -> Error {
	Error::Response(
		ResponseError::new(NOT_FOUND, format!("{kind} `{name}` not found")).with_data(json!({ "kind": kind, "name": name })),
	)
}

pub(crate) fn invalid(message: impl std::fmt::Display) -> Error {
	Error::Response(ResponseError::new(ErrorCode::INVALID_PARAMS, message))
}

/// A page change requested by a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "to", rename_all = "camelCase")]
pub enum Navigation {
	/// Form details of the named form.
	FormDetails { name: String },
	/// Start form of a process.
	ProcessForm { definition: ProcessDefinition },
	/// Cloud event trigger page.
	TriggerCloudEvent,
}

/// Navigation requests recorded in arrival order.
#[derive(Debug, Default)]
pub struct NavigationLog(Mutex<Vec<Navigation>>);

impl NavigationLog {
	pub(crate) fn push(&self, nav: Navigation) {
		tracing::info!(?nav, "navigation requested");
		self.0.lock().push(nav);
	}

	/// Every navigation so far.
	#[must_use]
	pub fn entries(&self) -> Vec<Navigation> {
		self.0.lock().clone()
	}
}

#[cfg(test)]
mod tests;
