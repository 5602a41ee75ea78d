//! `jobsManagement`: list, cancel, and reschedule timer jobs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
	Error,
	Executed,
	Scheduled,
	Retry,
	Canceled,
}

impl JobStatus {
	/// Whether a job in this state can still be canceled or rescheduled.
	#[must_use]
	pub fn is_pending(self) -> bool {
		matches!(self, Self::Scheduled | Self::Retry | Self::Error)
	}
}

/// Sort direction of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
	Asc,
	Desc,
}

/// Column name to sort direction, e.g. `{"lastUpdate": "DESC"}`.
pub type SortBy = BTreeMap<String, SortOrder>;

/// A timer job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
	pub id: String,
	pub process_id: String,
	pub process_instance_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub root_process_instance_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub root_process_id: Option<String>,
	pub status: JobStatus,
	pub expiration_time: DateTime<Utc>,
	pub priority: u32,
	pub callback_endpoint: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub repeat_interval: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub repeat_limit: Option<u32>,
	pub scheduled_id: String,
	pub retries: u32,
	pub last_update: DateTime<Utc>,
	pub execution_counter: u32,
	pub endpoint: String,
	pub node_instance_id: String,
}

/// Outcome of a bulk cancel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCancel {
	pub success_jobs: Vec<Job>,
	pub failed_jobs: Vec<Job>,
}

/// Outcome of a single cancel, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCancel {
	pub modal_title: String,
	pub modal_content: String,
}

/// Outcome of a reschedule, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReschedule {
	pub modal_title: String,
	pub modal_content: String,
}

mfe_envelope::define_feature! {
	/// Jobs management feature. Takes no init payload.
	pub struct JobsManagement = "jobsManagement";
	init = ();
	driver = JobsManagementDriver;
	view_driver = JobsManagementEnvelopeViewDriver;
	channel_api = JobsManagementChannelApi;
	methods {
		/// Sets both the status filter and the sort order before the first query.
		fn initial_load = "initialLoad" (filter: Vec<JobStatus>, order_by: SortBy) -> ();
		fn apply_filter = "applyFilter" (filter: Vec<JobStatus>) -> ();
		/// Cancels every job it can; the rest are reported as failed.
		fn bulk_cancel = "bulkCancel" (jobs: Vec<Job>) -> BulkCancel;
		fn cancel_job = "cancelJob" (job: Job) -> JobCancel;
		/// Moves `job` to `schedule_date`, optionally changing its repetition.
		fn reschedule_job = "rescheduleJob" (
			job: Job,
			repeat_interval: Option<u32>,
			repeat_limit: Option<u32>,
			schedule_date: DateTime<Utc>,
		) -> JobReschedule;
		fn sort_by = "sortBy" (order_by: SortBy) -> ();
		/// One page of jobs matching the current filter and order.
		fn query = "query" (offset: usize, limit: usize) -> Vec<Job>;
	}
}
