use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mfe_bus::Result;
use mfe_features::{BulkCancel, Job, JobCancel, JobReschedule, JobStatus, JobsManagementDriver, SortBy, SortOrder};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use super::{invalid, not_found};

/// Columns the jobs list can be sorted by.
const SORT_KEYS: &[&str] = &[
	"id",
	"processId",
	"status",
	"priority",
	"retries",
	"executionCounter",
	"expirationTime",
	"lastUpdate",
];

fn compare_by(key: &str, a: &Job, b: &Job) -> Ordering {
	match key {
		"id" => a.id.cmp(&b.id),
		"processId" => a.process_id.cmp(&b.process_id),
		"status" => a.status.cmp(&b.status),
		"priority" => a.priority.cmp(&b.priority),
		"retries" => a.retries.cmp(&b.retries),
		"executionCounter" => a.execution_counter.cmp(&b.execution_counter),
		"expirationTime" => a.expiration_time.cmp(&b.expiration_time),
		"lastUpdate" => a.last_update.cmp(&b.last_update),
		_ => Ordering::Equal,
	}
}

fn validate_order(order_by: &SortBy) -> Result<()> {
	match order_by.keys().find(|k| !SORT_KEYS.contains(&k.as_str())) {
		Some(key) => Err(invalid(format!("cannot sort jobs by `{key}`"))),
		None => Ok(()),
	}
}

/// Timer jobs with the list state of the jobs management view.
#[derive(Debug)]
pub struct JobStore {
	jobs: RwLock<Vec<Job>>,
	filter: Mutex<Vec<JobStatus>>,
	order_by: Mutex<SortBy>,
}

impl JobStore {
	pub fn new(jobs: Vec<Job>) -> Self {
		Self {
			jobs: RwLock::new(jobs),
			filter: Mutex::new(Vec::new()),
			order_by: Mutex::new(SortBy::new()),
		}
	}

	/// The stored job with `id`.
	#[must_use]
	pub fn get(&self, id: &str) -> Option<Job> {
		self.jobs.read().iter().find(|j| j.id == id).cloned()
	}

	/// Cancels a pending job in place. `Ok(None)` if it is no longer pending.
	fn cancel(&self, id: &str) -> Result<Option<Job>> {
		let mut jobs = self.jobs.write();
		let job = jobs.iter_mut().find(|j| j.id == id).ok_or_else(|| not_found("job", id))?;
		if !job.status.is_pending() {
			return Ok(None);
		}
		job.status = JobStatus::Canceled;
		job.last_update = Utc::now();
		Ok(Some(job.clone()))
	}
}

#[async_trait]
impl JobsManagementDriver for JobStore {
	async fn initial_load(&self, filter: Vec<JobStatus>, order_by: SortBy) -> Result<()> {
		validate_order(&order_by)?;
		*self.filter.lock() = filter;
		*self.order_by.lock() = order_by;
		Ok(())
	}

	async fn apply_filter(&self, filter: Vec<JobStatus>) -> Result<()> {
		debug!(?filter, "jobs filter applied");
		*self.filter.lock() = filter;
		Ok(())
	}

	async fn bulk_cancel(&self, jobs: Vec<Job>) -> Result<BulkCancel> {
		let mut outcome = BulkCancel::default();
		for job in jobs {
			match self.cancel(&job.id) {
				Ok(Some(canceled)) => outcome.success_jobs.push(canceled),
				Ok(None) | Err(_) => outcome.failed_jobs.push(job),
			}
		}
		info!(
			canceled = outcome.success_jobs.len(),
			failed = outcome.failed_jobs.len(),
			"bulk cancel"
		);
		Ok(outcome)
	}

	async fn cancel_job(&self, job: Job) -> Result<JobCancel> {
		Ok(match self.cancel(&job.id)? {
			Some(_) => JobCancel {
				modal_title: "success".to_owned(),
				modal_content: format!("The job: {} is canceled successfully", job.id),
			},
			None => JobCancel {
				modal_title: "failure".to_owned(),
				modal_content: format!("The job: {} failed to cancel. Error message: job is not pending", job.id),
			},
		})
	}

	async fn reschedule_job(
		&self,
		job: Job,
		repeat_interval: Option<u32>,
		repeat_limit: Option<u32>,
		schedule_date: DateTime<Utc>,
	) -> Result<JobReschedule> {
		let mut jobs = self.jobs.write();
		let stored = jobs.iter_mut().find(|j| j.id == job.id).ok_or_else(|| not_found("job", &job.id))?;
		if !stored.status.is_pending() {
			return Ok(JobReschedule {
				modal_title: "failure".to_owned(),
				modal_content: format!("Reschedule of job: {} failed. Message: job is not pending", job.id),
			});
		}
		stored.expiration_time = schedule_date;
		stored.repeat_interval = repeat_interval;
		stored.repeat_limit = repeat_limit;
		stored.status = JobStatus::Scheduled;
		stored.last_update = Utc::now();
		info!(job = %job.id, %schedule_date, "job rescheduled");
		Ok(JobReschedule {
			modal_title: "success".to_owned(),
			modal_content: "Reschedule of job is successful".to_owned(),
		})
	}

	async fn sort_by(&self, order_by: SortBy) -> Result<()> {
		validate_order(&order_by)?;
		*self.order_by.lock() = order_by;
		Ok(())
	}

	async fn query(&self, offset: usize, limit: usize) -> Result<Vec<Job>> {
		let filter = self.filter.lock().clone();
		let order_by = self.order_by.lock().clone();
		let mut page: Vec<Job> = self
			.jobs
			.read()
			.iter()
			.filter(|j| filter.is_empty() || filter.contains(&j.status))
			.cloned()
			.collect();
		// Multiple columns apply in column-name order.
		page.sort_by(|a, b| {
			order_by
				.iter()
				.map(|(key, order)| match order {
					SortOrder::Asc => compare_by(key, a, b),
					SortOrder::Desc => compare_by(key, b, a),
				})
				.find(|o| o.is_ne())
				.unwrap_or(Ordering::Equal)
		});
		Ok(page.into_iter().skip(offset).take(limit).collect())
	}
}
