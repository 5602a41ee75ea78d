//! In-memory backend for the console features.
//!
//! [`MockBackend`] loads the bundled fixtures, answers the GraphQL-style
//! instance queries of [`query`], and hands out host-side drivers for every
//! feature.

pub mod drivers;
pub mod fixtures;
pub mod query;

use std::sync::Arc;

use mfe_bus::Result;
use parking_lot::RwLock;

pub use drivers::{DashboardStore, FormStore, JobStore, Navigation, NavigationLog, ProcessStore, WorkflowFormHost};
pub use fixtures::{Fixtures, NodeInstance, ProcessInstance, ProcessInstanceState, UserTaskInstance};
pub use query::{ProcessIdFilter, ProcessInstanceFilter, UserTaskInstanceFilter};

/// Shared stores of one demo backend.
#[derive(Debug)]
pub struct MockBackend {
	instances: Arc<RwLock<Vec<ProcessInstance>>>,
	tasks: Vec<UserTaskInstance>,
	workflows: Vec<fixtures::WorkflowEntry>,
	navigation: Arc<NavigationLog>,
	forms: Arc<FormStore>,
	jobs: Arc<JobStore>,
	processes: Arc<ProcessStore>,
	dashboards: Arc<DashboardStore>,
}

impl MockBackend {
	/// Builds a backend over the bundled fixtures.
	///
	/// # Errors
	///
	/// Returns the decode error if the bundled fixtures are malformed.
	pub fn bundled() -> serde_json::Result<Self> {
		Ok(Self::new(Fixtures::bundled()?))
	}

	/// Builds a backend over `fixtures`.
	#[must_use]
	pub fn new(fixtures: Fixtures) -> Self {
		let Fixtures {
			process_instances,
			user_task_instances,
			forms,
			jobs,
			process_definitions,
			workflows,
			dashboards,
		} = fixtures;
		let instances = Arc::new(RwLock::new(process_instances));
		let navigation = Arc::new(NavigationLog::default());
		let forms = Arc::new(FormStore::new(forms, Arc::clone(&navigation)));
		let processes = Arc::new(ProcessStore::new(
			process_definitions,
			Arc::clone(&instances),
			Arc::clone(&forms),
			Arc::clone(&navigation),
		));
		Self {
			instances,
			tasks: user_task_instances,
			workflows,
			navigation,
			forms,
			jobs: Arc::new(JobStore::new(jobs)),
			processes,
			dashboards: Arc::new(DashboardStore::new(dashboards)),
		}
	}

	/// `ProcessInstances(filter)` over the current instances, including started ones.
	#[must_use]
	pub fn process_instances(&self, filter: &ProcessInstanceFilter) -> Vec<ProcessInstance> {
		query::process_instances(&self.instances.read(), filter)
	}

	/// `UserTaskInstances(filter)`.
	#[must_use]
	pub fn user_task_instances(&self, filter: &UserTaskInstanceFilter) -> Vec<UserTaskInstance> {
		query::user_task_instances(&self.tasks, filter)
	}

	/// `ProcessId(filter)`.
	#[must_use]
	pub fn process_id(&self, filter: &ProcessIdFilter) -> Vec<ProcessInstance> {
		query::process_id(&self.instances.read(), filter)
	}

	/// Driver of the forms list and form details features.
	#[must_use]
	pub fn forms(&self) -> Arc<FormStore> {
		Arc::clone(&self.forms)
	}

	/// Driver of the jobs management feature.
	#[must_use]
	pub fn jobs(&self) -> Arc<JobStore> {
		Arc::clone(&self.jobs)
	}

	/// Driver of the process definition list and process form features.
	#[must_use]
	pub fn processes(&self) -> Arc<ProcessStore> {
		Arc::clone(&self.processes)
	}

	/// Driver of the custom dashboard view feature.
	#[must_use]
	pub fn dashboards(&self) -> Arc<DashboardStore> {
		Arc::clone(&self.dashboards)
	}

	/// Driver of the start form of workflow `name`.
	///
	/// # Errors
	///
	/// Returns a [`drivers::NOT_FOUND`] error response for an unknown workflow.
	pub fn workflow_form(&self, name: &str) -> Result<WorkflowFormHost> {
		let workflow = self
			.workflows
			.iter()
			.find(|w| w.workflow_name == name)
			.cloned()
			.ok_or_else(|| drivers::not_found("workflow", name))?;
		Ok(WorkflowFormHost::new(workflow, Arc::clone(&self.instances)))
	}

	/// Definitions of every deployed workflow.
	#[must_use]
	pub fn workflow_definitions(&self) -> Vec<mfe_features::WorkflowDefinition> {
		self.workflows.iter().map(fixtures::WorkflowEntry::definition).collect()
	}

	/// Navigation requested by views so far.
	#[must_use]
	pub fn navigation(&self) -> Vec<Navigation> {
		self.navigation.entries()
	}
}
