//! Bundled demo data, shaped like the console's GraphQL backend.

use chrono::{DateTime, Utc};
use mfe_features::{Form, Job, ProcessDefinition, WorkflowDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

const CONSOLE_JSON: &str = include_str!("../fixtures/console.json");

/// State of a process instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessInstanceState {
	Pending,
	Active,
	Completed,
	Aborted,
	Suspended,
	Error,
}

/// One executed or executing node of a process instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInstance {
	pub id: String,
	pub node_id: String,
	pub name: String,
	#[serde(rename = "type")]
	pub node_type: String,
	pub definition_id: String,
	pub enter: DateTime<Utc>,
	pub exit: Option<DateTime<Utc>>,
}

/// Failure recorded on a process instance in `ERROR` state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInstanceError {
	pub node_definition_id: String,
	pub message: String,
}

/// A process instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInstance {
	pub id: String,
	pub process_id: String,
	pub process_name: String,
	pub parent_process_instance_id: Option<String>,
	pub root_process_instance_id: Option<String>,
	pub root_process_id: Option<String>,
	pub roles: Vec<String>,
	pub state: ProcessInstanceState,
	pub endpoint: String,
	pub service_url: Option<String>,
	pub business_key: Option<String>,
	pub addons: Vec<String>,
	pub start: DateTime<Utc>,
	pub end: Option<DateTime<Utc>>,
	pub last_update: DateTime<Utc>,
	pub variables: JsonValue,
	pub error: Option<ProcessInstanceError>,
	pub nodes: Vec<NodeInstance>,
}

/// A human task of a process instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTaskInstance {
	pub id: String,
	pub name: String,
	pub reference_name: String,
	pub description: Option<String>,
	pub priority: String,
	pub process_instance_id: String,
	pub process_id: String,
	pub root_process_instance_id: Option<String>,
	pub root_process_id: Option<String>,
	pub state: String,
	pub actual_owner: Option<String>,
	pub admin_groups: Vec<String>,
	pub admin_users: Vec<String>,
	pub excluded_users: Vec<String>,
	pub potential_groups: Vec<String>,
	pub potential_users: Vec<String>,
	pub started: DateTime<Utc>,
	pub completed: Option<DateTime<Utc>>,
	pub last_update: DateTime<Utc>,
	/// Task inputs, as JSON text.
	pub inputs: String,
	/// Task outputs, as JSON text.
	pub outputs: String,
	pub endpoint: String,
}

/// A deployed process with the schema of its start data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDefinitionEntry {
	pub process_name: String,
	pub endpoint: String,
	pub schema: JsonValue,
}

impl ProcessDefinitionEntry {
	/// The definition as handed to views.
	#[must_use]
	pub fn definition(&self) -> ProcessDefinition {
		ProcessDefinition {
			process_name: self.process_name.clone(),
			endpoint: self.endpoint.clone(),
		}
	}
}

/// A deployed workflow with its optional input schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowEntry {
	pub workflow_name: String,
	pub endpoint: String,
	pub schema: Option<JsonValue>,
}

impl WorkflowEntry {
	/// The definition as handed to views.
	#[must_use]
	pub fn definition(&self) -> WorkflowDefinition {
		WorkflowDefinition {
			workflow_name: self.workflow_name.clone(),
			endpoint: self.endpoint.clone(),
		}
	}
}

/// A stored custom dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
	pub name: String,
	pub last_modified: DateTime<Utc>,
	/// Dashbuilder YAML.
	pub content: String,
}

/// Every fixture collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Fixtures {
	pub process_instances: Vec<ProcessInstance>,
	pub user_task_instances: Vec<UserTaskInstance>,
	pub forms: Vec<Form>,
	pub jobs: Vec<Job>,
	pub process_definitions: Vec<ProcessDefinitionEntry>,
	pub workflows: Vec<WorkflowEntry>,
	pub dashboards: Vec<Dashboard>,
}

impl Fixtures {
	/// Parses the bundled data set.
	///
	/// # Errors
	///
	/// Returns the decode error if the bundled JSON does not match the types.
	pub fn bundled() -> serde_json::Result<Self> {
		serde_json::from_str(CONSOLE_JSON)
	}

	/// Parses a data set in the bundled format.
	///
	/// # Errors
	///
	/// Returns the decode error for malformed or mistyped JSON.
	pub fn from_json(text: &str) -> serde_json::Result<Self> {
		serde_json::from_str(text)
	}
}
