use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mfe_bus::Result;
use mfe_features::WorkflowFormDriver;
use parking_lot::{Mutex, RwLock};
use serde_json::Value as JsonValue;
use tracing::info;

use super::{invalid, not_found};
use crate::fixtures::{ProcessInstance, ProcessInstanceState, WorkflowEntry};

/// Driver of one workflow's start form.
#[derive(Debug)]
pub struct WorkflowFormHost {
	workflow: WorkflowEntry,
	business_key: Mutex<Option<String>>,
	instances: Arc<RwLock<Vec<ProcessInstance>>>,
}

impl WorkflowFormHost {
	pub fn new(workflow: WorkflowEntry, instances: Arc<RwLock<Vec<ProcessInstance>>>) -> Self {
		Self {
			workflow,
			business_key: Mutex::new(None),
			instances,
		}
	}

	/// Business key of the last started instance, until reset.
	#[must_use]
	pub fn business_key(&self) -> Option<String> {
		self.business_key.lock().clone()
	}
}

#[async_trait]
impl WorkflowFormDriver for WorkflowFormHost {
	async fn get_custom_workflow_schema(&self) -> Result<Option<JsonValue>> {
		Ok(self.workflow.schema.clone())
	}

	async fn reset_business_key(&self) -> Result<()> {
		*self.business_key.lock() = None;
		Ok(())
	}

	async fn start_workflow(&self, endpoint: String, data: JsonValue) -> Result<String> {
		if endpoint != self.workflow.endpoint {
			return Err(not_found("workflow endpoint", &endpoint));
		}
		if !data.is_object() {
			return Err(invalid("workflow data must be a JSON object"));
		}
		let id = uuid::Uuid::new_v4().to_string();
		let business_key = data
			.get("businessKey")
			.and_then(JsonValue::as_str)
			.map_or_else(|| id.clone(), str::to_owned);
		let now = Utc::now();
		self.instances.write().push(ProcessInstance {
			id: id.clone(),
			process_id: self.workflow.workflow_name.clone(),
			process_name: self.workflow.workflow_name.clone(),
			parent_process_instance_id: None,
			root_process_instance_id: None,
			root_process_id: None,
			roles: Vec::new(),
			state: ProcessInstanceState::Active,
			endpoint,
			service_url: None,
			business_key: Some(business_key.clone()),
			addons: Vec::new(),
			start: now,
			end: None,
			last_update: now,
			variables: data,
			error: None,
			nodes: Vec::new(),
		});
		*self.business_key.lock() = Some(business_key);
		info!(workflow = %self.workflow.workflow_name, %id, "workflow started");
		Ok(id)
	}
}
