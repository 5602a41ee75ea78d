use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mfe_bus::Result;
use mfe_features::{Form, ProcessDefinition, ProcessDefinitionListDriver, ProcessFormDriver};
use parking_lot::{Mutex, RwLock};
use serde_json::Value as JsonValue;
use tracing::info;

use super::{FormStore, Navigation, NavigationLog, invalid, not_found};
use crate::fixtures::{ProcessDefinitionEntry, ProcessInstance, ProcessInstanceState};

/// Deployed process definitions; starts new instances into the shared instance list.
#[derive(Debug)]
pub struct ProcessStore {
	definitions: Vec<ProcessDefinitionEntry>,
	filter: Mutex<Vec<String>>,
	instances: Arc<RwLock<Vec<ProcessInstance>>>,
	forms: Arc<FormStore>,
	navigation: Arc<NavigationLog>,
}

impl ProcessStore {
	pub fn new(
		definitions: Vec<ProcessDefinitionEntry>,
		instances: Arc<RwLock<Vec<ProcessInstance>>>,
		forms: Arc<FormStore>,
		navigation: Arc<NavigationLog>,
	) -> Self {
		Self {
			definitions,
			filter: Mutex::new(Vec::new()),
			instances,
			forms,
			navigation,
		}
	}

	fn entry(&self, definition: &ProcessDefinition) -> Result<&ProcessDefinitionEntry> {
		self.definitions
			.iter()
			.find(|d| d.process_name == definition.process_name)
			.ok_or_else(|| not_found("process definition", &definition.process_name))
	}
}

#[async_trait]
impl ProcessDefinitionListDriver for ProcessStore {
	async fn get_process_definition_filter(&self) -> Result<Vec<String>> {
		Ok(self.filter.lock().clone())
	}

	async fn set_process_definition_filter(&self, filter: Vec<String>) -> Result<()> {
		*self.filter.lock() = filter;
		Ok(())
	}

	async fn get_process_definitions_query(&self) -> Result<Vec<ProcessDefinition>> {
		let filter = self.filter.lock().clone();
		Ok(self
			.definitions
			.iter()
			.filter(|d| filter.is_empty() || filter.contains(&d.process_name))
			.map(ProcessDefinitionEntry::definition)
			.collect())
	}

	async fn open_process_form(&self, process_definition: ProcessDefinition) -> Result<()> {
		self.entry(&process_definition)?;
		self.navigation.push(Navigation::ProcessForm {
			definition: process_definition,
		});
		Ok(())
	}

	async fn open_trigger_cloud_event(&self) -> Result<()> {
		self.navigation.push(Navigation::TriggerCloudEvent);
		Ok(())
	}
}

#[async_trait]
impl ProcessFormDriver for ProcessStore {
	async fn get_process_form_schema(&self, process_definition: ProcessDefinition) -> Result<JsonValue> {
		Ok(self.entry(&process_definition)?.schema.clone())
	}

	async fn get_custom_form(&self, process_definition: ProcessDefinition) -> Result<Form> {
		self.entry(&process_definition)?;
		self.forms
			.get(&process_definition.process_name)
			.ok_or_else(|| not_found("form", &process_definition.process_name))
	}

	async fn start_process(&self, process_definition: ProcessDefinition, form_data: JsonValue) -> Result<String> {
		let entry = self.entry(&process_definition)?;
		if !form_data.is_object() {
			return Err(invalid("process start data must be a JSON object"));
		}
		let business_key = form_data
			.get("businessKey")
			.and_then(JsonValue::as_str)
			.map(str::to_owned);
		let now = Utc::now();
		let instance = ProcessInstance {
			id: uuid::Uuid::new_v4().to_string(),
			process_id: entry.process_name.clone(),
			process_name: entry.process_name.clone(),
			parent_process_instance_id: None,
			root_process_instance_id: None,
			root_process_id: None,
			roles: Vec::new(),
			state: ProcessInstanceState::Active,
			endpoint: entry.endpoint.clone(),
			service_url: None,
			business_key,
			addons: Vec::new(),
			start: now,
			end: None,
			last_update: now,
			variables: form_data,
			error: None,
			nodes: Vec::new(),
		};
		let id = instance.id.clone();
		self.instances.write().push(instance);
		info!(process = %entry.process_name, %id, "process started");
		Ok(id)
	}
}
