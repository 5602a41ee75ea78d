//! `processDefinitionList`: browse deployed process definitions and start them.

use serde::{Deserialize, Serialize};

/// A deployed process definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDefinition {
	/// Process id.
	pub process_name: String,
	/// REST endpoint starting a new instance.
	pub endpoint: String,
}

/// Payload of `processDefinitionList__init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDefinitionListInitArgs {
	/// Process names the list starts narrowed to.
	pub filter: Vec<String>,
	/// Label for one process, e.g. "Workflow".
	pub singular_process_label: String,
	/// Whether the view offers triggering a cloud event.
	#[serde(default)]
	pub is_trigger_cloud_event_enabled: bool,
}

mfe_envelope::define_feature! {
	/// Process definition list feature.
	pub struct ProcessDefinitionList = "processDefinitionList";
	init = ProcessDefinitionListInitArgs;
	driver = ProcessDefinitionListDriver;
	view_driver = ProcessDefinitionListEnvelopeViewDriver;
	channel_api = ProcessDefinitionListChannelApi;
	methods {
		fn get_process_definition_filter = "getProcessDefinitionFilter" () -> Vec<String>;
		fn set_process_definition_filter = "setProcessDefinitionFilter" (filter: Vec<String>) -> ();
		fn get_process_definitions_query = "getProcessDefinitionsQuery" () -> Vec<ProcessDefinition>;
		/// Navigates to the start form of `process_definition`.
		fn open_process_form = "openProcessForm" (process_definition: ProcessDefinition) -> ();
		/// Navigates to the cloud event trigger page.
		fn open_trigger_cloud_event = "openTriggerCloudEvent" () -> ();
	}
}
