//! `workflowForm`: start a serverless workflow from a generated or custom form.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A deployed workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
	pub workflow_name: String,
	pub endpoint: String,
}

mfe_envelope::define_feature! {
	/// Workflow form feature. Initialized with the workflow to start.
	pub struct WorkflowForm = "workflowForm";
	init = WorkflowDefinition;
	driver = WorkflowFormDriver;
	view_driver = WorkflowFormEnvelopeViewDriver;
	channel_api = WorkflowFormChannelApi;
	methods {
		/// Input schema of the workflow, if it declares one.
		fn get_custom_workflow_schema = "getCustomWorkflowSchema" () -> Option<JsonValue>;
		fn reset_business_key = "resetBusinessKey" () -> ();
		/// Posts `data` to `endpoint` and returns the new instance id.
		fn start_workflow = "startWorkflow" (endpoint: String, data: JsonValue) -> String;
	}
}
