//! `processForm`: the start form of one process definition.

use serde_json::Value as JsonValue;

use crate::form::Form;
use crate::process_definition_list::ProcessDefinition;

mfe_envelope::define_feature! {
	/// Process form feature. Initialized with the definition to start.
	pub struct ProcessForm = "processForm";
	init = ProcessDefinition;
	driver = ProcessFormDriver;
	view_driver = ProcessFormEnvelopeViewDriver;
	channel_api = ProcessFormChannelApi;
	methods {
		/// JSON schema of the process start data.
		fn get_process_form_schema = "getProcessFormSchema" (process_definition: ProcessDefinition) -> JsonValue;
		/// Custom form registered for the process.
		fn get_custom_form = "getCustomForm" (process_definition: ProcessDefinition) -> Form;
		/// Starts an instance with `form_data` and returns its id.
		fn start_process = "startProcess" (process_definition: ProcessDefinition, form_data: JsonValue) -> String;
	}
}
