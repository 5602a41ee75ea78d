//! Feature contracts of the management console envelopes.
//!
//! Each module declares one feature with
//! [`define_feature!`](mfe_envelope::define_feature): its payload types, the
//! Driver the channel implements, the channel API table serving that Driver,
//! and the envelope view driver proxying it over the bus.

pub mod custom_dashboard;
pub mod form;
pub mod form_details;
pub mod forms_list;
pub mod jobs_management;
pub mod process_definition_list;
pub mod process_form;
pub mod workflow_form;

pub use custom_dashboard::{CustomDashboardInitArgs, CustomDashboardView, CustomDashboardViewDriver};
pub use form::{Form, FormConfiguration, FormContent, FormInfo, FormResources, FormType};
pub use form_details::{FormDetails, FormDetailsDriver};
pub use forms_list::{FormFilter, FormsList, FormsListDriver, FormsListInitArgs};
pub use jobs_management::{
	BulkCancel, Job, JobCancel, JobReschedule, JobStatus, JobsManagement, JobsManagementDriver, SortBy, SortOrder,
};
pub use process_definition_list::{
	ProcessDefinition, ProcessDefinitionList, ProcessDefinitionListDriver, ProcessDefinitionListInitArgs,
};
pub use process_form::{ProcessForm, ProcessFormDriver};
pub use workflow_form::{WorkflowDefinition, WorkflowForm, WorkflowFormDriver};

/// Wire names of every feature's channel API, across all features.
#[must_use]
pub fn all_methods() -> Vec<&'static str> {
	[
		FormsList::METHODS,
		FormDetails::METHODS,
		JobsManagement::METHODS,
		ProcessDefinitionList::METHODS,
		ProcessForm::METHODS,
		WorkflowForm::METHODS,
		CustomDashboardView::METHODS,
	]
	.concat()
}
