//! What the headless view does with each feature's driver.

use std::sync::Arc;

use anyhow::Context;
use mfe_bus::JsonValue;
use mfe_features::custom_dashboard::{CustomDashboardViewChannelApi, CustomDashboardViewEnvelopeViewDriver};
use mfe_features::form_details::{FormDetailsChannelApi, FormDetailsEnvelopeViewDriver};
use mfe_features::forms_list::{FormsListChannelApi, FormsListEnvelopeViewDriver};
use mfe_features::jobs_management::{JobsManagementChannelApi, JobsManagementEnvelopeViewDriver};
use mfe_features::process_definition_list::{
	ProcessDefinitionListChannelApi, ProcessDefinitionListEnvelopeViewDriver,
};
use mfe_features::process_form::{ProcessFormChannelApi, ProcessFormEnvelopeViewDriver};
use mfe_features::workflow_form::{WorkflowFormChannelApi, WorkflowFormEnvelopeViewDriver};
use mfe_features::{
	CustomDashboardInitArgs, CustomDashboardView, CustomDashboardViewDriver, FormDetails, FormDetailsDriver, FormFilter,
	FormsList, FormsListDriver, FormsListInitArgs, JobStatus, JobsManagement, JobsManagementDriver, ProcessDefinition,
	ProcessDefinitionList, ProcessDefinitionListDriver, ProcessDefinitionListInitArgs, ProcessForm, ProcessFormDriver,
	SortBy, SortOrder, WorkflowForm, WorkflowFormDriver,
};
use mfe_mock::MockBackend;
use serde_json::json;

use crate::FeatureName;
use crate::scenario::Scenario;

/// Runs one feature end to end and returns its report.
pub async fn run(feature: FeatureName, scenario: &Scenario, backend: &MockBackend) -> anyhow::Result<JsonValue> {
	match feature {
		FeatureName::FormsList => forms_list(scenario, backend).await,
		FeatureName::FormDetails => form_details(scenario, backend).await,
		FeatureName::JobsManagement => jobs_management(scenario, backend).await,
		FeatureName::ProcessDefinitionList => process_definition_list(scenario, backend).await,
		FeatureName::ProcessForm => process_form(scenario, backend).await,
		FeatureName::WorkflowForm => workflow_form(scenario, backend).await,
		FeatureName::CustomDashboardView => custom_dashboard(scenario, backend).await,
	}
}

async fn forms_list(scenario: &Scenario, backend: &MockBackend) -> anyhow::Result<JsonValue> {
	let host: Arc<dyn FormsListDriver> = backend.forms();
	scenario
		.run::<FormsList, _>(
			FormsListInitArgs::default(),
			|router| FormsListChannelApi::register(router, host),
			|client| async move {
				let driver = FormsListEnvelopeViewDriver::new(client);
				driver
					.apply_filter(FormFilter {
						form_names: vec!["travels".into(), "hiring_HRInterview".into()],
					})
					.await?;
				let forms = driver.get_forms_query().await?;
				if let Some(first) = forms.first() {
					driver.open_form(first.clone()).await?;
				}
				Ok::<_, mfe_bus::Error>(json!({ "filter": driver.get_form_filter().await?, "forms": forms }))
			},
		)
		.await
}

async fn form_details(scenario: &Scenario, backend: &MockBackend) -> anyhow::Result<JsonValue> {
	let forms = backend.forms();
	let info = forms.get("travels").context("bundled form `travels`")?.form_info;
	let host: Arc<dyn FormDetailsDriver> = forms;
	scenario
		.run::<FormDetails, _>(
			info.clone(),
			|router| FormDetailsChannelApi::register(router, host),
			|client| async move {
				let driver = FormDetailsEnvelopeViewDriver::new(client);
				let mut content = driver.get_form_content(info.name.clone()).await?.content();
				content.source = "<div><input id=\"traveller\" required /></div>".into();
				driver.save_form_content(info.name.clone(), content).await?;
				let saved = driver.get_form_content(info.name).await?;
				Ok::<_, mfe_bus::Error>(json!({ "saved": saved }))
			},
		)
		.await
}

async fn jobs_management(scenario: &Scenario, backend: &MockBackend) -> anyhow::Result<JsonValue> {
	let host: Arc<dyn JobsManagementDriver> = backend.jobs();
	scenario
		.run::<JobsManagement, _>(
			(),
			|router| JobsManagementChannelApi::register(router, host),
			|client| async move {
				let driver = JobsManagementEnvelopeViewDriver::new(client);
				let order: SortBy = [("lastUpdate".to_owned(), SortOrder::Desc)].into();
				driver
					.initial_load(vec![JobStatus::Scheduled, JobStatus::Error], order)
					.await?;
				let jobs = driver.query(0, 10).await?;
				let canceled = match jobs.first() {
					Some(job) => Some(driver.cancel_job(job.clone()).await?),
					None => None,
				};
				Ok::<_, mfe_bus::Error>(json!({ "jobs": jobs, "cancel": canceled }))
			},
		)
		.await
}

async fn process_definition_list(scenario: &Scenario, backend: &MockBackend) -> anyhow::Result<JsonValue> {
	let host: Arc<dyn ProcessDefinitionListDriver> = backend.processes();
	let init = ProcessDefinitionListInitArgs {
		filter: Vec::new(),
		singular_process_label: "Process".into(),
		is_trigger_cloud_event_enabled: true,
	};
	scenario
		.run::<ProcessDefinitionList, _>(
			init,
			|router| ProcessDefinitionListChannelApi::register(router, host),
			|client| async move {
				let driver = ProcessDefinitionListEnvelopeViewDriver::new(client);
				let definitions = driver.get_process_definitions_query().await?;
				if let Some(first) = definitions.first() {
					driver.open_process_form(first.clone()).await?;
				}
				driver.open_trigger_cloud_event().await?;
				Ok::<_, mfe_bus::Error>(json!({ "definitions": definitions, "navigation": backend.navigation() }))
			},
		)
		.await
}

async fn process_form(scenario: &Scenario, backend: &MockBackend) -> anyhow::Result<JsonValue> {
	let host: Arc<dyn ProcessFormDriver> = backend.processes();
	let travels = ProcessDefinition {
		process_name: "travels".into(),
		endpoint: "http://localhost:4000/travels".into(),
	};
	scenario
		.run::<ProcessForm, _>(
			travels.clone(),
			|router| ProcessFormChannelApi::register(router, host),
			|client| async move {
				let driver = ProcessFormEnvelopeViewDriver::new(client);
				let schema = driver.get_process_form_schema(travels.clone()).await?;
				let data = json!({
					"businessKey": "demo-1",
					"traveller": { "firstName": "Grace", "lastName": "Hopper" },
					"trip": { "city": "Arlington" },
				});
				let id = driver.start_process(travels, data).await?;
				Ok::<_, mfe_bus::Error>(json!({ "schema": schema, "processInstanceId": id }))
			},
		)
		.await
}

async fn workflow_form(scenario: &Scenario, backend: &MockBackend) -> anyhow::Result<JsonValue> {
	let host: Arc<dyn WorkflowFormDriver> = Arc::new(backend.workflow_form("greeting")?);
	let definition = backend
		.workflow_definitions()
		.into_iter()
		.find(|w| w.workflow_name == "greeting")
		.context("bundled workflow `greeting`")?;
	scenario
		.run::<WorkflowForm, _>(
			definition.clone(),
			|router| WorkflowFormChannelApi::register(router, host),
			|client| async move {
				let driver = WorkflowFormEnvelopeViewDriver::new(client);
				let schema = driver.get_custom_workflow_schema().await?;
				let id = driver
					.start_workflow(definition.endpoint, json!({ "name": "Grace", "language": "English" }))
					.await?;
				driver.reset_business_key().await?;
				Ok::<_, mfe_bus::Error>(json!({ "schema": schema, "workflowInstanceId": id }))
			},
		)
		.await
}

async fn custom_dashboard(scenario: &Scenario, backend: &MockBackend) -> anyhow::Result<JsonValue> {
	let host: Arc<dyn CustomDashboardViewDriver> = backend.dashboards();
	let init = CustomDashboardInitArgs {
		dashboard_name: "age.dash.yaml".into(),
		target_origin: scenario.envelope_origin().into(),
	};
	scenario
		.run::<CustomDashboardView, _>(
			init.clone(),
			|router| CustomDashboardViewChannelApi::register(router, host),
			|client| async move {
				let driver = CustomDashboardViewEnvelopeViewDriver::new(client);
				let content = driver.get_custom_dashboard_content(init.dashboard_name).await?;
				Ok::<_, mfe_bus::Error>(json!({ "content": content }))
			},
		)
		.await
}
