use chrono::{TimeZone, Utc};
use mfe_bus::Error;
use mfe_features::{
	CustomDashboardViewDriver, FormDetailsDriver, FormFilter, FormsListDriver, JobStatus, JobsManagementDriver,
	ProcessDefinition, ProcessDefinitionListDriver, ProcessFormDriver, SortBy, SortOrder, WorkflowFormDriver,
};
use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::{MockBackend, ProcessInstanceFilter};

fn backend() -> MockBackend {
	MockBackend::bundled().unwrap()
}

fn assert_not_found<T: std::fmt::Debug>(res: mfe_bus::Result<T>, name: &str) {
	match res {
		Err(Error::Response(err)) => {
			assert_eq!(err.code, NOT_FOUND);
			assert_eq!(err.data.as_ref().and_then(|d| d["name"].as_str()), Some(name));
		}
		other => panic!("expected not found, got {other:?}"),
	}
}

#[tokio::test]
async fn forms_list_follows_its_filter() {
	let backend = backend();
	let forms = backend.forms();
	assert_eq!(FormsListDriver::get_forms_query(&*forms).await.unwrap().len(), 3);

	let filter = FormFilter {
		form_names: vec!["travels".into()],
	};
	FormsListDriver::apply_filter(&*forms, filter.clone()).await.unwrap();
	assert_eq!(forms.get_form_filter().await.unwrap(), filter);
	let names: Vec<_> = forms.get_forms_query().await.unwrap().into_iter().map(|f| f.name).collect();
	assert_eq!(names, vec!["travels"]);
}

#[tokio::test]
async fn opening_forms_records_navigation() {
	let backend = backend();
	let forms = backend.forms();
	let info = forms.get("travels").unwrap().form_info;
	forms.open_form(info.clone()).await.unwrap();
	assert_eq!(
		backend.navigation(),
		vec![Navigation::FormDetails {
			name: "travels".into()
		}]
	);

	let mut missing = info;
	missing.name = "nope".into();
	assert_not_found(forms.open_form(missing).await, "nope");
}

#[tokio::test]
async fn saving_form_content_updates_the_store() {
	let backend = backend();
	let forms = backend.forms();
	let before = forms.get_form_content("hiring_ITInterview".into()).await.unwrap();
	let mut content = before.content();
	content.source = "<div>updated</div>".into();
	forms
		.save_form_content("hiring_ITInterview".into(), content.clone())
		.await
		.unwrap();

	let after = forms.get_form_content("hiring_ITInterview".into()).await.unwrap();
	assert_eq!(after.content(), content);
	assert!(after.form_info.last_modified > before.form_info.last_modified);
	assert_not_found(forms.save_form_content("absent".into(), content).await, "absent");
}

#[tokio::test]
async fn jobs_query_filters_sorts_and_pages() {
	let backend = backend();
	let jobs = backend.jobs();
	let order: SortBy = [("priority".to_owned(), SortOrder::Desc)].into();
	jobs.initial_load(vec![JobStatus::Scheduled, JobStatus::Error, JobStatus::Executed], order)
		.await
		.unwrap();

	let page = jobs.query(0, 10).await.unwrap();
	let statuses: Vec<_> = page.iter().map(|j| j.status).collect();
	assert_eq!(statuses, vec![JobStatus::Error, JobStatus::Scheduled, JobStatus::Executed]);
	assert_eq!(jobs.query(1, 1).await.unwrap(), vec![page[1].clone()]);
	assert!(jobs.query(5, 10).await.unwrap().is_empty());

	jobs.apply_filter(vec![JobStatus::Canceled]).await.unwrap();
	assert_eq!(jobs.query(0, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_sort_key_is_rejected() {
	let jobs = backend().jobs();
	let order: SortBy = [("color".to_owned(), SortOrder::Asc)].into();
	assert!(matches!(jobs.sort_by(order).await, Err(Error::Response(_))));
}

#[tokio::test]
async fn cancel_only_touches_pending_jobs() {
	let jobs = backend().jobs();
	let scheduled = jobs.get("6e74a570-31c8-4020-bd70-19be2cb625f3_0").unwrap();
	let executed = jobs.get("eff4ee-11qw23-6675-pokau97-qwedjut45a0fa_0").unwrap();

	let outcome = jobs.cancel_job(scheduled.clone()).await.unwrap();
	assert_eq!(outcome.modal_title, "success");
	assert_eq!(jobs.get(&scheduled.id).unwrap().status, JobStatus::Canceled);

	let outcome = jobs.cancel_job(executed.clone()).await.unwrap();
	assert_eq!(outcome.modal_title, "failure");
	assert_eq!(jobs.get(&executed.id).unwrap().status, JobStatus::Executed);

	let errored = jobs.get("dad3aa88-5c1e-4858-a919-6123c675a0fa_0").unwrap();
	let bulk = jobs.bulk_cancel(vec![errored, executed, scheduled]).await.unwrap();
	assert_eq!(bulk.success_jobs.len(), 1);
	assert_eq!(bulk.success_jobs[0].status, JobStatus::Canceled);
	assert_eq!(bulk.failed_jobs.len(), 2);
}

#[tokio::test]
async fn reschedule_moves_pending_jobs() {
	let jobs = backend().jobs();
	let job = jobs.get("6e74a570-31c8-4020-bd70-19be2cb625f3_0").unwrap();
	let when = Utc.with_ymd_and_hms(2030, 5, 6, 7, 8, 9).unwrap();
	let outcome = jobs.reschedule_job(job.clone(), Some(60), Some(5), when).await.unwrap();
	assert_eq!(outcome.modal_title, "success");

	let stored = jobs.get(&job.id).unwrap();
	assert_eq!(stored.expiration_time, when);
	assert_eq!((stored.repeat_interval, stored.repeat_limit), (Some(60), Some(5)));

	let mut ghost = job;
	ghost.id = "ghost".into();
	assert_not_found(jobs.reschedule_job(ghost, None, None, when).await, "ghost");
}

#[tokio::test]
async fn starting_a_process_adds_an_instance() {
	let backend = backend();
	let processes = backend.processes();
	let travels = ProcessDefinition {
		process_name: "travels".into(),
		endpoint: "http://localhost:4000/travels".into(),
	};

	let schema = processes.get_process_form_schema(travels.clone()).await.unwrap();
	assert_eq!(schema["type"], json!("object"));
	assert_eq!(processes.get_custom_form(travels.clone()).await.unwrap().form_info.name, "travels");

	let id = processes
		.start_process(travels.clone(), json!({"businessKey": "T9", "trip": {"city": "Rome"}}))
		.await
		.unwrap();
	let filter = ProcessInstanceFilter {
		id: Some(id),
		..ProcessInstanceFilter::default()
	};
	let started = backend.process_instances(&filter);
	assert_eq!(started.len(), 1);
	assert_eq!(started[0].business_key.as_deref(), Some("T9"));
	assert_eq!(started[0].state, crate::ProcessInstanceState::Active);

	assert!(matches!(
		processes.start_process(travels, json!([1, 2])).await,
		Err(Error::Response(_))
	));
}

#[tokio::test]
async fn process_definition_list_filters_and_navigates() {
	let backend = backend();
	let processes = backend.processes();
	assert_eq!(processes.get_process_definitions_query().await.unwrap().len(), 2);
	processes
		.set_process_definition_filter(vec!["visaApplications".into()])
		.await
		.unwrap();
	let listed = processes.get_process_definitions_query().await.unwrap();
	assert_eq!(listed.len(), 1);
	assert_eq!(
		processes.get_process_definition_filter().await.unwrap(),
		vec!["visaApplications".to_owned()]
	);

	processes.open_process_form(listed[0].clone()).await.unwrap();
	processes.open_trigger_cloud_event().await.unwrap();
	assert_eq!(
		backend.navigation(),
		vec![
			Navigation::ProcessForm {
				definition: listed[0].clone()
			},
			Navigation::TriggerCloudEvent,
		]
	);

	let unknown = ProcessDefinition {
		process_name: "unknown".into(),
		endpoint: String::new(),
	};
	assert_not_found(processes.get_custom_form(unknown).await, "unknown");
}

#[tokio::test]
async fn workflow_start_tracks_business_key() {
	let backend = backend();
	let greeting = backend.workflow_form("greeting").unwrap();
	assert!(greeting.get_custom_workflow_schema().await.unwrap().is_some());
	assert_eq!(
		backend
			.workflow_form("helloworld")
			.unwrap()
			.get_custom_workflow_schema()
			.await
			.unwrap(),
		None
	);

	let id = greeting
		.start_workflow("http://localhost:8080/greeting".into(), json!({"name": "Ada", "businessKey": "bk-1"}))
		.await
		.unwrap();
	assert_eq!(greeting.business_key().as_deref(), Some("bk-1"));
	greeting.reset_business_key().await.unwrap();
	assert_eq!(greeting.business_key(), None);
	assert_eq!(backend.process_id(&crate::ProcessIdFilter { process_id: "greeting".into() })[0].id, id);

	assert_not_found(
		greeting.start_workflow("http://elsewhere".into(), json!({})).await,
		"http://elsewhere",
	);
	assert_not_found(backend.workflow_form("missing"), "missing");
}

#[tokio::test]
async fn dashboards_resolve_by_name() {
	let dashboards = backend().dashboards();
	assert_eq!(dashboards.names(), vec!["age.dash.yaml", "products.dash.yml"]);
	let content = dashboards.get_custom_dashboard_content("age.dash.yaml".into()).await.unwrap();
	assert!(content.contains("Age dashboard"));
	assert_not_found(dashboards.get_custom_dashboard_content("x.dash.yml".into()).await, "x.dash.yml");
}
