use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::fixtures::Fixtures;

const TRAVELS: &str = "8035b580-6ae4-4aa8-9ec0-e18e19809e0b";

fn ids(instances: &[ProcessInstance]) -> Vec<&str> {
	instances.iter().map(|pi| pi.id.as_str()).collect()
}

#[test]
fn parent_filter_returns_exact_children() {
	let data = Fixtures::bundled().unwrap().process_instances;
	let children = process_instances(&data, &ProcessInstanceFilter::by_parent(Some(TRAVELS)));
	assert_eq!(
		ids(&children),
		vec!["fc1b6535-d557-40df-82c8-b425b9dc531b", "2d962eef-45b8-48a9-ad4e-9cde0ad6af88"]
	);
	assert!(
		children
			.iter()
			.all(|pi| pi.parent_process_instance_id.as_deref() == Some(TRAVELS))
	);
}

#[test]
fn unknown_parent_yields_empty_result() {
	let data = Fixtures::bundled().unwrap().process_instances;
	assert!(process_instances(&data, &ProcessInstanceFilter::by_parent(Some("nope"))).is_empty());
}

#[test]
fn null_parent_selects_roots() {
	let data = Fixtures::bundled().unwrap().process_instances;
	let filter: ProcessInstanceFilter = serde_json::from_value(json!({"parentProcessInstanceId": null})).unwrap();
	assert_eq!(filter, ProcessInstanceFilter::by_parent(None));
	let roots = process_instances(&data, &filter);
	assert_eq!(ids(&roots), vec![TRAVELS, "a23e6c20-02c2-4c2b-8c5c-e988a0adf863"]);
}

#[test]
fn empty_filter_matches_everything() {
	let data = Fixtures::bundled().unwrap().process_instances;
	let filter: ProcessInstanceFilter = serde_json::from_value(json!({})).unwrap();
	assert_eq!(process_instances(&data, &filter).len(), data.len());
}

#[test]
fn fields_combine_with_and() {
	let data = Fixtures::bundled().unwrap().process_instances;
	let filter: ProcessInstanceFilter =
		serde_json::from_value(json!({"processId": "travels", "state": "COMPLETED"})).unwrap();
	assert_eq!(ids(&process_instances(&data, &filter)), vec!["a23e6c20-02c2-4c2b-8c5c-e988a0adf863"]);
}

#[test]
fn mistyped_filter_values_are_rejected() {
	// A numeric id never loosely equals a string id.
	assert!(serde_json::from_value::<ProcessInstanceFilter>(json!({"id": 8035})).is_err());
	assert!(serde_json::from_value::<ProcessInstanceFilter>(json!({"state": "active"})).is_err());
	assert!(serde_json::from_value::<ProcessInstanceFilter>(json!({"unknown": 1})).is_err());
}

#[test]
fn process_id_scans_by_process() {
	let data = Fixtures::bundled().unwrap().process_instances;
	let filter = ProcessIdFilter {
		process_id: "hotelBooking".into(),
	};
	assert_eq!(ids(&process_id(&data, &filter)), vec!["2d962eef-45b8-48a9-ad4e-9cde0ad6af88"]);
	let filter = ProcessIdFilter {
		process_id: "Travels".into(),
	};
	assert!(process_id(&data, &filter).is_empty());
}

#[test]
fn user_tasks_filter_by_owner_and_instance() {
	let data = Fixtures::bundled().unwrap().user_task_instances;
	let unassigned: UserTaskInstanceFilter =
		serde_json::from_value(json!({"processInstanceId": TRAVELS, "actualOwner": null})).unwrap();
	let found = user_task_instances(&data, &unassigned);
	assert_eq!(found.len(), 1);
	assert_eq!(found[0].name, "VisaApplication");

	let completed = UserTaskInstanceFilter {
		state: Some("Completed".into()),
		..UserTaskInstanceFilter::default()
	};
	assert_eq!(user_task_instances(&data, &completed)[0].actual_owner.as_deref(), Some("jane"));
}
