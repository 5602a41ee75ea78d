//! Filter resolvers over the fixture data, mirroring the console's GraphQL
//! queries `ProcessInstances(filter)`, `UserTaskInstances(filter)`, and
//! `ProcessId(filter)`.
//!
//! Every set filter field must equal the record's field exactly, with the
//! field's own type; unset fields match everything. A filter matching
//! nothing yields an empty result.

use serde::{Deserialize, Deserializer};

use crate::fixtures::{ProcessInstance, ProcessInstanceState, UserTaskInstance};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn explicit_null<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de>,
{
	Option::<T>::deserialize(de).map(Some)
}

fn field_matches<T: PartialEq + ?Sized>(wanted: Option<&T>, actual: &T) -> bool {
	wanted.is_none_or(|w| w == actual)
}

/// Arguments of `ProcessInstances`.
///
/// `parentProcessInstanceId: null` selects root instances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProcessInstanceFilter {
	pub id: Option<String>,
	pub process_id: Option<String>,
	#[serde(default, deserialize_with = "explicit_null")]
	pub parent_process_instance_id: Option<Option<String>>,
	#[serde(default, deserialize_with = "explicit_null")]
	pub root_process_instance_id: Option<Option<String>>,
	pub state: Option<ProcessInstanceState>,
	pub business_key: Option<String>,
}

impl ProcessInstanceFilter {
	/// Filter on the parent instance only.
	#[must_use]
	pub fn by_parent(parent: Option<&str>) -> Self {
		Self {
			parent_process_instance_id: Some(parent.map(str::to_owned)),
			..Self::default()
		}
	}

	/// Whether `instance` passes every set field.
	#[must_use]
	pub fn matches(&self, instance: &ProcessInstance) -> bool {
		field_matches(self.id.as_ref(), &instance.id)
			&& field_matches(self.process_id.as_ref(), &instance.process_id)
			&& field_matches(self.parent_process_instance_id.as_ref(), &instance.parent_process_instance_id)
			&& field_matches(self.root_process_instance_id.as_ref(), &instance.root_process_instance_id)
			&& field_matches(self.state.as_ref(), &instance.state)
			&& self
				.business_key
				.as_ref()
				.is_none_or(|key| instance.business_key.as_ref() == Some(key))
	}
}

/// Arguments of `UserTaskInstances`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserTaskInstanceFilter {
	pub id: Option<String>,
	pub process_instance_id: Option<String>,
	pub state: Option<String>,
	#[serde(default, deserialize_with = "explicit_null")]
	pub actual_owner: Option<Option<String>>,
}

impl UserTaskInstanceFilter {
	/// Whether `task` passes every set field.
	#[must_use]
	pub fn matches(&self, task: &UserTaskInstance) -> bool {
		field_matches(self.id.as_ref(), &task.id)
			&& field_matches(self.process_instance_id.as_ref(), &task.process_instance_id)
			&& field_matches(self.state.as_ref(), &task.state)
			&& field_matches(self.actual_owner.as_ref(), &task.actual_owner)
	}
}

/// Arguments of `ProcessId`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProcessIdFilter {
	pub process_id: String,
}

/// `ProcessInstances(filter)`.
#[must_use]
pub fn process_instances(data: &[ProcessInstance], filter: &ProcessInstanceFilter) -> Vec<ProcessInstance> {
	data.iter().filter(|pi| filter.matches(pi)).cloned().collect()
}

/// `UserTaskInstances(filter)`.
#[must_use]
pub fn user_task_instances(data: &[UserTaskInstance], filter: &UserTaskInstanceFilter) -> Vec<UserTaskInstance> {
	data.iter().filter(|task| filter.matches(task)).cloned().collect()
}

/// `ProcessId(filter)`: instances of one process.
#[must_use]
pub fn process_id(data: &[ProcessInstance], filter: &ProcessIdFilter) -> Vec<ProcessInstance> {
	data.iter()
		.filter(|pi| pi.process_id == filter.process_id)
		.cloned()
		.collect()
}

#[cfg(test)]
mod tests;
