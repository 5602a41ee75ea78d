//! `formsList`: browse stored forms and open one.

use serde::{Deserialize, Serialize};

use crate::form::FormInfo;

/// Names the forms list is narrowed to; empty shows every form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFilter {
	/// Exact form names.
	pub form_names: Vec<String>,
}

/// Payload of `formsList__init`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormsListInitArgs {
	/// Filter applied when the list first renders.
	pub filter: FormFilter,
}

mfe_envelope::define_feature! {
	/// Forms list feature.
	pub struct FormsList = "formsList";
	init = FormsListInitArgs;
	driver = FormsListDriver;
	view_driver = FormsListEnvelopeViewDriver;
	channel_api = FormsListChannelApi;
	methods {
		/// Current filter.
		fn get_form_filter = "getFormFilter" () -> FormFilter;
		/// Replaces the filter.
		fn apply_filter = "applyFilter" (filter: FormFilter) -> ();
		/// Forms matching the current filter.
		fn get_forms_query = "getFormsQuery" () -> Vec<FormInfo>;
		/// Navigates to the details of `form`.
		fn open_form = "openForm" (form: FormInfo) -> ();
	}
}
