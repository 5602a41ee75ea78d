//! Form payloads shared by the forms list, form details, and process form features.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source language of a custom form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormType {
	/// Plain HTML with inline scripts.
	Html,
	/// React component source.
	Tsx,
}

/// Summary of a stored form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInfo {
	/// Unique form name.
	pub name: String,
	/// Source language.
	#[serde(rename = "type")]
	pub form_type: FormType,
	/// Last time the form was saved.
	pub last_modified: DateTime<Utc>,
}

/// External resources a form loads, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormResources {
	/// Stylesheet URLs.
	pub styles: BTreeMap<String, String>,
	/// Script URLs.
	pub scripts: BTreeMap<String, String>,
}

/// Schema and resources of a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfiguration {
	/// JSON schema of the form data, as text.
	pub schema: String,
	/// Resources to load with the form.
	pub resources: FormResources,
}

/// Editable content of a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormContent {
	/// Form source.
	pub source: String,
	/// Schema and resources.
	pub configuration: FormConfiguration,
}

/// A stored form with its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
	/// Summary.
	pub form_info: FormInfo,
	/// Form source.
	pub source: String,
	/// Schema and resources.
	pub configuration: FormConfiguration,
}

impl Form {
	/// Content part of the form, as edited by the form details view.
	#[must_use]
	pub fn content(&self) -> FormContent {
		FormContent {
			source: self.source.clone(),
			configuration: self.configuration.clone(),
		}
	}
}
