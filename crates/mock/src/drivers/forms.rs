use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mfe_bus::Result;
use mfe_features::{Form, FormContent, FormDetailsDriver, FormFilter, FormInfo, FormsListDriver};
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use super::{Navigation, NavigationLog, not_found};

/// Stored forms by name, serving both the forms list and form details.
#[derive(Debug)]
pub struct FormStore {
	forms: RwLock<BTreeMap<String, Form>>,
	filter: Mutex<FormFilter>,
	navigation: Arc<NavigationLog>,
}

impl FormStore {
	pub fn new(forms: impl IntoIterator<Item = Form>, navigation: Arc<NavigationLog>) -> Self {
		Self {
			forms: RwLock::new(forms.into_iter().map(|f| (f.form_info.name.clone(), f)).collect()),
			filter: Mutex::new(FormFilter::default()),
			navigation,
		}
	}

	/// The stored form named `name`.
	#[must_use]
	pub fn get(&self, name: &str) -> Option<Form> {
		self.forms.read().get(name).cloned()
	}
}

#[async_trait]
impl FormsListDriver for FormStore {
	async fn get_form_filter(&self) -> Result<FormFilter> {
		Ok(self.filter.lock().clone())
	}

	async fn apply_filter(&self, filter: FormFilter) -> Result<()> {
		debug!(names = ?filter.form_names, "forms filter applied");
		*self.filter.lock() = filter;
		Ok(())
	}

	async fn get_forms_query(&self) -> Result<Vec<FormInfo>> {
		let filter = self.filter.lock().clone();
		let forms = self.forms.read();
		Ok(forms
			.values()
			.filter(|f| filter.form_names.is_empty() || filter.form_names.contains(&f.form_info.name))
			.map(|f| f.form_info.clone())
			.collect())
	}

	async fn open_form(&self, form: FormInfo) -> Result<()> {
		if !self.forms.read().contains_key(&form.name) {
			return Err(not_found("form", &form.name));
		}
		self.navigation.push(Navigation::FormDetails { name: form.name });
		Ok(())
	}
}

#[async_trait]
impl FormDetailsDriver for FormStore {
	async fn get_form_content(&self, form_name: String) -> Result<Form> {
		self.get(&form_name).ok_or_else(|| not_found("form", &form_name))
	}

	async fn save_form_content(&self, form_name: String, content: FormContent) -> Result<()> {
		let mut forms = self.forms.write();
		let form = forms.get_mut(&form_name).ok_or_else(|| not_found("form", &form_name))?;
		form.source = content.source;
		form.configuration = content.configuration;
		form.form_info.last_modified = Utc::now();
		debug!(form = %form_name, "form saved");
		Ok(())
	}
}
