use async_trait::async_trait;
use mfe_bus::Result;
use mfe_features::CustomDashboardViewDriver;

use super::not_found;
use crate::fixtures::Dashboard;

/// Stored custom dashboards.
#[derive(Debug)]
pub struct DashboardStore {
	dashboards: Vec<Dashboard>,
}

impl DashboardStore {
	pub fn new(dashboards: Vec<Dashboard>) -> Self {
		Self { dashboards }
	}

	/// Names of every stored dashboard.
	#[must_use]
	pub fn names(&self) -> Vec<&str> {
		self.dashboards.iter().map(|d| d.name.as_str()).collect()
	}
}

#[async_trait]
impl CustomDashboardViewDriver for DashboardStore {
	async fn get_custom_dashboard_content(&self, name: String) -> Result<String> {
		self.dashboards
			.iter()
			.find(|d| d.name == name)
			.map(|d| d.content.clone())
			.ok_or_else(|| not_found("dashboard", &name))
	}
}
