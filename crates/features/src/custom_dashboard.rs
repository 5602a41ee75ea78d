//! `customDashboardView`: render one custom dashboard.

use serde::{Deserialize, Serialize};

/// Payload of `customDashboardView__init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDashboardInitArgs {
	/// Dashboard to render.
	pub dashboard_name: String,
	/// Origin the dashboard renderer is served from.
	pub target_origin: String,
}

mfe_envelope::define_feature! {
	/// Custom dashboard view feature.
	pub struct CustomDashboardView = "customDashboardView";
	init = CustomDashboardInitArgs;
	driver = CustomDashboardViewDriver;
	view_driver = CustomDashboardViewEnvelopeViewDriver;
	channel_api = CustomDashboardViewChannelApi;
	methods {
		/// Dashbuilder YAML of dashboard `name`.
		fn get_custom_dashboard_content = "getCustomDashboardContent" (name: String) -> String;
	}
}
