//! `formDetails`: view and edit one form.

use crate::form::{Form, FormContent, FormInfo};

mfe_envelope::define_feature! {
	/// Form details feature. Initialized with the form to show.
	pub struct FormDetails = "formDetails";
	init = FormInfo;
	driver = FormDetailsDriver;
	view_driver = FormDetailsEnvelopeViewDriver;
	channel_api = FormDetailsChannelApi;
	methods {
		fn get_form_content = "getFormContent" (form_name: String) -> Form;
		fn save_form_content = "saveFormContent" (form_name: String, content: FormContent) -> ();
	}
}
