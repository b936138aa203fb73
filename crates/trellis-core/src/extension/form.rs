use bson::Bson;

use crate::extension::{Extension, ViewContext};
use crate::view::DataSourceView;

/// Mapping option holding per-field form rendering options.
pub(crate) const FORM_OPTIONS: &str = "form_options";

/// Form-option mapping: promotes the entries of a field's `form_options`
/// mapping option into its field view's option bag, so templates can
/// render filter inputs without digging into nested documents. Options
/// already set on the view (by the field itself or another extension) are
/// left untouched.
#[derive(Debug, Default)]
pub struct FormExtension;

impl FormExtension {
    pub fn new() -> Self {
        Self
    }
}

impl Extension for FormExtension {
    fn decorate_view(&self, _ctx: &ViewContext<'_>, view: &DataSourceView) {
        for field_view in view.fields() {
            let Ok(Bson::Document(form_options)) = field_view.get_option(FORM_OPTIONS) else {
                continue;
            };
            for (name, value) in form_options {
                if !field_view.has_option(&name) {
                    field_view.set_option(name, value);
                }
            }
        }
    }
}
