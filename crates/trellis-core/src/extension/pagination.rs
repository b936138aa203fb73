use bson::Document;

use crate::extension::{BindContext, Extension, ParamContext, ViewContext};
use crate::params::{self, MAX_RESULTS, PAGE};
use crate::view::DataSourceView;

/// Interprets the `page` / `max_results` parameter vocabulary and exposes
/// the current window on views for pager rendering.
///
/// A blob without `page` lands back on page 1; `max_results` persists
/// until something overwrites it.
#[derive(Debug, Default)]
pub struct PaginationExtension;

impl PaginationExtension {
    pub fn new() -> Self {
        Self
    }
}

impl Extension for PaginationExtension {
    fn bind(&self, params: &Document, ctx: &mut BindContext<'_>) {
        if let Some(page) = params.get(PAGE).and_then(params::as_usize) {
            ctx.state.page = page.max(1);
        }
        if let Some(max) = params.get(MAX_RESULTS).and_then(params::as_usize) {
            ctx.state.max_results = Some(max);
        }
    }

    fn parameters(&self, ctx: &ParamContext<'_>, out: &mut Document) {
        if ctx.state.page > 1 {
            out.insert(PAGE, ctx.state.page as i64);
        }
        if let Some(max) = ctx.state.max_results {
            out.insert(MAX_RESULTS, max as i64);
        }
    }

    fn decorate_view(&self, ctx: &ViewContext<'_>, view: &DataSourceView) {
        view.set_option(PAGE, ctx.state.page as i64);
        if let Some(max) = ctx.state.max_results {
            view.set_option(MAX_RESULTS, max as i64);
        }
    }
}
