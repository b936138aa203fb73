mod core;
mod form;
mod ordering;
mod pagination;

pub use self::core::CoreExtension;
pub use self::form::FormExtension;
pub use self::ordering::{ORDERING, OrderingExtension, OrderingRule};
pub use self::pagination::PaginationExtension;

use bson::Document;
use indexmap::IndexMap;

use crate::field::Field;
use crate::types::FieldTypeDef;
use crate::view::DataSourceView;

/// Directives accumulated while binding parameters, consumed when the
/// query is built and when views are decorated.
///
/// `page` and `ordering` reset on every bind; `max_results` persists until
/// overwritten (by parameters or `set_max_results`). `extra` is scratch
/// space for extension vocabulary with no dedicated slot.
#[derive(Debug, Clone)]
pub struct BoundState {
    pub page: usize,
    pub max_results: Option<usize>,
    pub ordering: Vec<OrderingRule>,
    pub extra: Document,
}

impl Default for BoundState {
    fn default() -> Self {
        Self {
            page: 1,
            max_results: None,
            ordering: Vec::new(),
            extra: Document::new(),
        }
    }
}

impl BoundState {
    pub(crate) fn reset_for_bind(&mut self) {
        self.page = 1;
        self.ordering.clear();
        self.extra = Document::new();
    }
}

/// Context handed to extensions while binding: the field registry
/// (read-only) and the bound state (mutable).
pub struct BindContext<'a> {
    pub fields: &'a IndexMap<String, Field>,
    pub state: &'a mut BoundState,
}

/// Context for reconstructing extension parameter vocabulary.
pub struct ParamContext<'a> {
    pub state: &'a BoundState,
}

/// Context for decorating a freshly built view.
pub struct ViewContext<'a> {
    pub fields: &'a IndexMap<String, Field>,
    pub state: &'a BoundState,
}

/// Pluggable interception point on the datasource pipeline. Extensions are
/// registered on the factory and resolved once at construction; each hook
/// defaults to a no-op so an extension implements only what it needs.
pub trait Extension {
    /// Field types this extension contributes to the registry.
    fn field_types(&self) -> Vec<FieldTypeDef> {
        Vec::new()
    }

    /// Interpret this extension's vocabulary from a datasource's own
    /// parameter block. Unknown or malformed entries are ignored, never
    /// errors; a blob may legitimately target other datasources.
    fn bind(&self, _params: &Document, _ctx: &mut BindContext<'_>) {}

    /// Write this extension's vocabulary back into a parameter block, so
    /// a bound state round-trips through `parameters()`.
    fn parameters(&self, _ctx: &ParamContext<'_>, _out: &mut Document) {}

    /// Add rendering metadata to a freshly built view.
    fn decorate_view(&self, _ctx: &ViewContext<'_>, _view: &DataSourceView) {}
}
