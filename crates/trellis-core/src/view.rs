use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bson::{Bson, Document};
use indexmap::IndexMap;

use crate::error::ViewError;
use crate::field::{Field, option_is_absent};
use trellis_query::Comparison;

struct ViewInner {
    fields: RefCell<IndexMap<String, FieldView>>,
    options: RefCell<Document>,
    parameters: Document,
    all_parameters: Document,
    other_parameters: Document,
}

/// Read-only, ordered projection of a datasource's fields plus arbitrary
/// named options, built for presentation.
///
/// A view is a snapshot: the datasource rebuilds it instead of mutating
/// it. The handle is cheap to clone (Rc bump); field views hold a weak
/// back-reference to it, so dropping the last handle drops the whole
/// structure.
#[derive(Clone)]
pub struct DataSourceView {
    inner: Rc<ViewInner>,
}

impl DataSourceView {
    pub(crate) fn new(
        parameters: Document,
        all_parameters: Document,
        other_parameters: Document,
    ) -> Self {
        Self {
            inner: Rc::new(ViewInner {
                fields: RefCell::new(IndexMap::new()),
                options: RefCell::new(Document::new()),
                parameters,
                all_parameters,
                other_parameters,
            }),
        }
    }

    // ── Options ─────────────────────────────────────────────

    pub fn has_option(&self, name: &str) -> bool {
        self.inner.options.borrow().contains_key(name)
    }

    /// Set a view option. Writing the absent sentinel (`Bson::Null`)
    /// removes the key: a stored-but-invisible option must not exist.
    pub fn set_option(&self, name: impl Into<String>, value: impl Into<Bson>) {
        let name = name.into();
        let value = value.into();
        let mut options = self.inner.options.borrow_mut();
        if option_is_absent(&value) {
            options.remove(&name);
        } else {
            options.insert(name, value);
        }
    }

    pub fn get_option(&self, name: &str) -> Result<Bson, ViewError> {
        self.inner
            .options
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| ViewError::NoSuchOption(name.to_string()))
    }

    pub fn remove_option(&self, name: &str) {
        self.inner.options.borrow_mut().remove(name);
    }

    pub fn options(&self) -> Document {
        self.inner.options.borrow().clone()
    }

    // ── Fields ──────────────────────────────────────────────

    pub fn has_field(&self, name: &str) -> bool {
        self.inner.fields.borrow().contains_key(name)
    }

    pub fn get_field(&self, name: &str) -> Result<FieldView, ViewError> {
        self.inner
            .fields
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| ViewError::NoSuchField(name.to_string()))
    }

    /// All field views, in the datasource's field insertion order.
    pub fn fields(&self) -> Vec<FieldView> {
        self.inner.fields.borrow().values().cloned().collect()
    }

    /// Register a field view; fails if its underlying name is taken.
    /// On success the field view is back-linked to this view.
    pub fn add_field(&self, field_view: FieldView) -> Result<(), ViewError> {
        let name = field_view.name().to_string();
        let mut fields = self.inner.fields.borrow_mut();
        if fields.contains_key(&name) {
            return Err(ViewError::DuplicateField(name));
        }
        *field_view.inner.view.borrow_mut() = Rc::downgrade(&self.inner);
        fields.insert(name, field_view);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.fields.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.fields.borrow().is_empty()
    }

    /// A cursor over the ordered field mapping, starting at position 0.
    pub fn cursor(&self) -> ViewCursor {
        ViewCursor {
            inner: Rc::clone(&self.inner),
            position: 0,
        }
    }

    // ── Parameter snapshots ─────────────────────────────────

    pub fn parameters(&self) -> Document {
        self.inner.parameters.clone()
    }

    pub fn all_parameters(&self) -> Document {
        self.inner.all_parameters.clone()
    }

    pub fn other_parameters(&self) -> Document {
        self.inner.other_parameters.clone()
    }
}

struct FieldViewInner {
    field: Field,
    options: RefCell<Document>,
    view: RefCell<Weak<ViewInner>>,
}

/// Presentation snapshot of one field: its binding at view-build time plus
/// a decorated option bag. Cheap to clone; weakly back-references the view
/// that owns it.
#[derive(Clone)]
pub struct FieldView {
    inner: Rc<FieldViewInner>,
}

impl FieldView {
    /// Snapshot a field. The view options start as a copy of the field's
    /// mapping options; extensions then decorate them.
    pub fn new(field: Field) -> Self {
        let options = field.options().clone();
        Self {
            inner: Rc::new(FieldViewInner {
                field,
                options: RefCell::new(options),
                view: RefCell::new(Weak::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.field.name()
    }

    pub fn field_type(&self) -> &str {
        self.inner.field.field_type()
    }

    pub fn comparison(&self) -> Comparison {
        self.inner.field.comparison()
    }

    /// The value the field was bound to when the view was built.
    pub fn value(&self) -> Bson {
        self.inner.field.value().clone()
    }

    /// The snapshotted source field.
    pub fn field(&self) -> &Field {
        &self.inner.field
    }

    /// The owning view, if it is still alive.
    pub fn view(&self) -> Option<DataSourceView> {
        self.inner
            .view
            .borrow()
            .upgrade()
            .map(|inner| DataSourceView { inner })
    }

    // ── Options (same sentinel semantics as the view) ───────

    pub fn has_option(&self, name: &str) -> bool {
        self.inner.options.borrow().contains_key(name)
    }

    pub fn set_option(&self, name: impl Into<String>, value: impl Into<Bson>) {
        let name = name.into();
        let value = value.into();
        let mut options = self.inner.options.borrow_mut();
        if option_is_absent(&value) {
            options.remove(&name);
        } else {
            options.insert(name, value);
        }
    }

    pub fn get_option(&self, name: &str) -> Result<Bson, ViewError> {
        self.inner
            .options
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| ViewError::NoSuchOption(name.to_string()))
    }

    pub fn remove_option(&self, name: &str) {
        self.inner.options.borrow_mut().remove(name);
    }

    pub fn options(&self) -> Document {
        self.inner.options.borrow().clone()
    }
}

/// Explicit cursor over a view's ordered field mapping.
///
/// Restartable (`rewind`) and seekable; `current`/`key` answer for the
/// current position and `valid` reports whether it is in bounds. Also an
/// `Iterator` yielding `(name, field view)` pairs.
pub struct ViewCursor {
    inner: Rc<ViewInner>,
    position: usize,
}

impl ViewCursor {
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    pub fn current(&self) -> Option<FieldView> {
        self.inner
            .fields
            .borrow()
            .get_index(self.position)
            .map(|(_, view)| view.clone())
    }

    pub fn key(&self) -> Option<String> {
        self.inner
            .fields
            .borrow()
            .get_index(self.position)
            .map(|(name, _)| name.clone())
    }

    pub fn next_field(&mut self) {
        self.position += 1;
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }

    pub fn valid(&self) -> bool {
        self.position < self.inner.fields.borrow().len()
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

impl Iterator for ViewCursor {
    type Item = (String, FieldView);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self
            .inner
            .fields
            .borrow()
            .get_index(self.position)
            .map(|(name, view)| (name.clone(), view.clone()));
        if entry.is_some() {
            self.position += 1;
        }
        entry
    }
}
