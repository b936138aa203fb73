use std::cell::RefCell;
use std::rc::Rc;

use bson::{Bson, Document};
use indexmap::IndexMap;
use trellis_query::{Clause, Comparison, Query, Sort};

use crate::driver::{Driver, ResultSet};
use crate::error::DataSourceError;
use crate::extension::{BindContext, BoundState, Extension, ParamContext, ViewContext};
use crate::field::Field;
use crate::params::{self, FIELDS};
use crate::types::FieldTypeRegistry;
use crate::view::{DataSourceView, FieldView};

struct CachedResult {
    query: Query,
    result: Rc<ResultSet>,
}

/// Orchestrates a field registry, parameter binding, result caching and
/// pagination over one driver.
///
/// Fields iterate in insertion order. The driver is shared, not owned;
/// one driver may back several datasources. Created through
/// [`DataSourceFactory`](crate::DataSourceFactory).
pub struct DataSource<D: Driver> {
    name: String,
    driver: Rc<D>,
    registry: Rc<FieldTypeRegistry>,
    extensions: Rc<Vec<Box<dyn Extension>>>,
    fields: IndexMap<String, Field>,
    state: BoundState,
    all_parameters: Document,
    cache: RefCell<Option<CachedResult>>,
}

impl<D: Driver> std::fmt::Debug for DataSource<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSource")
            .field("name", &self.name)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<D: Driver> DataSource<D> {
    pub(crate) fn new(
        name: String,
        driver: Rc<D>,
        registry: Rc<FieldTypeRegistry>,
        extensions: Rc<Vec<Box<dyn Extension>>>,
    ) -> Self {
        Self {
            name,
            driver,
            registry,
            extensions,
            fields: IndexMap::new(),
            state: BoundState::default(),
            all_parameters: Document::new(),
            cache: RefCell::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ── Field registry ──────────────────────────────────────

    /// Register a field. Fluent: returns `self` for chaining:
    ///
    /// ```ignore
    /// datasource
    ///     .add_field("title", "text", Comparison::Like, doc! {})?
    ///     .add_field("author", "text", Comparison::Like, doc! {})?;
    /// ```
    ///
    /// Fails on a duplicate name, an unknown type tag, a comparison the
    /// type does not allow, or a (type, comparison) pair the driver
    /// cannot express. Configuration problems surface here, never at
    /// execution time.
    pub fn add_field(
        &mut self,
        name: impl Into<String>,
        field_type: &str,
        comparison: Comparison,
        options: Document,
    ) -> Result<&mut Self, DataSourceError> {
        let name = name.into();
        if self.fields.contains_key(&name) {
            return Err(DataSourceError::DuplicateField(name));
        }
        let type_def = self
            .registry
            .get(field_type)
            .ok_or_else(|| DataSourceError::UnknownFieldType(field_type.to_string()))?
            .clone();
        if !self.driver.supports(field_type, comparison) {
            return Err(DataSourceError::UnsupportedComparison {
                field_type: field_type.to_string(),
                comparison,
            });
        }
        let field = Field::new(name.clone(), type_def, comparison, options)?;
        self.fields.insert(name, field);
        Ok(self)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn get_field(&self, name: &str) -> Result<&Field, DataSourceError> {
        self.fields
            .get(name)
            .ok_or_else(|| DataSourceError::NoSuchField(name.to_string()))
    }

    pub fn field_mut(&mut self, name: &str) -> Result<&mut Field, DataSourceError> {
        self.fields
            .get_mut(name)
            .ok_or_else(|| DataSourceError::NoSuchField(name.to_string()))
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    /// Remove a field; true if it existed. Ordering rules naming it no
    /// longer resolve and its clause disappears from the next query.
    pub fn remove_field(&mut self, name: &str) -> bool {
        self.fields.shift_remove(name).is_some()
    }

    /// Remove all fields. Subsequent results are the unfiltered base set.
    pub fn clear_fields(&mut self) {
        self.fields.clear();
    }

    // ── Parameter binding ───────────────────────────────────

    /// Apply a parameter blob keyed by datasource name.
    ///
    /// The previous bound state is reset (field values, page, ordering;
    /// the max-results window persists), then this datasource's block is
    /// applied: `fields` entries for known fields, extension vocabulary
    /// through the registered extensions. Unknown datasource names, field
    /// names and keys are ignored: one blob may target several
    /// datasources on a page. The full blob is retained verbatim for
    /// [`all_parameters`](Self::all_parameters) /
    /// [`other_parameters`](Self::other_parameters).
    pub fn bind_parameters(&mut self, parameters: &Document) {
        self.all_parameters = parameters.clone();
        for field in self.fields.values_mut() {
            field.clear_value();
        }
        self.state.reset_for_bind();

        let own = match params::own_block(parameters, &self.name) {
            Some(block) => block.clone(),
            None => Document::new(),
        };

        if let Some(Bson::Document(values)) = own.get(FIELDS) {
            for (name, value) in values {
                if let Some(field) = self.fields.get_mut(name.as_str()) {
                    field.set_value(value.clone());
                }
            }
        }

        let mut ctx = BindContext {
            fields: &self.fields,
            state: &mut self.state,
        };
        for extension in self.extensions.iter() {
            extension.bind(&own, &mut ctx);
        }
    }

    // ── Pagination state ────────────────────────────────────

    pub fn set_max_results(&mut self, max: Option<usize>) {
        self.state.max_results = max;
    }

    pub fn max_results(&self) -> Option<usize> {
        self.state.max_results
    }

    /// Current 1-based page.
    pub fn page(&self) -> usize {
        self.state.page
    }

    // ── Results ─────────────────────────────────────────────

    /// Execute the current bound state, or return the cached result.
    ///
    /// The cache key is the query built from the current state; while the
    /// effective state is unchanged, consecutive calls return the
    /// identical `Rc` without touching the driver. Any effective change to
    /// field values, the field set, comparisons, ordering, page or window
    /// re-executes.
    pub fn get_result(&self) -> Result<Rc<ResultSet>, DataSourceError> {
        let query = self.build_query();
        if let Some(cached) = self.cache.borrow().as_ref() {
            if cached.query == query {
                return Ok(Rc::clone(&cached.result));
            }
        }
        let result = Rc::new(self.driver.execute(&query)?);
        *self.cache.borrow_mut() = Some(CachedResult {
            query,
            result: Rc::clone(&result),
        });
        Ok(result)
    }

    fn build_query(&self) -> Query {
        let clauses: Vec<Clause> = self
            .fields
            .values()
            .filter(|field| field.has_value())
            .map(|field| Clause {
                target: field.target().to_string(),
                field_type: field.field_type().to_string(),
                comparison: field.comparison(),
                value: field.value().clone(),
            })
            .collect();

        // Ordering rules are kept sorted by priority at bind time; resolve
        // them to mapped targets here, skipping fields that were removed.
        let sort: Vec<Sort> = self
            .state
            .ordering
            .iter()
            .filter_map(|rule| {
                self.fields.get(&rule.field).map(|field| Sort {
                    field: field.target().to_string(),
                    direction: rule.direction,
                })
            })
            .collect();

        let take = self.state.max_results;
        let skip = take
            .map(|t| (self.state.page.saturating_sub(1)) * t)
            .filter(|s| *s > 0);

        Query {
            clauses,
            sort,
            skip,
            take,
        }
    }

    // ── Parameters ──────────────────────────────────────────

    /// This datasource's own parameter sub-mapping, reconstructed from the
    /// live bound state so that a bound blob round-trips.
    pub fn parameters(&self) -> Document {
        let mut own = Document::new();
        let mut values = Document::new();
        for field in self.fields.values() {
            if field.has_value() {
                values.insert(field.name().to_string(), field.value().clone());
            }
        }
        if !values.is_empty() {
            own.insert(FIELDS, values);
        }
        let ctx = ParamContext { state: &self.state };
        for extension in self.extensions.iter() {
            extension.parameters(&ctx, &mut own);
        }

        let mut out = Document::new();
        if !own.is_empty() {
            out.insert(self.name.clone(), own);
        }
        out
    }

    /// The complement: parameter blocks belonging to other datasources
    /// from the last binding call, verbatim.
    pub fn other_parameters(&self) -> Document {
        let mut others = self.all_parameters.clone();
        others.remove(&self.name);
        others
    }

    /// The full mapping across all datasources sharing the last binding
    /// call: the other blocks verbatim plus this one's reconstruction.
    pub fn all_parameters(&self) -> Document {
        let mut all = self.other_parameters();
        if let Some(Bson::Document(own)) = self.parameters().remove(&self.name) {
            all.insert(self.name.clone(), own);
        }
        all
    }

    // ── Views ───────────────────────────────────────────────

    /// Snapshot the current bindings into a view, in field insertion
    /// order, and let every extension decorate it.
    pub fn create_view(&self) -> DataSourceView {
        let view = DataSourceView::new(
            self.parameters(),
            self.all_parameters(),
            self.other_parameters(),
        );
        for field in self.fields.values() {
            // Names are unique within the datasource, so registration
            // cannot conflict.
            let _ = view.add_field(FieldView::new(field.clone()));
        }
        let ctx = ViewContext {
            fields: &self.fields,
            state: &self.state,
        };
        for extension in self.extensions.iter() {
            extension.decorate_view(&ctx, &view);
        }
        view
    }
}
