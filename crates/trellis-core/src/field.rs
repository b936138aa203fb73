use bson::{Bson, Document};
use trellis_query::Comparison;

use crate::error::DataSourceError;
use crate::types::FieldTypeDef;

/// Mapping option naming the document path a field filters on. Defaults to
/// the field name; dotted paths address nested documents.
pub const FIELD_MAPPING: &str = "field_mapping";

/// True for the value that stands for "absent" in an option bag. Writing it
/// removes the key, so presence checks and enumeration stay consistent.
pub(crate) fn option_is_absent(value: &Bson) -> bool {
    matches!(value, Bson::Null)
}

/// True for values that do not bind a field: null, empty string, empty
/// array. A field with an empty value contributes no clause.
pub(crate) fn value_is_empty(value: &Bson) -> bool {
    match value {
        Bson::Null => true,
        Bson::String(s) => s.is_empty(),
        Bson::Array(a) => a.is_empty(),
        _ => false,
    }
}

/// One filterable/sortable attribute of a datasource: a name, a type, a
/// comparison drawn from the type's allowed set, mapping options, and the
/// currently bound value.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    type_def: FieldTypeDef,
    comparison: Comparison,
    options: Document,
    value: Bson,
}

impl Field {
    pub(crate) fn new(
        name: impl Into<String>,
        type_def: FieldTypeDef,
        comparison: Comparison,
        options: Document,
    ) -> Result<Self, DataSourceError> {
        if !type_def.allows(comparison) {
            return Err(DataSourceError::UnsupportedComparison {
                field_type: type_def.tag().to_string(),
                comparison,
            });
        }
        let mut merged = type_def.default_options().clone();
        for (key, value) in options {
            if option_is_absent(&value) {
                merged.remove(&key);
            } else {
                merged.insert(key, value);
            }
        }
        Ok(Self {
            name: name.into(),
            type_def,
            comparison,
            options: merged,
            value: Bson::Null,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type tag, e.g. `"text"`.
    pub fn field_type(&self) -> &str {
        self.type_def.tag()
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    /// Change the comparison; fails if it is outside the type's allowed set.
    pub fn set_comparison(&mut self, comparison: Comparison) -> Result<(), DataSourceError> {
        if !self.type_def.allows(comparison) {
            return Err(DataSourceError::UnsupportedComparison {
                field_type: self.type_def.tag().to_string(),
                comparison,
            });
        }
        self.comparison = comparison;
        Ok(())
    }

    pub fn value(&self) -> &Bson {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<Bson>) {
        self.value = value.into();
    }

    pub(crate) fn clear_value(&mut self) {
        self.value = Bson::Null;
    }

    /// True when the bound value is concrete enough to produce a clause.
    pub fn has_value(&self) -> bool {
        !value_is_empty(&self.value)
    }

    /// The mapped document path this field filters on.
    pub fn target(&self) -> &str {
        match self.options.get(FIELD_MAPPING) {
            Some(Bson::String(path)) => path,
            _ => &self.name,
        }
    }

    pub fn has_option(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    pub fn get_option(&self, name: &str) -> Result<&Bson, DataSourceError> {
        self.options
            .get(name)
            .ok_or_else(|| DataSourceError::NoSuchOption(name.to_string()))
    }

    /// Set an option. Writing the absent sentinel (`Bson::Null`) removes
    /// the key instead of storing it.
    pub fn set_option(&mut self, name: impl Into<String>, value: impl Into<Bson>) {
        let name = name.into();
        let value = value.into();
        if option_is_absent(&value) {
            self.options.remove(&name);
        } else {
            self.options.insert(name, value);
        }
    }

    pub fn remove_option(&mut self, name: &str) {
        self.options.remove(name);
    }

    pub fn options(&self) -> &Document {
        &self.options
    }
}
