use bson::Document;
use indexmap::IndexMap;
use trellis_query::Comparison;

/// Declaration of one field type: its tag, the comparisons it allows, and
/// default mapping options applied to every field of that type.
#[derive(Debug, Clone)]
pub struct FieldTypeDef {
    tag: String,
    comparisons: Vec<Comparison>,
    default_options: Document,
}

impl FieldTypeDef {
    pub fn new(tag: impl Into<String>, comparisons: impl Into<Vec<Comparison>>) -> Self {
        Self {
            tag: tag.into(),
            comparisons: comparisons.into(),
            default_options: Document::new(),
        }
    }

    pub fn with_default_options(mut self, options: Document) -> Self {
        self.default_options = options;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn comparisons(&self) -> &[Comparison] {
        &self.comparisons
    }

    pub fn allows(&self, comparison: Comparison) -> bool {
        self.comparisons.contains(&comparison)
    }

    pub fn default_options(&self) -> &Document {
        &self.default_options
    }
}

/// Tag → type definition, in registration order. A later registration of
/// the same tag replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct FieldTypeRegistry {
    types: IndexMap<String, FieldTypeDef>,
}

impl FieldTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, def: FieldTypeDef) {
        self.types.insert(def.tag.clone(), def);
    }

    pub fn has(&self, tag: &str) -> bool {
        self.types.contains_key(tag)
    }

    pub fn get(&self, tag: &str) -> Option<&FieldTypeDef> {
        self.types.get(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}
