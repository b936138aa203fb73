use std::rc::Rc;

use crate::datasource::DataSource;
use crate::driver::Driver;
use crate::error::DataSourceError;
use crate::extension::{
    CoreExtension, Extension, FormExtension, OrderingExtension, PaginationExtension,
};
use crate::types::FieldTypeRegistry;

/// Creates datasources over a shared extension set.
///
/// The field-type registry is built once from the extensions at
/// construction; every datasource created here shares it and the
/// extension pipeline. The default factory carries the core field types
/// plus the pagination, ordering and form extensions.
pub struct DataSourceFactory {
    extensions: Rc<Vec<Box<dyn Extension>>>,
    registry: Rc<FieldTypeRegistry>,
}

impl DataSourceFactory {
    pub fn new(extensions: Vec<Box<dyn Extension>>) -> Self {
        let mut registry = FieldTypeRegistry::new();
        for extension in &extensions {
            for def in extension.field_types() {
                registry.register(def);
            }
        }
        Self {
            extensions: Rc::new(extensions),
            registry: Rc::new(registry),
        }
    }

    /// Create a named datasource over a shared driver. Names key the
    /// parameter blobs, so they are restricted to `[A-Za-z0-9_]+`.
    pub fn create<D: Driver>(
        &self,
        driver: Rc<D>,
        name: &str,
    ) -> Result<DataSource<D>, DataSourceError> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DataSourceError::InvalidName(name.to_string()));
        }
        Ok(DataSource::new(
            name.to_string(),
            driver,
            Rc::clone(&self.registry),
            Rc::clone(&self.extensions),
        ))
    }

    pub fn registry(&self) -> &FieldTypeRegistry {
        &self.registry
    }
}

impl Default for DataSourceFactory {
    fn default() -> Self {
        Self::new(vec![
            Box::new(CoreExtension::new()),
            Box::new(PaginationExtension::new()),
            Box::new(OrderingExtension::new()),
            Box::new(FormExtension::new()),
        ])
    }
}
