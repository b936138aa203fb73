use std::fmt;

use trellis_query::Comparison;

use crate::driver::DriverError;

/// Configuration and lookup failures raised by a datasource or its fields.
///
/// Configuration variants (duplicate fields, unknown types, comparison
/// violations, bad names) are fatal and raised at the offending call, never
/// deferred to execution time. `Driver` wraps the underlying execution
/// failure unmodified.
#[derive(Debug)]
pub enum DataSourceError {
    DuplicateField(String),
    UnknownFieldType(String),
    UnsupportedComparison {
        field_type: String,
        comparison: Comparison,
    },
    InvalidName(String),
    NoSuchField(String),
    NoSuchOption(String),
    Driver(DriverError),
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::DuplicateField(name) => {
                write!(f, "field already exists: {name}")
            }
            DataSourceError::UnknownFieldType(tag) => {
                write!(f, "unknown field type: {tag}")
            }
            DataSourceError::UnsupportedComparison {
                field_type,
                comparison,
            } => {
                write!(f, "comparison {comparison} not supported for type {field_type}")
            }
            DataSourceError::InvalidName(name) => {
                write!(f, "invalid datasource name: {name:?}")
            }
            DataSourceError::NoSuchField(name) => write!(f, "no field with name: {name}"),
            DataSourceError::NoSuchOption(name) => write!(f, "no option with name: {name}"),
            DataSourceError::Driver(e) => write!(f, "driver error: {e}"),
        }
    }
}

impl std::error::Error for DataSourceError {}

impl From<DriverError> for DataSourceError {
    fn from(e: DriverError) -> Self {
        DataSourceError::Driver(e)
    }
}

/// Lookup failures and naming conflicts on a view.
#[derive(Debug)]
pub enum ViewError {
    DuplicateField(String),
    NoSuchField(String),
    NoSuchOption(String),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::DuplicateField(name) => write!(f, "field already exists: {name}"),
            ViewError::NoSuchField(name) => write!(f, "no field with name: {name}"),
            ViewError::NoSuchOption(name) => write!(f, "no option with name: {name}"),
        }
    }
}

impl std::error::Error for ViewError {}
