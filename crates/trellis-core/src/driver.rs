use std::fmt;

use bson::Document;
use trellis_query::{Comparison, Query};

/// Failure surfaced by a driver. `Execution` carries the underlying
/// storage failure unmodified; the core never retries.
#[derive(Debug)]
pub enum DriverError {
    /// A clause's bound value does not fit its comparison (e.g. a
    /// `between` value that is not a two-element array).
    InvalidClause(String),
    /// The underlying storage failed to execute the query.
    Execution(String),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::InvalidClause(msg) => write!(f, "invalid clause: {msg}"),
            DriverError::Execution(msg) => write!(f, "execution failed: {msg}"),
        }
    }
}

impl std::error::Error for DriverError {}

/// Storage-side collaborator of a datasource.
///
/// `supports` is consulted at field-registration time so that an
/// inexpressible (type, comparison) pair fails there, never during
/// execution. `execute` must evaluate against a pristine view of the
/// backing set on every call; predicates never accumulate across calls.
pub trait Driver {
    fn supports(&self, field_type: &str, comparison: Comparison) -> bool;

    fn execute(&self, query: &Query) -> Result<ResultSet, DriverError>;
}

/// One executed result: the full match count and the (possibly windowed)
/// records.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    total: u64,
    records: Vec<Document>,
}

impl ResultSet {
    pub fn new(total: u64, records: Vec<Document>) -> Self {
        Self { total, records }
    }

    /// Count of all matches, before any paging window.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of records in the current window.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Document] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn total_and_window_are_independent() {
        let result = ResultSet::new(100, vec![doc! { "title": "title0" }]);
        assert_eq!(result.total(), 100);
        assert_eq!(result.len(), 1);
        assert_eq!(result.iter().count(), 1);
    }

    #[test]
    fn iterates_in_record_order() {
        let result = ResultSet::new(
            2,
            vec![doc! { "title": "title0" }, doc! { "title": "title1" }],
        );
        let titles: Vec<&str> = result
            .iter()
            .filter_map(|d| d.get("title").and_then(|t| t.as_str()))
            .collect();
        assert_eq!(titles, ["title0", "title1"]);
    }
}
