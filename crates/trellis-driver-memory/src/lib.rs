mod eval;

use bson::Document;
use trellis_core::{Driver, DriverError, ResultSet};
use trellis_query::{Comparison, Query};

use crate::eval::{Predicate, sort_records};

/// Driver over an in-memory record set.
///
/// Holds its backing records immutably and evaluates every execution from
/// scratch; repeated executions never observe predicates from a previous
/// one. An optional base query plays the role of a pre-built query
/// object: it carves the backing set (filter, sort, window) before any
/// bound-field clause applies.
pub struct MemoryDriver {
    records: Vec<Document>,
    base: Query,
}

impl MemoryDriver {
    pub fn new(records: Vec<Document>) -> Self {
        Self {
            records,
            base: Query::default(),
        }
    }

    /// Drive a pre-filtered subset: `base` is applied first, bound-field
    /// clauses then narrow its outcome. Bound sort keys take precedence;
    /// the base order survives as the residual tiebreak.
    pub fn with_base_query(records: Vec<Document>, base: Query) -> Self {
        Self { records, base }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn compile(clauses: &[trellis_query::Clause]) -> Result<Vec<Predicate<'_>>, DriverError> {
        clauses.iter().map(Predicate::compile).collect()
    }
}

impl Driver for MemoryDriver {
    fn supports(&self, field_type: &str, comparison: Comparison) -> bool {
        use trellis_query::Comparison::*;
        match field_type {
            "text" => matches!(comparison, Eq | Neq | In | NotIn | Like | Contains | IsNull),
            "number" | "date" | "time" | "datetime" => matches!(
                comparison,
                Eq | Neq | Lt | Lte | Gt | Gte | In | NotIn | Between | IsNull
            ),
            "boolean" => matches!(comparison, Eq | IsNull),
            "entity" => matches!(comparison, Eq | Neq | In | NotIn | IsNull | MemberOf),
            _ => false,
        }
    }

    fn execute(&self, query: &Query) -> Result<ResultSet, DriverError> {
        // Carve the backing set with the base query first.
        let base_predicates = Self::compile(&self.base.clauses)?;
        let mut universe: Vec<&Document> = self
            .records
            .iter()
            .filter(|record| base_predicates.iter().all(|p| p.matches(record)))
            .collect();
        sort_records(&mut universe, &self.base.sort);
        if let Some(skip) = self.base.skip {
            universe.drain(..skip.min(universe.len()));
        }
        if let Some(take) = self.base.take {
            universe.truncate(take);
        }

        // Bound-field clauses narrow the carved set.
        let predicates = Self::compile(&query.clauses)?;
        let mut matched: Vec<&Document> = universe
            .into_iter()
            .filter(|record| predicates.iter().all(|p| p.matches(record)))
            .collect();
        let total = matched.len() as u64;

        // Stable sort: the base order remains the final tiebreak.
        sort_records(&mut matched, &query.sort);

        let skip = query.skip.unwrap_or(0);
        let records: Vec<Document> = matched
            .into_iter()
            .skip(skip)
            .take(query.take.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(ResultSet::new(total, records))
    }
}
