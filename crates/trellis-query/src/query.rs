use serde::{Deserialize, Serialize};

use crate::clause::Clause;
use crate::sort::Sort;

/// The full directive set handed to a driver for one execution: clauses in
/// field registration order, resolved sort keys, and the paging window.
///
/// `PartialEq` is part of the contract: the core compares consecutively
/// built queries to decide whether a cached result is still current.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub clauses: Vec<Clause>,
    #[serde(default)]
    pub sort: Vec<Sort>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
}

impl Query {
    /// True when the query narrows nothing: no clauses, no sorts, no window.
    pub fn is_unfiltered(&self) -> bool {
        self.clauses.is_empty() && self.sort.is_empty() && self.skip.is_none() && self.take.is_none()
    }
}
