use bson::Bson;
use serde::{Deserialize, Serialize};

use crate::comparison::Comparison;

/// One bound field translated for a driver.
///
/// `target` is the mapped document path the predicate applies to, dotted
/// for nested documents (`"category.name"`). `field_type` carries the
/// field's type tag so drivers can dispatch on (type, comparison).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub target: String,
    pub field_type: String,
    pub comparison: Comparison,
    pub value: Bson,
}
