use bson::{Bson, Document};

/// Reserved key for the field-value sub-document of a datasource's
/// parameter block.
pub const FIELDS: &str = "fields";

/// Reserved key for the 1-based page number.
pub const PAGE: &str = "page";

/// Reserved key for the paging window size.
pub const MAX_RESULTS: &str = "max_results";

/// The sub-document a blob carries for one datasource name, if any.
pub(crate) fn own_block<'a>(blob: &'a Document, name: &str) -> Option<&'a Document> {
    match blob.get(name) {
        Some(Bson::Document(block)) => Some(block),
        _ => None,
    }
}

/// Lenient integer coercion for parameter values. Anything that is not a
/// non-negative integer is ignored, like every other unrecognized input.
pub(crate) fn as_usize(value: &Bson) -> Option<usize> {
    match value {
        Bson::Int32(n) if *n >= 0 => Some(*n as usize),
        Bson::Int64(n) if *n >= 0 => Some(*n as usize),
        _ => None,
    }
}
