use std::cmp::Ordering;

use bson::{Bson, Document};
use regex::Regex;
use trellis_core::DriverError;
use trellis_query::{Clause, Comparison, Sort, SortDirection};

/// Resolve a dotted path against a document: `"category.name"` descends
/// into nested documents. Missing segments resolve to nothing.
pub(crate) fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut current = doc;
    let mut parts = path.split('.').peekable();
    while let Some(part) = parts.next() {
        let value = current.get(part)?;
        if parts.peek().is_none() {
            return Some(value);
        }
        match value {
            Bson::Document(inner) => current = inner,
            _ => return None,
        }
    }
    None
}

fn numeric(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(*n as f64),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

/// Order two values, coercing across the numeric types. Incomparable
/// kinds yield `None`.
pub(crate) fn compare(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (numeric(a), numeric(b)) {
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    match compare(a, b) {
        Some(ordering) => ordering == Ordering::Equal,
        None => a == b,
    }
}

/// Identity match for entity targets: a document compares by its `id`
/// element, anything else directly.
fn entity_matches(target: &Bson, value: &Bson) -> bool {
    match target {
        Bson::Document(doc) => match doc.get("id") {
            Some(id) => values_equal(id, value),
            None => false,
        },
        other => values_equal(other, value),
    }
}

enum Matcher {
    Eq,
    Neq,
    Ordered(Comparison),
    In,
    NotIn,
    Pattern(Regex),
    Between(Bson, Bson),
    IsNull,
    MemberOf,
}

/// One clause compiled for repeated evaluation: the value shape is
/// validated and the `like`/`contains` pattern compiled exactly once.
pub(crate) struct Predicate<'a> {
    clause: &'a Clause,
    entity: bool,
    matcher: Matcher,
}

impl<'a> Predicate<'a> {
    pub(crate) fn compile(clause: &'a Clause) -> Result<Self, DriverError> {
        let matcher = match clause.comparison {
            Comparison::Eq => Matcher::Eq,
            Comparison::Neq => Matcher::Neq,
            Comparison::Lt | Comparison::Lte | Comparison::Gt | Comparison::Gte => {
                Matcher::Ordered(clause.comparison)
            }
            Comparison::In => {
                require_array(clause)?;
                Matcher::In
            }
            Comparison::NotIn => {
                require_array(clause)?;
                Matcher::NotIn
            }
            Comparison::Like => Matcher::Pattern(pattern(clause, true)?),
            Comparison::Contains => Matcher::Pattern(pattern(clause, false)?),
            Comparison::Between => {
                let Bson::Array(range) = &clause.value else {
                    return Err(invalid(clause, "between expects a [low, high] array"));
                };
                match range.as_slice() {
                    [low, high] => Matcher::Between(low.clone(), high.clone()),
                    _ => return Err(invalid(clause, "between expects exactly two bounds")),
                }
            }
            Comparison::IsNull => Matcher::IsNull,
            Comparison::MemberOf => Matcher::MemberOf,
        };
        Ok(Self {
            clause,
            entity: clause.field_type == "entity",
            matcher,
        })
    }

    pub(crate) fn matches(&self, doc: &Document) -> bool {
        let target = lookup(doc, &self.clause.target);
        if let Matcher::IsNull = self.matcher {
            return matches!(target, None | Some(Bson::Null));
        }
        // A missing target matches nothing except is_null.
        let Some(found) = target else {
            return false;
        };

        let value = &self.clause.value;
        let equal = |a: &Bson, b: &Bson| {
            if self.entity {
                entity_matches(a, b)
            } else {
                values_equal(a, b)
            }
        };

        match &self.matcher {
            Matcher::Eq => equal(found, value),
            Matcher::Neq => !equal(found, value),
            Matcher::Ordered(comparison) => match compare(found, value) {
                Some(ordering) => match comparison {
                    Comparison::Lt => ordering == Ordering::Less,
                    Comparison::Lte => ordering != Ordering::Greater,
                    Comparison::Gt => ordering == Ordering::Greater,
                    Comparison::Gte => ordering != Ordering::Less,
                    _ => false,
                },
                None => false,
            },
            Matcher::In => match value {
                Bson::Array(candidates) => candidates.iter().any(|c| equal(found, c)),
                _ => false,
            },
            Matcher::NotIn => match value {
                Bson::Array(candidates) => !candidates.iter().any(|c| equal(found, c)),
                _ => false,
            },
            Matcher::Pattern(regex) => match found {
                Bson::String(text) => regex.is_match(text),
                _ => false,
            },
            Matcher::Between(low, high) => {
                compare(found, low).is_some_and(|o| o != Ordering::Less)
                    && compare(found, high).is_some_and(|o| o != Ordering::Greater)
            }
            Matcher::IsNull => unreachable!("handled above"),
            Matcher::MemberOf => match found {
                Bson::Array(members) => members.iter().any(|m| entity_matches(m, value)),
                _ => false,
            },
        }
    }
}

fn require_array(clause: &Clause) -> Result<(), DriverError> {
    match clause.value {
        Bson::Array(_) => Ok(()),
        _ => Err(invalid(clause, "expects an array of candidates")),
    }
}

/// Substring pattern over the bound value. `like` wraps the value in
/// wildcards and matches case-insensitively by convention; `contains` is
/// its case-sensitive counterpart.
fn pattern(clause: &Clause, case_insensitive: bool) -> Result<Regex, DriverError> {
    let Bson::String(needle) = &clause.value else {
        return Err(invalid(clause, "expects a string value"));
    };
    let escaped = regex::escape(needle);
    let source = if case_insensitive {
        format!("(?i){escaped}")
    } else {
        escaped
    };
    Regex::new(&source).map_err(|e| invalid(clause, &e.to_string()))
}

fn invalid(clause: &Clause, detail: &str) -> DriverError {
    DriverError::InvalidClause(format!(
        "{} {} on {}: {detail}",
        clause.field_type, clause.comparison, clause.target
    ))
}

/// Multi-key sort: later keys break ties of earlier ones; a missing field
/// sorts before any present value. Stable, so pre-existing order survives
/// as the final tiebreak.
pub(crate) fn sort_records(records: &mut [&Document], sorts: &[Sort]) {
    if sorts.is_empty() {
        return;
    }
    records.sort_by(|a, b| {
        for sort in sorts {
            let a_field = lookup(a, &sort.field);
            let b_field = lookup(b, &sort.field);
            let ordering = match (a_field, b_field) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
            };
            let ordering = match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}
