use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Comparison operator of a bound field clause.
///
/// The snake_case tags are the wire form used both by serde and by
/// `Display`/`FromStr`, so a comparison read from a request blob and one
/// built in code always spell the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
    Like,
    Contains,
    Between,
    IsNull,
    MemberOf,
}

impl Comparison {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Eq => "eq",
            Comparison::Neq => "neq",
            Comparison::Lt => "lt",
            Comparison::Lte => "lte",
            Comparison::Gt => "gt",
            Comparison::Gte => "gte",
            Comparison::In => "in",
            Comparison::NotIn => "not_in",
            Comparison::Like => "like",
            Comparison::Contains => "contains",
            Comparison::Between => "between",
            Comparison::IsNull => "is_null",
            Comparison::MemberOf => "member_of",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized comparison tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseComparisonError(pub String);

impl fmt::Display for ParseComparisonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown comparison: {}", self.0)
    }
}

impl std::error::Error for ParseComparisonError {}

impl FromStr for Comparison {
    type Err = ParseComparisonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" => Ok(Comparison::Eq),
            "neq" => Ok(Comparison::Neq),
            "lt" => Ok(Comparison::Lt),
            "lte" => Ok(Comparison::Lte),
            "gt" => Ok(Comparison::Gt),
            "gte" => Ok(Comparison::Gte),
            "in" => Ok(Comparison::In),
            "not_in" => Ok(Comparison::NotIn),
            "like" => Ok(Comparison::Like),
            "contains" => Ok(Comparison::Contains),
            "between" => Ok(Comparison::Between),
            "is_null" => Ok(Comparison::IsNull),
            "member_of" => Ok(Comparison::MemberOf),
            other => Err(ParseComparisonError(other.to_string())),
        }
    }
}
