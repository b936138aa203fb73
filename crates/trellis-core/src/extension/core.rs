use trellis_query::Comparison::*;

use crate::extension::Extension;
use crate::types::FieldTypeDef;

/// Provides the built-in field types and their allowed comparison sets.
#[derive(Debug, Default)]
pub struct CoreExtension;

impl CoreExtension {
    pub fn new() -> Self {
        Self
    }
}

impl Extension for CoreExtension {
    fn field_types(&self) -> Vec<FieldTypeDef> {
        let ordered = vec![Eq, Neq, Lt, Lte, Gt, Gte, In, NotIn, Between, IsNull];
        vec![
            FieldTypeDef::new("text", vec![Eq, Neq, In, NotIn, Like, Contains, IsNull]),
            FieldTypeDef::new("number", ordered.clone()),
            FieldTypeDef::new("date", ordered.clone()),
            FieldTypeDef::new("time", ordered.clone()),
            FieldTypeDef::new("datetime", ordered),
            FieldTypeDef::new("boolean", vec![Eq, IsNull]),
            FieldTypeDef::new("entity", vec![Eq, Neq, In, NotIn, IsNull, MemberOf]),
        ]
    }
}
