use bson::{Bson, Document};
use trellis_query::SortDirection;

use crate::extension::{BindContext, Extension, ParamContext, ViewContext};
use crate::params;
use crate::view::DataSourceView;

/// Reserved parameter key for ordering directives:
/// `{ "ordering": { <field>: { "direction": "asc"|"desc", "priority": n } } }`.
pub const ORDERING: &str = "ordering";

const DIRECTION: &str = "direction";
const PRIORITY: &str = "priority";

/// One requested sort key, by field name. Rules apply in ascending
/// priority order; priority 1 is the primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingRule {
    pub field: String,
    pub direction: SortDirection,
    pub priority: usize,
}

/// Interprets the `ordering` parameter vocabulary and exposes the current
/// sort state on field views for header rendering.
#[derive(Debug, Default)]
pub struct OrderingExtension;

impl OrderingExtension {
    pub fn new() -> Self {
        Self
    }
}

impl Extension for OrderingExtension {
    fn bind(&self, params: &Document, ctx: &mut BindContext<'_>) {
        let Some(Bson::Document(ordering)) = params.get(ORDERING) else {
            return;
        };
        let mut rules = Vec::new();
        for (name, entry) in ordering {
            // Directives for unknown fields or with malformed directions
            // are ignored, like any other unrecognized parameter.
            if !ctx.fields.contains_key(name.as_str()) {
                continue;
            }
            let Bson::Document(entry) = entry else {
                continue;
            };
            let Some(direction) = entry
                .get(DIRECTION)
                .and_then(|d| d.as_str())
                .and_then(|d| d.parse::<SortDirection>().ok())
            else {
                continue;
            };
            let priority = entry.get(PRIORITY).and_then(params::as_usize).unwrap_or(0);
            rules.push(OrderingRule {
                field: name.clone(),
                direction,
                priority,
            });
        }
        rules.sort_by_key(|r| r.priority);
        ctx.state.ordering = rules;
    }

    fn parameters(&self, ctx: &ParamContext<'_>, out: &mut Document) {
        if ctx.state.ordering.is_empty() {
            return;
        }
        let mut ordering = Document::new();
        for rule in &ctx.state.ordering {
            let mut entry = Document::new();
            entry.insert(DIRECTION, rule.direction.as_str());
            entry.insert(PRIORITY, rule.priority as i64);
            ordering.insert(rule.field.clone(), entry);
        }
        out.insert(ORDERING, ordering);
    }

    fn decorate_view(&self, ctx: &ViewContext<'_>, view: &DataSourceView) {
        for rule in &ctx.state.ordering {
            if let Ok(field_view) = view.get_field(&rule.field) {
                field_view.set_option("ordering_direction", rule.direction.as_str());
                field_view.set_option("ordering_priority", rule.priority as i64);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::BoundState;
    use crate::field::Field;
    use crate::types::FieldTypeDef;
    use bson::doc;
    use indexmap::IndexMap;
    use trellis_query::Comparison;

    fn fields() -> IndexMap<String, Field> {
        let text = FieldTypeDef::new("text", vec![Comparison::Like]);
        let mut map = IndexMap::new();
        for name in ["title", "author"] {
            map.insert(
                name.to_string(),
                Field::new(name, text.clone(), Comparison::Like, Document::new()).unwrap(),
            );
        }
        map
    }

    fn bind(params: Document, state: &mut BoundState) {
        let fields = fields();
        let mut ctx = BindContext {
            fields: &fields,
            state,
        };
        OrderingExtension::new().bind(&params, &mut ctx);
    }

    #[test]
    fn rules_sort_by_ascending_priority() {
        let mut state = BoundState::default();
        bind(
            doc! { "ordering": {
                "title": { "direction": "desc", "priority": 2 },
                "author": { "direction": "asc", "priority": 1 },
            }},
            &mut state,
        );
        let fields: Vec<&str> = state.ordering.iter().map(|r| r.field.as_str()).collect();
        assert_eq!(fields, ["author", "title"]);
        assert_eq!(state.ordering[0].direction, SortDirection::Asc);
    }

    #[test]
    fn unknown_fields_and_bad_directions_ignored() {
        let mut state = BoundState::default();
        bind(
            doc! { "ordering": {
                "ghost": { "direction": "asc", "priority": 1 },
                "title": { "direction": "upwards", "priority": 1 },
                "author": { "direction": "asc", "priority": 1 },
            }},
            &mut state,
        );
        assert_eq!(state.ordering.len(), 1);
        assert_eq!(state.ordering[0].field, "author");
    }

    #[test]
    fn parameters_round_trip() {
        let mut state = BoundState::default();
        let blob = doc! { "ordering": {
            "author": { "direction": "asc", "priority": 1_i64 },
            "title": { "direction": "desc", "priority": 2_i64 },
        }};
        bind(blob.clone(), &mut state);

        let mut out = Document::new();
        OrderingExtension::new().parameters(&ParamContext { state: &state }, &mut out);
        assert_eq!(out, blob);
    }
}
