//! Tests for query parameter documentation
//!
//! The generated descriptors must advertise exactly what the compiler
//! accepts: a `filters.<field>` entry for every field that can produce a
//! predicate and range bounds only where range predicates are compiled.

use serde_json::json;
use sieve::docs::{ParameterLocation, ParameterSchema, SchemaType, describe_type};
use sieve::filters::compile_ranges;
use sieve::prelude::*;

impl_field_enum!(Tier {
    Basic => "BASIC",
    Premium => "PREMIUM",
});

impl_filter_spec!(BaseFilter, {
    created: DateTime<Utc>,
});

impl_filter_spec!(MemberFilter extends BaseFilter as base, {
    #[primary_id]
    id: Uuid,
    #[filterable_id]
    team_id: Uuid,
    display_name: String,
    age: i32,
    score: f64,
    verified: bool,
    tier: Tier,
    roles: Vec<String>,
});

fn names(parameters: &[ParameterDescriptor]) -> Vec<&str> {
    parameters.iter().map(|p| p.name.as_str()).collect()
}

mod describe_tests {
    use super::*;

    #[test]
    fn test_fixed_parameters_come_first() {
        let parameters = describe::<MemberFilter>();
        assert_eq!(
            &names(&parameters)[..6],
            &[
                "pagination.pageNumber",
                "pagination.pageSize",
                "pagination.sortBy",
                "pagination.sortDirection",
                "options.caseInsensitiveStrings",
                "options.includeInheritedFields",
            ]
        );
        assert!(parameters.iter().all(|p| p.location == ParameterLocation::Query));
    }

    #[test]
    fn test_field_parameters() {
        let parameters = describe::<MemberFilter>();
        let names = names(&parameters);

        assert!(!names.contains(&"filters.id"));
        assert!(names.contains(&"filters.team_id"));
        assert!(!names.contains(&"rangeFilters.ranges[team_id].from"));

        for field in ["age", "score", "created"] {
            assert!(names.contains(&format!("rangeFilters.ranges[{}].from", field).as_str()));
            assert!(names.contains(&format!("rangeFilters.ranges[{}].to", field).as_str()));
        }
        for field in ["display_name", "verified", "tier", "roles"] {
            assert!(names.contains(&format!("filters.{}", field).as_str()));
            assert!(!names.contains(&format!("rangeFilters.ranges[{}].from", field).as_str()));
        }
    }

    #[test]
    fn test_schemas_follow_value_kinds() {
        let parameters = describe::<MemberFilter>();
        let schema = |name: &str| -> ParameterSchema {
            parameters
                .iter()
                .find(|p| p.name == name)
                .map(|p| p.schema.clone())
                .unwrap()
        };

        assert_eq!(schema("filters.age").schema_type, SchemaType::Integer);
        assert_eq!(schema("filters.score").schema_type, SchemaType::Number);
        assert_eq!(schema("filters.verified").schema_type, SchemaType::Boolean);
        assert_eq!(schema("filters.created").format.as_deref(), Some("date-time"));
        assert_eq!(
            schema("filters.tier").enum_values,
            Some(vec!["BASIC".to_string(), "PREMIUM".to_string()])
        );
        assert!(schema("filters.roles").description.unwrap().contains("Comma-separated"));
    }

    #[test]
    fn test_serializes_as_openapi_parameter() {
        let parameters = describe::<MemberFilter>();
        let display_name = parameters
            .iter()
            .find(|p| p.name == "filters.display_name")
            .unwrap();

        assert_eq!(
            serde_json::to_value(display_name).unwrap(),
            json!({
                "name": "filters.display_name",
                "in": "query",
                "description": "Exact filter for display name",
                "required": false,
                "schema": { "type": "string" }
            })
        );
    }
}

mod consistency_tests {
    use super::*;

    #[test]
    fn test_range_parameters_match_compiled_ranges() {
        let parameters = describe_type(MemberFilter::type_descriptor());
        let ranges = ["id", "team_id", "age", "score", "created"]
            .iter()
            .fold(RangeFilter::new(), |ranges, field| {
                ranges.with(*field, Range::at_least(1))
            });

        let compiled: Vec<String> = compile_ranges::<MemberFilter>(&ranges)
            .iter()
            .map(|c| c.field().to_string())
            .collect();

        for field in &compiled {
            let from = format!("rangeFilters.ranges[{}].from", field);
            assert!(
                parameters.iter().any(|p| p.name == from),
                "range on '{}' compiled but not documented",
                field
            );
        }
        assert!(!compiled.contains(&"id".to_string()));
        assert!(!compiled.contains(&"team_id".to_string()));
    }

    #[test]
    fn test_customize_without_type_is_noop() {
        let existing = vec![ParameterDescriptor::query(
            "q",
            "Free text",
            ParameterSchema::string(),
        )];
        assert_eq!(customize(existing.clone(), None), existing);
    }

    #[test]
    fn test_customize_keeps_non_query_parameters() {
        let mut path = ParameterDescriptor::query("teamId", "Team", ParameterSchema::string());
        path.location = ParameterLocation::Path;
        path.required = true;
        let stale = ParameterDescriptor::query("filters", "Raw filter", ParameterSchema::string());

        let merged = customize(
            vec![path.clone(), stale],
            Some(MemberFilter::type_descriptor()),
        );

        assert_eq!(merged[0], path);
        assert!(merged.iter().all(|p| p.name != "filters"));
        assert_eq!(merged.len(), 1 + describe::<MemberFilter>().len());
    }
}
