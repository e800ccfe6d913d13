//! Parameter descriptor generation
//!
//! Descriptors serialize as OpenAPI parameter objects and can be merged
//! into an existing operation with [`customize`].

use crate::core::field::ValueKind;
use crate::core::introspect::{Introspect, TypeDescriptor};
use crate::filters::classifier::{FieldDescriptor, classify_descriptor};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const COLLECTION_DESCRIPTION: &str = "Comma-separated values for collection/array filtering";

/// Where a parameter is carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Path,
    Header,
    Cookie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
}

/// Schema of a single parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Closed set of accepted values
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParameterSchema {
    pub fn of(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            format: None,
            enum_values: None,
            description: None,
            default: None,
        }
    }

    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    /// Schema documenting a field of the given kind
    pub fn for_kind(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Enum { variants } => Self {
                enum_values: Some(variants.iter().map(|v| v.to_string()).collect()),
                ..Self::string()
            },
            ValueKind::String | ValueKind::Other => Self::string(),
            ValueKind::Number { integral: true } => Self::of(SchemaType::Integer),
            ValueKind::Number { integral: false } => Self::of(SchemaType::Number),
            ValueKind::Boolean => Self::of(SchemaType::Boolean),
            ValueKind::Temporal => Self {
                format: Some("date-time".to_string()),
                ..Self::string()
            },
            ValueKind::Collection | ValueKind::Array => Self {
                description: Some(COLLECTION_DESCRIPTION.to_string()),
                ..Self::string()
            },
        }
    }

    fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// One documented parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParameterLocation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    pub schema: ParameterSchema,
}

impl ParameterDescriptor {
    /// An optional query parameter
    pub fn query(name: impl Into<String>, description: impl Into<String>, schema: ParameterSchema) -> Self {
        Self {
            name: name.into(),
            location: ParameterLocation::Query,
            description: Some(description.into()),
            required: false,
            schema,
        }
    }
}

/// Describe every query parameter accepted for filter type `F`
pub fn describe<F: Introspect>() -> Vec<ParameterDescriptor> {
    describe_type(F::type_descriptor())
}

/// Describe every query parameter accepted for a registered filter type
///
/// Pagination and option parameters come first, followed by each visible
/// field (inherited fields included) and, for rangeable fields, the two
/// range bounds.
pub fn describe_type(filter_type: &'static TypeDescriptor) -> Vec<ParameterDescriptor> {
    let mut parameters = vec![
        ParameterDescriptor::query(
            "pagination.pageNumber",
            "Page number (0-based)",
            ParameterSchema::of(SchemaType::Integer).with_default(json!(0)),
        ),
        ParameterDescriptor::query(
            "pagination.pageSize",
            "Number of items per page",
            ParameterSchema::of(SchemaType::Integer).with_default(json!(10)),
        ),
        ParameterDescriptor::query(
            "pagination.sortBy",
            "Field to sort by",
            ParameterSchema::string(),
        ),
        ParameterDescriptor::query(
            "pagination.sortDirection",
            "Sort direction (ASC or DESC)",
            ParameterSchema::string().with_default(json!("DESC")),
        ),
        ParameterDescriptor::query(
            "options.caseInsensitiveStrings",
            "Enable case-insensitive string filtering",
            ParameterSchema::of(SchemaType::Boolean).with_default(json!(false)),
        ),
        ParameterDescriptor::query(
            "options.includeInheritedFields",
            "Include fields from parent types",
            ParameterSchema::of(SchemaType::Boolean).with_default(json!(false)),
        ),
    ];

    for field in classify_descriptor(filter_type, true).iter() {
        describe_field(field, &mut parameters);
    }

    parameters
}

fn describe_field(field: &FieldDescriptor, parameters: &mut Vec<ParameterDescriptor>) {
    if field.is_primary_identifier && !field.is_filterable_identifier {
        return;
    }

    let words = to_words(field.name);
    parameters.push(ParameterDescriptor::query(
        format!("filters.{}", field.name),
        format!("Exact filter for {}", words),
        ParameterSchema::for_kind(field.value_kind),
    ));

    if field.is_primary_identifier || !field.accepts_range() {
        return;
    }

    parameters.push(ParameterDescriptor::query(
        format!("rangeFilters.ranges[{}].from", field.name),
        format!("Filter {} from value", words),
        ParameterSchema::for_kind(field.value_kind),
    ));
    parameters.push(ParameterDescriptor::query(
        format!("rangeFilters.ranges[{}].to", field.name),
        format!("Filter {} to value", words),
        ParameterSchema::for_kind(field.value_kind),
    ));
}

/// Merge generated parameters into an operation's existing ones
///
/// Without a resolvable filter type the existing list is returned as is.
/// Otherwise non-query parameters are kept, in order, and every existing
/// query parameter is replaced by the generated set.
pub fn customize(
    existing: Vec<ParameterDescriptor>,
    filter_type: Option<&'static TypeDescriptor>,
) -> Vec<ParameterDescriptor> {
    let Some(filter_type) = filter_type else {
        return existing;
    };

    let mut parameters: Vec<ParameterDescriptor> = existing
        .into_iter()
        .filter(|p| p.location != ParameterLocation::Query)
        .collect();
    parameters.extend(describe_type(filter_type));
    parameters
}

/// `firstName` / `first_name` become `first name`
fn to_words(name: &str) -> String {
    let mut words = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c == '_' {
            if !words.is_empty() && !words.ends_with(' ') {
                words.push(' ');
            }
        } else if c.is_uppercase() {
            if !words.is_empty() && !words.ends_with(' ') {
                words.push(' ');
            }
            words.extend(c.to_lowercase());
        } else {
            words.push(c);
        }
    }
    words.trim_end().to_string()
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use uuid::Uuid;

    crate::impl_field_enum!(Tier {
        Gold => "GOLD",
        Silver => "SILVER",
    });

    crate::impl_filter_spec!(PartyFilter, {
        createdAt: chrono::DateTime<chrono::Utc>,
    });

    crate::impl_filter_spec!(CustomerFilter extends PartyFilter as party, {
        id: Uuid,
        accountId: Uuid,
        #[filterable_id]
        branchId: Uuid,
        firstName: String,
        loyalty_points: i64,
        balance: f64,
        vip: bool,
        tier: Tier,
        tags: Vec<String>,
    });

    fn names(parameters: &[ParameterDescriptor]) -> Vec<&str> {
        parameters.iter().map(|p| p.name.as_str()).collect()
    }

    fn find<'a>(parameters: &'a [ParameterDescriptor], name: &str) -> &'a ParameterDescriptor {
        parameters
            .iter()
            .find(|p| p.name == name)
            .unwrap_or_else(|| panic!("{} not described", name))
    }

    #[test]
    fn test_pagination_and_options_come_first() {
        let parameters = describe::<CustomerFilter>();
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
        assert_eq!(parameters[0].schema.default, Some(json!(0)));
        assert_eq!(parameters[1].schema.default, Some(json!(10)));
        assert_eq!(parameters[3].schema.default, Some(json!("DESC")));
        assert!(parameters.iter().all(|p| !p.required));
    }

    #[test]
    fn test_field_parameters() {
        let parameters = describe::<CustomerFilter>();
        assert_eq!(
            &names(&parameters)[6..],
            &[
                "filters.branchId",
                "filters.firstName",
                "filters.loyalty_points",
                "rangeFilters.ranges[loyalty_points].from",
                "rangeFilters.ranges[loyalty_points].to",
                "filters.balance",
                "rangeFilters.ranges[balance].from",
                "rangeFilters.ranges[balance].to",
                "filters.vip",
                "filters.tier",
                "filters.tags",
                "filters.createdAt",
                "rangeFilters.ranges[createdAt].from",
                "rangeFilters.ranges[createdAt].to",
            ]
        );
    }

    #[test]
    fn test_descriptions_use_words() {
        let parameters = describe::<CustomerFilter>();
        assert_eq!(
            find(&parameters, "filters.firstName").description.as_deref(),
            Some("Exact filter for first name")
        );
        assert_eq!(
            find(&parameters, "rangeFilters.ranges[loyalty_points].from")
                .description
                .as_deref(),
            Some("Filter loyalty points from value")
        );
        assert_eq!(
            find(&parameters, "rangeFilters.ranges[createdAt].to")
                .description
                .as_deref(),
            Some("Filter created at to value")
        );
    }

    #[test]
    fn test_schemas_follow_kinds() {
        let parameters = describe::<CustomerFilter>();
        assert_eq!(
            find(&parameters, "filters.loyalty_points").schema.schema_type,
            SchemaType::Integer
        );
        assert_eq!(find(&parameters, "filters.balance").schema.schema_type, SchemaType::Number);
        assert_eq!(find(&parameters, "filters.vip").schema.schema_type, SchemaType::Boolean);
        assert_eq!(
            find(&parameters, "filters.tier").schema.enum_values,
            Some(vec!["GOLD".to_string(), "SILVER".to_string()])
        );
        assert_eq!(
            find(&parameters, "filters.createdAt").schema.format.as_deref(),
            Some("date-time")
        );
        assert_eq!(
            find(&parameters, "filters.tags").schema.description.as_deref(),
            Some(COLLECTION_DESCRIPTION)
        );
        assert_eq!(find(&parameters, "filters.branchId").schema, ParameterSchema::string());
    }

    #[test]
    fn test_serializes_as_openapi_parameter() {
        let parameters = describe::<CustomerFilter>();
        let json = serde_json::to_value(find(&parameters, "filters.createdAt")).unwrap();
        assert_eq!(
            json,
            json!({
                "name": "filters.createdAt",
                "in": "query",
                "description": "Exact filter for created at",
                "required": false,
                "schema": {"type": "string", "format": "date-time"}
            })
        );
    }

    #[test]
    fn test_customize_preserves_non_query_parameters() {
        let path = ParameterDescriptor {
            name: "tenant".to_string(),
            location: ParameterLocation::Path,
            description: None,
            required: true,
            schema: ParameterSchema::string(),
        };
        let stale = ParameterDescriptor::query("q", "free text", ParameterSchema::string());

        let merged = customize(
            vec![stale.clone(), path.clone()],
            Some(CustomerFilter::type_descriptor()),
        );
        assert_eq!(merged[0], path);
        assert!(merged.iter().all(|p| p.name != "q"));
        assert_eq!(merged.len(), 1 + describe::<CustomerFilter>().len());

        let untouched = customize(vec![stale.clone(), path.clone()], None);
        assert_eq!(untouched, vec![stale, path]);
    }

    #[test]
    fn test_to_words() {
        assert_eq!(to_words("firstName"), "first name");
        assert_eq!(to_words("loyalty_points"), "loyalty points");
        assert_eq!(to_words("name"), "name");
        assert_eq!(to_words("createdAtUTC"), "created at u t c");
    }
}
