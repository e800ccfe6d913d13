//! Criteria compiler
//!
//! Turns a filter value object and an optional range map into a
//! conjunctive [`Criteria`], using the shared field classifier to decide
//! which fields are filter-inert, exact-match only, text-matched or
//! rangeable.

use crate::core::field::{FieldValue, FilterField, ValueKind};
use crate::core::introspect::{FilterSpec, Introspect};
use crate::filters::classifier::{FieldDescriptor, classify};
use crate::filters::criteria::{Criteria, Criterion};
use crate::filters::options::FilterOptions;
use crate::filters::range::{Range, RangeFilter};

/// Compile a filter and range map into criteria
///
/// Regular filter leaves come first, in classifier order, followed by range
/// leaves ordered by field name. Range entries are resolved against the
/// entity type `E`. With neither input, the result matches everything.
pub fn compile<F, E>(
    filter: Option<&F>,
    ranges: Option<&RangeFilter>,
    options: &FilterOptions,
) -> Criteria
where
    F: FilterSpec,
    E: Introspect,
{
    let mut criteria = Vec::new();

    if let Some(filter) = filter {
        criteria.extend(compile_filters(filter, options));
    }

    if let Some(ranges) = ranges {
        criteria.extend(compile_ranges::<E>(ranges));
    }

    Criteria::from_criteria(criteria)
}

/// Compile the regular (non-range) filter fields
pub fn compile_filters<F: FilterSpec>(filter: &F, options: &FilterOptions) -> Vec<Criterion> {
    let fields = classify::<F>(options.include_inherited_fields);

    fields
        .iter()
        .filter_map(|field| match filter.field_slot(field.name) {
            Some(slot) => compile_field(field, slot, options),
            None => {
                tracing::error!(
                    field = field.name,
                    filter_type = F::type_descriptor().type_name,
                    "Error accessing filter field, skipping it"
                );
                None
            }
        })
        .collect()
}

fn compile_field(
    field: &FieldDescriptor,
    slot: FilterField<FieldValue>,
    options: &FilterOptions,
) -> Option<Criterion> {
    let name = field.name.to_string();

    let value = match slot {
        FilterField::IsNull => return Some(Criterion::IsNull { field: name }),
        FilterField::IsNotNull => return Some(Criterion::IsNotNull { field: name }),
        FilterField::Unset | FilterField::Value(FieldValue::Null) => return None,
        FilterField::Value(value) => value,
    };

    if field.is_identifier() {
        return field
            .is_filterable_identifier
            .then_some(Criterion::Equals { field: name, value });
    }

    match value {
        FieldValue::List(values) => {
            (!values.is_empty()).then_some(Criterion::In { field: name, values })
        }
        FieldValue::String(text) | FieldValue::Enum(text)
            if matches!(field.value_kind, ValueKind::Enum { .. }) =>
        {
            Some(Criterion::Equals {
                field: name,
                value: FieldValue::String(text),
            })
        }
        FieldValue::Enum(symbol) => Some(Criterion::Equals {
            field: name,
            value: FieldValue::String(symbol),
        }),
        FieldValue::String(text) if text.is_empty() => None,
        FieldValue::String(text) if field.value_kind == ValueKind::String => {
            Some(Criterion::Like {
                field: name,
                pattern: format!("%{}%", text),
                case_insensitive: options.case_insensitive_strings,
            })
        }
        value => Some(Criterion::Equals { field: name, value }),
    }
}

/// Compile range entries, skipping identifiers of the entity type
///
/// Names not declared on `E` are never treated as identifiers; their bounds
/// are used as given.
pub fn compile_ranges<E: Introspect>(ranges: &RangeFilter) -> Vec<Criterion> {
    let entity_fields = classify::<E>(true);

    ranges
        .ranges
        .iter()
        .filter_map(|(name, range)| {
            let descriptor = entity_fields.iter().find(|f| f.name == name.as_str());

            if descriptor.is_some_and(FieldDescriptor::is_identifier) {
                tracing::debug!(field = %name, "Skipping range filter for ID field");
                return None;
            }

            compile_range(name, range, descriptor.map(|d| d.value_kind))
        })
        .collect()
}

fn compile_range(name: &str, range: &Range, kind: Option<ValueKind>) -> Option<Criterion> {
    let bound = |value: &Option<FieldValue>| {
        value
            .as_ref()
            .filter(|v| !v.is_null())
            .map(|v| coerce_bound(kind, v.clone()))
    };
    let field = name.to_string();

    match (bound(&range.from), bound(&range.to)) {
        (Some(from), Some(to)) => Some(Criterion::Between { field, from, to }),
        (Some(value), None) => Some(Criterion::GreaterOrEqual { field, value }),
        (None, Some(value)) => Some(Criterion::LessOrEqual { field, value }),
        (None, None) => None,
    }
}

/// Bring textual bounds to the declared kind so they compare correctly
fn coerce_bound(kind: Option<ValueKind>, value: FieldValue) -> FieldValue {
    match (kind, &value) {
        (Some(kind), FieldValue::String(raw)) if kind.is_rangeable() => {
            FieldValue::parse_as(kind, raw).unwrap_or(value)
        }
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::{FieldType, Sentinel};
    use crate::core::introspect::{FieldDeclaration, FilterSpec, TypeDescriptor};
    use std::sync::OnceLock;
    use uuid::Uuid;

    crate::impl_field_enum!(Status {
        Active => "ACTIVE",
        Closed => "CLOSED",
    });

    crate::impl_filter_spec!(BaseFilter, {
        owner: String,
    });

    crate::impl_filter_spec!(ItemFilter extends BaseFilter as base, {
        #[primary_id]
        id: Uuid,
        #[filterable_id]
        category_id: Uuid,
        parent_id: Uuid,
        name: String,
        count: i32,
        active: bool,
        status: Status,
        tags: Vec<String>,
        sizes: [i32; 2],
    });

    crate::impl_record!(Item, "items", {
        #[primary_id]
        id: Uuid,
        category_id: Uuid,
        #[primary_id]
        code: String,
        count: i32,
        created: chrono::DateTime<chrono::Utc>,
    });

    fn compile_item(filter: &ItemFilter, options: FilterOptions) -> Criteria {
        compile::<ItemFilter, Item>(Some(filter), None, &options)
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let criteria = compile_item(&ItemFilter::default(), FilterOptions::defaults());
        assert!(criteria.is_empty());
        let criteria = compile::<ItemFilter, Item>(None, None, &FilterOptions::defaults());
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_string_becomes_substring_match() {
        let mut filter = ItemFilter::default();
        filter.name.set("test".into());
        let criteria = compile_item(&filter, FilterOptions::defaults());
        assert_eq!(criteria.to_string(), "name LIKE '%test%'");
    }

    #[test]
    fn test_empty_string_is_ignored() {
        let mut filter = ItemFilter::default();
        filter.name.set(String::new());
        assert!(compile_item(&filter, FilterOptions::defaults()).is_empty());
    }

    #[test]
    fn test_case_insensitive_option_is_carried() {
        let mut filter = ItemFilter::default();
        filter.name.set("TEST".into());
        let criteria = compile_item(&filter, FilterOptions::defaults().case_insensitive());
        assert_eq!(
            criteria.iter().next(),
            Some(&Criterion::Like {
                field: "name".into(),
                pattern: "%TEST%".into(),
                case_insensitive: true,
            })
        );
    }

    #[test]
    fn test_scalars_become_equals() {
        let mut filter = ItemFilter::default();
        filter.count.set(10);
        filter.active.set(true);
        let criteria = compile_item(&filter, FilterOptions::defaults());
        assert_eq!(criteria.to_string(), "count = 10 AND active = true");
    }

    #[test]
    fn test_enum_matches_by_name() {
        let mut filter = ItemFilter::default();
        filter.status.set(Status::Closed);
        let criteria = compile_item(&filter, FilterOptions::defaults());
        assert_eq!(
            criteria.iter().next(),
            Some(&Criterion::Equals {
                field: "status".into(),
                value: FieldValue::String("CLOSED".into()),
            })
        );
    }

    #[test]
    fn test_identifier_fields() {
        let mut filter = ItemFilter::default();
        filter.id.set(Uuid::new_v4());
        filter.parent_id.set(Uuid::new_v4());
        let category = Uuid::new_v4();
        filter.category_id.set(category);

        let criteria = compile_item(&filter, FilterOptions::defaults());
        assert_eq!(criteria.len(), 1);
        assert_eq!(
            criteria.iter().next(),
            Some(&Criterion::Equals {
                field: "category_id".into(),
                value: FieldValue::Uuid(category),
            })
        );
    }

    #[test]
    fn test_containers_become_membership() {
        let mut filter = ItemFilter::default();
        filter.tags.set(vec!["tag1".into(), "tag2".into()]);
        filter.sizes.set([1, 2]);
        let criteria = compile_item(&filter, FilterOptions::defaults());
        assert_eq!(criteria.to_string(), "tags IN ('tag1', 'tag2') AND sizes IN (1, 2)");
    }

    #[test]
    fn test_empty_container_is_ignored() {
        let mut filter = ItemFilter::default();
        filter.tags.set(Vec::new());
        assert!(compile_item(&filter, FilterOptions::defaults()).is_empty());
    }

    #[test]
    fn test_sentinels_override_values() {
        let mut filter = ItemFilter::default();
        filter.name.set("test".into());
        assert!(filter.set_null_filter("name"));
        filter.set_not_null_filter("id");

        let criteria = compile_item(&filter, FilterOptions::defaults());
        assert_eq!(criteria.to_string(), "id IS NOT NULL AND name IS NULL");
    }

    #[test]
    fn test_inherited_fields_follow_option() {
        let mut filter = ItemFilter::default();
        filter.base.owner.set("ada".into());

        assert!(compile_item(&filter, FilterOptions::defaults()).is_empty());
        let criteria = compile_item(&filter, FilterOptions::defaults().with_inherited_fields());
        assert_eq!(criteria.to_string(), "owner LIKE '%ada%'");
    }

    #[test]
    fn test_range_bounds() {
        let ranges = RangeFilter::new()
            .with("count", Range::between(5, 15))
            .with("price", Range::at_least(1.5))
            .with("weight", Range::at_most(3))
            .with("volume", Range::default());
        let criteria = compile::<ItemFilter, Item>(None, Some(&ranges), &FilterOptions::defaults());
        assert_eq!(
            criteria.to_string(),
            "count BETWEEN 5 AND 15 AND price >= 1.5 AND weight <= 3"
        );
    }

    #[test]
    fn test_range_skips_identifiers() {
        let ranges = RangeFilter::new()
            .with("id", Range::between(1, 2))
            .with("category_id", Range::at_least(1))
            .with("code", Range::at_least("A"));
        let criteria = compile::<ItemFilter, Item>(None, Some(&ranges), &FilterOptions::defaults());
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_undeclared_id_like_range_is_kept() {
        let ranges = RangeFilter::new()
            .with("externalId", Range::at_least(3))
            .with("otherId", Range::at_most(9));
        let criteria = compile::<ItemFilter, Item>(None, Some(&ranges), &FilterOptions::defaults());
        assert_eq!(criteria.to_string(), "externalId >= 3 AND otherId <= 9");
    }

    #[test]
    fn test_textual_temporal_bounds_are_typed() {
        let ranges = RangeFilter::new().with("created", Range::at_least("2024-01-01T00:00:00Z"));
        let criteria = compile::<ItemFilter, Item>(None, Some(&ranges), &FilterOptions::defaults());
        assert!(matches!(
            criteria.iter().next(),
            Some(Criterion::GreaterOrEqual {
                value: FieldValue::DateTime(_),
                ..
            })
        ));
    }

    #[test]
    fn test_filters_precede_ranges() {
        let mut filter = ItemFilter::default();
        filter.count.set(10);
        let ranges = RangeFilter::new().with("count", Range::between(5, 15));
        let criteria =
            compile::<ItemFilter, Item>(Some(&filter), Some(&ranges), &FilterOptions::defaults());
        assert_eq!(criteria.to_string(), "count = 10 AND count BETWEEN 5 AND 15");
    }

    /// Filter whose `broken` field cannot be read back
    struct PartialFilter {
        count: FilterField<i32>,
        broken: FilterField<String>,
    }

    impl Introspect for PartialFilter {
        fn type_descriptor() -> &'static TypeDescriptor {
            static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
            DESCRIPTOR.get_or_init(|| {
                TypeDescriptor::new::<PartialFilter>(
                    vec![
                        FieldDeclaration::new("broken", ValueKind::String, &[]),
                        FieldDeclaration::new("count", <i32 as FieldType>::kind(), &[]),
                    ],
                    None,
                )
            })
        }
    }

    impl FilterSpec for PartialFilter {
        fn field_slot(&self, field: &str) -> Option<FilterField<FieldValue>> {
            match field {
                "count" => Some(self.count.to_slot()),
                _ => None,
            }
        }

        fn set_sentinel(&mut self, field: &str, sentinel: Sentinel) -> bool {
            match field {
                "count" => self.count.mark(sentinel),
                "broken" => self.broken.mark(sentinel),
                _ => return false,
            }
            true
        }

        fn set_param(&mut self, _field: &str, _raw: &str) -> Result<bool, String> {
            Ok(false)
        }
    }

    #[test]
    fn test_unreadable_field_is_skipped() {
        let filter = PartialFilter {
            count: FilterField::Value(3),
            broken: FilterField::Value("ignored".to_string()),
        };
        let criteria = compile::<PartialFilter, Item>(Some(&filter), None, &FilterOptions::defaults());
        assert_eq!(criteria.to_string(), "count = 3");
    }
}
