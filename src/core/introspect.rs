//! Declared field metadata for filter and record types
//!
//! Types register their fields once through [`impl_filter_spec!`] or
//! [`impl_record!`]; the resulting [`TypeDescriptor`] replaces runtime
//! reflection. Everything downstream (classifier, compiler, documentation)
//! reads these descriptors.
//!
//! [`impl_filter_spec!`]: crate::impl_filter_spec
//! [`impl_record!`]: crate::impl_record

use crate::core::field::{FieldValue, FilterField, Sentinel, ValueKind};
use std::any::TypeId;

/// Markers attached to a declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMarker {
    /// The field is the entity's primary identifier
    PrimaryId,
    /// The identifier field is opted back into exact-match filtering
    FilterableId,
    /// The field is never filtered or documented
    Transient,
}

/// One declared field of a type
#[derive(Debug, Clone)]
pub struct FieldDeclaration {
    pub name: &'static str,
    pub kind: ValueKind,
    pub markers: &'static [FieldMarker],
}

impl FieldDeclaration {
    pub fn new(name: &'static str, kind: ValueKind, markers: &'static [FieldMarker]) -> Self {
        Self {
            name,
            kind,
            markers,
        }
    }

    pub fn has_marker(&self, marker: FieldMarker) -> bool {
        self.markers.contains(&marker)
    }
}

/// Registered metadata of a filter or record type
#[derive(Debug)]
pub struct TypeDescriptor {
    pub type_id: TypeId,
    pub type_name: &'static str,
    /// Fields declared directly on the type, in declaration order
    pub fields: Vec<FieldDeclaration>,
    /// The type this one extends, if any
    pub parent: Option<fn() -> &'static TypeDescriptor>,
}

impl TypeDescriptor {
    pub fn new<T: 'static>(
        fields: Vec<FieldDeclaration>,
        parent: Option<fn() -> &'static TypeDescriptor>,
    ) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            fields,
            parent,
        }
    }

    /// Ancestors of this type, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = &'static TypeDescriptor> {
        std::iter::successors(self.parent.map(|parent| parent()), |current| {
            current.parent.map(|parent| parent())
        })
    }
}

/// Types whose fields are known through a registered descriptor
pub trait Introspect: 'static {
    fn type_descriptor() -> &'static TypeDescriptor;
}

/// A filter value object
///
/// Each declared field is a [`FilterField`]; the compiler reads them by
/// name through [`FilterSpec::field_slot`].
pub trait FilterSpec: Introspect + Send + Sync {
    /// Current state of a field, `None` if the name cannot be read
    fn field_slot(&self, field: &str) -> Option<FilterField<FieldValue>>;

    /// Put a null / not-null sentinel on a field; `false` if unknown
    fn set_sentinel(&mut self, field: &str, sentinel: Sentinel) -> bool;

    /// Assign a field from a raw query-string value; `Ok(false)` if unknown
    fn set_param(&mut self, field: &str, raw: &str) -> Result<bool, String>;

    /// Request `field IS NULL`, replacing any value on the field
    fn set_null_filter(&mut self, field: &str) -> bool {
        self.set_sentinel(field, Sentinel::Null)
    }

    /// Request `field IS NOT NULL`, replacing any value on the field
    fn set_not_null_filter(&mut self, field: &str) -> bool {
        self.set_sentinel(field, Sentinel::NotNull)
    }
}

/// A stored entity the execution engines can evaluate criteria against
pub trait Record: Introspect + Send + Sync {
    /// Table (or collection) the entity lives in
    fn table_name() -> &'static str;

    /// Get the value of a specific field by name
    fn field_value(&self, field: &str) -> Option<FieldValue>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    struct Root;
    struct Middle;
    struct Leaf;

    impl Introspect for Root {
        fn type_descriptor() -> &'static TypeDescriptor {
            static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
            DESCRIPTOR.get_or_init(|| {
                TypeDescriptor::new::<Root>(
                    vec![FieldDeclaration::new("created", ValueKind::Temporal, &[])],
                    None,
                )
            })
        }
    }

    impl Introspect for Middle {
        fn type_descriptor() -> &'static TypeDescriptor {
            static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
            DESCRIPTOR.get_or_init(|| {
                TypeDescriptor::new::<Middle>(
                    vec![FieldDeclaration::new(
                        "id",
                        ValueKind::Other,
                        &[FieldMarker::PrimaryId],
                    )],
                    Some(Root::type_descriptor),
                )
            })
        }
    }

    impl Introspect for Leaf {
        fn type_descriptor() -> &'static TypeDescriptor {
            static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
            DESCRIPTOR.get_or_init(|| {
                TypeDescriptor::new::<Leaf>(
                    vec![FieldDeclaration::new("name", ValueKind::String, &[])],
                    Some(Middle::type_descriptor),
                )
            })
        }
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let names: Vec<_> = Leaf::type_descriptor()
            .ancestors()
            .map(|d| d.fields[0].name)
            .collect();
        assert_eq!(names, vec!["id", "created"]);
    }

    #[test]
    fn test_descriptor_records_type_identity() {
        let descriptor = Leaf::type_descriptor();
        assert_eq!(descriptor.type_id, TypeId::of::<Leaf>());
        assert!(descriptor.type_name.ends_with("Leaf"));
        assert!(Middle::type_descriptor().fields[0].has_marker(FieldMarker::PrimaryId));
    }
}
