//! Field classification shared by the criteria compiler and the
//! documentation generator
//!
//! Classification is computed once per `(type, include_inherited_fields)`
//! pair and cached for the lifetime of the process.

use crate::core::field::ValueKind;
use crate::core::introspect::{FieldDeclaration, FieldMarker, Introspect, TypeDescriptor};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Field names reserved for serialization version markers
const VERSION_MARKER_FIELDS: &[&str] = &["serialVersionUID", "serial_version_uid"];

/// Classified view of one visible field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub value_kind: ValueKind,
    pub is_primary_identifier: bool,
    pub is_filterable_identifier: bool,
    pub is_id_like_by_name: bool,
    pub is_rangeable: bool,
}

impl FieldDescriptor {
    /// Classify a single declaration
    pub fn from_declaration(declaration: &FieldDeclaration) -> Self {
        let name = declaration.name;
        let is_filterable_identifier = declaration.has_marker(FieldMarker::FilterableId);
        let is_primary_identifier = declaration.has_marker(FieldMarker::PrimaryId)
            || name == "id"
            || (has_id_suffix(name) && !is_filterable_identifier);

        Self {
            name,
            value_kind: declaration.kind,
            is_primary_identifier,
            is_filterable_identifier,
            is_id_like_by_name: is_id_like(name),
            is_rangeable: declaration.kind.is_rangeable(),
        }
    }

    /// Identifier by declaration or by naming convention
    ///
    /// Identifiers are filter-inert unless opted in, only ever matched
    /// exactly, and never receive range predicates.
    pub fn is_identifier(&self) -> bool {
        self.is_primary_identifier || self.is_id_like_by_name
    }

    /// Whether range predicates may be emitted or documented for the field
    pub fn accepts_range(&self) -> bool {
        self.is_rangeable && !self.is_id_like_by_name
    }
}

/// `true` for `id` and for names suffixed `Id` or `_id`
pub fn is_id_like(name: &str) -> bool {
    name == "id" || has_id_suffix(name)
}

fn has_id_suffix(name: &str) -> bool {
    (name.ends_with("Id") && name.len() > 2) || (name.ends_with("_id") && name.len() > 3)
}

fn is_excluded(declaration: &FieldDeclaration) -> bool {
    declaration.has_marker(FieldMarker::Transient)
        || VERSION_MARKER_FIELDS.contains(&declaration.name)
}

type CacheKey = (TypeId, bool);

fn cache() -> &'static RwLock<HashMap<CacheKey, Arc<[FieldDescriptor]>>> {
    static CACHE: OnceLock<RwLock<HashMap<CacheKey, Arc<[FieldDescriptor]>>>> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Classify the visible fields of `T`
pub fn classify<T: Introspect>(include_inherited_fields: bool) -> Arc<[FieldDescriptor]> {
    classify_descriptor(T::type_descriptor(), include_inherited_fields)
}

/// Classify the visible fields of a registered type descriptor
///
/// Without inherited fields only the type's own declarations are visible;
/// with them, each ancestor's declarations follow, nearest ancestor first.
pub fn classify_descriptor(
    descriptor: &'static TypeDescriptor,
    include_inherited_fields: bool,
) -> Arc<[FieldDescriptor]> {
    let key = (descriptor.type_id, include_inherited_fields);

    if let Some(fields) = cache()
        .read()
        .ok()
        .and_then(|cached| cached.get(&key).cloned())
    {
        return fields;
    }

    let computed = compute(descriptor, include_inherited_fields);

    match cache().write() {
        Ok(mut cached) => Arc::clone(cached.entry(key).or_insert(computed)),
        Err(e) => {
            tracing::warn!(
                type_name = descriptor.type_name,
                "Field classifier cache unavailable: {}",
                e
            );
            computed
        }
    }
}

fn compute(descriptor: &'static TypeDescriptor, include_inherited_fields: bool) -> Arc<[FieldDescriptor]> {
    let mut declarations: Vec<&FieldDeclaration> = descriptor.fields.iter().collect();
    if include_inherited_fields {
        for ancestor in descriptor.ancestors() {
            declarations.extend(ancestor.fields.iter());
        }
    }

    let fields: Vec<FieldDescriptor> = declarations
        .into_iter()
        .filter(|declaration| !is_excluded(declaration))
        .map(FieldDescriptor::from_declaration)
        .collect();

    tracing::debug!(
        type_name = descriptor.type_name,
        include_inherited_fields,
        field_count = fields.len(),
        "Classified filter fields"
    );

    fields.into()
}

/// Look up a field by name among the visible fields of `T`
pub fn find_field<T: Introspect>(name: &str, include_inherited_fields: bool) -> Option<FieldDescriptor> {
    classify::<T>(include_inherited_fields)
        .iter()
        .find(|field| field.name == name)
        .cloned()
}
