//! Macros for declaring filter and record types
//!
//! These macros generate the struct together with its registered
//! [`TypeDescriptor`](crate::core::introspect::TypeDescriptor) and the
//! by-name field accessors the compiler and engines rely on.
//!
//! Field markers are written as bare attributes in front of a field:
//! `#[primary_id]`, `#[filterable_id]` and `#[transient]`.

/// Declare a filter value object
///
/// Every field becomes a [`FilterField`](crate::core::field::FilterField)
/// so it can be left unset, hold a value, or carry a null / not-null
/// sentinel. A filter may extend another filter type; the parent's fields
/// are then visible when inherited fields are requested.
///
/// # Example
///
/// ```rust,ignore
/// use sieve::prelude::*;
///
/// impl_filter_spec!(AuditFilter, {
///     created_at: DateTime<Utc>,
/// });
///
/// impl_filter_spec!(AccountFilter extends AuditFilter as audit, {
///     #[primary_id]
///     id: Uuid,
///     #[filterable_id]
///     branch_id: Uuid,
///     name: String,
///     balance: f64,
///     tags: Vec<String>,
/// });
///
/// let mut filter = AccountFilter::default();
/// filter.name.set("acme".to_string());
/// filter.set_null_filter("balance");
/// ```
#[macro_export]
macro_rules! impl_filter_spec {
    (
        $type:ident $( extends $parent:ty as $parent_field:ident )?,
        {
            $( $( #[$marker:ident] )* $field:ident : $field_type:ty ),* $(,)?
        }
    ) => {
        #[derive(Debug, Clone, Default, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(default)]
        pub struct $type {
            $(
                #[serde(flatten)]
                pub $parent_field: $parent,
            )?
            $( pub $field: $crate::core::field::FilterField<$field_type>, )*
        }

        impl $crate::core::introspect::Introspect for $type {
            fn type_descriptor() -> &'static $crate::core::introspect::TypeDescriptor {
                static DESCRIPTOR: ::std::sync::OnceLock<$crate::core::introspect::TypeDescriptor> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    $crate::core::introspect::TypeDescriptor::new::<$type>(
                        vec![
                            $(
                                $crate::core::introspect::FieldDeclaration::new(
                                    stringify!($field),
                                    <$field_type as $crate::core::field::FieldType>::kind(),
                                    &[ $( $crate::__field_marker!($marker) ),* ],
                                ),
                            )*
                        ],
                        $crate::__parent_descriptor!($( $parent )?),
                    )
                })
            }
        }

        impl $crate::core::introspect::FilterSpec for $type {
            fn field_slot(
                &self,
                field: &str,
            ) -> Option<$crate::core::field::FilterField<$crate::core::field::FieldValue>> {
                $(
                    if field == stringify!($field) {
                        return Some(self.$field.to_slot());
                    }
                )*
                $crate::__delegate_to_parent!(
                    None
                    $(, $crate::core::introspect::FilterSpec::field_slot(&self.$parent_field, field))?
                )
            }

            fn set_sentinel(
                &mut self,
                field: &str,
                sentinel: $crate::core::field::Sentinel,
            ) -> bool {
                $(
                    if field == stringify!($field) {
                        self.$field.mark(sentinel);
                        return true;
                    }
                )*
                $crate::__delegate_to_parent!(
                    false
                    $(, $crate::core::introspect::FilterSpec::set_sentinel(
                        &mut self.$parent_field,
                        field,
                        sentinel,
                    ))?
                )
            }

            fn set_param(&mut self, field: &str, raw: &str) -> Result<bool, String> {
                $(
                    if field == stringify!($field) {
                        let value =
                            <$field_type as $crate::core::field::FieldType>::parse_param(raw)?;
                        self.$field.set(value);
                        return Ok(true);
                    }
                )*
                $crate::__delegate_to_parent!(
                    Ok(false)
                    $(, $crate::core::introspect::FilterSpec::set_param(
                        &mut self.$parent_field,
                        field,
                        raw,
                    ))?
                )
            }
        }
    };
}

/// Declare a stored entity
///
/// # Example
///
/// ```rust,ignore
/// impl_record!(Account, "accounts", {
///     #[primary_id]
///     id: Uuid,
///     name: Option<String>,
///     balance: f64,
///     status: AccountStatus,
/// });
/// ```
#[macro_export]
macro_rules! impl_record {
    (
        $type:ident,
        $table:expr
        $(, extends $parent:ty as $parent_field:ident )?,
        {
            $( $( #[$marker:ident] )* $field:ident : $field_type:ty ),* $(,)?
        }
    ) => {
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $type {
            $(
                #[serde(flatten)]
                pub $parent_field: $parent,
            )?
            $( pub $field: $field_type, )*
        }

        impl $crate::core::introspect::Introspect for $type {
            fn type_descriptor() -> &'static $crate::core::introspect::TypeDescriptor {
                static DESCRIPTOR: ::std::sync::OnceLock<$crate::core::introspect::TypeDescriptor> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    $crate::core::introspect::TypeDescriptor::new::<$type>(
                        vec![
                            $(
                                $crate::core::introspect::FieldDeclaration::new(
                                    stringify!($field),
                                    <$field_type as $crate::core::field::FieldType>::kind(),
                                    &[ $( $crate::__field_marker!($marker) ),* ],
                                ),
                            )*
                        ],
                        $crate::__parent_descriptor!($( $parent )?),
                    )
                })
            }
        }

        impl $crate::core::introspect::Record for $type {
            fn table_name() -> &'static str {
                $table
            }

            fn field_value(&self, field: &str) -> Option<$crate::core::field::FieldValue> {
                $(
                    if field == stringify!($field) {
                        return Some($crate::core::field::FieldType::to_field_value(&self.$field));
                    }
                )*
                $crate::__delegate_to_parent!(
                    None
                    $(, $crate::core::introspect::Record::field_value(&self.$parent_field, field))?
                )
            }
        }
    };
}

/// Declare an enumeration usable as a filter or record field
///
/// Each variant is matched and rendered by its symbolic name, which defaults
/// to the variant identifier and can be overridden with `=> "NAME"`.
///
/// # Example
///
/// ```rust,ignore
/// impl_field_enum!(AccountStatus {
///     Active => "ACTIVE",
///     Closed => "CLOSED",
/// });
/// ```
#[macro_export]
macro_rules! impl_field_enum {
    (
        $type:ident {
            $( $variant:ident $( => $name:literal )? ),+ $(,)?
        }
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $type {
            $( $variant, )+
        }

        impl $type {
            pub const VARIANTS: &'static [&'static str] =
                &[ $( $crate::__variant_name!($variant $(, $name)?) ),+ ];

            /// Symbolic name used when matching and rendering
            pub fn name(&self) -> &'static str {
                match self {
                    $( $type::$variant => $crate::__variant_name!($variant $(, $name)?), )+
                }
            }
        }

        impl ::std::str::FromStr for $type {
            type Err = String;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                $(
                    if raw == $crate::__variant_name!($variant $(, $name)?) {
                        return Ok($type::$variant);
                    }
                )+
                Err(format!(
                    "'{}' is not one of {:?}",
                    raw,
                    $type::VARIANTS
                ))
            }
        }

        impl ::serde::Serialize for $type {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.name())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $type {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                raw.parse().map_err(<D::Error as ::serde::de::Error>::custom)
            }
        }

        impl $crate::core::field::FieldType for $type {
            fn kind() -> $crate::core::field::ValueKind {
                $crate::core::field::ValueKind::Enum {
                    variants: $type::VARIANTS,
                }
            }

            fn to_field_value(&self) -> $crate::core::field::FieldValue {
                $crate::core::field::FieldValue::Enum(self.name().to_string())
            }

            fn parse_param(raw: &str) -> Result<Self, String> {
                raw.trim().parse()
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field_marker {
    (primary_id) => {
        $crate::core::introspect::FieldMarker::PrimaryId
    };
    (filterable_id) => {
        $crate::core::introspect::FieldMarker::FilterableId
    };
    (transient) => {
        $crate::core::introspect::FieldMarker::Transient
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __parent_descriptor {
    () => {
        None
    };
    ($parent:ty) => {
        Some(
            <$parent as $crate::core::introspect::Introspect>::type_descriptor
                as fn() -> &'static $crate::core::introspect::TypeDescriptor,
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __delegate_to_parent {
    ($default:expr) => {
        $default
    };
    ($default:expr, $delegate:expr) => {
        $delegate
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __variant_name {
    ($variant:ident) => {
        stringify!($variant)
    };
    ($variant:ident, $name:literal) => {
        $name
    };
}
