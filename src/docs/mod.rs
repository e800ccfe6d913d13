//! Documentation parameters for filterable listings
//!
//! Generates the query parameters a listing endpoint accepts, from the same
//! field classification the criteria compiler uses, so the documented
//! surface never drifts from what is actually filtered.

pub mod parameters;

pub use parameters::{
    ParameterDescriptor, ParameterLocation, ParameterSchema, SchemaType, customize, describe,
    describe_type,
};
