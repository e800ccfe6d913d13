//! Declaration macros for filter specs, records and enumerations

pub mod macros;
