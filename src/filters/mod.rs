//! Filter classification, compilation and execution

pub mod classifier;
pub mod compiler;
pub mod criteria;
pub mod generic;
pub mod options;
pub mod range;
pub mod request;

pub use classifier::{FieldDescriptor, classify, classify_descriptor, find_field, is_id_like};
pub use compiler::{compile, compile_filters, compile_ranges};
pub use criteria::{Criteria, CriteriaMatcher, Criterion};
pub use generic::{FilterFactory, GenericFilter};
pub use options::{FilterOptions, OptionOverrides};
pub use range::{Range, RangeFilter};
pub use request::FilterRequest;
