//! Execution engines for different backends

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod sql;

pub use in_memory::InMemoryEngine;
#[cfg(feature = "postgres")]
pub use postgres::PostgresEngine;
pub use sql::{SqlDialect, SqlFragment, render_page, render_where};
