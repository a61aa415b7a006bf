//! Pluggable format and schema rules consumed by the traversal.

mod driver;
mod schema;

pub use driver::*;
pub use schema::*;
