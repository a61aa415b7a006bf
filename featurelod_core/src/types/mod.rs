//! Plain value types used across the ingestion engine.

mod envelope;
pub mod mapnik;

pub use envelope::*;
