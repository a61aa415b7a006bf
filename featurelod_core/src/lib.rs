//! Shared building blocks of the featurelod crates: envelopes, Web-Mercator tile math and the
//! engine configuration.

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
