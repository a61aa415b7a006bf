//! # featurelod
//!
//! featurelod reads vector geodata (CSV with WKT geometries, and with the `gdal` feature every
//! format GDAL supports) and turns it into a flat stream of single-geometry features in WGS84.
//! For every dataset it estimates the level of detail: the coarsest zoom level at which the data
//! covers enough pixels to be worth drawing.
//!
//! ## Crates
//! - [`core`]: envelopes, Web-Mercator tile math and the configuration
//! - [`geometry`]: the geometry model and its WKT, WKB and SpatiaLite codecs
//! - [`ingest`]: providers, policies, the registry, the level of detail estimator and the
//!   traversal
//!
//! ## Usage Example
//!
//! ```rust
//! use featurelod::{core::Config, ingest::*};
//!
//! fn main() -> anyhow::Result<()> {
//! 	let layer = MemoryLayer::new("lakes", vec![]).with_features([
//! 		NativeFeature::new(1).with_wkt("POLYGON ((13 52, 14 52, 14 53, 13 52))"),
//! 		NativeFeature::new(2).with_wkt("POLYGON ((10 50, 11 50, 11 51, 10 50))"),
//! 	]);
//! 	let dataset = MemoryDataset::new("Memory", vec![layer]).boxed();
//! 	let mut content = Content::from_dataset("lakes", dataset, &Registry::default(), &Config::default())?;
//!
//! 	assert!(content.move_to_next_feature_set()?);
//! 	while content.move_to_next_feature()? {
//! 		println!("{} at level {}", content.get()?.name(), content.level_of_detail().level);
//! 	}
//! 	Ok(())
//! }
//! ```

pub use featurelod_core as core;
pub use featurelod_geometry as geometry;
pub use featurelod_ingest as ingest;
