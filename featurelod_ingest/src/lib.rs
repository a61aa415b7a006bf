//! featurelod ingest: turn vector datasets into a flat stream of WGS84 features with a level of
//! detail.
//!
//! The crate is built from exchangeable parts:
//! - providers open datasets and hand out native features layer by layer,
//! - driver and schema policies add format specific skipping, styling and naming rules,
//! - a [`Registry`] maps file extensions and driver names to those parts,
//! - [`Content`] drives the traversal and flattens multi-geometries into single features,
//! - [`lod`] estimates the zoom level from which a dataset is worth drawing.
//!
//! # Quick start
//! ```rust,no_run
//! use featurelod_core::Config;
//! use featurelod_ingest::{Content, Registry};
//!
//! fn main() -> anyhow::Result<()> {
//! 	let registry = Registry::default();
//! 	let mut content = Content::open("cities.csv", &registry, &Config::default())?;
//! 	println!("level of detail: {}", content.level_of_detail().level);
//! 	while content.move_to_next_feature_set()? {
//! 		while content.move_to_next_feature()? {
//! 			let feature = content.get()?;
//! 			println!("{}: {:?}", feature.name(), feature.geometry());
//! 		}
//! 	}
//! 	Ok(())
//! }
//! ```
//!
//! # Features
//! - `gdal`: opens every vector format GDAL supports and uses GDAL for coordinate transforms.

pub mod attributes;
pub mod content;
pub mod crs;
mod error;
pub mod lod;
pub mod policy;
pub mod provider;
pub mod registry;

pub use attributes::{AttributeSet, AttributeValue, extract_attributes};
pub use content::{AltitudeMode, Content, FeatureDefinition, StyleEncoding};
pub use crs::{BuiltinTransforms, CoordinateNormalizer, CoordinateTransform, TransformFactory};
#[cfg(feature = "gdal")]
pub use crs::GdalTransforms;
pub use error::IngestError;
pub use lod::{DatasetStatistics, LayerStatistics, LevelOfDetail};
pub use policy::*;
pub use provider::*;
pub use registry::Registry;
