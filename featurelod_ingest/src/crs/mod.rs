//! Normalization of layer coordinates to WGS84 (EPSG:4326).
//!
//! A [`TransformFactory`] turns the spatial reference of a layer into a [`CoordinateTransform`].
//! [`CoordinateNormalizer`] resolves that transform once per layer and applies it to geometries
//! and envelopes. Envelopes are always mapped through all four corners.

mod builtin;
#[cfg(feature = "gdal")]
mod gdal;

pub use builtin::BuiltinTransforms;
#[cfg(feature = "gdal")]
pub use gdal::GdalTransforms;

use crate::provider::SpatialRef;
use anyhow::Result;
use featurelod_core::Envelope;
use featurelod_geometry::Geometry;
use std::fmt::Debug;

/// Maps a horizontal position from a source reference system to WGS84 longitude/latitude.
pub trait CoordinateTransform: Debug {
	fn transform(&self, x: f64, y: f64) -> Result<[f64; 2]>;
}

pub trait TransformFactory: Debug {
	/// Creates the transform from `spatial_ref` to WGS84, or `None` if the reference system is not
	/// supported.
	fn create(&self, spatial_ref: &SpatialRef) -> Result<Option<Box<dyn CoordinateTransform>>>;
}

/// Resolves the transform of a layer.
///
/// Returns `None` for WGS84 and for unknown or missing reference systems. An unsupported reference
/// system is logged and also leaves coordinates untouched.
pub fn resolve(spatial_ref: Option<&SpatialRef>, factory: &dyn TransformFactory) -> Option<Box<dyn CoordinateTransform>> {
	let spatial_ref = spatial_ref?;
	if spatial_ref.is_wgs84() || spatial_ref.is_unknown() {
		return None;
	}
	match factory.create(spatial_ref) {
		Ok(Some(transform)) => Some(transform),
		Ok(None) => {
			log::warn!("unsupported spatial reference {spatial_ref:?}, coordinates are used as they are");
			None
		}
		Err(e) => {
			log::warn!("failed to create a transform for {spatial_ref:?}: {e:#}");
			None
		}
	}
}

/// The transform of the current layer.
#[derive(Debug, Default)]
pub struct CoordinateNormalizer {
	transform: Option<Box<dyn CoordinateTransform>>,
}

impl CoordinateNormalizer {
	pub fn new(spatial_ref: Option<&SpatialRef>, factory: &dyn TransformFactory) -> Self {
		Self {
			transform: resolve(spatial_ref, factory),
		}
	}

	pub fn is_identity(&self) -> bool {
		self.transform.is_none()
	}

	/// Transforms all vertices in place. Nothing is touched for WGS84 layers.
	pub fn transform_geometry(&self, geometry: &mut Geometry) -> Result<()> {
		let Some(transform) = &self.transform else {
			return Ok(());
		};
		geometry.for_each_coordinate_mut(|c| {
			let [x, y] = transform.transform(c.x(), c.y())?;
			c.set_xy(x, y);
			Ok(())
		})
	}

	/// Bounding rectangle of the four transformed corners of `envelope`.
	pub fn transform_envelope(&self, envelope: &Envelope) -> Result<Envelope> {
		match &self.transform {
			Some(transform) => envelope.transform_corners(|x, y| transform.transform(x, y)),
			None => Ok(*envelope),
		}
	}
}
