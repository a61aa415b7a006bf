use super::{BuiltinTransforms, CoordinateTransform, TransformFactory};
use crate::provider::SpatialRef;
use anyhow::{Result, anyhow};
use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef as GdalSpatialRef};
use std::fmt;

/// Transforms for every reference system GDAL knows. Falls back to [`BuiltinTransforms`] if GDAL
/// can not build one.
#[derive(Clone, Copy, Debug, Default)]
pub struct GdalTransforms;

impl TransformFactory for GdalTransforms {
	fn create(&self, spatial_ref: &SpatialRef) -> Result<Option<Box<dyn CoordinateTransform>>> {
		match gdal_transform(spatial_ref) {
			Ok(Some(transform)) => Ok(Some(Box::new(transform))),
			Ok(None) => BuiltinTransforms.create(spatial_ref),
			Err(e) => {
				log::debug!("GDAL can not transform {spatial_ref:?}: {e:#}");
				BuiltinTransforms.create(spatial_ref)
			}
		}
	}
}

fn get_spatial_ref(spatial_ref: &SpatialRef) -> Result<Option<GdalSpatialRef>> {
	let srs = if let Some(definition) = &spatial_ref.definition {
		GdalSpatialRef::from_definition(definition)
	} else if let Some(code) = spatial_ref.epsg() {
		GdalSpatialRef::from_epsg(u32::try_from(code)?)
	} else {
		return Ok(None);
	};
	let mut srs = srs.map_err(|e| anyhow!("Failed to get spatial reference: {e}"))?;
	srs.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
	Ok(Some(srs))
}

fn gdal_transform(spatial_ref: &SpatialRef) -> Result<Option<GdalCoordinateTransform>> {
	let Some(source) = get_spatial_ref(spatial_ref)? else {
		return Ok(None);
	};
	let mut target = GdalSpatialRef::from_epsg(4326).map_err(|e| anyhow!("Failed to get spatial reference: {e}"))?;
	target.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
	Ok(Some(GdalCoordinateTransform {
		transform: CoordTransform::new(&source, &target)?,
	}))
}

struct GdalCoordinateTransform {
	transform: CoordTransform,
}

impl fmt::Debug for GdalCoordinateTransform {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("GdalCoordinateTransform").finish_non_exhaustive()
	}
}

impl CoordinateTransform for GdalCoordinateTransform {
	fn transform(&self, x: f64, y: f64) -> Result<[f64; 2]> {
		let mut xs = [x];
		let mut ys = [y];
		let mut zs = [0.0];
		self.transform.transform_coords(&mut xs, &mut ys, &mut zs)?;
		Ok([xs[0], ys[0]])
	}
}
