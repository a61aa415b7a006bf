use crate::provider::{Layer, NativeFeature};
use featurelod_geometry::Geometry;
use std::fmt::Debug;

pub const DEFAULT_POINT_STYLE: &str = "SYMBOL(c:#FFFFFFFF,s:32px)";
pub const DEFAULT_LINE_STYLE: &str = "PEN(c:#FFFFFFFF,w:2px)";
pub const DEFAULT_POLYGON_STYLE: &str = "PEN(c:#FFFFFFFF,w:2px);BRUSH(fc:#FFFFFF40)";

/// Encoding of the raw geometry bytes handed to callers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FeatureEncoding {
	Wkt,
	#[default]
	Wkb,
	/// SpatiaLite blob
	Blob,
	/// Only the decoded geometry, no raw bytes.
	Geometry,
}

impl FeatureEncoding {
	pub fn parse_str(value: &str) -> Option<Self> {
		match value.to_ascii_lowercase().as_str() {
			"wkt" => Some(FeatureEncoding::Wkt),
			"wkb" => Some(FeatureEncoding::Wkb),
			"blob" | "spatialite" => Some(FeatureEncoding::Blob),
			"geometry" => Some(FeatureEncoding::Geometry),
			_ => None,
		}
	}
}

/// Format specific rules for skipping, styling and naming.
pub trait DriverPolicy: Debug {
	/// Name of the format driver this policy belongs to.
	fn driver_name(&self) -> &str;

	fn feature_encoding(&self) -> FeatureEncoding {
		FeatureEncoding::Wkb
	}

	/// Style of one leaf geometry of `feature`. The native style wins over the per-geometry default.
	fn style(&self, path: &str, feature: &NativeFeature, geometry: &Geometry) -> Option<String> {
		let _ = path;
		feature.style.clone().or_else(|| default_style(geometry).map(str::to_string))
	}

	fn skip_feature(&self, feature: &NativeFeature) -> bool {
		let _ = feature;
		false
	}

	fn skip_layer(&self, layer: &dyn Layer) -> bool {
		let _ = layer;
		false
	}

	/// Layer names are complete paths, so they name the feature set on their own.
	fn layer_name_is_path(&self) -> bool {
		false
	}

	fn parse_version(&self) -> u32 {
		1
	}
}

/// The per-geometry fallback style in OGR style syntax.
pub fn default_style(geometry: &Geometry) -> Option<&'static str> {
	match geometry {
		Geometry::Point(_) => Some(DEFAULT_POINT_STYLE),
		Geometry::LineString(_) => Some(DEFAULT_LINE_STYLE),
		Geometry::Polygon(_) => Some(DEFAULT_POLYGON_STYLE),
		Geometry::Collection(_) => None,
	}
}

#[derive(Clone, Debug)]
pub struct DefaultDriverPolicy {
	name: String,
}

impl DefaultDriverPolicy {
	pub fn new(driver_name: &str) -> Self {
		Self {
			name: driver_name.to_string(),
		}
	}
}

impl DriverPolicy for DefaultDriverPolicy {
	fn driver_name(&self) -> &str {
		&self.name
	}
}

/// KML and LIBKML: layers are folders whose names are already paths.
#[derive(Clone, Debug)]
pub struct KmlDriverPolicy {
	name: String,
}

impl KmlDriverPolicy {
	pub fn new(driver_name: &str) -> Self {
		Self {
			name: driver_name.to_string(),
		}
	}
}

impl DriverPolicy for KmlDriverPolicy {
	fn driver_name(&self) -> &str {
		&self.name
	}

	fn layer_name_is_path(&self) -> bool {
		true
	}
}

/// GPX: the point layers duplicate the vertices of tracks and routes.
#[derive(Clone, Debug, Default)]
pub struct GpxDriverPolicy;

impl GpxDriverPolicy {
	const SKIPPED_LAYERS: [&str; 2] = ["track_points", "route_points"];
}

impl DriverPolicy for GpxDriverPolicy {
	fn driver_name(&self) -> &str {
		"GPX"
	}

	fn skip_layer(&self, layer: &dyn Layer) -> bool {
		Self::SKIPPED_LAYERS.iter().any(|name| *name == layer.name())
	}
}
