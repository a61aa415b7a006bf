use super::naming::feature_name;
use crate::{
	attributes::{AttributeSet, extract_attributes},
	policy::FeatureEncoding,
	provider::{FieldDefinition, FieldValue, NativeFeature},
};
use anyhow::Result;
use featurelod_geometry::Geometry;
use std::{cell::OnceCell, fmt, rc::Rc};

/// SRID written into SpatiaLite blobs. Emitted geometries are always WGS84.
const BLOB_SRID: i32 = 4326;

/// Encoding of [`FeatureDefinition::raw_style`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleEncoding {
	OgrStyle,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AltitudeMode {
	#[default]
	ClampToGround = 0,
	Relative = 1,
	Absolute = 2,
}

impl AltitudeMode {
	/// Parses KML altitude modes. Unknown values clamp to the ground.
	pub fn parse_str(value: &str) -> Self {
		let is = |name: &str| value.eq_ignore_ascii_case(name);
		if is("relativeToGround") || is("relativeToSeaFloor") {
			AltitudeMode::Relative
		} else if is("absolute") {
			AltitudeMode::Absolute
		} else {
			AltitudeMode::ClampToGround
		}
	}
}

/// Field layout and name candidates of the current layer.
#[derive(Debug)]
pub(crate) struct LayerSchema {
	pub name: String,
	pub fields: Vec<FieldDefinition>,
	pub name_fields: Vec<String>,
}

/// A native feature shared by all leaves it was split into.
#[derive(Debug)]
pub(crate) struct FeatureSource {
	pub feature: NativeFeature,
	pub schema: Rc<LayerSchema>,
	/// Number of non-empty leaves of the native geometry.
	pub leaf_count: usize,
}

impl FeatureSource {
	/// Values of fields whose name matches one of `names`, ignoring case.
	fn values_named<'a>(&'a self, names: &'a [&str]) -> impl Iterator<Item = &'a FieldValue> + 'a {
		self
			.schema
			.fields
			.iter()
			.enumerate()
			.filter(|(_, field)| names.iter().any(|name| field.name.eq_ignore_ascii_case(name)))
			.filter_map(|(index, _)| self.feature.value(index))
	}
}

/// One emitted feature: a single leaf geometry in WGS84 with the properties of its native feature.
pub struct FeatureDefinition {
	source: Rc<FeatureSource>,
	leaf_index: usize,
	geometry: Geometry,
	encoding: FeatureEncoding,
	raw_geometry: Option<Vec<u8>>,
	style: Option<String>,
	name: OnceCell<String>,
	attributes: OnceCell<AttributeSet>,
}

impl FeatureDefinition {
	/// Encodes `geometry` and drops style table references from `style`.
	pub(crate) fn new(
		source: Rc<FeatureSource>,
		leaf_index: usize,
		geometry: Geometry,
		encoding: FeatureEncoding,
		style: Option<String>,
	) -> Result<Self> {
		let raw_geometry = match encoding {
			FeatureEncoding::Wkt => Some(geometry.to_wkt().into_bytes()),
			FeatureEncoding::Wkb => Some(geometry.to_wkb()?),
			FeatureEncoding::Blob => Some(geometry.to_spatialite(BLOB_SRID)?),
			FeatureEncoding::Geometry => None,
		};
		Ok(Self {
			source,
			leaf_index,
			geometry,
			encoding,
			raw_geometry,
			style: style.filter(|style| !style.starts_with('@')),
			name: OnceCell::new(),
			attributes: OnceCell::new(),
		})
	}

	pub fn geometry_encoding(&self) -> FeatureEncoding {
		self.encoding
	}

	/// The geometry in [`Self::geometry_encoding`]; `None` for [`FeatureEncoding::Geometry`].
	pub fn raw_geometry(&self) -> Option<&[u8]> {
		self.raw_geometry.as_deref()
	}

	/// The decoded leaf geometry in WGS84.
	pub fn geometry(&self) -> &Geometry {
		&self.geometry
	}

	pub fn feature_id(&self) -> i64 {
		self.source.feature.fid
	}

	/// Resolved on first access.
	pub fn name(&self) -> &str {
		self.name.get_or_init(|| {
			let source = &self.source;
			let leaf_index = (source.leaf_count > 1).then_some(self.leaf_index);
			feature_name(
				&source.schema.name,
				&source.schema.name_fields,
				&source.schema.fields,
				&source.feature,
				leaf_index,
			)
		})
	}

	pub fn style_encoding(&self) -> StyleEncoding {
		StyleEncoding::OgrStyle
	}

	pub fn raw_style(&self) -> Option<&str> {
		self.style.as_deref()
	}

	pub fn attributes(&self) -> &AttributeSet {
		self
			.attributes
			.get_or_init(|| extract_attributes(&self.source.schema.fields, &self.source.feature))
	}

	/// From the `altitudeMode` or `gx:altitudeMode` field.
	pub fn altitude_mode(&self) -> AltitudeMode {
		self
			.source
			.values_named(&["altitudeMode", "gx:altitudeMode"])
			.last()
			.and_then(FieldValue::as_str)
			.map(AltitudeMode::parse_str)
			.unwrap_or_default()
	}

	/// `-1.0` if the `extrude` field is a nonzero integer, `0.0` otherwise.
	pub fn extrude(&self) -> f64 {
		match self.source.values_named(&["extrude"]).last().and_then(FieldValue::as_i64) {
			Some(value) if value != 0 => -1.0,
			_ => 0.0,
		}
	}

	/// Features are visible unless a `visibility` field says otherwise.
	pub fn visible(&self) -> bool {
		self
			.source
			.values_named(&["visibility"])
			.last()
			.is_none_or(|value| value.as_i64().unwrap_or(0) != 0)
	}
}

impl fmt::Debug for FeatureDefinition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FeatureDefinition")
			.field("name", &self.name())
			.field("geometry", &self.geometry)
			.field("style", &self.style)
			.finish()
	}
}
