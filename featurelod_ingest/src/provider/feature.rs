use crate::IngestError;
use anyhow::Result;
use featurelod_geometry::{Geometry, parse_spatialite, parse_wkb, parse_wkt};

/// Type of an attribute column as declared by the layer schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
	Date,
	Time,
	DateTime,
	String,
	Integer,
	Integer64,
	Real,
	Binary,
	StringList,
	IntegerList,
	Integer64List,
	RealList,
}

/// A single attribute value. Dates and times are carried as their text representation.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
	Date(String),
	Time(String),
	DateTime(String),
	String(String),
	Integer(i32),
	Integer64(i64),
	Real(f64),
	Binary(Vec<u8>),
	StringList(Vec<String>),
	IntegerList(Vec<i32>),
	Integer64List(Vec<i64>),
	RealList(Vec<f64>),
}

impl FieldValue {
	pub fn field_type(&self) -> FieldType {
		match self {
			FieldValue::Date(_) => FieldType::Date,
			FieldValue::Time(_) => FieldType::Time,
			FieldValue::DateTime(_) => FieldType::DateTime,
			FieldValue::String(_) => FieldType::String,
			FieldValue::Integer(_) => FieldType::Integer,
			FieldValue::Integer64(_) => FieldType::Integer64,
			FieldValue::Real(_) => FieldType::Real,
			FieldValue::Binary(_) => FieldType::Binary,
			FieldValue::StringList(_) => FieldType::StringList,
			FieldValue::IntegerList(_) => FieldType::IntegerList,
			FieldValue::Integer64List(_) => FieldType::Integer64List,
			FieldValue::RealList(_) => FieldType::RealList,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			FieldValue::String(s) => Some(s),
			_ => None,
		}
	}

	/// Integer interpretation of a scalar value. Reals are truncated and strings are parsed.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			FieldValue::Integer(v) => Some(i64::from(*v)),
			FieldValue::Integer64(v) => Some(*v),
			FieldValue::Real(v) if v.is_finite() => Some(v.trunc() as i64),
			FieldValue::String(s) => s.trim().parse().ok(),
			_ => None,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDefinition {
	pub name: String,
	pub field_type: FieldType,
}

impl FieldDefinition {
	pub fn new(name: &str, field_type: FieldType) -> Self {
		Self {
			name: name.to_string(),
			field_type,
		}
	}
}

/// Native coordinate reference system of a layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpatialRef {
	pub authority: Option<String>,
	pub code: Option<i32>,
	/// WKT or PROJ definition, if the provider knows one.
	pub definition: Option<String>,
}

impl SpatialRef {
	pub fn from_epsg(code: i32) -> Self {
		Self {
			authority: Some("EPSG".to_string()),
			code: Some(code),
			definition: None,
		}
	}

	/// The EPSG code, if the authority is EPSG.
	pub fn epsg(&self) -> Option<i32> {
		match &self.authority {
			Some(authority) if authority.eq_ignore_ascii_case("EPSG") => self.code,
			_ => None,
		}
	}

	pub fn is_wgs84(&self) -> bool {
		self.epsg() == Some(4326)
	}

	/// Nothing identifies the reference system.
	pub fn is_unknown(&self) -> bool {
		self.code.is_none() && self.definition.is_none()
	}
}

/// Geometry of a native feature in the encoding the provider delivers it.
#[derive(Clone, Debug, PartialEq)]
pub enum NativeGeometry {
	Decoded(Geometry),
	Wkt(String),
	Wkb(Vec<u8>),
	SpatiaLite(Vec<u8>),
	Unknown { format: String },
}

impl NativeGeometry {
	/// Decodes the geometry. Failures are reported as [`IngestError::MalformedGeometry`] or
	/// [`IngestError::UnsupportedGeometryEncoding`].
	pub fn decode(&self) -> Result<Geometry> {
		let malformed = |e: anyhow::Error| IngestError::MalformedGeometry {
			reason: format!("{e:#}"),
		};
		Ok(match self {
			NativeGeometry::Decoded(geometry) => geometry.clone(),
			NativeGeometry::Wkt(text) => parse_wkt(text).map_err(malformed)?,
			NativeGeometry::Wkb(bytes) => parse_wkb(bytes).map_err(malformed)?,
			NativeGeometry::SpatiaLite(bytes) => parse_spatialite(bytes).map_err(malformed)?.0,
			NativeGeometry::Unknown { format } => {
				return Err(IngestError::UnsupportedGeometryEncoding { format: format.clone() }.into());
			}
		})
	}
}

/// A feature as delivered by a layer. `values` is aligned with the layer's field definitions;
/// `None` marks an unset field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NativeFeature {
	pub fid: i64,
	pub geometry: Option<NativeGeometry>,
	pub values: Vec<Option<FieldValue>>,
	pub style: Option<String>,
}

impl NativeFeature {
	pub fn new(fid: i64) -> Self {
		Self {
			fid,
			..Self::default()
		}
	}

	#[must_use]
	pub fn with_geometry(mut self, geometry: NativeGeometry) -> Self {
		self.geometry = Some(geometry);
		self
	}

	#[must_use]
	pub fn with_wkt(self, wkt: &str) -> Self {
		self.with_geometry(NativeGeometry::Wkt(wkt.to_string()))
	}

	#[must_use]
	pub fn with_values(mut self, values: Vec<Option<FieldValue>>) -> Self {
		self.values = values;
		self
	}

	#[must_use]
	pub fn with_style(mut self, style: &str) -> Self {
		self.style = Some(style.to_string());
		self
	}

	pub fn value(&self, index: usize) -> Option<&FieldValue> {
		self.values.get(index).and_then(Option::as_ref)
	}
}
