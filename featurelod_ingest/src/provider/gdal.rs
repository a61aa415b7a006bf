//! Datasets read through GDAL/OGR.
//!
//! GDAL layers borrow their dataset, so a dataset is read completely when it is opened and
//! handed to the engine as a [`MemoryDataset`].

use super::{
	Dataset, DatasetOpener, FieldDefinition, FieldType, FieldValue, MemoryDataset, MemoryLayer, NativeFeature,
	NativeGeometry, SpatialRef,
};
use anyhow::{Context, Result};
use featurelod_core::GdalConfig;
use gdal::{
	spatial_ref::SpatialRef as GdalSpatialRef,
	vector::{Feature, FieldValue as GdalFieldValue, LayerAccess},
};
use gdal_sys::OGRFieldType;
use std::ffi::CStr;

/// File extensions of the vector formats registered for GDAL.
pub const GDAL_EXTENSIONS: [&str; 14] = [
	"shp", "kml", "kmz", "gpx", "geojson", "json", "gml", "gpkg", "tab", "mif", "dxf", "fgb", "zip", "sqlite",
];

#[derive(Clone, Debug, Default)]
pub struct GdalOpener {
	config: GdalConfig,
}

impl GdalOpener {
	pub fn new(config: GdalConfig) -> Self {
		Self { config }
	}
}

impl DatasetOpener for GdalOpener {
	fn open(&self, path: &str) -> Result<Box<dyn Dataset>> {
		let path = normalize_path(path, &self.config);
		log::debug!("opening GDAL dataset {path:?}");
		Ok(read_gdal_dataset(&path)?.boxed())
	}
}

/// Prepends the configured VSI prefix, or routes `.zip` archives through `/vsizip`.
pub fn normalize_path(path: &str, config: &GdalConfig) -> String {
	if let Some(prefix) = &config.vsi_prefix {
		return format!("{prefix}{path}");
	}
	if path.contains(".zip") && !path.starts_with("/vsi") {
		if path.starts_with('/') {
			return format!("/vsizip{path}");
		}
		return format!("/vsizip/{path}");
	}
	path.to_string()
}

fn read_gdal_dataset(path: &str) -> Result<MemoryDataset> {
	let dataset = gdal::Dataset::open(path).with_context(|| format!("Failed to open GDAL dataset {path:?}"))?;
	let driver_name = dataset.driver().short_name();

	let mut layers = Vec::new();
	for mut layer in dataset.layers() {
		let name = layer.name();
		let fields: Vec<FieldDefinition> = layer
			.defn()
			.fields()
			.map(|field| FieldDefinition::new(&field.name(), field_type(field.field_type())))
			.collect();
		let spatial_ref = layer.spatial_ref().map(convert_spatial_ref);

		let mut memory = MemoryLayer::new(&name, fields);
		if let Some(spatial_ref) = spatial_ref {
			memory = memory.with_spatial_ref(spatial_ref);
		}
		for feature in layer.features() {
			memory.push_feature(convert_feature(&feature).with_context(|| format!("Failed to read layer {name:?}"))?);
		}
		log::trace!("read {} features from layer {name:?}", memory.len());
		layers.push(memory);
	}

	Ok(MemoryDataset::new(&driver_name, layers))
}

fn convert_spatial_ref(mut spatial_ref: GdalSpatialRef) -> SpatialRef {
	// identifies an EPSG code for definitions that only carry a WKT
	let _ = spatial_ref.auto_identify_epsg();
	SpatialRef {
		authority: spatial_ref.auth_name().ok(),
		code: spatial_ref.auth_code().ok(),
		definition: spatial_ref.to_wkt().ok(),
	}
}

fn convert_feature(feature: &Feature) -> Result<NativeFeature> {
	let fid = feature.fid().and_then(|fid| i64::try_from(fid).ok()).unwrap_or(-1);
	let mut native = NativeFeature::new(fid);
	if let Some(geometry) = feature.geometry() {
		native = native.with_geometry(NativeGeometry::Wkb(geometry.wkb()?));
	}
	native.values = feature.fields().map(|(_, value)| value.map(field_value)).collect();
	native.style = style_string(feature);
	Ok(native)
}

fn style_string(feature: &Feature) -> Option<String> {
	// SAFETY: the handle is valid while `feature` is borrowed and the returned string is owned by
	// the feature, so it is copied before the borrow ends.
	unsafe {
		let style = gdal_sys::OGR_F_GetStyleString(feature.c_feature());
		if style.is_null() {
			return None;
		}
		Some(CStr::from_ptr(style).to_string_lossy().into_owned())
	}
}

fn field_type(field_type: u32) -> FieldType {
	match field_type {
		OGRFieldType::OFTInteger => FieldType::Integer,
		OGRFieldType::OFTIntegerList => FieldType::IntegerList,
		OGRFieldType::OFTReal => FieldType::Real,
		OGRFieldType::OFTRealList => FieldType::RealList,
		OGRFieldType::OFTStringList | OGRFieldType::OFTWideStringList => FieldType::StringList,
		OGRFieldType::OFTBinary => FieldType::Binary,
		OGRFieldType::OFTDate => FieldType::Date,
		OGRFieldType::OFTTime => FieldType::Time,
		OGRFieldType::OFTDateTime => FieldType::DateTime,
		OGRFieldType::OFTInteger64 => FieldType::Integer64,
		OGRFieldType::OFTInteger64List => FieldType::Integer64List,
		_ => FieldType::String,
	}
}

fn field_value(value: GdalFieldValue) -> FieldValue {
	#[allow(unreachable_patterns)]
	match value {
		GdalFieldValue::IntegerValue(v) => FieldValue::Integer(v),
		GdalFieldValue::IntegerListValue(v) => FieldValue::IntegerList(v),
		GdalFieldValue::Integer64Value(v) => FieldValue::Integer64(v),
		GdalFieldValue::Integer64ListValue(v) => FieldValue::Integer64List(v),
		GdalFieldValue::StringValue(v) => FieldValue::String(v),
		GdalFieldValue::StringListValue(v) => FieldValue::StringList(v),
		GdalFieldValue::RealValue(v) => FieldValue::Real(v),
		GdalFieldValue::RealListValue(v) => FieldValue::RealList(v),
		GdalFieldValue::DateValue(v) => FieldValue::Date(v.to_string()),
		GdalFieldValue::DateTimeValue(v) => FieldValue::DateTime(v.to_string()),
		other => FieldValue::String(format!("{other:?}")),
	}
}
