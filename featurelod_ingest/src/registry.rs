//! `Registry` maps file extensions to dataset openers and driver names to driver policies.
//!
//! A registry is created once and passed into every ingestion session, so there is no process
//! wide state. [`Registry::default`] knows all bundled formats:
//!
//! ```rust
//! use featurelod_ingest::Registry;
//!
//! let registry = Registry::default();
//! assert!(registry.opener_for("data/cities.csv").is_ok());
//! assert_eq!(registry.driver_for("GPX", "tracks.gpx").driver_name(), "GPX");
//! ```

use crate::{
	crs::{BuiltinTransforms, TransformFactory},
	policy::{DefaultDriverPolicy, DefaultSchemaPolicy, DriverPolicy, GpxDriverPolicy, KmlDriverPolicy, SchemaPolicy},
	provider::{CsvOpener, Dataset, DatasetOpener, FieldDefinition},
};
use anyhow::{Result, anyhow};
use featurelod_core::Config;
use std::{collections::HashMap, path::Path, sync::Arc};

type DriverFactory = Arc<dyn Fn(&str) -> Box<dyn DriverPolicy>>;

#[derive(Clone)]
pub struct Registry {
	openers: HashMap<String, Arc<dyn DatasetOpener>>,
	drivers: HashMap<String, DriverFactory>,
	schemas: Vec<Arc<dyn SchemaPolicy>>,
	transforms: Arc<dyn TransformFactory>,
}

impl Registry {
	/// Creates a registry without openers, drivers or schemas. Coordinates are transformed by the
	/// built-in transforms.
	pub fn new_empty() -> Self {
		Self {
			openers: HashMap::new(),
			drivers: HashMap::new(),
			schemas: Vec::new(),
			transforms: Arc::new(BuiltinTransforms),
		}
	}

	/// Registers all bundled openers, drivers and transforms.
	pub fn from_config(config: &Config) -> Self {
		let mut registry = Self::new_empty();

		registry.register_opener("csv", CsvOpener);
		registry.register_opener("tsv", CsvOpener);

		#[cfg(feature = "gdal")]
		{
			use crate::{crs::GdalTransforms, provider::GDAL_EXTENSIONS, provider::GdalOpener};
			for ext in GDAL_EXTENSIONS {
				registry.register_opener(ext, GdalOpener::new(config.gdal.clone()));
			}
			registry.set_transforms(GdalTransforms);
		}
		#[cfg(not(feature = "gdal"))]
		let _ = config;

		registry.register_driver("KML", |_| Box::new(KmlDriverPolicy::new("KML")));
		registry.register_driver("LIBKML", |_| Box::new(KmlDriverPolicy::new("LIBKML")));
		registry.register_driver("GPX", |_| Box::new(GpxDriverPolicy));

		registry
	}

	pub fn register_opener<O>(&mut self, ext: &str, opener: O)
	where
		O: DatasetOpener + 'static,
	{
		self.openers.insert(sanitize_extension(ext), Arc::new(opener));
	}

	/// Registers the policy factory for a driver name. The factory gets the dataset path.
	pub fn register_driver<F>(&mut self, name: &str, factory: F)
	where
		F: Fn(&str) -> Box<dyn DriverPolicy> + 'static,
	{
		self.drivers.insert(sanitize_name(name), Arc::new(factory));
	}

	/// Adds a schema. Schemas are tried in registration order.
	pub fn register_schema<S>(&mut self, schema: S)
	where
		S: SchemaPolicy + 'static,
	{
		self.schemas.push(Arc::new(schema));
	}

	pub fn set_transforms<T>(&mut self, transforms: T)
	where
		T: TransformFactory + 'static,
	{
		self.transforms = Arc::new(transforms);
	}

	/// The opener registered for the extension of `path`.
	pub fn opener_for(&self, path: &str) -> Result<&dyn DatasetOpener> {
		let extension = Path::new(path)
			.extension()
			.map(|ext| sanitize_extension(&ext.to_string_lossy()))
			.ok_or_else(|| anyhow!("path '{path}' has no file extension"))?;
		self
			.openers
			.get(&extension)
			.map(|opener| opener.as_ref())
			.ok_or_else(|| anyhow!("file extension '{extension}' unknown"))
	}

	pub fn open(&self, path: &str) -> Result<Box<dyn Dataset>> {
		self.opener_for(path)?.open(path)
	}

	/// The policy of driver `name`, or a [`DefaultDriverPolicy`] for unregistered drivers.
	pub fn driver_for(&self, name: &str, path: &str) -> Box<dyn DriverPolicy> {
		match self.drivers.get(&sanitize_name(name)) {
			Some(factory) => factory(path),
			None => Box::new(DefaultDriverPolicy::new(name)),
		}
	}

	/// The first registered schema matching the layer, or [`DefaultSchemaPolicy`].
	pub fn schema_for(&self, path: &str, fields: &[FieldDefinition]) -> Arc<dyn SchemaPolicy> {
		self
			.schemas
			.iter()
			.find(|schema| schema.matches(path, fields))
			.cloned()
			.unwrap_or_else(|| Arc::new(DefaultSchemaPolicy))
	}

	pub fn transforms(&self) -> &dyn TransformFactory {
		self.transforms.as_ref()
	}

	/// Registered file extensions, sorted.
	pub fn extensions(&self) -> Vec<String> {
		let mut extensions: Vec<String> = self.openers.keys().cloned().collect();
		extensions.sort();
		extensions
	}
}

impl Default for Registry {
	fn default() -> Self {
		Self::from_config(&Config::default())
	}
}

fn sanitize_extension(ext: &str) -> String {
	ext.to_ascii_lowercase().trim_matches('.').to_string()
}

fn sanitize_name(name: &str) -> String {
	name.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		policy::ColumnSchemaPolicy,
		provider::{FieldType, MemoryDataset},
	};
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	#[rstest]
	#[case(".CSV", "csv")]
	#[case("..tsv..", "tsv")]
	#[case("Shp", "shp")]
	fn sanitizes_extensions(#[case] ext: &str, #[case] expected: &str) {
		assert_eq!(sanitize_extension(ext), expected);
	}

	#[test]
	fn default_openers() {
		let registry = Registry::default();
		assert!(registry.opener_for("a.csv").is_ok());
		assert!(registry.opener_for("A.TSV").is_ok());
		assert_eq!(
			registry.opener_for("a.xyz").err().unwrap().to_string(),
			"file extension 'xyz' unknown"
		);
		assert_eq!(
			registry.opener_for("noext").err().unwrap().to_string(),
			"path 'noext' has no file extension"
		);
		assert!(registry.extensions().contains(&"csv".to_string()));
	}

	#[test]
	fn custom_opener() {
		let mut registry = Registry::new_empty();
		assert!(registry.opener_for("a.mem").is_err());
		registry.register_opener(".MEM", |_: &str| -> Result<Box<dyn Dataset>> {
			Ok(MemoryDataset::new("Memory", vec![]).boxed())
		});
		let dataset = registry.open("a.mem").unwrap();
		assert_eq!(dataset.driver_name(), "Memory");
	}

	#[test]
	fn drivers() {
		let registry = Registry::default();
		assert!(registry.driver_for("kml", "a.kml").layer_name_is_path());
		assert!(registry.driver_for("LIBKML", "a.kmz").layer_name_is_path());
		assert_eq!(registry.driver_for("GPX", "a.gpx").driver_name(), "GPX");

		let fallback = registry.driver_for("ESRI Shapefile", "a.shp");
		assert_eq!(fallback.driver_name(), "ESRI Shapefile");
		assert!(!fallback.layer_name_is_path());
	}

	#[test]
	fn schemas() {
		let mut registry = Registry::default();
		let fields = vec![
			FieldDefinition::new("name", FieldType::String),
			FieldDefinition::new("label", FieldType::String),
		];
		assert_eq!(registry.schema_for("a.csv", &fields).name_fields(&fields), vec!["name"]);

		registry.register_schema(ColumnSchemaPolicy::new(&["name", "label"], Some("label")));
		assert_eq!(
			registry.schema_for("a.csv", &fields).name_fields(&fields),
			vec!["label", "name"]
		);
		assert_eq!(registry.schema_for("a.csv", &fields[..1]).name_fields(&fields[..1]), vec!["name"]);
	}
}
