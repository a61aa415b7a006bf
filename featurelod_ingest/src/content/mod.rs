//! `Content` walks a dataset feature set by feature set and emits one [`FeatureDefinition`] per
//! leaf geometry.
//!
//! Construction opens the dataset and runs the level of detail pre-scan. Afterwards the caller
//! drives two cursors:
//!
//! ```rust
//! use featurelod_ingest::{Content, MemoryDataset, MemoryLayer, NativeFeature, Registry};
//! use featurelod_core::Config;
//!
//! # fn main() -> anyhow::Result<()> {
//! let layer = MemoryLayer::new("rivers", vec![]).with_features([
//! 	NativeFeature::new(1).with_wkt("MULTILINESTRING ((0 0, 1 1), (2 2, 3 3))"),
//! 	NativeFeature::new(2).with_wkt("LINESTRING (4 4, 5 5)"),
//! ]);
//! let dataset = MemoryDataset::new("Memory", vec![layer]).boxed();
//! let mut content = Content::from_dataset("rivers.mem", dataset, &Registry::default(), &Config::default())?;
//!
//! let mut names = Vec::new();
//! while content.move_to_next_feature_set()? {
//! 	while content.move_to_next_feature()? {
//! 		names.push(content.get()?.name().to_string());
//! 	}
//! }
//! assert_eq!(names, ["rivers.1.0", "rivers.1.1", "rivers.2"]);
//! # Ok(())
//! # }
//! ```
//!
//! Nested collections are unwound with an explicit stack of child iterators, so the nesting depth
//! of a geometry does not affect the call stack.

mod definition;
mod naming;

pub use definition::{AltitudeMode, FeatureDefinition, StyleEncoding};
pub use naming::feature_set_name;

use crate::{
	IngestError,
	crs::CoordinateNormalizer,
	lod::{DatasetStatistics, LayerStatistics, LevelOfDetail, prescan},
	policy::{DriverPolicy, FeatureEncoding},
	provider::{Dataset, NativeFeature},
	registry::Registry,
};
use anyhow::Result;
use definition::{FeatureSource, LayerSchema};
use featurelod_core::{Config, LodScope};
use featurelod_geometry::{Geometry, massage};
use std::{rc::Rc, vec::IntoIter};

const CONTENT_TYPE: &str = "ogr";

enum TraversalState {
	/// Between native features.
	Feature,
	/// Unwinding the collection of a native feature.
	Geometry {
		source: Rc<FeatureSource>,
		stack: Vec<IntoIter<Geometry>>,
		emitted: usize,
	},
}

/// The feature set currently traversed.
struct LayerState {
	index: usize,
	feature_set_name: String,
	schema: Rc<LayerSchema>,
	normalizer: CoordinateNormalizer,
}

/// Traversal cursor over one dataset. Not thread safe: a single caller drives it.
pub struct Content {
	path: String,
	dataset: Box<dyn Dataset>,
	driver: Box<dyn DriverPolicy>,
	registry: Registry,
	scope: LodScope,
	encoding: FeatureEncoding,
	statistics: DatasetStatistics,
	next_layer_index: usize,
	layer: Option<LayerState>,
	state: TraversalState,
	current: Option<FeatureDefinition>,
}

impl Content {
	/// Opens `path` with the opener the registry knows for its extension.
	pub fn open(path: &str, registry: &Registry, config: &Config) -> Result<Content> {
		let dataset = registry.open(path).map_err(|e| IngestError::DatasetOpen {
			path: path.to_string(),
			reason: format!("{e:#}"),
		})?;
		Self::from_dataset(path, dataset, registry, config)
	}

	/// Wraps an opened dataset and runs the pre-scan.
	///
	/// A dataset without valid features is logged and yields no feature sets.
	pub fn from_dataset(path: &str, mut dataset: Box<dyn Dataset>, registry: &Registry, config: &Config) -> Result<Content> {
		if dataset.layer_count() == 0 {
			return Err(IngestError::DatasetOpen {
				path: path.to_string(),
				reason: "dataset has no layers".to_string(),
			}
			.into());
		}

		let driver = registry.driver_for(dataset.driver_name(), path);
		log::trace!("opened {path:?} with driver {:?}", driver.driver_name());
		let statistics = prescan(dataset.as_mut(), driver.as_ref(), registry.transforms(), config)?;

		let mut next_layer_index = 0;
		if statistics.feature_count == 0 {
			log::warn!("no valid features found in {path:?}");
			next_layer_index = dataset.layer_count();
		}

		Ok(Content {
			path: path.to_string(),
			encoding: driver.feature_encoding(),
			dataset,
			driver,
			registry: registry.clone(),
			scope: config.level_of_detail.scope,
			statistics,
			next_layer_index,
			layer: None,
			state: TraversalState::Feature,
			current: None,
		})
	}

	/// Overrides the driver's geometry encoding.
	pub fn set_feature_encoding(&mut self, encoding: FeatureEncoding) {
		self.encoding = encoding;
	}

	/// Advances to the next layer the driver does not skip. Returns `false` once all layers are
	/// done.
	pub fn move_to_next_feature_set(&mut self) -> Result<bool> {
		self.layer = None;
		self.current = None;
		self.state = TraversalState::Feature;

		while self.next_layer_index < self.dataset.layer_count() {
			let index = self.next_layer_index;
			self.next_layer_index += 1;

			let layer_count = self.dataset.layer_count();
			let layer = self.dataset.layer(index)?;
			if self.driver.skip_layer(layer) {
				log::trace!("skipping layer {:?}", layer.name());
				continue;
			}

			let name = layer.name().to_string();
			let fields = layer.fields().to_vec();
			let name_fields = self.registry.schema_for(&self.path, &fields).name_fields(&fields);
			let normalizer = CoordinateNormalizer::new(layer.spatial_ref(), self.registry.transforms());
			layer.reset_reading();

			log::trace!("feature set {index} {name:?}, name fields {name_fields:?}");
			self.layer = Some(LayerState {
				index,
				feature_set_name: feature_set_name(&self.path, &name, layer_count, self.driver.layer_name_is_path()),
				schema: Rc::new(LayerSchema {
					name,
					fields,
					name_fields,
				}),
				normalizer,
			});
			return Ok(true);
		}
		Ok(false)
	}

	/// Advances to the next leaf geometry of the current feature set. Returns `false` once the
	/// feature set is exhausted.
	///
	/// Read errors of the layer are returned as [`IngestError::LayerRead`]. Features that can not
	/// be decoded, transformed or encoded are logged and skipped.
	pub fn move_to_next_feature(&mut self) -> Result<bool> {
		self.current = None;
		let Some(layer) = &self.layer else {
			return Ok(false);
		};

		loop {
			match &mut self.state {
				TraversalState::Feature => {
					let Some(feature) = next_native_feature(self.dataset.as_mut(), self.driver.as_ref(), layer)? else {
						return Ok(false);
					};
					let geometry = match feature.geometry.as_ref().map(|native| native.decode()) {
						None => continue,
						Some(Ok(geometry)) => geometry,
						Some(Err(e)) => {
							log::warn!("skipping feature {} of {:?}: {e:#}", feature.fid, layer.schema.name);
							continue;
						}
					};
					let leaf_count = geometry.deep_count();
					if leaf_count == 0 {
						log::trace!("skipping empty feature {}", feature.fid);
						continue;
					}

					let source = Rc::new(FeatureSource {
						feature,
						schema: Rc::clone(&layer.schema),
						leaf_count,
					});
					match geometry {
						Geometry::Collection(collection) => {
							self.state = TraversalState::Geometry {
								source,
								stack: vec![collection.children.into_iter()],
								emitted: 0,
							};
						}
						leaf => {
							if let Some(definition) = self.emit(&source, leaf, 0) {
								self.current = Some(definition);
								return Ok(true);
							}
						}
					}
				}
				TraversalState::Geometry { source, stack, emitted } => {
					let Some(cursor) = stack.last_mut() else {
						self.state = TraversalState::Feature;
						continue;
					};
					match cursor.next() {
						Some(Geometry::Collection(collection)) => stack.push(collection.children.into_iter()),
						Some(leaf) => {
							if leaf.is_empty() {
								continue;
							}
							let leaf_index = *emitted;
							let source = Rc::clone(source);
							if let Some(definition) = self.emit(&source, leaf, leaf_index) {
								if let TraversalState::Geometry { emitted, .. } = &mut self.state {
									*emitted += 1;
								}
								self.current = Some(definition);
								return Ok(true);
							}
						}
						None => {
							stack.pop();
							if stack.is_empty() {
								self.state = TraversalState::Feature;
							}
						}
					}
				}
			}
		}
	}

	/// Massages, transforms and encodes one leaf. Failures skip the leaf.
	fn emit(&self, source: &Rc<FeatureSource>, leaf: Geometry, leaf_index: usize) -> Option<FeatureDefinition> {
		let layer = self.layer.as_ref()?;
		let fid = source.feature.fid;
		let mut geometry = massage(leaf)?;
		let result = layer.normalizer.transform_geometry(&mut geometry).and_then(|()| {
			let style = self.driver.style(&self.path, &source.feature, &geometry);
			FeatureDefinition::new(Rc::clone(source), leaf_index, geometry, self.encoding, style)
		});
		match result {
			Ok(definition) => Some(definition),
			Err(e) => {
				log::warn!("skipping feature {fid} of {:?}: {e:#}", layer.schema.name);
				None
			}
		}
	}

	/// The current feature. Only valid after [`Self::move_to_next_feature`] returned `true`.
	pub fn get(&self) -> Result<&FeatureDefinition> {
		self
			.current
			.as_ref()
			.ok_or_else(|| IngestError::IllegalState("no current feature").into())
	}

	pub fn feature_set_name(&self) -> Result<&str> {
		self
			.layer
			.as_ref()
			.map(|layer| layer.feature_set_name.as_str())
			.ok_or_else(|| IngestError::IllegalState("no current feature set").into())
	}

	pub fn feature_set_visible(&self) -> bool {
		true
	}

	/// Visibility of the current feature.
	pub fn visible(&self) -> bool {
		self.current.as_ref().is_none_or(FeatureDefinition::visible)
	}

	pub fn content_type(&self) -> &str {
		CONTENT_TYPE
	}

	pub fn provider(&self) -> &str {
		CONTENT_TYPE
	}

	pub fn path(&self) -> &str {
		&self.path
	}

	pub fn driver_name(&self) -> &str {
		self.driver.driver_name()
	}

	pub fn parse_version(&self) -> u32 {
		self.driver.parse_version()
	}

	/// Level of detail of the whole dataset.
	pub fn level_of_detail(&self) -> &LevelOfDetail {
		&self.statistics.level_of_detail
	}

	pub fn statistics(&self) -> &DatasetStatistics {
		&self.statistics
	}

	pub fn layer_statistics(&self, index: usize) -> Option<&LayerStatistics> {
		self.statistics.layers.get(index)
	}

	/// The feature set name layer `index` is traversed under.
	pub fn layer_feature_set_name(&self, index: usize) -> Option<String> {
		let stats = self.layer_statistics(index)?;
		Some(feature_set_name(
			&self.path,
			&stats.name,
			self.dataset.layer_count(),
			self.driver.layer_name_is_path(),
		))
	}

	/// The level of detail reported for the current feature set, depending on the configured scope.
	fn current_level_of_detail(&self) -> &LevelOfDetail {
		match (self.scope, &self.layer) {
			(LodScope::Layer, Some(layer)) => self
				.layer_statistics(layer.index)
				.map_or(&self.statistics.level_of_detail, |stats| &stats.level_of_detail),
			_ => &self.statistics.level_of_detail,
		}
	}

	pub fn min_resolution(&self) -> f64 {
		self.current_level_of_detail().min_resolution
	}

	pub fn max_resolution(&self) -> f64 {
		self.current_level_of_detail().max_resolution()
	}
}

/// Reads the next feature the driver does not skip.
fn next_native_feature(dataset: &mut dyn Dataset, driver: &dyn DriverPolicy, layer: &LayerState) -> Result<Option<NativeFeature>> {
	let read_error = |e: anyhow::Error| IngestError::LayerRead {
		layer: layer.schema.name.clone(),
		reason: format!("{e:#}"),
	};
	let native = dataset.layer(layer.index).map_err(read_error)?;
	loop {
		match native.next_feature().map_err(read_error)? {
			Some(feature) if driver.skip_feature(&feature) => log::trace!("skipping feature {}", feature.fid),
			other => return Ok(other),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		attributes::AttributeValue,
		provider::{FieldDefinition, FieldType, FieldValue, Layer, MemoryDataset, MemoryLayer, SpatialRef},
	};
	use approx::assert_relative_eq;
	use assert_fs::{NamedTempFile, prelude::*};
	use pretty_assertions::assert_eq;
	use std::{cell::Cell, rc::Rc};

	fn layer(name: &str, wkts: &[&str]) -> MemoryLayer {
		MemoryLayer::new(name, vec![]).with_features(
			wkts
				.iter()
				.enumerate()
				.map(|(i, wkt)| NativeFeature::new(i as i64 + 1).with_wkt(wkt)),
		)
	}

	fn content(layers: Vec<MemoryLayer>) -> Content {
		content_with(layers, &Config::default())
	}

	fn content_with(layers: Vec<MemoryLayer>, config: &Config) -> Content {
		let dataset = MemoryDataset::new("Memory", layers).boxed();
		Content::from_dataset("test.mem", dataset, &Registry::default(), config).unwrap()
	}

	/// Drains the current feature set into (name, WKT) pairs.
	fn drain(content: &mut Content) -> Vec<(String, String)> {
		let mut result = Vec::new();
		while content.move_to_next_feature().unwrap() {
			let feature = content.get().unwrap();
			result.push((feature.name().to_string(), feature.geometry().to_wkt()));
		}
		result
	}

	fn wkts(features: &[(String, String)]) -> Vec<&str> {
		features.iter().map(|(_, wkt)| wkt.as_str()).collect()
	}

	#[test]
	fn flattens_nested_collections_in_order() {
		let mut content = content(vec![layer(
			"a",
			&[
				"GEOMETRYCOLLECTION (POINT (1 1), MULTIPOINT ((2 2), (3 3)), GEOMETRYCOLLECTION (LINESTRING (4 4, 5 5), GEOMETRYCOLLECTION EMPTY), POINT (6 6))",
				"POINT (7 7)",
			],
		)]);
		assert!(content.move_to_next_feature_set().unwrap());
		let features = drain(&mut content);
		assert_eq!(
			features,
			vec![
				("a.1.0".to_string(), "POINT (1 1)".to_string()),
				("a.1.1".to_string(), "POINT (2 2)".to_string()),
				("a.1.2".to_string(), "POINT (3 3)".to_string()),
				("a.1.3".to_string(), "LINESTRING (4 4, 5 5)".to_string()),
				("a.1.4".to_string(), "POINT (6 6)".to_string()),
				("a.2".to_string(), "POINT (7 7)".to_string()),
			]
		);
		assert!(!content.move_to_next_feature().unwrap());
		assert!(!content.move_to_next_feature_set().unwrap());
	}

	#[test]
	fn deep_nesting_does_not_recurse() {
		let mut geometry = Geometry::new_point([1.0, 2.0]);
		for _ in 0..1_000 {
			geometry = Geometry::new_collection(featurelod_geometry::CollectionKind::GeometryCollection, vec![geometry]);
		}
		let layer = MemoryLayer::new("deep", vec![]).with_features([
			NativeFeature::new(1).with_geometry(crate::provider::NativeGeometry::Decoded(geometry)),
			NativeFeature::new(2).with_wkt("POINT (3 4)"),
		]);
		let mut content = content(vec![layer]);
		assert!(content.move_to_next_feature_set().unwrap());
		assert_eq!(wkts(&drain(&mut content)), vec!["POINT (1 2)", "POINT (3 4)"]);
	}

	#[test]
	fn skips_empty_and_missing_geometries() {
		let mut layer = layer(
			"a",
			&["GEOMETRYCOLLECTION EMPTY", "LINESTRING EMPTY", "MULTIPOLYGON EMPTY", "POINT (1 2)"],
		);
		layer.push_feature(NativeFeature::new(5));
		let mut content = content(vec![layer]);
		assert!(content.move_to_next_feature_set().unwrap());
		let features = drain(&mut content);
		assert_eq!(features, vec![("a.4".to_string(), "POINT (1 2)".to_string())]);
	}

	#[test]
	fn massages_degenerate_geometries() {
		let mut content = content(vec![layer(
			"a",
			&[
				"POLYGON ((0 0, 1 0, 1 1))",
				"POLYGON ((5 5))",
				"LINESTRING (2 2)",
				"MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)), ((3 3, 4 4)))",
			],
		)]);
		assert!(content.move_to_next_feature_set().unwrap());
		assert_eq!(
			wkts(&drain(&mut content)),
			vec![
				"LINESTRING (0 0, 1 0, 1 1)",
				"POINT (5 5)",
				"POINT (2 2)",
				"POLYGON ((0 0, 1 0, 1 1, 0 0))",
				"LINESTRING (3 3, 4 4)",
			]
		);
	}

	#[test]
	fn polygon_with_only_a_hole_is_not_a_leaf() {
		let mut content = content(vec![layer(
			"a",
			&["MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)), (EMPTY, (2 2, 3 2, 3 3, 2 2)))"],
		)]);
		assert_eq!(content.statistics().feature_count, 1);
		assert!(content.move_to_next_feature_set().unwrap());
		assert_eq!(
			drain(&mut content),
			vec![("a.1".to_string(), "POLYGON ((0 0, 1 0, 1 1, 0 0))".to_string())]
		);
	}

	#[test]
	fn skips_malformed_geometries() {
		let layer = MemoryLayer::new("a", vec![]).with_features([
			NativeFeature::new(1).with_wkt("POINT (1"),
			NativeFeature::new(2).with_geometry(crate::provider::NativeGeometry::Unknown {
				format: "GML".to_string(),
			}),
			NativeFeature::new(3).with_geometry(crate::provider::NativeGeometry::Wkb(vec![1, 2, 3])),
			NativeFeature::new(4).with_wkt("POINT (1 2)"),
			NativeFeature::new(5).with_wkt("POINT (3 4)"),
		]);
		let mut content = content(vec![layer]);
		assert!(content.move_to_next_feature_set().unwrap());
		assert_eq!(wkts(&drain(&mut content)), vec!["POINT (1 2)", "POINT (3 4)"]);
	}

	#[test]
	fn names_come_from_the_schema() {
		let fields = vec![
			FieldDefinition::new("desc", FieldType::String),
			FieldDefinition::new("name", FieldType::String),
			FieldDefinition::new("namex", FieldType::String),
		];
		let layer = MemoryLayer::new("places", fields).with_features([NativeFeature::new(1)
			.with_wkt("MULTIPOINT ((1 1), (2 2))")
			.with_values(vec![
				Some(FieldValue::String("a place".to_string())),
				Some(FieldValue::String("Berlin\nGermany".to_string())),
				None,
			])]);
		let mut content = content(vec![layer]);
		assert!(content.move_to_next_feature_set().unwrap());
		assert!(content.move_to_next_feature().unwrap());
		let feature = content.get().unwrap();
		assert_eq!(feature.name(), "Berlin.0");
		assert_eq!(
			feature.attributes().get("desc"),
			Some(&AttributeValue::String("a place".to_string()))
		);
		assert_eq!(feature.attributes().get("namex"), None);
	}

	#[test]
	fn feature_set_names_and_styles() {
		let mut content = content(vec![layer("a", &["POINT (1 1)"]), layer("b", &["LINESTRING (0 0, 1 1)"])]);
		assert!(content.feature_set_name().is_err());

		assert!(content.move_to_next_feature_set().unwrap());
		assert_eq!(content.feature_set_name().unwrap(), "test.mem/a");
		assert!(content.move_to_next_feature().unwrap());
		assert_eq!(content.get().unwrap().raw_style(), Some(crate::policy::DEFAULT_POINT_STYLE));

		assert!(content.move_to_next_feature_set().unwrap());
		assert_eq!(content.feature_set_name().unwrap(), "test.mem/b");
		assert!(content.move_to_next_feature().unwrap());
		assert_eq!(content.get().unwrap().raw_style(), Some(crate::policy::DEFAULT_LINE_STYLE));
	}

	#[test]
	fn single_layer_is_named_after_the_file() {
		let mut content = content(vec![layer("a", &["POINT (1 1)", "POINT (2 2)"])]);
		assert!(content.move_to_next_feature_set().unwrap());
		assert_eq!(content.feature_set_name().unwrap(), "test.mem");
		assert_eq!(content.content_type(), "ogr");
		assert_eq!(content.provider(), "ogr");
		assert!(content.feature_set_visible());
		assert_eq!(content.parse_version(), 1);
	}

	#[test]
	fn get_requires_a_current_feature() {
		let mut content = content(vec![layer("a", &["POINT (1 1)", "POINT (2 2)"])]);
		let err = content.get().unwrap_err();
		assert_eq!(
			err.downcast_ref::<IngestError>(),
			Some(&IngestError::IllegalState("no current feature"))
		);
		assert!(!content.move_to_next_feature().unwrap());

		assert!(content.move_to_next_feature_set().unwrap());
		assert!(content.move_to_next_feature().unwrap());
		assert!(content.get().is_ok());
		assert!(content.move_to_next_feature().unwrap());
		assert!(!content.move_to_next_feature().unwrap());
		assert!(content.get().is_err());
	}

	#[test]
	fn skipped_layers_are_not_traversed() {
		let dataset = MemoryDataset::new(
			"GPX",
			vec![
				layer("routes", &["LINESTRING (0 0, 1 1)"]),
				layer("route_points", &["POINT (0 0)", "POINT (1 1)"]),
				layer("tracks", &["LINESTRING (2 2, 3 3)"]),
			],
		)
		.boxed();
		let mut content = Content::from_dataset("/data/tracks/a.gpx", dataset, &Registry::default(), &Config::default()).unwrap();
		assert_eq!(content.driver_name(), "GPX");

		let mut names = Vec::new();
		while content.move_to_next_feature_set().unwrap() {
			names.push(content.feature_set_name().unwrap().to_string());
			drain(&mut content);
		}
		assert_eq!(names, vec!["a.gpx/routes", "a.gpx/tracks"]);
		assert!(content.layer_statistics(1).unwrap().skipped);
		assert_eq!(content.layer_feature_set_name(1).as_deref(), Some("a.gpx/route_points"));
		assert_eq!(content.layer_feature_set_name(3), None);
	}

	#[test]
	fn projected_layers_are_transformed() {
		let layer = MemoryLayer::new("mercator", vec![])
			.with_spatial_ref(SpatialRef::from_epsg(3857))
			.with_features([
				NativeFeature::new(1).with_wkt("POINT (1491681.177 6891041.724)"),
				NativeFeature::new(2).with_wkt("POINT (0 0)"),
			]);
		let mut content = content(vec![layer]);
		assert!(content.move_to_next_feature_set().unwrap());
		assert!(content.move_to_next_feature().unwrap());
		let Geometry::Point(point) = content.get().unwrap().geometry() else {
			panic!("expected a point");
		};
		assert_relative_eq!(point.0.x(), 13.4, epsilon = 1e-6);
		assert_relative_eq!(point.0.y(), 52.5, epsilon = 1e-6);
	}

	#[test]
	fn encoding_can_be_overridden() {
		let mut content = content(vec![layer("a", &["POINT (1 1)", "POINT (2 2)"])]);
		content.set_feature_encoding(FeatureEncoding::Wkt);
		assert!(content.move_to_next_feature_set().unwrap());
		assert!(content.move_to_next_feature().unwrap());
		let feature = content.get().unwrap();
		assert_eq!(feature.geometry_encoding(), FeatureEncoding::Wkt);
		assert_eq!(feature.raw_geometry(), Some("POINT (1 1)".as_bytes()));
	}

	#[test]
	fn empty_dataset_has_no_feature_sets() {
		let mut content = content(vec![layer("a", &["POINT EMPTY", "LINESTRING EMPTY"])]);
		assert_eq!(content.statistics().feature_count, 0);
		assert!(!content.move_to_next_feature_set().unwrap());
		assert_eq!(content.min_resolution(), LevelOfDetail::new(0).min_resolution);
	}

	#[test]
	fn datasets_without_layers_fail() {
		let dataset = MemoryDataset::new("Memory", vec![]).boxed();
		let err = Content::from_dataset("none.mem", dataset, &Registry::default(), &Config::default())
			.err()
			.unwrap();
		assert_eq!(
			err.downcast_ref::<IngestError>(),
			Some(&IngestError::DatasetOpen {
				path: "none.mem".to_string(),
				reason: "dataset has no layers".to_string()
			})
		);
	}

	#[test]
	fn unknown_files_fail_to_open() {
		let err = Content::open("data.unknown", &Registry::default(), &Config::default())
			.err()
			.unwrap();
		assert!(matches!(
			err.downcast_ref::<IngestError>(),
			Some(IngestError::DatasetOpen { .. })
		));
	}

	#[test]
	fn resolution_scope() {
		let layers = || {
			vec![
				layer("wide", &["LINESTRING (-10 35, 30 60)"]),
				layer("narrow", &["LINESTRING (13.4 52.5, 13.41 52.51)"]),
			]
		};
		let mut dataset_scope = content(layers());
		assert_eq!(dataset_scope.level_of_detail().level, 0);
		assert!(dataset_scope.move_to_next_feature_set().unwrap());
		assert!(dataset_scope.move_to_next_feature_set().unwrap());
		assert_eq!(dataset_scope.min_resolution(), LevelOfDetail::new(0).min_resolution);
		assert_eq!(dataset_scope.max_resolution(), 0.0);

		let mut config = Config::default();
		config.level_of_detail.scope = LodScope::Layer;
		let mut layer_scope = content_with(layers(), &config);
		assert!(layer_scope.move_to_next_feature_set().unwrap());
		assert_eq!(layer_scope.min_resolution(), LevelOfDetail::new(0).min_resolution);
		assert!(layer_scope.move_to_next_feature_set().unwrap());
		assert_eq!(layer_scope.min_resolution(), LevelOfDetail::new(10).min_resolution);
	}

	#[derive(Debug)]
	struct FlakyLayer {
		inner: MemoryLayer,
		fail_at: usize,
		position: usize,
		armed: Rc<Cell<bool>>,
	}

	impl Layer for FlakyLayer {
		fn name(&self) -> &str {
			self.inner.name()
		}

		fn fields(&self) -> &[FieldDefinition] {
			self.inner.fields()
		}

		fn spatial_ref(&self) -> Option<&SpatialRef> {
			self.inner.spatial_ref()
		}

		fn reset_reading(&mut self) {
			self.position = 0;
			self.inner.reset_reading();
		}

		fn next_feature(&mut self) -> Result<Option<NativeFeature>> {
			let position = self.position;
			self.position += 1;
			let feature = self.inner.next_feature()?;
			if self.armed.get() && position == self.fail_at {
				anyhow::bail!("disk error");
			}
			Ok(feature)
		}
	}

	#[derive(Debug)]
	struct FlakyDataset {
		layers: Vec<FlakyLayer>,
	}

	impl Dataset for FlakyDataset {
		fn driver_name(&self) -> &str {
			"Flaky"
		}

		fn layer_count(&self) -> usize {
			self.layers.len()
		}

		fn layer(&mut self, index: usize) -> Result<&mut dyn Layer> {
			Ok(&mut self.layers[index])
		}
	}

	#[test]
	fn read_errors_fail_the_call_only() {
		let armed = Rc::new(Cell::new(false));
		let flaky = |name: &str| FlakyLayer {
			inner: layer(name, &["POINT (1 1)", "POINT (2 2)", "POINT (3 3)"]),
			fail_at: 1,
			position: 0,
			armed: Rc::clone(&armed),
		};
		let dataset = Box::new(FlakyDataset {
			layers: vec![flaky("a"), flaky("b")],
		});
		let mut content = Content::from_dataset("flaky", dataset, &Registry::default(), &Config::default()).unwrap();
		armed.set(true);

		assert!(content.move_to_next_feature_set().unwrap());
		assert!(content.move_to_next_feature().unwrap());
		let err = content.move_to_next_feature().unwrap_err();
		assert_eq!(
			err.downcast_ref::<IngestError>(),
			Some(&IngestError::LayerRead {
				layer: "a".to_string(),
				reason: "disk error".to_string()
			})
		);
		assert!(content.get().is_err());
		// the cursor moved past the broken record
		assert!(content.move_to_next_feature().unwrap());
		assert_eq!(content.get().unwrap().feature_id(), 3);

		// the next feature set is unaffected
		assert!(content.move_to_next_feature_set().unwrap());
		assert!(content.move_to_next_feature().unwrap());
		assert_eq!(content.get().unwrap().feature_id(), 1);
	}

	#[test]
	fn csv_end_to_end() {
		let file = NamedTempFile::new("cities.csv").unwrap();
		file
			.write_str("name,population,wkt\nBerlin,3700000,POINT (13.4 52.5)\nHamburg,1900000,POINT (10.0 53.55)\nNowhere,0,\n")
			.unwrap();
		let path = file.path().to_string_lossy().to_string();

		let mut content = Content::open(&path, &Registry::default(), &Config::default()).unwrap();
		assert_eq!(content.driver_name(), "CSV");
		assert!(content.level_of_detail().level > 0);
		assert!(content.move_to_next_feature_set().unwrap());
		assert_eq!(content.feature_set_name().unwrap(), "cities.csv");

		let features = drain(&mut content);
		assert_eq!(
			features,
			vec![
				("Berlin".to_string(), "POINT (13.4 52.5)".to_string()),
				("Hamburg".to_string(), "POINT (10 53.55)".to_string()),
			]
		);
	}
}
