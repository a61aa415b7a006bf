use super::{LevelOfDetail, estimate};
use crate::{
	IngestError,
	crs::{CoordinateNormalizer, TransformFactory},
	policy::DriverPolicy,
	provider::Dataset,
};
use anyhow::Result;
use featurelod_core::{Config, Envelope};
use featurelod_geometry::Geometry;

/// What the pre-scan found in one layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerStatistics {
	pub name: String,
	/// The driver skips this layer.
	pub skipped: bool,
	/// WGS84 bounding box of all valid features.
	pub envelope: Option<Envelope>,
	/// Number of non-empty leaf geometries.
	pub feature_count: u64,
	/// Number of features that are a single point.
	pub point_count: u64,
	pub level_of_detail: LevelOfDetail,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DatasetStatistics {
	pub layers: Vec<LayerStatistics>,
	pub envelope: Option<Envelope>,
	pub feature_count: u64,
	pub point_count: u64,
	pub level_of_detail: LevelOfDetail,
	/// The scan stopped at `prescan_feature_limit`.
	pub truncated: bool,
}

/// Scans every layer that is not skipped and collects bounding boxes and feature counts.
///
/// Skipped features and features without a decodable, non-empty geometry do not count. Layer
/// bounding boxes are transformed to WGS84 through all four corners before they are merged. Every
/// scanned layer is rewound afterwards.
pub fn prescan(
	dataset: &mut dyn Dataset,
	driver: &dyn DriverPolicy,
	transforms: &dyn TransformFactory,
	config: &Config,
) -> Result<DatasetStatistics> {
	let limit = config.level_of_detail.prescan_feature_limit;
	let mut stats = DatasetStatistics::default();

	for index in 0..dataset.layer_count() {
		let layer = dataset.layer(index)?;
		let name = layer.name().to_string();
		let mut layer_stats = LayerStatistics {
			name: name.clone(),
			..LayerStatistics::default()
		};

		if driver.skip_layer(layer) {
			log::trace!("skipping layer {name:?}");
			layer_stats.skipped = true;
			stats.layers.push(layer_stats);
			continue;
		}
		if stats.truncated {
			stats.layers.push(layer_stats);
			continue;
		}

		let normalizer = CoordinateNormalizer::new(layer.spatial_ref(), transforms);
		let mut native_envelope: Option<Envelope> = None;
		layer.reset_reading();
		loop {
			let feature = match layer.next_feature() {
				Ok(Some(feature)) => feature,
				Ok(None) => break,
				Err(e) => {
					return Err(IngestError::LayerRead {
						layer: name,
						reason: format!("{e:#}"),
					}
					.into());
				}
			};
			if driver.skip_feature(&feature) {
				continue;
			}
			let Some(native) = &feature.geometry else {
				continue;
			};
			let geometry = match native.decode() {
				Ok(geometry) => geometry,
				Err(e) => {
					log::trace!("pre-scan ignores feature {} of {name:?}: {e:#}", feature.fid);
					continue;
				}
			};
			let Some(envelope) = geometry.envelope() else {
				continue;
			};

			match native_envelope.as_mut() {
				Some(e) => e.extend(&envelope),
				None => native_envelope = Some(envelope),
			}
			if matches!(geometry, Geometry::Point(_)) {
				layer_stats.point_count += 1;
			}
			layer_stats.feature_count += geometry.deep_count() as u64;

			if let Some(limit) = limit
				&& stats.feature_count + layer_stats.feature_count > limit
			{
				log::debug!("pre-scan stops after {limit} features");
				stats.truncated = true;
				break;
			}
		}
		layer.reset_reading();

		layer_stats.envelope = native_envelope.and_then(|envelope| match normalizer.transform_envelope(&envelope) {
			Ok(envelope) => Some(envelope),
			Err(e) => {
				log::warn!("failed to transform the bounding box of layer {name:?}: {e:#}");
				None
			}
		});
		layer_stats.level_of_detail = estimate(
			config,
			layer_stats.envelope.as_ref(),
			layer_stats.feature_count,
			layer_stats.point_count,
		);
		log::trace!(
			"layer {name:?}: {} features, {} points, level {}",
			layer_stats.feature_count,
			layer_stats.point_count,
			layer_stats.level_of_detail.level
		);

		if let Some(envelope) = &layer_stats.envelope {
			match stats.envelope.as_mut() {
				Some(e) => e.extend(envelope),
				None => stats.envelope = Some(*envelope),
			}
		}
		stats.feature_count += layer_stats.feature_count;
		stats.point_count += layer_stats.point_count;
		stats.layers.push(layer_stats);
	}

	stats.level_of_detail = estimate(config, stats.envelope.as_ref(), stats.feature_count, stats.point_count);
	Ok(stats)
}
