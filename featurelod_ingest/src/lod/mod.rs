//! Level of detail: the coarsest zoom level at which a dataset covers enough pixels to be drawn.
//!
//! The estimate works on the WGS84 bounding box of a dataset. Starting from a guess derived from
//! the area at level 0, it searches for the lowest level where the box covers at least the area
//! threshold of [`Config::area_threshold`]. Dense datasets are pushed to higher levels.

mod area;
mod prescan;

pub use area::mapnik_area;
pub use prescan::{DatasetStatistics, LayerStatistics, prescan};

use featurelod_core::{AreaFormula, Config, Envelope, mapnik};

pub const MAX_LEVEL: u32 = 21;

/// Substitute for a zero area at level 0, so the initial guess stays finite.
const MIN_AREA: f64 = 0.0002;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelOfDetail {
	pub level: u32,
	/// Meters per pixel at the equator for `level`.
	pub min_resolution: f64,
}

impl LevelOfDetail {
	pub fn new(level: u32) -> Self {
		Self {
			level,
			min_resolution: mapnik::tile_resolution(level),
		}
	}

	/// Features stay visible down to the finest resolution.
	pub fn max_resolution(&self) -> f64 {
		0.0
	}
}

impl Default for LevelOfDetail {
	fn default() -> Self {
		Self::new(0)
	}
}

/// The lowest zoom level at which `envelope` covers at least `threshold` pixels, in `0..=21`.
pub fn compute_level_of_detail(threshold: u32, envelope: &Envelope, formula: AreaFormula) -> u32 {
	let mut envelope = *envelope;
	envelope.limit_to_mercator();
	let threshold = f64::from(threshold);
	let area = |level: u32| mapnik_area(level, &envelope, formula);

	let mut area0 = area(0);
	if area0 >= threshold {
		return 0;
	}
	if area0 == 0.0 {
		area0 = MIN_AREA;
	}
	let mut level = initial_guess(area0);

	if area(level) >= threshold {
		while level > 1 && area(level - 1) >= threshold {
			level -= 1;
		}
	} else {
		while level < MAX_LEVEL && area(level) < threshold {
			level += 1;
		}
	}
	level
}

/// `ceil(log4(128 / area0))` clamped to `1..=19`.
fn initial_guess(area0: f64) -> u32 {
	(128.0 / area0).log(4.0).ceil().clamp(1.0, 19.0) as u32
}

/// Levels added for datasets with more than `density_threshold` leaf features.
pub fn density_adjustment(feature_count: u64, density_threshold: u64) -> u32 {
	if density_threshold == 0 || feature_count <= density_threshold {
		return 0;
	}
	2 + (feature_count as f64 / density_threshold as f64).log(4.0).ceil() as u32
}

/// Level of detail of a set of features with the given bounding box and counts.
///
/// A single point, or nothing at all, keeps level 0.
pub fn estimate(config: &Config, envelope: Option<&Envelope>, feature_count: u64, point_count: u64) -> LevelOfDetail {
	let Some(envelope) = envelope else {
		return LevelOfDetail::default();
	};
	if feature_count <= 1 && feature_count <= point_count {
		return LevelOfDetail::default();
	}

	let options = &config.level_of_detail;
	let mut level = compute_level_of_detail(config.area_threshold(), envelope, options.area_formula);
	let adjustment = density_adjustment(feature_count, options.density_threshold);
	if adjustment > 0 {
		log::debug!("{feature_count} features exceed the density threshold, adding {adjustment} levels");
		level += adjustment;
	}
	if options.clamp {
		level = level.min(MAX_LEVEL);
	}
	log::debug!("level of detail for {envelope:?}: {level}");
	LevelOfDetail::new(level)
}
