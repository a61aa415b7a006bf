//! Engine configuration, read from YAML.
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```yaml
//! dpi: 96
//! level_of_detail:
//!   scope: dataset
//!   clamp: true
//!   area_formula: legacy
//!   density_threshold: 5000
//!   prescan_feature_limit: 1000
//! gdal:
//!   vsi_prefix: /vsicurl/
//! ```

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::{
	fs::File,
	io::{BufReader, Read},
	path::Path,
};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
	/// Resolution of the display the features are rendered on.
	pub dpi: f64,

	/// Level of detail estimation
	pub level_of_detail: LevelOfDetailConfig,

	/// Options for datasets opened through GDAL
	pub gdal: GdalConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct LevelOfDetailConfig {
	/// Which statistics `min_resolution` reports: the whole dataset or the current layer.
	pub scope: LodScope,

	/// Clamp the level into `0..=21` after the density adjustment.
	pub clamp: bool,

	pub area_formula: AreaFormula,

	/// Number of leaf features above which the level is raised for dense datasets.
	pub density_threshold: u64,

	/// Stop the pre-scan once this many leaf features have been counted.
	pub prescan_feature_limit: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct GdalConfig {
	/// Prefix prepended to every dataset path, e.g. `/vsicurl/`.
	pub vsi_prefix: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LodScope {
	#[default]
	Dataset,
	Layer,
}

/// Variant of the Mapnik quadrilateral area estimate.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AreaFormula {
	/// Numerically identical to the estimate existing thresholds were tuned against.
	#[default]
	Legacy,
	/// Exact area of the projected quadrilateral.
	Corrected,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			dpi: 96.0,
			level_of_detail: LevelOfDetailConfig::default(),
			gdal: GdalConfig::default(),
		}
	}
}

impl Default for LevelOfDetailConfig {
	fn default() -> Self {
		Self {
			scope: LodScope::Dataset,
			clamp: true,
			area_formula: AreaFormula::Legacy,
			density_threshold: 5000,
			prescan_feature_limit: None,
		}
	}
}

impl Config {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		let config: Config = serde_yaml_ng::from_reader(reader)?;
		config.check()?;
		Ok(config)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		if text.trim().is_empty() {
			return Ok(Config::default());
		}
		let config: Config = serde_yaml_ng::from_str(text)?;
		config.check()?;
		Ok(config)
	}

	fn check(&self) -> Result<()> {
		ensure!(
			self.dpi.is_finite() && self.dpi > 0.0,
			"dpi must be a positive number, got {}",
			self.dpi
		);
		Ok(())
	}

	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path).with_context(|| format!("Failed to open config file {path:?}"))?;
		Config::from_reader(BufReader::new(file)).with_context(|| format!("Failed to parse config file {path:?}"))
	}

	/// Minimum pixel area a layer must cover on screen: `64 * ceil((dpi / 96)^2)`.
	///
	/// Saturates at `u32::MAX`.
	#[must_use]
	pub fn area_threshold(&self) -> u32 {
		let factor = (self.dpi / 96.0).powi(2).ceil();
		(64.0 * factor).min(f64::from(u32::MAX)) as u32
	}
}
