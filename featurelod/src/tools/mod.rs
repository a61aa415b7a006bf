pub mod dump;
pub mod probe;

use anyhow::Result;
use featurelod::{
	core::Config,
	ingest::{Content, Registry},
};
use std::path::Path;

/// Loads the configuration, if one is given, and opens `filename` with the matching registry.
fn open_content(filename: &str, config: Option<&Path>) -> Result<Content> {
	let config = match config {
		Some(path) => Config::from_path(path)?,
		None => Config::default(),
	};
	let registry = Registry::from_config(&config);
	Content::open(filename, &registry, &config)
}
