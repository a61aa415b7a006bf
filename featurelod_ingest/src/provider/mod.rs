//! The dataset/layer abstraction the engine reads from, plus the bundled providers.
//!
//! Decoding of concrete file formats happens behind these traits. The engine only sees layers
//! that hand out [`NativeFeature`]s one at a time.

mod csv;
mod feature;
#[cfg(feature = "gdal")]
mod gdal;
mod memory;

pub use csv::{CsvOpener, read_csv_dataset};
pub use feature::*;
#[cfg(feature = "gdal")]
pub use gdal::{GDAL_EXTENSIONS, GdalOpener, normalize_path};
pub use memory::{MemoryDataset, MemoryLayer};

use anyhow::Result;

/// Opens a dataset by path.
pub trait DatasetOpener {
	fn open(&self, path: &str) -> Result<Box<dyn Dataset>>;
}

impl<F> DatasetOpener for F
where
	F: Fn(&str) -> Result<Box<dyn Dataset>>,
{
	fn open(&self, path: &str) -> Result<Box<dyn Dataset>> {
		self(path)
	}
}

/// An opened, read-only dataset made of layers.
pub trait Dataset {
	/// Name of the format driver, used to look up the driver policy.
	fn driver_name(&self) -> &str;

	fn layer_count(&self) -> usize;

	fn layer(&mut self, index: usize) -> Result<&mut dyn Layer>;
}

/// A sequential cursor over the features of one layer.
pub trait Layer {
	fn name(&self) -> &str;

	fn fields(&self) -> &[FieldDefinition];

	fn spatial_ref(&self) -> Option<&SpatialRef>;

	/// Rewinds the cursor to the first feature.
	fn reset_reading(&mut self);

	/// Returns the next feature, or `None` once the layer is exhausted.
	fn next_feature(&mut self) -> Result<Option<NativeFeature>>;
}
