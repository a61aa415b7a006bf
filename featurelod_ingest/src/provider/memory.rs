use super::{Dataset, FieldDefinition, Layer, NativeFeature, SpatialRef};
use anyhow::{Result, anyhow, bail};

/// A dataset held in memory. Used for embedding and as the target of the bundled readers.
#[derive(Clone, Debug)]
pub struct MemoryDataset {
	driver_name: String,
	layers: Vec<MemoryLayer>,
}

impl MemoryDataset {
	pub fn new(driver_name: &str, layers: Vec<MemoryLayer>) -> Self {
		Self {
			driver_name: driver_name.to_string(),
			layers,
		}
	}

	pub fn boxed(self) -> Box<dyn Dataset> {
		Box::new(self)
	}
}

impl Dataset for MemoryDataset {
	fn driver_name(&self) -> &str {
		&self.driver_name
	}

	fn layer_count(&self) -> usize {
		self.layers.len()
	}

	fn layer(&mut self, index: usize) -> Result<&mut dyn Layer> {
		let count = self.layers.len();
		self
			.layers
			.get_mut(index)
			.map(|layer| layer as &mut dyn Layer)
			.ok_or_else(|| anyhow!("layer index {index} out of range, dataset has {count} layers"))
	}
}

#[derive(Clone, Debug)]
pub struct MemoryLayer {
	name: String,
	fields: Vec<FieldDefinition>,
	spatial_ref: Option<SpatialRef>,
	features: Vec<NativeFeature>,
	position: usize,
	read_error: Option<(usize, String)>,
}

impl MemoryLayer {
	pub fn new(name: &str, fields: Vec<FieldDefinition>) -> Self {
		Self {
			name: name.to_string(),
			fields,
			spatial_ref: None,
			features: Vec::new(),
			position: 0,
			read_error: None,
		}
	}

	#[must_use]
	pub fn with_spatial_ref(mut self, spatial_ref: SpatialRef) -> Self {
		self.spatial_ref = Some(spatial_ref);
		self
	}

	#[must_use]
	pub fn with_features(mut self, features: impl IntoIterator<Item = NativeFeature>) -> Self {
		self.features.extend(features);
		self
	}

	/// Makes the read of the feature at `index` fail once per pass with `message`.
	#[must_use]
	pub fn with_read_error_at(mut self, index: usize, message: &str) -> Self {
		self.read_error = Some((index, message.to_string()));
		self
	}

	pub fn push_feature(&mut self, feature: NativeFeature) {
		self.features.push(feature);
	}

	pub fn len(&self) -> usize {
		self.features.len()
	}

	pub fn is_empty(&self) -> bool {
		self.features.is_empty()
	}
}

impl Layer for MemoryLayer {
	fn name(&self) -> &str {
		&self.name
	}

	fn fields(&self) -> &[FieldDefinition] {
		&self.fields
	}

	fn spatial_ref(&self) -> Option<&SpatialRef> {
		self.spatial_ref.as_ref()
	}

	fn reset_reading(&mut self) {
		self.position = 0;
	}

	fn next_feature(&mut self) -> Result<Option<NativeFeature>> {
		let position = self.position;
		if position >= self.features.len() {
			return Ok(None);
		}
		self.position += 1;
		if let Some((index, message)) = &self.read_error
			&& *index == position
		{
			bail!("{message}");
		}
		Ok(Some(self.features[position].clone()))
	}
}
