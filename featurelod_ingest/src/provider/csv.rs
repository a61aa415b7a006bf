use super::{Dataset, DatasetOpener, FieldDefinition, FieldType, FieldValue, MemoryDataset, MemoryLayer, NativeFeature, NativeGeometry};
use anyhow::{Context, Result};
use std::path::Path;

/// Opens `.csv` and `.tsv` files with a WKT geometry column.
#[derive(Clone, Copy, Debug, Default)]
pub struct CsvOpener;

impl DatasetOpener for CsvOpener {
	fn open(&self, path: &str) -> Result<Box<dyn Dataset>> {
		Ok(read_csv_dataset(Path::new(path))?.boxed())
	}
}

/// Reads a delimited text file into a single-layer dataset.
///
/// The column named `wkt` or `geometry` (ignoring case) holds the geometry as WKT. All other
/// columns become string fields; empty cells are unset. Feature ids are 1-based row numbers and the
/// layer is named after the file stem. Files ending in `.tsv` are tab separated.
pub fn read_csv_dataset(path: &Path) -> Result<MemoryDataset> {
	let file = std::fs::File::open(path).with_context(|| format!("Failed to open file at path: {path:?}"))?;

	let is_tsv = path
		.extension()
		.is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
	let mut csv_reader = csv::ReaderBuilder::new()
		.delimiter(if is_tsv { b'\t' } else { b',' })
		.from_reader(file);

	let header: Vec<String> = csv_reader
		.headers()
		.context("Failed to read CSV headers")?
		.iter()
		.map(|s| s.trim().to_string())
		.collect();

	let geometry_column = header
		.iter()
		.position(|name| name.eq_ignore_ascii_case("wkt") || name.eq_ignore_ascii_case("geometry"));
	let columns: Vec<usize> = (0..header.len()).filter(|i| Some(*i) != geometry_column).collect();
	let fields = columns
		.iter()
		.map(|i| FieldDefinition::new(&header[*i], FieldType::String))
		.collect();

	let name = path.file_stem().map_or_else(String::new, |s| s.to_string_lossy().to_string());
	let mut layer = MemoryLayer::new(&name, fields);

	for (row, record) in csv_reader.records().enumerate() {
		let record = record.context("Failed to read CSV record")?;
		let mut feature = NativeFeature::new(i64::try_from(row)? + 1);
		if let Some(text) = geometry_column.and_then(|i| record.get(i))
			&& !text.trim().is_empty()
		{
			feature = feature.with_geometry(NativeGeometry::Wkt(text.to_string()));
		}
		feature.values = columns
			.iter()
			.map(|i| {
				record
					.get(*i)
					.filter(|value| !value.is_empty())
					.map(|value| FieldValue::String(value.to_string()))
			})
			.collect();
		layer.push_feature(feature);
	}
	log::trace!("read {} rows from {path:?}", layer.len());

	Ok(MemoryDataset::new("CSV", vec![layer]))
}
