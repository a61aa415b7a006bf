use crate::provider::{FieldDefinition, FieldType, NativeFeature};
use std::path::Path;

/// Name of the feature set of a layer.
///
/// Formats whose layer names are paths use them directly. Otherwise the file name of the dataset
/// names the set, extended by the layer name if the dataset has more than one layer.
pub fn feature_set_name(path: &str, layer_name: &str, layer_count: usize, layer_name_is_path: bool) -> String {
	if layer_name_is_path {
		return layer_name.to_string();
	}
	let file_name = Path::new(path)
		.file_name()
		.map_or_else(|| path.to_string(), |name| name.to_string_lossy().into_owned());
	if layer_count > 1 {
		format!("{file_name}/{layer_name}")
	} else {
		file_name
	}
}

/// The value of the first candidate field that is a set, non-blank string field of `feature`.
///
/// The value is cut at its first line break and trailing whitespace is removed.
pub fn resolve_name(candidates: &[String], fields: &[FieldDefinition], feature: &NativeFeature) -> Option<String> {
	candidates.iter().find_map(|candidate| {
		let index = fields.iter().position(|field| field.name == *candidate)?;
		if fields[index].field_type != FieldType::String {
			return None;
		}
		let value = feature.value(index)?.as_str()?;
		if value.trim().is_empty() {
			return None;
		}
		let line = value.split('\n').next().unwrap_or_default();
		Some(line.trim_end().to_string())
	})
}

/// Display name of one leaf of `feature`.
///
/// Falls back to `<layer>.<fid>` if no name field resolves, or if the resolved name is empty or
/// contains `UNK`. Leaves of multi-geometries get their index appended.
pub fn feature_name(
	layer_name: &str,
	candidates: &[String],
	fields: &[FieldDefinition],
	feature: &NativeFeature,
	leaf_index: Option<usize>,
) -> String {
	let name = resolve_name(candidates, fields, feature)
		.filter(|name| !name.is_empty() && !name.contains("UNK"))
		.unwrap_or_else(|| format!("{}.{}", last_path_segment(layer_name), feature.fid));
	match leaf_index {
		Some(index) => format!("{name}.{index}"),
		None => name,
	}
}

/// The part of `layer_name` after the last `/` that is not escaped by a backslash.
fn last_path_segment(layer_name: &str) -> &str {
	let bytes = layer_name.as_bytes();
	let mut end = layer_name.len();
	while let Some(index) = layer_name[..end].rfind('/') {
		if index > 0 && bytes[index - 1] == b'\\' {
			end = index;
			continue;
		}
		return &layer_name[index + 1..];
	}
	layer_name
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::provider::FieldValue;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	fn string_fields(names: &[&str]) -> Vec<FieldDefinition> {
		names.iter().map(|name| FieldDefinition::new(name, FieldType::String)).collect()
	}

	fn feature(values: &[Option<&str>]) -> NativeFeature {
		NativeFeature::new(42).with_values(
			values
				.iter()
				.map(|value| value.map(|v| FieldValue::String(v.to_string())))
				.collect(),
		)
	}

	fn candidates(names: &[&str]) -> Vec<String> {
		names.iter().map(|name| name.to_string()).collect()
	}

	#[rstest]
	#[case("roads.shp", "roads", 1, false, "roads.shp")]
	#[case("data.gpkg", "roads", 3, false, "data.gpkg/roads")]
	#[case("/data/in/roads.gpkg", "roads", 3, false, "roads.gpkg/roads")]
	#[case("/data/in/roads.shp", "roads", 1, false, "roads.shp")]
	#[case("data/in/places.kml", "Folder/Places", 1, true, "Folder/Places")]
	#[case("doc.kml", "Folder/Places", 3, true, "Folder/Places")]
	fn feature_set_names(
		#[case] path: &str,
		#[case] layer: &str,
		#[case] count: usize,
		#[case] is_path: bool,
		#[case] expected: &str,
	) {
		assert_eq!(feature_set_name(path, layer, count, is_path), expected);
	}

	#[rstest]
	#[case("places", "places")]
	#[case("Folder/Places", "Places")]
	#[case("a/b/c", "c")]
	#[case("a/b\\/c", "b\\/c")]
	#[case("a\\/b", "a\\/b")]
	#[case("/root", "root")]
	fn path_segments(#[case] layer: &str, #[case] expected: &str) {
		assert_eq!(last_path_segment(layer), expected);
	}

	#[test]
	fn first_set_string_field_wins() {
		let fields = string_fields(&["desc", "name", "namex"]);
		let feature = feature(&[Some("a description"), Some("Berlin"), None]);
		assert_eq!(
			resolve_name(&candidates(&["name", "namex"]), &fields, &feature).as_deref(),
			Some("Berlin")
		);
		assert_eq!(
			resolve_name(&candidates(&["namex", "name"]), &fields, &feature).as_deref(),
			Some("Berlin")
		);
	}

	#[test]
	fn non_string_fields_are_ignored() {
		let fields = vec![
			FieldDefinition::new("name", FieldType::Integer),
			FieldDefinition::new("alt_name", FieldType::String),
		];
		let feature = NativeFeature::new(1).with_values(vec![
			Some(FieldValue::Integer(7)),
			Some(FieldValue::String("Spree".to_string())),
		]);
		assert_eq!(
			resolve_name(&candidates(&["name", "alt_name"]), &fields, &feature).as_deref(),
			Some("Spree")
		);
	}

	#[rstest]
	#[case(Some("Berlin  "), "Berlin")]
	#[case(Some("Berlin\nMitte"), "Berlin")]
	#[case(Some("Berlin \r\nMitte"), "Berlin")]
	#[case(Some("   "), "places.42")]
	#[case(Some("\nBerlin"), "places.42")]
	#[case(Some("UNKNOWN"), "places.42")]
	#[case(Some("unknown"), "unknown")]
	#[case(None, "places.42")]
	fn names_and_fallbacks(#[case] value: Option<&str>, #[case] expected: &str) {
		let fields = string_fields(&["name"]);
		let feature = feature(&[value]);
		assert_eq!(
			feature_name("Folder/places", &candidates(&["name"]), &fields, &feature, None),
			expected
		);
	}

	#[test]
	fn leaf_suffix() {
		let fields = string_fields(&["name"]);
		let named = feature(&[Some("Lake")]);
		let unnamed = feature(&[None]);
		let names = candidates(&["name"]);
		assert_eq!(feature_name("lakes", &names, &fields, &named, Some(0)), "Lake.0");
		assert_eq!(feature_name("lakes", &names, &fields, &unnamed, Some(2)), "lakes.42.2");
	}
}
