use crate::provider::{FieldDefinition, FieldType};
use std::fmt::Debug;

/// Chooses the fields a feature's display name is taken from.
pub trait SchemaPolicy: Debug {
	/// Whether this schema applies to a layer of `path` with the given fields.
	fn matches(&self, path: &str, fields: &[FieldDefinition]) -> bool;

	/// Candidate name fields, most preferred first. May be empty.
	fn name_fields(&self, fields: &[FieldDefinition]) -> Vec<String>;
}

/// Applies to every layer and picks all string fields whose name contains `name`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultSchemaPolicy;

impl SchemaPolicy for DefaultSchemaPolicy {
	fn matches(&self, _path: &str, _fields: &[FieldDefinition]) -> bool {
		true
	}

	/// String fields whose lower-cased, trimmed name contains `name`, in declaration order. A field
	/// called exactly `name` is moved to the front.
	fn name_fields(&self, fields: &[FieldDefinition]) -> Vec<String> {
		let mut result = Vec::new();
		for field in fields.iter().filter(|f| f.field_type == FieldType::String) {
			let key = field.name.trim().to_lowercase();
			if key == "name" {
				result.insert(0, field.name.clone());
			} else if key.contains("name") {
				result.push(field.name.clone());
			}
		}
		result
	}
}

/// Applies only to layers with exactly the given set of columns, ignoring order and case.
#[derive(Clone, Debug)]
pub struct ColumnSchemaPolicy {
	columns: Vec<String>,
	name_column: Option<String>,
}

impl ColumnSchemaPolicy {
	pub fn new(columns: &[&str], name_column: Option<&str>) -> Self {
		Self {
			columns: normalized(columns.iter().copied()),
			name_column: name_column.map(str::to_string),
		}
	}
}

fn normalized<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
	let mut names: Vec<String> = names.map(|name| name.trim().to_lowercase()).collect();
	names.sort();
	names
}

impl SchemaPolicy for ColumnSchemaPolicy {
	fn matches(&self, _path: &str, fields: &[FieldDefinition]) -> bool {
		normalized(fields.iter().map(|f| f.name.as_str())) == self.columns
	}

	fn name_fields(&self, fields: &[FieldDefinition]) -> Vec<String> {
		let mut result = DefaultSchemaPolicy.name_fields(fields);
		if let Some(column) = &self.name_column
			&& let Some(field) = fields.iter().find(|f| f.name.eq_ignore_ascii_case(column))
		{
			result.retain(|name| name != &field.name);
			result.insert(0, field.name.clone());
		}
		result
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	fn strings(names: &[&str]) -> Vec<FieldDefinition> {
		names.iter().map(|n| FieldDefinition::new(n, FieldType::String)).collect()
	}

	#[rstest]
	#[case(&["desc", "name", "namex"], &["name", "namex"])]
	#[case(&["namex", "desc", "name"], &["name", "namex"])]
	#[case(&["Street_Name", " NAME "], &[" NAME ", "Street_Name"])]
	#[case(&["desc", "label"], &[])]
	fn default_name_fields(#[case] names: &[&str], #[case] expected: &[&str]) {
		assert_eq!(DefaultSchemaPolicy.name_fields(&strings(names)), expected);
	}

	#[test]
	fn only_string_fields_are_candidates() {
		let fields = vec![
			FieldDefinition::new("name", FieldType::Integer),
			FieldDefinition::new("username", FieldType::String),
		];
		assert_eq!(DefaultSchemaPolicy.name_fields(&fields), vec!["username"]);
	}

	#[test]
	fn column_schema_requires_exact_set() {
		let schema = ColumnSchemaPolicy::new(&["id", "Label", "kind"], Some("label"));
		assert!(schema.matches("a.csv", &strings(&["kind", "label", "ID"])));
		assert!(!schema.matches("a.csv", &strings(&["kind", "label"])));
		assert!(!schema.matches("a.csv", &strings(&["kind", "label", "id", "name"])));
		assert!(DefaultSchemaPolicy.matches("a.csv", &[]));
	}

	#[test]
	fn column_schema_prefers_name_column() {
		let schema = ColumnSchemaPolicy::new(&["name", "label"], Some("label"));
		assert_eq!(schema.name_fields(&strings(&["name", "label"])), vec!["label", "name"]);
	}
}
