use crate::provider::{FieldDefinition, FieldValue, NativeFeature};
use std::fmt;

/// A typed attribute value. Dates and times are kept as text.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
	String(String),
	Int(i32),
	Long(i64),
	Double(f64),
	Blob(Vec<u8>),
	StringArray(Vec<String>),
	IntArray(Vec<i32>),
	LongArray(Vec<i64>),
	DoubleArray(Vec<f64>),
}

impl From<FieldValue> for AttributeValue {
	fn from(value: FieldValue) -> Self {
		match value {
			FieldValue::Date(v) | FieldValue::Time(v) | FieldValue::DateTime(v) | FieldValue::String(v) => {
				AttributeValue::String(v)
			}
			FieldValue::Integer(v) => AttributeValue::Int(v),
			FieldValue::Integer64(v) => AttributeValue::Long(v),
			FieldValue::Real(v) => AttributeValue::Double(v),
			FieldValue::Binary(v) => AttributeValue::Blob(v),
			FieldValue::StringList(v) => AttributeValue::StringArray(v),
			FieldValue::IntegerList(v) => AttributeValue::IntArray(v),
			FieldValue::Integer64List(v) => AttributeValue::LongArray(v),
			FieldValue::RealList(v) => AttributeValue::DoubleArray(v),
		}
	}
}

impl fmt::Display for AttributeValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fn list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
			write!(f, "[")?;
			for (i, value) in values.iter().enumerate() {
				if i > 0 {
					write!(f, ",")?;
				}
				write!(f, "{value}")?;
			}
			write!(f, "]")
		}

		match self {
			AttributeValue::String(v) => write!(f, "{v:?}"),
			AttributeValue::Int(v) => write!(f, "{v}"),
			AttributeValue::Long(v) => write!(f, "{v}"),
			AttributeValue::Double(v) => write!(f, "{v}"),
			AttributeValue::Blob(v) => write!(f, "<{} bytes>", v.len()),
			AttributeValue::StringArray(v) => {
				let quoted: Vec<String> = v.iter().map(|s| format!("{s:?}")).collect();
				list(f, &quoted)
			}
			AttributeValue::IntArray(v) => list(f, v),
			AttributeValue::LongArray(v) => list(f, v),
			AttributeValue::DoubleArray(v) => list(f, v),
		}
	}
}

/// Attributes of a feature, in the declaration order of the layer's fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeSet {
	entries: Vec<(String, AttributeValue)>,
}

impl AttributeSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a value. An existing key keeps its position and gets the new value.
	pub fn insert(&mut self, key: &str, value: AttributeValue) {
		if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
			entry.1 = value;
		} else {
			self.entries.push((key.to_string(), value));
		}
	}

	pub fn get(&self, key: &str) -> Option<&AttributeValue> {
		self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(k, _)| k.as_str())
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl<'a> IntoIterator for &'a AttributeSet {
	type Item = (&'a str, &'a AttributeValue);
	type IntoIter = Box<dyn Iterator<Item = Self::Item> + 'a>;

	fn into_iter(self) -> Self::IntoIter {
		Box::new(self.iter())
	}
}

/// Copies every set field of `feature` into an [`AttributeSet`], keyed by field name.
pub fn extract_attributes(fields: &[FieldDefinition], feature: &NativeFeature) -> AttributeSet {
	let mut attributes = AttributeSet::new();
	for (index, field) in fields.iter().enumerate() {
		if let Some(value) = feature.value(index) {
			attributes.insert(&field.name, value.clone().into());
		}
	}
	attributes
}
