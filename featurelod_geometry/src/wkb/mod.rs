//! Well-known binary.
//!
//! The reader accepts both byte orders (per nested geometry), ISO type codes for Z, M and ZM
//! variants and the PostGIS extended flags, including an embedded SRID. Measures are dropped.
//! The writer produces little-endian ISO WKB.

mod read;
mod write;

pub use read::parse_wkb;
pub use write::to_wkb;

use crate::CollectionKind;

/// Deepest collection nesting accepted when reading.
pub const MAX_DEPTH: usize = 64;

impl crate::Geometry {
	pub fn to_wkb(&self) -> anyhow::Result<Vec<u8>> {
		to_wkb(self)
	}
}

pub(crate) fn type_code(kind: CollectionKind) -> u32 {
	match kind {
		CollectionKind::MultiPoint => 4,
		CollectionKind::MultiLineString => 5,
		CollectionKind::MultiPolygon => 6,
		CollectionKind::GeometryCollection => 7,
	}
}

pub(crate) fn collection_kind(code: u32) -> Option<CollectionKind> {
	match code {
		4 => Some(CollectionKind::MultiPoint),
		5 => Some(CollectionKind::MultiLineString),
		6 => Some(CollectionKind::MultiPolygon),
		7 => Some(CollectionKind::GeometryCollection),
		_ => None,
	}
}
