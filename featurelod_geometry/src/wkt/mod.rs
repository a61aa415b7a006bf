//! Well-known text.

mod parse;
mod reader;
mod write;

pub use parse::parse_wkt;
pub use write::to_wkt;

/// Deepest collection nesting accepted when parsing.
pub const MAX_DEPTH: usize = 64;

impl crate::Geometry {
	#[must_use]
	pub fn to_wkt(&self) -> String {
		to_wkt(self)
	}
}
