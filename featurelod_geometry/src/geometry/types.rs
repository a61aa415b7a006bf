use super::{Coordinates, Geometry};
use anyhow::{Result, ensure};
use std::fmt::Debug;

#[derive(Clone, Copy, PartialEq)]
pub struct PointGeometry(pub Coordinates);

#[derive(Clone, PartialEq, Default)]
pub struct LineStringGeometry(pub Vec<Coordinates>);

/// A ring of a polygon. Rings coming from a source are not guaranteed to be closed or long enough;
/// see [`RingGeometry::verify`].
#[derive(Clone, PartialEq, Default)]
pub struct RingGeometry(pub Vec<Coordinates>);

/// A polygon made of rings, the first one being the exterior ring.
#[derive(Clone, PartialEq, Default)]
pub struct PolygonGeometry(pub Vec<RingGeometry>);

/// The tag a collection carries in WKT and WKB.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectionKind {
	MultiPoint,
	MultiLineString,
	MultiPolygon,
	GeometryCollection,
}

#[derive(Clone, PartialEq)]
pub struct CollectionGeometry {
	pub kind: CollectionKind,
	pub children: Vec<Geometry>,
}

impl RingGeometry {
	/// A ring is closed if its first and last vertex share the same position.
	#[must_use]
	pub fn is_closed(&self) -> bool {
		match (self.0.first(), self.0.last()) {
			(Some(first), Some(last)) => first.xy() == last.xy(),
			_ => false,
		}
	}

	/// Checks that the ring has at least 4 vertices and is closed.
	pub fn verify(&self) -> Result<()> {
		ensure!(self.0.len() >= 4, "ring must have at least 4 points");
		ensure!(self.is_closed(), "ring must be closed");
		Ok(())
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl PolygonGeometry {
	#[must_use]
	pub fn exterior(&self) -> Option<&RingGeometry> {
		self.0.first()
	}

	/// A polygon whose exterior ring is missing or has no vertex. Holes alone do not count.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.exterior().is_none_or(RingGeometry::is_empty)
	}
}

impl CollectionKind {
	/// Returns whether `child` may appear inside a collection of this kind.
	#[must_use]
	pub fn accepts(&self, child: &Geometry) -> bool {
		match self {
			CollectionKind::MultiPoint => matches!(child, Geometry::Point(_)),
			CollectionKind::MultiLineString => matches!(child, Geometry::LineString(_)),
			CollectionKind::MultiPolygon => matches!(child, Geometry::Polygon(_)),
			CollectionKind::GeometryCollection => true,
		}
	}

	#[must_use]
	pub fn name(&self) -> &'static str {
		match self {
			CollectionKind::MultiPoint => "MultiPoint",
			CollectionKind::MultiLineString => "MultiLineString",
			CollectionKind::MultiPolygon => "MultiPolygon",
			CollectionKind::GeometryCollection => "GeometryCollection",
		}
	}
}

impl CollectionGeometry {
	#[must_use]
	pub fn new(kind: CollectionKind, children: Vec<Geometry>) -> Self {
		Self { kind, children }
	}

	/// Checks that every direct child matches the collection kind.
	pub fn verify(&self) -> Result<()> {
		for child in &self.children {
			ensure!(
				self.kind.accepts(child),
				"{} must not contain a {}",
				self.kind.name(),
				child.type_name()
			);
		}
		Ok(())
	}
}

impl Debug for PointGeometry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.0.fmt(f)
	}
}

impl Debug for LineStringGeometry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(&self.0).finish()
	}
}

impl Debug for RingGeometry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(&self.0).finish()
	}
}

impl Debug for PolygonGeometry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(&self.0).finish()
	}
}

impl Debug for CollectionGeometry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(&self.children).finish()
	}
}

macro_rules! impl_from_coordinates {
	($($t:ty),*) => {$(
		impl<T> From<Vec<T>> for $t
		where
			Coordinates: From<T>,
		{
			fn from(value: Vec<T>) -> Self {
				Self(value.into_iter().map(Coordinates::from).collect())
			}
		}
	)*}
}

impl_from_coordinates!(LineStringGeometry, RingGeometry);

impl<T> From<Vec<Vec<T>>> for PolygonGeometry
where
	Coordinates: From<T>,
{
	fn from(value: Vec<Vec<T>>) -> Self {
		Self(value.into_iter().map(RingGeometry::from).collect())
	}
}
