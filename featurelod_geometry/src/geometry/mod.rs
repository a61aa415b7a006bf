//! The geometry model: a closed sum type over points, line strings, polygons and collections.
//!
//! Collections own their children, so a geometry is always a tree. All walks over that tree
//! (`deep_count`, `envelope`, the coordinate visitors) use an explicit stack instead of recursion,
//! so arbitrarily deep collections can not overflow the call stack.

mod coordinates;
mod types;

pub use coordinates::*;
pub use types::*;

use anyhow::Result;
use featurelod_core::Envelope;
use std::fmt::Debug;

#[derive(Clone, PartialEq)]
pub enum Geometry {
	Point(PointGeometry),
	LineString(LineStringGeometry),
	Polygon(PolygonGeometry),
	Collection(CollectionGeometry),
}

/// Number of ordinates per vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dimension {
	Xy,
	Xyz,
}

impl Geometry {
	pub fn new_point<T>(value: T) -> Self
	where
		Coordinates: From<T>,
	{
		Self::Point(PointGeometry(Coordinates::from(value)))
	}

	pub fn new_line_string<T>(value: Vec<T>) -> Self
	where
		Coordinates: From<T>,
	{
		Self::LineString(LineStringGeometry::from(value))
	}

	pub fn new_polygon<T>(value: Vec<Vec<T>>) -> Self
	where
		Coordinates: From<T>,
	{
		Self::Polygon(PolygonGeometry::from(value))
	}

	#[must_use]
	pub fn new_collection(kind: CollectionKind, children: Vec<Geometry>) -> Self {
		Self::Collection(CollectionGeometry::new(kind, children))
	}

	#[must_use]
	pub fn type_name(&self) -> &'static str {
		match self {
			Geometry::Point(_) => "Point",
			Geometry::LineString(_) => "LineString",
			Geometry::Polygon(_) => "Polygon",
			Geometry::Collection(c) => c.kind.name(),
		}
	}

	#[must_use]
	pub fn is_collection(&self) -> bool {
		matches!(self, Geometry::Collection(_))
	}

	/// Returns `true` if no non-empty leaf can be reached from this geometry.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.deep_count() == 0
	}

	/// Counts the non-empty leaf geometries reachable from this geometry.
	///
	/// A point always counts, a line string counts if it has a vertex and a polygon counts if its
	/// exterior ring has a vertex. These are exactly the leaves [`massage`](crate::massage) keeps.
	#[must_use]
	pub fn deep_count(&self) -> usize {
		let mut count = 0;
		let mut stack = vec![self];
		while let Some(geometry) = stack.pop() {
			match geometry {
				Geometry::Point(_) => count += 1,
				Geometry::LineString(line) => count += usize::from(!line.0.is_empty()),
				Geometry::Polygon(polygon) => count += usize::from(!polygon.is_empty()),
				Geometry::Collection(collection) => stack.extend(collection.children.iter()),
			}
		}
		count
	}

	/// Calls `callback` for every vertex, depth first and in order.
	pub fn for_each_coordinate<F: FnMut(&Coordinates)>(&self, mut callback: F) {
		let mut stack = vec![self];
		while let Some(geometry) = stack.pop() {
			match geometry {
				Geometry::Point(point) => callback(&point.0),
				Geometry::LineString(line) => line.0.iter().for_each(&mut callback),
				Geometry::Polygon(polygon) => polygon.0.iter().flat_map(|ring| ring.0.iter()).for_each(&mut callback),
				Geometry::Collection(collection) => stack.extend(collection.children.iter().rev()),
			}
		}
	}

	/// Calls `callback` for every vertex, allowing it to modify the vertex in place.
	///
	/// Stops at the first error.
	pub fn for_each_coordinate_mut<F>(&mut self, mut callback: F) -> Result<()>
	where
		F: FnMut(&mut Coordinates) -> Result<()>,
	{
		let mut stack = vec![self];
		while let Some(geometry) = stack.pop() {
			match geometry {
				Geometry::Point(point) => callback(&mut point.0)?,
				Geometry::LineString(line) => {
					for coordinates in &mut line.0 {
						callback(coordinates)?;
					}
				}
				Geometry::Polygon(polygon) => {
					for coordinates in polygon.0.iter_mut().flat_map(|ring| ring.0.iter_mut()) {
						callback(coordinates)?;
					}
				}
				Geometry::Collection(collection) => stack.extend(collection.children.iter_mut().rev()),
			}
		}
		Ok(())
	}

	/// Bounding rectangle of all vertices, or `None` for an empty geometry.
	#[must_use]
	pub fn envelope(&self) -> Option<Envelope> {
		let mut envelope: Option<Envelope> = None;
		self.for_each_coordinate(|c| match envelope.as_mut() {
			Some(e) => e.extend_point(c.x(), c.y()),
			None => envelope = Some(Envelope::from_point(c.x(), c.y())),
		});
		envelope
	}

	/// The dimension of the first vertex; empty geometries are two-dimensional.
	#[must_use]
	pub fn dimension(&self) -> Dimension {
		let mut dimension = None;
		self.for_each_coordinate(|c| {
			if dimension.is_none() {
				dimension = Some(if c.z().is_some() { Dimension::Xyz } else { Dimension::Xy });
			}
		});
		dimension.unwrap_or(Dimension::Xy)
	}

	/// Compares two geometries allowing an absolute difference of `epsilon` per ordinate.
	#[must_use]
	pub fn approx_eq(&self, other: &Geometry, epsilon: f64) -> bool {
		let mut stack = vec![(self, other)];
		let same = |a: &[Coordinates], b: &[Coordinates]| {
			a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.approx_eq(b, epsilon))
		};
		while let Some(pair) = stack.pop() {
			let equal = match pair {
				(Geometry::Point(a), Geometry::Point(b)) => a.0.approx_eq(&b.0, epsilon),
				(Geometry::LineString(a), Geometry::LineString(b)) => same(a.0.as_slice(), b.0.as_slice()),
				(Geometry::Polygon(a), Geometry::Polygon(b)) => {
					a.0.len() == b.0.len() && a.0.iter().zip(&b.0).all(|(a, b)| same(a.0.as_slice(), b.0.as_slice()))
				}
				(Geometry::Collection(a), Geometry::Collection(b)) => {
					if a.kind != b.kind || a.children.len() != b.children.len() {
						false
					} else {
						stack.extend(a.children.iter().zip(&b.children));
						true
					}
				}
				_ => false,
			};
			if !equal {
				return false;
			}
		}
		true
	}
}

impl From<PointGeometry> for Geometry {
	fn from(value: PointGeometry) -> Self {
		Geometry::Point(value)
	}
}

impl From<LineStringGeometry> for Geometry {
	fn from(value: LineStringGeometry) -> Self {
		Geometry::LineString(value)
	}
}

impl From<PolygonGeometry> for Geometry {
	fn from(value: PolygonGeometry) -> Self {
		Geometry::Polygon(value)
	}
}

impl Debug for Geometry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let inner: &dyn Debug = match self {
			Geometry::Point(g) => g,
			Geometry::LineString(g) => g,
			Geometry::Polygon(g) => g,
			Geometry::Collection(g) => g,
		};
		f.debug_tuple(self.type_name()).field(inner).finish()
	}
}
