use crate::{Geometry, LineStringGeometry, PointGeometry, PolygonGeometry};

/// Replaces degenerate leaf geometries by the simplest geometry that still represents them.
///
/// - a line string with fewer than 2 vertices becomes a point at its first vertex
/// - a polygon without an exterior ring is dropped
/// - a polygon whose exterior ring has a single vertex becomes a point
/// - a polygon whose exterior ring has fewer than 4 vertices, or exactly 4 vertices without being
///   closed, becomes a line string through the ring's vertices
///
/// Returns `None` if nothing is left to emit. Collections are returned unchanged.
#[must_use]
pub fn massage(geometry: Geometry) -> Option<Geometry> {
	match geometry {
		Geometry::LineString(line) if line.0.len() < 2 => line.0.first().map(|c| PointGeometry(*c).into()),
		Geometry::Polygon(polygon) => massage_polygon(polygon),
		other => Some(other),
	}
}

fn massage_polygon(polygon: PolygonGeometry) -> Option<Geometry> {
	let exterior = polygon.exterior()?;
	match exterior.len() {
		0 => None,
		1 => Some(PointGeometry(exterior.0[0]).into()),
		n if n < 4 || (n == 4 && !exterior.is_closed()) => Some(LineStringGeometry(exterior.0.clone()).into()),
		_ => Some(polygon.into()),
	}
}
