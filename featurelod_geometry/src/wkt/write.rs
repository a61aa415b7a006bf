use crate::{CollectionKind, Coordinates, Dimension, Geometry, PolygonGeometry};
use std::fmt::Write;

enum Step<'a> {
	/// A geometry, written with its keyword if `tagged`.
	Geometry(&'a Geometry, bool),
	Text(&'static str),
}

/// Formats a geometry as WKT, e.g. `POLYGON Z ((0 0 1, 1 0 1, 1 1 1, 0 0 1))`.
///
/// A collection whose members do not match its kind is written as a geometry collection.
#[must_use]
pub fn to_wkt(geometry: &Geometry) -> String {
	let has_z = geometry.dimension() == Dimension::Xyz;
	let dimension = if has_z { " Z" } else { "" };
	let mut out = String::new();

	let mut stack = vec![Step::Geometry(geometry, true)];
	while let Some(step) = stack.pop() {
		let (geometry, tagged) = match step {
			Step::Text(text) => {
				out.push_str(text);
				continue;
			}
			Step::Geometry(geometry, tagged) => (geometry, tagged),
		};
		let keyword = match geometry {
			Geometry::Point(_) => "POINT",
			Geometry::LineString(_) => "LINESTRING",
			Geometry::Polygon(_) => "POLYGON",
			Geometry::Collection(c) => match effective_kind(c) {
				CollectionKind::MultiPoint => "MULTIPOINT",
				CollectionKind::MultiLineString => "MULTILINESTRING",
				CollectionKind::MultiPolygon => "MULTIPOLYGON",
				CollectionKind::GeometryCollection => "GEOMETRYCOLLECTION",
			},
		};
		if tagged {
			out.push_str(keyword);
			out.push_str(dimension);
			out.push(' ');
		}
		match geometry {
			Geometry::Point(point) => {
				out.push('(');
				write_coordinates(&mut out, &point.0, has_z);
				out.push(')');
			}
			Geometry::LineString(line) => write_list(&mut out, &line.0, has_z),
			Geometry::Polygon(polygon) => write_polygon(&mut out, polygon, has_z),
			Geometry::Collection(collection) => {
				if collection.children.is_empty() {
					out.push_str("EMPTY");
					continue;
				}
				let tag_children = effective_kind(collection) == CollectionKind::GeometryCollection;
				out.push('(');
				stack.push(Step::Text(")"));
				for (index, child) in collection.children.iter().enumerate().rev() {
					stack.push(Step::Geometry(child, tag_children));
					if index > 0 {
						stack.push(Step::Text(", "));
					}
				}
			}
		}
	}
	out
}

fn effective_kind(collection: &crate::CollectionGeometry) -> CollectionKind {
	if collection.verify().is_ok() {
		collection.kind
	} else {
		CollectionKind::GeometryCollection
	}
}

fn write_coordinates(out: &mut String, point: &Coordinates, has_z: bool) {
	let _ = write!(out, "{} {}", point.x(), point.y());
	if has_z {
		let _ = write!(out, " {}", point.z().unwrap_or(0.0));
	}
}

fn write_list(out: &mut String, points: &[Coordinates], has_z: bool) {
	if points.is_empty() {
		out.push_str("EMPTY");
		return;
	}
	out.push('(');
	for (index, point) in points.iter().enumerate() {
		if index > 0 {
			out.push_str(", ");
		}
		write_coordinates(out, point, has_z);
	}
	out.push(')');
}

fn write_polygon(out: &mut String, polygon: &PolygonGeometry, has_z: bool) {
	if polygon.0.is_empty() {
		out.push_str("EMPTY");
		return;
	}
	out.push('(');
	for (index, ring) in polygon.0.iter().enumerate() {
		if index > 0 {
			out.push_str(", ");
		}
		write_list(out, &ring.0, has_z);
	}
	out.push(')');
}
