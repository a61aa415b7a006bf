//! Conversion of [`Geometry`] into the `geo` crate, so its algorithms can be applied to ingested
//! features.

use crate::{CollectionKind, Coordinates, Geometry, PolygonGeometry};

fn line_string(points: &[Coordinates]) -> geo::LineString<f64> {
	geo::LineString(points.iter().map(geo::Coord::from).collect())
}

fn polygon(polygon: &PolygonGeometry) -> geo::Polygon<f64> {
	let mut rings = polygon.0.iter().map(|ring| line_string(&ring.0));
	let exterior = rings.next().unwrap_or_else(|| geo::LineString(vec![]));
	geo::Polygon::new(exterior, rings.collect())
}

impl From<&Geometry> for geo::Geometry<f64> {
	fn from(geometry: &Geometry) -> Self {
		match geometry {
			Geometry::Point(point) => geo::Geometry::Point(geo::Point(geo::Coord::from(&point.0))),
			Geometry::LineString(line) => geo::Geometry::LineString(line_string(&line.0)),
			Geometry::Polygon(p) => geo::Geometry::Polygon(polygon(p)),
			Geometry::Collection(collection) => {
				let children = &collection.children;
				match collection.kind {
					CollectionKind::MultiPoint if collection.verify().is_ok() => geo::Geometry::MultiPoint(geo::MultiPoint(
						children
							.iter()
							.filter_map(|child| match child {
								Geometry::Point(point) => Some(geo::Point(geo::Coord::from(&point.0))),
								_ => None,
							})
							.collect(),
					)),
					CollectionKind::MultiLineString if collection.verify().is_ok() => {
						geo::Geometry::MultiLineString(geo::MultiLineString(
							children
								.iter()
								.filter_map(|child| match child {
									Geometry::LineString(line) => Some(line_string(&line.0)),
									_ => None,
								})
								.collect(),
						))
					}
					CollectionKind::MultiPolygon if collection.verify().is_ok() => geo::Geometry::MultiPolygon(geo::MultiPolygon(
						children
							.iter()
							.filter_map(|child| match child {
								Geometry::Polygon(p) => Some(polygon(p)),
								_ => None,
							})
							.collect(),
					)),
					_ => geo::Geometry::GeometryCollection(geo::GeometryCollection(
						children.iter().map(geo::Geometry::from).collect(),
					)),
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::parse_wkt;
	use approx::assert_relative_eq;
	use geo::{Area, BoundingRect};
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	#[test]
	fn polygon_area() {
		let geometry = parse_wkt("POLYGON ((0 0, 4 0, 4 4, 0 4, 0 0), (1 1, 2 1, 2 2, 1 2, 1 1))").unwrap();
		let geo_geometry = geo::Geometry::from(&geometry);
		assert_relative_eq!(geo_geometry.unsigned_area(), 15.0);
	}

	#[test]
	fn bounding_rect() {
		let geometry = parse_wkt("GEOMETRYCOLLECTION (POINT (-1 2), LINESTRING (0 0, 3 4))").unwrap();
		let rect = geo::Geometry::from(&geometry).bounding_rect().unwrap();
		assert_eq!((rect.min().x, rect.min().y, rect.max().x, rect.max().y), (-1.0, 0.0, 3.0, 4.0));
	}

	#[test]
	fn mixed_multi_point_becomes_geometry_collection() {
		let geometry = Geometry::new_collection(
			CollectionKind::MultiPoint,
			vec![Geometry::new_point([1.0, 2.0]), Geometry::new_line_string(vec![[0.0, 0.0], [1.0, 1.0]])],
		);
		match geo::Geometry::from(&geometry) {
			geo::Geometry::GeometryCollection(collection) => assert_eq!(collection.0.len(), 2),
			other => panic!("unexpected {other:?}"),
		}
	}

	#[rstest]
	#[case("POINT (1 2)")]
	#[case("LINESTRING (0 0, 1 1)")]
	#[case("POLYGON ((0 0, 1 0, 1 1, 0 0))")]
	#[case("MULTIPOINT ((1 2), (3 4))")]
	#[case("MULTILINESTRING ((0 0, 1 1))")]
	#[case("MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)))")]
	#[case("GEOMETRYCOLLECTION (POINT (1 2))")]
	fn keeps_geometry_types(#[case] wkt: &str) {
		let geometry = parse_wkt(wkt).unwrap();
		let converted = geo::Geometry::from(&geometry);
		let same_type = matches!(
			(geometry.type_name(), &converted),
			("Point", geo::Geometry::Point(_))
				| ("LineString", geo::Geometry::LineString(_))
				| ("Polygon", geo::Geometry::Polygon(_))
				| ("MultiPoint", geo::Geometry::MultiPoint(_))
				| ("MultiLineString", geo::Geometry::MultiLineString(_))
				| ("MultiPolygon", geo::Geometry::MultiPolygon(_))
				| ("GeometryCollection", geo::Geometry::GeometryCollection(_))
		);
		assert!(same_type, "{} became {converted:?}", geometry.type_name());
	}
}
