use super::{MAX_DEPTH, reader::WktReader};
use crate::{
	CollectionGeometry, CollectionKind, Coordinates, Geometry, LineStringGeometry, PointGeometry, PolygonGeometry,
	RingGeometry,
};
use anyhow::{Context, Result, bail};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Tag {
	Point,
	LineString,
	Polygon,
	Collection(CollectionKind),
}

/// Which ordinates follow x and y.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Ordinates {
	Unspecified,
	Z,
	M,
	Zm,
}

/// Parses WKT, optionally prefixed with an EWKT `SRID=<n>;` which is ignored.
///
/// Keywords are case-insensitive and accept the Z, M and ZM modifiers, both separated and
/// appended (`POINT Z`, `POINTZ`). Measures are dropped.
pub fn parse_wkt(text: &str) -> Result<Geometry> {
	let mut reader = WktReader::new(text);
	parse_document(&mut reader).with_context(|| format!("failed to parse WKT {:?}", shorten(text)))
}

fn shorten(text: &str) -> String {
	match text.char_indices().nth(40) {
		Some((index, _)) => format!("{}...", &text[..index]),
		None => text.to_string(),
	}
}

fn parse_document(reader: &mut WktReader) -> Result<Geometry> {
	let mut word = reader.read_word();
	if word == "SRID" {
		reader.expect_byte(b'=')?;
		reader.read_number()?;
		reader.expect_byte(b';')?;
		word = reader.read_word();
	}
	let geometry = parse_tagged(reader, &word, 0)?;
	if !reader.is_at_end() {
		bail!(reader.format_error("unexpected characters after geometry"));
	}
	Ok(geometry)
}

fn parse_tag(word: &str) -> Option<(Tag, Ordinates)> {
	let tag = |base: &str| {
		Some(match base {
			"POINT" => Tag::Point,
			"LINESTRING" => Tag::LineString,
			"POLYGON" => Tag::Polygon,
			"MULTIPOINT" => Tag::Collection(CollectionKind::MultiPoint),
			"MULTILINESTRING" => Tag::Collection(CollectionKind::MultiLineString),
			"MULTIPOLYGON" => Tag::Collection(CollectionKind::MultiPolygon),
			"GEOMETRYCOLLECTION" => Tag::Collection(CollectionKind::GeometryCollection),
			_ => return None,
		})
	};
	if let Some(tag) = tag(word) {
		return Some((tag, Ordinates::Unspecified));
	}
	for (suffix, ordinates) in [("ZM", Ordinates::Zm), ("Z", Ordinates::Z), ("M", Ordinates::M)] {
		if let Some(tag) = word.strip_suffix(suffix).and_then(tag) {
			return Some((tag, ordinates));
		}
	}
	None
}

fn parse_tagged(reader: &mut WktReader, word: &str, depth: usize) -> Result<Geometry> {
	if depth > MAX_DEPTH {
		bail!(reader.format_error(&format!("geometry is nested deeper than {MAX_DEPTH} levels")));
	}
	let Some((tag, mut ordinates)) = parse_tag(word) else {
		if word.is_empty() {
			bail!(reader.format_error("expected a geometry type"));
		}
		bail!(reader.format_error(&format!("unknown geometry type '{word}'")));
	};

	let mut modifier = reader.read_word();
	if ordinates == Ordinates::Unspecified {
		let explicit = match modifier.as_str() {
			"Z" => Some(Ordinates::Z),
			"M" => Some(Ordinates::M),
			"ZM" => Some(Ordinates::Zm),
			_ => None,
		};
		if let Some(explicit) = explicit {
			ordinates = explicit;
			modifier = reader.read_word();
		}
	}
	match modifier.as_str() {
		"" => {}
		"EMPTY" => return empty(reader, tag),
		_ => bail!(reader.format_error(&format!("unexpected keyword '{modifier}'"))),
	}

	Ok(match tag {
		Tag::Point => {
			reader.expect_byte(b'(')?;
			let point = parse_coordinates(reader, ordinates)?;
			reader.expect_byte(b')')?;
			PointGeometry(point).into()
		}
		Tag::LineString => LineStringGeometry(parse_coordinate_list(reader, ordinates)?).into(),
		Tag::Polygon => parse_polygon(reader, ordinates)?.into(),
		Tag::Collection(kind) => {
			reader.expect_byte(b'(')?;
			let mut children = Vec::new();
			loop {
				if let Some(child) = parse_member(reader, kind, ordinates, depth)? {
					children.push(child);
				}
				if !reader.try_byte(b',') {
					break;
				}
			}
			reader.expect_byte(b')')?;
			Geometry::Collection(CollectionGeometry::new(kind, children))
		}
	})
}

fn empty(reader: &WktReader, tag: Tag) -> Result<Geometry> {
	Ok(match tag {
		Tag::Point => bail!(reader.format_error("empty points can not be represented")),
		Tag::LineString => Geometry::LineString(LineStringGeometry::default()),
		Tag::Polygon => Geometry::Polygon(PolygonGeometry::default()),
		Tag::Collection(kind) => Geometry::new_collection(kind, vec![]),
	})
}

/// Parses one member of a collection. Empty points inside a multi point are skipped.
fn parse_member(
	reader: &mut WktReader,
	kind: CollectionKind,
	ordinates: Ordinates,
	depth: usize,
) -> Result<Option<Geometry>> {
	let member = match kind {
		CollectionKind::MultiPoint => {
			if reader.at_number() {
				PointGeometry(parse_coordinates(reader, ordinates)?).into()
			} else if reader.try_byte(b'(') {
				let point = parse_coordinates(reader, ordinates)?;
				reader.expect_byte(b')')?;
				PointGeometry(point).into()
			} else {
				expect_empty(reader)?;
				return Ok(None);
			}
		}
		CollectionKind::MultiLineString => {
			if reader.try_byte(b'(') {
				LineStringGeometry(parse_coordinates_until_close(reader, ordinates)?).into()
			} else {
				expect_empty(reader)?;
				Geometry::LineString(LineStringGeometry::default())
			}
		}
		CollectionKind::MultiPolygon => {
			if reader.try_byte(b'(') {
				PolygonGeometry(parse_rings_until_close(reader, ordinates)?).into()
			} else {
				expect_empty(reader)?;
				Geometry::Polygon(PolygonGeometry::default())
			}
		}
		CollectionKind::GeometryCollection => {
			let word = reader.read_word();
			parse_tagged(reader, &word, depth + 1)?
		}
	};
	Ok(Some(member))
}

fn expect_empty(reader: &mut WktReader) -> Result<()> {
	if reader.read_word() == "EMPTY" {
		Ok(())
	} else {
		Err(reader.format_error("expected '(' or EMPTY"))
	}
}

fn parse_polygon(reader: &mut WktReader, ordinates: Ordinates) -> Result<PolygonGeometry> {
	reader.expect_byte(b'(')?;
	Ok(PolygonGeometry(parse_rings_until_close(reader, ordinates)?))
}

/// Parses rings after an opening parenthesis, up to and including the closing one.
fn parse_rings_until_close(reader: &mut WktReader, ordinates: Ordinates) -> Result<Vec<RingGeometry>> {
	let mut rings = Vec::new();
	loop {
		if reader.try_byte(b'(') {
			rings.push(RingGeometry(parse_coordinates_until_close(reader, ordinates)?));
		} else {
			expect_empty(reader)?;
			rings.push(RingGeometry::default());
		}
		if !reader.try_byte(b',') {
			break;
		}
	}
	reader.expect_byte(b')')?;
	Ok(rings)
}

fn parse_coordinate_list(reader: &mut WktReader, ordinates: Ordinates) -> Result<Vec<Coordinates>> {
	reader.expect_byte(b'(')?;
	parse_coordinates_until_close(reader, ordinates)
}

/// Parses vertices after an opening parenthesis, up to and including the closing one.
fn parse_coordinates_until_close(reader: &mut WktReader, ordinates: Ordinates) -> Result<Vec<Coordinates>> {
	let mut list = vec![parse_coordinates(reader, ordinates)?];
	while reader.try_byte(b',') {
		list.push(parse_coordinates(reader, ordinates)?);
	}
	reader.expect_byte(b')')?;
	Ok(list)
}

fn parse_coordinates(reader: &mut WktReader, ordinates: Ordinates) -> Result<Coordinates> {
	let mut values = [0.0; 4];
	let mut count = 0;
	while reader.at_number() {
		if count == values.len() {
			bail!(reader.format_error("too many ordinates"));
		}
		values[count] = reader.read_number()?;
		count += 1;
	}
	let [x, y, third, _] = values;
	Ok(match (count, ordinates) {
		(2, Ordinates::Unspecified) | (3, Ordinates::M) => Coordinates::new(x, y),
		(3, Ordinates::Unspecified | Ordinates::Z) | (4, Ordinates::Unspecified | Ordinates::Zm) => {
			Coordinates::new_3d(x, y, third)
		}
		(0, _) => bail!(reader.format_error("expected a number")),
		_ => bail!(reader.format_error(&format!("unexpected number of ordinates ({count})"))),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	#[rstest]
	#[case("POINT (1 2)", "Point([1.0, 2.0])")]
	#[case("point(1 2)", "Point([1.0, 2.0])")]
	#[case("POINT Z (1 2 3)", "Point([1.0, 2.0, 3.0])")]
	#[case("POINTZ(1 2 3)", "Point([1.0, 2.0, 3.0])")]
	#[case("POINT M (1 2 3)", "Point([1.0, 2.0])")]
	#[case("POINT ZM (1 2 3 4)", "Point([1.0, 2.0, 3.0])")]
	#[case("POINT (1 2 3)", "Point([1.0, 2.0, 3.0])")]
	#[case("SRID=4326;POINT (1 2)", "Point([1.0, 2.0])")]
	#[case("LINESTRING (0 0, 1.5 -2)", "LineString([[0.0, 0.0], [1.5, -2.0]])")]
	#[case("LINESTRING EMPTY", "LineString([])")]
	#[case("POLYGON ((0 0, 1 0, 1 1, 0 0))", "Polygon([[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]])")]
	#[case("POLYGON EMPTY", "Polygon([])")]
	#[case("MULTIPOINT (1 2, 3 4)", "MultiPoint([Point([1.0, 2.0]), Point([3.0, 4.0])])")]
	#[case("MULTIPOINT ((1 2), (3 4))", "MultiPoint([Point([1.0, 2.0]), Point([3.0, 4.0])])")]
	#[case("MULTIPOINT ((1 2), EMPTY)", "MultiPoint([Point([1.0, 2.0])])")]
	#[case("MULTILINESTRING ((0 0, 1 1), EMPTY)", "MultiLineString([LineString([[0.0, 0.0], [1.0, 1.0]]), LineString([])])")]
	#[case("MULTIPOLYGON (((0 0, 1 0, 0 0)))", "MultiPolygon([Polygon([[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]])])")]
	#[case("GEOMETRYCOLLECTION EMPTY", "GeometryCollection([])")]
	#[case(
		"GEOMETRYCOLLECTION (POINT (1 2), GEOMETRYCOLLECTION (LINESTRING EMPTY))",
		"GeometryCollection([Point([1.0, 2.0]), GeometryCollection([LineString([])])])"
	)]
	fn parses(#[case] wkt: &str, #[case] expected: &str) {
		assert_eq!(format!("{:?}", parse_wkt(wkt).unwrap()), expected);
	}

	#[rstest]
	#[case("", "expected a geometry type at position 0")]
	#[case("CIRCLE (1 2)", "unknown geometry type 'CIRCLE' at position 6")]
	#[case("POINT EMPTY", "empty points can not be represented at position 11")]
	#[case("POINT (1)", "unexpected number of ordinates (1) at position 8")]
	#[case("POINT Z (1 2)", "unexpected number of ordinates (2) at position 12")]
	#[case("POINT (1 2 3 4 5)", "too many ordinates at position 15")]
	#[case("POINT (1 2", "expected ')' at position 10")]
	#[case("POINT (1 2) x", "unexpected characters after geometry at position 12")]
	#[case("LINESTRING (a b)", "expected a number at position 12")]
	#[case("POINT FULL (1 2)", "unexpected keyword 'FULL' at position 10")]
	fn errors(#[case] wkt: &str, #[case] message: &str) {
		let error = parse_wkt(wkt).unwrap_err();
		assert_eq!(error.root_cause().to_string(), message);
		assert!(error.to_string().starts_with("failed to parse WKT"));
	}

	#[test]
	fn nesting_limit() {
		let depth = MAX_DEPTH + 1;
		let wkt = format!(
			"{}POINT (1 2){}",
			"GEOMETRYCOLLECTION (".repeat(depth),
			")".repeat(depth)
		);
		let error = parse_wkt(&wkt).unwrap_err();
		assert!(error.root_cause().to_string().starts_with("geometry is nested deeper than 64 levels"));

		let wkt = format!("{}POINT (1 2){}", "GEOMETRYCOLLECTION (".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
		assert_eq!(parse_wkt(&wkt).unwrap().deep_count(), 1);
	}
}
