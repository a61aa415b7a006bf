use super::type_code;
use crate::{CollectionKind, Coordinates, Dimension, Geometry};
use anyhow::Result;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

/// Encodes a geometry as little-endian ISO WKB.
///
/// Three-dimensional geometries get the `+1000` type codes. A collection whose members do not
/// match its kind is written as a geometry collection.
pub fn to_wkb(geometry: &Geometry) -> Result<Vec<u8>> {
	let has_z = geometry.dimension() == Dimension::Xyz;
	let offset = if has_z { 1000 } else { 0 };
	let mut buffer = Vec::new();

	let mut stack = vec![geometry];
	while let Some(geometry) = stack.pop() {
		buffer.write_u8(1)?;
		match geometry {
			Geometry::Point(point) => {
				buffer.write_u32::<LittleEndian>(1 + offset)?;
				write_coordinates(&mut buffer, &point.0, has_z)?;
			}
			Geometry::LineString(line) => {
				buffer.write_u32::<LittleEndian>(2 + offset)?;
				write_points(&mut buffer, &line.0, has_z)?;
			}
			Geometry::Polygon(polygon) => {
				buffer.write_u32::<LittleEndian>(3 + offset)?;
				buffer.write_u32::<LittleEndian>(u32::try_from(polygon.0.len())?)?;
				for ring in &polygon.0 {
					write_points(&mut buffer, &ring.0, has_z)?;
				}
			}
			Geometry::Collection(collection) => {
				let kind = if collection.verify().is_ok() {
					collection.kind
				} else {
					CollectionKind::GeometryCollection
				};
				buffer.write_u32::<LittleEndian>(type_code(kind) + offset)?;
				buffer.write_u32::<LittleEndian>(u32::try_from(collection.children.len())?)?;
				stack.extend(collection.children.iter().rev());
			}
		}
	}
	Ok(buffer)
}

fn write_points<W: Write>(writer: &mut W, points: &[Coordinates], has_z: bool) -> Result<()> {
	writer.write_u32::<LittleEndian>(u32::try_from(points.len())?)?;
	for point in points {
		write_coordinates(writer, point, has_z)?;
	}
	Ok(())
}

fn write_coordinates<W: Write>(writer: &mut W, point: &Coordinates, has_z: bool) -> Result<()> {
	writer.write_f64::<LittleEndian>(point.x())?;
	writer.write_f64::<LittleEndian>(point.y())?;
	if has_z {
		writer.write_f64::<LittleEndian>(point.z().unwrap_or(0.0))?;
	}
	Ok(())
}
