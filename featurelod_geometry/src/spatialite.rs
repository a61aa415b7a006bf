//! SpatiaLite geometry blobs.
//!
//! ```text
//! 0x00 | endian | srid: i32 | mbr: 4 x f64 | 0x7C | class: i32 | body | 0xFE
//! ```
//!
//! Collection members are prefixed with the entity mark `0x69` and their own class, and share the
//! byte order of the blob. Compressed classes are not supported.

use crate::{
	CollectionGeometry, Coordinates, Dimension, Geometry, LineStringGeometry, PointGeometry, PolygonGeometry,
	RingGeometry,
	binary::{BinaryReader, Endian},
	wkb::{collection_kind, type_code},
};
use anyhow::{Context, Result, bail, ensure};
use byteorder::{LittleEndian, WriteBytesExt};

const START: u8 = 0x00;
const MBR_END: u8 = 0x7C;
const ENTITY: u8 = 0x69;
const END: u8 = 0xFE;
const MAX_DEPTH: usize = 64;

/// Decodes a SpatiaLite blob and returns the geometry together with its SRID.
pub fn parse_spatialite(bytes: &[u8]) -> Result<(Geometry, i32)> {
	parse(bytes).context("failed to parse SpatiaLite blob")
}

fn parse(bytes: &[u8]) -> Result<(Geometry, i32)> {
	let mut reader = BinaryReader::new(bytes);
	ensure!(reader.read_u8()? == START, "missing start marker");
	let endian = Endian::from_flag(reader.read_u8()?)?;
	let srid = reader.read_i32(endian)?;
	for _ in 0..4 {
		reader.read_f64(endian)?;
	}
	ensure!(reader.read_u8()? == MBR_END, "missing MBR end marker");
	let class = reader.read_i32(endian)?;
	let geometry = read_body(&mut reader, endian, class, 0)?;
	ensure!(reader.read_u8()? == END, "missing end marker");
	ensure!(reader.remaining() == 0, "{} trailing bytes", reader.remaining());
	Ok((geometry, srid))
}

fn read_body(reader: &mut BinaryReader, endian: Endian, class: i32, depth: usize) -> Result<Geometry> {
	ensure!(depth <= MAX_DEPTH, "geometry is nested deeper than {MAX_DEPTH} levels");
	let Ok(class_code) = u32::try_from(class) else {
		bail!("unknown geometry class {class}");
	};
	let (has_z, has_m) = match class_code / 1000 {
		0 => (false, false),
		1 => (true, false),
		2 => (false, true),
		3 => (true, true),
		_ => bail!("unsupported geometry class {class}"),
	};
	let vertex_size = 8 * (2 + u64::from(has_z) + u64::from(has_m));
	let read_points = |reader: &mut BinaryReader| -> Result<Vec<Coordinates>> {
		let count = reader.read_u32(endian)?;
		reader.ensure_remaining(count, vertex_size)?;
		(0..count)
			.map(|_| reader.read_coordinates(endian, has_z, has_m))
			.collect()
	};

	Ok(match class_code % 1000 {
		1 => PointGeometry(reader.read_coordinates(endian, has_z, has_m)?).into(),
		2 => LineStringGeometry(read_points(reader)?).into(),
		3 => {
			let count = reader.read_u32(endian)?;
			reader.ensure_remaining(count, 4)?;
			let rings = (0..count)
				.map(|_| read_points(reader).map(RingGeometry))
				.collect::<Result<Vec<_>>>()?;
			PolygonGeometry(rings).into()
		}
		code => {
			let Some(kind) = collection_kind(code) else {
				bail!("unknown geometry class {class}");
			};
			let count = reader.read_u32(endian)?;
			// entity mark, class and an empty count
			reader.ensure_remaining(count, 9)?;
			let mut children = Vec::new();
			for _ in 0..count {
				ensure!(reader.read_u8()? == ENTITY, "missing entity marker");
				let class = reader.read_i32(endian)?;
				children.push(read_body(reader, endian, class, depth + 1)?);
			}
			let collection = CollectionGeometry::new(kind, children);
			collection.verify()?;
			Geometry::Collection(collection)
		}
	})
}

/// Encodes a geometry as little-endian SpatiaLite blob with the given SRID.
///
/// Empty geometries have no bounding rectangle and are rejected.
pub fn to_spatialite(geometry: &Geometry, srid: i32) -> Result<Vec<u8>> {
	let Some(mbr) = geometry.envelope() else {
		bail!("empty geometries can not be encoded as SpatiaLite blob");
	};
	let has_z = geometry.dimension() == Dimension::Xyz;
	let offset = if has_z { 1000 } else { 0 };

	let mut buffer = vec![START, 1];
	buffer.write_i32::<LittleEndian>(srid)?;
	for value in mbr.as_array() {
		buffer.write_f64::<LittleEndian>(value)?;
	}
	buffer.push(MBR_END);

	let mut stack = vec![(geometry, false)];
	while let Some((geometry, is_member)) = stack.pop() {
		if is_member {
			buffer.push(ENTITY);
		}
		let class = match geometry {
			Geometry::Point(_) => 1,
			Geometry::LineString(_) => 2,
			Geometry::Polygon(_) => 3,
			Geometry::Collection(c) => type_code(c.kind),
		};
		buffer.write_i32::<LittleEndian>(i32::try_from(class + offset)?)?;
		match geometry {
			Geometry::Point(point) => write_coordinates(&mut buffer, &point.0, has_z)?,
			Geometry::LineString(line) => write_points(&mut buffer, &line.0, has_z)?,
			Geometry::Polygon(polygon) => {
				buffer.write_u32::<LittleEndian>(u32::try_from(polygon.0.len())?)?;
				for ring in &polygon.0 {
					write_points(&mut buffer, &ring.0, has_z)?;
				}
			}
			Geometry::Collection(collection) => {
				collection.verify()?;
				buffer.write_u32::<LittleEndian>(u32::try_from(collection.children.len())?)?;
				stack.extend(collection.children.iter().rev().map(|child| (child, true)));
			}
		}
	}
	buffer.push(END);
	Ok(buffer)
}

impl Geometry {
	pub fn to_spatialite(&self, srid: i32) -> Result<Vec<u8>> {
		to_spatialite(self, srid)
	}
}

fn write_points(buffer: &mut Vec<u8>, points: &[Coordinates], has_z: bool) -> Result<()> {
	buffer.write_u32::<LittleEndian>(u32::try_from(points.len())?)?;
	for point in points {
		write_coordinates(buffer, point, has_z)?;
	}
	Ok(())
}

fn write_coordinates(buffer: &mut Vec<u8>, point: &Coordinates, has_z: bool) -> Result<()> {
	buffer.write_f64::<LittleEndian>(point.x())?;
	buffer.write_f64::<LittleEndian>(point.y())?;
	if has_z {
		buffer.write_f64::<LittleEndian>(point.z().unwrap_or(0.0))?;
	}
	Ok(())
}
