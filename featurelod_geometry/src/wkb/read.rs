use super::{MAX_DEPTH, collection_kind};
use crate::{
	CollectionGeometry, Coordinates, Geometry, LineStringGeometry, PointGeometry, PolygonGeometry, RingGeometry,
	binary::{BinaryReader, Endian},
};
use anyhow::{Context, Result, bail, ensure};

const EWKB_Z: u32 = 0x8000_0000;
const EWKB_M: u32 = 0x4000_0000;
const EWKB_SRID: u32 = 0x2000_0000;

struct Header {
	endian: Endian,
	code: u32,
	has_z: bool,
	has_m: bool,
}

/// Decodes a WKB or EWKB blob. The whole input must be consumed.
pub fn parse_wkb(bytes: &[u8]) -> Result<Geometry> {
	let mut reader = BinaryReader::new(bytes);
	let geometry = read_geometry(&mut reader, 0).context("failed to parse WKB")?;
	ensure!(
		reader.remaining() == 0,
		"failed to parse WKB: {} trailing bytes",
		reader.remaining()
	);
	Ok(geometry)
}

fn read_header(reader: &mut BinaryReader) -> Result<Header> {
	let endian = Endian::from_flag(reader.read_u8()?)?;
	let raw = reader.read_u32(endian)?;
	if raw & EWKB_SRID != 0 {
		reader.read_u32(endian)?;
	}
	let base = raw & 0x0FFF_FFFF;
	let (iso_z, iso_m) = match base / 1000 {
		0 => (false, false),
		1 => (true, false),
		2 => (false, true),
		3 => (true, true),
		_ => bail!("unknown geometry type {raw:#x}"),
	};
	Ok(Header {
		endian,
		code: base % 1000,
		has_z: iso_z || raw & EWKB_Z != 0,
		has_m: iso_m || raw & EWKB_M != 0,
	})
}

fn read_geometry(reader: &mut BinaryReader, depth: usize) -> Result<Geometry> {
	ensure!(depth <= MAX_DEPTH, "geometry is nested deeper than {MAX_DEPTH} levels");
	let header = read_header(reader)?;
	let Header {
		endian,
		has_z,
		has_m,
		..
	} = header;
	let vertex_size = 8 * (2 + u64::from(has_z) + u64::from(has_m));

	let read_points = |reader: &mut BinaryReader| -> Result<Vec<Coordinates>> {
		let count = reader.read_u32(endian)?;
		reader.ensure_remaining(count, vertex_size)?;
		(0..count)
			.map(|_| reader.read_coordinates(endian, has_z, has_m))
			.collect()
	};

	Ok(match header.code {
		1 => {
			let point = reader.read_coordinates(endian, has_z, has_m)?;
			ensure!(
				!(point.x().is_nan() && point.y().is_nan()),
				"empty points can not be represented"
			);
			PointGeometry(point).into()
		}
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
				bail!("unknown geometry type {code}");
			};
			let count = reader.read_u32(endian)?;
			// smallest member: byte order, type and an empty count
			reader.ensure_remaining(count, 9)?;
			let children = (0..count)
				.map(|_| read_geometry(reader, depth + 1))
				.collect::<Result<Vec<_>>>()?;
			let collection = CollectionGeometry::new(kind, children);
			collection.verify()?;
			Geometry::Collection(collection)
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::CollectionKind;
	use pretty_assertions::assert_eq;

	fn hex(text: &str) -> Vec<u8> {
		(0..text.len())
			.step_by(2)
			.map(|i| u8::from_str_radix(&text[i..i + 2], 16).unwrap())
			.collect()
	}

	#[test]
	fn big_endian_point() {
		let bytes = hex("000000000140000000000000004010000000000000");
		assert_eq!(parse_wkb(&bytes).unwrap(), Geometry::new_point([2.0, 4.0]));
	}

	#[test]
	fn little_endian_line_string() {
		let bytes = hex("010200000002000000000000000000F03F000000000000004000000000000008400000000000001040");
		assert_eq!(
			parse_wkb(&bytes).unwrap(),
			Geometry::new_line_string(vec![[1.0, 2.0], [3.0, 4.0]])
		);
	}

	#[test]
	fn ewkb_point_with_srid_and_z() {
		// SRID=4326;POINT Z (1 2 3)
		let bytes = hex("01010000A0E6100000000000000000F03F00000000000000400000000000000840");
		assert_eq!(parse_wkb(&bytes).unwrap(), Geometry::new_point([1.0, 2.0, 3.0]));
	}

	#[test]
	fn iso_point_zm_drops_measure() {
		let mut bytes = vec![1];
		bytes.extend(3001u32.to_le_bytes());
		for v in [1.0f64, 2.0, 3.0, 4.0] {
			bytes.extend(v.to_le_bytes());
		}
		assert_eq!(parse_wkb(&bytes).unwrap(), Geometry::new_point([1.0, 2.0, 3.0]));
	}

	#[test]
	fn mixed_byte_order_collection() {
		let mut bytes = vec![1];
		bytes.extend(4u32.to_le_bytes());
		bytes.extend(1u32.to_le_bytes());
		bytes.push(0);
		bytes.extend(1u32.to_be_bytes());
		bytes.extend(5.0f64.to_be_bytes());
		bytes.extend(6.0f64.to_be_bytes());
		assert_eq!(
			parse_wkb(&bytes).unwrap(),
			Geometry::new_collection(CollectionKind::MultiPoint, vec![Geometry::new_point([5.0, 6.0])])
		);
	}

	#[test]
	fn errors() {
		let err = |bytes: &[u8]| format!("{:#}", parse_wkb(bytes).unwrap_err());

		assert_eq!(err(&[]), "failed to parse WKB: failed to fill whole buffer");
		assert_eq!(err(&[7]), "failed to parse WKB: invalid byte order flag 7");
		assert_eq!(err(&hex("0109000000")), "failed to parse WKB: unknown geometry type 9");

		// line string claiming a million points
		assert!(err(&hex("010200000040420F00")).contains("exceeds the 0 remaining bytes"));

		// POINT EMPTY as written by GEOS
		let mut nan_point = hex("0101000000");
		nan_point.extend(f64::NAN.to_le_bytes());
		nan_point.extend(f64::NAN.to_le_bytes());
		assert!(err(&nan_point).contains("empty points"));

		let mut trailing = hex("010100000000000000000000000000000000000000");
		trailing.push(0);
		assert_eq!(err(&trailing), "failed to parse WKB: 1 trailing bytes");

		// MULTIPOINT containing a LINESTRING
		let mut wrong_member = hex("010400000001000000");
		wrong_member.extend(hex("010200000000000000"));
		assert!(err(&wrong_member).contains("MultiPoint must not contain a LineString"));
	}

	#[test]
	fn nesting_limit() {
		let mut bytes = Vec::new();
		for _ in 0..=MAX_DEPTH {
			bytes.push(1);
			bytes.extend(7u32.to_le_bytes());
			bytes.extend(1u32.to_le_bytes());
		}
		bytes.extend(hex("010200000000000000"));
		assert!(format!("{:#}", parse_wkb(&bytes).unwrap_err()).contains("nested deeper than 64 levels"));
	}
}
