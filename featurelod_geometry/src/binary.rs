//! Reading primitives for binary geometry encodings whose byte order is only known at runtime.

use anyhow::{Result, bail};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// Byte order flag as stored in WKB and SpatiaLite blobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
	Big,
	Little,
}

impl Endian {
	pub fn from_flag(flag: u8) -> Result<Self> {
		Ok(match flag {
			0 => Endian::Big,
			1 => Endian::Little,
			_ => bail!("invalid byte order flag {flag}"),
		})
	}
}

pub struct BinaryReader<'a> {
	cursor: Cursor<&'a [u8]>,
}

impl<'a> BinaryReader<'a> {
	pub fn new(bytes: &'a [u8]) -> Self {
		Self {
			cursor: Cursor::new(bytes),
		}
	}

	pub fn position(&self) -> u64 {
		self.cursor.position()
	}

	pub fn remaining(&self) -> u64 {
		(self.cursor.get_ref().len() as u64).saturating_sub(self.cursor.position())
	}

	/// Fails if fewer than `count` items of `size` bytes each are left.
	pub fn ensure_remaining(&self, count: u32, size: u64) -> Result<()> {
		if u64::from(count) * size > self.remaining() {
			bail!(
				"count {count} at position {} exceeds the {} remaining bytes",
				self.position(),
				self.remaining()
			);
		}
		Ok(())
	}

	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.cursor.read_u8()?)
	}

	pub fn read_u32(&mut self, endian: Endian) -> Result<u32> {
		Ok(match endian {
			Endian::Big => self.cursor.read_u32::<BigEndian>()?,
			Endian::Little => self.cursor.read_u32::<LittleEndian>()?,
		})
	}

	pub fn read_i32(&mut self, endian: Endian) -> Result<i32> {
		Ok(match endian {
			Endian::Big => self.cursor.read_i32::<BigEndian>()?,
			Endian::Little => self.cursor.read_i32::<LittleEndian>()?,
		})
	}

	pub fn read_f64(&mut self, endian: Endian) -> Result<f64> {
		Ok(match endian {
			Endian::Big => self.cursor.read_f64::<BigEndian>()?,
			Endian::Little => self.cursor.read_f64::<LittleEndian>()?,
		})
	}

	/// Reads one vertex. A measure ordinate is read and dropped.
	pub fn read_coordinates(&mut self, endian: Endian, has_z: bool, has_m: bool) -> Result<crate::Coordinates> {
		let x = self.read_f64(endian)?;
		let y = self.read_f64(endian)?;
		let z = if has_z { Some(self.read_f64(endian)?) } else { None };
		if has_m {
			self.read_f64(endian)?;
		}
		Ok(match z {
			Some(z) => crate::Coordinates::new_3d(x, y, z),
			None => crate::Coordinates::new(x, y),
		})
	}
}
