use std::fmt::Debug;

/// A single vertex. `z` is only present for three-dimensional geometries.
#[derive(Clone, Copy, PartialEq)]
pub struct Coordinates {
	x: f64,
	y: f64,
	z: Option<f64>,
}

impl Coordinates {
	#[must_use]
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y, z: None }
	}

	#[must_use]
	pub fn new_3d(x: f64, y: f64, z: f64) -> Self {
		Self { x, y, z: Some(z) }
	}

	#[must_use]
	pub fn x(&self) -> f64 {
		self.x
	}

	#[must_use]
	pub fn y(&self) -> f64 {
		self.y
	}

	#[must_use]
	pub fn z(&self) -> Option<f64> {
		self.z
	}

	/// Replaces the horizontal position and keeps `z`.
	pub fn set_xy(&mut self, x: f64, y: f64) {
		self.x = x;
		self.y = y;
	}

	#[must_use]
	pub fn xy(&self) -> [f64; 2] {
		[self.x, self.y]
	}

	/// Compares two vertices allowing an absolute difference of `epsilon` per ordinate.
	#[must_use]
	pub fn approx_eq(&self, other: &Coordinates, epsilon: f64) -> bool {
		let close = |a: f64, b: f64| (a - b).abs() <= epsilon || (a.is_nan() && b.is_nan());
		close(self.x, other.x)
			&& close(self.y, other.y)
			&& match (self.z, other.z) {
				(Some(a), Some(b)) => close(a, b),
				(None, None) => true,
				_ => false,
			}
	}
}

impl From<[f64; 2]> for Coordinates {
	fn from(value: [f64; 2]) -> Self {
		Coordinates::new(value[0], value[1])
	}
}

impl From<[f64; 3]> for Coordinates {
	fn from(value: [f64; 3]) -> Self {
		Coordinates::new_3d(value[0], value[1], value[2])
	}
}

impl From<(f64, f64)> for Coordinates {
	fn from(value: (f64, f64)) -> Self {
		Coordinates::new(value.0, value.1)
	}
}

impl From<&Coordinates> for geo::Coord<f64> {
	fn from(value: &Coordinates) -> Self {
		geo::Coord { x: value.x, y: value.y }
	}
}

impl Debug for Coordinates {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.z {
			Some(z) => [self.x, self.y, z].fmt(f),
			None => [self.x, self.y].fmt(f),
		}
	}
}
