use anyhow::{Context, Result, ensure};
use std::fmt::Debug;

/// Latitude limit used when an envelope is projected onto Mapnik tiles.
pub const LOD_MAX_LATITUDE: f64 = 85.0511;

/// An axis-aligned bounding rectangle (MBR) in the coordinate space of its source.
///
/// The envelope is defined by four `f64` values:
/// - `x_min` (west)
/// - `y_min` (south)
/// - `x_max` (east)
/// - `y_max` (north)
///
/// Envelopes start out as the bounds of a single coordinate and grow with [`Envelope::extend`]
/// or [`Envelope::extend_point`].
///
/// # Examples
///
/// ```
/// use featurelod_core::Envelope;
///
/// let mut envelope = Envelope::from_point(1.0, 2.0);
/// envelope.extend_point(-3.0, 5.0);
/// assert_eq!(envelope.as_array(), [-3.0, 2.0, 1.0, 5.0]);
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct Envelope {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
}

impl Envelope {
	/// Creates a new `Envelope`, failing if a minimum is larger than its maximum
	/// or any value is not finite.
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<Envelope> {
		Envelope {
			x_min,
			y_min,
			x_max,
			y_max,
		}
		.checked()
	}

	/// Creates a degenerate envelope covering exactly one coordinate.
	#[must_use]
	pub fn from_point(x: f64, y: f64) -> Envelope {
		Envelope {
			x_min: x,
			y_min: y,
			x_max: x,
			y_max: y,
		}
	}

	/// Builds the bounds of an arbitrary set of coordinates.
	///
	/// Returns `None` if the iterator is empty.
	pub fn from_points(points: impl IntoIterator<Item = [f64; 2]>) -> Option<Envelope> {
		let mut points = points.into_iter();
		let [x, y] = points.next()?;
		let mut envelope = Envelope::from_point(x, y);
		for [x, y] in points {
			envelope.extend_point(x, y);
		}
		Some(envelope)
	}

	/// Grows the envelope so that it also covers `(x, y)`.
	pub fn extend_point(&mut self, x: f64, y: f64) {
		self.x_min = self.x_min.min(x);
		self.y_min = self.y_min.min(y);
		self.x_max = self.x_max.max(x);
		self.y_max = self.y_max.max(y);
	}

	/// Grows the envelope so that it also covers `other`.
	///
	/// # Examples
	///
	/// ```
	/// use featurelod_core::Envelope;
	///
	/// let mut a = Envelope::new(-10.0, -5.0, 10.0, 5.0).unwrap();
	/// a.extend(&Envelope::new(-12.0, -3.0, 8.0, 6.0).unwrap());
	/// assert_eq!(a.as_array(), [-12.0, -5.0, 10.0, 6.0]);
	/// ```
	pub fn extend(&mut self, other: &Envelope) {
		self.x_min = self.x_min.min(other.x_min);
		self.y_min = self.y_min.min(other.y_min);
		self.x_max = self.x_max.max(other.x_max);
		self.y_max = self.y_max.max(other.y_max);
	}

	/// Clamps both latitudes into `[-LOD_MAX_LATITUDE, LOD_MAX_LATITUDE]`.
	pub fn limit_to_mercator(&mut self) {
		self.y_min = self.y_min.clamp(-LOD_MAX_LATITUDE, LOD_MAX_LATITUDE);
		self.y_max = self.y_max.clamp(-LOD_MAX_LATITUDE, LOD_MAX_LATITUDE);
	}

	/// Returns the four corners in the order upper-left, upper-right, lower-right, lower-left.
	#[must_use]
	pub fn corners(&self) -> [[f64; 2]; 4] {
		[
			[self.x_min, self.y_max],
			[self.x_max, self.y_max],
			[self.x_max, self.y_min],
			[self.x_min, self.y_min],
		]
	}

	/// Maps the envelope through a coordinate transform using all four corners.
	///
	/// Each corner is transformed on its own and the result is the bounding rectangle of the four
	/// transformed corners. Transforming only the min/max corners is not enough for projections
	/// where a rectangle does not stay axis-aligned.
	///
	/// # Examples
	///
	/// ```
	/// use featurelod_core::Envelope;
	///
	/// let envelope = Envelope::new(0.0, 0.0, 2.0, 1.0).unwrap();
	/// // rotate by 90 degrees
	/// let rotated = envelope.transform_corners(|x, y| Ok([-y, x])).unwrap();
	/// assert_eq!(rotated.as_array(), [-1.0, 0.0, 0.0, 2.0]);
	/// ```
	pub fn transform_corners<F>(&self, mut transform: F) -> Result<Envelope>
	where
		F: FnMut(f64, f64) -> Result<[f64; 2]>,
	{
		let mut corners = Vec::with_capacity(4);
		for [x, y] in self.corners() {
			corners.push(transform(x, y)?);
		}
		Envelope::from_points(corners).context("envelope has no corners")?.checked()
	}

	#[must_use]
	pub fn width(&self) -> f64 {
		self.x_max - self.x_min
	}

	#[must_use]
	pub fn height(&self) -> f64 {
		self.y_max - self.y_min
	}

	/// Returns `true` if the envelope has no extent in either direction.
	#[must_use]
	pub fn is_point(&self) -> bool {
		self.x_min == self.x_max && self.y_min == self.y_max
	}

	/// Checks if `other` lies completely inside this envelope.
	#[must_use]
	pub fn contains(&self, other: &Envelope) -> bool {
		self.x_min <= other.x_min && self.y_min <= other.y_min && self.x_max >= other.x_max && self.y_max >= other.y_max
	}

	/// Returns `[x_min, y_min, x_max, y_max]`.
	#[must_use]
	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}

	fn checked(self) -> Result<Envelope> {
		ensure!(
			self.as_array().iter().all(|v| v.is_finite()),
			"envelope values must be finite: {self:?}"
		);
		ensure!(self.x_min <= self.x_max, "x_min ({}) must be <= x_max ({})", self.x_min, self.x_max);
		ensure!(self.y_min <= self.y_max, "y_min ({}) must be <= y_max ({})", self.y_min, self.y_max);
		Ok(self)
	}
}

impl Debug for Envelope {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Envelope({}, {}, {}, {})", self.x_min, self.y_min, self.x_max, self.y_max)
	}
}

impl TryFrom<[f64; 4]> for Envelope {
	type Error = anyhow::Error;

	fn try_from(value: [f64; 4]) -> Result<Self> {
		Envelope::new(value[0], value[1], value[2], value[3])
	}
}
