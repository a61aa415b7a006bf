use super::{CoordinateTransform, TransformFactory};
use crate::provider::SpatialRef;
use anyhow::{Result, ensure};
use std::f64::consts::PI;

/// WGS84 semi-major axis in meters
const RADIUS: f64 = 6_378_137.0;
/// WGS84 flattening
const FLATTENING: f64 = 1.0 / 298.257_223_563;
const UTM_SCALE: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Transforms for the projected reference systems most vector data comes in, without a native
/// dependency: spherical Web-Mercator and the WGS84 UTM zones.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinTransforms;

impl TransformFactory for BuiltinTransforms {
	fn create(&self, spatial_ref: &SpatialRef) -> Result<Option<Box<dyn CoordinateTransform>>> {
		let code = match (spatial_ref.authority.as_deref(), spatial_ref.code) {
			(Some(authority), Some(code))
				if authority.eq_ignore_ascii_case("EPSG") || authority.eq_ignore_ascii_case("ESRI") =>
			{
				code
			}
			_ => return Ok(None),
		};
		let transform: Box<dyn CoordinateTransform> = match code {
			3857 | 900_913 | 3785 | 102_100 | 102_113 => Box::new(WebMercator),
			32601..=32660 => Box::new(Utm::new(code - 32600, true)?),
			32701..=32760 => Box::new(Utm::new(code - 32700, false)?),
			4269 | 4258 => Box::new(Identity),
			_ => return Ok(None),
		};
		Ok(Some(transform))
	}
}

/// Geodetic systems that differ from WGS84 by less than a meter.
#[derive(Debug)]
struct Identity;

impl CoordinateTransform for Identity {
	fn transform(&self, x: f64, y: f64) -> Result<[f64; 2]> {
		Ok([x, y])
	}
}

#[derive(Debug)]
struct WebMercator;

impl CoordinateTransform for WebMercator {
	fn transform(&self, x: f64, y: f64) -> Result<[f64; 2]> {
		let lng = (x / RADIUS).to_degrees();
		let lat = (2.0 * (y / RADIUS).exp().atan() - PI / 2.0).to_degrees();
		Ok([lng, lat])
	}
}

/// Inverse transverse Mercator on the WGS84 ellipsoid, using the Krüger series up to `n^3`.
#[derive(Debug)]
struct Utm {
	central_meridian: f64,
	false_northing: f64,
	a: f64,
	beta: [f64; 3],
	delta: [f64; 3],
}

impl Utm {
	fn new(zone: i32, north: bool) -> Result<Self> {
		ensure!((1..=60).contains(&zone), "invalid UTM zone {zone}");
		let n = FLATTENING / (2.0 - FLATTENING);
		let (n2, n3) = (n * n, n * n * n);
		Ok(Self {
			central_meridian: f64::from(zone * 6 - 183),
			false_northing: if north { 0.0 } else { UTM_FALSE_NORTHING_SOUTH },
			a: RADIUS / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0),
			beta: [
				n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
				n2 / 48.0 + n3 / 15.0,
				17.0 * n3 / 480.0,
			],
			delta: [
				2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
				7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
				56.0 * n3 / 15.0,
			],
		})
	}
}

impl CoordinateTransform for Utm {
	fn transform(&self, x: f64, y: f64) -> Result<[f64; 2]> {
		let xi = (y - self.false_northing) / (UTM_SCALE * self.a);
		let eta = (x - UTM_FALSE_EASTING) / (UTM_SCALE * self.a);

		let mut xi_prime = xi;
		let mut eta_prime = eta;
		for (j, beta) in self.beta.iter().enumerate() {
			let k = 2.0 * (j as f64 + 1.0);
			xi_prime -= beta * (k * xi).sin() * (k * eta).cosh();
			eta_prime -= beta * (k * xi).cos() * (k * eta).sinh();
		}

		let chi = (xi_prime.sin() / eta_prime.cosh()).asin();
		let mut lat = chi;
		for (j, delta) in self.delta.iter().enumerate() {
			lat += delta * (2.0 * (j as f64 + 1.0) * chi).sin();
		}
		let lng = self.central_meridian + eta_prime.sinh().atan2(xi_prime.cos()).to_degrees();
		Ok([lng, lat.to_degrees()])
	}
}
