//! Tile and pixel math of the Mapnik (OSM slippy map) tiling scheme.
//!
//! Tiles are 256 pixels wide. A pixel position at zoom `level` is computed as the tile position at
//! `level + 8`, so all functions here work on integer tile indices, truncated like the tile
//! numbering of a slippy map.

use std::f64::consts::PI;

/// Size of a tile in pixels.
pub const TILE_SIZE: i64 = 256;

/// Ground resolution in meters per pixel of a level 0 tile at the equator.
pub const EQUATOR_RESOLUTION: f64 = 156_543.034;

/// Returns the column of the tile containing longitude `lng` at zoom `level`.
#[must_use]
pub fn tile_x(level: u32, lng: f64) -> i64 {
	((lng + 180.0) / 360.0 * scale(level)) as i64
}

/// Returns the row of the tile containing latitude `lat` at zoom `level`.
///
/// Latitudes outside the Web-Mercator range give rows outside `0..2^level`.
#[must_use]
pub fn tile_y(level: u32, lat: f64) -> i64 {
	let lat = lat.to_radians();
	((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * scale(level)) as i64
}

/// Returns the horizontal pixel offset of `lng` inside tile column `tile_x`.
#[must_use]
pub fn pixel_x(level: u32, tile_x: i64, lng: f64) -> i64 {
	self::tile_x(level + 8, lng) - tile_x * TILE_SIZE
}

/// Returns the vertical pixel offset of `lat` inside tile row `tile_y`.
#[must_use]
pub fn pixel_y(level: u32, tile_y: i64, lat: f64) -> i64 {
	self::tile_y(level + 8, lat) - tile_y * TILE_SIZE
}

/// Meters per pixel at the equator for zoom `level`, or `0.0` for levels that do not fit into a
/// 32 bit tile index.
#[must_use]
pub fn tile_resolution(level: u32) -> f64 {
	if level < 32 {
		EQUATOR_RESOLUTION / scale(level)
	} else {
		0.0
	}
}

fn scale(level: u32) -> f64 {
	2f64.powi(level as i32)
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;
	use rstest::rstest;

	#[rstest]
	#[case(0, -180.0, 0)]
	#[case(0, 179.9, 0)]
	#[case(1, 0.0, 1)]
	#[case(2, -90.0, 1)]
	#[case(8, 13.4, 137)]
	fn tile_columns(#[case] level: u32, #[case] lng: f64, #[case] expected: i64) {
		assert_eq!(tile_x(level, lng), expected);
	}

	#[rstest]
	#[case(0, 85.0511, 0)]
	#[case(1, 10.0, 0)]
	#[case(1, -10.0, 1)]
	#[case(8, 52.5, 83)]
	fn tile_rows(#[case] level: u32, #[case] lat: f64, #[case] expected: i64) {
		assert_eq!(tile_y(level, lat), expected);
	}

	#[test]
	fn pixels_are_relative_to_their_tile() {
		let tx = tile_x(3, 13.4);
		let px = pixel_x(3, tx, 13.4);
		assert!((0..TILE_SIZE).contains(&px));
		assert_eq!(px + tx * TILE_SIZE, tile_x(11, 13.4));

		let ty = tile_y(3, 52.5);
		let py = pixel_y(3, ty, 52.5);
		assert!((0..TILE_SIZE).contains(&py));
		assert_eq!(py + ty * TILE_SIZE, tile_y(11, 52.5));
	}

	#[test]
	fn world_spans_one_tile_at_level_zero() {
		assert_eq!(pixel_x(0, 0, -180.0), 0);
		assert_eq!(pixel_x(0, 0, 179.999_999), 255);
		assert_eq!(pixel_y(0, 0, 85.0511), 0);
		assert_eq!(pixel_y(0, 0, -85.0511), 255);
	}

	#[rstest]
	#[case(0, 156_543.034)]
	#[case(1, 78_271.517)]
	#[case(10, 152.874_056_640_625)]
	#[case(31, 156_543.034 / 2_147_483_648.0)]
	#[case(32, 0.0)]
	#[case(40, 0.0)]
	fn resolutions(#[case] level: u32, #[case] expected: f64) {
		assert_relative_eq!(tile_resolution(level), expected, epsilon = 1e-9);
	}
}
