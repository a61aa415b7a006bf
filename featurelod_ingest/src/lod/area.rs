use featurelod_core::{AreaFormula, Envelope, mapnik};
use featurelod_geometry::Geometry;
use geo::Area;

/// Estimates the screen area in pixels that `envelope` covers at zoom `level`.
///
/// The envelope is projected onto Mapnik pixel positions. The legacy estimate works on the four
/// sides and two diagonals of the resulting quadrilateral, the corrected one measures its area.
#[must_use]
pub fn mapnik_area(level: u32, envelope: &Envelope, formula: AreaFormula) -> f64 {
	let pixel = |lng: f64, lat: f64| -> [f64; 2] {
		let tile_x = mapnik::tile_x(level, lng);
		let tile_y = mapnik::tile_y(level, lat);
		[
			(mapnik::pixel_x(level, tile_x, lng) + tile_x * mapnik::TILE_SIZE) as f64,
			(mapnik::pixel_y(level, tile_y, lat) + tile_y * mapnik::TILE_SIZE) as f64,
		]
	};
	let [ul, ur, lr, ll] = envelope.corners().map(|[lng, lat]| pixel(lng, lat));

	match formula {
		AreaFormula::Legacy => {
			let sq = |dx: f64, dy: f64| dx * dx + dy * dy;
			let upper = sq(ur[0] - ul[0], ur[1] - ul[1]);
			let right = sq(lr[0] - ur[0], lr[1] - ur[1]);
			let lower = sq(lr[0] - ll[0], lr[1] - ll[1]);
			let diag0 = sq(lr[0] - ul[0], lr[1] - ul[1]);
			let diag1 = sq(ur[0] - ll[0], ur[1] - ll[1]);
			// The left side repeats the right side's vertical extent and the side term is not
			// squared. Level thresholds are tuned against exactly these numbers.
			let left = sq(0.0, lr[1] - ur[1]);
			0.25 * (4.0 * diag0 * diag1 - (right + left - upper - lower)).sqrt()
		}
		AreaFormula::Corrected => {
			let quadrilateral = Geometry::new_polygon(vec![vec![ul, ur, lr, ll, ul]]);
			geo::Geometry::from(&quadrilateral).unsigned_area()
		}
	}
}
