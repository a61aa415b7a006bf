//! Geometry model of the ingestion engine and the codecs that move geometries in and out of it:
//! WKT, WKB and SpatiaLite blobs.

mod binary;
mod geo_interop;
mod geometry;
mod massage;
pub mod spatialite;
pub mod wkb;
pub mod wkt;

pub use geometry::*;
pub use massage::massage;
pub use spatialite::{parse_spatialite, to_spatialite};
pub use wkb::{parse_wkb, to_wkb};
pub use wkt::{parse_wkt, to_wkt};
