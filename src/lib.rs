//! A CLI tool and library for converting between WGS-84 and GCJ-02.
//!
//! GCJ-02, informally "Mars coordinates", is the datum mandated for public
//! maps in mainland China. It shifts WGS-84 (GPS) coordinates by a deliberate,
//! non-linear offset of up to several hundred meters. Outside a rectangular
//! approximation of China the two datums coincide.
//!
//! See [`to_gcj02`] and [`to_wgs84`] for the typed API, or
//! [`wgs84_to_gcj02`] and [`gcj02_to_wgs84`] for plain `(lon, lat)` tuples.
//!
//! ```
//! use marscoord::{Wgs84Point, to_gcj02, to_wgs84};
//!
//! let tiananmen = Wgs84Point::from_degrees(116.397428, 39.90923);
//! let gcj = to_gcj02(tiananmen);
//! assert!(gcj.lon().0 > tiananmen.lon().0);
//!
//! let back = to_wgs84(gcj);
//! assert!((back.lat().0 - tiananmen.lat().0).abs() < 1e-9);
//! ```
//!
//! # Feature flags
//!
//! - `cli` enables the additional dependencies needed by the CLI

pub mod internal;
mod measure;
mod transform;
mod types;

pub use measure::{Degrees, Radians};
pub use transform::{
    ECCENTRICITY_SQUARED, INVERSE_ITERATIONS, InverseEstimates, SEMI_MAJOR_AXIS,
    inverse_estimates, is_outside_china, offset, to_gcj02, to_wgs84,
};
pub use types::{Dimension, Gcj02Point, Offset, TypeError, Wgs84Point};

/// Convert WGS-84 decimal degrees `(lon, lat)` to GCJ-02.
pub fn wgs84_to_gcj02(lon: f64, lat: f64) -> (f64, f64) {
    to_gcj02(Wgs84Point::from_degrees(lon, lat)).to_tuple()
}

/// Convert GCJ-02 decimal degrees `(lon, lat)` to WGS-84.
pub fn gcj02_to_wgs84(lon: f64, lat: f64) -> (f64, f64) {
    to_wgs84(Gcj02Point::from_degrees(lon, lat)).to_tuple()
}
