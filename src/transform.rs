//! Transforms between WGS-84 and GCJ-02
//!
//! The forward direction is the publicly reverse-engineered closed form: an
//! empirically fitted polynomial/trigonometric offset centred on 105°E 35°N,
//! rescaled into degrees by the local radii of curvature of the Krasovsky
//! ellipsoid. It applies only inside a rectangular approximation of mainland
//! China and is the identity everywhere else.
//!
//! There is no closed-form inverse. [`to_wgs84`] runs a fixed number of
//! fixed-point corrections against the forward transform, which converges
//! geometrically because the forward Jacobian is close to the identity.

use std::f64::consts::PI;

use tracing::{Level, enabled, instrument, trace};

use crate::measure::{Degrees, Radians};
use crate::types::{Gcj02Point, Offset, Wgs84Point};

/// Semi-major axis of the Krasovsky 1940 ellipsoid, in meters.
pub const SEMI_MAJOR_AXIS: f64 = 6378245.0;

/// First eccentricity squared of the Krasovsky 1940 ellipsoid.
#[allow(clippy::excessive_precision)]
pub const ECCENTRICITY_SQUARED: f64 = 0.00669342162296594323;

/// Number of fixed-point corrections performed by [`to_wgs84`].
///
/// Residual error after this many steps is far below GPS precision for any
/// point inside the China bounding box. The count is fixed rather than
/// convergence-tested, so the inverse has a constant cost.
pub const INVERSE_ITERATIONS: usize = 30;

const CHINA_MIN_LON: f64 = 72.004;
const CHINA_MAX_LON: f64 = 137.8347;
const CHINA_MIN_LAT: f64 = 0.8293;
const CHINA_MAX_LAT: f64 = 55.8271;

// Centre of the offset polynomials' expansion.
const ORIGIN_LON: f64 = 105.0;
const ORIGIN_LAT: f64 = 35.0;

/// Whether a coordinate falls outside the China bounding box.
///
/// The box is a coarse rectangle, so parts of far-western China fall outside
/// it and parts of neighbouring countries fall inside. Points on the edges
/// count as inside. NaN compares as inside and propagates through the
/// transform.
pub fn is_outside_china(lon: Degrees<f64>, lat: Degrees<f64>) -> bool {
    lon.0 < CHINA_MIN_LON
        || lon.0 > CHINA_MAX_LON
        || lat.0 < CHINA_MIN_LAT
        || lat.0 > CHINA_MAX_LAT
}

fn transform_lat(x: f64, y: f64) -> f64 {
    let mut ret = -100.0 + 2.0 * x + 3.0 * y + 0.2 * y * y + 0.1 * x * y + 0.2 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (y * PI).sin() + 40.0 * (y / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (160.0 * (y / 12.0 * PI).sin() + 320.0 * (y * PI / 30.0).sin()) * 2.0 / 3.0;
    ret
}

fn transform_lon(x: f64, y: f64) -> f64 {
    let mut ret = 300.0 + x + 2.0 * y + 0.1 * x * x + 0.1 * x * y + 0.1 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (x * PI).sin() + 40.0 * (x / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (150.0 * (x / 12.0 * PI).sin() + 300.0 * (x / 30.0 * PI).sin()) * 2.0 / 3.0;
    ret
}

/// Convert a WGS-84 coordinate to GCJ-02.
///
/// Points outside the China bounding box are returned unchanged. Inputs are
/// not otherwise validated; non-finite values propagate.
pub fn to_gcj02(wgs: Wgs84Point) -> Gcj02Point {
    if is_outside_china(wgs.lon(), wgs.lat()) {
        return Gcj02Point::new(wgs.lon(), wgs.lat());
    }

    let (lon, lat) = wgs.to_tuple();
    let d_lat = transform_lat(lon - ORIGIN_LON, lat - ORIGIN_LAT);
    let d_lon = transform_lon(lon - ORIGIN_LON, lat - ORIGIN_LAT);

    let rad_lat = Radians::from(wgs.lat()).0;
    let magic = rad_lat.sin();
    let magic = 1.0 - ECCENTRICITY_SQUARED * magic * magic;
    let sqrt_magic = magic.sqrt();

    // Meridional and prime-vertical radii of curvature turn the offsets into
    // degrees.
    let d_lat = (d_lat * 180.0)
        / ((SEMI_MAJOR_AXIS * (1.0 - ECCENTRICITY_SQUARED)) / (magic * sqrt_magic) * PI);
    let d_lon = (d_lon * 180.0) / (SEMI_MAJOR_AXIS / sqrt_magic * rad_lat.cos() * PI);

    Gcj02Point::new(wgs.lon() + Degrees(d_lon), wgs.lat() + Degrees(d_lat))
}

/// The offset GCJ-02 applies at a WGS-84 coordinate.
pub fn offset(wgs: Wgs84Point) -> Offset {
    Offset::between(&wgs, &to_gcj02(wgs))
}

/// Successive WGS-84 estimates for a GCJ-02 coordinate.
///
/// Each step maps the current estimate forward and subtracts the error
/// against the target. The iterator never ends; [`to_wgs84`] takes
/// [`INVERSE_ITERATIONS`] steps from it.
#[derive(Clone, Debug)]
pub struct InverseEstimates {
    target: Gcj02Point,
    estimate: Wgs84Point,
}

impl InverseEstimates {
    pub fn new(target: Gcj02Point) -> Self {
        Self {
            target,
            estimate: Wgs84Point::new(target.lon(), target.lat()),
        }
    }

    pub fn target(&self) -> Gcj02Point {
        self.target
    }

    /// The most recent estimate, or the target itself before the first step.
    pub fn estimate(&self) -> Wgs84Point {
        self.estimate
    }

    /// Forward transform of the current estimate minus the target.
    pub fn residual(&self) -> Offset {
        let forward = to_gcj02(self.estimate);
        Offset {
            dlon: forward.lon() - self.target.lon(),
            dlat: forward.lat() - self.target.lat(),
        }
    }

    fn step(&mut self) -> Wgs84Point {
        let forward = to_gcj02(self.estimate);
        let lon = self.estimate.lon() - (forward.lon() - self.target.lon());
        let lat = self.estimate.lat() - (forward.lat() - self.target.lat());
        self.estimate = Wgs84Point::new(lon, lat);
        self.estimate
    }
}

impl Iterator for InverseEstimates {
    type Item = Wgs84Point;

    fn next(&mut self) -> Option<Wgs84Point> {
        Some(self.step())
    }
}

/// Begin iterating toward the WGS-84 coordinate for `gcj`.
pub fn inverse_estimates(gcj: Gcj02Point) -> InverseEstimates {
    InverseEstimates::new(gcj)
}

/// Convert a GCJ-02 coordinate to WGS-84.
///
/// Approximates the inverse of [`to_gcj02`] by [`INVERSE_ITERATIONS`]
/// fixed-point corrections. The China bounding box is tested against each
/// estimate, starting with the GCJ-02 input itself, so a GCJ-02 point that
/// lies outside the box comes back unchanged even if its WGS-84 preimage was
/// just inside.
#[instrument(level = "trace", skip_all)]
pub fn to_wgs84(gcj: Gcj02Point) -> Wgs84Point {
    let mut estimates = inverse_estimates(gcj);
    for _ in 0..INVERSE_ITERATIONS {
        estimates.step();
    }

    if enabled!(Level::TRACE) {
        trace!(
            "inverse of {} after {} iterations has residual {}",
            gcj,
            INVERSE_ITERATIONS,
            estimates.residual()
        );
    }
    estimates.estimate()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use anyhow::Result;
    use approx::assert_abs_diff_eq;
    use serde::Deserialize;

    use super::{
        INVERSE_ITERATIONS, InverseEstimates, inverse_estimates, is_outside_china, offset,
        to_gcj02, to_wgs84, transform_lat, transform_lon,
    };
    use crate::measure::Degrees;
    use crate::types::{Gcj02Point, Wgs84Point};
    use crate::{gcj02, wgs84};

    #[derive(Deserialize)]
    struct GoldenDatum {
        wgs_lon: f64,
        wgs_lat: f64,
        gcj_lon: f64,
        gcj_lat: f64,
        inverse_lon: f64,
        inverse_lat: f64,
    }

    fn golden_data() -> Result<Vec<GoldenDatum>> {
        // Computed with the widely deployed reference formulation of the
        // transform, in double precision.
        let golden_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("testdata")
            .join("gcj02.csv");

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(golden_path)?;
        let mut data = Vec::new();
        for case in rdr.deserialize() {
            let datum: GoldenDatum = case?;
            data.push(datum);
        }
        Ok(data)
    }

    #[test]
    fn test_golden_values() -> Result<()> {
        let data = golden_data()?;
        assert!(!data.is_empty());
        for datum in data {
            let wgs = wgs84!(datum.wgs_lon, datum.wgs_lat);
            let gcj = to_gcj02(wgs);
            assert_eq!(gcj.to_tuple(), (datum.gcj_lon, datum.gcj_lat));

            let inverse = to_wgs84(gcj02!(datum.gcj_lon, datum.gcj_lat));
            assert_eq!(inverse.to_tuple(), (datum.inverse_lon, datum.inverse_lat));
        }
        Ok(())
    }

    #[test]
    fn test_tiananmen() {
        let wgs = wgs84!(116.397428, 39.90923);
        let gcj = to_gcj02(wgs);
        assert_eq!(gcj.to_tuple(), (116.40367162595768, 39.91063350638631));

        let d = offset(wgs);
        assert_abs_diff_eq!(d.dlon, Degrees(0.006), epsilon = 0.0005);
        assert_abs_diff_eq!(d.dlat, Degrees(0.0015), epsilon = 0.0005);

        assert_abs_diff_eq!(to_wgs84(gcj), wgs, epsilon = 1e-9);
    }

    #[test]
    fn test_polynomials_at_origin() {
        assert_eq!(transform_lat(0.0, 0.0), -100.0);
        assert_eq!(transform_lon(0.0, 0.0), 300.0);
    }

    #[test]
    fn test_lon_polynomial_on_central_meridian() {
        // Every x-dependent term vanishes at x = 0.
        assert_eq!(transform_lon(0.0, 10.0), 320.0);
    }

    #[test]
    fn test_china_box_edges() {
        let inside = |lon, lat| !is_outside_china(Degrees(lon), Degrees(lat));
        assert!(inside(72.004, 40.0));
        assert!(inside(137.8347, 40.0));
        assert!(inside(100.0, 0.8293));
        assert!(inside(100.0, 55.8271));

        assert!(!inside(72.0039, 40.0));
        assert!(!inside(137.8348, 40.0));
        assert!(!inside(100.0, 0.8292));
        assert!(!inside(100.0, 55.8272));

        assert!(!inside(-0.1276, 51.5072));
    }

    #[test]
    fn test_identity_outside_china() {
        for (lon, lat) in [
            (0.0, 0.0),
            (-122.4194, 37.7749),
            (-0.1276, 51.5072),
            (151.2093, -33.8688),
            (72.0039, 40.0),
            (137.8348, 40.0),
            (100.0, 0.8292),
            (100.0, 55.8272),
            (500.0, -1000.0),
        ] {
            let gcj = to_gcj02(wgs84!(lon, lat));
            assert_eq!(gcj.to_tuple(), (lon, lat));
            assert!(offset(wgs84!(lon, lat)).is_zero());
        }
    }

    #[test]
    fn test_boundary_discontinuity() {
        let outside = to_gcj02(wgs84!(72.0039, 40.0));
        let inside = to_gcj02(wgs84!(72.0041, 40.0));

        assert_eq!(outside.to_tuple(), (72.0039, 40.0));
        // The jump across the edge is the full offset, not a smooth ramp.
        let jump = inside.lon().0 - outside.lon().0;
        assert!(jump > 0.001, "jump was {jump}");
        assert!(jump < 0.02, "jump was {jump}");
    }

    #[test]
    fn test_inverse_uses_gcj02_box_proxy() {
        // The forward transform carries this point east of the box, so the
        // inverse sees an outside point and returns it unchanged.
        let wgs = wgs84!(137.83, 55.82);
        let gcj = to_gcj02(wgs);
        assert!(is_outside_china(gcj.lon(), gcj.lat()));
        assert_eq!(to_wgs84(gcj).to_tuple(), gcj.to_tuple());
    }

    #[test]
    fn test_nan_propagates() {
        let gcj = to_gcj02(wgs84!(f64::NAN, 39.9));
        assert!(gcj.lon().0.is_nan());
        let wgs = to_wgs84(gcj02!(116.4, f64::NAN));
        assert!(wgs.lat().0.is_nan());
    }

    #[test]
    fn test_determinism() {
        let wgs = wgs84!(113.2644, 23.1291);
        let a = to_gcj02(wgs);
        let b = to_gcj02(wgs);
        assert_eq!(a.lon().0.to_bits(), b.lon().0.to_bits());
        assert_eq!(a.lat().0.to_bits(), b.lat().0.to_bits());

        let c = to_wgs84(a);
        let d = to_wgs84(a);
        assert_eq!(c.lon().0.to_bits(), d.lon().0.to_bits());
        assert_eq!(c.lat().0.to_bits(), d.lat().0.to_bits());
    }

    #[test]
    fn test_to_wgs84_matches_estimates() {
        let gcj = gcj02!(121.47822305927693, 31.22845773757727);
        let mut estimates = inverse_estimates(gcj);
        assert_eq!(estimates.estimate().to_tuple(), gcj.to_tuple());
        assert_eq!(estimates.target(), gcj);

        let last = estimates.nth(INVERSE_ITERATIONS - 1);
        assert_eq!(last.map(Wgs84Point::to_tuple), Some(to_wgs84(gcj).to_tuple()));
    }

    #[test]
    fn test_residual_non_increasing() {
        for (lon, lat) in [
            (116.397428, 39.90923),
            (87.6168, 43.8256),
            (126.6424, 45.7567),
            (91.1409, 29.6456),
            (110.3312, 20.0311),
            (129.48646052012418, 37.79287688848079),
        ] {
            let mut estimates = InverseEstimates::new(to_gcj02(wgs84!(lon, lat)));
            let mut previous = estimates.residual().max_abs();
            for step in 0..INVERSE_ITERATIONS {
                estimates.next();
                let residual = estimates.residual().max_abs();
                assert!(
                    residual <= previous + 1e-12,
                    "residual grew at step {step} for ({lon}, {lat}): {previous} -> {residual}"
                );
                previous = residual;
            }
            assert!(previous < 1e-10);
        }
    }

    #[test]
    fn test_round_trip_converges_early() {
        // Most of the fixed iteration budget is spent past convergence.
        let wgs = wgs84!(104.0665, 30.5723);
        let gcj = to_gcj02(wgs);
        let tenth = inverse_estimates(gcj).nth(9);
        assert!(tenth.is_some_and(|e| approx::abs_diff_eq!(e, wgs, epsilon = 1e-9)));
    }

    #[test]
    fn test_gcj02_point_constructible() {
        let p = Gcj02Point::from_degrees(116.4, 39.9);
        let wgs = to_wgs84(p);
        assert_abs_diff_eq!(to_gcj02(wgs), p, epsilon = 1e-12);
    }
}
