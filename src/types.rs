//! Coordinate value types for the two datums
//!
//! [`Wgs84Point`] and [`Gcj02Point`] share a representation but are distinct
//! types, so a GCJ-02 coordinate can't be handed to code expecting GPS data
//! without going through [`crate::to_wgs84`].

use std::fmt::{Display, Formatter};
use std::num::ParseFloatError;
use std::str::FromStr;

use approx::{AbsDiffEq, RelativeEq, abs_diff_eq, relative_eq};
use thiserror::Error;

use crate::measure::Degrees;

#[derive(Error, Debug, PartialEq)]
pub enum TypeError {
    #[error("expected a coordinate of the form LON,LAT but found {0:?}")]
    MissingSeparator(String),
    #[error("expected two coordinate components but found {0}")]
    ComponentCount(usize),
    #[error("invalid {0} value {1:?}")]
    InvalidNumber(Dimension, String, #[source] ParseFloatError),
}

type Result<T> = std::result::Result<T, TypeError>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dimension {
    Longitude,
    Latitude,
}

impl Display for Dimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Longitude => write!(f, "longitude"),
            Self::Latitude => write!(f, "latitude"),
        }
    }
}

fn parse_component(dim: Dimension, s: &str) -> Result<Degrees<f64>> {
    let s = s.trim();
    s.parse::<f64>()
        .map(Degrees)
        .map_err(|e| TypeError::InvalidNumber(dim, s.to_owned(), e))
}

fn parse_lon_lat(s: &str) -> Result<(Degrees<f64>, Degrees<f64>)> {
    let parts = s.split(',').collect::<Vec<_>>();
    match parts.as_slice() {
        [_] => Err(TypeError::MissingSeparator(s.to_owned())),
        [lon, lat] => Ok((
            parse_component(Dimension::Longitude, lon)?,
            parse_component(Dimension::Latitude, lat)?,
        )),
        _ => Err(TypeError::ComponentCount(parts.len())),
    }
}

/// Shared implementation for the longitude/latitude point types.
///
/// Neither type validates its range: the transforms are total over finite
/// input and callers are responsible for supplying physical coordinates.
macro_rules! lon_lat_point {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Debug, Default)]
        pub struct $name {
            lon: Degrees<f64>,
            lat: Degrees<f64>,
        }

        impl $name {
            pub const fn new(lon: Degrees<f64>, lat: Degrees<f64>) -> Self {
                Self { lon, lat }
            }

            /// Construct from plain decimal degrees.
            pub const fn from_degrees(lon: f64, lat: f64) -> Self {
                Self::new(Degrees(lon), Degrees(lat))
            }

            /// Get point longitude
            pub fn lon(&self) -> Degrees<f64> {
                self.lon
            }

            /// Get point latitude
            pub fn lat(&self) -> Degrees<f64> {
                self.lat
            }

            /// Longitude and latitude as a plain tuple of decimal degrees.
            pub fn to_tuple(self) -> (f64, f64) {
                (self.lon.0, self.lat.0)
            }
        }

        impl From<(f64, f64)> for $name {
            fn from((lon, lat): (f64, f64)) -> Self {
                Self::from_degrees(lon, lat)
            }
        }

        impl From<$name> for (f64, f64) {
            fn from(value: $name) -> Self {
                value.to_tuple()
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self> {
                let (lon, lat) = parse_lon_lat(s)?;
                Ok(Self::new(lon, lat))
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                match f.precision() {
                    Some(p) => write!(f, "{:.*},{:.*}", p, self.lon.0, p, self.lat.0),
                    None => write!(f, "{},{}", self.lon.0, self.lat.0),
                }
            }
        }

        impl AbsDiffEq for $name {
            type Epsilon = f64;

            fn default_epsilon() -> Self::Epsilon {
                f64::EPSILON
            }

            fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
                abs_diff_eq!(self.lon.0, other.lon.0, epsilon = epsilon)
                    && abs_diff_eq!(self.lat.0, other.lat.0, epsilon = epsilon)
            }
        }

        impl RelativeEq for $name {
            fn default_max_relative() -> Self::Epsilon {
                0.000_000_000_000_001
            }

            fn relative_eq(
                &self,
                other: &Self,
                epsilon: Self::Epsilon,
                max_relative: Self::Epsilon,
            ) -> bool {
                relative_eq!(
                    self.lon.0,
                    other.lon.0,
                    epsilon = epsilon,
                    max_relative = max_relative
                ) && relative_eq!(
                    self.lat.0,
                    other.lat.0,
                    epsilon = epsilon,
                    max_relative = max_relative
                )
            }
        }
    };
}

lon_lat_point! {
    /// A GPS coordinate on the WGS-84 ellipsoid.
    Wgs84Point
}

lon_lat_point! {
    /// A coordinate in the GCJ-02 datum.
    ///
    /// Only meaningful as the output of [`crate::to_gcj02`], or as data
    /// obtained from a map service that publishes GCJ-02.
    Gcj02Point
}

/// Displacement applied by the forward transform, GCJ-02 minus WGS-84.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Offset {
    pub dlon: Degrees<f64>,
    pub dlat: Degrees<f64>,
}

impl Offset {
    pub fn between(wgs: &Wgs84Point, gcj: &Gcj02Point) -> Self {
        Self {
            dlon: gcj.lon() - wgs.lon(),
            dlat: gcj.lat() - wgs.lat(),
        }
    }

    /// Largest absolute component, in degrees.
    pub fn max_abs(&self) -> f64 {
        self.dlon.0.abs().max(self.dlat.0.abs())
    }

    pub fn is_zero(&self) -> bool {
        self.dlon.0 == 0.0 && self.dlat.0 == 0.0
    }
}

impl Display for Offset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*},{:.*}", p, self.dlon.0, p, self.dlat.0),
            None => write!(f, "{},{}", self.dlon.0, self.dlat.0),
        }
    }
}

/// Instantiate a `Wgs84Point` with a tuple-like `(lon, lat)` syntax.
#[macro_export]
macro_rules! wgs84 {
    ( $lon:expr, $lat:expr $(,)? ) => {
        $crate::Wgs84Point::from_degrees($lon, $lat)
    };
}

/// Instantiate a `Gcj02Point` with a tuple-like `(lon, lat)` syntax.
#[macro_export]
macro_rules! gcj02 {
    ( $lon:expr, $lat:expr $(,)? ) => {
        $crate::Gcj02Point::from_degrees($lon, $lat)
    };
}
