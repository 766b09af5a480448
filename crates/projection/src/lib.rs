//! Coordinate reference system transformations.
//!
//! Implements map projections from scratch without external dependencies.
//! All projections convert between geographic coordinates (longitude and
//! latitude in degrees on the projection's ellipsoid) and projected
//! coordinates in meters.

pub mod albers;
pub mod ellipsoid;
pub mod error;
pub mod lambert;
pub mod laea;
pub mod mercator;
pub mod polar_stereographic;
pub mod transverse_mercator;

pub use albers::AlbersEqualArea;
pub use ellipsoid::Ellipsoid;
pub use error::ProjectionError;
pub use lambert::LambertConformal;
pub use laea::LambertAzimuthalEqualArea;
pub use mercator::{Mercator, WebMercator};
pub use polar_stereographic::PolarStereographic;
pub use transverse_mercator::{utm_central_meridian, TransverseMercator};

/// A forward/inverse map projection.
pub trait Projection: std::fmt::Debug + Send + Sync {
    /// Convert geographic (lon, lat) in degrees to projected (x, y) in meters.
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError>;

    /// Convert projected (x, y) in meters to geographic (lon, lat) in degrees.
    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError>;
}

/// Normalize a longitude difference in radians to [-π, π).
pub(crate) fn normalize_dlon(dlon: f64) -> f64 {
    use std::f64::consts::PI;
    (dlon + PI).rem_euclid(2.0 * PI) - PI
}

/// Reject non-finite input and latitudes outside [-90, 90].
pub(crate) fn check_geographic(lon: f64, lat: f64) -> Result<(), ProjectionError> {
    if !lon.is_finite() || !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(ProjectionError::out_of_domain(
            lon,
            lat,
            "invalid geographic coordinate",
        ));
    }
    Ok(())
}

pub(crate) fn check_projected(x: f64, y: f64) -> Result<(), ProjectionError> {
    if !x.is_finite() || !y.is_finite() {
        return Err(ProjectionError::out_of_domain(x, y, "non-finite coordinate"));
    }
    Ok(())
}

/// Reject latitudes outside [-90, 90] degrees in projection parameters.
pub(crate) fn check_latitude_param(name: &str, value: f64) -> Result<(), ProjectionError> {
    if !value.is_finite() || !(-90.0..=90.0).contains(&value) {
        return Err(ProjectionError::InvalidParameters(format!(
            "{} out of range: {}",
            name, value
        )));
    }
    Ok(())
}
