//! Mercator projections.
//!
//! [`Mercator`] is the ellipsoidal normal Mercator (EPSG methods 9804 and
//! 9805, e.g. EPSG:3395). [`WebMercator`] is the spherical variant on the
//! WGS84 semi-major axis used by web map tiles (EPSG:3857). Latitudes beyond
//! ±85.0511° fall outside the square Web Mercator extent.

use std::f64::consts::PI;

use crate::{
    check_geographic, check_latitude_param, check_projected, normalize_dlon, Ellipsoid, Projection,
    ProjectionError,
};

/// Largest latitude representable in the square Web Mercator extent.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Ellipsoidal Mercator projection parameters.
#[derive(Debug, Clone)]
pub struct Mercator {
    /// Central meridian in degrees
    pub lon0: f64,
    /// Scale factor at the equator
    pub k0: f64,
    /// False easting (meters)
    pub false_easting: f64,
    /// False northing (meters)
    pub false_northing: f64,
    /// Reference ellipsoid
    pub ellipsoid: Ellipsoid,
}

impl Mercator {
    /// Mercator with a scale factor at the equator (variant A).
    pub fn new(
        lon0: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
        ellipsoid: Ellipsoid,
    ) -> Result<Self, ProjectionError> {
        if !(k0 > 0.0) || !k0.is_finite() {
            return Err(ProjectionError::InvalidParameters(format!(
                "scale factor must be positive, got {}",
                k0
            )));
        }
        Ok(Self {
            lon0,
            k0,
            false_easting,
            false_northing,
            ellipsoid,
        })
    }

    /// Mercator true to scale along a standard parallel (variant B).
    pub fn with_standard_parallel(
        lon0: f64,
        standard_parallel: f64,
        false_easting: f64,
        false_northing: f64,
        ellipsoid: Ellipsoid,
    ) -> Result<Self, ProjectionError> {
        check_latitude_param("standard parallel", standard_parallel)?;
        if standard_parallel.abs() >= 90.0 {
            return Err(ProjectionError::InvalidParameters(
                "standard parallel must not be a pole".to_string(),
            ));
        }
        let k0 = ellipsoid.m(standard_parallel.to_radians());
        Self::new(lon0, k0, false_easting, false_northing, ellipsoid)
    }

    fn scale(&self) -> f64 {
        self.ellipsoid.semi_major_axis * self.k0
    }
}

impl Projection for Mercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
        check_geographic(lon, lat)?;
        if lat.abs() >= 90.0 {
            return Err(ProjectionError::out_of_domain(lon, lat, "poles are at infinity"));
        }
        let dlon = normalize_dlon((lon - self.lon0).to_radians());
        let x = self.false_easting + self.scale() * dlon;
        let y = self.false_northing - self.scale() * self.ellipsoid.t(lat.to_radians()).ln();
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        check_projected(x, y)?;
        let t = (-(y - self.false_northing) / self.scale()).exp();
        let phi = self.ellipsoid.phi_from_t(t);
        let lon = self.lon0 + ((x - self.false_easting) / self.scale()).to_degrees();
        Ok((lon, phi.to_degrees()))
    }
}

/// Web Mercator projection parameters.
#[derive(Debug, Clone)]
pub struct WebMercator {
    /// Sphere radius (meters)
    pub radius: f64,
    /// Central meridian in degrees
    pub lon0: f64,
    /// False easting (meters)
    pub false_easting: f64,
    /// False northing (meters)
    pub false_northing: f64,
}

impl Default for WebMercator {
    fn default() -> Self {
        Self {
            radius: 6378137.0,
            lon0: 0.0,
            false_easting: 0.0,
            false_northing: 0.0,
        }
    }
}

impl WebMercator {
    /// Half the width of the world in projected meters.
    pub fn max_extent(&self) -> f64 {
        PI * self.radius
    }
}

impl Projection for WebMercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
        if !lon.is_finite() || !lat.is_finite() || lat.abs() > MAX_LATITUDE {
            return Err(ProjectionError::out_of_domain(
                lon,
                lat,
                "latitude outside the Web Mercator extent",
            ));
        }
        let dlon = normalize_dlon((lon - self.lon0).to_radians());
        let x = self.radius * dlon;
        let y = self.radius * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
        Ok((x + self.false_easting, y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        check_projected(x, y)?;
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let lon = self.lon0 + (x / self.radius).to_degrees();
        let lat = 2.0 * (y / self.radius).exp().atan() - PI / 2.0;
        Ok((lon, lat.to_degrees()))
    }
}
