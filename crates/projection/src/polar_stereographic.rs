//! Polar Stereographic projection on an ellipsoid.
//!
//! Variant A is defined by a scale factor at the pole, variant B by a
//! latitude of true scale (EPSG methods 9810 and 9829). Sea-ice grids such
//! as NSIDC Sea Ice Polar Stereographic North (EPSG:3413) use variant B.

use crate::{
    check_geographic, check_latitude_param, check_projected, normalize_dlon, Ellipsoid, Projection,
    ProjectionError,
};

/// Polar Stereographic projection parameters.
#[derive(Debug, Clone)]
pub struct PolarStereographic {
    /// Straight vertical longitude from the pole in degrees
    pub lon0: f64,
    /// Whether the projection is centred on the north pole
    pub north: bool,
    /// False easting (meters)
    pub false_easting: f64,
    /// False northing (meters)
    pub false_northing: f64,
    /// Reference ellipsoid
    pub ellipsoid: Ellipsoid,
    /// rho = k * t(lat)
    k: f64,
}

impl PolarStereographic {
    /// Variant A: scale factor `k0` at the pole.
    pub fn with_scale_factor(
        lon0: f64,
        north: bool,
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
        let e = ellipsoid.e();
        let k = 2.0 * ellipsoid.semi_major_axis * k0
            / ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt();
        Ok(Self {
            lon0,
            north,
            false_easting,
            false_northing,
            ellipsoid,
            k,
        })
    }

    /// Variant B: true scale along `standard_parallel`, whose sign selects
    /// the pole.
    pub fn with_standard_parallel(
        lon0: f64,
        standard_parallel: f64,
        false_easting: f64,
        false_northing: f64,
        ellipsoid: Ellipsoid,
    ) -> Result<Self, ProjectionError> {
        check_latitude_param("standard parallel", standard_parallel)?;
        if standard_parallel == 0.0 {
            return Err(ProjectionError::InvalidParameters(
                "standard parallel must not be the equator".to_string(),
            ));
        }
        let north = standard_parallel > 0.0;
        let phi_c = standard_parallel.abs().to_radians();
        let k = if (standard_parallel.abs() - 90.0).abs() < 1e-12 {
            let e = ellipsoid.e();
            2.0 * ellipsoid.semi_major_axis
                / ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt()
        } else {
            ellipsoid.semi_major_axis * ellipsoid.m(phi_c) / ellipsoid.t(phi_c)
        };
        Ok(Self {
            lon0,
            north,
            false_easting,
            false_northing,
            ellipsoid,
            k,
        })
    }

    fn sign(&self) -> f64 {
        if self.north {
            1.0
        } else {
            -1.0
        }
    }
}

impl Projection for PolarStereographic {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
        check_geographic(lon, lat)?;
        let s = self.sign();
        if (s * lat + 90.0).abs() < 1e-12 {
            return Err(ProjectionError::out_of_domain(lon, lat, "opposite pole"));
        }
        let rho = self.k * self.ellipsoid.t((s * lat).to_radians());
        let dlon = normalize_dlon((lon - self.lon0).to_radians());
        Ok((
            self.false_easting + rho * dlon.sin(),
            self.false_northing - s * rho * dlon.cos(),
        ))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        check_projected(x, y)?;
        let s = self.sign();
        let dx = x - self.false_easting;
        let dy = y - self.false_northing;
        let t = dx.hypot(dy) / self.k;
        let lat = s * self.ellipsoid.phi_from_t(t).to_degrees();
        let lon = self.lon0 + dx.atan2(-s * dy).to_degrees();
        Ok((lon, lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_a_known_point() {
        let proj = PolarStereographic::with_scale_factor(
            0.0,
            true,
            0.994,
            2_000_000.0,
            2_000_000.0,
            Ellipsoid::WGS84,
        )
        .unwrap();
        let (x, y) = proj.forward(44.0, 73.0).unwrap();
        assert!((x - 3_320_416.75).abs() < 0.01, "easting {}", x);
        assert!((y - 632_668.43).abs() < 0.01, "northing {}", y);
    }

    #[test]
    fn test_variant_b_south_known_point() {
        let proj = PolarStereographic::with_standard_parallel(
            70.0,
            -71.0,
            6_000_000.0,
            6_000_000.0,
            Ellipsoid::WGS84,
        )
        .unwrap();
        let (x, y) = proj.forward(120.0, -75.0).unwrap();
        assert!((x - 7_255_380.79).abs() < 0.01, "easting {}", x);
        assert!((y - 7_053_389.56).abs() < 0.01, "northing {}", y);

        let (lon, lat) = proj.inverse(x, y).unwrap();
        assert!((lon - 120.0).abs() < 1e-9);
        assert!((lat + 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_nsidc_north_roundtrip() {
        let proj =
            PolarStereographic::with_standard_parallel(-45.0, 70.0, 0.0, 0.0, Ellipsoid::WGS84)
                .unwrap();
        let (x, y) = proj.forward(0.0, 60.0).unwrap();
        assert!(x > 0.0 && y < 0.0);
        let (lon, lat) = proj.inverse(x, y).unwrap();
        assert!(lon.abs() < 1e-9);
        assert!((lat - 60.0).abs() < 1e-9);
        assert!(proj.forward(0.0, -90.0).is_err());
    }
}
