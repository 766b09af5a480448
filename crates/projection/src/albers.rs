//! Albers Equal Area Conic projection on an ellipsoid.
//!
//! Formulas follow Snyder, "Map Projections: A Working Manual", 14-1 to
//! 14-21. Typical use is NAD83 / Conus Albers (EPSG:5070).

use std::f64::consts::FRAC_PI_2;

use crate::{
    check_geographic, check_latitude_param, check_projected, normalize_dlon, Ellipsoid, Projection,
    ProjectionError,
};

/// Albers Equal Area Conic projection parameters.
#[derive(Debug, Clone)]
pub struct AlbersEqualArea {
    /// Central meridian in degrees
    pub lon0: f64,
    /// Latitude of origin in degrees
    pub lat0: f64,
    /// First standard parallel in degrees
    pub latin1: f64,
    /// Second standard parallel in degrees
    pub latin2: f64,
    /// False easting (meters)
    pub false_easting: f64,
    /// False northing (meters)
    pub false_northing: f64,
    /// Reference ellipsoid
    pub ellipsoid: Ellipsoid,
    n: f64,
    c: f64,
    rho0: f64,
    qp: f64,
}

impl AlbersEqualArea {
    pub fn new(
        lon0: f64,
        lat0: f64,
        latin1: f64,
        latin2: f64,
        false_easting: f64,
        false_northing: f64,
        ellipsoid: Ellipsoid,
    ) -> Result<Self, ProjectionError> {
        check_latitude_param("latitude of origin", lat0)?;
        check_latitude_param("first standard parallel", latin1)?;
        check_latitude_param("second standard parallel", latin2)?;
        if (latin1 + latin2).abs() < 1e-10 {
            return Err(ProjectionError::InvalidParameters(
                "standard parallels must not be symmetric about the equator".to_string(),
            ));
        }

        let phi1 = latin1.to_radians();
        let phi2 = latin2.to_radians();
        let m1 = ellipsoid.m(phi1);
        let q1 = ellipsoid.q(phi1);
        let n = if (phi1 - phi2).abs() < 1e-10 {
            phi1.sin()
        } else {
            let m2 = ellipsoid.m(phi2);
            let q2 = ellipsoid.q(phi2);
            (m1 * m1 - m2 * m2) / (q2 - q1)
        };
        let c = m1 * m1 + n * q1;
        let a = ellipsoid.semi_major_axis;
        let rho0 = a * (c - n * ellipsoid.q(lat0.to_radians())).max(0.0).sqrt() / n;

        Ok(Self {
            lon0,
            lat0,
            latin1,
            latin2,
            false_easting,
            false_northing,
            ellipsoid,
            n,
            c,
            rho0,
            qp: ellipsoid.q(FRAC_PI_2),
        })
    }
}

impl Projection for AlbersEqualArea {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
        check_geographic(lon, lat)?;
        let a = self.ellipsoid.semi_major_axis;
        let rho = a * (self.c - self.n * self.ellipsoid.q(lat.to_radians())).max(0.0).sqrt()
            / self.n;
        let theta = self.n * normalize_dlon((lon - self.lon0).to_radians());
        Ok((
            self.false_easting + rho * theta.sin(),
            self.false_northing + self.rho0 - rho * theta.cos(),
        ))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        check_projected(x, y)?;
        let a = self.ellipsoid.semi_major_axis;
        let sign = self.n.signum();
        let dx = x - self.false_easting;
        let dy = self.rho0 - (y - self.false_northing);

        let rho = dx.hypot(dy);
        let theta = (sign * dx).atan2(sign * dy);
        let q = (self.c - (rho * self.n / a).powi(2)) / self.n;
        let ratio = q / self.qp;
        if ratio.abs() > 1.0 + 1e-9 {
            return Err(ProjectionError::out_of_domain(x, y, "outside the projected area"));
        }
        let beta = ratio.clamp(-1.0, 1.0).asin();

        let lat = self.ellipsoid.phi_from_authalic(beta).to_degrees();
        let lon = self.lon0 + (theta / self.n).to_degrees();
        Ok((lon, lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snyder_known_point() {
        // Snyder's worked example on Clarke 1866
        let clarke = Ellipsoid::new(6378206.4, 294.9786982);
        let proj = AlbersEqualArea::new(-96.0, 23.0, 29.5, 45.5, 0.0, 0.0, clarke).unwrap();
        let (x, y) = proj.forward(-75.0, 35.0).unwrap();
        assert!((x - 1_885_472.7).abs() < 0.1, "x {}", x);
        assert!((y - 1_535_925.0).abs() < 0.1, "y {}", y);

        let (lon, lat) = proj.inverse(x, y).unwrap();
        assert!((lon + 75.0).abs() < 1e-9);
        assert!((lat - 35.0).abs() < 1e-7);
    }

    #[test]
    fn test_origin() {
        let proj =
            AlbersEqualArea::new(-96.0, 23.0, 29.5, 45.5, 0.0, 0.0, Ellipsoid::GRS80).unwrap();
        let (x, y) = proj.forward(-96.0, 23.0).unwrap();
        assert!(x.abs() < 1e-6);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn test_symmetric_parallels_rejected() {
        assert!(AlbersEqualArea::new(0.0, 0.0, 20.0, -20.0, 0.0, 0.0, Ellipsoid::WGS84).is_err());
    }
}
