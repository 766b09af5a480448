//! Lambert Conformal Conic projection on an ellipsoid.
//!
//! Maps a cone tangent or secant to the ellipsoid onto a flat plane. Used
//! for mid-latitude regions with a large east-west extent, e.g. ETRS89 /
//! LCC Europe (EPSG:3034) and RGF93 / Lambert-93 (EPSG:2154).
//!
//! The projection parameters include:
//! - Latitude of origin (lat0): the latitude of the false origin
//! - Central meridian (lon0)
//! - Standard parallel(s): latin1 and latin2 (equal for a tangent cone)
//!
//! Formulas follow Snyder, "Map Projections: A Working Manual", 15-1 to 15-11.

use crate::{
    check_geographic, check_latitude_param, check_projected, normalize_dlon, Ellipsoid, Projection,
    ProjectionError,
};

/// Lambert Conformal Conic projection parameters.
#[derive(Debug, Clone)]
pub struct LambertConformal {
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
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the latitude of origin
    rho0: f64,
}

impl LambertConformal {
    /// Create a Lambert Conformal Conic projection.
    ///
    /// With `latin1 == latin2` the cone is tangent along that parallel.
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
        if latin1.abs() >= 90.0 || latin2.abs() >= 90.0 {
            return Err(ProjectionError::InvalidParameters(
                "standard parallels must not be poles".to_string(),
            ));
        }
        if (latin1 + latin2).abs() < 1e-10 {
            return Err(ProjectionError::InvalidParameters(
                "standard parallels must not be symmetric about the equator".to_string(),
            ));
        }

        let phi1 = latin1.to_radians();
        let phi2 = latin2.to_radians();
        let m1 = ellipsoid.m(phi1);
        let t1 = ellipsoid.t(phi1);

        // Compute cone constant n
        let n = if (phi1 - phi2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            phi1.sin()
        } else {
            // Secant cone (two standard parallels)
            let m2 = ellipsoid.m(phi2);
            let t2 = ellipsoid.t(phi2);
            (m1.ln() - m2.ln()) / (t1.ln() - t2.ln())
        };

        if (lat0 + 90.0 * n.signum()).abs() < 1e-12 {
            return Err(ProjectionError::InvalidParameters(format!(
                "latitude of origin {} is the apex of the opposite cone",
                lat0
            )));
        }
        let f = m1 / (n * t1.powf(n));
        let rho0 = ellipsoid.semi_major_axis * f * ellipsoid.t(lat0.to_radians()).powf(n);

        Ok(Self {
            lon0,
            lat0,
            latin1,
            latin2,
            false_easting,
            false_northing,
            ellipsoid,
            n,
            f,
            rho0,
        })
    }

    /// Apply a scale factor at the latitude of origin (the 1SP variant).
    pub fn with_scale_factor(mut self, k0: f64) -> Result<Self, ProjectionError> {
        if !(k0 > 0.0) || !k0.is_finite() {
            return Err(ProjectionError::InvalidParameters(format!(
                "scale factor must be positive, got {}",
                k0
            )));
        }
        self.f *= k0;
        self.rho0 *= k0;
        Ok(self)
    }

    /// Cone constant.
    pub fn cone_constant(&self) -> f64 {
        self.n
    }
}

impl Projection for LambertConformal {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
        check_geographic(lon, lat)?;
        if (lat + 90.0 * self.n.signum()).abs() < 1e-12 {
            return Err(ProjectionError::out_of_domain(
                lon,
                lat,
                "pole opposite to the cone apex",
            ));
        }
        let a = self.ellipsoid.semi_major_axis;
        let rho = a * self.f * self.ellipsoid.t(lat.to_radians()).powf(self.n);
        let theta = self.n * normalize_dlon((lon - self.lon0).to_radians());
        let x = self.false_easting + rho * theta.sin();
        let y = self.false_northing + self.rho0 - rho * theta.cos();
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        check_projected(x, y)?;
        let a = self.ellipsoid.semi_major_axis;
        let sign = self.n.signum();
        let dx = x - self.false_easting;
        let dy = self.rho0 - (y - self.false_northing);

        let rho = sign * dx.hypot(dy);
        let t = (rho / (a * self.f)).powf(1.0 / self.n);
        let theta = (sign * dx).atan2(sign * dy);

        let lat = self.ellipsoid.phi_from_t(t).to_degrees();
        let lon = self.lon0 + (theta / self.n).to_degrees();
        Ok((lon, lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lcc_europe() -> LambertConformal {
        LambertConformal::new(10.0, 52.0, 35.0, 65.0, 4_000_000.0, 2_800_000.0, Ellipsoid::GRS80)
            .unwrap()
    }

    #[test]
    fn test_origin_maps_to_false_origin() {
        let (x, y) = lcc_europe().forward(10.0, 52.0).unwrap();
        assert!((x - 4_000_000.0).abs() < 1e-6, "x {}", x);
        assert!((y - 2_800_000.0).abs() < 1e-6, "y {}", y);
    }

    #[test]
    fn test_two_parallel_known_point() {
        // NAD27 / Texas South Central on Clarke 1866, in US survey feet
        let ft = 1200.0 / 3937.0;
        let clarke = Ellipsoid::new(6378206.4, 294.9786982);
        let proj = LambertConformal::new(
            -99.0,
            27.0 + 50.0 / 60.0,
            28.0 + 23.0 / 60.0,
            30.0 + 17.0 / 60.0,
            2_000_000.0 * ft,
            0.0,
            clarke,
        )
        .unwrap();
        let (x, y) = proj.forward(-96.0, 28.5).unwrap();
        assert!((x / ft - 2_963_503.91).abs() < 0.01, "easting {}", x / ft);
        assert!((y / ft - 254_759.80).abs() < 0.01, "northing {}", y / ft);
    }

    #[test]
    fn test_roundtrip() {
        let proj = lcc_europe();
        for &(lon, lat) in &[(5.0, 50.0), (-10.0, 38.0), (30.0, 65.0), (10.0, 52.0)] {
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert!((lon - lon2).abs() < 1e-9, "lon {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-9, "lat {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_tangent_cone() {
        let proj =
            LambertConformal::new(3.0, 46.5, 46.5, 46.5, 700_000.0, 6_600_000.0, Ellipsoid::GRS80)
                .unwrap();
        assert!((proj.cone_constant() - 46.5f64.to_radians().sin()).abs() < 1e-12);
        let (x, y) = proj.forward(2.35, 48.85).unwrap();
        let (lon, lat) = proj.inverse(x, y).unwrap();
        assert!((lon - 2.35).abs() < 1e-9);
        assert!((lat - 48.85).abs() < 1e-9);
    }

    #[test]
    fn test_southern_cone() {
        let proj =
            LambertConformal::new(135.0, -32.0, -28.0, -36.0, 0.0, 0.0, Ellipsoid::GRS80).unwrap();
        assert!(proj.cone_constant() < 0.0);
        let (x, y) = proj.forward(140.0, -30.0).unwrap();
        let (lon, lat) = proj.inverse(x, y).unwrap();
        assert!((lon - 140.0).abs() < 1e-9);
        assert!((lat + 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(LambertConformal::new(0.0, 0.0, 30.0, -30.0, 0.0, 0.0, Ellipsoid::WGS84).is_err());
        assert!(LambertConformal::new(0.0, 0.0, 90.0, 60.0, 0.0, 0.0, Ellipsoid::WGS84).is_err());
        assert!(LambertConformal::new(0.0, 95.0, 30.0, 60.0, 0.0, 0.0, Ellipsoid::WGS84).is_err());
    }

    #[test]
    fn test_opposite_pole_rejected() {
        assert!(lcc_europe().forward(10.0, -90.0).is_err());
    }
}
