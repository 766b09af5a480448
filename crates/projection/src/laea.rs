//! Lambert Azimuthal Equal Area projection on an ellipsoid.
//!
//! Used for continental statistics grids such as ETRS89-extended / LAEA
//! Europe (EPSG:3035). Oblique and polar aspects follow EPSG method 9820
//! (IOGP Guidance Note 7-2); the inverse uses the authalic latitude series.

use std::f64::consts::FRAC_PI_2;

use crate::{
    check_geographic, check_latitude_param, check_projected, normalize_dlon, Ellipsoid, Projection,
    ProjectionError,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Aspect {
    North,
    South,
    Oblique,
}

/// Lambert Azimuthal Equal Area projection parameters.
#[derive(Debug, Clone)]
pub struct LambertAzimuthalEqualArea {
    /// Longitude of origin in degrees
    pub lon0: f64,
    /// Latitude of origin in degrees
    pub lat0: f64,
    /// False easting (meters)
    pub false_easting: f64,
    /// False northing (meters)
    pub false_northing: f64,
    /// Reference ellipsoid
    pub ellipsoid: Ellipsoid,
    aspect: Aspect,
    /// q at the pole
    qp: f64,
    /// Authalic latitude of the origin
    beta0: f64,
    /// Radius of the authalic sphere
    rq: f64,
    d: f64,
}

impl LambertAzimuthalEqualArea {
    pub fn new(
        lon0: f64,
        lat0: f64,
        false_easting: f64,
        false_northing: f64,
        ellipsoid: Ellipsoid,
    ) -> Result<Self, ProjectionError> {
        check_latitude_param("latitude of origin", lat0)?;
        let a = ellipsoid.semi_major_axis;
        let phi0 = lat0.to_radians();
        let qp = ellipsoid.q(FRAC_PI_2);
        let beta0 = (ellipsoid.q(phi0) / qp).clamp(-1.0, 1.0).asin();
        let rq = a * (qp / 2.0).sqrt();

        let aspect = if (lat0 - 90.0).abs() < 1e-12 {
            Aspect::North
        } else if (lat0 + 90.0).abs() < 1e-12 {
            Aspect::South
        } else {
            Aspect::Oblique
        };
        let d = match aspect {
            Aspect::Oblique => a * ellipsoid.m(phi0) / (rq * beta0.cos()),
            _ => 1.0,
        };

        Ok(Self {
            lon0,
            lat0,
            false_easting,
            false_northing,
            ellipsoid,
            aspect,
            qp,
            beta0,
            rq,
            d,
        })
    }

    fn authalic(&self, phi: f64) -> f64 {
        (self.ellipsoid.q(phi) / self.qp).clamp(-1.0, 1.0).asin()
    }
}

impl Projection for LambertAzimuthalEqualArea {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
        check_geographic(lon, lat)?;
        let a = self.ellipsoid.semi_major_axis;
        let phi = lat.to_radians();
        let dlon = normalize_dlon((lon - self.lon0).to_radians());

        let (dx, dy) = match self.aspect {
            Aspect::North => {
                let rho = a * (self.qp - self.ellipsoid.q(phi)).max(0.0).sqrt();
                (rho * dlon.sin(), -rho * dlon.cos())
            }
            Aspect::South => {
                let rho = a * (self.qp + self.ellipsoid.q(phi)).max(0.0).sqrt();
                (rho * dlon.sin(), rho * dlon.cos())
            }
            Aspect::Oblique => {
                let beta = self.authalic(phi);
                let denom = 1.0
                    + self.beta0.sin() * beta.sin()
                    + self.beta0.cos() * beta.cos() * dlon.cos();
                if denom <= 1e-15 {
                    return Err(ProjectionError::out_of_domain(
                        lon,
                        lat,
                        "antipode of the projection origin",
                    ));
                }
                let b = self.rq * (2.0 / denom).sqrt();
                (
                    b * self.d * beta.cos() * dlon.sin(),
                    (b / self.d)
                        * (self.beta0.cos() * beta.sin()
                            - self.beta0.sin() * beta.cos() * dlon.cos()),
                )
            }
        };
        Ok((self.false_easting + dx, self.false_northing + dy))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        check_projected(x, y)?;
        let a = self.ellipsoid.semi_major_axis;
        let dx = x - self.false_easting;
        let dy = y - self.false_northing;

        let (beta, dlon) = match self.aspect {
            Aspect::North | Aspect::South => {
                let rho = dx.hypot(dy);
                let ratio = rho * rho / (a * a * self.qp);
                if ratio > 2.0 + 1e-12 {
                    return Err(ProjectionError::out_of_domain(x, y, "outside the projected disc"));
                }
                if self.aspect == Aspect::North {
                    ((1.0 - ratio).clamp(-1.0, 1.0).asin(), dx.atan2(-dy))
                } else {
                    (-(1.0 - ratio).clamp(-1.0, 1.0).asin(), dx.atan2(dy))
                }
            }
            Aspect::Oblique => {
                let rho = (dx / self.d).hypot(self.d * dy);
                if rho == 0.0 {
                    return Ok((self.lon0, self.lat0));
                }
                let sin_c_half = rho / (2.0 * self.rq);
                if sin_c_half > 1.0 + 1e-12 {
                    return Err(ProjectionError::out_of_domain(x, y, "outside the projected disc"));
                }
                let c = 2.0 * sin_c_half.min(1.0).asin();
                let beta = (c.cos() * self.beta0.sin()
                    + self.d * dy * c.sin() * self.beta0.cos() / rho)
                    .clamp(-1.0, 1.0)
                    .asin();
                let dlon = (dx * c.sin()).atan2(
                    self.d * rho * self.beta0.cos() * c.cos()
                        - self.d * self.d * dy * self.beta0.sin() * c.sin(),
                );
                (beta, dlon)
            }
        };

        let lat = self.ellipsoid.phi_from_authalic(beta).to_degrees();
        Ok((self.lon0 + dlon.to_degrees(), lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laea_europe() -> LambertAzimuthalEqualArea {
        LambertAzimuthalEqualArea::new(10.0, 52.0, 4_321_000.0, 3_210_000.0, Ellipsoid::GRS80)
            .unwrap()
    }

    #[test]
    fn test_origin_maps_to_false_origin() {
        let (x, y) = laea_europe().forward(10.0, 52.0).unwrap();
        assert!((x - 4_321_000.0).abs() < 1e-6);
        assert!((y - 3_210_000.0).abs() < 1e-6);
        let (lon, lat) = laea_europe().inverse(4_321_000.0, 3_210_000.0).unwrap();
        assert_eq!((lon, lat), (10.0, 52.0));
    }

    #[test]
    fn test_laea_europe_known_point() {
        // IOGP Guidance Note 7-2 example for EPSG:3035
        let (x, y) = laea_europe().forward(5.0, 50.0).unwrap();
        assert!((x - 3_962_799.45).abs() < 0.01, "easting {}", x);
        assert!((y - 2_999_718.85).abs() < 0.01, "northing {}", y);
    }

    #[test]
    fn test_roundtrip() {
        let proj = laea_europe();
        for &(lon, lat) in &[(5.0, 50.0), (-20.0, 35.0), (40.0, 70.0), (10.0, 30.0)] {
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert!((lon - lon2).abs() < 1e-9, "lon {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-7, "lat {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_polar_aspects_roundtrip() {
        for lat0 in [90.0, -90.0] {
            let proj = LambertAzimuthalEqualArea::new(0.0, lat0, 0.0, 0.0, Ellipsoid::WGS84).unwrap();
            let lat = lat0.signum() * 70.0;
            let (x, y) = proj.forward(45.0, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert!((lon2 - 45.0).abs() < 1e-9, "lon {}", lon2);
            assert!((lat2 - lat).abs() < 1e-7, "lat {}", lat2);
        }
    }

    #[test]
    fn test_sphere() {
        let proj =
            LambertAzimuthalEqualArea::new(0.0, 0.0, 0.0, 0.0, Ellipsoid::sphere(6_371_000.0))
                .unwrap();
        let (x, y) = proj.forward(30.0, 20.0).unwrap();
        let (lon, lat) = proj.inverse(x, y).unwrap();
        assert!((lon - 30.0).abs() < 1e-9);
        assert!((lat - 20.0).abs() < 1e-9);
    }
}
