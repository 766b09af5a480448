//! Transverse Mercator projection on an ellipsoid.
//!
//! This is the projection behind the UTM zones. It maps a cylinder tangent
//! to a meridian onto a flat plane; scale is exact along the central meridian
//! (times `k0`) and distortion grows with distance from it.
//!
//! The series expansions follow Snyder, "Map Projections: A Working Manual"
//! (USGS Professional Paper 1395), equations 8-9 to 8-25. They are accurate
//! to well below a millimeter within a UTM zone and degrade gracefully a few
//! degrees beyond it.

use crate::{
    check_geographic, check_latitude_param, check_projected, normalize_dlon, Ellipsoid, Projection,
    ProjectionError,
};

/// Transverse Mercator projection parameters.
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    /// Central meridian in degrees
    pub lon0: f64,
    /// Latitude of origin in degrees
    pub lat0: f64,
    /// Scale factor at the central meridian
    pub k0: f64,
    /// False easting (meters)
    pub false_easting: f64,
    /// False northing (meters)
    pub false_northing: f64,
    /// Reference ellipsoid
    pub ellipsoid: Ellipsoid,
    /// Meridional distance of the latitude of origin
    m0: f64,
}

impl TransverseMercator {
    /// Create a Transverse Mercator projection.
    pub fn new(
        lon0: f64,
        lat0: f64,
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
        check_latitude_param("latitude of origin", lat0)?;
        let m0 = meridional_distance(&ellipsoid, lat0.to_radians());
        Ok(Self {
            lon0,
            lat0,
            k0,
            false_easting,
            false_northing,
            ellipsoid,
            m0,
        })
    }

    /// Create the projection for a WGS84 UTM zone.
    ///
    /// # Arguments
    /// * `zone` - UTM zone number (1-60)
    /// * `south` - Whether this is the southern hemisphere variant
    ///   (10,000 km false northing)
    pub fn utm(zone: u8, south: bool) -> Result<Self, ProjectionError> {
        if !(1..=60).contains(&zone) {
            return Err(ProjectionError::InvalidParameters(format!(
                "UTM zone must be 1-60, got {}",
                zone
            )));
        }
        let false_northing = if south { 10_000_000.0 } else { 0.0 };
        Self::new(
            utm_central_meridian(zone),
            0.0,
            0.9996,
            500_000.0,
            false_northing,
            Ellipsoid::WGS84,
        )
    }
}

/// Central meridian of a UTM zone in degrees.
pub fn utm_central_meridian(zone: u8) -> f64 {
    -183.0 + 6.0 * zone as f64
}

/// Distance along the meridian from the equator to latitude `phi` (radians).
fn meridional_distance(ellipsoid: &Ellipsoid, phi: f64) -> f64 {
    let a = ellipsoid.semi_major_axis;
    let e2 = ellipsoid.e2();
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    a * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
        - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
        + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
        - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}

impl Projection for TransverseMercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
        check_geographic(lon, lat)?;
        let dlon = normalize_dlon((lon - self.lon0).to_radians());
        if dlon.abs() >= std::f64::consts::FRAC_PI_2 {
            return Err(ProjectionError::out_of_domain(
                lon,
                lat,
                "more than 90 degrees from the central meridian",
            ));
        }

        let a = self.ellipsoid.semi_major_axis;
        let e2 = self.ellipsoid.e2();
        let ep2 = self.ellipsoid.ep2();

        let phi = lat.to_radians();
        let sin_phi = phi.sin();
        let cos_phi = phi.cos();
        let tan_phi = phi.tan();

        let n = a / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let aa = dlon * cos_phi;
        let m = meridional_distance(&self.ellipsoid, phi);

        let x = self.k0
            * n
            * (aa
                + (1.0 - t + c) * aa.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * aa.powi(5) / 120.0);

        let y = self.k0
            * (m - self.m0
                + n * tan_phi
                    * (aa * aa / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c * c) * aa.powi(4) / 24.0
                        + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * aa.powi(6)
                            / 720.0));

        Ok((x + self.false_easting, y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        check_projected(x, y)?;

        let a = self.ellipsoid.semi_major_axis;
        let e2 = self.ellipsoid.e2();
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let ep2 = self.ellipsoid.ep2();

        // Footpoint latitude
        let m = self.m0 + (y - self.false_northing) / self.k0;
        let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
        let sqrt_1_e2 = (1.0 - e2).sqrt();
        let e1 = (1.0 - sqrt_1_e2) / (1.0 + sqrt_1_e2);

        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        if phi1.abs() >= std::f64::consts::FRAC_PI_2 {
            return Err(ProjectionError::out_of_domain(x, y, "beyond the pole"));
        }

        let sin_phi1 = phi1.sin();
        let cos_phi1 = phi1.cos();
        let tan_phi1 = phi1.tan();

        let c1 = ep2 * cos_phi1 * cos_phi1;
        let t1 = tan_phi1 * tan_phi1;
        let denom = 1.0 - e2 * sin_phi1 * sin_phi1;
        let n1 = a / denom.sqrt();
        let r1 = a * (1.0 - e2) / denom.powf(1.5);
        let d = (x - self.false_easting) / (n1 * self.k0);

        let phi = phi1
            - (n1 * tan_phi1 / r1)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);

        let lambda = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d.powi(5)
                / 120.0)
            / cos_phi1;

        Ok((self.lon0 + lambda.to_degrees(), phi.to_degrees()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utm_central_meridian() {
        assert_eq!(utm_central_meridian(1), -177.0);
        assert_eq!(utm_central_meridian(31), 3.0);
        assert_eq!(utm_central_meridian(33), 15.0);
    }

    #[test]
    fn test_utm_zone_out_of_range() {
        assert!(TransverseMercator::utm(0, false).is_err());
        assert!(TransverseMercator::utm(61, false).is_err());
    }

    #[test]
    fn test_central_meridian_maps_to_false_easting() {
        let proj = TransverseMercator::utm(33, false).unwrap();
        let (x, y) = proj.forward(15.0, 0.0).unwrap();
        assert!((x - 500_000.0).abs() < 1e-6, "x should be 500000, got {}", x);
        assert!(y.abs() < 1e-6, "y should be 0, got {}", y);
    }

    #[test]
    fn test_utm33n_known_point() {
        // 10°E 52°N lies west of the zone 33 central meridian (15°E).
        // Reference values from the Krüger series: 156852.777 E, 5772850.028 N.
        let proj = TransverseMercator::utm(33, false).unwrap();
        let (x, y) = proj.forward(10.0, 52.0).unwrap();
        assert!((x - 156_852.777).abs() < 0.01, "easting mismatch: {}", x);
        assert!((y - 5_772_850.028).abs() < 0.01, "northing mismatch: {}", y);
    }

    #[test]
    fn test_utm_roundtrip() {
        let proj = TransverseMercator::utm(33, false).unwrap();
        for &(lon, lat) in &[(15.0, 52.0), (12.5, 48.1), (17.9, 60.0), (13.0, 1.0)] {
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert!((lon - lon2).abs() < 1e-7, "lon roundtrip failed: {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-7, "lat roundtrip failed: {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_utm_south_false_northing() {
        let proj = TransverseMercator::utm(33, true).unwrap();
        let (_, y) = proj.forward(15.0, -10.0).unwrap();
        assert!(y > 8_000_000.0 && y < 10_000_000.0, "got {}", y);

        let (lon, lat) = proj.inverse(500_000.0, y).unwrap();
        assert!((lon - 15.0).abs() < 1e-9);
        assert!((lat + 10.0).abs() < 1e-7);
    }

    #[test]
    fn test_forward_rejects_far_side() {
        let proj = TransverseMercator::utm(33, false).unwrap();
        assert!(proj.forward(15.0 + 120.0, 10.0).is_err());
        assert!(proj.forward(15.0, 91.0).is_err());
    }

    #[test]
    fn test_wrapped_longitude() {
        let proj = TransverseMercator::utm(33, false).unwrap();
        let (x1, y1) = proj.forward(12.0, 45.0).unwrap();
        let (x2, y2) = proj.forward(12.0 + 720.0, 45.0).unwrap();
        assert!((x1 - x2).abs() < 1e-6);
        assert!((y1 - y2).abs() < 1e-6);
    }

    #[test]
    fn test_grs80_zone_differs_slightly_from_wgs84() {
        let wgs = TransverseMercator::utm(32, false).unwrap();
        let grs = TransverseMercator::new(9.0, 0.0, 0.9996, 500_000.0, 0.0, Ellipsoid::GRS80).unwrap();
        let (_, y1) = wgs.forward(10.0, 52.0).unwrap();
        let (_, y2) = grs.forward(10.0, 52.0).unwrap();
        assert!((y1 - y2).abs() < 0.01);
    }
}
