//! Reference ellipsoids and the latitude functions shared by the
//! conformal and equal-area projections.
//!
//! The isometric (`t`) and authalic (`q`) functions follow Snyder, "Map
//! Projections: A Working Manual", equations 3-1, 7-9, 3-12 and 15-9.

use std::f64::consts::FRAC_PI_2;
use std::f64::consts::FRAC_PI_4;

/// A reference ellipsoid defined by semi-major axis and inverse flattening.
///
/// An inverse flattening of zero denotes a sphere, as in CF and PROJ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (meters)
    pub semi_major_axis: f64,
    /// Inverse flattening (1/f), 0 for a sphere
    pub inverse_flattening: f64,
}

impl Ellipsoid {
    /// WGS 84 ellipsoid.
    pub const WGS84: Ellipsoid = Ellipsoid {
        semi_major_axis: 6378137.0,
        inverse_flattening: 298.257223563,
    };

    /// GRS 1980 ellipsoid (ETRS89, NAD83).
    pub const GRS80: Ellipsoid = Ellipsoid {
        semi_major_axis: 6378137.0,
        inverse_flattening: 298.257222101,
    };

    /// Ellipsoid from semi-major axis and inverse flattening.
    pub fn new(semi_major_axis: f64, inverse_flattening: f64) -> Self {
        Self {
            semi_major_axis,
            inverse_flattening,
        }
    }

    /// Sphere of the given radius.
    pub fn sphere(radius: f64) -> Self {
        Self::new(radius, 0.0)
    }

    /// Ellipsoid from both axes.
    pub fn from_axes(semi_major_axis: f64, semi_minor_axis: f64) -> Self {
        if semi_major_axis == semi_minor_axis {
            return Self::sphere(semi_major_axis);
        }
        Self::new(
            semi_major_axis,
            semi_major_axis / (semi_major_axis - semi_minor_axis),
        )
    }

    pub fn is_sphere(&self) -> bool {
        self.inverse_flattening == 0.0
    }

    /// Flattening.
    pub fn flattening(&self) -> f64 {
        if self.is_sphere() {
            0.0
        } else {
            1.0 / self.inverse_flattening
        }
    }

    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        let f = self.flattening();
        f * (2.0 - f)
    }

    /// First eccentricity.
    pub fn e(&self) -> f64 {
        self.e2().sqrt()
    }

    /// Second eccentricity squared.
    pub fn ep2(&self) -> f64 {
        let e2 = self.e2();
        e2 / (1.0 - e2)
    }

    /// Semi-minor axis (meters).
    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.flattening())
    }

    /// `cos φ / sqrt(1 - e² sin² φ)`.
    pub fn m(&self, phi: f64) -> f64 {
        phi.cos() / (1.0 - self.e2() * phi.sin().powi(2)).sqrt()
    }

    /// Isometric latitude function `t(φ)`; zero at the north pole.
    pub fn t(&self, phi: f64) -> f64 {
        let e = self.e();
        let es = e * phi.sin();
        (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - es) / (1.0 + es)).powf(e / 2.0)
    }

    /// Latitude from `t`, through the conformal latitude series.
    pub fn phi_from_t(&self, t: f64) -> f64 {
        let chi = FRAC_PI_2 - 2.0 * t.atan();
        let e2 = self.e2();
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let e8 = e6 * e2;
        chi + (e2 / 2.0 + 5.0 * e4 / 24.0 + e6 / 12.0 + 13.0 * e8 / 360.0) * (2.0 * chi).sin()
            + (7.0 * e4 / 48.0 + 29.0 * e6 / 240.0 + 811.0 * e8 / 11520.0) * (4.0 * chi).sin()
            + (7.0 * e6 / 120.0 + 81.0 * e8 / 1120.0) * (6.0 * chi).sin()
            + (4279.0 * e8 / 161280.0) * (8.0 * chi).sin()
    }

    /// Authalic function `q(φ)`.
    pub fn q(&self, phi: f64) -> f64 {
        let sin_phi = phi.sin();
        if self.is_sphere() {
            return 2.0 * sin_phi;
        }
        let e = self.e();
        let es = e * sin_phi;
        (1.0 - self.e2())
            * (sin_phi / (1.0 - es * es) - (1.0 / (2.0 * e)) * ((1.0 - es) / (1.0 + es)).ln())
    }

    /// Latitude from the authalic latitude `β`.
    pub fn phi_from_authalic(&self, beta: f64) -> f64 {
        let e2 = self.e2();
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        beta + (e2 / 3.0 + 31.0 * e4 / 180.0 + 517.0 * e6 / 5040.0) * (2.0 * beta).sin()
            + (23.0 * e4 / 360.0 + 251.0 * e6 / 3780.0) * (4.0 * beta).sin()
            + (761.0 * e6 / 45360.0) * (6.0 * beta).sin()
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}
