//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A geographic or projected bounding box.
///
/// For geographic CRS, coordinates are in degrees.
/// For projected CRS (UTM, Web Mercator), coordinates are in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounding box of a regular grid given its origin, cell size and cell count.
    ///
    /// The first corner is the grid origin, the second is
    /// `origin + size * resolution` along each axis.
    pub fn from_grid(start: (f64, f64), resolution: (f64, f64), size: (usize, usize)) -> Self {
        Self {
            min_x: start.0,
            min_y: start.1,
            max_x: start.0 + size.0 as f64 * resolution.0,
            max_y: start.1 + size.1 as f64 * resolution.1,
        }
    }

    /// Center point of the bounding box.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Closed WKT polygon ring, counter-clockwise from the minimum corner
    /// through the top-left corner.
    pub fn to_wkt_polygon(&self) -> String {
        format!(
            "POLYGON(({min_x} {min_y}, {min_x} {max_y}, {max_x} {max_y}, {max_x} {min_y}, {min_x} {min_y}))",
            min_x = self.min_x,
            min_y = self.min_y,
            max_x = self.max_x,
            max_y = self.max_y,
        )
    }
}
