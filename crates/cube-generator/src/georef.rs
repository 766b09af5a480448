//! Geospatial extent attributes in CRS84.

use serde_json::json;
use tracing::debug;

use cube_common::{Attributes, BoundingBox, Crs, CubeResult};

/// Geographic extent and (approximate) resolution of a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeospatialExtent {
    pub lon_min: f64,
    pub lat_min: f64,
    pub lon_max: f64,
    pub lat_max: f64,
    pub lon_res: f64,
    pub lat_res: f64,
}

impl GeospatialExtent {
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.lon_min, self.lat_min, self.lon_max, self.lat_max)
    }

    /// CF `geospatial_*` attributes.
    pub fn to_attrs(&self) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert("geospatial_lon_units".into(), json!("degrees_east"));
        attrs.insert("geospatial_lon_min".into(), json!(self.lon_min));
        attrs.insert("geospatial_lon_max".into(), json!(self.lon_max));
        attrs.insert("geospatial_lon_resolution".into(), json!(self.lon_res));
        attrs.insert("geospatial_lat_units".into(), json!("degrees_north"));
        attrs.insert("geospatial_lat_min".into(), json!(self.lat_min));
        attrs.insert("geospatial_lat_max".into(), json!(self.lat_max));
        attrs.insert("geospatial_lat_resolution".into(), json!(self.lat_res));
        attrs.insert("geospatial_bounds_crs".into(), json!("CRS84"));
        attrs.insert(
            "geospatial_bounds".into(),
            json!(self.bbox().to_wkt_polygon()),
        );
        attrs
    }
}

/// Derives CRS84 extents from a grid in its native CRS.
#[derive(Debug, Clone)]
pub struct GeoReferencer {
    crs: Crs,
}

impl GeoReferencer {
    pub fn new(crs: Crs) -> Self {
        Self { crs }
    }

    /// Compute the extent of `bbox` with cell size `res`, both in native
    /// coordinates.
    ///
    /// For a projected CRS the two corners are transformed independently,
    /// and the resolution is estimated from the transformed grid center and
    /// the point one cell step away from it. This can be far off the true
    /// cell size away from the projection's central meridian.
    pub fn extent(&self, bbox: &BoundingBox, res: (f64, f64)) -> CubeResult<GeospatialExtent> {
        if self.crs.is_geographic() {
            return Ok(GeospatialExtent {
                lon_min: bbox.min_x,
                lat_min: bbox.min_y,
                lon_max: bbox.max_x,
                lat_max: bbox.max_y,
                lon_res: res.0,
                lat_res: res.1,
            });
        }

        let (lon_min, lat_min) = self.crs.to_crs84(bbox.min_x, bbox.min_y)?;
        let (lon_max, lat_max) = self.crs.to_crs84(bbox.max_x, bbox.max_y)?;

        let (xm, ym) = bbox.center();
        let (lon_m1, lat_m1) = self.crs.to_crs84(xm, ym)?;
        let (lon_m2, lat_m2) = self.crs.to_crs84(xm + res.0, ym + res.1)?;

        let extent = GeospatialExtent {
            lon_min,
            lat_min,
            lon_max,
            lat_max,
            lon_res: (lon_m2 - lon_m1).abs(),
            lat_res: (lat_m2 - lat_m1).abs(),
        };
        debug!(crs = %self.crs, ?extent, "Reprojected grid extent to CRS84");
        Ok(extent)
    }

    pub fn geospatial_attrs(&self, bbox: &BoundingBox, res: (f64, f64)) -> CubeResult<Attributes> {
        Ok(self.extent(bbox, res)?.to_attrs())
    }
}

/// Project a CRS84 `(lon, lat)` point into `crs`.
pub fn from_crs84(coord: (f64, f64), crs: &Crs) -> CubeResult<(f64, f64)> {
    crs.from_crs84(coord.0, coord.1)
}
