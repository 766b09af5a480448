//! Spatial coordinate axes.
//!
//! A regular axis of `size` cells starting at `start` with cell size
//! `resolution` has centers `start + resolution * (i + 0.5)` and cell
//! bounds `(start + resolution * i, start + resolution * (i + 1))`.

use serde_json::json;

use cube_common::{ArrayValues, CubeError, CubeResult, DataType, Variable};

/// Name of the dimension holding the two cell edges of a bounds variable.
pub const BNDS_DIM: &str = "bnds";

/// Whether an axis runs along x (columns) or y (rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisRole {
    X,
    Y,
}

/// Builder for one regular spatial axis.
#[derive(Debug, Clone)]
pub struct GridAxisBuilder {
    name: String,
    role: AxisRole,
    start: f64,
    resolution: f64,
    size: usize,
    inverse: bool,
    units: String,
    dtype: DataType,
    with_bounds: bool,
}

impl GridAxisBuilder {
    pub fn new(
        name: impl Into<String>,
        role: AxisRole,
        start: f64,
        resolution: f64,
        size: usize,
    ) -> Self {
        Self {
            name: name.into(),
            role,
            start,
            resolution,
            size,
            inverse: false,
            units: String::new(),
            dtype: DataType::Float64,
            with_bounds: true,
        }
    }

    pub fn units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    /// Reverse the axis so values decrease.
    pub fn inverse(mut self, inverse: bool) -> Self {
        self.inverse = inverse;
        self
    }

    pub fn dtype(mut self, dtype: DataType) -> Self {
        self.dtype = dtype;
        self
    }

    pub fn bounds(mut self, with_bounds: bool) -> Self {
        self.with_bounds = with_bounds;
        self
    }

    /// Whether the axis name or units mark it as longitude/latitude.
    pub fn is_geographic(&self) -> bool {
        match self.role {
            AxisRole::X => self.name == "lon" || self.units == "degrees_east",
            AxisRole::Y => self.name == "lat" || self.units == "degrees_north",
        }
    }

    pub fn build(&self) -> CubeResult<GridAxis> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(CubeError::invalid_parameter(
                "resolution",
                format!(
                    "resolution of axis '{}' must be positive, got {}",
                    self.name, self.resolution
                ),
            ));
        }
        if !self.start.is_finite() {
            return Err(CubeError::invalid_parameter(
                "start",
                format!("start of axis '{}' must be finite", self.name),
            ));
        }

        let round = |v: f64| match self.dtype {
            DataType::Float32 => v as f32 as f64,
            _ => v,
        };

        let mut centers: Vec<f64> = (0..self.size)
            .map(|i| round(self.start + self.resolution * (i as f64 + 0.5)))
            .collect();

        let mut bounds = self.with_bounds.then(|| {
            (0..self.size)
                .map(|i| {
                    [
                        round(self.start + self.resolution * i as f64),
                        round(self.start + self.resolution * (i + 1) as f64),
                    ]
                })
                .collect::<Vec<[f64; 2]>>()
        });

        if self.inverse {
            centers.reverse();
            if let Some(bounds) = bounds.as_mut() {
                bounds.reverse();
                bounds.iter_mut().for_each(|pair| pair.reverse());
            }
        }

        let (long_name, standard_name) = match (self.role, self.is_geographic()) {
            (AxisRole::X, true) => ("longitude", "longitude"),
            (AxisRole::Y, true) => ("latitude", "latitude"),
            (AxisRole::X, false) => ("x coordinate of projection", "projection_x_coordinate"),
            (AxisRole::Y, false) => ("y coordinate of projection", "projection_y_coordinate"),
        };

        Ok(GridAxis {
            name: self.name.clone(),
            units: self.units.clone(),
            long_name,
            standard_name,
            dtype: self.dtype,
            centers,
            bounds,
        })
    }
}

/// A built spatial axis.
#[derive(Debug, Clone, PartialEq)]
pub struct GridAxis {
    pub name: String,
    pub units: String,
    pub long_name: &'static str,
    pub standard_name: &'static str,
    pub dtype: DataType,
    /// Cell centers
    pub centers: Vec<f64>,
    /// Cell edges, one `[low, high]` pair per cell
    pub bounds: Option<Vec<[f64; 2]>>,
}

impl GridAxis {
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Name of the bounds variable.
    pub fn bounds_name(&self) -> String {
        format!("{}_{}", self.name, BNDS_DIM)
    }

    /// The coordinate variable, referencing its bounds when present.
    pub fn coordinate_variable(&self) -> Variable {
        let mut var = Variable::coordinate(self.name.clone(), self.dtype, self.centers.clone())
            .with_attr("units", self.units.clone())
            .with_attr("long_name", self.long_name)
            .with_attr("standard_name", self.standard_name);
        if self.bounds.is_some() {
            var.attrs.insert("bounds".into(), json!(self.bounds_name()));
        }
        var
    }

    /// The `(axis, bnds)` bounds variable, if bounds were built.
    pub fn bounds_variable(&self) -> CubeResult<Option<Variable>> {
        let Some(bounds) = &self.bounds else {
            return Ok(None);
        };
        let values = bounds.iter().flatten().copied().collect();
        let var = Variable::new(
            self.bounds_name(),
            vec![self.name.clone(), BNDS_DIM.to_string()],
            vec![bounds.len(), 2],
            self.dtype,
            ArrayValues::Float(values),
        )?
        .with_attr("units", self.units.clone());
        Ok(Some(var))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centers_and_bounds() {
        let axis = GridAxisBuilder::new("lon", AxisRole::X, -180.0, 90.0, 4)
            .units("degrees_east")
            .build()
            .unwrap();
        assert_eq!(axis.centers, vec![-135.0, -45.0, 45.0, 135.0]);
        let bounds = axis.bounds.unwrap();
        assert_eq!(bounds[0], [-180.0, -90.0]);
        assert_eq!(bounds[3], [90.0, 180.0]);
        assert_eq!(axis.standard_name, "longitude");
    }

    #[test]
    fn test_inverse_axis() {
        let axis = GridAxisBuilder::new("lat", AxisRole::Y, 0.0, 1.0, 3)
            .inverse(true)
            .build()
            .unwrap();
        assert_eq!(axis.centers, vec![2.5, 1.5, 0.5]);
        let bounds = axis.bounds.unwrap();
        assert_eq!(bounds, vec![[3.0, 2.0], [2.0, 1.0], [1.0, 0.0]]);
    }

    #[test]
    fn test_projected_names() {
        let axis = GridAxisBuilder::new("y", AxisRole::Y, 0.0, 10.0, 2)
            .units("meters")
            .build()
            .unwrap();
        assert_eq!(axis.standard_name, "projection_y_coordinate");
        assert_eq!(axis.long_name, "y coordinate of projection");

        // units alone are enough to make an axis geographic
        let axis = GridAxisBuilder::new("y", AxisRole::Y, 0.0, 1.0, 2)
            .units("degrees_north")
            .build()
            .unwrap();
        assert_eq!(axis.standard_name, "latitude");
    }

    #[test]
    fn test_empty_axis() {
        let axis = GridAxisBuilder::new("x", AxisRole::X, 0.0, 1.0, 0)
            .build()
            .unwrap();
        assert!(axis.is_empty());
        assert_eq!(axis.bounds, Some(vec![]));
        let bnds = axis.bounds_variable().unwrap().unwrap();
        assert_eq!(bnds.shape, vec![0, 2]);
    }

    #[test]
    fn test_rejects_bad_resolution() {
        for res in [0.0, -1.0, f64::NAN] {
            let result = GridAxisBuilder::new("x", AxisRole::X, 0.0, res, 10).build();
            assert!(matches!(result, Err(CubeError::InvalidParameter { .. })));
        }
    }

    #[test]
    fn test_bounds_dropped() {
        let axis = GridAxisBuilder::new("x", AxisRole::X, 0.0, 1.0, 5)
            .bounds(false)
            .build()
            .unwrap();
        assert!(axis.bounds.is_none());
        assert!(axis.bounds_variable().unwrap().is_none());
        assert!(!axis.coordinate_variable().attrs.contains_key("bounds"));
    }

    #[test]
    fn test_float32_rounding() {
        let axis = GridAxisBuilder::new("lon", AxisRole::X, -180.0, 0.05, 3)
            .dtype(DataType::Float32)
            .build()
            .unwrap();
        assert_eq!(axis.centers[0], (-180.0f64 + 0.025) as f32 as f64);
    }
}
