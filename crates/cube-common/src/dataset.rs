//! In-memory data cube model.
//!
//! A [`Dataset`] is built once through [`DatasetBuilder`] and is read-only
//! afterwards. Validators only see it through the [`DatasetAccess`] trait,
//! so the same rules run against generated datasets and opened stores.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{CubeError, CubeResult};

/// Attribute map of a dataset or variable.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Element type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Int8 => "int8",
            DataType::Int16 => "int16",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::UInt8 => "uint8",
            DataType::UInt16 => "uint16",
            DataType::UInt32 => "uint32",
            DataType::UInt64 => "uint64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DataType::Float32 | DataType::Float64)
    }
}

impl FromStr for DataType {
    type Err = CubeError;

    /// Accepts names (`float32`) and NumPy type codes (`f4`, `<u2`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches(['<', '>', '=', '|']);
        match name.to_lowercase().as_str() {
            "int8" | "i1" => Ok(DataType::Int8),
            "int16" | "i2" => Ok(DataType::Int16),
            "int32" | "i4" => Ok(DataType::Int32),
            "int64" | "i8" => Ok(DataType::Int64),
            "uint8" | "u1" => Ok(DataType::UInt8),
            "uint16" | "u2" => Ok(DataType::UInt16),
            "uint32" | "u4" => Ok(DataType::UInt32),
            "uint64" | "u8" => Ok(DataType::UInt64),
            "float32" | "f4" => Ok(DataType::Float32),
            "float64" | "f8" | "float" => Ok(DataType::Float64),
            _ => Err(CubeError::invalid_parameter(
                "dtype",
                format!("unsupported data type '{}'", s),
            )),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values of a variable in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValues {
    Float(Vec<f64>),
    Int(Vec<i64>),
    /// Constant zero fill, never materialised
    Fill,
}

impl ArrayValues {
    /// Number of materialised values, `None` for [`ArrayValues::Fill`].
    pub fn len(&self) -> Option<usize> {
        match self {
            ArrayValues::Float(v) => Some(v.len()),
            ArrayValues::Int(v) => Some(v.len()),
            ArrayValues::Fill => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Values widened to f64.
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            ArrayValues::Float(v) => Some(v.clone()),
            ArrayValues::Int(v) => Some(v.iter().map(|x| *x as f64).collect()),
            ArrayValues::Fill => None,
        }
    }
}

/// Chunking hint for one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkHint {
    /// Let the storage layer decide
    #[default]
    Auto,
    /// Fixed chunk length
    Size(usize),
}

/// A named n-dimensional array with attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub dims: Vec<String>,
    pub shape: Vec<usize>,
    pub dtype: DataType,
    pub values: ArrayValues,
    pub attrs: Attributes,
}

impl Variable {
    /// Create a variable, checking dims, shape and value length agree.
    pub fn new(
        name: impl Into<String>,
        dims: Vec<String>,
        shape: Vec<usize>,
        dtype: DataType,
        values: ArrayValues,
    ) -> CubeResult<Self> {
        let name = name.into();
        if dims.len() != shape.len() {
            return Err(CubeError::invalid_dimensions(format!(
                "variable '{}' has {} dimensions but a shape of length {}",
                name,
                dims.len(),
                shape.len()
            )));
        }
        let expected: usize = shape.iter().product();
        if let Some(len) = values.len() {
            if len != expected {
                return Err(CubeError::invalid_dimensions(format!(
                    "variable '{}' has {} values but shape {:?} needs {}",
                    name, len, shape, expected
                )));
            }
        }
        Ok(Self {
            name,
            dims,
            shape,
            dtype,
            values,
            attrs: Attributes::new(),
        })
    }

    /// 1-D variable whose single dimension is named after the variable.
    pub fn coordinate(name: impl Into<String>, dtype: DataType, values: Vec<f64>) -> Self {
        let name = name.into();
        Self {
            dims: vec![name.clone()],
            shape: vec![values.len()],
            name,
            dtype,
            values: ArrayValues::Float(values),
            attrs: Attributes::new(),
        }
    }

    /// Scalar variable.
    pub fn scalar(name: impl Into<String>, dtype: DataType, value: i64) -> Self {
        Self {
            name: name.into(),
            dims: Vec::new(),
            shape: Vec::new(),
            dtype,
            values: ArrayValues::Int(vec![value]),
            attrs: Attributes::new(),
        }
    }

    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs.extend(attrs);
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_dim(&self, dim: &str) -> bool {
        self.dims.iter().any(|d| d == dim)
    }

    /// String attribute value.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(|v| v.as_str())
    }

    /// Whether consecutive values strictly increase.
    ///
    /// Fewer than two elements trivially pass. Unloaded values are a
    /// constant fill and therefore only pass when trivially short.
    pub fn is_strictly_increasing(&self) -> bool {
        self.pairwise(|a, b| a < b, |a, b| a < b)
    }

    pub fn is_strictly_decreasing(&self) -> bool {
        self.pairwise(|a, b| a > b, |a, b| a > b)
    }

    fn pairwise(&self, float: impl Fn(f64, f64) -> bool, int: impl Fn(i64, i64) -> bool) -> bool {
        match &self.values {
            ArrayValues::Float(v) => v.windows(2).all(|w| float(w[0], w[1])),
            ArrayValues::Int(v) => v.windows(2).all(|w| int(w[0], w[1])),
            ArrayValues::Fill => self.len() < 2,
        }
    }
}

/// Typed read access to a dataset.
pub trait DatasetAccess {
    /// Size of a named dimension.
    fn dimension(&self, name: &str) -> Option<usize>;

    fn variable(&self, name: &str) -> Option<&Variable>;

    /// All variables in dataset order.
    fn variables(&self) -> Box<dyn Iterator<Item = &Variable> + '_>;

    fn global_attributes(&self) -> &Attributes;

    /// Attributes of a named variable.
    fn attributes(&self, name: &str) -> Option<&Attributes> {
        self.variable(name).map(|v| &v.attrs)
    }

    fn contains(&self, name: &str) -> bool {
        self.variable(name).is_some()
    }
}

/// An immutable collection of variables sharing named dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    dims: BTreeMap<String, usize>,
    variables: Vec<Variable>,
    attrs: Attributes,
    chunks: BTreeMap<String, ChunkHint>,
}

impl Dataset {
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::default()
    }

    /// Named dimensions and their sizes.
    pub fn dims(&self) -> &BTreeMap<String, usize> {
        &self.dims
    }

    /// Chunk hint for a dimension, `Auto` when none was attached.
    pub fn chunk_hint(&self, dim: &str) -> ChunkHint {
        self.chunks.get(dim).copied().unwrap_or_default()
    }

    pub fn chunks(&self) -> &BTreeMap<String, ChunkHint> {
        &self.chunks
    }
}

impl DatasetAccess for Dataset {
    fn dimension(&self, name: &str) -> Option<usize> {
        self.dims.get(name).copied()
    }

    fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    fn variables(&self) -> Box<dyn Iterator<Item = &Variable> + '_> {
        Box::new(self.variables.iter())
    }

    fn global_attributes(&self) -> &Attributes {
        &self.attrs
    }
}

/// Builder for [`Dataset`].
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    variables: Vec<Variable>,
    attrs: Attributes,
    chunks: BTreeMap<String, ChunkHint>,
}

impl DatasetBuilder {
    pub fn variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn variables(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.variables.extend(variables);
        self
    }

    pub fn attrs(mut self, attrs: Attributes) -> Self {
        self.attrs.extend(attrs);
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn chunk(mut self, dim: impl Into<String>, hint: ChunkHint) -> Self {
        self.chunks.insert(dim.into(), hint);
        self
    }

    /// Validate and freeze the dataset.
    pub fn build(self) -> CubeResult<Dataset> {
        let mut dims: BTreeMap<String, usize> = BTreeMap::new();
        let mut names = std::collections::HashSet::new();

        for var in &self.variables {
            if !names.insert(var.name.as_str()) {
                return Err(CubeError::invalid_dimensions(format!(
                    "duplicate variable '{}'",
                    var.name
                )));
            }
            if var.dims.len() != var.shape.len() {
                return Err(CubeError::invalid_dimensions(format!(
                    "variable '{}' has {} dimensions but a shape of length {}",
                    var.name,
                    var.dims.len(),
                    var.shape.len()
                )));
            }
            if let Some(len) = var.values.len() {
                if len != var.len() {
                    return Err(CubeError::invalid_dimensions(format!(
                        "variable '{}' has {} values but {} elements",
                        var.name,
                        len,
                        var.len()
                    )));
                }
            }
            for (dim, size) in var.dims.iter().zip(&var.shape) {
                match dims.get(dim) {
                    Some(existing) if existing != size => {
                        return Err(CubeError::invalid_dimensions(format!(
                            "dimension '{}' has conflicting sizes {} and {} (variable '{}')",
                            dim, existing, size, var.name
                        )));
                    }
                    Some(_) => {}
                    None => {
                        dims.insert(dim.clone(), *size);
                    }
                }
            }
        }

        for (dim, hint) in &self.chunks {
            if *hint == ChunkHint::Size(0) {
                return Err(CubeError::invalid_parameter(
                    "chunks",
                    format!("chunk size for '{}' must be positive", dim),
                ));
            }
        }

        Ok(Dataset {
            dims,
            variables: self.variables,
            attrs: self.attrs,
            chunks: self.chunks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(name: &str, values: &[f64]) -> Variable {
        Variable::coordinate(name, DataType::Float64, values.to_vec())
    }

    #[test]
    fn test_build_collects_dims() {
        let ds = Dataset::builder()
            .variable(coord("x", &[0.5, 1.5, 2.5]))
            .variable(coord("y", &[0.5, 1.5]))
            .variable(
                Variable::new(
                    "v",
                    vec!["y".into(), "x".into()],
                    vec![2, 3],
                    DataType::Float32,
                    ArrayValues::Fill,
                )
                .unwrap(),
            )
            .attr("title", "test")
            .build()
            .unwrap();

        assert_eq!(ds.dimension("x"), Some(3));
        assert_eq!(ds.dimension("y"), Some(2));
        assert_eq!(ds.dimension("time"), None);
        assert_eq!(ds.variables().count(), 3);
        assert_eq!(ds.global_attributes()["title"], "test");
        assert_eq!(ds.chunk_hint("x"), ChunkHint::Auto);
    }

    #[test]
    fn test_build_rejects_conflicting_sizes() {
        let result = Dataset::builder()
            .variable(coord("x", &[0.5, 1.5, 2.5]))
            .variable(
                Variable::new(
                    "v",
                    vec!["x".into()],
                    vec![2],
                    DataType::Float32,
                    ArrayValues::Fill,
                )
                .unwrap(),
            )
            .build();
        assert!(matches!(result, Err(CubeError::InvalidDimensions(_))));
    }

    #[test]
    fn test_build_rejects_duplicates() {
        let result = Dataset::builder()
            .variable(coord("x", &[1.0]))
            .variable(coord("x", &[1.0]))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_variable_rejects_bad_value_length() {
        let result = Variable::new(
            "v",
            vec!["x".into()],
            vec![3],
            DataType::Float64,
            ArrayValues::Float(vec![1.0, 2.0]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_monotonicity() {
        assert!(coord("t", &[0.0, 1.0, 2.0]).is_strictly_increasing());
        assert!(!coord("t", &[0.0, 2.0, 1.0, 3.0]).is_strictly_increasing());
        assert!(!coord("t", &[0.0, 0.0]).is_strictly_increasing());
        assert!(coord("t", &[3.0, 2.0]).is_strictly_decreasing());
        assert!(coord("t", &[]).is_strictly_increasing());
        assert!(coord("t", &[7.0]).is_strictly_decreasing());
        assert!(!coord("t", &[0.0, f64::NAN]).is_strictly_increasing());
    }

    #[test]
    fn test_parse_dtype() {
        assert_eq!("float32".parse::<DataType>().unwrap(), DataType::Float32);
        assert_eq!("<u2".parse::<DataType>().unwrap(), DataType::UInt16);
        assert!("complex64".parse::<DataType>().is_err());
    }
}
