//! Common types shared by the cube generator, verifier and store crates.

pub mod bbox;
pub mod crs;
pub mod dataset;
pub mod error;
pub mod time;

pub use bbox::BoundingBox;
pub use crs::{Crs, CrsId, Datum, GridMapping, GridMappingName};
pub use dataset::{
    ArrayValues, Attributes, ChunkHint, DataType, Dataset, DatasetAccess, DatasetBuilder,
    Variable,
};
pub use error::{CubeError, CubeResult};
pub use time::{Calendar, CalendarDateTime, TimePrecision, TimeStep, TimeUnit, TimeUnits};
