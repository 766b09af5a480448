//! Generator for CF-style data cube templates.
//!
//! Builds a [`cube_common::Dataset`] with regular spatial axes, a time
//! axis, optional cell bounds, placeholder data variables, a grid-mapping
//! variable and CF global attributes from a single [`CubeConfig`].
//!
//! # Example
//!
//! ```ignore
//! use cube_generator::{new_dataset, CubeConfig, Pair};
//!
//! let config = CubeConfig {
//!     xy_size: Pair::xy(2048, 2048),
//!     xy_names: ("x".into(), "y".into()),
//!     crs: Some("EPSG:32633".into()),
//!     ..Default::default()
//! };
//! let dataset = new_dataset(&config)?;
//! ```

pub mod assembler;
pub mod axis;
pub mod config;
pub mod georef;
pub mod temporal;

pub use assembler::{default_metadata, merge_metadata, new_dataset, DatasetAssembler};
pub use axis::{AxisRole, GridAxis, GridAxisBuilder};
pub use config::{CubeConfig, DataVariableSpec, Pair, ResolvedCube, TimeRepresentation};
pub use georef::{from_crs84, GeoReferencer, GeospatialExtent};
pub use temporal::{TemporalAxis, TemporalAxisBuilder};
