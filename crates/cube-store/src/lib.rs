//! Zarr V3 persistence for data cube datasets.
//!
//! [`ZarrDatasetWriter`] writes a [`cube_common::Dataset`] into a store and
//! [`open_dataset`] reads one back so it can be verified.
//!
//! # Example
//!
//! ```ignore
//! use cube_store::{open_dataset, StoreConfig, ZarrDatasetWriter};
//!
//! let writer = ZarrDatasetWriter::new(StoreConfig::from_env());
//! writer.write_to_path(&dataset, "cube.zarr")?;
//! let reopened = open_dataset("cube.zarr")?;
//! ```

pub mod config;
mod dtype;
pub mod error;
pub mod reader;
pub mod writer;

pub use config::{StoreConfig, ZarrCompression};
pub use error::{Result, StoreError};
pub use reader::{open_dataset, read_dataset};
pub use writer::{WriteSummary, ZarrDatasetWriter};
