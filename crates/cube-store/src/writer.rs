//! Zarr V3 writer for datasets.
//!
//! A dataset becomes one group holding the global attributes and one array
//! per variable at `/<name>`. Arrays carry the variable's dimension names
//! and attributes. Placeholder variables are written as metadata only, so
//! creating a large template cube costs no chunk I/O.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};
use zarrs::array::codec::bytes_to_bytes::blosc::{
    BloscCodec, BloscCompressionLevel, BloscCompressor, BloscShuffleMode,
};
use zarrs::array::{Array, ArrayBuilder};
use zarrs::array_subset::ArraySubset;
use zarrs::group::GroupBuilder;
use zarrs::storage::{ReadableStorageTraits, WritableStorageTraits};
use zarrs_filesystem::FilesystemStore;

use cube_common::{ArrayValues, ChunkHint, DataType, Dataset, DatasetAccess, Variable};

use crate::config::{StoreConfig, ZarrCompression};
use crate::dtype;
use crate::error::{Result, StoreError};

/// Result of writing a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    /// Number of arrays created.
    pub arrays: usize,
    /// Uncompressed bytes of materialised values.
    pub bytes_written: u64,
}

/// Writes datasets as Zarr V3 groups.
pub struct ZarrDatasetWriter {
    config: StoreConfig,
}

impl ZarrDatasetWriter {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Write `ds` into a filesystem store rooted at `path`.
    pub fn write_to_path(&self, ds: &Dataset, path: impl AsRef<Path>) -> Result<WriteSummary> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;
        let store = FilesystemStore::new(path)
            .map_err(|e| StoreError::open_failed(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "Writing dataset");
        self.write(store, ds)
    }

    /// Write `ds` into `storage`.
    pub fn write<S: ReadableStorageTraits + WritableStorageTraits + 'static>(
        &self,
        storage: S,
        ds: &Dataset,
    ) -> Result<WriteSummary> {
        self.config.validate().map_err(StoreError::ConfigError)?;
        let store = Arc::new(storage);

        let group = GroupBuilder::new()
            .attributes(ds.global_attributes().clone())
            .build(store.clone(), "/")
            .map_err(|e| StoreError::write_failed(e.to_string()))?;
        group
            .store_metadata()
            .map_err(|e| StoreError::write_failed(e.to_string()))?;

        let mut summary = WriteSummary {
            arrays: 0,
            bytes_written: 0,
        };
        for var in ds.variables() {
            let array = self.build_array(store.clone(), ds, var)?;
            array
                .store_metadata()
                .map_err(|e| StoreError::write_failed(e.to_string()))?;
            let bytes = store_values(&array, var)?;
            debug!(variable = %var.name, shape = ?var.shape, bytes, "Wrote array");
            summary.arrays += 1;
            summary.bytes_written += bytes;
        }

        info!(
            arrays = summary.arrays,
            bytes_written = summary.bytes_written,
            compression = %self.config.compression,
            "Wrote dataset"
        );
        Ok(summary)
    }

    /// Chunk length of each dimension of `var`.
    pub fn chunk_shape(&self, ds: &Dataset, var: &Variable) -> Vec<u64> {
        var.dims
            .iter()
            .zip(&var.shape)
            .map(|(dim, len)| {
                let chunk = match ds.chunk_hint(dim) {
                    ChunkHint::Size(n) => n.min(*len),
                    ChunkHint::Auto => self.config.default_chunk_size.min(*len),
                };
                chunk.max(1) as u64
            })
            .collect()
    }

    fn build_array<S: ReadableStorageTraits + WritableStorageTraits + 'static>(
        &self,
        storage: Arc<S>,
        ds: &Dataset,
        var: &Variable,
    ) -> Result<Array<S>> {
        let chunk_grid: zarrs::array::ChunkGrid = self
            .chunk_shape(ds, var)
            .try_into()
            .map_err(|e| StoreError::ConfigError(format!("{:?}", e)))?;

        // A scalar keeps its value in the fill value; no chunk is written.
        let fill = match (&var.values, var.ndim()) {
            (ArrayValues::Int(v), 0) => v.first().copied().unwrap_or(0),
            (ArrayValues::Float(v), 0) => v.first().map(|x| *x as i64).unwrap_or(0),
            _ => 0,
        };

        let mut binding = ArrayBuilder::new(
            var.shape.iter().map(|n| *n as u64).collect(),
            dtype::to_zarr(var.dtype),
            chunk_grid,
            dtype::fill_value(var.dtype, fill),
        );
        let mut builder = binding.attributes(var.attrs.clone());
        builder = builder.dimension_names(Some(var.dims.clone()));

        if self.config.compression != ZarrCompression::None {
            let codec = self.create_compression_codec(var.dtype)?;
            builder = builder.bytes_to_bytes_codecs(vec![codec]);
        }

        builder
            .build(storage, &format!("/{}", var.name))
            .map_err(|e| StoreError::write_failed(e.to_string()))
    }

    fn create_compression_codec(
        &self,
        dtype: DataType,
    ) -> Result<Arc<dyn zarrs::array::codec::BytesToBytesCodecTraits>> {
        let level = BloscCompressionLevel::try_from(self.config.compression_level)
            .map_err(|_| StoreError::ConfigError("Invalid compression level".to_string()))?;

        let (shuffle, typesize) = if self.config.shuffle {
            (BloscShuffleMode::Shuffle, Some(dtype::size_of(dtype)))
        } else {
            (BloscShuffleMode::NoShuffle, None)
        };

        let compressor = match self.config.compression {
            ZarrCompression::None => {
                return Err(StoreError::ConfigError(
                    "No compression configured".to_string(),
                ))
            }
            ZarrCompression::BloscLz4 => BloscCompressor::LZ4,
            ZarrCompression::BloscZstd => BloscCompressor::Zstd,
        };

        let codec = BloscCodec::new(compressor, level, None, shuffle, typesize)
            .map_err(|e| StoreError::ConfigError(e.to_string()))?;

        Ok(Arc::new(codec))
    }
}

impl Default for ZarrDatasetWriter {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

/// Store the materialised values of `var`, returning the bytes written.
fn store_values<S: ReadableStorageTraits + WritableStorageTraits + 'static>(
    array: &Array<S>,
    var: &Variable,
) -> Result<u64> {
    if var.ndim() == 0 || var.is_empty() {
        return Ok(0);
    }

    let subset = ArraySubset::new_with_start_shape(
        vec![0; var.ndim()],
        var.shape.iter().map(|n| *n as u64).collect(),
    )
    .map_err(|e| StoreError::write_failed(e.to_string()))?;

    macro_rules! store_as {
        ($values:expr, $t:ty) => {{
            let data: Vec<$t> = $values.iter().map(|v| *v as $t).collect();
            array
                .store_array_subset_elements::<$t>(&subset, &data)
                .map_err(|e| StoreError::write_failed(e.to_string()))?;
            (data.len() * std::mem::size_of::<$t>()) as u64
        }};
    }

    macro_rules! store_by_dtype {
        ($values:expr) => {
            match var.dtype {
                DataType::Int8 => store_as!($values, i8),
                DataType::Int16 => store_as!($values, i16),
                DataType::Int32 => store_as!($values, i32),
                DataType::Int64 => store_as!($values, i64),
                DataType::UInt8 => store_as!($values, u8),
                DataType::UInt16 => store_as!($values, u16),
                DataType::UInt32 => store_as!($values, u32),
                DataType::UInt64 => store_as!($values, u64),
                DataType::Float32 => store_as!($values, f32),
                DataType::Float64 => store_as!($values, f64),
            }
        };
    }

    let bytes = match &var.values {
        ArrayValues::Fill => 0,
        ArrayValues::Float(values) => store_by_dtype!(values),
        ArrayValues::Int(values) => store_by_dtype!(values),
    };
    Ok(bytes)
}
