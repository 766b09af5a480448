//! Open a Zarr V3 group as a dataset.
//!
//! Values are returned raw: no scale/offset, masking or time decoding is
//! applied. Only 1-D arrays are loaded, which covers every coordinate the
//! convention rules look at; all other arrays come back as
//! [`ArrayValues::Fill`] with their shape and attributes intact.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};
use zarrs::array::Array;
use zarrs::group::Group;
use zarrs::storage::{ListableStorageTraits, ReadableStorageTraits, StorePrefix};
use zarrs_filesystem::FilesystemStore;

use cube_common::{ArrayValues, Attributes, ChunkHint, DataType, Dataset, Variable};

use crate::dtype;
use crate::error::{Result, StoreError};

/// Legacy attribute holding dimension names.
const ARRAY_DIMENSIONS_ATTR: &str = "_ARRAY_DIMENSIONS";

/// Open the filesystem store at `path`.
pub fn open_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    if !path.is_dir() {
        return Err(StoreError::open_failed(format!(
            "{}: not a directory",
            path.display()
        )));
    }
    let store = FilesystemStore::new(path)
        .map_err(|e| StoreError::open_failed(format!("{}: {}", path.display(), e)))?;
    info!(path = %path.display(), "Opening dataset");
    read_dataset(store)
}

/// Read the root group of `storage` and every array directly below it.
pub fn read_dataset<S: ReadableStorageTraits + ListableStorageTraits + 'static>(
    storage: S,
) -> Result<Dataset> {
    let store = Arc::new(storage);

    let group = Group::open(store.clone(), "/")
        .map_err(|e| StoreError::open_failed(e.to_string()))?;

    let listing = store
        .list_dir(&StorePrefix::root())
        .map_err(|e| StoreError::open_failed(e.to_string()))?;
    let mut names: Vec<String> = listing
        .prefixes()
        .iter()
        .map(|p| p.as_str().trim_end_matches('/').to_string())
        .filter(|name| !name.is_empty())
        .collect();
    names.sort();

    let mut builder = Dataset::builder().attrs(group.attributes().clone());
    for name in names {
        let array = match Array::open(store.clone(), &format!("/{}", name)) {
            Ok(array) => array,
            Err(e) => {
                debug!(node = %name, error = %e, "Skipping node that is not an array");
                continue;
            }
        };
        let (variable, chunks) = read_variable(&array, &name)?;
        for (dim, chunk) in variable.dims.iter().zip(chunks) {
            builder = builder.chunk(dim.clone(), ChunkHint::Size(chunk));
        }
        builder = builder.variable(variable);
    }

    let dataset = builder.build()?;
    info!(dims = dataset.dims().len(), "Opened dataset");
    Ok(dataset)
}

fn read_variable<S: ReadableStorageTraits + 'static>(
    array: &Array<S>,
    name: &str,
) -> Result<(Variable, Vec<usize>)> {
    let dtype = dtype::from_zarr(array.data_type())?;
    let shape: Vec<usize> = array.shape().iter().map(|n| *n as usize).collect();
    let dims = dimension_names(array, name)?;

    let mut attrs: Attributes = array.attributes().clone();
    attrs.remove(ARRAY_DIMENSIONS_ATTR);

    let values = if shape.len() == 1 {
        read_values(array, dtype)?
    } else {
        ArrayValues::Fill
    };

    let chunks = if shape.is_empty() {
        Vec::new()
    } else {
        let origin = vec![0u64; shape.len()];
        array
            .chunk_grid()
            .chunk_shape(&origin, array.shape())
            .map_err(|e| StoreError::invalid_metadata(e.to_string()))?
            .map(|c| c.iter().map(|n| n.get() as usize).collect())
            .unwrap_or_default()
    };

    let variable = Variable::new(name, dims, shape, dtype, values)?.with_attrs(attrs);
    Ok((variable, chunks))
}

/// Dimension names from the array metadata, falling back to the legacy
/// `_ARRAY_DIMENSIONS` attribute. Unnamed dimensions become `dim_<i>`.
fn dimension_names<S: ReadableStorageTraits + 'static>(
    array: &Array<S>,
    name: &str,
) -> Result<Vec<String>> {
    let metadata = serde_json::to_value(array.metadata())?;
    let names = metadata
        .get("dimension_names")
        .and_then(Value::as_array)
        .or_else(|| {
            array
                .attributes()
                .get(ARRAY_DIMENSIONS_ATTR)
                .and_then(Value::as_array)
        })
        .ok_or_else(|| {
            StoreError::invalid_metadata(format!("array '{}' has no dimension names", name))
        })?;

    if names.len() != array.shape().len() {
        return Err(StoreError::invalid_metadata(format!(
            "array '{}' has {} dimension names for {} dimensions",
            name,
            names.len(),
            array.shape().len()
        )));
    }

    Ok(names
        .iter()
        .enumerate()
        .map(|(i, v)| match v.as_str() {
            Some(s) => s.to_string(),
            None => format!("dim_{}", i),
        })
        .collect())
}

fn read_values<S: ReadableStorageTraits + 'static>(
    array: &Array<S>,
    dtype: DataType,
) -> Result<ArrayValues> {
    let subset = array.subset_all();

    macro_rules! retrieve {
        ($t:ty) => {
            array
                .retrieve_array_subset_elements::<$t>(&subset)
                .map_err(|e| StoreError::read_failed(e.to_string()))?
        };
    }

    let values = match dtype {
        DataType::Float32 => ArrayValues::Float(retrieve!(f32).into_iter().map(f64::from).collect()),
        DataType::Float64 => ArrayValues::Float(retrieve!(f64)),
        DataType::Int8 => ArrayValues::Int(retrieve!(i8).into_iter().map(i64::from).collect()),
        DataType::Int16 => ArrayValues::Int(retrieve!(i16).into_iter().map(i64::from).collect()),
        DataType::Int32 => ArrayValues::Int(retrieve!(i32).into_iter().map(i64::from).collect()),
        DataType::Int64 => ArrayValues::Int(retrieve!(i64)),
        DataType::UInt8 => ArrayValues::Int(retrieve!(u8).into_iter().map(i64::from).collect()),
        DataType::UInt16 => ArrayValues::Int(retrieve!(u16).into_iter().map(i64::from).collect()),
        DataType::UInt32 => ArrayValues::Int(retrieve!(u32).into_iter().map(i64::from).collect()),
        DataType::UInt64 => ArrayValues::Int(
            retrieve!(u64)
                .into_iter()
                .map(|v| {
                    i64::try_from(v).map_err(|_| {
                        StoreError::read_failed(format!("value {} does not fit in int64", v))
                    })
                })
                .collect::<Result<Vec<i64>>>()?,
        ),
    };
    Ok(values)
}
