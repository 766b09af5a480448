//! Mapping between dataset and Zarr data types.

use zarrs::array::{DataType as ZarrDataType, FillValue};

use cube_common::DataType;

use crate::error::{Result, StoreError};

pub(crate) fn to_zarr(dtype: DataType) -> ZarrDataType {
    match dtype {
        DataType::Int8 => ZarrDataType::Int8,
        DataType::Int16 => ZarrDataType::Int16,
        DataType::Int32 => ZarrDataType::Int32,
        DataType::Int64 => ZarrDataType::Int64,
        DataType::UInt8 => ZarrDataType::UInt8,
        DataType::UInt16 => ZarrDataType::UInt16,
        DataType::UInt32 => ZarrDataType::UInt32,
        DataType::UInt64 => ZarrDataType::UInt64,
        DataType::Float32 => ZarrDataType::Float32,
        DataType::Float64 => ZarrDataType::Float64,
    }
}

pub(crate) fn from_zarr(dtype: &ZarrDataType) -> Result<DataType> {
    match dtype {
        ZarrDataType::Int8 => Ok(DataType::Int8),
        ZarrDataType::Int16 => Ok(DataType::Int16),
        ZarrDataType::Int32 => Ok(DataType::Int32),
        ZarrDataType::Int64 => Ok(DataType::Int64),
        ZarrDataType::UInt8 => Ok(DataType::UInt8),
        ZarrDataType::UInt16 => Ok(DataType::UInt16),
        ZarrDataType::UInt32 => Ok(DataType::UInt32),
        ZarrDataType::UInt64 => Ok(DataType::UInt64),
        ZarrDataType::Float32 => Ok(DataType::Float32),
        ZarrDataType::Float64 => Ok(DataType::Float64),
        other => Err(StoreError::UnsupportedDataType(format!("{:?}", other))),
    }
}

/// Fill value of `dtype` holding `value`.
pub(crate) fn fill_value(dtype: DataType, value: i64) -> FillValue {
    match dtype {
        DataType::Int8 => FillValue::from(value as i8),
        DataType::Int16 => FillValue::from(value as i16),
        DataType::Int32 => FillValue::from(value as i32),
        DataType::Int64 => FillValue::from(value),
        DataType::UInt8 => FillValue::from(value as u8),
        DataType::UInt16 => FillValue::from(value as u16),
        DataType::UInt32 => FillValue::from(value as u32),
        DataType::UInt64 => FillValue::from(value as u64),
        DataType::Float32 => FillValue::from(value as f32),
        DataType::Float64 => FillValue::from(value as f64),
    }
}

/// Element size in bytes.
pub(crate) fn size_of(dtype: DataType) -> usize {
    match dtype {
        DataType::Int8 | DataType::UInt8 => 1,
        DataType::Int16 | DataType::UInt16 => 2,
        DataType::Int32 | DataType::UInt32 | DataType::Float32 => 4,
        DataType::Int64 | DataType::UInt64 | DataType::Float64 => 8,
    }
}
