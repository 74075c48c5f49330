//! Bidirectional conversion between Arrow arrays and ParquetValue
//!
//! Blocks hold row values as [`ParquetValue`] columns, the codec works on
//! Arrow arrays. Widening conversions (for example `Int16` into an `Int32`
//! column) are accepted when building arrays; anything narrowing or
//! mismatched is rejected rather than coerced.

use crate::{CodecError, ParquetValue, Result};
use arrow::buffer::{NullBuffer, OffsetBuffer};
use arrow_array::types::{
    ArrowTimestampType, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType,
};
use arrow_array::{builder::*, Array, ArrayRef, ListArray, StructArray};
use arrow_schema::{DataType, Field, Fields, TimeUnit};
use bytes::Bytes;
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use std::sync::Arc;

/// Convert a single value from an Arrow array at the given index to a ParquetValue
pub fn arrow_to_parquet_value(array: &dyn Array, index: usize) -> Result<ParquetValue> {
    use arrow_array::*;

    if array.is_null(index) {
        return Ok(ParquetValue::Null);
    }

    match array.data_type() {
        DataType::Boolean => {
            let array = downcast_array::<BooleanArray>(array)?;
            Ok(ParquetValue::Boolean(array.value(index)))
        }
        DataType::Int8 => Ok(ParquetValue::Int8(
            downcast_array::<Int8Array>(array)?.value(index),
        )),
        DataType::Int16 => Ok(ParquetValue::Int16(
            downcast_array::<Int16Array>(array)?.value(index),
        )),
        DataType::Int32 => Ok(ParquetValue::Int32(
            downcast_array::<Int32Array>(array)?.value(index),
        )),
        DataType::Int64 => Ok(ParquetValue::Int64(
            downcast_array::<Int64Array>(array)?.value(index),
        )),
        DataType::UInt8 => Ok(ParquetValue::UInt8(
            downcast_array::<UInt8Array>(array)?.value(index),
        )),
        DataType::UInt16 => Ok(ParquetValue::UInt16(
            downcast_array::<UInt16Array>(array)?.value(index),
        )),
        DataType::UInt32 => Ok(ParquetValue::UInt32(
            downcast_array::<UInt32Array>(array)?.value(index),
        )),
        DataType::UInt64 => Ok(ParquetValue::UInt64(
            downcast_array::<UInt64Array>(array)?.value(index),
        )),
        DataType::Float32 => Ok(ParquetValue::Float32(OrderedFloat(
            downcast_array::<Float32Array>(array)?.value(index),
        ))),
        DataType::Float64 => Ok(ParquetValue::Float64(OrderedFloat(
            downcast_array::<Float64Array>(array)?.value(index),
        ))),

        DataType::Utf8 => {
            let array = downcast_array::<StringArray>(array)?;
            Ok(ParquetValue::String(Arc::from(array.value(index))))
        }
        DataType::Binary => {
            let array = downcast_array::<BinaryArray>(array)?;
            Ok(ParquetValue::Bytes(Bytes::copy_from_slice(
                array.value(index),
            )))
        }
        DataType::FixedSizeBinary(_) => {
            let array = downcast_array::<FixedSizeBinaryArray>(array)?;
            Ok(ParquetValue::Bytes(Bytes::copy_from_slice(
                array.value(index),
            )))
        }

        DataType::Date32 => Ok(ParquetValue::Date32(
            downcast_array::<Date32Array>(array)?.value(index),
        )),
        DataType::Date64 => Ok(ParquetValue::Date64(
            downcast_array::<Date64Array>(array)?.value(index),
        )),
        DataType::Time32(TimeUnit::Millisecond) => Ok(ParquetValue::TimeMillis(
            downcast_array::<Time32MillisecondArray>(array)?.value(index),
        )),
        DataType::Time64(TimeUnit::Microsecond) => Ok(ParquetValue::TimeMicros(
            downcast_array::<Time64MicrosecondArray>(array)?.value(index),
        )),
        DataType::Timestamp(unit, timezone) => {
            let timezone = timezone.as_ref().map(|s| Arc::from(s.as_ref()));
            match unit {
                TimeUnit::Millisecond => {
                    let array = downcast_array::<TimestampMillisecondArray>(array)?;
                    Ok(ParquetValue::TimestampMillis(array.value(index), timezone))
                }
                TimeUnit::Microsecond => {
                    let array = downcast_array::<TimestampMicrosecondArray>(array)?;
                    Ok(ParquetValue::TimestampMicros(array.value(index), timezone))
                }
                TimeUnit::Nanosecond => {
                    let array = downcast_array::<TimestampNanosecondArray>(array)?;
                    Ok(ParquetValue::TimestampNanos(array.value(index), timezone))
                }
                TimeUnit::Second => Err(CodecError::unsupported(
                    "Second-precision timestamps are not supported",
                )),
            }
        }

        DataType::Decimal128(_precision, scale) => {
            let array = downcast_array::<Decimal128Array>(array)?;
            Ok(ParquetValue::Decimal128(array.value(index), *scale))
        }

        DataType::List(_) => {
            let array = downcast_array::<ListArray>(array)?;
            let list_values = array.value(index);

            let values = (0..list_values.len())
                .map(|i| arrow_to_parquet_value(&list_values, i))
                .collect::<Result<Vec<_>>>()?;
            Ok(ParquetValue::List(values))
        }
        DataType::Struct(_) => {
            let array = downcast_array::<StructArray>(array)?;

            let mut map = IndexMap::new();
            for (col_idx, field) in array.fields().iter().enumerate() {
                let value = arrow_to_parquet_value(array.column(col_idx), index)?;
                map.insert(Arc::from(field.name().as_str()), value);
            }
            Ok(ParquetValue::Record(map))
        }

        dt => Err(CodecError::conversion(format!(
            "Unsupported data type for conversion: {:?}",
            dt
        ))),
    }
}

/// Convert a whole Arrow column to ParquetValues
pub fn arrow_column_to_values(array: &dyn Array) -> Result<Vec<ParquetValue>> {
    (0..array.len())
        .map(|i| arrow_to_parquet_value(array, i))
        .collect()
}

/// Build a primitive array from values. Each `Variant(x) => expr` arm lists
/// a value shape the column accepts; everything else except `Null` fails.
macro_rules! build_primitive {
    ($builder:expr, $values:expr, $expected:literal, { $($pat:pat => $val:expr),+ $(,)? }) => {{
        let mut builder = $builder;
        for value in $values {
            match value {
                $($pat => builder.append_value($val),)+
                ParquetValue::Null => builder.append_null(),
                other => {
                    return Err(CodecError::conversion(format!(
                        "Expected {}, got {}",
                        $expected,
                        other.type_name()
                    )))
                }
            }
        }
        Ok(Arc::new(builder.finish()) as ArrayRef)
    }};
}

/// Convert a vector of ParquetValues to an Arrow array for the given field
pub fn parquet_values_to_arrow_array(values: Vec<ParquetValue>, field: &Field) -> Result<ArrayRef> {
    use ParquetValue as V;

    if !field.is_nullable() {
        if let Some(idx) = values.iter().position(ParquetValue::is_null) {
            return Err(CodecError::schema(format!(
                "Found null value for non-nullable field '{}' at row {}",
                field.name(),
                idx
            )));
        }
    }

    let n = values.len();
    match field.data_type() {
        DataType::Boolean => build_primitive!(BooleanBuilder::with_capacity(n), values, "Boolean", {
            V::Boolean(b) => b,
        }),

        DataType::Int8 => build_primitive!(Int8Builder::with_capacity(n), values, "Int8", {
            V::Int8(i) => i,
        }),
        DataType::Int16 => build_primitive!(Int16Builder::with_capacity(n), values, "Int16", {
            V::Int16(i) => i,
            V::Int8(i) => i as i16,
            V::UInt8(i) => i as i16,
        }),
        DataType::Int32 => build_primitive!(Int32Builder::with_capacity(n), values, "Int32", {
            V::Int32(i) => i,
            V::Int16(i) => i as i32,
            V::Int8(i) => i as i32,
            V::UInt16(i) => i as i32,
            V::UInt8(i) => i as i32,
        }),
        DataType::Int64 => build_primitive!(Int64Builder::with_capacity(n), values, "Int64", {
            V::Int64(i) => i,
            V::Int32(i) => i as i64,
            V::Int16(i) => i as i64,
            V::Int8(i) => i as i64,
            V::UInt32(i) => i as i64,
            V::UInt16(i) => i as i64,
            V::UInt8(i) => i as i64,
        }),
        DataType::UInt8 => build_primitive!(UInt8Builder::with_capacity(n), values, "UInt8", {
            V::UInt8(i) => i,
        }),
        DataType::UInt16 => build_primitive!(UInt16Builder::with_capacity(n), values, "UInt16", {
            V::UInt16(i) => i,
            V::UInt8(i) => i as u16,
        }),
        DataType::UInt32 => build_primitive!(UInt32Builder::with_capacity(n), values, "UInt32", {
            V::UInt32(i) => i,
            V::UInt16(i) => i as u32,
            V::UInt8(i) => i as u32,
        }),
        DataType::UInt64 => build_primitive!(UInt64Builder::with_capacity(n), values, "UInt64", {
            V::UInt64(i) => i,
            V::UInt32(i) => i as u64,
            V::UInt16(i) => i as u64,
            V::UInt8(i) => i as u64,
        }),

        DataType::Float32 => build_primitive!(Float32Builder::with_capacity(n), values, "Float32", {
            V::Float32(OrderedFloat(f)) => f,
        }),
        DataType::Float64 => build_primitive!(Float64Builder::with_capacity(n), values, "Float64", {
            V::Float64(OrderedFloat(f)) => f,
            V::Float32(OrderedFloat(f)) => f as f64,
        }),

        DataType::Utf8 => build_primitive!(StringBuilder::with_capacity(n, 0), values, "String", {
            V::String(s) => s,
        }),
        DataType::Binary => build_primitive!(BinaryBuilder::with_capacity(n, 0), values, "Bytes", {
            V::Bytes(b) => b,
        }),
        DataType::FixedSizeBinary(size) => build_fixed_binary_array(values, *size),

        DataType::Date32 => build_primitive!(Date32Builder::with_capacity(n), values, "Date32", {
            V::Date32(d) => d,
        }),
        DataType::Date64 => build_primitive!(Date64Builder::with_capacity(n), values, "Date64", {
            V::Date64(d) => d,
        }),
        DataType::Time32(TimeUnit::Millisecond) => {
            build_primitive!(Time32MillisecondBuilder::with_capacity(n), values, "TimeMillis", {
                V::TimeMillis(t) => t,
            })
        }
        DataType::Time64(TimeUnit::Microsecond) => {
            build_primitive!(Time64MicrosecondBuilder::with_capacity(n), values, "TimeMicros", {
                V::TimeMicros(t) => t,
            })
        }

        DataType::Timestamp(TimeUnit::Millisecond, tz) => {
            build_timestamp_array::<TimestampMillisecondType>(values, tz)
        }
        DataType::Timestamp(TimeUnit::Microsecond, tz) => {
            build_timestamp_array::<TimestampMicrosecondType>(values, tz)
        }
        DataType::Timestamp(TimeUnit::Nanosecond, tz) => {
            build_timestamp_array::<TimestampNanosecondType>(values, tz)
        }

        DataType::Decimal128(precision, scale) => build_decimal128_array(values, *precision, *scale),

        DataType::List(item_field) => build_list_array(values, item_field),
        DataType::Struct(fields) => build_struct_array(values, fields),

        dt => Err(CodecError::conversion(format!(
            "Unsupported data type for conversion: {:?}",
            dt
        ))),
    }
}

/// Helper function to downcast an array with better error messages
fn downcast_array<T: 'static>(array: &dyn Array) -> Result<&T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        CodecError::conversion(format!("Failed to cast to {}", std::any::type_name::<T>()))
    })
}

fn build_fixed_binary_array(values: Vec<ParquetValue>, size: i32) -> Result<ArrayRef> {
    let mut builder = FixedSizeBinaryBuilder::with_capacity(values.len(), size);
    for value in values {
        match value {
            ParquetValue::Bytes(b) => {
                if b.len() != size as usize {
                    return Err(CodecError::conversion(format!(
                        "Fixed size binary expected {} bytes, got {}",
                        size,
                        b.len()
                    )));
                }
                builder.append_value(&b)?;
            }
            ParquetValue::Null => builder.append_null(),
            other => {
                return Err(CodecError::conversion(format!(
                    "Expected Bytes, got {}",
                    other.type_name()
                )))
            }
        }
    }
    Ok(Arc::new(builder.finish()))
}

/// A value without a timezone takes the column's; a value with a different
/// one is rejected.
fn build_timestamp_array<T: ArrowTimestampType>(
    values: Vec<ParquetValue>,
    timezone: &Option<Arc<str>>,
) -> Result<ArrayRef> {
    let mut builder =
        PrimitiveBuilder::<T>::with_capacity(values.len()).with_timezone_opt(timezone.clone());
    for value in values {
        match timestamp_in_unit(value, T::UNIT, timezone.as_deref())? {
            Some(t) => builder.append_value(t),
            None => builder.append_null(),
        }
    }
    Ok(Arc::new(builder.finish()))
}

fn timestamp_in_unit(
    value: ParquetValue,
    unit: TimeUnit,
    column_timezone: Option<&str>,
) -> Result<Option<i64>> {
    use ParquetValue as V;

    let (t, timezone, factor) = match (value, unit) {
        (V::Null, _) => return Ok(None),
        (V::TimestampMillis(t, tz), TimeUnit::Millisecond) => (t, tz, 1),
        (V::TimestampMicros(t, tz), TimeUnit::Microsecond) => (t, tz, 1),
        (V::TimestampMillis(t, tz), TimeUnit::Microsecond) => (t, tz, 1_000),
        (V::TimestampNanos(t, tz), TimeUnit::Nanosecond) => (t, tz, 1),
        (other, unit) => {
            let expected = match unit {
                TimeUnit::Millisecond => "TimestampMillis",
                TimeUnit::Microsecond => "TimestampMicros",
                _ => "TimestampNanos",
            };
            return Err(CodecError::conversion(format!(
                "Expected {}, got {}",
                expected,
                other.type_name()
            )));
        }
    };

    if let Some(tz) = timezone.as_deref() {
        if column_timezone != Some(tz) {
            return Err(CodecError::conversion(format!(
                "Timestamp in timezone '{}' does not match column timezone {:?}",
                tz, column_timezone
            )));
        }
    }

    t.checked_mul(factor).map(Some).ok_or_else(|| {
        CodecError::conversion(format!(
            "Timestamp {} overflows when converted to {:?}",
            t, unit
        ))
    })
}

fn build_decimal128_array(values: Vec<ParquetValue>, precision: u8, scale: i8) -> Result<ArrayRef> {
    let mut builder = Decimal128Builder::with_capacity(values.len());
    for value in values {
        match value {
            ParquetValue::Decimal128(v, value_scale) if value_scale == scale => {
                builder.append_value(v)
            }
            ParquetValue::Decimal128(_, value_scale) => {
                return Err(CodecError::conversion(format!(
                    "Decimal scale {} does not match column scale {}",
                    value_scale, scale
                )))
            }
            ParquetValue::Null => builder.append_null(),
            other => {
                return Err(CodecError::conversion(format!(
                    "Expected Decimal128, got {}",
                    other.type_name()
                )))
            }
        }
    }
    let array = builder
        .finish()
        .with_precision_and_scale(precision, scale)?;
    array.validate_decimal_precision(precision)?;
    Ok(Arc::new(array))
}

fn build_list_array(values: Vec<ParquetValue>, item_field: &Arc<Field>) -> Result<ArrayRef> {
    let mut offsets = Vec::with_capacity(values.len() + 1);
    let mut validity = Vec::with_capacity(values.len());
    let mut items = Vec::new();
    offsets.push(0i32);

    for value in values {
        match value {
            ParquetValue::List(list) => {
                items.extend(list);
                validity.push(true);
            }
            ParquetValue::Null => validity.push(false),
            other => {
                return Err(CodecError::conversion(format!(
                    "Expected List, got {}",
                    other.type_name()
                )))
            }
        }
        let end = i32::try_from(items.len())
            .map_err(|_| CodecError::conversion("List column exceeds i32 offsets"))?;
        offsets.push(end);
    }

    let child = parquet_values_to_arrow_array(items, item_field)?;
    let nulls = validity.iter().any(|v| !v).then(|| NullBuffer::from(validity));
    let list = ListArray::try_new(
        item_field.clone(),
        OffsetBuffer::new(offsets.into()),
        child,
        nulls,
    )?;
    Ok(Arc::new(list))
}

fn build_struct_array(values: Vec<ParquetValue>, fields: &Fields) -> Result<ArrayRef> {
    let num_rows = values.len();
    let mut columns: Vec<Vec<ParquetValue>> = vec![Vec::with_capacity(num_rows); fields.len()];
    let mut validity = Vec::with_capacity(num_rows);

    for value in values {
        match value {
            ParquetValue::Record(mut record) => {
                for (idx, field) in fields.iter().enumerate() {
                    let v = record
                        .shift_remove(field.name().as_str())
                        .unwrap_or(ParquetValue::Null);
                    columns[idx].push(v);
                }
                if let Some((extra, _)) = record.first() {
                    return Err(CodecError::conversion(format!(
                        "Struct value has field '{}' that is not in the schema",
                        extra
                    )));
                }
                validity.push(true);
            }
            ParquetValue::Null => {
                for column in columns.iter_mut() {
                    column.push(ParquetValue::Null);
                }
                validity.push(false);
            }
            other => {
                return Err(CodecError::conversion(format!(
                    "Expected Record, got {}",
                    other.type_name()
                )))
            }
        }
    }

    // Children of a null struct slot may be null even if the child is required
    let arrays = columns
        .into_iter()
        .zip(fields.iter())
        .map(|(column, field)| {
            let relaxed = field.as_ref().clone().with_nullable(true);
            let array = parquet_values_to_arrow_array(column, &relaxed)?;
            if !field.is_nullable() && array.null_count() > 0 {
                let valid_nulls = validity
                    .iter()
                    .zip(0..array.len())
                    .any(|(valid, i)| *valid && array.is_null(i));
                if valid_nulls {
                    return Err(CodecError::schema(format!(
                        "Required field '{}' is missing in struct",
                        field.name()
                    )));
                }
            }
            Ok(array)
        })
        .collect::<Result<Vec<_>>>()?;

    let nulls = validity.iter().any(|v| !v).then(|| NullBuffer::from(validity));
    let array = StructArray::try_new(fields.clone(), arrays, nulls)?;
    Ok(Arc::new(array))
}
