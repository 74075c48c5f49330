use bytes::Bytes;
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use std::sync::Arc;

/// A single cell of a block column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParquetValue {
    // Numeric types
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(OrderedFloat<f32>),
    Float64(OrderedFloat<f64>),

    // Basic types
    Boolean(bool),
    String(Arc<str>),
    Bytes(Bytes),

    // Date/Time types
    Date32(i32), // Days since epoch
    Date64(i64), // Milliseconds since epoch

    Decimal128(i128, i8), // value, scale

    // Timestamps keep the timezone string verbatim
    TimestampMillis(i64, Option<Arc<str>>),
    TimestampMicros(i64, Option<Arc<str>>),
    TimestampNanos(i64, Option<Arc<str>>),

    TimeMillis(i32), // Time of day in milliseconds since midnight
    TimeMicros(i64), // Time of day in microseconds since midnight

    // Complex types
    List(Vec<ParquetValue>),
    Record(IndexMap<Arc<str>, ParquetValue>), // preserves field order

    Null,
}

impl ParquetValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, ParquetValue::Null)
    }

    /// Get the type name of the value
    pub fn type_name(&self) -> &'static str {
        match self {
            ParquetValue::Int8(_) => "Int8",
            ParquetValue::Int16(_) => "Int16",
            ParquetValue::Int32(_) => "Int32",
            ParquetValue::Int64(_) => "Int64",
            ParquetValue::UInt8(_) => "UInt8",
            ParquetValue::UInt16(_) => "UInt16",
            ParquetValue::UInt32(_) => "UInt32",
            ParquetValue::UInt64(_) => "UInt64",
            ParquetValue::Float32(_) => "Float32",
            ParquetValue::Float64(_) => "Float64",
            ParquetValue::Boolean(_) => "Boolean",
            ParquetValue::String(_) => "String",
            ParquetValue::Bytes(_) => "Bytes",
            ParquetValue::Date32(_) => "Date32",
            ParquetValue::Date64(_) => "Date64",
            ParquetValue::Decimal128(_, _) => "Decimal128",
            ParquetValue::TimestampMillis(_, _) => "TimestampMillis",
            ParquetValue::TimestampMicros(_, _) => "TimestampMicros",
            ParquetValue::TimestampNanos(_, _) => "TimestampNanos",
            ParquetValue::TimeMillis(_) => "TimeMillis",
            ParquetValue::TimeMicros(_) => "TimeMicros",
            ParquetValue::List(_) => "List",
            ParquetValue::Record(_) => "Record",
            ParquetValue::Null => "Null",
        }
    }
}

impl From<i32> for ParquetValue {
    fn from(v: i32) -> Self {
        ParquetValue::Int32(v)
    }
}

impl From<i64> for ParquetValue {
    fn from(v: i64) -> Self {
        ParquetValue::Int64(v)
    }
}

impl From<f64> for ParquetValue {
    fn from(v: f64) -> Self {
        ParquetValue::Float64(OrderedFloat(v))
    }
}

impl From<bool> for ParquetValue {
    fn from(v: bool) -> Self {
        ParquetValue::Boolean(v)
    }
}

impl From<&str> for ParquetValue {
    fn from(v: &str) -> Self {
        ParquetValue::String(Arc::from(v))
    }
}

impl<T: Into<ParquetValue>> From<Option<T>> for ParquetValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ParquetValue::Null)
    }
}
