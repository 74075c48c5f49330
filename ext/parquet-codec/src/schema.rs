use crate::{CodecError, Result};
use arrow_schema::{DataType, Field, TimeUnit};
use std::sync::Arc;

/// Schema of a block: a root struct whose fields are the columns
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub root: SchemaNode,
}

/// Represents a node in the schema tree
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A struct with named fields
    Struct {
        name: String,
        nullable: bool,
        fields: Vec<SchemaNode>,
    },
    /// A list containing items of a single type
    List {
        name: String,
        nullable: bool,
        item: Box<SchemaNode>,
    },
    /// A primitive/leaf type
    Primitive {
        name: String,
        primitive_type: PrimitiveType,
        nullable: bool,
    },
}

/// Primitive data types that can be stored in a column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    // Integer types
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,

    // Floating point types
    Float32,
    Float64,

    // (precision, scale)
    Decimal128(u8, i8),

    // Other basic types
    Boolean,
    String,
    Binary,
    FixedLenByteArray(i32),

    // Date/Time types
    Date32,
    Date64,
    TimestampMillis(Option<Arc<str>>),
    TimestampMicros(Option<Arc<str>>),
    TimestampNanos(Option<Arc<str>>),
    TimeMillis,
    TimeMicros,
}

/// Represents how values are repeated in Parquet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repetition {
    /// Field must have exactly one value
    Required,
    /// Field can have 0 or 1 value
    Optional,
}

impl SchemaNode {
    /// Shorthand for a primitive column node
    pub fn primitive(name: impl Into<String>, primitive_type: PrimitiveType, nullable: bool) -> Self {
        SchemaNode::Primitive {
            name: name.into(),
            primitive_type,
            nullable,
        }
    }

    /// Get the name of this schema node
    pub fn name(&self) -> &str {
        match self {
            SchemaNode::Struct { name, .. } => name,
            SchemaNode::List { name, .. } => name,
            SchemaNode::Primitive { name, .. } => name,
        }
    }

    /// Check if this node is nullable
    pub fn is_nullable(&self) -> bool {
        match self {
            SchemaNode::Struct { nullable, .. } => *nullable,
            SchemaNode::List { nullable, .. } => *nullable,
            SchemaNode::Primitive { nullable, .. } => *nullable,
        }
    }

    /// Get the repetition level based on nullability
    pub fn repetition(&self) -> Repetition {
        if self.is_nullable() {
            Repetition::Optional
        } else {
            Repetition::Required
        }
    }

    /// Convert this node to an Arrow field
    pub fn to_arrow_field(&self) -> Result<Field> {
        match self {
            SchemaNode::Primitive {
                name,
                primitive_type,
                nullable,
            } => Ok(Field::new(name, primitive_type.to_arrow(), *nullable)),
            SchemaNode::List {
                name,
                item,
                nullable,
            } => {
                let item_field = item.to_arrow_field()?;
                let list_type = DataType::List(Arc::new(Field::new(
                    "item",
                    item_field.data_type().clone(),
                    item_field.is_nullable(),
                )));
                Ok(Field::new(name, list_type, *nullable))
            }
            SchemaNode::Struct {
                name,
                fields,
                nullable,
            } => {
                if fields.is_empty() {
                    return Err(CodecError::schema(format!(
                        "Struct '{}' has no fields; empty structs cannot be stored",
                        name
                    )));
                }
                let struct_fields = fields
                    .iter()
                    .map(SchemaNode::to_arrow_field)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Field::new(
                    name,
                    DataType::Struct(struct_fields.into()),
                    *nullable,
                ))
            }
        }
    }

    /// Build a node from an Arrow field
    pub fn from_arrow_field(field: &Field) -> Result<Self> {
        let name = field.name().to_string();
        let nullable = field.is_nullable();
        match field.data_type() {
            DataType::List(item) => Ok(SchemaNode::List {
                name,
                nullable,
                item: Box::new(SchemaNode::from_arrow_field(item)?),
            }),
            DataType::Struct(fields) => Ok(SchemaNode::Struct {
                name,
                nullable,
                fields: fields
                    .iter()
                    .map(|f| SchemaNode::from_arrow_field(f))
                    .collect::<Result<Vec<_>>>()?,
            }),
            dt => Ok(SchemaNode::Primitive {
                name,
                primitive_type: PrimitiveType::from_arrow(dt)?,
                nullable,
            }),
        }
    }
}

impl PrimitiveType {
    /// Get the logical type name for display
    pub fn type_name(&self) -> &'static str {
        match self {
            PrimitiveType::Int8 => "Int8",
            PrimitiveType::Int16 => "Int16",
            PrimitiveType::Int32 => "Int32",
            PrimitiveType::Int64 => "Int64",
            PrimitiveType::UInt8 => "UInt8",
            PrimitiveType::UInt16 => "UInt16",
            PrimitiveType::UInt32 => "UInt32",
            PrimitiveType::UInt64 => "UInt64",
            PrimitiveType::Float32 => "Float32",
            PrimitiveType::Float64 => "Float64",
            PrimitiveType::Decimal128(_, _) => "Decimal128",
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::String => "String",
            PrimitiveType::Binary => "Binary",
            PrimitiveType::FixedLenByteArray(_) => "FixedLenByteArray",
            PrimitiveType::Date32 => "Date32",
            PrimitiveType::Date64 => "Date64",
            PrimitiveType::TimestampMillis(_) => "TimestampMillis",
            PrimitiveType::TimestampMicros(_) => "TimestampMicros",
            PrimitiveType::TimestampNanos(_) => "TimestampNanos",
            PrimitiveType::TimeMillis => "TimeMillis",
            PrimitiveType::TimeMicros => "TimeMicros",
        }
    }

    /// Convert to the Arrow data type used in memory and in the file
    pub fn to_arrow(&self) -> DataType {
        use PrimitiveType::*;

        match self {
            Boolean => DataType::Boolean,
            Int8 => DataType::Int8,
            Int16 => DataType::Int16,
            Int32 => DataType::Int32,
            Int64 => DataType::Int64,
            UInt8 => DataType::UInt8,
            UInt16 => DataType::UInt16,
            UInt32 => DataType::UInt32,
            UInt64 => DataType::UInt64,
            Float32 => DataType::Float32,
            Float64 => DataType::Float64,
            String => DataType::Utf8,
            Binary => DataType::Binary,
            FixedLenByteArray(len) => DataType::FixedSizeBinary(*len),
            Decimal128(precision, scale) => DataType::Decimal128(*precision, *scale),
            Date32 => DataType::Date32,
            Date64 => DataType::Date64,
            TimeMillis => DataType::Time32(TimeUnit::Millisecond),
            TimeMicros => DataType::Time64(TimeUnit::Microsecond),
            TimestampMillis(tz) => DataType::Timestamp(TimeUnit::Millisecond, tz.clone()),
            TimestampMicros(tz) => DataType::Timestamp(TimeUnit::Microsecond, tz.clone()),
            TimestampNanos(tz) => DataType::Timestamp(TimeUnit::Nanosecond, tz.clone()),
        }
    }

    /// Map an Arrow data type back to a primitive type
    pub fn from_arrow(data_type: &DataType) -> Result<Self> {
        use PrimitiveType::*;

        Ok(match data_type {
            DataType::Boolean => Boolean,
            DataType::Int8 => Int8,
            DataType::Int16 => Int16,
            DataType::Int32 => Int32,
            DataType::Int64 => Int64,
            DataType::UInt8 => UInt8,
            DataType::UInt16 => UInt16,
            DataType::UInt32 => UInt32,
            DataType::UInt64 => UInt64,
            DataType::Float32 => Float32,
            DataType::Float64 => Float64,
            DataType::Utf8 => String,
            DataType::Binary => Binary,
            DataType::FixedSizeBinary(len) => FixedLenByteArray(*len),
            DataType::Decimal128(precision, scale) => Decimal128(*precision, *scale),
            DataType::Date32 => Date32,
            DataType::Date64 => Date64,
            DataType::Time32(TimeUnit::Millisecond) => TimeMillis,
            DataType::Time64(TimeUnit::Microsecond) => TimeMicros,
            DataType::Timestamp(TimeUnit::Millisecond, tz) => TimestampMillis(tz.clone()),
            DataType::Timestamp(TimeUnit::Microsecond, tz) => TimestampMicros(tz.clone()),
            DataType::Timestamp(TimeUnit::Nanosecond, tz) => TimestampNanos(tz.clone()),
            dt => {
                return Err(CodecError::unsupported(format!(
                    "Arrow type {:?} has no block representation",
                    dt
                )))
            }
        })
    }
}

impl Schema {
    /// Top-level column nodes
    pub fn columns(&self) -> &[SchemaNode] {
        match &self.root {
            SchemaNode::Struct { fields, .. } => fields,
            _ => &[],
        }
    }

    /// Top-level column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns().iter().map(SchemaNode::name).collect()
    }

    /// Convert to an Arrow schema
    pub fn to_arrow(&self) -> Result<Arc<arrow_schema::Schema>> {
        match &self.root {
            SchemaNode::Struct { fields, .. } => {
                let arrow_fields = fields
                    .iter()
                    .map(SchemaNode::to_arrow_field)
                    .collect::<Result<Vec<_>>>()?;

                Ok(Arc::new(arrow_schema::Schema::new(arrow_fields)))
            }
            _ => Err(CodecError::schema("Root schema node must be a struct")),
        }
    }

    /// Build from an Arrow schema, naming the root `root`
    pub fn from_arrow(schema: &arrow_schema::Schema) -> Result<Self> {
        let fields = schema
            .fields()
            .iter()
            .map(|f| SchemaNode::from_arrow_field(f))
            .collect::<Result<Vec<_>>>()?;
        Ok(Schema {
            root: SchemaNode::Struct {
                name: "root".to_string(),
                nullable: false,
                fields,
            },
        })
    }
}

/// Builder for creating schemas
#[derive(Default)]
pub struct SchemaBuilder {
    root: Option<SchemaNode>,
    columns: Vec<SchemaNode>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: SchemaNode) -> Self {
        self.root = Some(root);
        self
    }

    /// Append a top-level column to an implicit `root` struct
    pub fn with_column(mut self, column: SchemaNode) -> Self {
        self.columns.push(column);
        self
    }

    pub fn build(self) -> std::result::Result<Schema, &'static str> {
        match (self.root, self.columns.is_empty()) {
            (Some(root), true) => Ok(Schema { root }),
            (Some(_), false) => Err("Schema cannot have both an explicit root and columns"),
            (None, false) => Ok(Schema {
                root: SchemaNode::Struct {
                    name: "root".to_string(),
                    nullable: false,
                    fields: self.columns,
                },
            }),
            (None, true) => Err("Schema must have a root node"),
        }
    }
}
