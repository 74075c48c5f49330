//! Parquet encode/decode engine for tabular blocks
//!
//! `parquet-codec` turns a Parquet byte source into an in-memory [`Table`]
//! and back. It wraps the Apache parquet-rs crate behind a small surface:
//!
//! - [`decode`]: read a whole file from any [`parquet::file::reader::ChunkReader`],
//!   either sequentially or one row group per rayon task
//! - [`encode`]: write a [`Table`] to any `std::io::Write + Send` sink
//! - [`ReadOptions`] / [`WriteOptions`]: keyword-style options parsed from an
//!   [`OptionMap`], with unknown names rejected
//! - [`Schema`] and [`ParquetValue`]: a typed schema and cell representation
//!   for callers that build blocks column by column
//!
//! The codec does no file system access of its own; callers hand it an
//! already opened source or sink.

pub mod arrow_conversion;
pub mod error;
pub mod options;
pub mod reader;
pub mod schema;
pub mod table;
pub mod value;
pub mod writer;

pub use error::{CodecError, Result};
pub use options::{OptionMap, ReadOptions, WriteOptions};
pub use reader::{decode, Reader};
pub use schema::{PrimitiveType, Repetition, Schema, SchemaBuilder, SchemaNode};
pub use table::Table;
pub use value::ParquetValue;
pub use writer::{encode, Writer, WriterBuilder};
