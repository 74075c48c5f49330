//! Parquet format adapter for a file-based datasource framework
//!
//! The framework lists files, splits them into tasks and calls the
//! [`FileBasedDatasource`] hooks for each one. [`ParquetBaseDatasource`]
//! implements those hooks for Parquet:
//!
//! - `open_for_read` always asks the [`FileSystem`] for a random-access
//!   [`InputFile`], since the Parquet footer sits at the end of the file
//! - `read_into_block` decodes one file into a [`Table`] through a
//!   [`TableCodec`], forwarding the `use_threads` toggle and read options
//! - `write_from_block` resolves a [`WriteOptionSpec`] at write time and
//!   encodes one [`Block`] into the output sink
//!
//! Encoding and decoding live in the `parquet-codec` crate.

pub mod args;
pub mod block;
pub mod chunk_reader;
pub mod codec;
pub mod config;
pub mod datasource;
pub mod error;
pub mod fs;
pub mod logger;
pub mod parquet_base;

pub use args::{resolve_kwargs, OptionProducer, WriteOptionSpec};
pub use block::Block;
pub use chunk_reader::{InputFile, RandomAccessFile};
pub use codec::{ParquetCodec, TableCodec};
pub use config::{DatasourceConfig, Paths};
pub use datasource::FileBasedDatasource;
pub use error::{BoxError, DatasourceError, Result};
pub use fs::{FileSystem, LocalFileSystem, MemoryFileSystem, OpenOptions};
pub use logger::init_logging;
pub use parquet_base::{ParquetBaseDatasource, ReadTableArgs};
pub use parquet_codec::{OptionMap, ParquetValue, Schema, SchemaBuilder, SchemaNode, Table};
