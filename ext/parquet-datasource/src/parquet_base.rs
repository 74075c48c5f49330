//! Parquet implementation of the datasource hooks

use crate::args::WriteOptionSpec;
use crate::block::Block;
use crate::chunk_reader::InputFile;
use crate::codec::{ParquetCodec, TableCodec};
use crate::config::DatasourceConfig;
use crate::datasource::FileBasedDatasource;
use crate::error::{DatasourceError, Result};
use crate::fs::{FileSystem, OpenOptions};
use parquet_codec::{CodecError, OptionMap, Table};
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;

pub const DISPLAY_NAME: &str = "ParquetBulk";
pub const FILE_EXTENSION: &str = "parquet";

/// Read options split into the thread toggle and the decoder options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadTableArgs {
    pub use_threads: bool,
    /// Forwarded verbatim to the decoder; never contains `use_threads`
    pub decode_args: OptionMap,
}

impl ReadTableArgs {
    pub fn from_options(mut options: OptionMap) -> Result<Self> {
        let use_threads = match options.remove("use_threads") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => flag,
            Some(other) => {
                return Err(DatasourceError::configuration(format!(
                    "use_threads must be a boolean, got {}",
                    other
                )))
            }
        };

        Ok(Self {
            use_threads,
            decode_args: options,
        })
    }
}

/// Bulk Parquet datasource
///
/// Parquet keeps its metadata in a trailing footer, so files are always
/// opened for random access. The instance is immutable after construction
/// and can be shared across concurrent read and write tasks.
#[derive(Debug, Clone)]
pub struct ParquetBaseDatasource {
    paths: Vec<String>,
    read_table_args: ReadTableArgs,
    open_options: OpenOptions,
    codec: Arc<dyn TableCodec>,
}

impl ParquetBaseDatasource {
    pub fn new(paths: Vec<String>, read_table_args: OptionMap) -> Result<Self> {
        if paths.is_empty() {
            return Err(DatasourceError::configuration(
                "At least one path is required",
            ));
        }

        Ok(Self {
            paths,
            read_table_args: ReadTableArgs::from_options(read_table_args)?,
            open_options: OpenOptions::default(),
            codec: Arc::new(ParquetCodec),
        })
    }

    pub fn from_config(config: DatasourceConfig) -> Result<Self> {
        let mut datasource = Self::new(config.paths.into_vec(), config.read_table_args)?;
        datasource.open_options = config.open_args;
        Ok(datasource)
    }

    /// Replace the table codec
    pub fn with_codec(mut self, codec: Arc<dyn TableCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn read_table_args(&self) -> &ReadTableArgs {
        &self.read_table_args
    }

    pub fn use_threads(&self) -> bool {
        self.read_table_args.use_threads
    }

    /// Open options from the configuration, for use with
    /// [`FileBasedDatasource::read_file`] and [`FileBasedDatasource::write_file`]
    pub fn open_options(&self) -> &OpenOptions {
        &self.open_options
    }
}

impl FileBasedDatasource for ParquetBaseDatasource {
    fn display_name(&self) -> &str {
        DISPLAY_NAME
    }

    fn file_extension(&self) -> Option<&str> {
        Some(FILE_EXTENSION)
    }

    fn paths(&self) -> &[String] {
        &self.paths
    }

    fn open_for_read(
        &self,
        fs: &dyn FileSystem,
        path: &str,
        options: &OpenOptions,
    ) -> Result<InputFile> {
        log::debug!("Opening {} for random access", path);
        fs.open_input_file(path, options)
    }

    fn read_into_block(&self, file: &InputFile, path: &str) -> Result<Table> {
        let args = &self.read_table_args;
        log::debug!(
            "Decoding {} (use_threads={}, options={:?})",
            path,
            args.use_threads,
            args.decode_args.keys().collect::<Vec<_>>()
        );

        let table = self
            .codec
            .decode(file.clone(), args.use_threads, &args.decode_args)
            .map_err(|source| DatasourceError::Decode {
                path: path.to_string(),
                source,
            })?;

        log::debug!("Decoded {} rows from {}", table.num_rows(), path);
        Ok(table)
    }

    fn write_from_block(
        &self,
        sink: &mut (dyn Write + Send),
        block: &Block,
        write_options: &WriteOptionSpec,
        explicit_options: &OptionMap,
    ) -> Result<()> {
        let options = write_options.resolve(explicit_options)?;
        log::trace!(
            "Resolved write options: {:?}",
            options.keys().collect::<Vec<_>>()
        );

        let table = block.to_table().map_err(DatasourceError::Encode)?;
        self.codec
            .encode(&table, sink, &options)
            .map_err(DatasourceError::Encode)?;
        sink.flush()
            .map_err(|e| DatasourceError::Encode(CodecError::Io(e)))?;

        log::debug!("Encoded {} rows", table.num_rows());
        Ok(())
    }
}
