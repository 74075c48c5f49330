use crate::chunk_reader::InputFile;
use parquet_codec::{OptionMap, Result, Table};
use std::fmt::Debug;
use std::io::Write;

/// Table-format encoder/decoder used by a datasource
pub trait TableCodec: Debug + Send + Sync {
    /// Decode a whole file into a table
    fn decode(&self, file: InputFile, use_threads: bool, options: &OptionMap) -> Result<Table>;

    /// Encode `table` as one complete file into `sink`
    fn encode(
        &self,
        table: &Table,
        sink: &mut (dyn Write + Send),
        options: &OptionMap,
    ) -> Result<()>;
}

/// Codec backed by `parquet-codec`
#[derive(Debug, Clone, Copy, Default)]
pub struct ParquetCodec;

impl TableCodec for ParquetCodec {
    fn decode(&self, file: InputFile, use_threads: bool, options: &OptionMap) -> Result<Table> {
        parquet_codec::decode(file, use_threads, options)
    }

    fn encode(
        &self,
        table: &Table,
        sink: &mut (dyn Write + Send),
        options: &OptionMap,
    ) -> Result<()> {
        parquet_codec::encode(table, sink, options)
    }
}
