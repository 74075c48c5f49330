use crate::args::WriteOptionSpec;
use crate::block::Block;
use crate::chunk_reader::InputFile;
use crate::error::Result;
use crate::fs::{FileSystem, OpenOptions};
use parquet_codec::{OptionMap, Table};
use std::fmt::Debug;
use std::io::Write;

/// Hooks a file format implements to plug into the file-based datasource
/// framework
///
/// The framework expands paths, partitions them into tasks and calls these
/// hooks once per file. Implementations hold only construction-time state,
/// so one instance can serve concurrent tasks.
pub trait FileBasedDatasource: Debug + Send + Sync {
    /// Human-readable name shown in plans and progress output
    fn display_name(&self) -> &str;

    /// Extension used to filter listed files and name written ones
    fn file_extension(&self) -> Option<&str> {
        None
    }

    /// Paths this datasource was created for
    fn paths(&self) -> &[String];

    /// Open `path` in the mode the format's decoder needs
    fn open_for_read(
        &self,
        fs: &dyn FileSystem,
        path: &str,
        options: &OpenOptions,
    ) -> Result<InputFile>;

    /// Decode one opened file into a table
    fn read_into_block(&self, file: &InputFile, path: &str) -> Result<Table>;

    /// Encode `block` into `sink` using the resolved write options
    fn write_from_block(
        &self,
        sink: &mut (dyn Write + Send),
        block: &Block,
        write_options: &WriteOptionSpec,
        explicit_options: &OptionMap,
    ) -> Result<()>;

    /// Open and decode one file
    fn read_file(&self, fs: &dyn FileSystem, path: &str, options: &OpenOptions) -> Result<Table> {
        let file = self.open_for_read(fs, path, options)?;
        self.read_into_block(&file, path)
    }

    /// Create `path` and encode `block` into it
    fn write_file(
        &self,
        fs: &dyn FileSystem,
        path: &str,
        block: &Block,
        write_options: &WriteOptionSpec,
        explicit_options: &OptionMap,
        options: &OpenOptions,
    ) -> Result<()> {
        let mut sink = fs.open_output_file(path, options)?;
        self.write_from_block(sink.as_mut(), block, write_options, explicit_options)
    }

    /// File name for the `block_index`-th block of write `write_id`
    fn output_file_name(&self, write_id: &str, block_index: usize) -> String {
        match self.file_extension() {
            Some(ext) => format!("{}_{:06}.{}", write_id, block_index, ext),
            None => format!("{}_{:06}", write_id, block_index),
        }
    }
}
