//! Core Parquet writing functionality

use crate::options::{OptionMap, WriteOptions};
use crate::{
    arrow_conversion::parquet_values_to_arrow_array, CodecError, ParquetValue, Result, Schema,
    Table,
};
use arrow::record_batch::RecordBatch;
use arrow_schema::SchemaRef;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::io::Write;

/// Builder for creating a configured Writer
#[derive(Debug, Clone, Default)]
pub struct WriterBuilder {
    options: WriteOptions,
}

impl WriterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from already parsed encode options
    pub fn from_options(options: WriteOptions) -> Self {
        Self { options }
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.options.compression = compression;
        self
    }

    /// Set the maximum number of rows per row group
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.options.max_row_group_size = Some(size);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.key_value_metadata.push((key.into(), value.into()));
        self
    }

    pub fn properties(&self) -> WriterProperties {
        self.options.to_writer_properties()
    }

    /// Build a Writer for the given Arrow schema
    pub fn build<W: Write + Send>(self, writer: W, schema: SchemaRef) -> Result<Writer<W>> {
        let props = self.properties();
        let arrow_writer = ArrowWriter::try_new(writer, schema.clone(), Some(props))?;

        Ok(Writer {
            arrow_writer: Some(arrow_writer),
            schema,
            rows_written: 0,
        })
    }
}

/// Core Parquet writer that works with any type implementing Write
pub struct Writer<W: Write> {
    arrow_writer: Option<ArrowWriter<W>>,
    schema: SchemaRef,
    rows_written: usize,
}

impl<W> Writer<W>
where
    W: Write + Send,
{
    /// Create a new writer with default settings
    pub fn new(writer: W, schema: &Schema) -> Result<Self> {
        WriterBuilder::new().build(writer, schema.to_arrow()?)
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Write one record batch; its fields must match the writer schema
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        if batch.schema().fields() != self.schema.fields() {
            return Err(CodecError::schema(format!(
                "Batch schema {:?} does not match writer schema {:?}",
                batch.schema().fields(),
                self.schema.fields()
            )));
        }

        let writer = self.arrow_writer.as_mut().ok_or_else(closed)?;
        writer.write(batch)?;
        self.rows_written += batch.num_rows();
        Ok(())
    }

    pub fn write_table(&mut self, table: &Table) -> Result<()> {
        for batch in table.batches() {
            self.write(batch)?;
        }
        Ok(())
    }

    /// Write columns to the Parquet file
    ///
    /// Each element is a tuple of (column_name, values); columns are matched
    /// to schema fields by name.
    pub fn write_columns(&mut self, columns: Vec<(String, Vec<ParquetValue>)>) -> Result<()> {
        let fields = self.schema.fields();
        if columns.len() != fields.len() {
            return Err(CodecError::schema(format!(
                "Provided {} columns but schema has {} fields",
                columns.len(),
                fields.len()
            )));
        }

        let mut columns = columns;
        let mut arrays = Vec::with_capacity(fields.len());
        for field in fields {
            let pos = columns
                .iter()
                .position(|(name, _)| name == field.name())
                .ok_or_else(|| CodecError::schema(format!("Missing column: {}", field.name())))?;
            let (_, values) = columns.swap_remove(pos);
            arrays.push(parquet_values_to_arrow_array(values, field)?);
        }

        let batch = RecordBatch::try_new(self.schema.clone(), arrays)?;
        self.write(&batch)
    }

    /// Flush the current row group
    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = &mut self.arrow_writer {
            writer.flush()?;
        }
        Ok(())
    }

    /// Close the writer and write the file footer
    ///
    /// This must be called to finalize the Parquet file
    pub fn close(mut self) -> Result<()> {
        if let Some(writer) = self.arrow_writer.take() {
            writer.close()?;
        }
        Ok(())
    }
}

fn closed() -> CodecError {
    CodecError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        "Writer has been closed",
    ))
}

/// Encode a [`Table`] as a complete Parquet file into `sink`
pub fn encode<W: Write + Send>(table: &Table, sink: W, options: &OptionMap) -> Result<()> {
    let options = WriteOptions::from_options(options)?;
    let mut writer = WriterBuilder::from_options(options).build(sink, table.schema().clone())?;
    writer.write_table(table)?;
    log::trace!("Encoded {} rows", writer.rows_written());
    writer.close()
}
