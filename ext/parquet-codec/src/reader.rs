//! Core Parquet reading functionality

use crate::arrow_conversion::arrow_to_parquet_value;
use crate::options::{OptionMap, ReadOptions};
use crate::{CodecError, ParquetValue, Result, Table};
use arrow::record_batch::RecordBatch;
use arrow_schema::SchemaRef;
use parquet::arrow::arrow_reader::{
    ArrowReaderMetadata, ArrowReaderOptions, ParquetRecordBatchReader,
    ParquetRecordBatchReaderBuilder,
};
use parquet::arrow::ProjectionMask;
use parquet::file::metadata::ParquetMetaData;
use parquet::file::reader::ChunkReader;
use rayon::prelude::*;
use std::sync::Arc;

/// Parquet reader over any random-access source
///
/// The footer is parsed once in [`Reader::try_new`]; every decode after that
/// reuses the loaded metadata, including the per-row-group readers used by
/// [`Reader::read_table_parallel`].
#[derive(Clone)]
pub struct Reader<R> {
    inner: R,
    metadata: ArrowReaderMetadata,
}

impl<R> Reader<R>
where
    R: ChunkReader + Clone + 'static,
{
    /// Open a reader, loading the footer metadata
    pub fn try_new(reader: R) -> Result<Self> {
        let metadata = ArrowReaderMetadata::load(&reader, ArrowReaderOptions::default())?;
        Ok(Self {
            inner: reader,
            metadata,
        })
    }

    pub fn metadata(&self) -> &Arc<ParquetMetaData> {
        self.metadata.metadata()
    }

    /// Full file schema, ignoring any projection
    pub fn schema(&self) -> &SchemaRef {
        self.metadata.schema()
    }

    pub fn num_row_groups(&self) -> usize {
        self.metadata().num_row_groups()
    }

    pub fn num_rows(&self) -> i64 {
        self.metadata().file_metadata().num_rows()
    }

    /// Decode the selected row groups one after another
    pub fn read_table(&self, options: &ReadOptions) -> Result<Table> {
        let (mask, schema) = self.projection(options)?;
        let row_groups = self.selected_row_groups(options)?;

        let batches = self.decode_row_groups(row_groups, mask, options.batch_size())?;
        assemble(schema, batches)
    }

    /// Decode each selected row group on the rayon pool, reassembling the
    /// results in file order
    pub fn read_table_parallel(&self, options: &ReadOptions) -> Result<Table> {
        let (mask, schema) = self.projection(options)?;
        let row_groups = self.selected_row_groups(options)?;
        let batch_size = options.batch_size();

        log::debug!(
            "Decoding {} row groups across {} threads",
            row_groups.len(),
            rayon::current_num_threads()
        );

        let per_group = row_groups
            .par_iter()
            .map(|&idx| {
                self.decode_row_groups(vec![idx], mask.clone(), batch_size)
                    .inspect_err(|e| log::debug!("Decoding row group {} failed: {}", idx, e))
            })
            .collect::<Result<Vec<_>>>()?;

        assemble(schema, per_group.into_iter().flatten().collect())
    }

    /// Iterate rows of the selected columns and row groups
    ///
    /// Each row is a vector of values in projected column order.
    pub fn rows(&self, options: &ReadOptions) -> Result<RowIterator> {
        let (mask, _) = self.projection(options)?;
        let row_groups = self.selected_row_groups(options)?;

        let batch_reader = ParquetRecordBatchReaderBuilder::new_with_metadata(
            self.inner.clone(),
            self.metadata.clone(),
        )
        .with_projection(mask)
        .with_row_groups(row_groups)
        .with_batch_size(options.batch_size())
        .build()?;

        Ok(RowIterator {
            batch_reader,
            current_batch: None,
            current_row: 0,
        })
    }

    fn decode_row_groups(
        &self,
        row_groups: Vec<usize>,
        mask: ProjectionMask,
        batch_size: usize,
    ) -> Result<Vec<RecordBatch>> {
        if row_groups.is_empty() {
            return Ok(Vec::new());
        }

        let reader = ParquetRecordBatchReaderBuilder::new_with_metadata(
            self.inner.clone(),
            self.metadata.clone(),
        )
        .with_projection(mask)
        .with_row_groups(row_groups)
        .with_batch_size(batch_size)
        .build()?;

        reader
            .map(|batch| batch.map_err(CodecError::from))
            .collect()
    }

    fn projection(&self, options: &ReadOptions) -> Result<(ProjectionMask, SchemaRef)> {
        let schema = self.schema();
        let Some(columns) = &options.columns else {
            return Ok((ProjectionMask::all(), schema.clone()));
        };

        for name in columns {
            if schema.field_with_name(name).is_err() {
                log::warn!("Projected column '{}' not found in file, ignoring", name);
            }
        }

        let indices: Vec<usize> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, field)| columns.iter().any(|c| c == field.name()))
            .map(|(idx, _)| idx)
            .collect();

        let mask = ProjectionMask::roots(
            self.metadata().file_metadata().schema_descr(),
            indices.iter().copied(),
        );
        let projected = Arc::new(schema.project(&indices)?);
        Ok((mask, projected))
    }

    fn selected_row_groups(&self, options: &ReadOptions) -> Result<Vec<usize>> {
        let available = self.num_row_groups();
        match &options.row_groups {
            None => Ok((0..available).collect()),
            Some(groups) => {
                if let Some(bad) = groups.iter().find(|&&idx| idx >= available) {
                    return Err(CodecError::invalid_argument(format!(
                        "Row group {} out of range, file has {} row groups",
                        bad, available
                    )));
                }
                Ok(groups.clone())
            }
        }
    }
}

/// Iterator over rows in a Parquet file
pub struct RowIterator {
    batch_reader: ParquetRecordBatchReader,
    current_batch: Option<RecordBatch>,
    current_row: usize,
}

impl Iterator for RowIterator {
    type Item = Result<Vec<ParquetValue>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(batch) = &self.current_batch {
                if self.current_row < batch.num_rows() {
                    let row = batch
                        .columns()
                        .iter()
                        .map(|column| arrow_to_parquet_value(column, self.current_row))
                        .collect::<Result<Vec<_>>>();
                    self.current_row += 1;
                    return Some(row);
                }
            }

            match self.batch_reader.next()? {
                Ok(batch) => {
                    self.current_batch = Some(batch);
                    self.current_row = 0;
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Decoded batches may carry field metadata the projected schema lacks, so
/// the first batch's schema wins when there is one.
fn assemble(schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<Table> {
    let schema = batches.first().map(RecordBatch::schema).unwrap_or(schema);
    Table::try_new(schema, batches)
}

/// Decode a whole file into a [`Table`]
///
/// `use_threads` picks between sequential and per-row-group parallel decode;
/// both produce identical tables.
pub fn decode<R>(reader: R, use_threads: bool, options: &OptionMap) -> Result<Table>
where
    R: ChunkReader + Clone + 'static,
{
    let options = ReadOptions::from_options(options)?;
    let reader = Reader::try_new(reader)?;
    if use_threads && reader.num_row_groups() > 1 {
        reader.read_table_parallel(&options)
    } else {
        reader.read_table(&options)
    }
}
