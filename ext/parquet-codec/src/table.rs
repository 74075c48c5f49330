//! Fully materialized in-memory table, the codec's native representation

use crate::arrow_conversion::{arrow_column_to_values, parquet_values_to_arrow_array};
use crate::{CodecError, ParquetValue, Result, Schema};
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use arrow_schema::SchemaRef;

/// An Arrow schema plus the record batches decoded for (or to be encoded
/// into) one file. Batch boundaries carry no meaning.
#[derive(Debug, Clone)]
pub struct Table {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl Table {
    /// Create a table, checking every batch has the table's fields
    pub fn try_new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<Self> {
        for (idx, batch) in batches.iter().enumerate() {
            if batch.schema().fields() != schema.fields() {
                return Err(CodecError::schema(format!(
                    "Batch {} does not match table schema",
                    idx
                )));
            }
        }
        Ok(Self { schema, batches })
    }

    /// Table with a schema and no rows
    pub fn empty(schema: SchemaRef) -> Self {
        Self {
            schema,
            batches: Vec::new(),
        }
    }

    pub fn from_batch(batch: RecordBatch) -> Self {
        Self {
            schema: batch.schema(),
            batches: vec![batch],
        }
    }

    /// Build a table from block columns
    pub fn from_columns(schema: &Schema, columns: Vec<Vec<ParquetValue>>) -> Result<Self> {
        let arrow_schema = schema.to_arrow()?;
        if columns.len() != arrow_schema.fields().len() {
            return Err(CodecError::schema(format!(
                "Provided {} columns but schema has {} fields",
                columns.len(),
                arrow_schema.fields().len()
            )));
        }

        let arrays = columns
            .into_iter()
            .zip(arrow_schema.fields())
            .map(|(values, field)| parquet_values_to_arrow_array(values, field))
            .collect::<Result<Vec<_>>>()?;

        let batch = RecordBatch::try_new(arrow_schema, arrays)?;
        Ok(Self::from_batch(batch))
    }

    /// Convert back into named block columns
    pub fn to_columns(&self) -> Result<Vec<(String, Vec<ParquetValue>)>> {
        let batch = self.to_record_batch()?;
        batch
            .columns()
            .iter()
            .zip(self.schema.fields())
            .map(|(column, field)| Ok((field.name().to_string(), arrow_column_to_values(column)?)))
            .collect()
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn into_batches(self) -> Vec<RecordBatch> {
        self.batches
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }

    /// Concatenate all batches into one
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        Ok(concat_batches(&self.schema, &self.batches)?)
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        if self.schema.fields() != other.schema.fields() || self.num_rows() != other.num_rows() {
            return false;
        }
        match (self.to_record_batch(), other.to_record_batch()) {
            (Ok(a), Ok(b)) => a.columns() == b.columns(),
            _ => false,
        }
    }
}
