use parquet_codec::{CodecError, ParquetValue, Result, Schema, Table};

/// In-memory columnar block exchanged with the processing framework
///
/// Every column holds one value per row, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    schema: Schema,
    columns: Vec<Vec<ParquetValue>>,
}

impl Block {
    pub fn new(schema: Schema, columns: Vec<Vec<ParquetValue>>) -> Result<Self> {
        let expected = schema.columns().len();
        if columns.len() != expected {
            return Err(CodecError::schema(format!(
                "Block has {} columns but schema has {} fields",
                columns.len(),
                expected
            )));
        }

        if let Some(first) = columns.first() {
            let num_rows = first.len();
            for (column, name) in columns.iter().zip(schema.column_names()) {
                if column.len() != num_rows {
                    return Err(CodecError::schema(format!(
                        "Column '{}' has {} values, expected {}",
                        name,
                        column.len(),
                        num_rows
                    )));
                }
            }
        }

        Ok(Self { schema, columns })
    }

    /// Build a block from row-major values
    pub fn from_rows(schema: Schema, rows: Vec<Vec<ParquetValue>>) -> Result<Self> {
        let num_cols = schema.columns().len();
        let mut columns: Vec<Vec<ParquetValue>> = vec![Vec::with_capacity(rows.len()); num_cols];

        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != num_cols {
                return Err(CodecError::schema(format!(
                    "Row {} has {} values but schema has {} fields",
                    idx,
                    row.len(),
                    num_cols
                )));
            }
            for (col_idx, value) in row.into_iter().enumerate() {
                columns[col_idx].push(value);
            }
        }

        Self::new(schema, columns)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[Vec<ParquetValue>] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[ParquetValue]> {
        self.schema
            .column_names()
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.columns[idx].as_slice())
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Row-major copy of the values
    pub fn rows(&self) -> Vec<Vec<ParquetValue>> {
        (0..self.num_rows())
            .map(|row| self.columns.iter().map(|c| c[row].clone()).collect())
            .collect()
    }

    /// Convert into the codec's table representation
    pub fn to_table(&self) -> Result<Table> {
        Table::from_columns(&self.schema, self.columns.clone())
    }

    pub fn from_table(table: &Table) -> Result<Self> {
        let schema = Schema::from_arrow(table.schema())?;
        let columns = table
            .to_columns()?
            .into_iter()
            .map(|(_, values)| values)
            .collect();
        Self::new(schema, columns)
    }
}

impl TryFrom<&Table> for Block {
    type Error = CodecError;

    fn try_from(table: &Table) -> Result<Self> {
        Block::from_table(table)
    }
}
