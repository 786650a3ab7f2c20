use std::fmt;

use crate::error::{StoreError, StoreResult};
use crate::object::BlobKey;

/// Aggregate functions supported by [`AggregateQuery`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Aggregate {
    /// Arithmetic mean of the column, each value cast to `f64`.
    Avg,
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Avg => write!(f, "AVG"),
        }
    }
}

/// A single-column aggregate over a headered CSV blob.
///
/// This is the whole query surface of the store: one function, one column,
/// one blob, one scalar out. The first CSV record is the header and selects
/// the column by name. Records are `\n` delimited (`\r\n` is tolerated) and
/// fields are `,` delimited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregateQuery {
    pub column: String,
    pub function: Aggregate,
}

impl AggregateQuery {
    pub fn avg(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            function: Aggregate::Avg,
        }
    }

    /// Evaluate the query over the raw bytes of `key`.
    ///
    /// Returns `Ok(None)` when there are no data rows, matching SQL where an
    /// aggregate over zero rows is NULL.
    pub fn evaluate(&self, key: &BlobKey, data: &[u8]) -> StoreResult<Option<f64>> {
        let query_error = |reason: String| StoreError::Query {
            key: key.clone(),
            reason,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(b',')
            .trim(csv::Trim::All)
            .from_reader(data);

        let headers = reader
            .headers()
            .map_err(|e| query_error(format!("unreadable header: {e}")))?;
        let index = headers
            .iter()
            .position(|name| name == self.column)
            .ok_or_else(|| query_error(format!("no column named '{}'", self.column)))?;

        let mut sum = 0.0;
        let mut count = 0u64;
        for (row, record) in reader.records().enumerate() {
            // +2: 1-indexed, plus the header line.
            let line = row + 2;
            let record = record.map_err(|e| query_error(format!("line {line}: {e}")))?;
            let raw = record
                .get(index)
                .ok_or_else(|| query_error(format!("line {line}: missing '{}'", self.column)))?;
            let value = raw
                .parse::<f64>()
                .map_err(|_| query_error(format!("line {line}: cannot cast '{raw}' to float")))?;
            sum += value;
            count += 1;
        }

        tracing::debug!(%key, function = %self.function, column = %self.column, rows = count, "aggregate evaluated");

        match self.function {
            Aggregate::Avg => Ok((count > 0).then(|| sum / count as f64)),
        }
    }
}

impl fmt::Display for AggregateQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {}(CAST({} AS FLOAT))", self.function, self.column)
    }
}
