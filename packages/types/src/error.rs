//! Error types shared across the store and the aggregation engine.

use thiserror::Error;

/// Result type used throughout the workspace.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by ingestion and the KPI derivations.
///
/// Derivation failures are never retried internally: each derivation either
/// returns a complete result table or fails with one of these variants, and
/// the caller decides whether to abort the run or skip the metric.
#[derive(Error, Debug)]
pub enum Error {
    /// A required source table is absent from the store.
    #[error("missing input table '{table}'")]
    MissingInputTable { table: String },

    /// A table exists but lacks an expected column.
    #[error("table '{table}' is missing expected column '{column}'")]
    SchemaMismatch { table: String, column: String },

    /// A source extract could not be opened or read.
    #[error("failed to read source extract '{path}': {source}")]
    ExtractSource {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Query planning or execution failed inside DataFusion.
    #[error("query execution failed: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Columnar decoding or encoding failed.
    #[error("arrow error: {0}")]
    Arrow(#[from] datafusion::arrow::error::ArrowError),

    /// Converting between typed rows and record batches failed.
    #[error("row conversion failed: {0}")]
    Rows(#[from] serde_arrow::Error),
}

impl Error {
    pub fn missing_table(table: impl Into<String>) -> Self {
        Error::MissingInputTable {
            table: table.into(),
        }
    }

    pub fn schema_mismatch(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::SchemaMismatch {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn extract_source(path: impl Into<String>, source: std::io::Error) -> Self {
        Error::ExtractSource {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_table_names_the_table() {
        let err = Error::missing_table("orders");
        assert_eq!(err.to_string(), "missing input table 'orders'");
    }

    #[test]
    fn schema_mismatch_names_table_and_column() {
        let err = Error::schema_mismatch("order_payments", "payment_value");
        assert_eq!(
            err.to_string(),
            "table 'order_payments' is missing expected column 'payment_value'"
        );
    }
}
