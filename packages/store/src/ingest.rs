use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::sync::Arc;

use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use shopmetrics_types::tables::TableSpec;
use shopmetrics_types::{Error, Result};
use tracing::info;

use crate::session::ExtractStore;

/// Rows decoded per record batch while reading an extract.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Records scanned up front to infer an extract's column types.
const INFER_MAX_RECORDS: usize = 1_000;

/// Load one CSV extract into the store, replacing any prior snapshot of the
/// table. Returns the number of rows ingested.
pub fn ingest_csv(store: &ExtractStore, spec: &TableSpec, path: &Path) -> Result<usize> {
    ingest_csv_chunked(store, spec, path, DEFAULT_CHUNK_SIZE)
}

/// Like [`ingest_csv`], with an explicit chunk size. The extract is decoded
/// in chunks of `chunk_size` rows so large files never need a single
/// contiguous allocation.
pub fn ingest_csv_chunked(
    store: &ExtractStore,
    spec: &TableSpec,
    path: &Path,
    chunk_size: usize,
) -> Result<usize> {
    let path_display = path.display().to_string();
    let mut file = File::open(path).map_err(|e| Error::extract_source(path_display.clone(), e))?;

    let format = Format::default().with_header(true);
    let (schema, _) = format.infer_schema(&mut file, Some(INFER_MAX_RECORDS))?;
    file.rewind()
        .map_err(|e| Error::extract_source(path_display.clone(), e))?;

    let schema = Arc::new(schema);
    for column in spec.required_columns {
        if schema.field_with_name(column).is_err() {
            return Err(Error::schema_mismatch(spec.name, *column));
        }
    }

    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .with_batch_size(chunk_size.max(1))
        .build(file)?;

    let mut batches = Vec::new();
    let mut rows = 0usize;
    for batch in reader {
        let batch = batch?;
        rows += batch.num_rows();
        batches.push(batch);
    }

    store.replace_table(spec.name, schema, batches)?;
    info!(table = spec.name, rows, path = %path_display, "ingested extract");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopmetrics_types::tables;
    use std::io::Write;

    fn write_extract(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    const ORDERS_CSV: &str = "order_id,customer_id,order_status\n\
        1,c1,delivered\n\
        2,c2,canceled\n\
        3,c3,shipped\n\
        4,c4,delivered\n\
        5,c5,delivered\n";

    #[tokio::test]
    async fn ingests_an_extract_and_reports_row_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_extract(&dir, "orders.csv", ORDERS_CSV);

        let store = ExtractStore::new();
        let rows = ingest_csv(&store, &tables::ORDERS, &path).unwrap();
        assert_eq!(rows, 5);

        let df = store.validated_table(&tables::ORDERS).await.unwrap();
        assert_eq!(df.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn chunked_reads_preserve_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_extract(&dir, "orders.csv", ORDERS_CSV);

        let store = ExtractStore::new();
        let rows = ingest_csv_chunked(&store, &tables::ORDERS, &path, 2).unwrap();
        assert_eq!(rows, 5);
        let df = store.table("orders").await.unwrap();
        assert_eq!(df.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn reingesting_replaces_instead_of_appending() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_extract(&dir, "orders.csv", ORDERS_CSV);

        let store = ExtractStore::new();
        ingest_csv(&store, &tables::ORDERS, &path).unwrap();
        ingest_csv(&store, &tables::ORDERS, &path).unwrap();

        let df = store.table("orders").await.unwrap();
        assert_eq!(df.count().await.unwrap(), 5);
    }

    #[test]
    fn missing_extract_file_is_surfaced_with_its_path() {
        let store = ExtractStore::new();
        let err = ingest_csv(&store, &tables::ORDERS, Path::new("/nonexistent/orders.csv"))
            .unwrap_err();
        assert!(matches!(err, Error::ExtractSource { path, .. } if path.contains("orders.csv")));
    }

    #[test]
    fn extract_missing_a_contract_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_extract(&dir, "orders.csv", "order_id,order_status\n1,delivered\n");

        let store = ExtractStore::new();
        let err = ingest_csv(&store, &tables::ORDERS, &path).unwrap_err();
        assert!(matches!(
            err,
            Error::SchemaMismatch { table, column } if table == "orders" && column == "customer_id"
        ));
    }
}
