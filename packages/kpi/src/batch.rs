//! Conversion between typed result rows and Arrow record batches.

use datafusion::arrow::datatypes::FieldRef;
use datafusion::arrow::record_batch::RecordBatch;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_arrow::schema::{SchemaLike, TracingOptions};
use shopmetrics_types::Result;

/// Convert result rows into a record batch, for consumers that want a
/// columnar handle instead of typed rows.
pub fn rows_to_record_batch<T>(rows: &[T]) -> Result<RecordBatch>
where
    T: Serialize + DeserializeOwned,
{
    let fields =
        Vec::<FieldRef>::from_type::<T>(TracingOptions::default().allow_null_fields(true))?;
    Ok(serde_arrow::to_record_batch(&fields, &rows)?)
}

/// Deserialize collected batches into typed rows, preserving row order.
pub fn rows_from_batches<T>(batches: &[RecordBatch]) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    let mut rows = Vec::new();
    for batch in batches {
        if batch.num_rows() == 0 {
            continue;
        }
        let mut decoded: Vec<T> = serde_arrow::from_record_batch(batch)?;
        rows.append(&mut decoded);
    }
    Ok(rows)
}
