use std::sync::Arc;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use datafusion::dataframe::DataFrame;
use datafusion::datasource::memory::MemTable;
use datafusion::prelude::{SessionConfig, SessionContext};
use shopmetrics_types::tables::TableSpec;
use shopmetrics_types::{Error, Result};

/// Session tuning for the in-memory store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Number of partitions for parallel query execution. 0 = auto (uses CPU count).
    pub target_partitions: usize,
    /// Number of rows processed per batch.
    pub batch_size: usize,
    /// Enable automatic repartitioning before joins.
    pub repartition_joins: bool,
    /// Enable automatic repartitioning before aggregations.
    pub repartition_aggregations: bool,
    /// Enable automatic repartitioning for parallel sorting.
    pub repartition_sorts: bool,
    /// Combine small batches into larger ones to reduce overhead.
    pub coalesce_batches: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            target_partitions: 0,
            batch_size: 8192,
            repartition_joins: true,
            repartition_aggregations: true,
            repartition_sorts: true,
            coalesce_batches: true,
        }
    }
}

/// A single store of named relational extracts.
///
/// Creating a new store replaces any prior one. Tables are immutable
/// in-memory snapshots; re-registering a name swaps the snapshot, so
/// population is idempotent.
#[derive(Clone)]
pub struct ExtractStore {
    ctx: Arc<SessionContext>,
}

impl ExtractStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        let target_partitions = if config.target_partitions == 0 {
            num_cpus::get()
        } else {
            config.target_partitions
        };

        let session_config = SessionConfig::new()
            .with_target_partitions(target_partitions)
            .with_batch_size(config.batch_size.max(1))
            .with_repartition_joins(config.repartition_joins)
            .with_repartition_aggregations(config.repartition_aggregations)
            .with_repartition_sorts(config.repartition_sorts)
            .with_coalesce_batches(config.coalesce_batches);

        ExtractStore {
            ctx: Arc::new(SessionContext::new_with_config(session_config)),
        }
    }

    /// The underlying session, for callers that need raw SQL access.
    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// Register `batches` under `name`, replacing any prior snapshot of the table.
    pub fn replace_table(
        &self,
        name: &str,
        schema: SchemaRef,
        batches: Vec<RecordBatch>,
    ) -> Result<()> {
        let table = MemTable::try_new(schema, vec![batches])?;
        self.ctx.deregister_table(name)?;
        self.ctx.register_table(name, Arc::new(table))?;
        Ok(())
    }

    /// Fetch a table handle by name.
    pub async fn table(&self, name: &str) -> Result<DataFrame> {
        if !self.ctx.table_exist(name)? {
            return Err(Error::missing_table(name));
        }
        Ok(self.ctx.table(name).await?)
    }

    /// Fetch a table and check it carries every column its contract requires.
    pub async fn validated_table(&self, spec: &TableSpec) -> Result<DataFrame> {
        let df = self.table(spec.name).await?;
        for column in spec.required_columns {
            if !df.schema().has_column_with_unqualified_name(column) {
                return Err(Error::schema_mismatch(spec.name, *column));
            }
        }
        Ok(df)
    }
}

impl Default for ExtractStore {
    fn default() -> Self {
        Self::new()
    }
}
