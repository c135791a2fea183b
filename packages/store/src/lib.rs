//! Ingestion adapter: loads the flat source extracts into a single queryable
//! in-memory store backed by DataFusion, and hands out validated table handles
//! to the aggregation engine.

pub mod ingest;
pub mod session;

pub use ingest::{DEFAULT_CHUNK_SIZE, ingest_csv, ingest_csv_chunked};
pub use session::{ExtractStore, StoreConfig};
