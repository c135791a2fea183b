//! KPI aggregation engine over the marketplace extracts.
//!
//! Three independent derivations, each a pure function of fully materialized
//! input tables: total sales per region, customer lifetime value per region,
//! and per-category order-failure rate. Inputs arrive as DataFusion
//! `DataFrame` handles (supplied by the ingestion adapter or any other
//! collaborator); outputs are sorted, typed row vectors convertible to Arrow
//! record batches for downstream consumers.
//!
//! A derivation either returns a complete result table or fails with a
//! [`shopmetrics_types::Error`]; partial results are never produced.

pub mod batch;
pub mod customer_value;
pub mod failure_rate;
mod frames;
pub mod region_sales;

pub use batch::{rows_from_batches, rows_to_record_batch};
pub use customer_value::{
    CustomerLifetimeValue, RegionCustomerValue, ScaledRegionCustomerValue,
    customer_lifetime_value, customer_value_by_region, scale_for_comparison,
};
pub use failure_rate::{
    CategoryFailureRate, above_average, failed_rate_percent, failure_rate_by_category,
    mean_failed_rate,
};
pub use region_sales::{RegionSales, sales_by_region};
