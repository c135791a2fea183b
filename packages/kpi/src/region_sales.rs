//! Total sales per region: the sum of payment installments for delivered
//! orders, grouped by the customer's state.

use datafusion::functions::expr_fn::coalesce;
use datafusion::functions_aggregate::expr_fn::sum;
use datafusion::prelude::*;
use serde::{Deserialize, Serialize};
use shopmetrics_types::Result;
use tracing::debug;

use crate::batch::rows_from_batches;
use crate::frames;

/// One region's total delivered-payment value.
///
/// `customer_state` is `None` for the bucket of delivered orders whose
/// customer could not be resolved; that bucket is kept so totals reconcile
/// against the raw payment sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSales {
    pub customer_state: Option<String>,
    pub total_payment_value: f64,
}

/// Derive [`RegionSales`] from the orders, payments and customers tables,
/// sorted descending by total payment value.
pub async fn sales_by_region(
    orders: DataFrame,
    payments: DataFrame,
    customers: DataFrame,
) -> Result<Vec<RegionSales>> {
    let joined = frames::delivered_orders_with_payments_and_customers(orders, payments, customers)?;

    let result = joined
        .aggregate(
            vec![col("customer_state")],
            vec![
                sum(coalesce(vec![col("payment_value"), lit(0.0_f64)]))
                    .alias("total_payment_value"),
            ],
        )?
        .sort(vec![col("total_payment_value").sort(false, false)])?;

    let batches = result.collect().await?;
    let rows: Vec<RegionSales> = rows_from_batches(&batches)?;
    debug!(regions = rows.len(), "derived sales by region");
    Ok(rows)
}
