//! Customer lifetime value: how much a stable customer identity spends on
//! delivered orders, rolled up per region and as a global ranking.

use datafusion::functions::expr_fn::coalesce;
use datafusion::functions_aggregate::expr_fn::{avg, count, sum};
use datafusion::prelude::*;
use serde::{Deserialize, Serialize};
use shopmetrics_types::Result;
use tracing::debug;

use crate::batch::rows_from_batches;
use crate::frames;

/// Average customer lifetime value and distinct customer count for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionCustomerValue {
    pub customer_state: Option<String>,
    pub avg_customer_value: f64,
    pub customer_count: i64,
}

/// [`RegionCustomerValue`] min-max normalized to [0, 1] for side-by-side
/// comparison. Presentation logic only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledRegionCustomerValue {
    pub customer_state: Option<String>,
    pub avg_customer_value_scaled: f64,
    pub customer_count_scaled: f64,
}

/// One customer's lifetime spend across all their delivered orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerLifetimeValue {
    pub customer_unique_id: Option<String>,
    pub customer_lifetime_value: f64,
}

fn lifetime_value_sum() -> Expr {
    sum(coalesce(vec![col("payment_value"), lit(0.0_f64)])).alias("customer_lifetime_value")
}

/// Derive [`RegionCustomerValue`] from the orders, payments and customers
/// tables, sorted descending by average customer value.
///
/// Grouping happens in two stages: first per `(customer_state,
/// customer_unique_id)` to collapse installments and repeat orders into one
/// lifetime value per customer, then per state. Averaging payment rows
/// directly would weight customers by their installment count.
pub async fn customer_value_by_region(
    orders: DataFrame,
    payments: DataFrame,
    customers: DataFrame,
) -> Result<Vec<RegionCustomerValue>> {
    let joined = frames::delivered_orders_with_payments_and_customers(orders, payments, customers)?;

    let per_customer = joined.aggregate(
        vec![col("customer_state"), col("customer_unique_id")],
        vec![lifetime_value_sum()],
    )?;

    let per_state = per_customer
        .aggregate(
            vec![col("customer_state")],
            vec![
                avg(col("customer_lifetime_value")).alias("avg_customer_value"),
                count(col("customer_unique_id")).alias("customer_count"),
            ],
        )?
        .sort(vec![col("avg_customer_value").sort(false, false)])?;

    let batches = per_state.collect().await?;
    let rows: Vec<RegionCustomerValue> = rows_from_batches(&batches)?;
    debug!(regions = rows.len(), "derived customer value by region");
    Ok(rows)
}

/// Global per-customer lifetime value ranking, sorted descending.
pub async fn customer_lifetime_value(
    orders: DataFrame,
    payments: DataFrame,
    customers: DataFrame,
) -> Result<Vec<CustomerLifetimeValue>> {
    let joined = frames::delivered_orders_with_payments_and_customers(orders, payments, customers)?;

    let per_customer = joined
        .aggregate(vec![col("customer_unique_id")], vec![lifetime_value_sum()])?
        .sort(vec![col("customer_lifetime_value").sort(false, false)])?;

    let batches = per_customer.collect().await?;
    Ok(rows_from_batches(&batches)?)
}

/// Scale both metrics by their maximum over all states, yielding values in
/// [0, 1]. An all-zero column scales to zero rather than dividing by zero.
pub fn scale_for_comparison(rows: &[RegionCustomerValue]) -> Vec<ScaledRegionCustomerValue> {
    let max_value = rows
        .iter()
        .map(|r| r.avg_customer_value)
        .fold(0.0_f64, f64::max);
    let max_count = rows.iter().map(|r| r.customer_count).max().unwrap_or(0);

    rows.iter()
        .map(|r| ScaledRegionCustomerValue {
            customer_state: r.customer_state.clone(),
            avg_customer_value_scaled: if max_value > 0.0 {
                r.avg_customer_value / max_value
            } else {
                0.0
            },
            customer_count_scaled: if max_count > 0 {
                r.customer_count as f64 / max_count as f64
            } else {
                0.0
            },
        })
        .collect()
}
