//! Shared join pipelines over the source extracts.

use datafusion::common::JoinType;
use datafusion::prelude::*;
use shopmetrics_types::tables::{self, status};
use shopmetrics_types::{Error, Result};

/// Check that `df` carries every column its contract requires, surfacing the
/// logical table name on mismatch instead of a raw planner error.
pub(crate) fn ensure_columns(df: &DataFrame, table: &str, columns: &[&str]) -> Result<()> {
    for column in columns {
        if !df.schema().has_column_with_unqualified_name(column) {
            return Err(Error::schema_mismatch(table, *column));
        }
    }
    Ok(())
}

/// Delivered orders left-joined to their payment installments and customers.
///
/// Left joins keep delivered orders with zero payment rows (null
/// `payment_value`, summed as 0) and orders whose customer resolution failed
/// (null `customer_state`, kept as its own bucket). Both region derivations
/// aggregate over this same frame.
pub(crate) fn delivered_orders_with_payments_and_customers(
    orders: DataFrame,
    payments: DataFrame,
    customers: DataFrame,
) -> Result<DataFrame> {
    ensure_columns(&orders, tables::ORDERS.name, tables::ORDERS.required_columns)?;
    ensure_columns(
        &payments,
        tables::ORDER_PAYMENTS.name,
        tables::ORDER_PAYMENTS.required_columns,
    )?;
    ensure_columns(
        &customers,
        tables::CUSTOMERS.name,
        tables::CUSTOMERS.required_columns,
    )?;

    // Aliases keep the join keys unambiguous regardless of how the caller
    // produced the frames.
    let delivered = orders
        .select_columns(&["order_id", "customer_id", "order_status"])?
        .filter(col("order_status").eq(lit(status::DELIVERED)))?
        .alias("o")?;
    let payments = payments
        .select_columns(&["order_id", "payment_value"])?
        .alias("p")?;
    let customers = customers
        .select_columns(&["customer_id", "customer_unique_id", "customer_state"])?
        .alias("c")?;

    let joined = delivered
        .join(payments, JoinType::Left, &["order_id"], &["order_id"], None)?
        .join(
            customers,
            JoinType::Left,
            &["customer_id"],
            &["customer_id"],
            None,
        )?;
    Ok(joined)
}
