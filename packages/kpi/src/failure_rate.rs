//! Per-category order-failure rate: how often a product category's order
//! rows end up unavailable or canceled, relative to delivered rows.
//!
//! Counting happens at item-row granularity: an order with three items of
//! one category contributes three rows to that category's counts.

use datafusion::common::JoinType;
use datafusion::functions_aggregate::expr_fn::sum;
use datafusion::prelude::*;
use serde::{Deserialize, Serialize};
use shopmetrics_types::tables::{self, status};
use shopmetrics_types::Result;
use tracing::debug;

use crate::batch::rows_from_batches;
use crate::frames::ensure_columns;

/// Failure statistics for one product category.
///
/// `product_category_name_english` is `None` for order rows whose item,
/// product or translation lookup failed; that bucket is kept rather than
/// silently dropped. Categories no order ever referenced do not appear at
/// all, which distinguishes "no data" from "zero failure rate".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFailureRate {
    pub product_category_name_english: Option<String>,
    pub failed_count: i64,
    pub delivered_count: i64,
    pub failed_rate_percent: f64,
}

#[derive(Debug, Deserialize)]
struct CategoryCounts {
    product_category_name_english: Option<String>,
    failed_count: i64,
    delivered_count: i64,
}

/// Derive [`CategoryFailureRate`] from the orders, order items, products and
/// category translation tables, sorted descending by failure rate.
pub async fn failure_rate_by_category(
    orders: DataFrame,
    order_items: DataFrame,
    products: DataFrame,
    translations: DataFrame,
) -> Result<Vec<CategoryFailureRate>> {
    ensure_columns(&orders, tables::ORDERS.name, &["order_id", "order_status"])?;
    ensure_columns(
        &order_items,
        tables::ORDER_ITEMS.name,
        tables::ORDER_ITEMS.required_columns,
    )?;
    ensure_columns(
        &products,
        tables::PRODUCTS.name,
        tables::PRODUCTS.required_columns,
    )?;
    ensure_columns(
        &translations,
        tables::CATEGORY_TRANSLATION.name,
        tables::CATEGORY_TRANSLATION.required_columns,
    )?;

    // The chain starts from orders, not items, so orders with zero items
    // stay represented (they land in the null category bucket).
    let orders = orders
        .select_columns(&["order_id", "order_status"])?
        .alias("o")?;
    let items = order_items
        .select_columns(&["order_id", "product_id"])?
        .alias("i")?;
    let products = products
        .select_columns(&["product_id", "product_category_name"])?
        .alias("p")?;
    let translations = translations
        .select_columns(&["product_category_name", "product_category_name_english"])?
        .alias("t")?;

    let failed_statuses: Vec<Expr> = status::FAILED.iter().map(|s| lit(*s)).collect();

    let classified = orders
        .join(items, JoinType::Left, &["order_id"], &["order_id"], None)?
        .join(
            products,
            JoinType::Left,
            &["product_id"],
            &["product_id"],
            None,
        )?
        .join(
            translations,
            JoinType::Left,
            &["product_category_name"],
            &["product_category_name"],
            None,
        )?
        .select(vec![
            col("product_category_name_english"),
            when(
                col("order_status").in_list(failed_statuses, false),
                lit(1_i64),
            )
            .otherwise(lit(0_i64))?
            .alias("is_failed"),
            when(col("order_status").eq(lit(status::DELIVERED)), lit(1_i64))
                .otherwise(lit(0_i64))?
                .alias("is_delivered"),
        ])?;

    let grouped = classified.aggregate(
        vec![col("product_category_name_english")],
        vec![
            sum(col("is_failed")).alias("failed_count"),
            sum(col("is_delivered")).alias("delivered_count"),
        ],
    )?;

    let counts: Vec<CategoryCounts> = rows_from_batches(&grouped.collect().await?)?;

    let mut rows: Vec<CategoryFailureRate> = counts
        .into_iter()
        .map(|c| {
            let rate = failed_rate_percent(c.failed_count, c.delivered_count);
            CategoryFailureRate {
                product_category_name_english: c.product_category_name_english,
                failed_count: c.failed_count,
                delivered_count: c.delivered_count,
                failed_rate_percent: rate,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.failed_rate_percent.total_cmp(&a.failed_rate_percent));

    debug!(categories = rows.len(), "derived failure rate by category");
    Ok(rows)
}

/// Zero-denominator policy, checked in priority order: no deliveries and no
/// failures is a 0% rate, failures with no deliveries saturate at 100%, and
/// only then is the plain ratio taken. The rate is always defined.
pub fn failed_rate_percent(failed_count: i64, delivered_count: i64) -> f64 {
    if delivered_count == 0 && failed_count == 0 {
        0.0
    } else if delivered_count == 0 {
        100.0
    } else {
        100.0 * failed_count as f64 / delivered_count as f64
    }
}

/// Unweighted mean of the per-category failure rates; 0 for an empty table.
pub fn mean_failed_rate(rows: &[CategoryFailureRate]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(|r| r.failed_rate_percent).sum::<f64>() / rows.len() as f64
}

/// Categories whose failure rate strictly exceeds the unweighted mean.
pub fn above_average(rows: &[CategoryFailureRate]) -> Vec<&CategoryFailureRate> {
    let mean = mean_failed_rate(rows);
    rows.iter()
        .filter(|r| r.failed_rate_percent > mean)
        .collect()
}
