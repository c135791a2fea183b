//! Catalog of the nine source extracts.
//!
//! The ingestion adapter and the KPI engine only agree on this contract:
//! a table with the given name exists in the store and carries at least the
//! required columns. Extra columns in an extract are ignored.

/// Name and required columns of one source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    pub required_columns: &'static [&'static str],
}

pub const ORDERS: TableSpec = TableSpec {
    name: "orders",
    required_columns: &["order_id", "customer_id", "order_status"],
};

pub const ORDER_ITEMS: TableSpec = TableSpec {
    name: "order_items",
    required_columns: &["order_id", "product_id"],
};

pub const ORDER_PAYMENTS: TableSpec = TableSpec {
    name: "order_payments",
    required_columns: &["order_id", "payment_value"],
};

pub const CUSTOMERS: TableSpec = TableSpec {
    name: "customers",
    required_columns: &["customer_id", "customer_unique_id", "customer_state"],
};

pub const PRODUCTS: TableSpec = TableSpec {
    name: "products",
    required_columns: &["product_id", "product_category_name"],
};

pub const CATEGORY_TRANSLATION: TableSpec = TableSpec {
    name: "product_category_translation",
    required_columns: &["product_category_name", "product_category_name_english"],
};

pub const ORDER_REVIEWS: TableSpec = TableSpec {
    name: "order_reviews",
    required_columns: &["review_id", "order_id", "review_score"],
};

pub const SELLERS: TableSpec = TableSpec {
    name: "sellers",
    required_columns: &["seller_id", "seller_state"],
};

pub const GEOLOCATION: TableSpec = TableSpec {
    name: "geolocation",
    required_columns: &["geolocation_zip_code_prefix", "geolocation_state"],
};

/// Every extract the ingestion adapter is expected to populate.
pub const SOURCE_TABLES: [&TableSpec; 9] = [
    &ORDERS,
    &ORDER_ITEMS,
    &ORDER_PAYMENTS,
    &CUSTOMERS,
    &PRODUCTS,
    &CATEGORY_TRANSLATION,
    &ORDER_REVIEWS,
    &SELLERS,
    &GEOLOCATION,
];

/// Order status vocabulary.
pub mod status {
    /// The only status contributing to payment and success aggregates.
    pub const DELIVERED: &str = "delivered";
    pub const CANCELED: &str = "canceled";
    pub const UNAVAILABLE: &str = "unavailable";
    pub const SHIPPED: &str = "shipped";
    pub const INVOICED: &str = "invoiced";
    pub const PROCESSING: &str = "processing";
    pub const CREATED: &str = "created";
    pub const APPROVED: &str = "approved";

    /// Statuses counted as failed orders.
    pub const FAILED: [&str; 2] = [UNAVAILABLE, CANCELED];
}
