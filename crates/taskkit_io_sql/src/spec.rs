//! Demo shop row types and errors.

use std::path::PathBuf;

use thiserror::Error;

/// Total spent by one client.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecClientPurchaseSum {
    /// Client name.
    pub client_name: String,
    /// Sum of ordered product prices.
    pub n_sum_price: f64,
}

/// Number of orders placed for one product name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecProductOrderCount {
    /// Product name.
    pub product_name: String,
    /// Orders referencing the product.
    pub n_orders: i64,
}

/// One order to insert: `(client_id, product_id, order_name)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecOrderInput {
    /// Existing `clients.client_id`.
    pub client_id: i64,
    /// Existing `products.product_id`.
    pub product_id: i64,
    /// Free-form order label.
    pub order_name: String,
}

impl SpecOrderInput {
    /// Build one order row.
    pub fn new(client_id: i64, product_id: i64, order_name: impl Into<String>) -> Self {
        Self {
            client_id,
            product_id,
            order_name: order_name.into(),
        }
    }
}

/// Demo shop store failures.
#[derive(Debug, Error)]
pub enum ShopDbError {
    /// Database file could not be opened or created.
    #[error("Failed to open database {}: {source}", path.display())]
    Open {
        /// Database path.
        path: PathBuf,
        /// SQLite error.
        #[source]
        source: rusqlite::Error,
    },
    /// Statement, constraint or transaction failure.
    #[error(transparent)]
    Sql(#[from] rusqlite::Error),
}

impl ShopDbError {
    /// Short failure category for log lines.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Open { .. } => "io",
            Self::Sql(_) => "sql",
        }
    }
}
