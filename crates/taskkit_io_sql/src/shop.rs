//! Demo shop store: clients, products, orders, and three report queries.

use std::path::Path;

use rusqlite::{Connection, params};

use crate::conf::{
    C_PREFIX_DEMO_ORDER, SCHEMA, TUP_DEMO_CLIENTS, TUP_DEMO_ORDERS, TUP_DEMO_PRODUCTS,
};
use crate::spec::{ShopDbError, SpecClientPurchaseSum, SpecOrderInput, SpecProductOrderCount};

////////////////////////////////////////////////////////////////////////////////
// #region Connection

/// Per-connection settings. Foreign keys are off by default in SQLite.
pub fn prepare_connection(conn: &Connection) -> Result<(), ShopDbError> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(())
}

/// Run `op` inside one transaction: commit on `Ok`, roll back on `Err`.
pub fn run_in_transaction<T, F>(conn: &mut Connection, op: F) -> Result<T, ShopDbError>
where
    F: FnOnce(&Connection) -> Result<T, ShopDbError>,
{
    let tx = conn.transaction()?;
    match op(&tx) {
        Ok(out) => {
            tx.commit()?;
            Ok(out)
        }
        Err(err) => {
            if let Err(err_rollback) = tx.rollback() {
                tracing::warn!(error = %err_rollback, "rollback failed");
            }
            tracing::warn!(error = %err, "transaction rolled back");
            Err(err)
        }
    }
}

/// Open the database at `path`, run `op` in a transaction, then close the handle.
pub fn with_connection<T, F>(path: &Path, op: F) -> Result<T, ShopDbError>
where
    F: FnOnce(&Connection) -> Result<T, ShopDbError>,
{
    let mut conn = Connection::open(path).map_err(|source| ShopDbError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    prepare_connection(&conn)?;

    let out = run_in_transaction(&mut conn, op)?;
    conn.close().map_err(|(_, err)| ShopDbError::Sql(err))?;
    Ok(out)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Fill

/// Create the shop tables if missing.
pub fn create_schema(conn: &Connection) -> Result<(), ShopDbError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Create tables if needed and insert the given rows.
pub fn fill_db(
    conn: &Connection,
    clients: &[&str],
    products: &[(&str, f64)],
    orders: &[SpecOrderInput],
) -> Result<(), ShopDbError> {
    create_schema(conn)?;

    let mut stmt = conn.prepare("INSERT INTO clients (client_name) VALUES (?1)")?;
    for c_name in clients {
        stmt.execute(params![c_name])?;
    }

    let mut stmt = conn.prepare("INSERT INTO products (product_name, price) VALUES (?1, ?2)")?;
    for (c_name, n_price) in products {
        stmt.execute(params![c_name, n_price])?;
    }

    let mut stmt = conn
        .prepare("INSERT INTO orders (client_id, product_id, order_name) VALUES (?1, ?2, ?3)")?;
    for order in orders {
        stmt.execute(params![order.client_id, order.product_id, order.order_name])?;
    }

    tracing::info!(
        n_clients = clients.len(),
        n_products = products.len(),
        n_orders = orders.len(),
        "shop rows inserted"
    );
    Ok(())
}

/// Insert the fixed demo data set.
pub fn seed_demo(conn: &Connection) -> Result<(), ShopDbError> {
    let l_orders: Vec<SpecOrderInput> = TUP_DEMO_ORDERS
        .iter()
        .enumerate()
        .map(|(i, (client_id, product_id))| {
            SpecOrderInput::new(*client_id, *product_id, format!("{C_PREFIX_DEMO_ORDER} {}", i + 1))
        })
        .collect();
    fill_db(conn, &TUP_DEMO_CLIENTS, &TUP_DEMO_PRODUCTS, &l_orders)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Queries

/// Purchase total per client name, ordered by name.
pub fn query_purchase_sums(conn: &Connection) -> Result<Vec<SpecClientPurchaseSum>, ShopDbError> {
    let mut stmt = conn.prepare(
        "SELECT clients.client_name, SUM(products.price)
         FROM orders
         LEFT JOIN products ON orders.product_id = products.product_id
         LEFT JOIN clients ON orders.client_id = clients.client_id
         GROUP BY clients.client_name
         ORDER BY clients.client_name",
    )?;
    let l_rows = stmt
        .query_map([], |row| {
            Ok(SpecClientPurchaseSum {
                client_name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                n_sum_price: row.get::<_, Option<f64>>(1)?.unwrap_or(0.0),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(l_rows)
}

/// Client names per order of `product_name`, in order placement sequence.
pub fn query_clients_who_bought(
    conn: &Connection,
    product_name: &str,
) -> Result<Vec<String>, ShopDbError> {
    let mut stmt = conn.prepare(
        "SELECT clients.client_name
         FROM orders
         LEFT JOIN products ON orders.product_id = products.product_id
         LEFT JOIN clients ON orders.client_id = clients.client_id
         WHERE products.product_name = ?1
         ORDER BY orders.order_id",
    )?;
    let l_rows = stmt
        .query_map(params![product_name], |row| {
            Ok(row.get::<_, Option<String>>(0)?.unwrap_or_default())
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(l_rows)
}

/// Order count per ordered product name, ordered by name.
pub fn query_order_counts_by_product(
    conn: &Connection,
) -> Result<Vec<SpecProductOrderCount>, ShopDbError> {
    let mut stmt = conn.prepare(
        "SELECT products.product_name, COUNT(products.product_name)
         FROM orders
         LEFT JOIN products ON orders.product_id = products.product_id
         GROUP BY products.product_name
         ORDER BY products.product_name",
    )?;
    let l_rows = stmt
        .query_map([], |row| {
            Ok(SpecProductOrderCount {
                product_name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                n_orders: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(l_rows)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
