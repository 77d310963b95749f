//! `taskkit_io_sql` v1:
//! SQLite demo shop store for the taskkit tools.

mod conf;
mod shop;
mod spec;

pub use conf::{C_FILE_DB_DEFAULT, C_PRODUCT_DEFAULT, SCHEMA};
pub use shop::{
    create_schema, fill_db, prepare_connection, query_clients_who_bought,
    query_order_counts_by_product, query_purchase_sums, run_in_transaction, seed_demo,
    with_connection,
};
pub use spec::{ShopDbError, SpecClientPurchaseSum, SpecOrderInput, SpecProductOrderCount};
