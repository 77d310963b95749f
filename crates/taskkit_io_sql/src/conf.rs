//! Demo shop constants: schema, defaults and the seed data set.

/// Default database file for the demo shop.
pub const C_FILE_DB_DEFAULT: &str = "shop.db";
/// Product looked up by the default buyers query.
pub const C_PRODUCT_DEFAULT: &str = "Телефон";

/// Tables for the demo shop; orders cascade on client or product delete.
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS clients (
    client_id INTEGER PRIMARY KEY AUTOINCREMENT,
    client_name TEXT
);

CREATE TABLE IF NOT EXISTS products (
    product_id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_name TEXT,
    price REAL
);

CREATE TABLE IF NOT EXISTS orders (
    order_id INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id INTEGER,
    product_id INTEGER,
    order_name TEXT,
    CONSTRAINT fk_client FOREIGN KEY (client_id)
        REFERENCES clients (client_id) ON DELETE CASCADE,
    CONSTRAINT fk_product FOREIGN KEY (product_id)
        REFERENCES products (product_id) ON DELETE CASCADE
);
";

////////////////////////////////////////////////////////////////////////////////
// #region DemoData

/// Client names; ids are assigned 1..=4 in this order.
pub const TUP_DEMO_CLIENTS: [&str; 4] = ["Иван", "Константин", "Дмитрий", "Александр"];

/// `(product_name, price)`; ids are assigned 1..=6 in this order.
pub const TUP_DEMO_PRODUCTS: [(&str, f64); 6] = [
    ("Мяч", 299.99),
    ("Ручка", 18.0),
    ("Кружка", 159.87),
    ("Монитор", 18000.0),
    ("Телефон", 9999.9),
    ("Кофе", 159.0),
];

/// `(client_id, product_id)` per order; order names are `Закупка <n>`, 1-based.
pub const TUP_DEMO_ORDERS: [(i64, i64); 11] = [
    (2, 2),
    (2, 5),
    (2, 1),
    (1, 1),
    (1, 3),
    (1, 6),
    (1, 2),
    (4, 5),
    (3, 6),
    (3, 3),
    (1, 5),
];

/// Demo order name prefix.
pub const C_PREFIX_DEMO_ORDER: &str = "Закупка";

// #endregion
////////////////////////////////////////////////////////////////////////////////
