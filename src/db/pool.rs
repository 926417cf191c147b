use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use std::str::FromStr;
use std::time::Duration;

/// Create the database connection pool
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let mut connect_options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // Log statements slower than 5 seconds
    connect_options =
        connect_options.log_slow_statements(tracing::log::LevelFilter::Warn, Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(connect_options)
        .await
}

/// Create the invoices table on startup if it does not exist.
///
/// AUTOINCREMENT keeps deleted ids from being reused. The UNIQUE
/// constraint on the natural key backs the dedup pre-check so two
/// concurrent creates cannot both slip through.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS invoices (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            supplier_name TEXT NOT NULL,
            vat_number TEXT NOT NULL DEFAULT '',
            invoice_number TEXT NOT NULL,
            date_of_sale TEXT,
            due_date TEXT,
            duzp TEXT NOT NULL,
            amount_without_vat_21 REAL NOT NULL DEFAULT 0,
            vat_21 REAL NOT NULL DEFAULT 0,
            amount_without_vat_12 REAL NOT NULL DEFAULT 0,
            vat_12 REAL NOT NULL DEFAULT 0,
            total_amount_with_vat REAL NOT NULL,
            reliable_vat_payer TEXT NOT NULL DEFAULT 'true',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (invoice_number, vat_number)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
