use crate::models::Invoice;
use sqlx::SqlitePool;

/// Column list shared by every SELECT so rows always map onto `Invoice`.
const INVOICE_COLUMNS: &str = "id, supplier_name, vat_number, invoice_number, date_of_sale, \
     due_date, duzp, amount_without_vat_21, vat_21, amount_without_vat_12, vat_12, \
     total_amount_with_vat, reliable_vat_payer, created_at, updated_at";

/// Insert a new record and return its assigned id.
///
/// `inv.id` is ignored; SQLite assigns the next id. A unique-constraint
/// violation on (invoice_number, vat_number) is returned as-is for the
/// caller to map to a conflict.
pub async fn insert_invoice(pool: &SqlitePool, inv: &Invoice) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO invoices (
            supplier_name, vat_number, invoice_number, date_of_sale, due_date, duzp,
            amount_without_vat_21, vat_21, amount_without_vat_12, vat_12,
            total_amount_with_vat, reliable_vat_payer, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&inv.supplier_name)
    .bind(&inv.vat_number)
    .bind(&inv.invoice_number)
    .bind(&inv.date_of_sale)
    .bind(&inv.due_date)
    .bind(&inv.duzp)
    .bind(inv.amount_without_vat_21)
    .bind(inv.vat_21)
    .bind(inv.amount_without_vat_12)
    .bind(inv.vat_12)
    .bind(inv.total_amount_with_vat)
    .bind(&inv.reliable_vat_payer)
    .bind(&inv.created_at)
    .bind(&inv.updated_at)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Fetch all records. Ordering is applied by the service layer because
/// `duzp` is DD.MM.YYYY text and does not sort chronologically in SQL.
pub async fn list_invoices(pool: &SqlitePool) -> Result<Vec<Invoice>, sqlx::Error> {
    sqlx::query_as::<_, Invoice>(&format!("SELECT {INVOICE_COLUMNS} FROM invoices"))
        .fetch_all(pool)
        .await
}

/// Look up by the natural dedup key (invoice_number, vat_number).
pub async fn find_by_natural_key(
    pool: &SqlitePool,
    invoice_number: &str,
    vat_number: &str,
) -> Result<Option<Invoice>, sqlx::Error> {
    sqlx::query_as::<_, Invoice>(&format!(
        "SELECT {INVOICE_COLUMNS} FROM invoices WHERE invoice_number = ? AND vat_number = ?"
    ))
    .bind(invoice_number)
    .bind(vat_number)
    .fetch_optional(pool)
    .await
}

/// Full overwrite of all mutable fields. Returns rows affected (0 when
/// the id does not exist).
pub async fn update_invoice(
    pool: &SqlitePool,
    id: i64,
    inv: &Invoice,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE invoices SET
            supplier_name = ?, vat_number = ?, invoice_number = ?, date_of_sale = ?,
            due_date = ?, duzp = ?, amount_without_vat_21 = ?, vat_21 = ?,
            amount_without_vat_12 = ?, vat_12 = ?, total_amount_with_vat = ?,
            reliable_vat_payer = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&inv.supplier_name)
    .bind(&inv.vat_number)
    .bind(&inv.invoice_number)
    .bind(&inv.date_of_sale)
    .bind(&inv.due_date)
    .bind(&inv.duzp)
    .bind(inv.amount_without_vat_21)
    .bind(inv.vat_21)
    .bind(inv.amount_without_vat_12)
    .bind(inv.vat_12)
    .bind(inv.total_amount_with_vat)
    .bind(&inv.reliable_vat_payer)
    .bind(&inv.updated_at)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete_invoice(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM invoices WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Remove every record. Idempotent.
pub async fn clear_invoices(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM invoices").execute(pool).await?;
    Ok(result.rows_affected())
}
