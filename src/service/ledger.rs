use std::cmp::Ordering;
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::db::queries;
use crate::errors::ApiError;
use crate::models::{Invoice, InvoiceDraft};
use crate::service::period::{self, Period};

/// Store lifecycle. `close` walks Open -> Closing -> Closed and is
/// idempotent; operations are only served while Open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreState {
    Open,
    Closing,
    Closed,
}

/// Invoice ledger store: owns all persisted invoice state.
///
/// Create runs required-field validation, lenient numeric coercion and
/// the natural-key dedup check before touching the table, so a rejected
/// request never leaves partial state. The UNIQUE constraint on
/// (invoice_number, vat_number) backs the pre-check for the race where
/// two creates with the same key arrive at once.
pub struct LedgerService {
    pool: SqlitePool,
    state: Mutex<StoreState>,
}

impl LedgerService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            state: Mutex::new(StoreState::Open),
        }
    }

    fn ensure_open(&self) -> Result<(), ApiError> {
        match *self.state.lock().expect("state lock poisoned") {
            StoreState::Open => Ok(()),
            StoreState::Closing => Err(ApiError::StoreClosed("closing")),
            StoreState::Closed => Err(ApiError::StoreClosed("closed")),
        }
    }

    /// Close the store and its pool. Safe to call more than once.
    pub async fn close(&self) {
        {
            let mut state = self.state.lock().expect("state lock poisoned");
            if *state != StoreState::Open {
                return;
            }
            *state = StoreState::Closing;
        }

        self.pool.close().await;

        *self.state.lock().expect("state lock poisoned") = StoreState::Closed;
        info!("ledger store closed");
    }

    /// Validate, coerce and persist a new invoice. Returns the stored
    /// record with its assigned id and timestamps.
    pub async fn create(&self, draft: InvoiceDraft) -> Result<Invoice, ApiError> {
        self.ensure_open()?;

        let supplier_name = required_text(draft.supplier_name.as_deref(), "supplier_name")?;
        let invoice_number = required_text(draft.invoice_number.as_deref(), "invoice_number")?;
        let duzp = required_text(draft.duzp.as_deref(), "duzp")?;
        let total_amount_with_vat = draft.total_amount_with_vat.ok_or_else(|| {
            ApiError::Validation("total_amount_with_VAT is required and must be numeric".into())
        })?;

        // Absent VAT number compares as empty string for the dedup key.
        let vat_number = draft.vat_number.unwrap_or_default();

        if let Some(existing) =
            queries::find_by_natural_key(&self.pool, &invoice_number, &vat_number).await?
        {
            return Err(ApiError::Conflict(format!(
                "invoice {} already exists (id {})",
                invoice_number, existing.id
            )));
        }

        let now = Utc::now().to_rfc3339();
        let record = Invoice {
            id: 0,
            supplier_name,
            vat_number,
            invoice_number,
            date_of_sale: draft.date_of_sale,
            due_date: draft.due_date,
            duzp,
            amount_without_vat_21: draft.amount_without_vat_21.unwrap_or(0.0),
            vat_21: draft.vat_21.unwrap_or(0.0),
            amount_without_vat_12: draft.amount_without_vat_12.unwrap_or(0.0),
            vat_12: draft.vat_12.unwrap_or(0.0),
            total_amount_with_vat,
            reliable_vat_payer: draft
                .reliable_vat_payer
                .unwrap_or_else(|| "true".to_string()),
            created_at: now.clone(),
            updated_at: now,
        };

        let id = match queries::insert_invoice(&self.pool, &record).await {
            Ok(id) => id,
            // The pre-check lost a race: the unique constraint caught it.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(ApiError::Conflict(format!(
                    "invoice {} already exists",
                    record.invoice_number
                )));
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            "created invoice {} (id {}, supplier {})",
            record.invoice_number, id, record.supplier_name
        );

        Ok(Invoice { id, ..record })
    }

    /// All records, newest tax-point first, newest id first within a date.
    pub async fn get_all(&self) -> Result<Vec<Invoice>, ApiError> {
        self.ensure_open()?;
        let rows = queries::list_invoices(&self.pool).await?;
        Ok(sort_newest_first(rows))
    }

    pub async fn find_by_key(
        &self,
        invoice_number: &str,
        vat_number: Option<&str>,
    ) -> Result<Option<Invoice>, ApiError> {
        self.ensure_open()?;
        let vat_number = vat_number.unwrap_or("");
        Ok(queries::find_by_natural_key(&self.pool, invoice_number, vat_number).await?)
    }

    /// Records whose duzp classifies into the given quarter and year.
    pub async fn get_by_quarter(&self, quarter: u32, year: i32) -> Result<Vec<Invoice>, ApiError> {
        let target = Period { quarter, year };
        let mut rows = self.get_all().await?;
        rows.retain(|inv| period::classify(&inv.duzp) == Some(target));
        Ok(rows)
    }

    /// Records whose duzp classifies into any quarter of the given year.
    /// Feeds the year-to-date VAT sum.
    pub async fn get_by_year(&self, year: i32) -> Result<Vec<Invoice>, ApiError> {
        let mut rows = self.get_all().await?;
        rows.retain(|inv| {
            period::classify(&inv.duzp)
                .map(|p| p.year == year)
                .unwrap_or(false)
        });
        Ok(rows)
    }

    /// Records whose duzp falls within [start, end], both inclusive.
    /// Rows with unparseable duzp are excluded, not errored.
    pub async fn get_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Invoice>, ApiError> {
        let mut rows = self.get_all().await?;
        rows.retain(|inv| {
            period::parse_duzp(&inv.duzp)
                .map(|d| d >= start && d <= end)
                .unwrap_or(false)
        });
        Ok(rows)
    }

    /// Full overwrite of all mutable fields. Does not re-run the dedup
    /// check: an update may legitimately collide with its own pre-update
    /// state. Refreshes updated_at only.
    pub async fn update(&self, id: i64, draft: InvoiceDraft) -> Result<(), ApiError> {
        self.ensure_open()?;

        let supplier_name = required_text(draft.supplier_name.as_deref(), "supplier_name")?;
        let invoice_number = required_text(draft.invoice_number.as_deref(), "invoice_number")?;
        let duzp = required_text(draft.duzp.as_deref(), "duzp")?;
        let total_amount_with_vat = draft.total_amount_with_vat.ok_or_else(|| {
            ApiError::Validation("total_amount_with_VAT is required and must be numeric".into())
        })?;

        let record = Invoice {
            id,
            supplier_name,
            vat_number: draft.vat_number.unwrap_or_default(),
            invoice_number,
            date_of_sale: draft.date_of_sale,
            due_date: draft.due_date,
            duzp,
            amount_without_vat_21: draft.amount_without_vat_21.unwrap_or(0.0),
            vat_21: draft.vat_21.unwrap_or(0.0),
            amount_without_vat_12: draft.amount_without_vat_12.unwrap_or(0.0),
            vat_12: draft.vat_12.unwrap_or(0.0),
            total_amount_with_vat,
            reliable_vat_payer: draft
                .reliable_vat_payer
                .unwrap_or_else(|| "true".to_string()),
            created_at: String::new(), // not written by the UPDATE
            updated_at: Utc::now().to_rfc3339(),
        };

        let affected = match queries::update_invoice(&self.pool, id, &record).await {
            Ok(affected) => affected,
            // Moving a row onto another row's natural key trips the same
            // constraint that guards create.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(ApiError::Conflict(format!(
                    "invoice {} already exists",
                    record.invoice_number
                )));
            }
            Err(e) => return Err(e.into()),
        };
        if affected == 0 {
            return Err(ApiError::NotFound(format!("invoice {} not found", id)));
        }

        info!("updated invoice id {}", id);
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.ensure_open()?;
        let affected = queries::delete_invoice(&self.pool, id).await?;
        if affected == 0 {
            return Err(ApiError::NotFound(format!("invoice {} not found", id)));
        }
        info!("deleted invoice id {}", id);
        Ok(())
    }

    /// Remove every record. Idempotent.
    pub async fn clear(&self) -> Result<(), ApiError> {
        self.ensure_open()?;
        let affected = queries::clear_invoices(&self.pool).await?;
        info!("cleared ledger ({} records removed)", affected);
        Ok(())
    }
}

fn required_text(value: Option<&str>, field: &str) -> Result<String, ApiError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ApiError::Validation(format!("{} is required", field))),
    }
}

/// Order by duzp descending (calendar order), ties by id descending.
/// Rows with unparseable duzp sort last but stay visible.
fn sort_newest_first(mut rows: Vec<Invoice>) -> Vec<Invoice> {
    rows.sort_by(|a, b| {
        match (period::parse_duzp(&a.duzp), period::parse_duzp(&b.duzp)) {
            (Some(da), Some(db)) => db.cmp(&da).then(b.id.cmp(&a.id)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => b.id.cmp(&a.id),
        }
    });
    rows
}
