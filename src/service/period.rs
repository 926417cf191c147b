use chrono::{Datelike, Local, NaiveDate};

/// Fiscal period: quarter 1-4 within a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub quarter: u32,
    pub year: i32,
}

impl Period {
    /// Period containing today, from the local clock.
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self {
            quarter: quarter_of_month(today.month()),
            year: today.year(),
        }
    }
}

fn quarter_of_month(month: u32) -> u32 {
    month.saturating_sub(1) / 3 + 1
}

/// Classify a DD.MM.YYYY tax-point date into its (quarter, year).
///
/// Structural parsing only: the string must split into exactly three
/// numeric day/month/year components. Calendar validity is not checked,
/// so "31.02.2024" classifies to Q1/2024 — callers relying on a real
/// calendar date must use [`parse_duzp`] instead.
pub fn classify(duzp: &str) -> Option<Period> {
    let mut parts = duzp.split('.');
    let _day: u32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let year: i32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    Some(Period {
        quarter: quarter_of_month(month),
        year,
    })
}

/// Strict calendar parse of a DD.MM.YYYY tax-point date. Used by the
/// date-range query and for chronological ordering.
pub fn parse_duzp(duzp: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(duzp.trim(), "%d.%m.%Y").ok()
}

/// Parse a range boundary. The UI sends ISO dates (HTML date input);
/// DD.MM.YYYY is tolerated for symmetry with duzp.
pub fn parse_range_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, "%d.%m.%Y"))
        .ok()
}
