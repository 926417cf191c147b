use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::models::{Invoice, SupplierQuarterRow, SupplierRangeRow};

/// Placeholder shown when a supplier has no VAT number.
const NO_VAT: &str = "N/A";

/// Quarter view: group by (supplier_name, vat_number).
///
/// `status` carries the reliability flag of the last record seen in the
/// group — last write wins, with no conflict resolution when a
/// supplier's invoices disagree. That matches the historical behavior
/// the reports were built on.
pub fn aggregate_quarter(rows: &[Invoice]) -> Vec<SupplierQuarterRow> {
    let mut groups: IndexMap<(String, String), SupplierQuarterRow> = IndexMap::new();

    for inv in rows {
        let vat = if inv.vat_number.trim().is_empty() {
            NO_VAT.to_string()
        } else {
            inv.vat_number.clone()
        };

        let entry = groups
            .entry((inv.supplier_name.clone(), vat.clone()))
            .or_insert_with(|| SupplierQuarterRow {
                supplier_name: inv.supplier_name.clone(),
                vat_number: vat,
                total_amount: 0.0,
                total_vat: 0.0,
                invoice_count: 0,
                status: inv.reliable_vat_payer.clone(),
            });

        entry.total_amount += inv.total_amount_with_vat;
        entry.total_vat += inv.vat_21 + inv.vat_12;
        entry.invoice_count += 1;
        entry.status = inv.reliable_vat_payer.clone();
    }

    sort_by_total(groups.into_values().collect(), |r: &SupplierQuarterRow| {
        r.total_amount
    })
}

/// Date-range view: canonicalize by vat_number alone so multiple name
/// spellings of one registered supplier coalesce. Blank or literal "NA"
/// counts as unregistered; those groups stay keyed by supplier_name so
/// distinct unregistered suppliers are not merged.
pub fn aggregate_range(rows: &[Invoice]) -> Vec<SupplierRangeRow> {
    let mut groups: IndexMap<String, SupplierRangeRow> = IndexMap::new();

    for inv in rows {
        let vat = inv.vat_number.trim();
        let registered = !vat.is_empty() && vat != "NA";
        let key = if registered {
            format!("vat:{vat}")
        } else {
            format!("name:{}", inv.supplier_name)
        };

        let entry = groups.entry(key).or_insert_with(|| SupplierRangeRow {
            supplier_name: inv.supplier_name.clone(),
            vat_number: if registered {
                vat.to_string()
            } else {
                NO_VAT.to_string()
            },
            total_amount: 0.0,
            invoice_count: 0,
        });

        entry.total_amount += inv.total_amount_with_vat;
        entry.invoice_count += 1;
    }

    sort_by_total(groups.into_values().collect(), |r: &SupplierRangeRow| {
        r.total_amount
    })
}

/// Descending by total; the sort is stable so equal totals keep
/// first-seen order from the grouping map.
fn sort_by_total<T>(mut rows: Vec<T>, total: impl Fn(&T) -> f64) -> Vec<T> {
    rows.sort_by(|a, b| {
        total(b)
            .partial_cmp(&total(a))
            .unwrap_or(Ordering::Equal)
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(supplier: &str, vat: &str, total: f64, vat_21: f64, reliable: &str) -> Invoice {
        Invoice {
            id: 0,
            supplier_name: supplier.into(),
            vat_number: vat.into(),
            invoice_number: "N".into(),
            date_of_sale: None,
            due_date: None,
            duzp: "15.02.2024".into(),
            amount_without_vat_21: 0.0,
            vat_21,
            amount_without_vat_12: 0.0,
            vat_12: 0.0,
            total_amount_with_vat: total,
            reliable_vat_payer: reliable.into(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn quarter_groups_accumulate_and_last_status_wins() {
        let rows = vec![
            invoice("Alza.cz", "CZ27082440", 100.0, 21.0, "true"),
            invoice("Alza.cz", "CZ27082440", 250.0, 30.0, "false"),
        ];

        let result = aggregate_quarter(&rows);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].total_amount, 350.0);
        assert_eq!(result[0].total_vat, 51.0);
        assert_eq!(result[0].invoice_count, 2);
        // the second invoice's flag decides, even though the first said "true"
        assert_eq!(result[0].status, "false");
    }

    #[test]
    fn quarter_disambiguates_by_name_and_vat() {
        let rows = vec![
            invoice("Alza.cz", "CZ27082440", 100.0, 0.0, "true"),
            invoice("Alza.cz a.s.", "CZ27082440", 50.0, 0.0, "true"),
        ];

        // Same VAT id but different name spellings: the quarter view keeps
        // them apart on purpose.
        let result = aggregate_quarter(&rows);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn quarter_uses_placeholder_for_missing_vat() {
        let rows = vec![invoice("Drobný dodavatel", "", 10.0, 0.0, "NA")];
        let result = aggregate_quarter(&rows);
        assert_eq!(result[0].vat_number, "N/A");
    }

    #[test]
    fn range_coalesces_name_variants_by_vat() {
        let rows = vec![
            invoice("Alza.cz", "CZ27082440", 100.0, 0.0, "true"),
            invoice("Alza.cz a.s.", "CZ27082440", 50.0, 0.0, "true"),
        ];

        let result = aggregate_range(&rows);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].vat_number, "CZ27082440");
        assert_eq!(result[0].total_amount, 150.0);
        assert_eq!(result[0].invoice_count, 2);
    }

    #[test]
    fn range_keeps_unregistered_suppliers_apart() {
        let rows = vec![
            invoice("Penzion U Lípy", "", 100.0, 0.0, "true"),
            invoice("Kavárna Mezi Domy", "NA", 60.0, 0.0, "true"),
            invoice("Kavárna Mezi Domy", "", 40.0, 0.0, "true"),
        ];

        let result = aggregate_range(&rows);
        assert_eq!(result.len(), 2);

        let kavarna = result
            .iter()
            .find(|r| r.supplier_name == "Kavárna Mezi Domy")
            .unwrap();
        assert_eq!(kavarna.total_amount, 100.0);
        assert_eq!(kavarna.vat_number, "N/A");
    }

    #[test]
    fn results_sort_descending_by_total() {
        let rows = vec![
            invoice("Small", "CZ1", 10.0, 0.0, "true"),
            invoice("Big", "CZ2", 500.0, 0.0, "true"),
            invoice("Mid", "CZ3", 100.0, 0.0, "true"),
        ];

        let quarter: Vec<String> = aggregate_quarter(&rows)
            .into_iter()
            .map(|r| r.supplier_name)
            .collect();
        assert_eq!(quarter, vec!["Big", "Mid", "Small"]);

        let range: Vec<String> = aggregate_range(&rows)
            .into_iter()
            .map(|r| r.supplier_name)
            .collect();
        assert_eq!(range, vec!["Big", "Mid", "Small"]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(aggregate_quarter(&[]).is_empty());
        assert!(aggregate_range(&[]).is_empty());
    }
}
