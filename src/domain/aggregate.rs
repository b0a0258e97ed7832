//! Grouping of records into per-date aggregates and whole-dataset totals.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::domain::types::{DateAggregate, GstSummary, RecordView, TypeTotals};

/// Group records by their period start date, newest date first.
///
/// Every aggregate carries subtotals for all three GST components, with
/// components that have no records on that date staying at zero. Sums are
/// exact Decimal arithmetic; nothing is rounded here.
pub fn aggregate_by_date(records: &[RecordView]) -> Vec<DateAggregate> {
    let mut by_date = BTreeMap::new();
    for record in records {
        let entry = by_date
            .entry(record.from_date)
            .or_insert_with(|| DateAggregate::empty(record.from_date));
        entry.total_tax += record.tax_amount;
        entry.total_from_value += record.from_value;
        entry.total_to_value += record.to_value;
        entry.by_type.add(record.tax_type, record.tax_amount);
        entry.records.push(record.clone());
    }
    // BTreeMap iterates ascending; the view wants the newest date on top.
    by_date.into_values().rev().collect()
}

/// Totals across the whole dataset for the summary block.
pub fn summarize(records: &[RecordView]) -> GstSummary {
    let mut by_type = TypeTotals::default();
    let mut total_tax = Decimal::ZERO;
    for record in records {
        by_type.add(record.tax_type, record.tax_amount);
        total_tax += record.tax_amount;
    }
    GstSummary {
        record_count: records.len(),
        by_type,
        total_tax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::TaxType;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn record(id: &str, date: (i32, u32, u32), tax_type: TaxType, amount: Decimal) -> RecordView {
        RecordView {
            id: id.to_string(),
            from_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            to_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            from_value: dec!(100),
            to_value: dec!(200),
            tax_type,
            tax_rate: dec!(18),
            tax_amount: amount,
        }
    }

    #[test]
    fn two_records_on_one_date_share_an_aggregate() {
        let records = vec![
            record("a", (2024, 1, 1), TaxType::Cgst, dec!(18.00)),
            record("b", (2024, 1, 1), TaxType::Sgst, dec!(18.00)),
        ];
        let got = aggregate_by_date(&records);
        assert_eq!(got.len(), 1);
        let agg = &got[0];
        assert_eq!(agg.record_count(), 2);
        assert_eq!(agg.total_tax, dec!(36.00));
        assert_eq!(agg.by_type.cgst, dec!(18.00));
        assert_eq!(agg.by_type.sgst, dec!(18.00));
        assert_eq!(agg.by_type.igst, dec!(0.00));
    }

    #[test]
    fn aggregates_sort_newest_date_first() {
        let records = vec![
            record("a", (2024, 1, 1), TaxType::Cgst, dec!(1)),
            record("b", (2024, 3, 1), TaxType::Cgst, dec!(1)),
            record("c", (2024, 2, 1), TaxType::Cgst, dec!(1)),
        ];
        let dates: Vec<_> = aggregate_by_date(&records)
            .into_iter()
            .map(|a| a.date)
            .collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            ]
        );
    }

    #[test]
    fn sums_keep_full_precision() {
        // Three amounts that would drift if each were rounded to two
        // decimals before adding.
        let records = vec![
            record("a", (2024, 1, 1), TaxType::Igst, dec!(0.105)),
            record("b", (2024, 1, 1), TaxType::Igst, dec!(0.105)),
            record("c", (2024, 1, 1), TaxType::Igst, dec!(0.105)),
        ];
        let got = aggregate_by_date(&records);
        assert_eq!(got[0].total_tax, dec!(0.315));
        assert_eq!(got[0].by_type.igst, dec!(0.315));
    }

    #[test]
    fn value_totals_accumulate_per_date() {
        let mut a = record("a", (2024, 1, 1), TaxType::Cgst, dec!(9));
        a.from_value = dec!(50.25);
        a.to_value = dec!(100.75);
        let mut b = record("b", (2024, 1, 1), TaxType::Sgst, dec!(9));
        b.from_value = dec!(49.75);
        b.to_value = dec!(99.25);
        let got = aggregate_by_date(&[a, b]);
        assert_eq!(got[0].total_from_value, dec!(100.00));
        assert_eq!(got[0].total_to_value, dec!(200.00));
    }

    #[test]
    fn summary_counts_and_splits_by_type() {
        let records = vec![
            record("a", (2024, 1, 1), TaxType::Cgst, dec!(18)),
            record("b", (2024, 2, 1), TaxType::Cgst, dec!(36)),
            record("c", (2024, 2, 1), TaxType::Igst, dec!(18)),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.record_count, 3);
        assert_eq!(summary.by_type.cgst, dec!(54));
        assert_eq!(summary.by_type.sgst, dec!(0));
        assert_eq!(summary.by_type.igst, dec!(18));
        assert_eq!(summary.total_tax, dec!(72));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(aggregate_by_date(&[]).is_empty());
        let summary = summarize(&[]);
        assert_eq!(summary.record_count, 0);
        assert_eq!(summary.total_tax, Decimal::ZERO);
    }
}
