//! Draft validation: raw form strings in, a submit-ready record out.
//!
//! Checks run in a fixed order and stop at the first failure, so the user
//! always sees one actionable message at a time. The duplicate check is
//! advisory only; the backend itself accepts repeated type/date pairs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::types::{NewRecord, RecordDraft, RecordView, TaxType};

/// Why a draft cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("{0} is required.")]
    Missing(&'static str),
    #[error("{field} {value:?} is not a valid date (expected YYYY-MM-DD).")]
    BadDate { field: &'static str, value: String },
    #[error("{field} {value:?} is not a valid number.")]
    BadNumber { field: &'static str, value: String },
    #[error("From date must be on or before to date.")]
    ReversedRange,
    #[error("To value must be greater than from value.")]
    ValueNotIncreasing,
    #[error("Tax rate must be between 0 and 100.")]
    RateOutOfRange,
    #[error("A {tax_type} record already exists for {date}.")]
    DuplicateTaxType { tax_type: TaxType, date: NaiveDate },
}

/// True when a record with this tax type and period start already exists.
pub fn duplicate_for(records: &[RecordView], tax_type: TaxType, from_date: NaiveDate) -> bool {
    records
        .iter()
        .any(|r| r.tax_type == tax_type && r.from_date == from_date)
}

/// Validate a draft against the form rules and the already-loaded records.
pub fn validate_draft(
    draft: &RecordDraft,
    existing: &[RecordView],
) -> Result<NewRecord, DraftError> {
    let from_date = date_field("From date", &draft.from_date)?;
    let to_date = date_field("To date", &draft.to_date)?;
    let from_value = number_field("From value", &draft.from_value)?;
    let to_value = number_field("To value", &draft.to_value)?;
    let tax_rate = number_field("Tax rate", &draft.tax_rate)?;

    if from_date > to_date {
        return Err(DraftError::ReversedRange);
    }
    if to_value <= from_value {
        return Err(DraftError::ValueNotIncreasing);
    }
    if tax_rate < Decimal::ZERO || tax_rate > Decimal::from(100) {
        return Err(DraftError::RateOutOfRange);
    }
    if duplicate_for(existing, draft.tax_type, from_date) {
        return Err(DraftError::DuplicateTaxType {
            tax_type: draft.tax_type,
            date: from_date,
        });
    }

    Ok(NewRecord {
        from_date,
        to_date,
        from_value,
        to_value,
        tax_type: draft.tax_type,
        tax_rate,
    })
}

fn date_field(field: &'static str, input: &str) -> Result<NaiveDate, DraftError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DraftError::Missing(field));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| DraftError::BadDate {
        field,
        value: input.to_string(),
    })
}

fn number_field(field: &'static str, input: &str) -> Result<Decimal, DraftError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DraftError::Missing(field));
    }
    input.parse().map_err(|_| DraftError::BadNumber {
        field,
        value: input.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft() -> RecordDraft {
        RecordDraft {
            from_date: "2024-01-01".to_string(),
            to_date: "2024-01-31".to_string(),
            from_value: "100".to_string(),
            to_value: "200".to_string(),
            tax_type: TaxType::Cgst,
            tax_rate: "18".to_string(),
        }
    }

    fn existing(tax_type: TaxType, date: &str) -> RecordView {
        RecordView {
            id: "x".to_string(),
            from_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            to_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            from_value: dec!(1),
            to_value: dec!(2),
            tax_type,
            tax_rate: dec!(18),
            tax_amount: dec!(0.18),
        }
    }

    #[test]
    fn valid_draft_becomes_a_new_record() {
        let got = validate_draft(&draft(), &[]).unwrap();
        assert_eq!(got.from_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(got.from_value, dec!(100));
        assert_eq!(got.to_value, dec!(200));
        assert_eq!(got.tax_type, TaxType::Cgst);
        assert_eq!(got.tax_rate, dec!(18));
    }

    #[test]
    fn missing_fields_are_reported_first() {
        let mut d = draft();
        d.from_date.clear();
        d.to_value = "50".to_string();
        assert_eq!(
            validate_draft(&d, &[]),
            Err(DraftError::Missing("From date"))
        );
    }

    #[test]
    fn malformed_date_is_rejected() {
        let mut d = draft();
        d.to_date = "31/01/2024".to_string();
        assert!(matches!(
            validate_draft(&d, &[]),
            Err(DraftError::BadDate { field: "To date", .. })
        ));
    }

    #[test]
    fn malformed_number_is_rejected() {
        let mut d = draft();
        d.from_value = "12x".to_string();
        assert!(matches!(
            validate_draft(&d, &[]),
            Err(DraftError::BadNumber { field: "From value", .. })
        ));
    }

    #[test]
    fn reversed_date_range_is_rejected() {
        let mut d = draft();
        d.from_date = "2024-02-01".to_string();
        d.to_date = "2024-01-01".to_string();
        assert_eq!(validate_draft(&d, &[]), Err(DraftError::ReversedRange));
    }

    #[test]
    fn to_value_must_exceed_from_value() {
        let mut d = draft();
        d.to_value = "100".to_string();
        assert_eq!(validate_draft(&d, &[]), Err(DraftError::ValueNotIncreasing));
        d.to_value = "99.99".to_string();
        assert_eq!(validate_draft(&d, &[]), Err(DraftError::ValueNotIncreasing));
    }

    #[test]
    fn rate_bounds_are_inclusive() {
        let mut d = draft();
        d.tax_rate = "0".to_string();
        assert!(validate_draft(&d, &[]).is_ok());
        d.tax_rate = "100".to_string();
        assert!(validate_draft(&d, &[]).is_ok());
        d.tax_rate = "100.01".to_string();
        assert_eq!(validate_draft(&d, &[]), Err(DraftError::RateOutOfRange));
        d.tax_rate = "-1".to_string();
        assert_eq!(validate_draft(&d, &[]), Err(DraftError::RateOutOfRange));
    }

    #[test]
    fn duplicate_type_and_date_is_blocked_with_both_named() {
        let err = validate_draft(&draft(), &[existing(TaxType::Cgst, "2024-01-01")]).unwrap_err();
        assert_eq!(
            err,
            DraftError::DuplicateTaxType {
                tax_type: TaxType::Cgst,
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            }
        );
        let message = err.to_string();
        assert!(message.contains("CGST"));
        assert!(message.contains("2024-01-01"));
    }

    #[test]
    fn same_date_different_type_is_allowed() {
        let got = validate_draft(&draft(), &[existing(TaxType::Sgst, "2024-01-01")]);
        assert!(got.is_ok());
    }

    #[test]
    fn same_type_different_date_is_allowed() {
        let got = validate_draft(&draft(), &[existing(TaxType::Cgst, "2024-02-01")]);
        assert!(got.is_ok());
    }

    #[test]
    fn whitespace_around_inputs_is_tolerated() {
        let mut d = draft();
        d.from_value = "  100 ".to_string();
        d.tax_rate = " 18 ".to_string();
        assert!(validate_draft(&d, &[]).is_ok());
    }
}
