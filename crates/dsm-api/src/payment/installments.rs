//! Splitting a payment plan into dated installments.

use chrono::{Months, NaiveDate};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Installment {
    pub number: i32,
    pub amount: f64,
    pub due_date: NaiveDate,
}

/// Split `total` into `count` monthly installments, the first due on `start`.
///
/// Amounts are computed in cents; the remainder goes to the last installment
/// so the schedule always sums to the plan total.
pub fn installment_schedule(
    total: f64,
    count: i32,
    start: NaiveDate,
) -> Result<Vec<Installment>, ApiError> {
    if count < 1 {
        return Err(ApiError::Validation(
            "installments must be at least 1".to_string(),
        ));
    }
    if !total.is_finite() || total < 0.0 {
        return Err(ApiError::Validation(
            "total_amount must be a non-negative number".to_string(),
        ));
    }

    let total_cents = (total * 100.0).round() as i64;
    let n = i64::from(count);
    let base = total_cents / n;
    let remainder = total_cents - base * n;

    (0..count)
        .map(|i| {
            let cents = if i == count - 1 { base + remainder } else { base };
            let due_date = start
                .checked_add_months(Months::new(i.unsigned_abs()))
                .ok_or_else(|| {
                    ApiError::Validation("installment due date out of range".to_string())
                })?;

            Ok(Installment {
                number: i + 1,
                amount: cents as f64 / 100.0,
                due_date,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cents(installments: &[Installment]) -> i64 {
        installments
            .iter()
            .map(|i| (i.amount * 100.0).round() as i64)
            .sum()
    }

    #[test]
    fn test_even_split() {
        let schedule = installment_schedule(3000.0, 3, date(2025, 1, 10)).unwrap();
        assert_eq!(schedule.len(), 3);
        assert!(schedule.iter().all(|i| i.amount == 1000.0));
        assert_eq!(schedule[0].number, 1);
        assert_eq!(schedule[0].due_date, date(2025, 1, 10));
        assert_eq!(schedule[1].due_date, date(2025, 2, 10));
        assert_eq!(schedule[2].due_date, date(2025, 3, 10));
    }

    #[test]
    fn test_remainder_on_last_installment() {
        let schedule = installment_schedule(100.0, 3, date(2025, 1, 1)).unwrap();
        assert_eq!(schedule[0].amount, 33.33);
        assert_eq!(schedule[1].amount, 33.33);
        assert_eq!(schedule[2].amount, 33.34);
        assert_eq!(cents(&schedule), 10_000);

        let schedule = installment_schedule(4999.99, 7, date(2025, 1, 1)).unwrap();
        assert_eq!(cents(&schedule), 499_999);
    }

    #[test]
    fn test_month_end_clamping() {
        let schedule = installment_schedule(90.0, 3, date(2025, 1, 31)).unwrap();
        assert_eq!(schedule[1].due_date, date(2025, 2, 28));
        assert_eq!(schedule[2].due_date, date(2025, 3, 31));
    }

    #[test]
    fn test_single_installment_and_invalid_counts() {
        let schedule = installment_schedule(2500.0, 1, date(2025, 5, 1)).unwrap();
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].amount, 2500.0);

        assert!(installment_schedule(100.0, 0, date(2025, 5, 1)).is_err());
        assert!(installment_schedule(-1.0, 2, date(2025, 5, 1)).is_err());
    }
}
