use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// Largest magnitude a NUMERIC(12,2) column can hold.
const MONEY_LIMIT: i64 = 10_000_000_000;

pub fn fmt_money(d: &Decimal) -> String {
    d.round_dp(2).to_string()
}

pub fn parse_money(s: &str) -> Option<Decimal> {
    Decimal::from_str_exact(s.trim()).ok()
}

/// Checks that `d` fits a 12-digit, 2-place fixed-point column and returns it
/// rescaled to exactly two decimal places.
pub fn normalize_money(d: Decimal) -> Result<Decimal, String> {
    if d.normalize().scale() > 2 {
        return Err(format!("{d} has more than 2 decimal places"));
    }
    if d.abs() >= Decimal::from(MONEY_LIMIT) {
        return Err(format!("{d} exceeds 12 digits"));
    }
    let mut v = d;
    v.rescale(2);
    Ok(v)
}

pub fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Same day `months` later, clamped to the last day of the target month.
pub fn add_months(d: NaiveDate, months: u32) -> NaiveDate {
    let total = d.year() * 12 + d.month0() as i32 + months as i32;
    let (year, month) = (total.div_euclid(12), total.rem_euclid(12) as u32 + 1);
    (1..=d.day())
        .rev()
        .find_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .unwrap_or(d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn normalize_pads_to_two_places() {
        let v = normalize_money(Decimal::from(100)).unwrap();
        assert_eq!(v.to_string(), "100.00");
        let v = normalize_money(Decimal::from_str("12.5").unwrap()).unwrap();
        assert_eq!(v.to_string(), "12.50");
    }

    #[test]
    fn normalize_accepts_trailing_zeros() {
        let v = normalize_money(Decimal::from_str("7.1000").unwrap()).unwrap();
        assert_eq!(v.to_string(), "7.10");
    }

    #[test]
    fn normalize_rejects_fractional_cents_and_overflow() {
        assert!(normalize_money(Decimal::from_str("0.001").unwrap()).is_err());
        assert!(normalize_money(Decimal::from_str("10000000000.00").unwrap()).is_err());
        assert!(normalize_money(Decimal::from_str("9999999999.99").unwrap()).is_ok());
    }

    #[test]
    fn parse_money_round_trips_db_text() {
        let d = parse_money(" 40.00 ").unwrap();
        assert_eq!(fmt_money(&d), "40.00");
        assert!(parse_money("forty").is_none());
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        let jan31 = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(add_months(jan31, 1), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        assert_eq!(add_months(jan31, 12), NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());
        let nov = NaiveDate::from_ymd_opt(2025, 11, 15).unwrap();
        assert_eq!(add_months(nov, 3), NaiveDate::from_ymd_opt(2026, 2, 15).unwrap());
    }
}
