//! Input validation and display formatting helpers
//!
//! The small pile of field checks and Brazilian-locale formatters the
//! handlers lean on. All pure.

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::models::errors::{AppError, AppResult};

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex");
}

/// Syntactic email check (local@domain.tld)
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Strict `HH:MM` check: two digits each, 00-23 hours, 00-59 minutes.
/// `"8:00"` is rejected.
pub fn is_valid_time_hhmm(time: &str) -> bool {
    let bytes = time.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let digits = |s: &str| s.len() == 2 && s.chars().all(|c| c.is_ascii_digit());
    let (h, m) = (&time[..2], &time[3..]);
    if !digits(h) || !digits(m) {
        return false;
    }
    let hour: u8 = h.parse().unwrap_or(99);
    let minute: u8 = m.parse().unwrap_or(99);
    hour <= 23 && minute <= 59
}

/// Format an 11-digit Brazilian phone number as `(XX) XXXXX-XXXX`;
/// anything else comes back digit-stripped but otherwise unchanged.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 11 {
        format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..])
    } else {
        digits
    }
}

/// Format a value as Brazilian currency: `R$ 1.234,56`.
/// Negative values render with a leading minus: `-R$ 100,00`.
pub fn format_brl(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let whole_str = whole.to_string();
    let mut grouped = String::with_capacity(whole_str.len() + whole_str.len() / 3);
    for (i, c) in whole_str.chars().enumerate() {
        if i > 0 && (whole_str.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, frac)
}

/// Age in whole years at `today`
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

/// `YYYY-MM` check for payment reference months
pub fn is_valid_reference_month(month: &str) -> bool {
    let bytes = month.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return false;
    }
    let (y, m) = (&month[..4], &month[5..]);
    if !y.chars().all(|c| c.is_ascii_digit()) || !m.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    matches!(m.parse::<u8>(), Ok(1..=12))
}

/// Body-mass index reading with its classification band
#[derive(Debug, Clone, Serialize)]
pub struct BmiReading {
    pub bmi: f64,
    pub classification: &'static str,
}

/// BMI from weight (kg) and height (m). Negative input is an error;
/// zero weight or height yields a zero reading.
pub fn bmi(weight_kg: f64, height_m: f64) -> AppResult<BmiReading> {
    if weight_kg < 0.0 || height_m < 0.0 {
        return Err(AppError::out_of_range(
            "Weight and height must be non-negative",
        ));
    }
    if weight_kg == 0.0 || height_m == 0.0 {
        return Ok(BmiReading {
            bmi: 0.0,
            classification: classify_bmi(0.0),
        });
    }

    let raw = weight_kg / (height_m * height_m);
    let rounded = (raw * 100.0).round() / 100.0;
    Ok(BmiReading {
        bmi: rounded,
        classification: classify_bmi(rounded),
    })
}

fn classify_bmi(bmi: f64) -> &'static str {
    if bmi < 18.5 {
        "underweight"
    } else if bmi < 25.0 {
        "normal"
    } else if bmi < 30.0 {
        "overweight"
    } else if bmi < 35.0 {
        "obesity_1"
    } else if bmi < 40.0 {
        "obesity_2"
    } else {
        "obesity_3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("teste@teste.com"));
        assert!(!is_valid_email("teste@teste"));
        assert!(!is_valid_email("teste.com"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("@teste.com"));
    }

    #[test]
    fn test_time_validation() {
        assert!(is_valid_time_hhmm("08:00"));
        assert!(is_valid_time_hhmm("23:59"));
        assert!(!is_valid_time_hhmm("25:00"));
        assert!(!is_valid_time_hhmm("08:60"));
        assert!(!is_valid_time_hhmm(""));
        assert!(!is_valid_time_hhmm("8:00"));
    }

    #[test]
    fn test_phone_formatting() {
        assert_eq!(format_phone("11987654321"), "(11) 98765-4321");
        assert_eq!(format_phone("(11) 98765-4321"), "(11) 98765-4321");
        assert_eq!(format_phone(""), "");
        assert_eq!(format_phone("123"), "123");
    }

    #[test]
    fn test_brl_formatting() {
        assert_eq!(format_brl(100.0), "R$ 100,00");
        assert_eq!(format_brl(1234.56), "R$ 1.234,56");
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(-100.0), "-R$ 100,00");
        assert_eq!(format_brl(1_000_000.5), "R$ 1.000.000,50");
    }

    #[test]
    fn test_age_calculation() {
        let birth = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2020, 6, 15).unwrap()), 20);
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2020, 6, 14).unwrap()), 19);
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()), 29);
    }

    #[test]
    fn test_reference_month() {
        assert!(is_valid_reference_month("2026-01"));
        assert!(is_valid_reference_month("2026-12"));
        assert!(!is_valid_reference_month("2026-13"));
        assert!(!is_valid_reference_month("2026-00"));
        assert!(!is_valid_reference_month("202601"));
        assert!(!is_valid_reference_month("26-01"));
    }

    #[test]
    fn test_bmi() {
        let reading = bmi(70.0, 1.75).unwrap();
        assert_eq!(reading.bmi, 22.86);
        assert_eq!(reading.classification, "normal");

        assert_eq!(bmi(0.0, 1.75).unwrap().bmi, 0.0);
        assert_eq!(bmi(70.0, 0.0).unwrap().bmi, 0.0);
        assert!(bmi(-70.0, 1.75).is_err());
        assert!(bmi(70.0, -1.75).is_err());
    }

    #[test]
    fn test_bmi_bands() {
        assert_eq!(bmi(50.0, 1.80).unwrap().classification, "underweight");
        assert_eq!(bmi(95.0, 1.75).unwrap().classification, "obesity_1");
        assert_eq!(bmi(130.0, 1.70).unwrap().classification, "obesity_3");
    }
}
