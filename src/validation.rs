//! Cross-field validation shared by job create and update.
//!
//! Field-level shape checks (required, lengths) live on the request DTOs via
//! `validator` derives; the rules here span several fields and run before any
//! write reaches the database.

use chrono::{DateTime, Months, Utc};

use crate::constants::SALARY_TYPE_NEGOTIABLE;
use crate::error::AppError;

/// Salary range rules. Outside the negotiable type both bounds are required;
/// any bound that is present must be non-negative and correctly ordered.
pub fn check_salary(
    salary_type: i32,
    salary_min: Option<i64>,
    salary_max: Option<i64>,
) -> Result<(), AppError> {
    if salary_type != SALARY_TYPE_NEGOTIABLE && (salary_min.is_none() || salary_max.is_none()) {
        return Err(AppError::Validation(
            "Salary range is required unless salary is negotiable".to_string(),
        ));
    }

    if salary_min.is_some_and(|v| v < 0) || salary_max.is_some_and(|v| v < 0) {
        return Err(AppError::Validation(
            "Salary must be non-negative".to_string(),
        ));
    }

    if let (Some(min), Some(max)) = (salary_min, salary_max)
        && min > max
    {
        return Err(AppError::Validation(
            "Minimum salary cannot be greater than maximum salary".to_string(),
        ));
    }

    Ok(())
}

/// Deadline must fall within one calendar month of the posted date.
/// Month arithmetic clamps at month end, so a job posted Jan 31 may run
/// until Feb 28 (29 in leap years).
pub fn check_dates(posted_date: DateTime<Utc>, deadline: DateTime<Utc>) -> Result<(), AppError> {
    if deadline < posted_date {
        return Err(AppError::Validation(
            "Deadline cannot be earlier than posted date".to_string(),
        ));
    }

    let one_month_later = posted_date
        .checked_add_months(Months::new(1))
        .ok_or_else(|| AppError::Validation("Posted date out of range".to_string()))?;

    if deadline > one_month_later {
        return Err(AppError::Validation(
            "Deadline cannot be more than 1 month after posted date".to_string(),
        ));
    }

    Ok(())
}

/// Reject empty or whitespace-only required strings, returning the trimmed
/// value used for storage.
pub fn require_nonblank(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!(
            "{field} is required and cannot be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Multi-value code fields must carry at least one code.
pub fn require_codes(field: &str, codes: &[i32]) -> Result<(), AppError> {
    if codes.is_empty() {
        return Err(AppError::Validation(format!(
            "{field} must contain at least one code"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn salary_range_required_when_not_negotiable() {
        assert!(check_salary(1, None, Some(100)).is_err());
        assert!(check_salary(1, Some(100), None).is_err());
        assert!(check_salary(1, Some(100), Some(200)).is_ok());
    }

    #[test]
    fn negotiable_salary_may_omit_range() {
        assert!(check_salary(SALARY_TYPE_NEGOTIABLE, None, None).is_ok());
        assert!(check_salary(SALARY_TYPE_NEGOTIABLE, Some(100), Some(200)).is_ok());
    }

    #[test]
    fn inverted_range_rejected_regardless_of_type() {
        assert!(check_salary(1, Some(100), Some(50)).is_err());
        assert!(check_salary(SALARY_TYPE_NEGOTIABLE, Some(100), Some(50)).is_err());
    }

    #[test]
    fn negative_salary_rejected() {
        assert!(check_salary(1, Some(-1), Some(50)).is_err());
        assert!(check_salary(SALARY_TYPE_NEGOTIABLE, None, Some(-5)).is_err());
    }

    #[test]
    fn deadline_before_posted_rejected() {
        assert!(check_dates(utc(2024, 1, 10), utc(2024, 1, 9)).is_err());
    }

    #[test]
    fn deadline_within_one_month_accepted() {
        assert!(check_dates(utc(2024, 1, 1), utc(2024, 1, 31)).is_ok());
        assert!(check_dates(utc(2024, 1, 1), utc(2024, 2, 1)).is_ok());
        assert!(check_dates(utc(2024, 1, 1), utc(2024, 1, 1)).is_ok());
    }

    #[test]
    fn deadline_past_one_month_rejected() {
        assert!(check_dates(utc(2024, 1, 1), utc(2024, 2, 2)).is_err());
    }

    #[test]
    fn month_addition_clamps_at_month_end() {
        // Jan 31 + 1 month lands on Feb 29 in a leap year
        assert!(check_dates(utc(2024, 1, 31), utc(2024, 2, 29)).is_ok());
        assert!(check_dates(utc(2024, 1, 31), utc(2024, 3, 1)).is_err());
    }

    #[test]
    fn blank_required_fields_rejected() {
        assert!(require_nonblank("title", "").is_err());
        assert!(require_nonblank("title", "   ").is_err());
        assert_eq!(require_nonblank("title", " Teacher ").unwrap(), "Teacher");
    }

    #[test]
    fn empty_code_sets_rejected() {
        assert!(require_codes("category", &[]).is_err());
        assert!(require_codes("category", &[1]).is_ok());
    }
}
