//! Survey forms exchange dates as `dd-mm-yyyy`.

use chrono::NaiveDate;

use crate::errors::AppError;

pub const DATE_FORMAT: &str = "%d-%m-%Y";

pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    Ok(NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)?)
}

/// Missing or blank input is `None`; anything else must parse.
pub fn parse_optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => parse_date(value).map(Some),
        None => Ok(None),
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_day_month_year() {
        let date = parse_date("05-03-2024").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(format_date(date), "05-03-2024");
    }

    #[test]
    fn rejects_iso_dates() {
        assert!(matches!(parse_date("2024-03-05"), Err(AppError::Date(_))));
        assert!(matches!(parse_date("31-02-2024"), Err(AppError::Date(_))));
    }

    #[test]
    fn optional_dates() {
        assert_eq!(parse_optional_date(None).unwrap(), None);
        assert_eq!(parse_optional_date(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_optional_date(Some("17-08-2025")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 8, 17)
        );
        assert!(parse_optional_date(Some("17/08/2025")).is_err());
    }
}
