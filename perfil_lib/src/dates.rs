//! Lenient date parsing for dataset columns.

use chrono::NaiveDate;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Parse a raw dataset date.
///
/// Accepts ISO dates, Brazilian `DD/MM/YYYY` dates, and datetimes whose date
/// part is ISO (`2019-08-02T10:00:00`, `2019-08-02 10:00:00`). Blank or
/// unparseable input yields `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    let date_part = value.split(['T', ' ']).next().unwrap_or(value);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_date("2019-08-02"), Some(date(2019, 8, 2)));
    }

    #[test]
    fn test_parse_brazilian_date() {
        assert_eq!(parse_date("02/08/2019"), Some(date(2019, 8, 2)));
    }

    #[test]
    fn test_parse_datetime() {
        assert_eq!(parse_date("2019-08-02T10:31:00"), Some(date(2019, 8, 2)));
        assert_eq!(parse_date("2019-08-02 10:31:00"), Some(date(2019, 8, 2)));
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2019-13-40"), None);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse_date(" 2001-09-30 "), Some(date(2001, 9, 30)));
    }
}
