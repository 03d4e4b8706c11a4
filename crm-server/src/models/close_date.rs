//! Opportunity close date parsing

use chrono::NaiveDate;

use super::ValidationError;

const CLOSE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an optional `YYYY-MM-DD` close date.
///
/// Absent and empty values mean "no close date"; anything else must parse.
pub fn parse_close_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, CLOSE_DATE_FORMAT)
            .map(Some)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "close_date",
                reason: "invalid close date format (should be YYYY-MM-DD)",
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date() {
        let date = parse_close_date(Some("2024-03-31")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 31));
    }

    #[test]
    fn empty_means_none() {
        assert_eq!(parse_close_date(None).unwrap(), None);
        assert_eq!(parse_close_date(Some("")).unwrap(), None);
    }

    #[test]
    fn rejects_other_formats() {
        assert!(parse_close_date(Some("31/03/2024")).is_err());
        assert!(parse_close_date(Some("2024-02-30")).is_err());
        assert!(parse_close_date(Some("2024-03-31T00:00:00Z")).is_err());
    }
}
