//! Default date range offered for a new job.

use chrono::{Duration, Local, NaiveDate};

/// Format the server parses job dates with.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// `(start, end)` covering the last 30 days up to and including `today`.
pub fn default_range(today: NaiveDate) -> (String, String) {
    let start = today - Duration::days(DEFAULT_LOOKBACK_DAYS);
    (
        start.format(DATE_FORMAT).to_string(),
        today.format(DATE_FORMAT).to_string(),
    )
}

/// [`default_range`] for the local calendar date.
pub fn default_range_today() -> (String, String) {
    default_range(Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_days_back() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(
            default_range(today),
            ("2024-02-14".to_string(), "2024-03-15".to_string())
        );
    }

    #[test]
    fn crosses_year_boundary() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(default_range(today).0, "2023-12-11");
    }
}
