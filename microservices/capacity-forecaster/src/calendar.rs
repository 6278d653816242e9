//! Day-level calendar helpers

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};

/// Midnight UTC on `date`
pub fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// 0 = Sunday .. 6 = Saturday
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_sunday() as usize
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(weekday_index(date), 0 | 6)
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(30)
}

/// `YYYY-MM-DD` label used on timelines
pub fn label(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekday_index_starts_on_sunday() {
        assert_eq!(weekday_index(date(2024, 6, 2)), 0); // Sunday
        assert_eq!(weekday_index(date(2024, 6, 8)), 6); // Saturday
        assert!(is_weekend(date(2024, 6, 8)));
        assert!(!is_weekend(date(2024, 6, 5)));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(date(2024, 2, 10)), 29);
        assert_eq!(days_in_month(date(2023, 2, 10)), 28);
        assert_eq!(days_in_month(date(2024, 12, 31)), 31);
        assert_eq!(days_in_month(date(2024, 4, 1)), 30);
    }

    #[test]
    fn test_midnight_and_label() {
        let d = date(2024, 3, 9);
        assert_eq!(utc_midnight(d).date_naive(), d);
        assert_eq!(label(d), "2024-03-09");
    }
}
