//! Week and month arithmetic
//!
//! Weeks run Monday through Sunday. Week numbers are counted from a fixed
//! January 1st anchor rather than by ISO-8601 rules, so they can disagree
//! with the ISO week of the same date around year boundaries.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Inclusive `[start, end]` span of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl WeekRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        WeekRange {
            start_date,
            end_date,
        }
    }

    /// The Monday–Sunday week containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        WeekRange::new(week_start(date), week_end(date))
    }

    /// True when the two inclusive ranges share at least one day
    pub fn overlaps(&self, other: &WeekRange) -> bool {
        self.start_date <= other.end_date && self.end_date >= other.start_date
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Every date in the range, in order
    pub fn days(&self) -> Vec<NaiveDate> {
        self.start_date
            .iter_days()
            .take_while(|d| *d <= self.end_date)
            .collect()
    }
}

/// Returns the Monday of the week containing `date`.
///
/// Sunday is the last day of its week, so a Sunday maps six days back.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let day = date.weekday().num_days_from_sunday() as i64;
    let shift = if day == 0 { -6 } else { 1 - day };
    date + Duration::days(shift)
}

/// Returns the Sunday closing the week containing `date`
pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date) + Duration::days(6)
}

/// Canonical seven-day range of `week_number` in `year`.
///
/// The start is `Jan 1 + 7 * (week_number - 1)` days moved to the Monday of
/// the Sunday-first week holding that day. When January 1st is a Sunday the
/// first week therefore starts on January 2nd.
pub fn week_bounds(week_number: u32, year: i32) -> Result<WeekRange, ValidationError> {
    if week_number == 0 {
        return Err(ValidationError::InvalidWeekNumber(week_number));
    }
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(ValidationError::InvalidYear(year))?;

    let offset = 7 * (week_number as i64 - 1) - jan1.weekday().num_days_from_sunday() as i64 + 1;
    let start_date = jan1
        .checked_add_signed(Duration::days(offset))
        .ok_or(ValidationError::InvalidWeekNumber(week_number))?;
    let end_date = start_date
        .checked_add_signed(Duration::days(6))
        .ok_or(ValidationError::InvalidWeekNumber(week_number))?;

    Ok(WeekRange::new(start_date, end_date))
}

/// Offset-based week number of `date` within its year.
///
/// Counts Sunday-first weeks from January 1st, so a Sunday already belongs
/// to the next number even though `week_bounds` puts it at the end of the
/// previous range.
pub fn week_number(date: NaiveDate) -> u32 {
    let jan1 = date - Duration::days(date.ordinal0() as i64);
    let days_since_jan1 = date.ordinal0() as i64;
    let lead = jan1.weekday().num_days_from_sunday() as i64;
    ((days_since_jan1 + lead + 1 + 6) / 7) as u32
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// `date` moved back `months` calendar months, keeping the day of month.
///
/// A day the target month does not have rolls over into the following
/// month: December 31 minus three months is "September 31", i.e. October 1.
pub fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    first_of_month(date)
        .checked_sub_months(Months::new(months))
        .and_then(|first| first.checked_add_signed(Duration::days(date.day0() as i64)))
        .unwrap_or(NaiveDate::MIN)
}

/// Parses `YYYY-MM-DD`, `YYYY.MM.DD` or `YYYY/MM/DD`
pub fn parse_date(date_str: &str) -> Result<NaiveDate, ValidationError> {
    let formats = ["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"];

    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_str.trim(), format).ok())
        .ok_or_else(|| ValidationError::InvalidDateFormat(date_str.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_start_midweek() {
        // Wednesday
        assert_eq!(week_start(date(2025, 9, 17)), date(2025, 9, 15));
        assert_eq!(week_end(date(2025, 9, 17)), date(2025, 9, 21));
    }

    #[test]
    fn test_week_start_sunday_is_last_day() {
        assert_eq!(week_start(date(2025, 9, 21)), date(2025, 9, 15));
        assert_eq!(week_start(date(2025, 9, 15)), date(2025, 9, 15));
    }

    #[test]
    fn test_week_bounds_always_monday_to_sunday() {
        for year in 2015..2035 {
            for week in [1, 2, 10, 26, 52, 53] {
                let range = week_bounds(week, year).unwrap();
                assert_eq!(range.start_date.weekday(), Weekday::Mon);
                assert_eq!(range.end_date.weekday(), Weekday::Sun);
                assert_eq!(range.days().len(), 7);
            }
        }
    }

    #[test]
    fn test_week_bounds_offsets() {
        // 2025-01-01 is a Wednesday
        let first = week_bounds(1, 2025).unwrap();
        assert_eq!(first.start_date, date(2024, 12, 30));
        assert_eq!(first.end_date, date(2025, 1, 5));

        let tenth = week_bounds(10, 2025).unwrap();
        assert_eq!(tenth.start_date, date(2025, 3, 3));

        // 2024-01-01 is a Monday
        assert_eq!(week_bounds(1, 2024).unwrap().start_date, date(2024, 1, 1));
    }

    #[test]
    fn test_week_bounds_sunday_new_year() {
        // 2023-01-01 is a Sunday: week 1 starts after it
        let range = week_bounds(1, 2023).unwrap();
        assert_eq!(range.start_date, date(2023, 1, 2));
        assert_eq!(range.end_date, date(2023, 1, 8));
    }

    #[test]
    fn test_week_bounds_rejects_zero() {
        assert_eq!(
            week_bounds(0, 2025),
            Err(ValidationError::InvalidWeekNumber(0))
        );
    }

    #[test]
    fn test_week_number() {
        assert_eq!(week_number(date(2025, 1, 1)), 1);
        assert_eq!(week_number(date(2025, 1, 4)), 1);
        assert_eq!(week_number(date(2025, 1, 6)), 2);
        assert!(week_bounds(2, 2025).unwrap().contains(date(2025, 1, 8)));
    }

    #[test]
    fn test_week_number_sunday_counts_forward() {
        // Sunday closes week 1's range but is numbered 2
        let sunday = date(2025, 1, 5);
        assert_eq!(week_number(sunday), 2);
        assert!(week_bounds(1, 2025).unwrap().contains(sunday));
    }

    #[test]
    fn test_month_boundaries() {
        assert_eq!(first_of_month(date(2025, 2, 17)), date(2025, 2, 1));
        assert_eq!(last_of_month(date(2025, 2, 17)), date(2025, 2, 28));
        assert_eq!(last_of_month(date(2024, 2, 1)), date(2024, 2, 29));
        assert_eq!(last_of_month(date(2025, 12, 31)), date(2025, 12, 31));
    }

    #[test]
    fn test_months_before_rolls_over_short_months() {
        assert_eq!(months_before(date(2024, 12, 31), 3), date(2024, 10, 1));
        assert_eq!(months_before(date(2025, 5, 31), 3), date(2025, 3, 3));
        assert_eq!(months_before(date(2024, 5, 31), 3), date(2024, 3, 2));
        assert_eq!(months_before(date(2025, 1, 15), 1), date(2024, 12, 15));
        assert_eq!(months_before(date(2025, 3, 1), 1), date(2025, 2, 1));
    }

    #[test]
    fn test_range_overlap() {
        let a = WeekRange::new(date(2025, 3, 31), date(2025, 4, 6));
        let b = WeekRange::new(date(2025, 4, 1), date(2025, 4, 30));
        let c = WeekRange::new(date(2025, 4, 7), date(2025, 4, 13));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        // touching on a single day counts
        let d = WeekRange::new(date(2025, 4, 6), date(2025, 4, 6));
        assert!(a.overlaps(&d));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-09-15").unwrap(), date(2025, 9, 15));
        assert_eq!(parse_date("2025.09.15").unwrap(), date(2025, 9, 15));
        assert_eq!(parse_date("2025/09/15").unwrap(), date(2025, 9, 15));
        assert!(parse_date("15-09-2025").is_err());
    }
}
