//! Relative date buckets and the timesheet list filter

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::calendar::{first_of_month, last_of_month, months_before, WeekRange};
use crate::error::ValidationError;
use crate::model::Timesheet;
use crate::status::Status;

/// Named date window evaluated against "today"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateBucket {
    ThisWeek,
    ThisMonth,
    LastMonth,
    LastThreeMonths,
    #[default]
    All,
}

impl DateBucket {
    pub const ALL: [DateBucket; 5] = [
        DateBucket::ThisWeek,
        DateBucket::ThisMonth,
        DateBucket::LastMonth,
        DateBucket::LastThreeMonths,
        DateBucket::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DateBucket::ThisWeek => "this-week",
            DateBucket::ThisMonth => "this-month",
            DateBucket::LastMonth => "last-month",
            DateBucket::LastThreeMonths => "last-3-months",
            DateBucket::All => "all",
        }
    }
}

impl fmt::Display for DateBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for DateBucket {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        DateBucket::ALL
            .into_iter()
            .find(|bucket| bucket.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownDateBucket(s.to_string()))
    }
}

/// Whether a week's range falls in `bucket` as seen on `today`.
///
/// Every bucket except `last-3-months` is an inclusive overlap test.
/// `last-3-months` only looks at the start date.
pub fn in_bucket(bucket: DateBucket, range: &WeekRange, today: NaiveDate) -> bool {
    match bucket {
        DateBucket::ThisWeek => range.overlaps(&WeekRange::containing(today)),
        DateBucket::ThisMonth => {
            range.overlaps(&WeekRange::new(first_of_month(today), last_of_month(today)))
        }
        DateBucket::LastMonth => {
            let last_month = months_before(first_of_month(today), 1);
            range.overlaps(&WeekRange::new(last_month, last_of_month(last_month)))
        }
        DateBucket::LastThreeMonths => {
            WeekRange::new(months_before(today, 3), today).contains(range.start_date)
        }
        DateBucket::All => true,
    }
}

/// Status side of the list filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    pub fn matches(&self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.pad("all"),
            StatusFilter::Only(status) => status.fmt(f),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

/// The visible subset of `timesheets`, in input order
pub fn filter_timesheets(
    timesheets: &[Timesheet],
    status: StatusFilter,
    bucket: DateBucket,
    today: NaiveDate,
) -> Vec<Timesheet> {
    timesheets
        .iter()
        .filter(|ts| status.matches(ts.status.status()))
        .filter(|ts| in_bucket(bucket, &ts.range(), today))
        .cloned()
        .collect()
}
