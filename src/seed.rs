//! Demo data: a plausible set of weeks around "today" and a small catalog.
//!
//! Used by the in-memory transport so the CLI and tests have something to
//! reconcile against without a backend.

use chrono::{Datelike, Duration, NaiveDate};

use crate::calendar::{first_of_month, months_before, week_start};
use crate::model::{Project, Timesheet, TimesheetEntry, WorkType};
use crate::status::StatusState;

const DEMO_TASK: &str = "Homepage Development";

pub fn demo_projects() -> Vec<Project> {
    [
        "Homepage Development",
        "API Integration",
        "Bug Fixes",
        "UI/UX Design",
        "Database Optimization",
    ]
    .iter()
    .enumerate()
    .map(|(i, name)| Project {
        id: (i + 1).to_string(),
        name: name.to_string(),
    })
    .collect()
}

pub fn demo_work_types() -> Vec<WorkType> {
    [
        "Bug Fix",
        "Feature Development",
        "Code Review",
        "Testing",
        "Documentation",
    ]
    .iter()
    .enumerate()
    .map(|(i, name)| WorkType {
        id: (i + 1).to_string(),
        name: name.to_string(),
    })
    .collect()
}

/// A week starting at `monday` with `days` entries of `hours_per_day` each
pub fn week_timesheet(
    week_number: u32,
    monday: NaiveDate,
    hours_per_day: f64,
    days: usize,
) -> Timesheet {
    let projects = demo_projects();
    let work_types = demo_work_types();

    let entries: Vec<TimesheetEntry> = (0..days)
        .map(|i| TimesheetEntry {
            id: format!("entry-{}-{}", week_number, i),
            date: monday + Duration::days(i as i64),
            project_name: projects[i % projects.len()].name.clone(),
            type_of_work: work_types[i % work_types.len()].name.clone(),
            task_description: DEMO_TASK.to_string(),
            hours: hours_per_day,
        })
        .collect();

    Timesheet {
        id: format!("timesheet-{}", week_number),
        week_number,
        start_date: monday,
        end_date: monday + Duration::days(6),
        status: StatusState::derived_from(&entries),
        entries,
    }
}

/// The demo week set as seen on `today`.
///
/// Covers every status and every date bucket: the current week, the weeks
/// around the 15th of the previous two months, a week three months back and
/// a draft week. Week numbers count up in generation order.
pub fn demo_timesheets(today: NaiveDate) -> Vec<Timesheet> {
    let mut sheets = Vec::new();
    let mut week_counter = 1;
    let mut push = |monday: NaiveDate, hours: f64, days: usize, sheets: &mut Vec<Timesheet>| {
        let sheet = week_timesheet(week_counter, monday, hours, days);
        week_counter += 1;
        sheets.push(sheet);
    };

    let current_monday = week_start(today);
    push(current_monday, 8.0, 5, &mut sheets);

    let before_month = week_start(first_of_month(today)) - Duration::days(7);
    if before_month.month() == today.month() {
        push(before_month, 6.0, 4, &mut sheets);
    }

    let next_monday = current_monday + Duration::days(7);
    if next_monday.month() == today.month() {
        push(next_monday, 7.0, 4, &mut sheets);
    }

    let mid_last_month = months_before(first_of_month(today), 1) + Duration::days(14);
    let last_month_monday = week_start(mid_last_month);
    push(last_month_monday, 8.0, 5, &mut sheets);
    push(last_month_monday - Duration::days(7), 0.0, 0, &mut sheets);
    push(last_month_monday, 8.0, 5, &mut sheets);

    let mid_two_months_ago = months_before(first_of_month(today), 2) + Duration::days(14);
    push(week_start(mid_two_months_ago), 5.0, 3, &mut sheets);

    push(week_start(months_before(today, 3)), 7.0, 4, &mut sheets);

    push(last_month_monday + Duration::days(7), 6.0, 4, &mut sheets);
    if let Some(draft) = sheets.last_mut() {
        draft.status = StatusState::draft();
    }

    sheets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{filter_timesheets, DateBucket, StatusFilter};
    use crate::status::Status;
    use chrono::Weekday;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 15).unwrap()
    }

    #[test]
    fn test_catalog_has_ids_and_names() {
        assert_eq!(demo_projects().len(), 5);
        assert_eq!(demo_work_types()[0].name, "Bug Fix");
        assert_eq!(demo_projects()[4].id, "5");
    }

    #[test]
    fn test_demo_weeks_are_monday_to_sunday() {
        for sheet in demo_timesheets(today()) {
            assert_eq!(sheet.start_date.weekday(), Weekday::Mon);
            assert_eq!(sheet.end_date.weekday(), Weekday::Sun);
            assert!(sheet.entries.iter().all(|e| sheet.contains_date(e.date)));
        }
    }

    #[test]
    fn test_demo_covers_every_status() {
        let sheets = demo_timesheets(today());
        for status in Status::ALL {
            assert!(
                sheets.iter().any(|ts| ts.status.status() == status),
                "no demo week with status {}",
                status
            );
        }
        assert_eq!(sheets[0].status.status(), Status::Completed);
        assert!(sheets.last().unwrap().status.is_draft());
    }

    #[test]
    fn test_demo_week_numbers_and_ids() {
        let sheets = demo_timesheets(today());
        for (i, sheet) in sheets.iter().enumerate() {
            assert_eq!(sheet.week_number as usize, i + 1);
            assert_eq!(sheet.id, format!("timesheet-{}", i + 1));
        }
        assert_eq!(sheets[0].entries[2].id, "entry-1-2");
    }

    #[test]
    fn test_demo_current_week_is_this_week() {
        let sheets = demo_timesheets(today());
        let this_week = filter_timesheets(&sheets, StatusFilter::All, DateBucket::ThisWeek, today());
        assert_eq!(this_week.len(), 1);
        assert_eq!(this_week[0].id, "timesheet-1");
    }

    #[test]
    fn test_three_months_back_week_rolls_over_at_month_end() {
        // May 31 minus three months is "Feb 31", i.e. Monday March 3
        let sheets = demo_timesheets(NaiveDate::from_ymd_opt(2025, 5, 31).unwrap());
        let three_back = sheets
            .iter()
            .find(|ts| ts.entries.len() == 4 && ts.entries[0].hours == 7.0)
            .unwrap();
        assert_eq!(three_back.start_date, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
    }
}
