//! Entry field constraints

use crate::calendar::WeekRange;
use crate::error::ValidationError;
use crate::model::{NewEntry, TimesheetEntry};
use crate::utils::is_blank;

pub const MIN_HOURS: f64 = 0.5;
pub const MAX_HOURS: f64 = 24.0;
pub const HOURS_STEP: f64 = 0.5;

pub fn validate_hours(hours: f64) -> Result<(), ValidationError> {
    if hours.is_nan() || hours < MIN_HOURS || hours > MAX_HOURS {
        Err(ValidationError::HoursOutOfRange(hours))
    } else {
        Ok(())
    }
}

/// Checks the text fields and the hour range
pub fn validate_entry_fields(
    project_name: &str,
    type_of_work: &str,
    task_description: &str,
    hours: f64,
) -> Result<(), ValidationError> {
    if is_blank(project_name) {
        return Err(ValidationError::EmptyField("projectName"));
    }
    if is_blank(type_of_work) {
        return Err(ValidationError::EmptyField("typeOfWork"));
    }
    if is_blank(task_description) {
        return Err(ValidationError::EmptyField("taskDescription"));
    }
    validate_hours(hours)
}

pub fn validate_new_entry(entry: &NewEntry, week: &WeekRange) -> Result<(), ValidationError> {
    validate_entry_fields(
        &entry.project_name,
        &entry.type_of_work,
        &entry.task_description,
        entry.hours,
    )?;
    validate_date_in_week(entry.date, week)
}

pub fn validate_entry(entry: &TimesheetEntry, week: &WeekRange) -> Result<(), ValidationError> {
    validate_new_entry(&entry.to_new(), week)
}

pub fn validate_date_in_week(
    date: chrono::NaiveDate,
    week: &WeekRange,
) -> Result<(), ValidationError> {
    if week.contains(date) {
        Ok(())
    } else {
        Err(ValidationError::DateOutsideWeek {
            date,
            start: week.start_date,
            end: week.end_date,
        })
    }
}

/// Moves `hours` by `steps` half-hour increments, clamped to the valid range
pub fn step_hours(hours: f64, steps: i32) -> f64 {
    (hours + HOURS_STEP * steps as f64).clamp(MIN_HOURS, MAX_HOURS)
}
