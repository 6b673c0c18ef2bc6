//! Plain-text rendering for the command line

use std::fmt::Write;

use crate::calendar::WeekRange;
use crate::model::Timesheet;
use crate::session::Catalog;
use crate::utils::{create_progress_bar, format_date_range, format_hours, truncate_string, week_progress};

const RULE_WIDTH: usize = 70;

fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

/// One row per timesheet: week, span, status and booked hours
pub fn timesheet_table(timesheets: &[Timesheet]) -> String {
    let mut out = String::new();

    if timesheets.is_empty() {
        out.push_str("No timesheets match the current filters\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<6} {:<24} {:<12} {:<8} {:<14}",
        "Week", "Date Range", "Status", "Hours", "Id"
    );
    let _ = writeln!(out, "{}", rule());

    let mut total_hours = 0.0;
    for ts in timesheets {
        let hours = ts.total_hours();
        total_hours += hours;
        let _ = writeln!(
            out,
            "{:<6} {:<24} {:<12} {:<8.1} {:<14}",
            ts.week_number,
            format_date_range(ts.start_date, ts.end_date),
            ts.status.status(),
            hours,
            truncate_string(&ts.id, 14)
        );
    }

    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(
        out,
        "{:<6} {:<24} {:<12} {:<8.1}",
        "TOTAL", "", "", total_hours
    );
    let _ = writeln!(out, "\nFound {} timesheets", timesheets.len());
    out
}

/// Entries of one week grouped by day, with progress towards the weekly target
pub fn week_detail(ts: &Timesheet) -> String {
    let mut out = String::new();
    let hours = ts.total_hours();

    let _ = writeln!(
        out,
        "=== Week {} ({}) ===",
        ts.week_number,
        format_date_range(ts.start_date, ts.end_date)
    );
    let _ = writeln!(out, "Status: {}", ts.status.status());
    let _ = writeln!(
        out,
        "Progress: {} {} of 40",
        create_progress_bar(week_progress(hours), 20),
        format_hours(hours)
    );

    let _ = writeln!(
        out,
        "\n{:<12} {:<22} {:<20} {:<8} {:<6}",
        "Date", "Project", "Type of Work", "Hours", "Id"
    );
    let _ = writeln!(out, "{}", rule());

    let grouped = ts.entries_by_date();
    for day in ts.range().days() {
        match grouped.get(&day) {
            Some(entries) => {
                for entry in entries {
                    let _ = writeln!(
                        out,
                        "{:<12} {:<22} {:<20} {:<8.1} {}",
                        day.format("%Y-%m-%d"),
                        truncate_string(&entry.project_name, 20),
                        truncate_string(&entry.type_of_work, 18),
                        entry.hours,
                        entry.id
                    );
                    if !entry.task_description.is_empty() {
                        let _ = writeln!(
                            out,
                            "{:<12} {}",
                            "",
                            truncate_string(&entry.task_description, 56)
                        );
                    }
                }
            }
            None => {
                let _ = writeln!(
                    out,
                    "{:<12} {:<22} {:<20} {:<8}",
                    day.format("%Y-%m-%d"),
                    "-",
                    "-",
                    "-"
                );
            }
        }
    }

    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "{:<12} {:<22} {:<20} {:<8.1}", "TOTAL", "", "", hours);
    out
}

pub fn catalog_listing(catalog: &Catalog) -> String {
    let mut out = String::from("Projects:\n");
    for project in &catalog.projects {
        let _ = writeln!(out, "  {:<4} {}", project.id, project.name);
    }
    out.push_str("\nTypes of work:\n");
    for work_type in &catalog.work_types {
        let _ = writeln!(out, "  {:<4} {}", work_type.id, work_type.name);
    }
    out
}

pub fn week_bounds_line(week_number: u32, year: i32, range: &WeekRange) -> String {
    format!(
        "Week {} of {}: {} to {} ({})",
        week_number,
        year,
        range.start_date.format("%Y-%m-%d"),
        range.end_date.format("%Y-%m-%d"),
        format_date_range(range.start_date, range.end_date)
    )
}
