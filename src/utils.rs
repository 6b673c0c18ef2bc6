use chrono::{Datelike, NaiveDate};

use crate::status::COMPLETED_HOURS;

/// Utility functions for the ticktock application

// ===== STRING UTILITIES =====

/// Truncates a string to a maximum length, adding "..." if truncated
pub fn truncate_string(s: &str, max_length: usize) -> String {
    if s.chars().count() <= max_length {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Checks if a string is empty or contains only whitespace
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

// ===== FORMATTING UTILITIES =====

/// Formats a number of hours with proper pluralization
pub fn format_hours(hours: f64) -> String {
    if hours == 1.0 {
        format!("{:.1} hour", hours)
    } else {
        format!("{:.1} hours", hours)
    }
}

/// Formats a week span as "15 - 21 Sep, 2025" or "29 Sep - 5 Oct, 2025"
pub fn format_date_range(start: NaiveDate, end: NaiveDate) -> String {
    let start_month = start.format("%b").to_string();
    let end_month = end.format("%b").to_string();

    if start_month == end_month {
        format!("{} - {} {}, {}", start.day(), end.day(), start_month, start.year())
    } else {
        format!(
            "{} {} - {} {}, {}",
            start.day(),
            start_month,
            end.day(),
            end_month,
            start.year()
        )
    }
}

/// Share of the weekly target reached, capped at 100
pub fn week_progress(total_hours: f64) -> f64 {
    ((total_hours / COMPLETED_HOURS) * 100.0).min(100.0)
}

/// Creates a progress bar string
pub fn create_progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let empty = width - filled;

    format!("[{}{}]", "=".repeat(filled), " ".repeat(empty))
}
