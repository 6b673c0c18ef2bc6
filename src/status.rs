//! Week status rules
//!
//! A week's status is a pure function of its hour sum, except for the manual
//! draft override which entries never clear.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::TimesheetEntry;

/// Hours at which a week counts as completed
pub const COMPLETED_HOURS: f64 = 40.0;

/// Flat status value as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "COMPLETED")]
    Completed,
    #[serde(rename = "INCOMPLETE")]
    Incomplete,
    #[serde(rename = "IN DRAFT")]
    InDraft,
    #[serde(rename = "MISSING")]
    Missing,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Completed,
        Status::Incomplete,
        Status::InDraft,
        Status::Missing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Completed => "COMPLETED",
            Status::Incomplete => "INCOMPLETE",
            Status::InDraft => "IN DRAFT",
            Status::Missing => "MISSING",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    /// Accepts the wire names case-insensitively; `in-draft` and `in_draft`
    /// stand in for the space.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['-', '_'], " ");
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownStatus(s.to_string()))
    }
}

/// Status computed from hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivedStatus {
    Completed,
    Incomplete,
    Missing,
}

/// Status set by an explicit workflow action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Override {
    Draft,
}

/// Status held by a timesheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Status", into = "Status")]
pub enum StatusState {
    Derived(DerivedStatus),
    ManualOverride(Override),
}

impl StatusState {
    pub fn draft() -> Self {
        StatusState::ManualOverride(Override::Draft)
    }

    pub fn derived_from(entries: &[TimesheetEntry]) -> Self {
        StatusState::Derived(derive_from_hours(total_hours(entries)))
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, StatusState::ManualOverride(Override::Draft))
    }

    /// Re-evaluates the status after an entry mutation. A manual override
    /// survives; a derived status follows the new hour sum.
    pub fn reconcile(self, entries: &[TimesheetEntry]) -> Self {
        match self {
            StatusState::ManualOverride(_) => self,
            StatusState::Derived(_) => StatusState::derived_from(entries),
        }
    }

    pub fn status(&self) -> Status {
        (*self).into()
    }
}

impl From<Status> for StatusState {
    fn from(status: Status) -> Self {
        match status {
            Status::Completed => StatusState::Derived(DerivedStatus::Completed),
            Status::Incomplete => StatusState::Derived(DerivedStatus::Incomplete),
            Status::Missing => StatusState::Derived(DerivedStatus::Missing),
            Status::InDraft => StatusState::draft(),
        }
    }
}

impl From<StatusState> for Status {
    fn from(state: StatusState) -> Self {
        match state {
            StatusState::Derived(DerivedStatus::Completed) => Status::Completed,
            StatusState::Derived(DerivedStatus::Incomplete) => Status::Incomplete,
            StatusState::Derived(DerivedStatus::Missing) => Status::Missing,
            StatusState::ManualOverride(Override::Draft) => Status::InDraft,
        }
    }
}

impl fmt::Display for StatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.status().fmt(f)
    }
}

pub fn total_hours(entries: &[TimesheetEntry]) -> f64 {
    entries.iter().map(|e| e.hours).sum()
}

pub fn derive_from_hours(hours: f64) -> DerivedStatus {
    if hours <= 0.0 {
        DerivedStatus::Missing
    } else if hours < COMPLETED_HOURS {
        DerivedStatus::Incomplete
    } else {
        DerivedStatus::Completed
    }
}

/// Status of a week holding `entries`, given its current status if any
pub fn compute_status(entries: &[TimesheetEntry], current: Option<Status>) -> Status {
    match current {
        Some(Status::InDraft) => Status::InDraft,
        _ => StatusState::derived_from(entries).status(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entries(hours: &[f64]) -> Vec<TimesheetEntry> {
        hours
            .iter()
            .enumerate()
            .map(|(i, h)| TimesheetEntry {
                id: format!("entry-{}", i),
                date: NaiveDate::from_ymd_opt(2025, 9, 15).unwrap(),
                project_name: "Bug Fixes".to_string(),
                type_of_work: "Bug Fix".to_string(),
                task_description: "Sorting".to_string(),
                hours: *h,
            })
            .collect()
    }

    #[test]
    fn test_forty_hours_completes() {
        assert_eq!(compute_status(&entries(&[8.0; 5]), None), Status::Completed);
    }

    #[test]
    fn test_partial_week_incomplete() {
        assert_eq!(compute_status(&entries(&[6.0; 4]), None), Status::Incomplete);
        assert_eq!(compute_status(&entries(&[39.5]), None), Status::Incomplete);
    }

    #[test]
    fn test_no_entries_missing() {
        assert_eq!(compute_status(&[], None), Status::Missing);
        assert_eq!(compute_status(&[], Some(Status::Completed)), Status::Missing);
    }

    #[test]
    fn test_over_forty_completes() {
        assert_eq!(
            compute_status(&entries(&[24.0, 24.0]), Some(Status::Incomplete)),
            Status::Completed
        );
    }

    #[test]
    fn test_draft_is_sticky() {
        assert_eq!(compute_status(&entries(&[8.0; 5]), Some(Status::InDraft)), Status::InDraft);
        assert_eq!(compute_status(&[], Some(Status::InDraft)), Status::InDraft);

        let state = StatusState::draft().reconcile(&entries(&[40.0]));
        assert!(state.is_draft());
    }

    #[test]
    fn test_derived_state_follows_hours() {
        let state = StatusState::from(Status::Missing).reconcile(&entries(&[20.0, 20.0]));
        assert_eq!(state, StatusState::Derived(DerivedStatus::Completed));
    }

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(derive_from_hours(0.0), DerivedStatus::Missing);
        assert_eq!(derive_from_hours(0.5), DerivedStatus::Incomplete);
        assert_eq!(derive_from_hours(39.5), DerivedStatus::Incomplete);
        assert_eq!(derive_from_hours(40.0), DerivedStatus::Completed);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("COMPLETED".parse::<Status>().unwrap(), Status::Completed);
        assert_eq!("in draft".parse::<Status>().unwrap(), Status::InDraft);
        assert_eq!("in-draft".parse::<Status>().unwrap(), Status::InDraft);
        assert_eq!("Missing".parse::<Status>().unwrap(), Status::Missing);
        assert!("done".parse::<Status>().is_err());
    }

    #[test]
    fn test_status_serde_names() {
        assert_eq!(serde_json::to_string(&Status::InDraft).unwrap(), "\"IN DRAFT\"");
        let state: StatusState = serde_json::from_str("\"INCOMPLETE\"").unwrap();
        assert_eq!(state, StatusState::Derived(DerivedStatus::Incomplete));
    }
}
