//! Timesheet data model as exchanged with the backend

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::WeekRange;
use crate::status::StatusState;

/// One unit of logged work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetEntry {
    pub id: String,
    pub date: NaiveDate,
    pub project_name: String,
    pub type_of_work: String,
    pub task_description: String,
    pub hours: f64,
}

impl TimesheetEntry {
    pub fn from_new(id: String, entry: NewEntry) -> Self {
        TimesheetEntry {
            id,
            date: entry.date,
            project_name: entry.project_name,
            type_of_work: entry.type_of_work,
            task_description: entry.task_description,
            hours: entry.hours,
        }
    }

    /// Returns a copy with the patch fields overriding the current ones
    pub fn merged(&self, patch: &EntryPatch) -> Self {
        TimesheetEntry {
            id: self.id.clone(),
            date: patch.date.unwrap_or(self.date),
            project_name: patch
                .project_name
                .clone()
                .unwrap_or_else(|| self.project_name.clone()),
            type_of_work: patch
                .type_of_work
                .clone()
                .unwrap_or_else(|| self.type_of_work.clone()),
            task_description: patch
                .task_description
                .clone()
                .unwrap_or_else(|| self.task_description.clone()),
            hours: patch.hours.unwrap_or(self.hours),
        }
    }

    /// The entry body without its id, as sent to the backend
    pub fn to_new(&self) -> NewEntry {
        NewEntry {
            date: self.date,
            project_name: self.project_name.clone(),
            type_of_work: self.type_of_work.clone(),
            task_description: self.task_description.clone(),
            hours: self.hours,
        }
    }
}

/// Payload for creating an entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub project_name: String,
    pub type_of_work: String,
    pub task_description: String,
    pub hours: f64,
    pub date: NaiveDate,
}

/// Partial update for an entry; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_of_work: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.project_name.is_none()
            && self.type_of_work.is_none()
            && self.task_description.is_none()
            && self.hours.is_none()
            && self.date.is_none()
    }
}

/// A single work week's record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timesheet {
    pub id: String,
    pub week_number: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: StatusState,
    #[serde(default)]
    pub entries: Vec<TimesheetEntry>,
}

impl Timesheet {
    pub fn range(&self) -> WeekRange {
        WeekRange::new(self.start_date, self.end_date)
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.range().contains(date)
    }

    pub fn total_hours(&self) -> f64 {
        self.entries.iter().map(|e| e.hours).sum()
    }

    pub fn find_entry(&self, entry_id: &str) -> Option<&TimesheetEntry> {
        self.entries.iter().find(|e| e.id == entry_id)
    }

    pub fn has_entry(&self, entry_id: &str) -> bool {
        self.find_entry(entry_id).is_some()
    }

    /// Entries grouped per day, days in calendar order
    pub fn entries_by_date(&self) -> BTreeMap<NaiveDate, Vec<&TimesheetEntry>> {
        let mut grouped: BTreeMap<NaiveDate, Vec<&TimesheetEntry>> = BTreeMap::new();
        for entry in &self.entries {
            grouped.entry(entry.date).or_default().push(entry);
        }
        grouped
    }
}

/// Catalog reference: a project an entry can be booked against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

/// Catalog reference: a kind of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkType {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(id: &str, day: u32, hours: f64) -> TimesheetEntry {
        TimesheetEntry {
            id: id.to_string(),
            date: date(2025, 9, day),
            project_name: "API Integration".to_string(),
            type_of_work: "Testing".to_string(),
            task_description: "Contract tests".to_string(),
            hours,
        }
    }

    #[test]
    fn test_merge_patch_overrides_only_given_fields() {
        let original = entry("entry-1", 15, 4.0);
        let patch = EntryPatch {
            hours: Some(6.5),
            task_description: Some("Fix flaky test".to_string()),
            ..Default::default()
        };

        let merged = original.merged(&patch);
        assert_eq!(merged.id, "entry-1");
        assert_eq!(merged.hours, 6.5);
        assert_eq!(merged.task_description, "Fix flaky test");
        assert_eq!(merged.project_name, "API Integration");
        assert_eq!(merged.date, original.date);
    }

    #[test]
    fn test_entries_by_date_groups_in_day_order() {
        let sheet = Timesheet {
            id: "timesheet-1".to_string(),
            week_number: 38,
            start_date: date(2025, 9, 15),
            end_date: date(2025, 9, 21),
            status: StatusState::from(Status::Incomplete),
            entries: vec![entry("a", 17, 2.0), entry("b", 15, 3.0), entry("c", 17, 1.0)],
        };

        let grouped = sheet.entries_by_date();
        let days: Vec<_> = grouped.keys().copied().collect();
        assert_eq!(days, vec![date(2025, 9, 15), date(2025, 9, 17)]);
        assert_eq!(grouped[&date(2025, 9, 17)].len(), 2);
        assert_eq!(sheet.total_hours(), 6.0);
    }

    #[test]
    fn test_timesheet_wire_format() {
        let json = r#"{
            "id": "timesheet-4",
            "weekNumber": 4,
            "startDate": "2025-08-11",
            "endDate": "2025-08-17",
            "status": "IN DRAFT",
            "entries": [{
                "id": "entry-4-0",
                "date": "2025-08-11",
                "projectName": "Homepage Development",
                "typeOfWork": "Bug Fix",
                "taskDescription": "Homepage Development",
                "hours": 6
            }]
        }"#;

        let sheet: Timesheet = serde_json::from_str(json).unwrap();
        assert_eq!(sheet.week_number, 4);
        assert!(sheet.status.is_draft());
        assert_eq!(sheet.entries[0].hours, 6.0);

        let back = serde_json::to_value(&sheet).unwrap();
        assert_eq!(back["status"], "IN DRAFT");
        assert_eq!(back["entries"][0]["typeOfWork"], "Bug Fix");
    }

    #[test]
    fn test_empty_patch() {
        assert!(EntryPatch::default().is_empty());
        let patch = EntryPatch {
            hours: Some(1.0),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
