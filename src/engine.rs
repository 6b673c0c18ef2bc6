//! Entry reconciliation engine
//!
//! The engine is the only writer of timesheet state. It keeps the timesheets
//! in a versioned, copy-on-write [`Snapshot`]: every successful mutation
//! installs a new snapshot with a higher version, and snapshots handed out
//! earlier never change. A failed mutation leaves the current snapshot as it
//! was.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::{NotFoundError, Result};
use crate::model::{EntryPatch, NewEntry, Timesheet, TimesheetEntry};
use crate::status::StatusState;
use crate::validate::{validate_entry, validate_new_entry};

static NEXT_ENTRY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Immutable view of all timesheets at one version
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    version: u64,
    timesheets: Arc<Vec<Timesheet>>,
}

impl Snapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn timesheets(&self) -> &[Timesheet] {
        &self.timesheets
    }

    pub fn len(&self) -> usize {
        self.timesheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timesheets.is_empty()
    }

    pub fn find(&self, timesheet_id: &str) -> Option<&Timesheet> {
        self.timesheets.iter().find(|ts| ts.id == timesheet_id)
    }

    /// First timesheet with the given week number
    pub fn find_by_week(&self, week_number: u32) -> Option<&Timesheet> {
        self.timesheets.iter().find(|ts| ts.week_number == week_number)
    }

    /// Timesheet owning the entry
    pub fn owner_of(&self, entry_id: &str) -> Option<&Timesheet> {
        self.timesheets.iter().find(|ts| ts.has_entry(entry_id))
    }

    pub fn contains_entry(&self, entry_id: &str) -> bool {
        self.owner_of(entry_id).is_some()
    }

    fn position(&self, timesheet_id: &str) -> Result<usize> {
        self.timesheets
            .iter()
            .position(|ts| ts.id == timesheet_id)
            .ok_or_else(|| NotFoundError::Timesheet(timesheet_id.to_string()).into())
    }
}

/// How to take back one applied mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Undo {
    RemoveCreated {
        timesheet_id: String,
        entry_id: String,
    },
    RestoreEntry {
        timesheet_id: String,
        previous: TimesheetEntry,
    },
    ReinsertDeleted {
        timesheet_id: String,
        index: usize,
        entry: TimesheetEntry,
    },
    RestoreStatus {
        timesheet_id: String,
        previous: StatusState,
    },
}

impl Undo {
    pub fn timesheet_id(&self) -> &str {
        match self {
            Undo::RemoveCreated { timesheet_id, .. }
            | Undo::RestoreEntry { timesheet_id, .. }
            | Undo::ReinsertDeleted { timesheet_id, .. }
            | Undo::RestoreStatus { timesheet_id, .. } => timesheet_id,
        }
    }
}

/// A committed mutation: the replacement timesheet and its inverse
#[derive(Debug, Clone)]
pub struct Applied {
    pub timesheet: Timesheet,
    pub undo: Undo,
    pub version: u64,
}

impl Applied {
    /// Id of the entry a create added
    pub fn created_entry_id(&self) -> Option<&str> {
        match &self.undo {
            Undo::RemoveCreated { entry_id, .. } => Some(entry_id),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Engine {
    snapshot: Snapshot,
}

impl Engine {
    pub fn new(timesheets: Vec<Timesheet>) -> Self {
        let mut engine = Engine::default();
        engine.replace_all(timesheets);
        engine
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.clone()
    }

    pub fn timesheets(&self) -> &[Timesheet] {
        self.snapshot.timesheets()
    }

    pub fn version(&self) -> u64 {
        self.snapshot.version
    }

    pub fn timesheet(&self, timesheet_id: &str) -> Option<&Timesheet> {
        self.snapshot.find(timesheet_id)
    }

    pub fn timesheet_by_week(&self, week_number: u32) -> Option<&Timesheet> {
        self.snapshot.find_by_week(week_number)
    }

    /// Installs canonical state, e.g. after a re-fetch.
    ///
    /// Derived statuses that disagree with their entries are corrected.
    pub fn replace_all(&mut self, timesheets: Vec<Timesheet>) -> Snapshot {
        let timesheets: Vec<Timesheet> = timesheets.into_iter().map(normalized).collect();
        self.snapshot = Snapshot {
            version: self.snapshot.version + 1,
            timesheets: Arc::new(timesheets),
        };
        debug!(
            version = self.snapshot.version,
            count = self.snapshot.len(),
            "installed timesheets"
        );
        self.snapshot()
    }

    /// Replaces the timesheet with the same id, or appends it
    pub fn upsert_timesheet(&mut self, timesheet: Timesheet) -> Timesheet {
        let timesheet = normalized(timesheet);
        let index = self.snapshot.position(&timesheet.id).ok();
        let sheets = Arc::make_mut(&mut self.snapshot.timesheets);
        match index {
            Some(index) => sheets[index] = timesheet.clone(),
            None => sheets.push(timesheet.clone()),
        }
        self.snapshot.version += 1;
        timesheet
    }

    /// Appends a new entry to a timesheet and recomputes its status
    pub fn create_entry(&mut self, timesheet_id: &str, entry: NewEntry) -> Result<Applied> {
        let index = self.snapshot.position(timesheet_id)?;
        let current = &self.snapshot.timesheets[index];
        validate_new_entry(&entry, &current.range())?;

        let entry_id = self.next_entry_id();
        let mut updated = current.clone();
        updated
            .entries
            .push(TimesheetEntry::from_new(entry_id.clone(), entry));

        debug!(timesheet_id, entry_id = %entry_id, "created entry");
        let undo = Undo::RemoveCreated {
            timesheet_id: timesheet_id.to_string(),
            entry_id,
        };
        Ok(self.commit(index, updated, undo))
    }

    /// Merges `patch` into an existing entry and recomputes status
    pub fn update_entry(
        &mut self,
        timesheet_id: &str,
        entry_id: &str,
        patch: &EntryPatch,
    ) -> Result<Applied> {
        let index = self.snapshot.position(timesheet_id)?;
        let current = &self.snapshot.timesheets[index];
        let position = current
            .entries
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or_else(|| NotFoundError::EntryInTimesheet {
                timesheet_id: timesheet_id.to_string(),
                entry_id: entry_id.to_string(),
            })?;

        let previous = current.entries[position].clone();
        let merged = previous.merged(patch);
        validate_entry(&merged, &current.range())?;

        let mut updated = current.clone();
        updated.entries[position] = merged;

        debug!(timesheet_id, entry_id, "updated entry");
        let undo = Undo::RestoreEntry {
            timesheet_id: timesheet_id.to_string(),
            previous,
        };
        Ok(self.commit(index, updated, undo))
    }

    /// Removes an entry from whichever timesheet holds it
    pub fn delete_entry(&mut self, entry_id: &str) -> Result<Applied> {
        let located = self
            .snapshot
            .timesheets
            .iter()
            .enumerate()
            .find_map(|(i, ts)| {
                ts.entries
                    .iter()
                    .position(|e| e.id == entry_id)
                    .map(|p| (i, p))
            });
        let Some((index, position)) = located else {
            debug!(entry_id, "delete of unknown entry ignored");
            return Err(NotFoundError::Entry(entry_id.to_string()).into());
        };

        let mut updated = self.snapshot.timesheets[index].clone();
        let removed = updated.entries.remove(position);

        debug!(timesheet_id = %updated.id, entry_id, "deleted entry");
        let undo = Undo::ReinsertDeleted {
            timesheet_id: updated.id.clone(),
            index: position,
            entry: removed,
        };
        Ok(self.commit(index, updated, undo))
    }

    /// Puts a timesheet into the manual draft state
    pub fn mark_draft(&mut self, timesheet_id: &str) -> Result<Applied> {
        self.set_status(timesheet_id, StatusState::draft())
    }

    /// Leaves the draft state; status is derived from hours again
    pub fn clear_draft(&mut self, timesheet_id: &str) -> Result<Applied> {
        let index = self.snapshot.position(timesheet_id)?;
        let derived = StatusState::derived_from(&self.snapshot.timesheets[index].entries);
        self.set_status(timesheet_id, derived)
    }

    /// Applies the inverse of an earlier mutation to its timesheet only.
    ///
    /// Parts of the undo that no longer apply (the entry was already removed,
    /// or already re-inserted) are skipped.
    pub fn revert(&mut self, undo: Undo) -> Result<Timesheet> {
        let index = self.snapshot.position(undo.timesheet_id())?;
        let mut updated = self.snapshot.timesheets[index].clone();

        match &undo {
            Undo::RemoveCreated { entry_id, .. } => {
                updated.entries.retain(|e| &e.id != entry_id);
            }
            Undo::RestoreEntry { previous, .. } => {
                if let Some(slot) = updated.entries.iter_mut().find(|e| e.id == previous.id) {
                    *slot = previous.clone();
                }
            }
            Undo::ReinsertDeleted { index: at, entry, .. } => {
                if !updated.has_entry(&entry.id) {
                    let at = (*at).min(updated.entries.len());
                    updated.entries.insert(at, entry.clone());
                }
            }
            Undo::RestoreStatus { previous, .. } => {
                updated.status = *previous;
            }
        }

        warn!(timesheet_id = %updated.id, ?undo, "reverted mutation");
        Ok(self.commit(index, updated, undo).timesheet)
    }

    /// Replaces a locally created entry with the backend's confirmed copy,
    /// adopting the backend id unless another entry already holds it.
    pub fn adopt_confirmed(
        &mut self,
        local_id: &str,
        confirmed: TimesheetEntry,
    ) -> Result<Timesheet> {
        let located = self
            .snapshot
            .timesheets
            .iter()
            .enumerate()
            .find_map(|(i, ts)| {
                ts.entries
                    .iter()
                    .position(|e| e.id == local_id)
                    .map(|p| (i, p))
            });
        let Some((index, position)) = located else {
            return Err(NotFoundError::Entry(local_id.to_string()).into());
        };

        let current = &self.snapshot.timesheets[index];
        let mut confirmed = confirmed;
        if let Err(err) = validate_entry(&confirmed, &current.range()) {
            warn!(local_id, error = %err, "confirmed entry is invalid, keeping local fields");
            confirmed = TimesheetEntry {
                id: confirmed.id,
                ..current.entries[position].clone()
            };
        }
        if confirmed.id != local_id && self.snapshot.contains_entry(&confirmed.id) {
            warn!(
                local_id,
                remote_id = %confirmed.id,
                "confirmed id already in use, keeping local id"
            );
            confirmed.id = local_id.to_string();
        }

        let mut updated = self.snapshot.timesheets[index].clone();
        updated.entries[position] = confirmed;
        let undo = Undo::RemoveCreated {
            timesheet_id: updated.id.clone(),
            entry_id: updated.entries[position].id.clone(),
        };
        Ok(self.commit(index, updated, undo).timesheet)
    }

    fn set_status(&mut self, timesheet_id: &str, status: StatusState) -> Result<Applied> {
        let index = self.snapshot.position(timesheet_id)?;
        let mut updated = self.snapshot.timesheets[index].clone();
        let previous = updated.status;
        updated.status = status;

        debug!(timesheet_id, from = %previous, to = %status, "status changed");
        let undo = Undo::RestoreStatus {
            timesheet_id: timesheet_id.to_string(),
            previous,
        };
        Ok(self.commit_status(index, updated, undo))
    }

    /// Recomputes status from the new entries and installs the timesheet
    fn commit(&mut self, index: usize, mut updated: Timesheet, undo: Undo) -> Applied {
        updated.status = updated.status.reconcile(&updated.entries);
        self.commit_status(index, updated, undo)
    }

    fn commit_status(&mut self, index: usize, updated: Timesheet, undo: Undo) -> Applied {
        Arc::make_mut(&mut self.snapshot.timesheets)[index] = updated.clone();
        self.snapshot.version += 1;
        Applied {
            timesheet: updated,
            undo,
            version: self.snapshot.version,
        }
    }

    fn next_entry_id(&self) -> String {
        loop {
            let sequence = NEXT_ENTRY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
            let id = format!("entry-{}-{}", Utc::now().timestamp_millis(), sequence);
            if !self.snapshot.contains_entry(&id) {
                return id;
            }
        }
    }
}

fn normalized(mut timesheet: Timesheet) -> Timesheet {
    let reconciled = timesheet.status.reconcile(&timesheet.entries);
    if reconciled != timesheet.status {
        warn!(
            timesheet_id = %timesheet.id,
            reported = %timesheet.status,
            derived = %reconciled,
            "status disagrees with entries, using derived status"
        );
        timesheet.status = reconciled;
    }
    timesheet
}
