//! Optimistic sync between the engine and a backend
//!
//! Each mutation is applied to the engine first, so callers see the change
//! immediately, and then confirmed through the transport. A failed
//! confirmation reverts the local change. A confirmation the caller abandons
//! (for example because the edit form was closed) is never applied; the
//! optimistic state stays and the session asks for a refresh instead.

use std::future::Future;

use chrono::NaiveDate;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::cache::CatalogCache;
use crate::engine::{Applied, Engine, Snapshot};
use crate::error::{NotFoundError, Result, TransportError};
use crate::filter::{filter_timesheets, DateBucket, StatusFilter};
use crate::model::{EntryPatch, NewEntry, Project, Timesheet, WorkType};
use crate::transport::TimesheetTransport;

/// Caller side of an abandonable confirmation
#[derive(Debug)]
pub struct AbandonHandle(Option<oneshot::Sender<()>>);

impl AbandonHandle {
    /// Stops waiting for the paired confirmation
    pub fn abandon(mut self) {
        if let Some(sender) = self.0.take() {
            let _ = sender.send(());
        }
    }
}

/// Session side of an abandonable confirmation.
///
/// Dropping the [`AbandonHandle`] without calling `abandon` does not count
/// as abandoning.
#[derive(Debug)]
pub struct AbandonSignal(Option<oneshot::Receiver<()>>);

impl AbandonSignal {
    pub fn pair() -> (AbandonHandle, AbandonSignal) {
        let (sender, receiver) = oneshot::channel();
        (AbandonHandle(Some(sender)), AbandonSignal(Some(receiver)))
    }

    pub fn never() -> Self {
        AbandonSignal(None)
    }

    async fn abandoned(self) {
        match self.0 {
            Some(receiver) => {
                if receiver.await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
            None => std::future::pending::<()>().await,
        }
    }
}

/// How a mutation ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The backend accepted it; the timesheet reflects the backend's answer
    Confirmed(Timesheet),
    /// The caller stopped waiting; the timesheet is the optimistic state
    Abandoned(Timesheet),
}

impl Outcome {
    pub fn timesheet(&self) -> &Timesheet {
        match self {
            Outcome::Confirmed(ts) | Outcome::Abandoned(ts) => ts,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Outcome::Confirmed(_))
    }
}

/// Projects and work types offered when editing entries
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub projects: Vec<Project>,
    pub work_types: Vec<WorkType>,
}

pub struct Session<T> {
    engine: Engine,
    transport: T,
    needs_refresh: bool,
}

/// Runs the round-trip unless the caller abandons first
async fn race<F: Future>(abandon: AbandonSignal, round_trip: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = abandon.abandoned() => None,
        output = round_trip => Some(output),
    }
}

impl<T: TimesheetTransport> Session<T> {
    pub fn new(transport: T) -> Self {
        Session {
            engine: Engine::default(),
            transport,
            needs_refresh: true,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn snapshot(&self) -> Snapshot {
        self.engine.snapshot()
    }

    /// True until the first refresh, and after an abandoned confirmation
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    /// Replaces local state with the backend's
    pub async fn refresh(&mut self) -> Result<Snapshot> {
        let timesheets = self.transport.fetch_timesheets().await?;
        info!(count = timesheets.len(), "fetched timesheets");
        self.needs_refresh = false;
        Ok(self.engine.replace_all(timesheets))
    }

    /// Re-fetches a single week
    pub async fn refresh_week(&mut self, week_number: u32) -> Result<Timesheet> {
        match self.transport.fetch_timesheet(week_number).await? {
            Some(timesheet) => Ok(self.engine.upsert_timesheet(timesheet)),
            None => Err(NotFoundError::Week(week_number).into()),
        }
    }

    pub fn filtered(
        &self,
        status: StatusFilter,
        bucket: DateBucket,
        today: NaiveDate,
    ) -> Vec<Timesheet> {
        filter_timesheets(self.engine.timesheets(), status, bucket, today)
    }

    pub async fn create_entry(
        &mut self,
        timesheet_id: &str,
        entry: NewEntry,
        abandon: AbandonSignal,
    ) -> Result<Outcome> {
        let applied = self.engine.create_entry(timesheet_id, entry.clone())?;
        let local_id = applied
            .created_entry_id()
            .map(str::to_string)
            .ok_or_else(|| NotFoundError::Timesheet(timesheet_id.to_string()))?;
        let week_number = applied.timesheet.week_number;

        let result = race(abandon, self.transport.create_entry(week_number, &entry)).await;
        match result {
            None => Ok(self.abandoned(applied)),
            Some(Err(err)) => self.roll_back(applied, err),
            Some(Ok(confirmed)) => {
                debug!(local_id = %local_id, remote_id = %confirmed.id, "create confirmed");
                let timesheet = self.engine.adopt_confirmed(&local_id, confirmed)?;
                Ok(Outcome::Confirmed(timesheet))
            }
        }
    }

    pub async fn update_entry(
        &mut self,
        timesheet_id: &str,
        entry_id: &str,
        patch: &EntryPatch,
        abandon: AbandonSignal,
    ) -> Result<Outcome> {
        let applied = self.engine.update_entry(timesheet_id, entry_id, patch)?;
        let body = applied
            .timesheet
            .find_entry(entry_id)
            .map(|e| e.to_new())
            .ok_or_else(|| NotFoundError::Entry(entry_id.to_string()))?;

        let result = race(abandon, self.transport.update_entry(entry_id, &body)).await;
        match result {
            None => Ok(self.abandoned(applied)),
            Some(Err(err)) => self.roll_back(applied, err),
            Some(Ok(confirmed)) => {
                let timesheet = self.engine.adopt_confirmed(entry_id, confirmed)?;
                Ok(Outcome::Confirmed(timesheet))
            }
        }
    }

    pub async fn delete_entry(&mut self, entry_id: &str, abandon: AbandonSignal) -> Result<Outcome> {
        let applied = self.engine.delete_entry(entry_id)?;

        let result = race(abandon, self.transport.delete_entry(entry_id)).await;
        match result {
            None => Ok(self.abandoned(applied)),
            Some(Err(err)) => self.roll_back(applied, err),
            Some(Ok(())) => Ok(Outcome::Confirmed(self.current(&applied))),
        }
    }

    pub fn mark_draft(&mut self, timesheet_id: &str) -> Result<Timesheet> {
        Ok(self.engine.mark_draft(timesheet_id)?.timesheet)
    }

    pub fn clear_draft(&mut self, timesheet_id: &str) -> Result<Timesheet> {
        Ok(self.engine.clear_draft(timesheet_id)?.timesheet)
    }

    /// Catalog from `cache` when fresh enough, otherwise from the backend
    pub async fn catalog(&self, cache: &mut CatalogCache, max_age_hours: i64) -> Result<Catalog> {
        if !cache.is_empty() && !cache.is_stale(max_age_hours) {
            debug!("using cached catalog");
            return Ok(Catalog {
                projects: cache.projects.clone(),
                work_types: cache.work_types.clone(),
            });
        }

        let projects = self.transport.fetch_projects().await?;
        let work_types = self.transport.fetch_work_types().await?;
        cache.update(projects.clone(), work_types.clone());
        Ok(Catalog {
            projects,
            work_types,
        })
    }

    fn current(&self, applied: &Applied) -> Timesheet {
        self.engine
            .timesheet(&applied.timesheet.id)
            .cloned()
            .unwrap_or_else(|| applied.timesheet.clone())
    }

    fn abandoned(&mut self, applied: Applied) -> Outcome {
        info!(timesheet_id = %applied.timesheet.id, "confirmation abandoned");
        self.needs_refresh = true;
        Outcome::Abandoned(self.current(&applied))
    }

    fn roll_back(&mut self, applied: Applied, err: TransportError) -> Result<Outcome> {
        warn!(timesheet_id = %applied.timesheet.id, error = %err, "confirmation failed");
        if let Err(revert_err) = self.engine.revert(applied.undo) {
            warn!(error = %revert_err, "revert failed, state needs a refresh");
            self.needs_refresh = true;
        }
        Err(err.into())
    }
}
