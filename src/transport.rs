//! Backend round-trips
//!
//! [`TimesheetTransport`] is the async seam between the engine and whatever
//! stores timesheets. [`HttpTransport`] speaks the JSON API over `reqwest`;
//! [`MemoryTransport`] keeps everything in process, with optional latency
//! and failure injection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::model::{NewEntry, Project, Timesheet, TimesheetEntry, WorkType};
use crate::seed;

#[allow(async_fn_in_trait)]
pub trait TimesheetTransport {
    async fn fetch_timesheets(&self) -> Result<Vec<Timesheet>, TransportError>;

    async fn fetch_timesheet(&self, week_number: u32) -> Result<Option<Timesheet>, TransportError>;

    /// Stores a new entry in the week's timesheet; returns it with its id
    async fn create_entry(
        &self,
        week_number: u32,
        entry: &NewEntry,
    ) -> Result<TimesheetEntry, TransportError>;

    async fn update_entry(
        &self,
        entry_id: &str,
        entry: &NewEntry,
    ) -> Result<TimesheetEntry, TransportError>;

    async fn delete_entry(&self, entry_id: &str) -> Result<(), TransportError>;

    async fn fetch_projects(&self) -> Result<Vec<Project>, TransportError>;

    async fn fetch_work_types(&self) -> Result<Vec<WorkType>, TransportError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateEntryRequest<'a> {
    week_number: u32,
    entry: &'a NewEntry,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateEntryRequest<'a> {
    entry_id: &'a str,
    entry: &'a NewEntry,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteEntryRequest<'a> {
    entry_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct MutationResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    entry: Option<TimesheetEntry>,
}

impl MutationResponse {
    fn into_success(self) -> Result<Option<TimesheetEntry>, TransportError> {
        if self.success {
            if let Some(message) = &self.message {
                debug!(message = %message, "backend confirmed mutation");
            }
            Ok(self.entry)
        } else {
            let reason = self
                .error
                .or(self.message)
                .unwrap_or_else(|| "success flag not set".to_string());
            Err(TransportError::Rejected(reason))
        }
    }

    fn into_entry(self) -> Result<TimesheetEntry, TransportError> {
        self.into_success()?
            .ok_or_else(|| TransportError::InvalidResponse("response has no entry".to_string()))
    }
}

/// JSON API client
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        HttpTransport {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TransportError> {
        let response = request
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    TransportError::ConnectionFailed(e.to_string())
                } else {
                    TransportError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = status.as_u16(), "timesheet API returned an error");
            return Err(TransportError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| TransportError::InvalidResponse(format!("{}: {}", e, preview(&text))))
    }
}

fn preview(text: &str) -> String {
    if text.len() > 200 {
        let cut: String = text.chars().take(200).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

impl TimesheetTransport for HttpTransport {
    async fn fetch_timesheets(&self) -> Result<Vec<Timesheet>, TransportError> {
        debug!(url = %self.url("/api/timesheets"), "fetching timesheets");
        self.send(self.client.get(self.url("/api/timesheets"))).await
    }

    async fn fetch_timesheet(&self, week_number: u32) -> Result<Option<Timesheet>, TransportError> {
        let request = self
            .client
            .get(self.url("/api/timesheets"))
            .query(&[("weekNumber", week_number)]);
        self.send(request).await
    }

    async fn create_entry(
        &self,
        week_number: u32,
        entry: &NewEntry,
    ) -> Result<TimesheetEntry, TransportError> {
        let body = CreateEntryRequest { week_number, entry };
        let response: MutationResponse = self
            .send(self.client.post(self.url("/api/timesheets")).json(&body))
            .await?;
        response.into_entry()
    }

    async fn update_entry(
        &self,
        entry_id: &str,
        entry: &NewEntry,
    ) -> Result<TimesheetEntry, TransportError> {
        let body = UpdateEntryRequest { entry_id, entry };
        let response: MutationResponse = self
            .send(self.client.put(self.url("/api/timesheets")).json(&body))
            .await?;
        response.into_entry()
    }

    async fn delete_entry(&self, entry_id: &str) -> Result<(), TransportError> {
        let body = DeleteEntryRequest { entry_id };
        let response: MutationResponse = self
            .send(self.client.delete(self.url("/api/timesheets")).json(&body))
            .await?;
        response.into_success().map(|_| ())
    }

    async fn fetch_projects(&self) -> Result<Vec<Project>, TransportError> {
        self.send(self.client.get(self.url("/api/projects"))).await
    }

    async fn fetch_work_types(&self) -> Result<Vec<WorkType>, TransportError> {
        self.send(self.client.get(self.url("/api/work-types"))).await
    }
}

#[derive(Debug, Default)]
struct MemoryStore {
    timesheets: Vec<Timesheet>,
    projects: Vec<Project>,
    work_types: Vec<WorkType>,
    next_id: u64,
    fail_next: Option<String>,
}

/// In-process backend
#[derive(Debug, Default)]
pub struct MemoryTransport {
    store: Mutex<MemoryStore>,
    latency: Option<Duration>,
    requests: AtomicUsize,
}

impl MemoryTransport {
    pub fn new(timesheets: Vec<Timesheet>, projects: Vec<Project>, work_types: Vec<WorkType>) -> Self {
        MemoryTransport {
            store: Mutex::new(MemoryStore {
                timesheets,
                projects,
                work_types,
                next_id: 1,
                fail_next: None,
            }),
            latency: None,
            requests: AtomicUsize::new(0),
        }
    }

    /// Seeded with the demo weeks as of `today`
    pub fn demo(today: NaiveDate) -> Self {
        MemoryTransport::new(
            seed::demo_timesheets(today),
            seed::demo_projects(),
            seed::demo_work_types(),
        )
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes the next request fail with `reason`
    pub fn fail_next_request(&self, reason: &str) {
        self.lock().fail_next = Some(reason.to_string());
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    /// What the backend currently holds
    pub fn stored_timesheets(&self) -> Vec<Timesheet> {
        self.lock().timesheets.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryStore> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Waits out the configured latency, then takes the store unless a
    /// failure was injected
    async fn begin(&self) -> Result<MutexGuard<'_, MemoryStore>, TransportError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let mut store = self.lock();
        match store.fail_next.take() {
            Some(reason) => Err(TransportError::ConnectionFailed(reason)),
            None => Ok(store),
        }
    }
}

impl TimesheetTransport for MemoryTransport {
    async fn fetch_timesheets(&self) -> Result<Vec<Timesheet>, TransportError> {
        Ok(self.begin().await?.timesheets.clone())
    }

    async fn fetch_timesheet(&self, week_number: u32) -> Result<Option<Timesheet>, TransportError> {
        let store = self.begin().await?;
        Ok(store
            .timesheets
            .iter()
            .find(|ts| ts.week_number == week_number)
            .cloned())
    }

    async fn create_entry(
        &self,
        week_number: u32,
        entry: &NewEntry,
    ) -> Result<TimesheetEntry, TransportError> {
        let mut store = self.begin().await?;
        let id = format!("entry-srv-{}", store.next_id);
        store.next_id += 1;

        let sheet = store
            .timesheets
            .iter_mut()
            .find(|ts| ts.week_number == week_number)
            .ok_or_else(|| TransportError::Rejected(format!("no timesheet for week {}", week_number)))?;
        let created = TimesheetEntry::from_new(id, entry.clone());
        sheet.entries.push(created.clone());
        sheet.status = sheet.status.reconcile(&sheet.entries);
        Ok(created)
    }

    async fn update_entry(
        &self,
        entry_id: &str,
        entry: &NewEntry,
    ) -> Result<TimesheetEntry, TransportError> {
        let mut store = self.begin().await?;
        let updated = TimesheetEntry::from_new(entry_id.to_string(), entry.clone());

        let sheet = store
            .timesheets
            .iter_mut()
            .find(|ts| ts.has_entry(entry_id))
            .ok_or_else(|| TransportError::Rejected(format!("unknown entry {}", entry_id)))?;
        if let Some(slot) = sheet.entries.iter_mut().find(|e| e.id == entry_id) {
            *slot = updated.clone();
        }
        sheet.status = sheet.status.reconcile(&sheet.entries);
        Ok(updated)
    }

    async fn delete_entry(&self, entry_id: &str) -> Result<(), TransportError> {
        let mut store = self.begin().await?;
        for sheet in store.timesheets.iter_mut() {
            let before = sheet.entries.len();
            sheet.entries.retain(|e| e.id != entry_id);
            if sheet.entries.len() != before {
                sheet.status = sheet.status.reconcile(&sheet.entries);
            }
        }
        Ok(())
    }

    async fn fetch_projects(&self) -> Result<Vec<Project>, TransportError> {
        Ok(self.begin().await?.projects.clone())
    }

    async fn fetch_work_types(&self) -> Result<Vec<WorkType>, TransportError> {
        Ok(self.begin().await?.work_types.clone())
    }
}
