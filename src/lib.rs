//! Timesheet state derivation and reconciliation
//!
//! Weekly timesheets hold dated work entries. Their status is derived from
//! the booked hours unless a user explicitly keeps them in draft. The
//! [`engine::Engine`] applies entry mutations to an immutable, versioned
//! snapshot of all timesheets, and [`session::Session`] confirms them against
//! a backend with rollback on failure.

pub mod cache;
pub mod calendar;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod filter;
pub mod logging;
pub mod model;
pub mod seed;
pub mod session;
pub mod status;
pub mod transport;
pub mod utils;
pub mod validate;

pub use calendar::WeekRange;
pub use engine::{Applied, Engine, Snapshot, Undo};
pub use error::{Result, TimesheetError};
pub use filter::{DateBucket, StatusFilter};
pub use model::{EntryPatch, NewEntry, Project, Timesheet, TimesheetEntry, WorkType};
pub use session::{AbandonHandle, AbandonSignal, Outcome, Session};
pub use status::{Status, StatusState};
pub use transport::{HttpTransport, MemoryTransport, TimesheetTransport};
