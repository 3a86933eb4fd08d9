//! Session module: concurrent pagination under operator control
//!
//! This module contains:
//! - Collected properties and the per-site property set
//! - Search terms validation
//! - Run states and the shared `PauseSignal`
//! - The `ProgressAnnouncer` heartbeat shown while paused
//! - Per-site workers and the orchestrator that drives them

mod announcer;
mod control;
mod orchestrator;
mod pause;
mod property;
mod state;
mod terms;
mod worker;

pub use announcer::{ProgressAnnouncer, PAUSED_NOTICE};
pub use control::ControlCommand;
pub use orchestrator::{Orchestrator, SessionSettings};
pub use pause::PauseSignal;
pub use property::{Property, PropertySet};
pub use state::{StopReason, WorkerState};
pub use terms::{SearchTerms, TermsError, DATE_FORMAT};
pub use worker::{Worker, WorkerHandle, WorkerOutcome, WorkerSettings};
