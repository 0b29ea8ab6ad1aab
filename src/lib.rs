//! Data-driven E2E harness for the clinic add-patient workflow
//!
//! Loads patient rows from a spreadsheet, authenticates one shared browser
//! session, and drives the intake form once per row, asserting the app's
//! success messages along the way.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Runner                            │
//! │   credentials ──► fixture rows ──► shared Session        │
//! ├──────────────────────────────────────────────────────────┤
//! │  fixtures: xlsx rows ──► PatientRecord (header ► value)  │
//! │  session:  launch ► login ► landmark ► page              │
//! │  intake:   per-record form fill ► submit ► assertions    │
//! │  dom:      fill / click / select / wait, all bounded     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use patient_intake_e2e::Runner;
//!
//! # async fn example() -> patient_intake_e2e::Result<()> {
//! let runner = Runner::new("patient_details.xlsx");
//! let report = runner.run().await?;
//! assert_eq!(report.failed, 0);
//! # Ok(())
//! # }
//! ```
//!
//! Outcome classes mirror how the run is triaged: missing credentials abort
//! before a browser launches, a missing spreadsheet skips the run, a record
//! without required names skips its case, and a selector timeout or text
//! mismatch fails only that case.

pub mod config;
pub mod dom;
pub mod error;
pub mod fixtures;
pub mod intake;
pub mod runner;
pub mod selectors;
pub mod session;

pub use config::{Credentials, FormDefaults, SessionConfig};
pub use error::{HarnessError, Result};
pub use fixtures::{load_patients, PatientRecord};
pub use runner::{CaseResult, CaseStatus, RunReport, Runner};
pub use session::Session;
