//! Data-driven run loop: one case per spreadsheet row
//!
//! The runner resolves credentials, loads the fixture, launches the single
//! shared session, and walks the records strictly sequentially. A failed
//! case is recorded and the loop moves on against the same session; only
//! configuration problems abort the run, and a missing fixture skips it
//! entirely.

use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::{Credentials, FormDefaults, SessionConfig};
use crate::error::{HarnessError, Result};
use crate::fixtures::{load_patients, PatientRecord};
use crate::intake;
use crate::session::Session;

/// Outcome of a single record's case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Passed,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    /// Label such as `"row 3: Jane Doe"`.
    pub name: String,
    pub status: CaseStatus,
    /// Skip reason or failure message.
    pub detail: Option<String>,
    pub duration_ms: u64,
}

/// Report for a whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Set when the run never started (missing fixture file); distinct from
    /// any case failing.
    pub skipped_run: Option<String>,
    pub started_at: String,
    pub duration_ms: u64,
    pub cases: Vec<CaseResult>,
}

impl RunReport {
    fn skipped_run(reason: String, started_at: String, duration_ms: u64) -> Self {
        Self {
            total: 0,
            passed: 0,
            failed: 0,
            skipped: 0,
            skipped_run: Some(reason),
            started_at,
            duration_ms,
            cases: Vec::new(),
        }
    }
}

/// A planned case: either a record to drive through the form, or a skip with
/// its reason.
#[derive(Debug, Clone)]
pub enum Case {
    Run { name: String, record: PatientRecord },
    Skip { name: String, reason: String },
}

/// Classify records into runnable and skipped cases. Pure; no browser
/// involved. Case names carry the spreadsheet row number (data starts at
/// row 2).
pub fn plan_cases(records: Vec<PatientRecord>) -> Vec<Case> {
    records
        .into_iter()
        .enumerate()
        .map(|(offset, record)| {
            let name = format!("row {}: {}", offset + 2, record.display_name());
            if record.has_required_names() {
                Case::Run { name, record }
            } else {
                Case::Skip {
                    name,
                    reason: "missing Firstname or Lastname".to_string(),
                }
            }
        })
        .collect()
}

/// Drives a full run: fixture in, report out.
pub struct Runner {
    pub fixture_path: PathBuf,
    pub session_config: SessionConfig,
    pub defaults: FormDefaults,
    /// Pre-resolved credentials; `None` resolves from the environment and
    /// fallback file at run time.
    pub credentials: Option<Credentials>,
}

impl Runner {
    pub fn new(fixture_path: impl Into<PathBuf>) -> Self {
        Self {
            fixture_path: fixture_path.into(),
            session_config: SessionConfig::from_env(),
            defaults: FormDefaults::default(),
            credentials: None,
        }
    }

    /// Execute every case against one shared session.
    ///
    /// Errors returned here are fatal configuration or session-setup
    /// problems. Per-case failures never propagate; they land in the report.
    pub async fn run(&self) -> Result<RunReport> {
        let started_at = chrono::Utc::now().to_rfc3339();
        let run_start = Instant::now();

        // fatal before any browser launches
        let credentials = match &self.credentials {
            Some(creds) => creds.clone(),
            None => Credentials::resolve()?,
        };

        let records = match load_patients(&self.fixture_path) {
            Ok(records) => records,
            Err(HarnessError::FixtureMissing(path)) => {
                warn!(fixture = %path, "fixture missing, skipping run");
                return Ok(RunReport::skipped_run(
                    format!("fixture spreadsheet not found: {path}"),
                    started_at,
                    run_start.elapsed().as_millis() as u64,
                ));
            }
            Err(e) => return Err(e),
        };

        let cases = plan_cases(records);
        info!(total = cases.len(), "planned cases");

        let session = Session::launch(self.session_config.clone(), &credentials).await?;
        let mut results = Vec::with_capacity(cases.len());

        for case in cases {
            match case {
                Case::Skip { name, reason } => {
                    warn!(case = %name, %reason, "skipped");
                    results.push(CaseResult {
                        name,
                        status: CaseStatus::Skipped,
                        detail: Some(reason),
                        duration_ms: 0,
                    });
                }
                Case::Run { name, record } => {
                    let case_start = Instant::now();
                    let result =
                        intake::submit_patient(&session.dom(), &record, &self.defaults).await;
                    let duration_ms = case_start.elapsed().as_millis() as u64;
                    match result {
                        Ok(()) => {
                            info!(case = %name, duration_ms, "passed");
                            results.push(CaseResult {
                                name,
                                status: CaseStatus::Passed,
                                detail: None,
                                duration_ms,
                            });
                        }
                        Err(e) => {
                            // the shared page may now be anywhere; the next
                            // case runs against it regardless
                            error!(case = %name, error = %e, "failed");
                            results.push(CaseResult {
                                name,
                                status: CaseStatus::Failed,
                                detail: Some(e.to_string()),
                                duration_ms,
                            });
                        }
                    }
                }
            }
        }

        session.close().await?;

        let passed = results
            .iter()
            .filter(|r| r.status == CaseStatus::Passed)
            .count();
        let failed = results
            .iter()
            .filter(|r| r.status == CaseStatus::Failed)
            .count();
        let skipped = results
            .iter()
            .filter(|r| r.status == CaseStatus::Skipped)
            .count();

        let report = RunReport {
            total: results.len(),
            passed,
            failed,
            skipped,
            skipped_run: None,
            started_at,
            duration_ms: run_start.elapsed().as_millis() as u64,
            cases: results,
        };
        info!(
            total = report.total,
            passed = report.passed,
            failed = report.failed,
            skipped = report.skipped,
            "run complete"
        );
        Ok(report)
    }
}
