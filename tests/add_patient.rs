//! Live add-patient run against the clinic app
//!
//! Requires Chrome, a reachable target app, credentials (environment or
//! `credentials.txt`), and a fixture spreadsheet (`PATIENT_FIXTURE`, default
//! `patient_details.xlsx`). Any missing prerequisite skips the test with a
//! message instead of failing it.
//!
//! Run with: cargo test --test add_patient -- --nocapture

#[path = "common/env.rs"]
mod env;

use std::path::Path;

use patient_intake_e2e::{Credentials, Runner, SessionConfig};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[tokio::test]
async fn add_patients_from_spreadsheet() {
    init_logging();
    skip_if_no_browser!();

    let session_config = SessionConfig::from_env();
    require_app!(&session_config.login_url);

    let Ok(credentials) = Credentials::resolve() else {
        eprintln!("Skipping: no credentials in environment or credentials.txt");
        return;
    };

    let fixture =
        std::env::var("PATIENT_FIXTURE").unwrap_or_else(|_| "patient_details.xlsx".to_string());
    if !Path::new(&fixture).exists() {
        eprintln!("Skipping: fixture spreadsheet {fixture} not found");
        return;
    }

    let mut runner = Runner::new(fixture);
    runner.session_config = session_config;
    runner.credentials = Some(credentials);

    let report = runner.run().await.expect("run should complete");
    eprintln!(
        "intake report: {}",
        serde_json::to_string_pretty(&report).expect("report serializes")
    );

    assert!(report.skipped_run.is_none());
    assert!(report.total > 0, "fixture produced no cases");
    let failures: Vec<_> = report
        .cases
        .iter()
        .filter(|c| c.status == patient_intake_e2e::CaseStatus::Failed)
        .collect();
    assert!(failures.is_empty(), "failed cases: {failures:#?}");
}

// No browser involved: the fixture check runs before the session launches.
#[tokio::test]
async fn missing_fixture_skips_the_whole_run() {
    init_logging();

    let mut runner = Runner::new("/nonexistent/patients.xlsx");
    runner.credentials = Some(Credentials {
        username: "unused".to_string(),
        password: "unused".to_string(),
    });

    let report = runner.run().await.expect("skip is not an error");
    assert!(report.skipped_run.is_some());
    assert_eq!(report.total, 0);
    assert_eq!(report.failed, 0);
}
