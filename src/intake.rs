//! Per-record form submission
//!
//! One call drives the whole add-patient workflow for a single record:
//! open the form, fill it, submit the draft, run the optional enrollment
//! sections, confirm, verify the status, and return to the home screen.
//! Steps are strictly ordered and never retried; the first error aborts the
//! record's case and leaves whatever page state it leaves.

use tracing::{debug, info};

use crate::config::FormDefaults;
use crate::dom::Dom;
use crate::error::Result;
use crate::fixtures::PatientRecord;
use crate::selectors as sel;

/// Text the confirmation dialog must show after the draft is accepted.
pub const ADDED_MESSAGE: &str = "New Patient added Successfully!";
/// Status the patient must reach after enrollment is confirmed.
pub const PRESCRIBED_STATUS: &str = "Prescribed";

/// Submit one patient record through the intake form.
///
/// Record-sourced fields that are absent fill as empty strings so stale
/// values from a previous record never leak through. Everything else comes
/// from [`FormDefaults`].
pub async fn submit_patient(
    dom: &Dom<'_>,
    record: &PatientRecord,
    defaults: &FormDefaults,
) -> Result<()> {
    info!(patient = %record.display_name(), "submitting intake form");

    dom.click(sel::HOME_ADD_PATIENT).await?;
    dom.wait_until_visible(sel::FIRST_NAME).await?;

    fill_identity(dom, record).await?;
    fill_defaults(dom, defaults).await?;
    dom.fill(sel::NOTES, record.get("Notes")).await?;

    dom.click(sel::DRAFT_SUBMIT).await?;
    dom.assert_text(sel::DIALOG_HEADING, ADDED_MESSAGE).await?;
    debug!("draft accepted");

    enroll(dom, record, defaults).await?;

    dom.click(sel::CONFIRM_SUBMIT).await?;
    dom.click_with_text(sel::CONFIRM_DIALOG_BUTTON, "CONFIRM")
        .await?;

    dom.click_button_with_text("VIEW PATIENT").await?;
    dom.assert_text(sel::STATUS_PRESCRIBED, PRESCRIBED_STATUS)
        .await?;
    debug!("patient prescribed");

    // leave the shared session on the home screen for the next record
    dom.click_closest(sel::HOME_MENU_TITLE, "Home", sel::HOME_MENU_ITEM)
        .await?;
    dom.wait_until_visible(sel::HOME_ADD_PATIENT).await?;
    Ok(())
}

async fn fill_identity(dom: &Dom<'_>, record: &PatientRecord) -> Result<()> {
    dom.fill(sel::FIRST_NAME, record.get("Firstname")).await?;
    dom.fill(sel::MIDDLE_NAME, record.get("Middlename")).await?;
    dom.fill(sel::LAST_NAME, record.get("Lastname")).await?;
    dom.fill(sel::EMAIL, record.get("Email")).await?;
    dom.fill(sel::MOBILE, record.get("MobileNumber")).await?;
    dom.select_value(sel::HEIGHT, record.get("Height")).await?;
    dom.fill(sel::ADDRESS_LINE1, record.get("AddressLine1"))
        .await?;
    Ok(())
}

async fn fill_defaults(dom: &Dom<'_>, defaults: &FormDefaults) -> Result<()> {
    dom.fill(sel::DATE_OF_BIRTH, &defaults.date_of_birth).await?;
    dom.select_value(sel::GENDER, &defaults.gender).await?;
    dom.select_value(sel::CLINIC, &defaults.clinic).await?;
    dom.select_value(sel::STATE, &defaults.state).await?;
    dom.select_label(sel::CITY, &defaults.city).await?;

    // the zip field only appears once a city is picked
    dom.wait_until_visible(sel::ZIPCODE).await?;
    dom.fill(sel::ZIPCODE, &defaults.zipcode).await?;

    dom.select_value(sel::TIMEZONE, &defaults.timezone).await?;
    dom.fill(sel::EMERGENCY_CONTACT_NAME, &defaults.emergency_contact_name)
        .await?;
    dom.select_index(
        sel::EMERGENCY_CONTACT_RELATION,
        defaults.emergency_contact_relation_index,
    )
    .await?;
    dom.fill(
        sel::EMERGENCY_CONTACT_MOBILE,
        &defaults.emergency_contact_mobile,
    )
    .await?;
    Ok(())
}

/// Optional enrollment sections a record activates. A `None` section
/// performs no UI action at all.
#[derive(Debug, PartialEq, Eq)]
struct EnrollmentSections<'a> {
    program: Option<&'a str>,
    vital: Option<&'a str>,
    diagnosis: Option<&'a str>,
}

fn nonblank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Program, vital condition, and diagnosis are each independently optional:
/// an empty or whitespace-only value skips that section.
fn enabled_sections(record: &PatientRecord) -> EnrollmentSections<'_> {
    EnrollmentSections {
        program: nonblank(record.get("ProgramName")),
        vital: nonblank(record.get("VitalCondition")),
        diagnosis: nonblank(record.get("Diagnosis")),
    }
}

async fn enroll(dom: &Dom<'_>, record: &PatientRecord, defaults: &FormDefaults) -> Result<()> {
    dom.click(sel::ENROLLMENT_CONTINUE).await?;

    let sections = enabled_sections(record);

    if let Some(program) = sections.program {
        debug!(program, "selecting program");
        dom.select_label(sel::PROGRAM_NAME, program).await?;
        dom.fill(sel::PROGRAM_START_DATE, &defaults.program_start_date)
            .await?;
    }

    if let Some(vital) = sections.vital {
        debug!(vital, "selecting vital condition");
        dom.click(sel::VITAL_TRIGGER).await?;
        dom.wait_for_selector(sel::VITAL_OPTION_TEXT).await?;
        dom.click_by_exact_text(vital).await?;
    }

    if let Some(diagnosis) = sections.diagnosis {
        debug!(diagnosis, "selecting diagnosis");
        // the Program Info control can fail layout-visibility checks while
        // still being clickable, so this click skips the visibility gate
        dom.click_button_with_text_forced("Program Info").await?;
        dom.click(sel::DIAGNOSIS_INPUT).await?;
        dom.click_by_exact_text(diagnosis).await?;
    }

    Ok(())
}
