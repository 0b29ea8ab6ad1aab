//! DOM selectors for the clinic application
//!
//! These strings are the external contract with the app under test; a markup
//! change there breaks the harness here, by design. Keep every selector in
//! this table so the coupling stays in one place.

// login page
pub const LOGIN_USERNAME: &str = "#login_username";
pub const LOGIN_PASSWORD: &str = "#login_password";
pub const LOGIN_SUBMIT: &str = "#btn_login";

// home screen
pub const HOME_ADD_PATIENT: &str = "#homeaddpatient";
pub const HOME_MENU_TITLE: &str = "h3.menu-title";
pub const HOME_MENU_ITEM: &str = "div.menu-items";

// add-patient form, record-sourced fields
pub const FIRST_NAME: &str = "#addPatientFirstname";
pub const MIDDLE_NAME: &str = "#addPatientMiddlename";
pub const LAST_NAME: &str = "#addPatientlastname";
pub const EMAIL: &str = "#addPatientemail";
pub const MOBILE: &str = "#addPatientMobile";
pub const HEIGHT: &str = "#addPatientheight";
pub const ADDRESS_LINE1: &str = "#addPatientAddressLine1";
pub const NOTES: &str = "#addPatientAdditionalNotes";

// add-patient form, default-sourced fields
pub const DATE_OF_BIRTH: &str = "#addPatientDOB";
pub const GENDER: &str = "#addPatientGender";
pub const CLINIC: &str = "#addPatientClinicName";
pub const STATE: &str = "#addPatientState";
pub const CITY: &str = "#addPatientCity";
pub const ZIPCODE: &str = "#addPatientZipcode";
pub const TIMEZONE: &str = "#addPatientTimezone";
pub const EMERGENCY_CONTACT_NAME: &str = "#addPatientEmergencyContact1";
pub const EMERGENCY_CONTACT_RELATION: &str = "#addPatientRelation1";
pub const EMERGENCY_CONTACT_MOBILE: &str = "#addPatientRelation1_mobile";

// draft submission and confirmation dialog
pub const DRAFT_SUBMIT: &str = "#btnaddPatientDraftSubmit";
pub const DIALOG_HEADING: &str = "h4.subheading-dialog";

// enrollment: program, vitals, diagnosis
pub const ENROLLMENT_CONTINUE: &str = "#addPatient";
pub const PROGRAM_NAME: &str = "#addPatientProgramName";
pub const PROGRAM_START_DATE: &str = "#addPatientStartDate";
pub const VITAL_TRIGGER: &str = "#addPatientvitalChange .mat-mdc-select-trigger";
pub const VITAL_OPTION_TEXT: &str = "mat-option span.mdc-list-item__primary-text";
pub const DIAGNOSIS_INPUT: &str = "input[placeholder='Select Diagnosis']";
pub const CONFIRM_SUBMIT: &str = "#btnaddPatientConfirmSubmit";
pub const CONFIRM_DIALOG_BUTTON: &str = "button.btn_save";

// post-enrollment status
pub const STATUS_PRESCRIBED: &str = "span.status_display.patient_prescribed";
