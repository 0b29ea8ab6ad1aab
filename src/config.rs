//! Harness configuration: credentials, session settings, and named form defaults
//!
//! Every value the intake form receives is sourced from exactly one of two
//! places: the patient record, or the [`FormDefaults`] table below. Nothing is
//! inlined at the call site, so the full contract with the target form is
//! auditable from this module alone.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

/// Environment variable holding the login username.
pub const USERNAME_VAR: &str = "APP_USERNAME";
/// Environment variable holding the login password.
pub const PASSWORD_VAR: &str = "APP_PASSWORD";
/// Local fallback file: username on line 1, password on line 2.
pub const CREDENTIALS_FILE: &str = "credentials.txt";

/// Login credentials for the clinic application.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Resolve credentials from the default environment variables, falling
    /// back to `credentials.txt` in the working directory.
    pub fn resolve() -> Result<Self> {
        Self::resolve_from(USERNAME_VAR, PASSWORD_VAR, Path::new(CREDENTIALS_FILE))
    }

    /// Environment variables win over the fallback file when both are set.
    /// Absence of both is a fatal configuration error, surfaced before any
    /// browser launches.
    pub fn resolve_from(username_var: &str, password_var: &str, fallback: &Path) -> Result<Self> {
        if let (Ok(username), Ok(password)) = (env::var(username_var), env::var(password_var)) {
            if !username.trim().is_empty() && !password.trim().is_empty() {
                return Ok(Self { username, password });
            }
        }

        let text = fs::read_to_string(fallback).map_err(|_| HarnessError::MissingCredentials)?;
        let mut lines = text.lines();
        match (lines.next(), lines.next()) {
            (Some(username), Some(password))
                if !username.trim().is_empty() && !password.trim().is_empty() =>
            {
                Ok(Self {
                    username: username.trim().to_string(),
                    password: password.trim().to_string(),
                })
            }
            _ => Err(HarnessError::MissingCredentials),
        }
    }
}

/// Settings for the shared browser session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Login page of the application under test.
    pub login_url: String,
    /// Run the browser without a window. On in CI, off locally.
    pub headless: bool,
    /// Pause inserted after each UI action so a human can follow along.
    /// Zero in CI.
    pub slow_mo: Duration,
    /// Fixed viewport, applied via device metrics override. `None` lets the
    /// window keep its natural size (local headed runs).
    pub viewport: Option<(u32, u32)>,
    /// Default timeout for waiting on selectors and element states.
    pub step_timeout: Duration,
    /// Login is slow on the target app; the post-login landmark gets its own
    /// generous timeout.
    pub login_timeout: Duration,
    /// Explicit Chrome binary. When unset, Chrome for Testing is probed and
    /// chromiumoxide's auto-detection is the last resort.
    pub chrome_executable: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::for_ci(true)
    }
}

impl SessionConfig {
    /// Build a config from the `CI` environment variable: headless with a
    /// fixed viewport on CI, headed and slowed down locally.
    pub fn from_env() -> Self {
        Self::for_ci(env::var("CI").is_ok())
    }

    pub fn for_ci(ci: bool) -> Self {
        Self {
            login_url: "https://cx-dev-client.azurewebsites.net/login".to_string(),
            headless: ci,
            slow_mo: if ci {
                Duration::ZERO
            } else {
                Duration::from_millis(1000)
            },
            viewport: if ci { Some((1280, 720)) } else { None },
            step_timeout: Duration::from_secs(10),
            login_timeout: Duration::from_secs(60),
            chrome_executable: None,
        }
    }
}

/// Named defaults for every form field that is not sourced from the patient
/// record. All records share these values; whether clinic/location metadata
/// should instead vary per record is an open question owned by the target UI
/// team.
///
/// Overridable from a TOML file:
///
/// ```toml
/// city = "Bellefonte"
/// zipcode = "100"
/// emergency_contact_name = "Andria"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDefaults {
    /// ISO date filled into the date-of-birth field.
    pub date_of_birth: String,
    /// `<select>` option value for gender.
    pub gender: String,
    /// `<select>` option value identifying the clinic.
    pub clinic: String,
    /// `<select>` option value identifying the state.
    pub state: String,
    /// City is matched by its visible option label, not its value.
    pub city: String,
    pub zipcode: String,
    /// `<select>` option value for the timezone.
    pub timezone: String,
    pub emergency_contact_name: String,
    /// Positional option index in the relation dropdown.
    pub emergency_contact_relation_index: usize,
    pub emergency_contact_mobile: String,
    /// Start date filled when a record enrolls into a program.
    pub program_start_date: String,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            date_of_birth: "1997-10-01".to_string(),
            gender: "M".to_string(),
            clinic: "8".to_string(),
            state: "1399".to_string(),
            city: "Bellefonte".to_string(),
            zipcode: "100".to_string(),
            timezone: "1".to_string(),
            emergency_contact_name: "Andria".to_string(),
            emergency_contact_relation_index: 1,
            emergency_contact_mobile: "1234567890".to_string(),
            program_start_date: "2025-06-20".to_string(),
        }
    }
}

impl FormDefaults {
    /// Load defaults from a TOML file. Missing keys keep their built-in
    /// values.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            HarnessError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parse defaults from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| HarnessError::Config(format!("bad form defaults: {e}")))
    }
}
