//! Session driver: one authenticated browser page per run
//!
//! The session is created once, logged in once, and handed to every case in
//! turn. There is no per-record isolation: a failed case can leave the page
//! in an arbitrary state for the next one, which is a known property of the
//! workflow, not something this module papers over.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{Credentials, SessionConfig};
use crate::dom::Dom;
use crate::error::{HarnessError, Result};
use crate::selectors;

/// The shared authenticated browser session.
///
/// Holds the browser process, its CDP event pump, and the single page all
/// cases drive. [`Session::close`] tears the browser down; the runner calls
/// it on every exit path, and dropping the session still aborts the event
/// pump.
pub struct Session {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    config: SessionConfig,
}

impl Session {
    /// Launch the browser, authenticate, and wait for the post-login home
    /// landmark. Any timeout here is fatal for the whole run.
    pub async fn launch(config: SessionConfig, credentials: &Credentials) -> Result<Self> {
        let browser_config = build_browser_config(&config)?;

        info!(headless = config.headless, "launching browser");
        let (browser, mut handler) = Browser::launch(browser_config).await?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("browser handler error: {e:?}");
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;

        if let Some((width, height)) = config.viewport {
            let params = SetDeviceMetricsOverrideParams::builder()
                .width(i64::from(width))
                .height(i64::from(height))
                .device_scale_factor(1.0)
                .mobile(false)
                .build()
                .map_err(HarnessError::Config)?;
            page.execute(params).await?;
        }

        let session = Self {
            browser,
            page,
            handler_task,
            config,
        };
        session.login(credentials).await?;
        Ok(session)
    }

    async fn login(&self, credentials: &Credentials) -> Result<()> {
        let dom = self.dom();
        info!(url = %self.config.login_url, "logging in");

        self.page.goto(self.config.login_url.clone()).await?;
        dom.wait_until_visible_within(selectors::LOGIN_USERNAME, self.config.login_timeout)
            .await?;

        dom.fill(selectors::LOGIN_USERNAME, &credentials.username)
            .await?;
        dom.fill(selectors::LOGIN_PASSWORD, &credentials.password)
            .await?;
        dom.wait_until_enabled(selectors::LOGIN_SUBMIT).await?;
        dom.click(selectors::LOGIN_SUBMIT).await?;

        // the home add-patient control is the landmark that confirms the
        // session is authenticated; the app takes a while to get there
        dom.wait_until_visible_within(selectors::HOME_ADD_PATIENT, self.config.login_timeout)
            .await?;
        info!("session authenticated");
        Ok(())
    }

    /// The single page every case shares.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Interaction helpers bound to the shared page and this session's
    /// pacing/timeouts.
    pub fn dom(&self) -> Dom<'_> {
        Dom::new(&self.page, &self.config)
    }

    /// Close the browser and stop the event pump.
    pub async fn close(mut self) -> Result<()> {
        debug!("closing browser session");
        if let Err(e) = self.browser.close().await {
            warn!("browser close failed: {e}");
        }
        self.handler_task.abort();
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // close() already aborted it on the orderly path; this covers early
        // returns between launch and close
        self.handler_task.abort();
    }
}

fn build_browser_config(config: &SessionConfig) -> Result<BrowserConfig> {
    let mut builder = BrowserConfig::builder();

    if let Some(path) = &config.chrome_executable {
        builder = builder.chrome_executable(path);
    } else if let Some(path) = find_chrome_for_testing() {
        debug!(chrome = %path.display(), "using Chrome for Testing");
        builder = builder.chrome_executable(path);
    }

    if !config.headless {
        builder = builder.with_head();
    }
    if let Some((width, height)) = config.viewport {
        builder = builder.window_size(width, height);
    }

    builder = builder.user_data_dir(unique_user_data_dir());

    builder
        .build()
        .map_err(|e| HarnessError::Config(format!("browser config: {e}")))
}

/// Unique per-launch profile dir so concurrent harness processes never fight
/// over a profile lock.
fn unique_user_data_dir() -> PathBuf {
    static LAUNCH_ID: AtomicU64 = AtomicU64::new(0);

    let launch_id = LAUNCH_ID.fetch_add(1, Ordering::SeqCst);
    let pid = std::process::id();
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    let dir = std::env::temp_dir().join(format!("patient-intake-e2e-{pid}-{launch_id}-{timestamp}"));
    if dir.exists() {
        let _ = std::fs::remove_dir_all(&dir);
    }
    dir
}

/// Find Chrome for Testing installed by Puppeteer, the same binary the
/// frontend team's own tooling uses.
fn find_chrome_for_testing() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    let puppeteer_cache = std::path::Path::new(&home).join(".cache/puppeteer/chrome");

    if !puppeteer_cache.exists() {
        return None;
    }
    let entries = std::fs::read_dir(&puppeteer_cache).ok()?;
    let mut versions: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .collect();
    versions.sort_by_key(|v| std::cmp::Reverse(v.path()));

    for version_dir in versions {
        let candidates = [
            "chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
            "chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
            "chrome-linux64/chrome",
        ];
        for candidate in candidates {
            let path = version_dir.path().join(candidate);
            if path.exists() {
                return Some(path);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_data_dirs_are_unique_across_launches() {
        let a = unique_user_data_dir();
        let b = unique_user_data_dir();
        assert_ne!(a, b);
        assert!(a.starts_with(std::env::temp_dir()));
    }
}
