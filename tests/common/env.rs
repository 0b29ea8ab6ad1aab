//! Environment guards for the live E2E test
//!
//! The intake run needs Chrome, the clinic app, and credentials; when any of
//! them is unavailable the test skips loudly rather than failing.

/// Set `SKIP_BROWSER_TESTS` to skip everything that launches Chrome.
pub fn should_skip_browser() -> bool {
    std::env::var("SKIP_BROWSER_TESTS").is_ok()
}

/// True when the target app answers at the given URL.
pub async fn app_reachable(url: &str) -> bool {
    match reqwest::get(url).await {
        Ok(resp) => resp.status().is_success(),
        Err(_) => false,
    }
}

#[macro_export]
macro_rules! skip_if_no_browser {
    () => {
        if env::should_skip_browser() {
            eprintln!("Skipping test: SKIP_BROWSER_TESTS is set");
            return;
        }
    };
}

#[macro_export]
macro_rules! require_app {
    ($url:expr) => {{
        if !env::app_reachable($url).await {
            eprintln!("Skipping: clinic app not reachable at {}", $url);
            return;
        }
    }};
}
