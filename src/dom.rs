//! Page interaction helpers over a chromiumoxide [`Page`]
//!
//! Everything goes through `page.evaluate` so the harness talks to the app
//! the same way its own frontend code does: set value, dispatch the events
//! the framework listens for, read text back out. Every wait is a bounded
//! poll; a timeout names the selector it was waiting on.
//!
//! Selector and value interpolation into JavaScript is always JSON-escaped,
//! never spliced raw.

use std::time::{Duration, Instant};

use chromiumoxide::Page;
use tokio::time::sleep;
use tracing::debug;

use crate::config::SessionConfig;
use crate::error::{HarnessError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Borrowed view over the shared page plus the pacing/timeout settings.
pub struct Dom<'a> {
    page: &'a Page,
    step_timeout: Duration,
    slow_mo: Duration,
}

impl<'a> Dom<'a> {
    pub fn new(page: &'a Page, config: &SessionConfig) -> Self {
        Self {
            page,
            step_timeout: config.step_timeout,
            slow_mo: config.slow_mo,
        }
    }

    pub fn page(&self) -> &Page {
        self.page
    }

    /// Local runs slow every action down so a human can watch; CI runs at
    /// full speed.
    async fn pace(&self) {
        if !self.slow_mo.is_zero() {
            sleep(self.slow_mo).await;
        }
    }

    async fn eval_bool(&self, expr: &str) -> Result<bool> {
        let ok: bool = self.page.evaluate(expr.to_string()).await?.into_value()?;
        Ok(ok)
    }

    /// Poll `expr` until it evaluates to `true` or the timeout elapses.
    async fn wait_until(&self, what: &str, timeout: Duration, expr: &str) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.eval_bool(expr).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(HarnessError::SelectorTimeout {
                    selector: what.to_string(),
                    timeout,
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    pub async fn wait_for_selector(&self, selector: &str) -> Result<()> {
        self.wait_for_selector_within(selector, self.step_timeout)
            .await
    }

    pub async fn wait_for_selector_within(&self, selector: &str, timeout: Duration) -> Result<()> {
        let expr = format!("!!document.querySelector({})", js_str(selector)?);
        self.wait_until(selector, timeout, &expr).await
    }

    /// Present and laid out (`offsetParent` check, the same visibility probe
    /// the frontend uses for Angular overlays).
    pub async fn wait_until_visible(&self, selector: &str) -> Result<()> {
        self.wait_until_visible_within(selector, self.step_timeout)
            .await
    }

    pub async fn wait_until_visible_within(&self, selector: &str, timeout: Duration) -> Result<()> {
        let expr = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             return !!el && el.offsetParent !== null; }})()",
            sel = js_str(selector)?
        );
        self.wait_until(selector, timeout, &expr).await
    }

    /// Wait for a control to become enabled (login button stays disabled
    /// until the form validates).
    pub async fn wait_until_enabled(&self, selector: &str) -> Result<()> {
        let expr = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             return !!el && !el.disabled; }})()",
            sel = js_str(selector)?
        );
        self.wait_until(selector, self.step_timeout, &expr).await
    }

    pub async fn click(&self, selector: &str) -> Result<()> {
        debug!(selector, "click");
        self.wait_until_visible(selector).await?;
        let expr = format!(
            "document.querySelector({sel}).click()",
            sel = js_str(selector)?
        );
        self.page.evaluate(expr).await?;
        self.pace().await;
        Ok(())
    }

    /// Set an input's value and fire the `input`/`change` events the app
    /// binds to. A blank value deliberately overwrites stale form state.
    pub async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        debug!(selector, value, "fill");
        self.wait_for_selector(selector).await?;
        let expr = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             el.value = {val}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); }})()",
            sel = js_str(selector)?,
            val = js_str(value)?
        );
        self.page.evaluate(expr).await?;
        self.pace().await;
        Ok(())
    }

    /// Select the option with the given `value` attribute.
    pub async fn select_value(&self, selector: &str, value: &str) -> Result<()> {
        debug!(selector, value, "select by value");
        let expr = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el) return false; \
             const opt = [...el.options].find(o => o.value === {val}); \
             if (!opt) return false; \
             el.value = opt.value; \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true; }})()",
            sel = js_str(selector)?,
            val = js_str(value)?
        );
        self.select_with(selector, value, &expr).await
    }

    /// Select the option whose visible label matches `label` exactly
    /// (trimmed).
    pub async fn select_label(&self, selector: &str, label: &str) -> Result<()> {
        debug!(selector, label, "select by label");
        let expr = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el) return false; \
             const opt = [...el.options].find(o => o.textContent.trim() === {lab}); \
             if (!opt) return false; \
             el.value = opt.value; \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true; }})()",
            sel = js_str(selector)?,
            lab = js_str(label)?
        );
        self.select_with(selector, label, &expr).await
    }

    /// Select an option by position.
    pub async fn select_index(&self, selector: &str, index: usize) -> Result<()> {
        debug!(selector, index, "select by index");
        let expr = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el || el.options.length <= {index}) return false; \
             el.selectedIndex = {index}; \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true; }})()",
            sel = js_str(selector)?
        );
        self.select_with(selector, &index.to_string(), &expr).await
    }

    async fn select_with(&self, selector: &str, wanted: &str, expr: &str) -> Result<()> {
        self.wait_for_selector(selector).await?;
        if !self.eval_bool(expr).await? {
            return Err(HarnessError::NoSuchOption {
                selector: selector.to_string(),
                wanted: wanted.to_string(),
            });
        }
        self.pace().await;
        Ok(())
    }

    /// Click the innermost visible element whose trimmed text equals `text`
    /// exactly. Used for overlay option lists that render outside the form.
    pub async fn click_by_exact_text(&self, text: &str) -> Result<()> {
        debug!(text, "click by exact text");
        let expr = format!(
            "(() => {{ \
             const matches = [...document.querySelectorAll('*')] \
                 .filter(el => el.offsetParent !== null && el.textContent.trim() === {txt}); \
             if (matches.length === 0) return false; \
             matches[matches.length - 1].click(); \
             return true; }})()",
            txt = js_str(text)?
        );
        self.click_when_found(&format!("text={text}"), &expr).await
    }

    /// Click the first visible element matching `selector` whose text
    /// contains `text`.
    pub async fn click_with_text(&self, selector: &str, text: &str) -> Result<()> {
        debug!(selector, text, "click element containing text");
        let expr = click_with_text_expr(selector, text, true)?;
        self.click_when_found(&format!("{selector} >> text={text}"), &expr)
            .await
    }

    /// Like [`Dom::click_with_text`] but without the visibility gate, for
    /// controls the app keeps clickable while they fail layout checks.
    pub async fn click_with_text_forced(&self, selector: &str, text: &str) -> Result<()> {
        debug!(selector, text, "forced click on element containing text");
        let expr = click_with_text_expr(selector, text, false)?;
        self.click_when_found(&format!("{selector} >> text={text}"), &expr)
            .await
    }

    /// Click a button (or anything with the button role) by its label.
    pub async fn click_button_with_text(&self, text: &str) -> Result<()> {
        self.click_with_text("button, [role=\"button\"]", text).await
    }

    /// Forced variant of [`Dom::click_button_with_text`].
    pub async fn click_button_with_text_forced(&self, text: &str) -> Result<()> {
        self.click_with_text_forced("button, [role=\"button\"]", text)
            .await
    }

    /// Click the enclosing `ancestor_selector` of the element matching
    /// `text_selector` with the given text. Covers menu tiles where the
    /// clickable surface wraps the label.
    pub async fn click_closest(
        &self,
        text_selector: &str,
        text: &str,
        ancestor_selector: &str,
    ) -> Result<()> {
        debug!(text_selector, text, ancestor_selector, "click enclosing item");
        let expr = format!(
            "(() => {{ \
             const label = [...document.querySelectorAll({tsel})] \
                 .find(el => el.textContent.trim() === {txt}); \
             if (!label) return false; \
             const target = label.closest({asel}); \
             if (!target) return false; \
             target.click(); \
             return true; }})()",
            tsel = js_str(text_selector)?,
            txt = js_str(text)?,
            asel = js_str(ancestor_selector)?
        );
        self.click_when_found(&format!("{ancestor_selector} >> {text}"), &expr)
            .await
    }

    /// Poll a click expression until it finds and clicks its target.
    async fn click_when_found(&self, what: &str, expr: &str) -> Result<()> {
        self.wait_until(what, self.step_timeout, expr).await?;
        self.pace().await;
        Ok(())
    }

    /// Trimmed visible text of the first match. Waits for the element to be
    /// visible first.
    pub async fn inner_text(&self, selector: &str) -> Result<String> {
        self.wait_until_visible(selector).await?;
        let expr = format!(
            "document.querySelector({sel}).innerText",
            sel = js_str(selector)?
        );
        let text: String = self.page.evaluate(expr).await?.into_value()?;
        Ok(text.trim().to_string())
    }

    /// Strict equality assertion on an element's trimmed text. No case
    /// folding, no substring tolerance.
    pub async fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let actual = self.inner_text(selector).await?;
        if actual != expected {
            return Err(HarnessError::AssertionFailed {
                expected: expected.to_string(),
                actual,
            });
        }
        Ok(())
    }
}

/// Expression that finds the first element in `selector` scope containing
/// `text` and clicks it. `require_visible` adds the `offsetParent` gate;
/// forced clicks drop it.
fn click_with_text_expr(selector: &str, text: &str, require_visible: bool) -> Result<String> {
    let guard = if require_visible {
        "el.offsetParent !== null && "
    } else {
        ""
    };
    Ok(format!(
        "(() => {{ \
         const el = [...document.querySelectorAll({sel})] \
             .find(el => {guard}el.textContent.includes({txt})); \
         if (!el) return false; \
         el.click(); \
         return true; }})()",
        sel = js_str(selector)?,
        txt = js_str(text)?
    ))
}

/// JSON-escape a string for embedding in an evaluate expression.
fn js_str(s: &str) -> Result<String> {
    Ok(serde_json::to_string(s)?)
}
