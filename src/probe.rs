//! Control probing - reads and drives the watched elements via injected JS.

use crate::{Result, WatchConfig};
use async_trait::async_trait;
use eoka::Page;
use serde::Deserialize;

/// Label that marks the control as busy (trimmed, case-insensitive).
const BUSY_LABEL: &str = "stop";

/// Snapshot of the watched control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    /// Label text from the control's nested text node (may be empty).
    pub label: String,
    /// Native `disabled` property or `aria-disabled="true"`.
    pub disabled: bool,
}

impl ControlState {
    /// Whether the label marks an in-progress operation.
    pub fn is_busy(&self) -> bool {
        self.label.trim().eq_ignore_ascii_case(BUSY_LABEL)
    }
}

/// State of the watched text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    /// No element matches the selector.
    Missing,
    /// Present with a blank (or whitespace-only) value.
    Empty,
    /// Present with content.
    Filled,
}

/// Capability the poller needs from the host page.
///
/// Kept narrow so the cycle logic can be tested against a mock instead of a
/// live browser.
#[async_trait]
pub trait ControlProbe: Send + Sync {
    /// Snapshot the control, or `None` if it is absent.
    async fn control(&self) -> Result<Option<ControlState>>;

    /// Inspect the text input.
    async fn input_state(&self) -> Result<InputState>;

    /// Fill the input and notify the page. Returns `false` if the input is
    /// absent.
    async fn fill_input(&self, text: &str) -> Result<bool>;

    /// Activate the control.
    async fn activate(&self) -> Result<()>;
}

#[derive(Deserialize)]
struct RawControl {
    found: bool,
    label: String,
    disabled: bool,
}

/// Reads the control's label and disabled state in one pass. The label comes
/// from the nested `div.inner span` text node; a control without that node
/// reports an empty label.
const CONTROL_JS: &str = r#"
((sel) => {
    const el = document.querySelector(sel);
    if (!el) return { found: false, label: '', disabled: false };
    const span = el.querySelector('div.inner span');
    const label = span ? span.textContent.trim() : '';
    const disabled = !!el.disabled || el.getAttribute('aria-disabled') === 'true';
    return { found: true, label, disabled };
})
"#;

const INPUT_STATE_JS: &str = r#"
((sel) => {
    const el = document.querySelector(sel);
    if (!el) return 'missing';
    return el.value.trim() === '' ? 'empty' : 'filled';
})
"#;

/// Sets the value, then dispatches `input` and `change` so framework
/// listeners pick the edit up, with a focus/blur nudge for the stragglers.
const FILL_JS: &str = r#"
((sel, text) => {
    const el = document.querySelector(sel);
    if (!el) return false;
    el.value = text;
    el.dispatchEvent(new Event('input', { bubbles: true, composed: true }));
    el.dispatchEvent(new Event('change', { bubbles: true, composed: true }));
    el.focus();
    el.blur();
    return true;
})
"#;

/// Probe implementation over a live CDP page.
pub struct DomProbe {
    page: Page,
    button_selector: String,
    textarea_selector: String,
}

impl DomProbe {
    /// Create a probe for the selectors in `watch`.
    pub fn new(page: Page, watch: &WatchConfig) -> Self {
        Self {
            page,
            button_selector: watch.button_selector.clone(),
            textarea_selector: watch.textarea_selector.clone(),
        }
    }

    /// Get a reference to the underlying page.
    pub fn page(&self) -> &Page {
        &self.page
    }
}

#[async_trait]
impl ControlProbe for DomProbe {
    async fn control(&self) -> Result<Option<ControlState>> {
        let js = format!(
            "{}({})",
            CONTROL_JS,
            serde_json::to_string(&self.button_selector).unwrap()
        );
        let raw: RawControl = self.page.evaluate(&js).await?;
        if !raw.found {
            return Ok(None);
        }
        Ok(Some(ControlState {
            label: raw.label,
            disabled: raw.disabled,
        }))
    }

    async fn input_state(&self) -> Result<InputState> {
        let js = format!(
            "{}({})",
            INPUT_STATE_JS,
            serde_json::to_string(&self.textarea_selector).unwrap()
        );
        let state: String = self.page.evaluate(&js).await?;
        Ok(match state.as_str() {
            "missing" => InputState::Missing,
            "empty" => InputState::Empty,
            _ => InputState::Filled,
        })
    }

    async fn fill_input(&self, text: &str) -> Result<bool> {
        let js = format!(
            "{}({},{})",
            FILL_JS,
            serde_json::to_string(&self.textarea_selector).unwrap(),
            serde_json::to_string(text).unwrap()
        );
        Ok(self.page.evaluate(&js).await?)
    }

    async fn activate(&self) -> Result<()> {
        self.page.click(&self.button_selector).await?;
        Ok(())
    }
}
