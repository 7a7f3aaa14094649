//! Integration tests for autopress
//!
//! These tests require Chrome to be installed and available.
//! Run with: cargo test --test integration -- --ignored

use autopress::{BrowserConfig, Config, ControlProbe, DomProbe, InputState, Runner, TargetUrl, WatchConfig};
use eoka::{Browser, Page};

/// Check if Chrome is available
fn chrome_available() -> bool {
    eoka::stealth::patcher::find_chrome().is_ok()
}

fn watch() -> WatchConfig {
    WatchConfig {
        button_selector: "#run".into(),
        textarea_selector: "#prompt".into(),
        fill_text: "continue".into(),
        min_interval_ms: 50,
        max_interval_ms: 100,
    }
}

async fn page_with(browser: &Browser, html: &str) -> Page {
    let page = browser
        .new_page("about:blank")
        .await
        .expect("Failed to create page");
    page.goto(&format!("data:text/html,{}", html))
        .await
        .expect("Failed to navigate");
    page
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_probe_reads_ready_control() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = page_with(
        &browser,
        r##"
        <button id="run"><div class="inner"><span>Run</span></div></button>
        <textarea id="prompt"></textarea>
    "##,
    )
    .await;

    let probe = DomProbe::new(page, &watch());
    let control = probe
        .control()
        .await
        .expect("Failed to probe")
        .expect("Control should be found");

    assert_eq!(control.label, "Run");
    assert!(!control.is_busy());
    assert!(!control.disabled);

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_probe_reads_busy_and_disabled_states() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");

    let page = page_with(
        &browser,
        r##"<button id="run"><div class="inner"><span> Stop </span></div></button>"##,
    )
    .await;
    let probe = DomProbe::new(page, &watch());
    let control = probe.control().await.unwrap().unwrap();
    assert!(control.is_busy(), "trimmed 'Stop' label should read busy");

    let page = page_with(
        &browser,
        r##"<button id="run" disabled><div class="inner"><span>Run</span></div></button>"##,
    )
    .await;
    let probe = DomProbe::new(page, &watch());
    assert!(probe.control().await.unwrap().unwrap().disabled);

    let page = page_with(
        &browser,
        r##"<button id="run" aria-disabled="true"><div class="inner"><span>Run</span></div></button>"##,
    )
    .await;
    let probe = DomProbe::new(page, &watch());
    assert!(probe.control().await.unwrap().unwrap().disabled);

    // No nested label node: empty label, not busy.
    let page = page_with(&browser, r##"<button id="run">Stop</button>"##).await;
    let probe = DomProbe::new(page, &watch());
    let control = probe.control().await.unwrap().unwrap();
    assert_eq!(control.label, "");
    assert!(!control.is_busy());

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_probe_absent_control() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = page_with(&browser, "<p>nothing to press here</p>").await;

    let probe = DomProbe::new(page, &watch());
    assert!(probe.control().await.unwrap().is_none());
    assert_eq!(probe.input_state().await.unwrap(), InputState::Missing);

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_probe_input_states() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");

    let page = page_with(&browser, r##"<textarea id="prompt">   </textarea>"##).await;
    let probe = DomProbe::new(page, &watch());
    assert_eq!(probe.input_state().await.unwrap(), InputState::Empty);

    let page = page_with(&browser, r##"<textarea id="prompt">draft</textarea>"##).await;
    let probe = DomProbe::new(page, &watch());
    assert_eq!(probe.input_state().await.unwrap(), InputState::Filled);

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_fill_dispatches_one_input_and_one_change() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = page_with(
        &browser,
        r##"
        <textarea id="prompt"></textarea>
        <script>
            window.__inputs = 0; window.__changes = 0;
            const el = document.getElementById('prompt');
            el.addEventListener('input', () => window.__inputs++);
            el.addEventListener('change', () => window.__changes++);
        </script>
    "##,
    )
    .await;

    let probe = DomProbe::new(page, &watch());
    assert!(probe.fill_input("continue").await.unwrap());

    let (inputs, changes, value): (i64, i64, String) = probe
        .page()
        .evaluate("[window.__inputs, window.__changes, document.getElementById('prompt').value]")
        .await
        .expect("Failed to read counters");
    assert_eq!(inputs, 1);
    assert_eq!(changes, 1);
    assert_eq!(value, "continue");

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_activate_clicks_the_control() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = page_with(
        &browser,
        r##"
        <button id="run" onclick="window.__clicks = (window.__clicks || 0) + 1">
            <div class="inner"><span>Run</span></div>
        </button>
    "##,
    )
    .await;

    let probe = DomProbe::new(page, &watch());
    probe.activate().await.expect("Failed to activate");

    let clicks: i64 = probe
        .page()
        .evaluate("window.__clicks || 0")
        .await
        .expect("Failed to read counter");
    assert_eq!(clicks, 1);

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_runner_presses_ready_control() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let url = r##"data:text/html,
        <button id="run" onclick="window.__clicks = (window.__clicks || 0) + 1">
            <div class="inner"><span>Run</span></div>
        </button>
        <textarea id="prompt"></textarea>
    "##;
    let config = Config {
        name: "Integration".into(),
        params: Default::default(),
        browser: BrowserConfig {
            headless: true,
            ..Default::default()
        },
        target: TargetUrl { url: url.into() },
        watch: watch(),
    };

    let mut runner = Runner::new(&config).await.expect("Failed to launch");
    runner.start(false).await;
    assert!(runner.is_active());

    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

    let clicks: i64 = runner
        .page()
        .evaluate("window.__clicks || 0")
        .await
        .expect("Failed to read counter");
    assert!(clicks >= 1, "expected at least one press, got {}", clicks);

    runner.stop().await;
    assert!(!runner.is_active());
    runner.close().await.expect("Failed to close browser");
}
