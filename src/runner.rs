//! Browser session lifecycle around the poller.

use crate::config::Config;
use crate::poller::Poller;
use crate::probe::DomProbe;
use crate::Result;
use eoka::{Browser, Page};
use tracing::{debug, info};

/// Owns the browser session and the poller attached to it.
pub struct Runner {
    browser: Browser,
    poller: Poller<DomProbe>,
}

impl Runner {
    /// Launch a browser from the config and attach to the target page.
    pub async fn new(config: &Config) -> Result<Self> {
        let stealth = eoka::StealthConfig {
            headless: config.browser.headless,
            proxy: config.browser.proxy.clone(),
            user_agent: config.browser.user_agent.clone(),
            viewport_width: config.browser.viewport.as_ref().map(|v| v.width).unwrap_or(1280),
            viewport_height: config
                .browser
                .viewport
                .as_ref()
                .map(|v| v.height)
                .unwrap_or(720),
            ..Default::default()
        };

        debug!(
            "Launching browser (headless: {}, proxy: {:?})",
            config.browser.headless, config.browser.proxy
        );
        let browser = Browser::launch_with_config(stealth).await?;
        let page: Page = browser.new_page("about:blank").await?;

        info!("Navigating to: {}", config.target.url);
        page.goto(&config.target.url).await?;

        let probe = DomProbe::new(page, &config.watch);
        let poller = Poller::new(probe, config.watch.clone());

        Ok(Self { browser, poller })
    }

    /// Get a reference to the page under watch.
    pub fn page(&self) -> &Page {
        self.poller.probe().page()
    }

    /// Start the watch session.
    pub async fn start(&mut self, sound_on_change: bool) {
        self.poller.start(sound_on_change).await;
    }

    /// Stop the watch session. Idempotent.
    pub async fn stop(&mut self) {
        self.poller.stop().await;
    }

    /// Whether the watch session is running.
    pub fn is_active(&self) -> bool {
        self.poller.is_active()
    }

    /// Stop the session and close the browser.
    pub async fn close(mut self) -> Result<()> {
        self.poller.stop().await;
        self.browser.close().await?;
        Ok(())
    }
}
