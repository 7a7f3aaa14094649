//! # autopress
//!
//! Watches a single control on a live web page and presses it again whenever
//! it goes idle. On a randomized cadence the poller reads the control's label
//! and disabled state, refills the adjacent text input, clicks the control
//! when it is ready, and (optionally) plays a chime when the control leaves
//! its busy state.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use autopress::{Config, Runner};
//!
//! # #[tokio::main]
//! # async fn main() -> autopress::Result<()> {
//! let config = Config::load("watch.yaml")?;
//! let mut runner = Runner::new(&config).await?;
//! runner.start(true).await;
//! tokio::signal::ctrl_c().await?;
//! runner.close().await?;
//! # Ok(())
//! # }
//! ```

mod chime;
mod config;
mod poller;
mod probe;
mod runner;

pub use chime::{Chime, ToneChime};
pub use config::{BrowserConfig, Config, ParamDef, Params, TargetUrl, WatchConfig};
pub use poller::Poller;
pub use probe::{ControlProbe, ControlState, DomProbe, InputState};
pub use runner::Runner;

/// Result type for autopress operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during config loading or a watch session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("browser error: {0}")]
    Browser(#[from] eoka::Error),

    #[error("probe error: {0}")]
    Probe(String),
}
