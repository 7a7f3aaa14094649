//! The polling state machine behind a watch session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::chime::{Chime, ToneChime};
use crate::config::WatchConfig;
use crate::probe::{ControlProbe, InputState};
use crate::Result;

/// Delay before the first check after `start()`.
const FIRST_CHECK_DELAY: Duration = Duration::from_millis(50);

/// What a cycle did, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleOutcome {
    /// Control ready: input filled (when present) and control activated.
    Activated,
    /// Control present but showing the busy label.
    Busy,
    /// Control present but disabled.
    Disabled,
    /// Control not found.
    Missing,
}

struct Shared {
    active: AtomicBool,
    cancel: Notify,
}

/// Polls the watched control and presses it when it is ready.
///
/// One session at a time: `start()` while a session is active is a warned
/// no-op that leaves the running session untouched, and `stop()` is
/// idempotent. A probe error during a cycle is terminal - the poller stops
/// itself and nothing further is scheduled.
pub struct Poller<P, C = ToneChime> {
    probe: Arc<P>,
    chime: Arc<C>,
    watch: WatchConfig,
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
}

impl<P> Poller<P>
where
    P: ControlProbe + 'static,
{
    /// Create a poller with the default tone chime.
    pub fn new(probe: P, watch: WatchConfig) -> Self {
        Self::with_chime(probe, watch, ToneChime::new())
    }
}

impl<P, C> Poller<P, C>
where
    P: ControlProbe + 'static,
    C: Chime,
{
    /// Create a poller with a custom chime.
    pub fn with_chime(probe: P, watch: WatchConfig, chime: C) -> Self {
        Self {
            probe: Arc::new(probe),
            chime: Arc::new(chime),
            watch,
            shared: Arc::new(Shared {
                active: AtomicBool::new(false),
                cancel: Notify::new(),
            }),
            task: None,
        }
    }

    /// Whether a check is currently scheduled.
    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Get a reference to the probe.
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Begin watching.
    ///
    /// Pre-fills the input if it is present and empty, captures the control's
    /// starting busy state, then schedules the first check. Probe errors here
    /// are logged and do not prevent the session from starting. With
    /// `sound_on_change` set, a chime plays whenever the control leaves its
    /// busy state.
    pub async fn start(&mut self, sound_on_change: bool) {
        if self.is_active() {
            warn!("already running, stop the current session first");
            return;
        }
        if let Some(task) = self.task.take() {
            // Previous session ended itself on a terminal cycle error.
            let _ = task.await;
        }

        info!(
            "watching {} (fill {:?}, interval {}-{}ms, sound on change: {})",
            self.watch.button_selector,
            self.watch.fill_text,
            self.watch.min_interval_ms,
            self.watch.max_interval_ms,
            sound_on_change
        );

        match self.probe.input_state().await {
            Ok(InputState::Empty) => {
                info!("pre-filling empty input with {:?}", self.watch.fill_text);
                match self.probe.fill_input(&self.watch.fill_text).await {
                    Ok(true) => {}
                    Ok(false) => warn!("input disappeared before prefill"),
                    Err(e) => warn!("prefill failed: {}", e),
                }
            }
            Ok(InputState::Filled) => debug!("input not empty, skipping prefill"),
            Ok(InputState::Missing) => warn!("input not found, cannot prefill"),
            Err(e) => warn!("input probe failed during init: {}", e),
        }

        let previous_busy = match self.probe.control().await {
            Ok(Some(control)) => {
                let busy = control.is_busy();
                debug!("initial control state, busy: {}", busy);
                busy
            }
            Ok(None) => {
                debug!("control not found at start, assuming not busy");
                false
            }
            Err(e) => {
                warn!("control probe failed during init: {}", e);
                false
            }
        };

        self.shared.active.store(true, Ordering::SeqCst);
        let probe = Arc::clone(&self.probe);
        let chime = sound_on_change.then(|| Arc::clone(&self.chime));
        let watch = self.watch.clone();
        let shared = Arc::clone(&self.shared);
        self.task = Some(tokio::spawn(poll_loop(
            probe,
            chime,
            watch,
            shared,
            previous_busy,
        )));
    }

    /// Stop watching. Idempotent.
    ///
    /// Cancels the pending check; a cycle already executing runs to
    /// completion before the task exits.
    pub async fn stop(&mut self) {
        let was_active = self.shared.active.swap(false, Ordering::SeqCst);
        self.shared.cancel.notify_one();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        if was_active {
            info!("stopped");
        } else {
            info!("already stopped");
        }
    }
}

async fn poll_loop<P, C>(
    probe: Arc<P>,
    chime: Option<Arc<C>>,
    watch: WatchConfig,
    shared: Arc<Shared>,
    mut previous_busy: bool,
) where
    P: ControlProbe,
    C: Chime,
{
    let mut delay = FIRST_CHECK_DELAY;
    loop {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = shared.cancel.notified() => {
                    if !shared.active.load(Ordering::SeqCst) {
                        debug!("cancelled while waiting");
                        return;
                    }
                    // Stale cancel notification from before this session;
                    // keep waiting out the current delay.
                }
                _ = &mut sleep => break,
            }
        }
        if !shared.active.load(Ordering::SeqCst) {
            debug!("stop raced the timer, halting check");
            return;
        }

        match run_cycle(probe.as_ref(), chime.as_deref(), &watch, &mut previous_busy).await {
            Ok(outcome) => debug!("cycle outcome: {:?}", outcome),
            Err(e) => {
                error!("cycle failed, stopping: {}", e);
                shared.active.store(false, Ordering::SeqCst);
                return;
            }
        }

        if !shared.active.load(Ordering::SeqCst) {
            debug!("stopped during cycle");
            return;
        }
        delay = pick_interval(&watch);
        debug!("next check in {}ms", delay.as_millis());
    }
}

/// One check-and-act pass. An `Err` is terminal for the session.
async fn run_cycle<P, C>(
    probe: &P,
    chime: Option<&C>,
    watch: &WatchConfig,
    previous_busy: &mut bool,
) -> Result<CycleOutcome>
where
    P: ControlProbe + ?Sized,
    C: Chime + ?Sized,
{
    let Some(control) = probe.control().await? else {
        warn!("control not found");
        if *previous_busy {
            debug!("control disappeared after busy state");
            if let Some(chime) = chime {
                chime.ring();
            }
        }
        *previous_busy = false;
        return Ok(CycleOutcome::Missing);
    };

    let busy = control.is_busy();
    if *previous_busy && !busy {
        debug!("control left busy state");
        if let Some(chime) = chime {
            chime.ring();
        }
    }
    *previous_busy = busy;

    debug!(
        "control found, disabled: {}, label: {:?}",
        control.disabled, control.label
    );

    if control.disabled {
        debug!("control is disabled, waiting");
        return Ok(CycleOutcome::Disabled);
    }
    if busy {
        debug!("control is busy, waiting");
        return Ok(CycleOutcome::Busy);
    }

    if probe.fill_input(&watch.fill_text).await? {
        debug!("input filled with {:?}", watch.fill_text);
    } else {
        warn!("input not found, activating without fill");
    }
    probe.activate().await?;
    info!("control activated");
    Ok(CycleOutcome::Activated)
}

/// Uniform random delay in `[min_interval_ms, max_interval_ms]` inclusive.
fn pick_interval(watch: &WatchConfig) -> Duration {
    let mut rng = rand::thread_rng();
    Duration::from_millis(rng.gen_range(watch.min_interval_ms..=watch.max_interval_ms))
}
