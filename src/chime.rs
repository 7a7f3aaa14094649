//! Audible cue for busy→ready transitions.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use rodio::source::SineWave;
use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{debug, info, warn};

const CHIME_FREQ_HZ: f32 = 660.0;
const CHIME_DURATION: Duration = Duration::from_millis(500);
const CHIME_GAIN: f32 = 0.25;

/// Fire-and-forget cue. Implementations must never let a playback failure
/// reach the caller.
pub trait Chime: Send + Sync + 'static {
    /// Request one cue. Returns immediately.
    fn ring(&self);
}

/// Plays a short sine tone on a dedicated audio thread.
///
/// The thread owns the output stream because audio streams are not `Send`.
/// The stream is opened lazily on the first ring and kept for reuse; if it
/// cannot be opened the attempt is repeated on the next ring.
pub struct ToneChime {
    tx: mpsc::Sender<()>,
}

impl ToneChime {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("autopress-chime".into())
            .spawn(move || audio_loop(rx))
            .ok();
        Self { tx }
    }
}

impl Default for ToneChime {
    fn default() -> Self {
        Self::new()
    }
}

impl Chime for ToneChime {
    fn ring(&self) {
        if self.tx.send(()).is_err() {
            warn!("audio thread is gone, dropping chime");
        }
    }
}

fn audio_loop(rx: mpsc::Receiver<()>) {
    let mut stream: Option<OutputStream> = None;

    while rx.recv().is_ok() {
        if stream.is_none() {
            match OutputStreamBuilder::open_default_stream() {
                Ok(mut s) => {
                    s.log_on_drop(false);
                    debug!("audio output opened");
                    stream = Some(s);
                }
                Err(e) => {
                    warn!("audio output unavailable, skipping chime: {}", e);
                    continue;
                }
            }
        }

        if let Some(ref s) = stream {
            let sink = Sink::connect_new(s.mixer());
            let mut tone = SineWave::new(CHIME_FREQ_HZ).take_duration(CHIME_DURATION);
            tone.set_filter_fadeout();
            sink.append(tone.amplify(CHIME_GAIN));
            sink.sleep_until_end();
            info!("ding");
        }
    }
}
