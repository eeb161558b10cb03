use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::audio::sink::AudioSink;
use crate::audio::state::PlayerState;
use crate::source::TrackSource;

/// Tolerated device backlog before delivery is throttled: one second of
/// 44.1 kHz interleaved stereo f32.
pub const BACKPRESSURE_BYTES: usize = 352_800;

/// Re-check interval while paused.
pub const PAUSE_POLL: Duration = Duration::from_millis(50);
/// Re-check interval while the sink backlog is over the threshold.
pub const BACKPRESSURE_POLL: Duration = Duration::from_millis(10);

struct PlaybackFinisher(Arc<PlayerState>);

impl Drop for PlaybackFinisher {
    fn drop(&mut self) {
        self.0.finish_playback();
    }
}

struct DownloadFinisher(Arc<PlayerState>);

impl Drop for DownloadFinisher {
    fn drop(&mut self) {
        self.0.finish_download();
    }
}

/// Body of one playback session. Runs on a blocking thread and owns it for
/// the whole streaming call; `PlayerState::try_begin_playback` must have
/// succeeded first. The finisher guarantees the `Idle` transition on every
/// exit path, panics included.
pub fn run_playback(
    state: Arc<PlayerState>,
    sink: Arc<dyn AudioSink>,
    source: Arc<dyn TrackSource>,
    url: String,
) {
    let _finisher = PlaybackFinisher(state.clone());
    state.mark_streaming();
    info!(url, "playback session started");

    let deliver_state = state.clone();
    let mut deliver = move |chunk: &[f32]| {
        deliver_chunk(&deliver_state, sink.as_ref(), chunk);
    };

    match source.stream(&url, &mut deliver, state.cancel_flag()) {
        Ok(()) => info!("playback session ended"),
        Err(e) => {
            warn!(error = %e, "playback session failed");
            state.set_playback_error(e.to_string());
        }
    }
}

/// Per-chunk delivery checkpoints, in contract order: stop, pause,
/// backpressure, enqueue. The stop flag is re-read inside both wait loops
/// so a cancel takes effect within one poll interval.
fn deliver_chunk(state: &PlayerState, sink: &dyn AudioSink, chunk: &[f32]) {
    if state.stop_requested() {
        return;
    }

    while state.is_paused() && !state.stop_requested() {
        std::thread::sleep(PAUSE_POLL);
    }

    while sink.queued_bytes() > BACKPRESSURE_BYTES && !state.stop_requested() {
        std::thread::sleep(BACKPRESSURE_POLL);
    }

    if state.stop_requested() {
        return;
    }

    // Device trouble drops the chunk, never the session.
    if let Err(e) = sink.enqueue(chunk) {
        warn!(error = %e, "audio device rejected chunk");
    }
}

/// Body of one download session; no cancellation path by design. The
/// finisher clears the `downloading` flag exactly once on any exit.
pub fn run_download(state: Arc<PlayerState>, source: Arc<dyn TrackSource>, url: String) {
    let _finisher = DownloadFinisher(state.clone());
    info!(url, "download session started");

    match source.download(&url) {
        Ok(path) => info!(path = %path.display(), "download session ended"),
        Err(e) => {
            warn!(error = %e, "download session failed");
            state.set_download_error(e.to_string());
        }
    }
}
