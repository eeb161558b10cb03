use std::sync::Arc;

use tokio::task::{self, JoinHandle};
use tracing::debug;

use crate::audio::session::{run_download, run_playback};
use crate::audio::sink::AudioSink;
use crate::audio::state::{PlaybackStatus, PlayerState, StateSnapshot};
use crate::source::TrackSource;

/// Facade over the shared state, the output sink and the collaborator.
/// All dispatcher commands go through here so the start guards and the
/// join-on-stop discipline live in one place.
pub struct AudioSystem {
    state: Arc<PlayerState>,
    sink: Arc<dyn AudioSink>,
    source: Arc<dyn TrackSource>,
    playback_task: Option<JoinHandle<()>>,
    download_task: Option<JoinHandle<()>>,
}

impl AudioSystem {
    pub fn new(sink: Arc<dyn AudioSink>, source: Arc<dyn TrackSource>) -> Self {
        Self {
            state: Arc::new(PlayerState::new()),
            sink,
            source,
            playback_task: None,
            download_task: None,
        }
    }

    pub fn state(&self) -> &Arc<PlayerState> {
        &self.state
    }

    pub fn source(&self) -> Arc<dyn TrackSource> {
        self.source.clone()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    /// Spawns a playback session if none is active and a track is
    /// selected; otherwise a no-op. The guard and the `Starting`
    /// transition are atomic, so racing start commands admit one session.
    pub fn start_playback(&mut self) -> bool {
        let Some(url) = self.state.try_begin_playback() else {
            debug!("playback start ignored (active session or no track)");
            return false;
        };

        // The device may still be paused from the previous session; the
        // exit finalizer only clears the state flag.
        self.sink.set_paused(false);

        let state = self.state.clone();
        let sink = self.sink.clone();
        let source = self.source.clone();
        self.playback_task =
            Some(task::spawn_blocking(move || run_playback(state, sink, source, url)));
        true
    }

    /// Meaningful only while streaming; the dispatcher maps the same key
    /// to `start_playback` when idle.
    pub fn toggle_pause(&self) {
        let paused = !self.state.is_paused();
        self.state.set_paused(paused);
        self.sink.set_paused(paused);
    }

    /// Requests a cooperative stop and waits for the session to reach
    /// `Idle`. No-op when nothing is playing.
    pub async fn stop(&mut self) {
        if self.state.status() == PlaybackStatus::Idle {
            return;
        }
        self.state.request_stop();
        if let Some(task) = self.playback_task.take() {
            let _ = task.await;
        }
    }

    /// Spawns a detached download session; joined only at shutdown.
    pub fn start_download(&mut self) -> bool {
        let Some(url) = self.state.try_begin_download() else {
            debug!("download start ignored (in flight or no track)");
            return false;
        };

        let state = self.state.clone();
        let source = self.source.clone();
        self.download_task = Some(task::spawn_blocking(move || run_download(state, source, url)));
        true
    }

    /// Stops playback and waits for an in-flight download to finish, so
    /// quitting never truncates a file.
    pub async fn shutdown(&mut self) {
        self.stop().await;
        if let Some(task) = self.download_task.take() {
            let _ = task.await;
        }
    }
}
