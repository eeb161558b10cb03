use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Starting,
    Streaming,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedTrack {
    pub title: String,
    pub url: String,
}

/// Shared record of the player session state. One instance per process,
/// shared by the dispatcher and the playback/download session threads.
///
/// Booleans are atomics; the track and the error messages are multi-word
/// values behind their own locks. Session guards (`try_begin_*`) check and
/// flip state under a single lock acquisition so at most one playback and
/// one download session can ever be in flight.
#[derive(Debug, Default)]
pub struct PlayerState {
    status: RwLock<PlaybackStatus>,
    paused: AtomicBool,
    stop_requested: AtomicBool,
    downloading: AtomicBool,
    track: RwLock<Option<SelectedTrack>>,
    playback_error: RwLock<Option<String>>,
    download_error: RwLock<Option<String>>,
}

/// Point-in-time copy for rendering.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub track: Option<SelectedTrack>,
    pub status: PlaybackStatus,
    pub paused: bool,
    pub downloading: bool,
    pub playback_error: Option<String>,
    pub download_error: Option<String>,
}

impl PlayerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> PlaybackStatus {
        *self.status.read().unwrap()
    }

    /// A session is active from the `Starting` transition until its
    /// finalizer runs.
    pub fn is_active(&self) -> bool {
        self.status() != PlaybackStatus::Idle
    }

    pub fn select_track(&self, track: SelectedTrack) {
        *self.track.write().unwrap() = Some(track);
    }

    pub fn track(&self) -> Option<SelectedTrack> {
        self.track.read().unwrap().clone()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Relaxed)
    }

    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Relaxed);
    }

    /// The stop flag doubles as the cancel token handed to the source's
    /// streaming call.
    pub fn cancel_flag(&self) -> &AtomicBool {
        &self.stop_requested
    }

    pub fn is_downloading(&self) -> bool {
        self.downloading.load(Ordering::Relaxed)
    }

    /// Guarded `Idle -> Starting` transition. Returns the url to stream if
    /// no playback session is active and a track is selected; the error
    /// slot, pause and stop flags are reset under the same status lock,
    /// before any new session task can observe them.
    pub fn try_begin_playback(&self) -> Option<String> {
        let mut status = self.status.write().unwrap();
        if *status != PlaybackStatus::Idle {
            return None;
        }
        let url = self.track.read().unwrap().as_ref()?.url.clone();

        *self.playback_error.write().unwrap() = None;
        self.paused.store(false, Ordering::Relaxed);
        self.stop_requested.store(false, Ordering::Relaxed);
        *status = PlaybackStatus::Starting;
        Some(url)
    }

    pub fn mark_streaming(&self) {
        *self.status.write().unwrap() = PlaybackStatus::Streaming;
    }

    /// Terminal transition of a playback session; runs exactly once per
    /// session, on every exit path.
    pub fn finish_playback(&self) {
        let mut status = self.status.write().unwrap();
        *status = PlaybackStatus::Idle;
        self.paused.store(false, Ordering::Relaxed);
    }

    pub fn set_playback_error(&self, message: String) {
        *self.playback_error.write().unwrap() = Some(message);
    }

    pub fn playback_error(&self) -> Option<String> {
        self.playback_error.read().unwrap().clone()
    }

    /// Guarded start of a download session: requires a selected track and
    /// no download in flight. Clears the download error slot on success.
    pub fn try_begin_download(&self) -> Option<String> {
        let url = self.track.read().unwrap().as_ref()?.url.clone();
        if self
            .downloading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        *self.download_error.write().unwrap() = None;
        Some(url)
    }

    pub fn finish_download(&self) {
        self.downloading.store(false, Ordering::Release);
    }

    pub fn set_download_error(&self, message: String) {
        *self.download_error.write().unwrap() = Some(message);
    }

    pub fn download_error(&self) -> Option<String> {
        self.download_error.read().unwrap().clone()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            track: self.track(),
            status: self.status(),
            paused: self.is_paused(),
            downloading: self.is_downloading(),
            playback_error: self.playback_error(),
            download_error: self.download_error(),
        }
    }
}
