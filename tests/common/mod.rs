use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use sctui::audio::error::AudioError;
use sctui::audio::sink::AudioSink;
use sctui::source::{SearchHit, SourceError, TrackSource};

const GATE_POLL: Duration = Duration::from_millis(2);

/// In-memory sink capturing every enqueue and pause call.
#[derive(Default)]
pub struct RecordingSink {
    chunks: Mutex<Vec<Vec<f32>>>,
    queued: AtomicUsize,
    pause_calls: Mutex<Vec<bool>>,
}

impl RecordingSink {
    pub fn chunk_count(&self) -> usize {
        self.chunks.lock().unwrap().len()
    }

    pub fn last_pause_call(&self) -> Option<bool> {
        self.pause_calls.lock().unwrap().last().copied()
    }
}

impl AudioSink for RecordingSink {
    fn enqueue(&self, chunk: &[f32]) -> Result<(), AudioError> {
        self.chunks.lock().unwrap().push(chunk.to_vec());
        Ok(())
    }

    fn queued_bytes(&self) -> usize {
        self.queued.load(Ordering::Relaxed)
    }

    fn set_paused(&self, paused: bool) {
        self.pause_calls.lock().unwrap().push(paused);
    }
}

/// Scripted collaborator. `hold_end` keeps the streaming call alive after
/// the last chunk until the test releases it or requests a stop, so tests
/// can observe a long-lived `Streaming` session deterministically.
pub struct GatedSource {
    chunks: Vec<Vec<f32>>,
    hold_end: AtomicBool,
    pace: Option<Duration>,
    stream_failure: Option<String>,
    download_delay: Duration,
    downloads_finished: AtomicUsize,
    hits: Vec<SearchHit>,
}

impl GatedSource {
    pub fn finite(chunks: Vec<Vec<f32>>) -> Self {
        Self {
            chunks,
            hold_end: AtomicBool::new(false),
            pace: None,
            stream_failure: None,
            download_delay: Duration::ZERO,
            downloads_finished: AtomicUsize::new(0),
            hits: Vec::new(),
        }
    }

    /// Delivers the first chunk over and over at `interval` until
    /// cancelled, like a decoder keeping pace with the network.
    pub fn paced(chunk: Vec<f32>, interval: Duration) -> Self {
        let mut source = Self::finite(vec![chunk]);
        source.pace = Some(interval);
        source
    }

    pub fn endless(chunks: Vec<Vec<f32>>) -> Self {
        let source = Self::finite(chunks);
        source.hold_end.store(true, Ordering::Relaxed);
        source
    }

    pub fn failing(message: &str) -> Self {
        Self {
            stream_failure: Some(message.into()),
            ..Self::finite(Vec::new())
        }
    }

    pub fn with_download_delay(mut self, delay: Duration) -> Self {
        self.download_delay = delay;
        self
    }

    pub fn hold(&self) {
        self.hold_end.store(true, Ordering::Relaxed);
    }

    pub fn release(&self) {
        self.hold_end.store(false, Ordering::Relaxed);
    }

    pub fn downloads_finished(&self) -> usize {
        self.downloads_finished.load(Ordering::Relaxed)
    }
}

impl TrackSource for GatedSource {
    fn stream(
        &self,
        _url: &str,
        deliver: &mut dyn FnMut(&[f32]),
        cancel: &AtomicBool,
    ) -> Result<(), SourceError> {
        if let Some(interval) = self.pace {
            while !cancel.load(Ordering::Relaxed) {
                deliver(&self.chunks[0]);
                std::thread::sleep(interval);
            }
            return Ok(());
        }

        for chunk in &self.chunks {
            if cancel.load(Ordering::Relaxed) {
                return Ok(());
            }
            deliver(chunk);
        }
        while self.hold_end.load(Ordering::Relaxed) && !cancel.load(Ordering::Relaxed) {
            std::thread::sleep(GATE_POLL);
        }
        match &self.stream_failure {
            Some(message) => Err(SourceError::Decode(message.clone())),
            None => Ok(()),
        }
    }

    fn download(&self, _url: &str) -> Result<PathBuf, SourceError> {
        std::thread::sleep(self.download_delay);
        self.downloads_finished.fetch_add(1, Ordering::Relaxed);
        Ok(PathBuf::from("downloaded.mp3"))
    }

    fn search(&self, _query: &str) -> Result<Vec<SearchHit>, SourceError> {
        Ok(self.hits.clone())
    }
}
