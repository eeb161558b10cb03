use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rodio::{OutputStream, Sink, Source};

use crate::audio::error::AudioError;

pub const SAMPLE_RATE: u32 = 44_100;
pub const CHANNELS: u16 = 2;
pub const BYTES_PER_SAMPLE: usize = size_of::<f32>();

/// Playback queue over the output device.
///
/// `enqueue` must return within the device API's own bounded latency;
/// throttling against the backlog is the playback session's job, which is
/// why the backlog is observable through `queued_bytes`.
pub trait AudioSink: Send + Sync {
    fn enqueue(&self, chunk: &[f32]) -> Result<(), AudioError>;
    fn queued_bytes(&self) -> usize;
    fn set_paused(&self, paused: bool);
}

/// rodio-backed sink. The `OutputStream` stays with the control thread (it
/// is not `Send`); the `Sink` handle and the backlog counter are, so the
/// playback session can drive this from its own thread.
pub struct DeviceSink {
    sink: Sink,
    queued: Arc<AtomicUsize>,
}

impl DeviceSink {
    pub fn new(stream: &OutputStream) -> Self {
        let sink = Sink::connect_new(stream.mixer());
        Self {
            sink,
            queued: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl AudioSink for DeviceSink {
    fn enqueue(&self, chunk: &[f32]) -> Result<(), AudioError> {
        if chunk.is_empty() {
            return Ok(());
        }
        self.sink
            .append(CountedChunk::new(chunk.to_vec(), self.queued.clone()));
        Ok(())
    }

    fn queued_bytes(&self) -> usize {
        self.queued.load(Ordering::Relaxed)
    }

    fn set_paused(&self, paused: bool) {
        if paused {
            self.sink.pause();
        } else {
            self.sink.play();
        }
    }
}

/// One enqueued chunk. Adds its byte length to the shared backlog counter
/// on creation and pays it back sample by sample as the output thread
/// consumes it, so the counter tracks the true device backlog.
struct CountedChunk {
    samples: Vec<f32>,
    pos: usize,
    queued: Arc<AtomicUsize>,
}

impl CountedChunk {
    fn new(samples: Vec<f32>, queued: Arc<AtomicUsize>) -> Self {
        queued.fetch_add(samples.len() * BYTES_PER_SAMPLE, Ordering::Relaxed);
        Self {
            samples,
            pos: 0,
            queued,
        }
    }
}

impl Iterator for CountedChunk {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = *self.samples.get(self.pos)?;
        self.pos += 1;
        self.queued.fetch_sub(BYTES_PER_SAMPLE, Ordering::Relaxed);
        Some(sample)
    }
}

impl Source for CountedChunk {
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        CHANNELS
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

impl Drop for CountedChunk {
    // Unconsumed samples (sink cleared mid-chunk) still leave the backlog.
    fn drop(&mut self) {
        let remaining = self.samples.len() - self.pos;
        self.queued
            .fetch_sub(remaining * BYTES_PER_SAMPLE, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counted_chunk_pays_backlog_per_sample() {
        let queued = Arc::new(AtomicUsize::new(0));
        let mut chunk = CountedChunk::new(vec![0.1, 0.2, 0.3], queued.clone());
        assert_eq!(queued.load(Ordering::Relaxed), 3 * BYTES_PER_SAMPLE);

        assert_eq!(chunk.next(), Some(0.1));
        assert_eq!(queued.load(Ordering::Relaxed), 2 * BYTES_PER_SAMPLE);

        assert_eq!(chunk.next(), Some(0.2));
        assert_eq!(chunk.next(), Some(0.3));
        assert_eq!(chunk.next(), None);
        assert_eq!(queued.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn counted_chunk_drop_releases_remainder() {
        let queued = Arc::new(AtomicUsize::new(0));
        let mut chunk = CountedChunk::new(vec![0.0; 8], queued.clone());
        let _ = chunk.next();
        drop(chunk);
        assert_eq!(queued.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn counted_chunk_reports_output_format() {
        let chunk = CountedChunk::new(vec![0.0], Arc::new(AtomicUsize::new(0)));
        assert_eq!(chunk.channels(), CHANNELS);
        assert_eq!(chunk.sample_rate(), SAMPLE_RATE);
    }
}
