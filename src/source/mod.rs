use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use thiserror::Error;

pub mod client;
pub mod models;
pub mod soundcloud;

pub use soundcloud::SoundCloud;

#[derive(Error, Debug, Clone)]
pub enum SourceError {
    #[error("could not resolve a SoundCloud client_id")]
    ClientId,

    #[error("network error: {0}")]
    Network(String),

    #[error("SoundCloud API error: HTTP {0}")]
    Api(u16),

    #[error("unexpected API response: {0}")]
    Malformed(String),

    #[error("track format not supported (HLS/m3u8 only)")]
    Unsupported,

    #[error("decoding error: {0}")]
    Decode(String),

    #[error("file error: {0}")]
    File(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

/// One track as listed by a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub duration_ms: u64,
}

/// Blocking collaborator that resolves, decodes, downloads and searches
/// tracks. All three calls own the calling thread for their whole duration.
///
/// `stream` invokes `deliver` synchronously, in order, once per decoded
/// block of interleaved stereo f32 samples, and polls `cancel` between
/// blocks so a stop request takes effect at the next block boundary.
pub trait TrackSource: Send + Sync {
    fn stream(
        &self,
        url: &str,
        deliver: &mut dyn FnMut(&[f32]),
        cancel: &AtomicBool,
    ) -> Result<(), SourceError>;

    fn download(&self, url: &str) -> Result<PathBuf, SourceError>;

    fn search(&self, query: &str) -> Result<Vec<SearchHit>, SourceError>;
}
