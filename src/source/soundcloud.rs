use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::blocking::Client;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{CODEC_TYPE_MP3, DecoderOptions};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, ReadOnlySource};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info, warn};

use crate::source::client::{API_BASE, build_client, fetch_client_id};
use crate::source::models::{ApiTrack, SearchPage, StreamLink, Transcoding};
use crate::source::{SearchHit, SourceError, TrackSource};

const SEARCH_LIMIT: u32 = 10;

/// SoundCloud-backed [`TrackSource`]. Holds one blocking HTTP client and a
/// lazily scraped client_id, reused across calls.
pub struct SoundCloud {
    http: Client,
    client_id: Mutex<Option<String>>,
}

impl SoundCloud {
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self {
            http: build_client()?,
            client_id: Mutex::new(None),
        })
    }

    fn client_id(&self) -> Result<String, SourceError> {
        let mut cached = self.client_id.lock().unwrap();
        if let Some(id) = cached.as_ref() {
            return Ok(id.clone());
        }
        let id = fetch_client_id(&self.http)?;
        *cached = Some(id.clone());
        Ok(id)
    }

    fn resolve(&self, url: &str, client_id: &str) -> Result<ApiTrack, SourceError> {
        let resp = self
            .http
            .get(format!("{API_BASE}/resolve"))
            .query(&[("url", url), ("client_id", client_id)])
            .send()?;

        if !resp.status().is_success() {
            return Err(SourceError::Api(resp.status().as_u16()));
        }

        resp.json().map_err(|e| SourceError::Malformed(e.to_string()))
    }

    /// The transcoding endpoint returns a short-lived URL for the actual
    /// media bytes.
    fn stream_link(
        &self,
        transcoding: &Transcoding,
        client_id: &str,
    ) -> Result<String, SourceError> {
        let link: StreamLink = self
            .http
            .get(&transcoding.url)
            .query(&[("client_id", client_id)])
            .send()?
            .json()
            .map_err(|e| SourceError::Malformed(e.to_string()))?;
        Ok(link.url)
    }
}

impl TrackSource for SoundCloud {
    fn stream(
        &self,
        url: &str,
        deliver: &mut dyn FnMut(&[f32]),
        cancel: &AtomicBool,
    ) -> Result<(), SourceError> {
        let client_id = self.client_id()?;
        let track = self.resolve(url, &client_id)?;
        let transcoding = track.progressive().ok_or(SourceError::Unsupported)?;
        let media_url = self.stream_link(transcoding, &client_id)?;

        debug!(track = %track.display_title(), "opening media stream");
        let response = self.http.get(&media_url).send()?;

        let mss = MediaSourceStream::new(
            Box::new(ReadOnlySource::new(response)),
            Default::default(),
        );
        let mut hint = Hint::new();
        hint.with_extension("mp3");

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| SourceError::Decode(e.to_string()))?;
        let mut format = probed.format;

        let (track_id, params) = {
            let audio_track = format
                .tracks()
                .iter()
                .find(|t| t.codec_params.codec == CODEC_TYPE_MP3)
                .ok_or_else(|| SourceError::Decode("no MP3 track in stream".into()))?;
            (audio_track.id, audio_track.codec_params.clone())
        };
        let mut decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        let mut interleaved = Vec::new();

        while let Ok(packet) = format.next_packet() {
            if cancel.load(Ordering::Relaxed) {
                debug!("streaming cancelled");
                break;
            }
            if packet.track_id() != track_id {
                continue;
            }

            // Transient decode errors (truncated frame on a lossy
            // connection) skip the packet rather than aborting the session.
            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(e) => {
                    warn!(error = %e, "skipping undecodable packet");
                    continue;
                }
            };

            if let AudioBufferRef::F32(buf) = decoded {
                let frames = buf.frames();
                let channels = buf.spec().channels.count();

                interleaved.clear();
                interleaved.reserve(frames * 2);

                if channels >= 2 {
                    let left = buf.chan(0);
                    let right = buf.chan(1);
                    for i in 0..frames {
                        interleaved.push(left[i]);
                        interleaved.push(right[i]);
                    }
                } else {
                    // Mono source: duplicate into both output channels.
                    let mono = buf.chan(0);
                    for i in 0..frames {
                        interleaved.push(mono[i]);
                        interleaved.push(mono[i]);
                    }
                }

                deliver(&interleaved);
            }
        }

        Ok(())
    }

    fn download(&self, url: &str) -> Result<PathBuf, SourceError> {
        let client_id = self.client_id()?;
        let track = self.resolve(url, &client_id)?;
        let transcoding = track.progressive().ok_or(SourceError::Unsupported)?;
        let media_url = self.stream_link(transcoding, &client_id)?;

        let filename = format!("{}.mp3", track.display_title()).replace('/', "_");
        let path = PathBuf::from(filename);

        let mut resp = self.http.get(&media_url).send()?;
        let mut file = File::create(&path).map_err(|e| SourceError::File(e.to_string()))?;
        std::io::copy(&mut resp, &mut file).map_err(|e| SourceError::File(e.to_string()))?;

        info!(path = %path.display(), "track downloaded");
        Ok(path)
    }

    fn search(&self, query: &str) -> Result<Vec<SearchHit>, SourceError> {
        let client_id = self.client_id()?;
        let limit = SEARCH_LIMIT.to_string();
        let page: SearchPage = self
            .http
            .get(format!("{API_BASE}/search/tracks"))
            .query(&[
                ("q", query),
                ("client_id", client_id.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()?
            .json()
            .map_err(|e| SourceError::Malformed(e.to_string()))?;

        let hits: Vec<SearchHit> = page
            .collection
            .into_iter()
            .filter(|track| track.progressive().is_some())
            .filter_map(|track| {
                let url = track.permalink_url.clone()?;
                Some(SearchHit {
                    title: track.display_title(),
                    url,
                    duration_ms: track.duration,
                })
            })
            .collect();

        debug!(query, hits = hits.len(), "search finished");
        Ok(hits)
    }
}
