use lazy_static::lazy_static;
use regex::Regex;
use reqwest::blocking::Client;
use tracing::debug;

use crate::source::SourceError;

pub const API_BASE: &str = "https://api-v2.soundcloud.com";
const DISCOVER_URL: &str = "https://soundcloud.com/discover";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

lazy_static! {
    static ref SCRIPT_SRC: Regex = Regex::new(r#"src="([^"]+\.js)""#).unwrap();
    static ref CLIENT_ID: Regex =
        Regex::new(r#"client_id[:=]\s*["']?([a-zA-Z0-9]{32})["']?"#).unwrap();
}

pub fn build_client() -> Result<Client, SourceError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| SourceError::Network(e.to_string()))
}

/// SoundCloud does not hand out API keys; the web player's client_id is
/// embedded in one of its application scripts. Scrape the discover page for
/// script URLs and scan the newest few for the key.
pub fn fetch_client_id(client: &Client) -> Result<String, SourceError> {
    let home = client.get(DISCOVER_URL).send()?.text()?;

    let script_urls: Vec<String> = SCRIPT_SRC
        .captures_iter(&home)
        .map(|cap| {
            let url = cap[1].to_string();
            if url.starts_with('/') {
                format!("https://soundcloud.com{url}")
            } else {
                url
            }
        })
        .collect();

    for url in script_urls.iter().rev().take(5) {
        let Ok(js) = client.get(url).send().and_then(|r| r.text()) else {
            continue;
        };
        if let Some(cap) = CLIENT_ID.captures(&js) {
            debug!(script = %url, "client_id found");
            return Ok(cap[1].to_string());
        }
    }

    Err(SourceError::ClientId)
}
