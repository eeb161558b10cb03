use serde::Deserialize;

pub const PROGRESSIVE: &str = "progressive";

#[derive(Deserialize)]
pub struct ApiTrack {
    pub title: String,
    pub duration: u64,
    pub media: Media,
    pub user: ApiUser,
    #[serde(default)]
    pub permalink_url: Option<String>,
}

impl ApiTrack {
    /// Tracks without a progressive MP3 transcoding (Go+ or HLS-only) are
    /// not streamable through this client.
    pub fn progressive(&self) -> Option<&Transcoding> {
        self.media
            .transcodings
            .iter()
            .find(|t| t.format.protocol == PROGRESSIVE)
    }

    pub fn display_title(&self) -> String {
        format!("{} - {}", self.user.username, self.title)
    }
}

#[derive(Deserialize)]
pub struct ApiUser {
    pub username: String,
}

#[derive(Deserialize)]
pub struct Media {
    pub transcodings: Vec<Transcoding>,
}

#[derive(Deserialize)]
pub struct Transcoding {
    pub url: String,
    pub format: TranscodingFormat,
}

#[derive(Deserialize)]
pub struct TranscodingFormat {
    pub protocol: String,
}

#[derive(Deserialize)]
pub struct StreamLink {
    pub url: String,
}

#[derive(Deserialize)]
pub struct SearchPage {
    pub collection: Vec<ApiTrack>,
}
