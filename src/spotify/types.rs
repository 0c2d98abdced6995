use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::meta::SongMeta;

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AccessTokenResponse {
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct TracksResponse {
    #[serde(default)]
    pub tracks: Vec<Option<ApiTrack>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTrack {
    pub name: String,
    #[serde(default)]
    pub duration_ms: u64,
    pub album: ApiAlbum,
    #[serde(default)]
    pub artists: Vec<ApiArtist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiAlbum {
    pub name: String,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiArtist {
    pub name: String,
}

impl From<ApiTrack> for SongMeta {
    fn from(t: ApiTrack) -> Self {
        let artists = t.artists.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(", ");
        let mut song = SongMeta::new(t.name, artists, t.album.name);
        song.duration_length = Some(format!("{:.2} minutes", t.duration_ms as f64 / 60_000.0));
        song.release_year = t
            .album
            .release_date
            .as_deref()
            .and_then(|d| YEAR.find(d))
            .and_then(|m| m.as_str().parse().ok());
        song
    }
}
