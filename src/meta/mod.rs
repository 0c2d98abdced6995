use serde::{Deserialize, Serialize};

pub mod format;

pub use format::{to_json, to_tsv};
#[cfg(test)]
pub use format::from_json;

/// One normalized track as scraped from a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongMeta {
    pub song_title: String,
    pub artist_name: String,
    pub album_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_length: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
}

impl SongMeta {
    pub fn new(song_title: impl Into<String>, artist_name: impl Into<String>, album_title: impl Into<String>) -> Self {
        Self {
            song_title: song_title.into(),
            artist_name: artist_name.into(),
            album_title: album_title.into(),
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.song_title.trim().is_empty() { missing.push("songTitle"); }
        if self.artist_name.trim().is_empty() { missing.push("artistName"); }
        if self.album_title.trim().is_empty() { missing.push("albumTitle"); }
        missing
    }

    /// Replace genres, keeping first occurrences only; the first genre becomes primary.
    pub fn set_genres<I, S>(&mut self, genres: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for g in genres {
            let g = g.as_ref().trim();
            if g.is_empty() || out.iter().any(|seen| seen == g) { continue; }
            out.push(g.to_string());
        }
        self.primary_genre = out.first().cloned();
        self.genres = out;
    }
}
