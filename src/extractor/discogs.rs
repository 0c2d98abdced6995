use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::dom;
use super::{Extractor, Page, Site};
use crate::meta::SongMeta;

const SCHEMA_SEL: &str = r#"script[type="application/ld+json"]#release_schema, script[type="application/ld+json"]#master_schema"#;

/// Discogs release and master pages embed a schema.org MusicRelease as JSON-LD.
pub struct Discogs;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReleaseSchema {
    #[serde(default)]
    name: String,
    #[serde(default)]
    genre: OneOrMany<String>,
    #[serde(default)]
    date_published: Option<Value>,
    #[serde(default)]
    release_of: Option<ReleaseOf>,
    #[serde(default)]
    tracks: Vec<Named>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReleaseOf {
    #[serde(default)]
    by_artist: OneOrMany<Named>,
}

#[derive(Debug, Deserialize)]
struct Named {
    #[serde(default)]
    name: String,
}

// JSON-LD allows a bare value wherever a list is expected
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self { OneOrMany::Many(Vec::new()) }
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(v) => v,
        }
    }
}

#[async_trait(?Send)]
impl Extractor for Discogs {
    fn site(&self) -> Site { Site::Discogs }

    async fn extract(&self, page: &Page) -> Result<Vec<SongMeta>> {
        let Some(el) = dom::first(&page.html, SCHEMA_SEL) else { return Ok(Vec::new()) };
        let schema: ReleaseSchema = match serde_json::from_str(&dom::raw_text(el)) {
            Ok(s) => s,
            Err(e) => {
                warn!(url = %page.url, error = %e, "unreadable release schema");
                return Ok(Vec::new());
            }
        };
        Ok(songs_from_schema(schema))
    }
}

fn songs_from_schema(schema: ReleaseSchema) -> Vec<SongMeta> {
    let album = schema.name.trim().to_string();
    let genres = schema.genre.into_vec();
    let artist = schema
        .release_of
        .map(|r| r.by_artist.into_vec().into_iter().map(|a| a.name.trim().to_string()).collect::<Vec<_>>().join(", "))
        .unwrap_or_default();
    let release_year = schema.date_published.as_ref().and_then(year_of);

    schema
        .tracks
        .into_iter()
        .map(|track| {
            let mut song = SongMeta::new(track.name.trim(), artist.clone(), album.clone());
            song.set_genres(&genres);
            song.release_year = release_year;
            song
        })
        .collect()
}

fn year_of(v: &Value) -> Option<i32> {
    match v {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => dom::leading_int(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::page;

    const RELEASE: &str = r#"
    <html><head>
      <script type="application/ld+json" id="release_schema">
      {
        "@context": "http://schema.org",
        "@type": "MusicRelease",
        "name": "Homework",
        "genre": ["Electronic"],
        "datePublished": 1997,
        "releaseOf": {
          "@type": "MusicAlbum",
          "name": "Homework",
          "byArtist": [{"@type": "MusicGroup", "name": "Daft Punk"}]
        },
        "tracks": [
          {"@type": "MusicRecording", "name": "Daftendirekt"},
          {"@type": "MusicRecording", "name": "WDPK 83.7 FM"},
          {"@type": "MusicRecording", "name": "Revolution 909"}
        ]
      }
      </script>
    </head><body></body></html>
    "#;

    #[tokio::test]
    async fn release_schema_yields_one_record_per_track() {
        let songs = Discogs.extract(&page("https://www.discogs.com/release/1", RELEASE)).await.unwrap();
        let titles: Vec<&str> = songs.iter().map(|s| s.song_title.as_str()).collect();
        assert_eq!(titles, vec!["Daftendirekt", "WDPK 83.7 FM", "Revolution 909"]);
        for s in &songs {
            assert_eq!(s.album_title, "Homework");
            assert_eq!(s.artist_name, "Daft Punk");
            assert_eq!(s.genres, vec!["Electronic"]);
            assert_eq!(s.primary_genre.as_deref(), Some("Electronic"));
            assert_eq!(s.release_year, Some(1997));
        }
    }

    #[tokio::test]
    async fn master_schema_with_several_artists_and_string_date() {
        let html = r#"<script type="application/ld+json" id="master_schema">
          {"name": "Collab", "genre": "Jazz", "datePublished": "2004-06-01",
           "releaseOf": {"byArtist": [{"name": "A"}, {"name": "B"}]},
           "tracks": [{"name": "Duet"}]}
        </script>"#;
        let songs = Discogs.extract(&page("https://www.discogs.com/master/2", html)).await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].artist_name, "A, B");
        assert_eq!(songs[0].genres, vec!["Jazz"]);
        assert_eq!(songs[0].release_year, Some(2004));
    }

    #[tokio::test]
    async fn malformed_schema_degrades_to_empty() {
        let html = r#"<script type="application/ld+json" id="release_schema">{ not json</script>"#;
        let songs = Discogs.extract(&page("https://www.discogs.com/release/3", html)).await.unwrap();
        assert!(songs.is_empty());
    }

    #[tokio::test]
    async fn other_json_ld_blocks_are_ignored() {
        let html = r#"<script type="application/ld+json" id="breadcrumbs">{"name": "x", "tracks": [{"name": "y"}]}</script>"#;
        let songs = Discogs.extract(&page("https://www.discogs.com/release/4", html)).await.unwrap();
        assert!(songs.is_empty());
    }
}
