use std::sync::{Arc, LazyLock};

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use scraper::ElementRef;
use tracing::{info, warn};

use super::dom::{self, non_empty};
use super::{Extractor, Page, Site};
use crate::meta::SongMeta;
use crate::spotify::TrackSource;

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());
static TRACK_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)track/([0-9a-z]+)").unwrap());

const TRACK_ROWS: &str = r#".tracklist-container:not([class*="Recommended"]) ol.tracklist li.tracklist-row"#;

/// Spotify web player. Reads the visible track list; when nothing is listed it
/// resolves the mini player's current track through the web API.
pub struct Spotify {
    tracks: Arc<dyn TrackSource>,
}

/// Album-level values from the header of an album page.
#[derive(Default)]
struct Header {
    album: String,
    release_year: Option<i32>,
}

impl Spotify {
    pub fn new(tracks: Arc<dyn TrackSource>) -> Self {
        Self { tracks }
    }

    async fn from_mini_player(&self, track_id: &str) -> Vec<SongMeta> {
        info!(track_id, "no track rows; resolving mini player track");
        match self.tracks.track_by_id(track_id).await {
            Ok(song) => song.into_iter().collect(),
            Err(e) => {
                warn!(track_id, error = %e, retryable = e.is_retryable(), "spotify track lookup failed");
                Vec::new()
            }
        }
    }
}

#[async_trait(?Send)]
impl Extractor for Spotify {
    fn site(&self) -> Site { Site::Spotify }

    async fn extract(&self, page: &Page) -> Result<Vec<SongMeta>> {
        let songs = scrape_rows(page);
        if !songs.is_empty() {
            return Ok(songs);
        }
        match mini_player_track_id(page) {
            Some(id) => Ok(self.from_mini_player(&id).await),
            None => Ok(Vec::new()),
        }
    }
}

fn scrape_rows(page: &Page) -> Vec<SongMeta> {
    let doc = &page.html;
    let path = page.path();
    let header = if path.starts_with("/album/") { album_header(page) } else { Header::default() };

    // liked songs and playlists: only what is playing
    let active_only = path.starts_with("/collection/tracks") || path.starts_with("/playlist/");
    if active_only {
        if let Some(row) = dom::first(doc, ".tracklist-row--active") {
            return vec![parse_row(row, &header)];
        }
    }
    dom::all(doc, TRACK_ROWS).into_iter().map(|row| parse_row(row, &header)).collect()
}

fn album_header(page: &Page) -> Header {
    let doc = &page.html;
    let album = dom::attr(dom::first(doc, ".TrackListHeader .mo-info-name"), "title");
    let info = dom::text(doc, r#".TrackListHeader p[class*="additional-info"]"#);
    let release_year = YEAR.find(&info).and_then(|m| m.as_str().parse().ok());
    Header { album, release_year }
}

fn parse_row(row: ElementRef, header: &Header) -> SongMeta {
    let album = non_empty(dom::text_in(row, r#"a[class*="album-name"]"#)).unwrap_or_else(|| header.album.clone());
    let mut song = SongMeta::new(
        dom::text_in(row, ".tracklist-name"),
        dom::text_in(row, r#"a[class*="artist-name"]"#),
        album,
    );
    song.duration_length = dom::first_in(row, ".tracklist-duration span").map(dom::inner_text).and_then(non_empty);
    song.release_year = header.release_year;
    song
}

fn mini_player_track_id(page: &Page) -> Option<String> {
    let href = dom::attr(dom::first(&page.html, r#".NavBarFooter a[href*="track/"]"#), "href");
    TRACK_ID.captures(&href).map(|c| c[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::page;
    use crate::spotify::{MockTrackSource, SpotifyError};

    const ALBUM: &str = r#"
    <html><body>
      <div class="TrackListHeader">
        <span class="mo-info-name" title="Random Access Memories">Random Access Memories</span>
        <p class="text-silence entity-additional-info">2013 &bull; 13 songs, 74 min</p>
      </div>
      <section class="tracklist-container">
        <ol class="tracklist">
          <li class="tracklist-row">
            <div class="tracklist-name">Give Life Back to Music</div>
            <a class="tracklist-row__artist-name-link" href="/artist/4tZ">Daft Punk</a>
            <div class="tracklist-duration"><span>4:34</span></div>
          </li>
          <li class="tracklist-row">
            <div class="tracklist-name">Get Lucky</div>
            <a class="tracklist-row__artist-name-link" href="/artist/4tZ">Daft Punk</a>
            <a class="tracklist-row__album-name-link" href="/album/x">Get Lucky (Radio Edit)</a>
          </li>
        </ol>
      </section>
      <section class="tracklist-container RecommendedTracks">
        <ol class="tracklist">
          <li class="tracklist-row"><div class="tracklist-name">Recommended</div></li>
        </ol>
      </section>
    </body></html>
    "#;

    const PLAYLIST: &str = r#"
    <html><body>
      <section class="tracklist-container">
        <ol class="tracklist">
          <li class="tracklist-row">
            <div class="tracklist-name">Windowlicker</div>
            <a class="tracklist-row__artist-name-link">Aphex Twin</a>
            <a class="tracklist-row__album-name-link">Windowlicker</a>
          </li>
          <li class="tracklist-row tracklist-row--active">
            <div class="tracklist-name">Roygbiv</div>
            <a class="tracklist-row__artist-name-link">Boards of Canada</a>
            <a class="tracklist-row__album-name-link">Music Has the Right to Children</a>
            <div class="tracklist-duration"><span>2:31</span></div>
          </li>
        </ol>
      </section>
    </body></html>
    "#;

    const SEARCH_WITH_MINI_PLAYER: &str = r#"
    <html><body>
      <div class="search-results"><p>Top result</p></div>
      <footer class="NavBarFooter">
        <div class="now-playing"><a href="/track/0DiWol3AO6WpXZgp0goxAV">One More Time</a></div>
      </footer>
    </body></html>
    "#;

    fn extractor(mock: Arc<MockTrackSource>) -> Spotify {
        Spotify::new(mock)
    }

    #[tokio::test]
    async fn album_page_uses_header_and_skips_recommended() {
        let mock = Arc::new(MockTrackSource::new());
        let p = page("https://open.spotify.com/album/2Kh43m04B1UkVcpcRa1Zug", ALBUM);
        let songs = extractor(mock.clone()).extract(&p).await.unwrap();
        assert_eq!(songs.len(), 2);

        assert_eq!(songs[0].song_title, "Give Life Back to Music");
        assert_eq!(songs[0].artist_name, "Daft Punk");
        assert_eq!(songs[0].album_title, "Random Access Memories");
        assert_eq!(songs[0].duration_length.as_deref(), Some("4:34"));
        assert_eq!(songs[0].release_year, Some(2013));

        assert_eq!(songs[1].album_title, "Get Lucky (Radio Edit)");
        assert_eq!(songs[1].duration_length, None);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn playlist_extracts_active_row_only() {
        let p = page("https://open.spotify.com/playlist/37i9dQZF1DX", PLAYLIST);
        let songs = extractor(Arc::new(MockTrackSource::new())).extract(&p).await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].song_title, "Roygbiv");
        assert_eq!(songs[0].album_title, "Music Has the Right to Children");
        assert_eq!(songs[0].release_year, None);
    }

    #[tokio::test]
    async fn liked_songs_extract_active_row_only() {
        let p = page("https://open.spotify.com/collection/tracks", PLAYLIST);
        let songs = extractor(Arc::new(MockTrackSource::new())).extract(&p).await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].song_title, "Roygbiv");
        assert_eq!(songs[0].artist_name, "Boards of Canada");
        assert_eq!(songs[0].duration_length.as_deref(), Some("2:31"));
    }

    #[tokio::test]
    async fn playlist_without_active_row_takes_every_row() {
        let idle = PLAYLIST.replace(" tracklist-row--active", "");
        let p = page("https://open.spotify.com/playlist/37i9dQZF1DX", &idle);
        let songs = extractor(Arc::new(MockTrackSource::new())).extract(&p).await.unwrap();
        let titles: Vec<&str> = songs.iter().map(|s| s.song_title.as_str()).collect();
        assert_eq!(titles, vec!["Windowlicker", "Roygbiv"]);
    }

    #[tokio::test]
    async fn non_playlist_path_takes_every_row() {
        let p = page("https://open.spotify.com/artist/abc", PLAYLIST);
        let songs = extractor(Arc::new(MockTrackSource::new())).extract(&p).await.unwrap();
        assert_eq!(songs.len(), 2);
    }

    #[tokio::test]
    async fn falls_back_to_mini_player_lookup() {
        let mock = Arc::new(MockTrackSource::new());
        let mut expected = SongMeta::new("One More Time", "Daft Punk", "Discovery");
        expected.duration_length = Some("5.33 minutes".into());
        expected.release_year = Some(2001);
        mock.push_response(Ok(vec![expected.clone()]));

        let p = page("https://open.spotify.com/search/daft", SEARCH_WITH_MINI_PLAYER);
        let songs = extractor(mock.clone()).extract(&p).await.unwrap();
        assert_eq!(songs, vec![expected]);
        assert_eq!(mock.calls(), vec![vec!["0DiWol3AO6WpXZgp0goxAV".to_string()]]);
    }

    #[tokio::test]
    async fn failed_lookup_degrades_to_empty() {
        let mock = Arc::new(MockTrackSource::new());
        mock.push_response(Err(SpotifyError::MissingToken));
        let p = page("https://open.spotify.com/search/daft", SEARCH_WITH_MINI_PLAYER);
        assert!(extractor(mock).extract(&p).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_page_does_not_call_api() {
        let mock = Arc::new(MockTrackSource::new());
        let p = page("https://open.spotify.com/", "<html><body></body></html>");
        assert!(extractor(mock.clone()).extract(&p).await.unwrap().is_empty());
        assert!(mock.calls().is_empty());
    }
}
