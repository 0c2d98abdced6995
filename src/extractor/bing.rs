use std::sync::LazyLock;

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use scraper::ElementRef;

use super::dom::{self, non_empty};
use super::{Extractor, Page, Site};
use crate::meta::SongMeta;

static LABEL_ALBUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[Aa]lbum").unwrap());
static LABEL_ARTIST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[Aa]rtist").unwrap());
static LABEL_DURATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[Dd]uration").unwrap());
static LABEL_GENRE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[Gg]enre").unwrap());
static LABEL_RELEASE_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[Rr]elease [Yy]ear").unwrap());
static FACT_VALUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^:]+:(.*)$").unwrap());

/// Bing knowledge-graph panels: a single song, or an album's track carousel.
pub struct Bing;

#[async_trait(?Send)]
impl Extractor for Bing {
    fn site(&self) -> Site { Site::Bing }

    async fn extract(&self, page: &Page) -> Result<Vec<SongMeta>> {
        let doc = &page.html;
        if !dom::all(doc, ".carousel-content .det span.tit").is_empty() {
            return Ok(album_listing(page));
        }
        let Some(song_area) = dom::first(doc, "div[class*=entity][data-feedbk-ids*=Song]") else {
            return Ok(Vec::new());
        };
        Ok(vec![scrape_kgraph(song_area)])
    }
}

fn album_listing(page: &Page) -> Vec<SongMeta> {
    let doc = &page.html;
    let Some(area) = dom::first(doc, ".carousel-content") else { return Vec::new() };

    let album_meta = dom::first(doc, "div[class*=entity][data-feedbk-ids*=Album]").map(scrape_kgraph);

    let (artist, album) = split_heading(&dom::text_in(area, ".carousel-title"));

    dom::all_in(area, ".items .item.sel .det a[aria-label]")
        .into_iter()
        .map(|row| {
            let mut song = SongMeta::new(dom::text_in(row, ".tit"), artist.clone(), album.clone());
            song.duration_length = dom::first_in(row, ".b_floatR").map(dom::inner_text).and_then(non_empty);
            if let Some(meta) = &album_meta {
                song.genres = meta.genres.clone();
                song.primary_genre = meta.primary_genre.clone();
                song.release_year = meta.release_year;
            }
            song
        })
        .collect()
}

/// Split an `Artist / Album` heading. The spaced separator wins so that names
/// like `AC/DC` stay whole; a bare `/` is the fallback.
fn split_heading(heading: &str) -> (String, String) {
    let (artist, album) = heading
        .split_once(" / ")
        .or_else(|| heading.split_once('/'))
        .unwrap_or((heading, ""));
    (artist.trim().to_string(), album.trim().to_string())
}

/// Read `Label: value` facts from an entity panel. The panel heading is the song
/// title when facts only a song has (album, duration) are present, else the album title.
fn scrape_kgraph(area: ElementRef) -> SongMeta {
    let mut song = SongMeta::default();
    let mut is_song = false;

    let facts = dom::first_in(area, "ul[class*=vList]")
        .map(|list| dom::all_in(list, "ul > li"))
        .unwrap_or_default();

    for fact in facts {
        let Some(label_el) = dom::first_in(fact, "div a:first-child") else { continue };
        let label = dom::inner_text(label_el).replacen(':', "", 1);
        let text = dom::inner_text(fact);
        let Some(value) = FACT_VALUE.captures(&text).map(|c| c[1].trim().to_string()) else { continue };

        if LABEL_ALBUM.is_match(&label) {
            song.album_title = value;
            is_song = true;
        } else if LABEL_ARTIST.is_match(&label) {
            song.artist_name = value;
        } else if LABEL_DURATION.is_match(&label) {
            song.duration_length = non_empty(value);
            is_song = true;
        } else if LABEL_GENRE.is_match(&label) {
            song.set_genres(dom::split_list(&value));
        } else if LABEL_RELEASE_YEAR.is_match(&label) {
            song.release_year = dom::leading_int(&value);
        }
    }

    let heading = dom::text_in(area, "h2");
    if is_song { song.song_title = heading; } else { song.album_title = heading; }
    song
}
