use std::sync::LazyLock;

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;

use super::dom;
use super::{Extractor, Page, Site};
use crate::meta::SongMeta;

static ALBUM_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Album:\s").unwrap());
static ARTIST_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Artists?:\s").unwrap());
static RELEASED_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Released:\s").unwrap());
static GENRE_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Genres?:\s").unwrap());
// "{artist} - {title} - YouTube"
static YT_HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^-]+ - (.*) - YouTube$").unwrap());
// "{artist} - {title}"
static YT_ALT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^-]+ - (.*)").unwrap());

const YT_HEADING_SEL: &str = r#".kp-wholepage a[href*="youtube"] h3 span, [data-ved] a[href*="youtube"] h3"#;
const YT_IMAGE_SEL: &str = r#".kp-wholepage a[href*="youtube"] img[alt]"#;

/// Google knowledge panel for a song. The title is not exposed directly, so it
/// is recovered from the panel's YouTube result.
pub struct Google;

#[async_trait(?Send)]
impl Extractor for Google {
    fn site(&self) -> Site { Site::Google }

    async fn extract(&self, page: &Page) -> Result<Vec<SongMeta>> {
        let doc = &page.html;
        let album = strip(&ALBUM_PREFIX, dom::text(doc, r#"[data-attrid*=" album"]"#));
        let artist = strip(&ARTIST_PREFIX, dom::text(doc, r#"[data-attrid*=":artist"]"#));

        let mut song = SongMeta::new(song_title(page), artist, album);

        let released = strip(&RELEASED_PREFIX, dom::text(doc, r#"[data-attrid*=":release"]"#));
        if !released.is_empty() {
            song.release_year = dom::leading_int(&released);
        }
        let genres = strip(&GENRE_PREFIX, dom::text(doc, r#"[data-attrid*="_genre"]"#));
        if !genres.is_empty() {
            song.set_genres(dom::split_list(&genres));
        }
        Ok(vec![song])
    }
}

fn song_title(page: &Page) -> String {
    let heading = dom::text(&page.html, YT_HEADING_SEL);
    if let Some(c) = YT_HEADING.captures(&heading) {
        return c[1].trim().to_string();
    }
    let alt = dom::attr(dom::first(&page.html, YT_IMAGE_SEL), "alt");
    YT_ALT.captures(&alt).map(|c| c[1].trim().to_string()).unwrap_or_default()
}

fn strip(prefix: &Regex, s: String) -> String {
    prefix.replace(&s, "").trim().to_string()
}
