use std::sync::LazyLock;

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;

use super::dom::{self, non_empty};
use super::{Extractor, Page, Site};
use crate::meta::SongMeta;

static TRAILING_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}$").unwrap());

/// AllMusic album pages: one record per track row.
pub struct AllMusic;

#[async_trait(?Send)]
impl Extractor for AllMusic {
    fn site(&self) -> Site { Site::AllMusic }

    async fn extract(&self, page: &Page) -> Result<Vec<SongMeta>> {
        let doc = &page.html;
        let album = dom::text(doc, "h1.album-title");

        // primary genre first, then styles
        let mut genres = vec![dom::text(doc, r#".basic-info .genre a[href*="genre"]"#)];
        genres.extend(dom::all(doc, r#".basic-info .styles a[href*="style"]"#).into_iter().map(dom::inner_text));

        let release_year = dom::first(doc, ".basic-info .release-date span")
            .map(dom::inner_text)
            .and_then(|s| TRAILING_YEAR.find(&s).and_then(|m| dom::leading_int(m.as_str())));

        let songs = dom::all(doc, "tr.track")
            .into_iter()
            .map(|row| {
                let mut song = SongMeta::new(dom::text_in(row, ".title"), dom::text_in(row, ".composer"), album.clone());
                song.set_genres(&genres);
                song.duration_length = non_empty(dom::text_in(row, "td.time"));
                song.release_year = release_year;
                song
            })
            .collect();
        Ok(songs)
    }
}
