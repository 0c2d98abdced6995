use std::fmt;
use std::sync::{Arc, LazyLock};

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use scraper::Html;
use tracing::warn;
use url::Url;

use crate::meta::SongMeta;
use crate::spotify::TrackSource;

mod allmusic;
mod bing;
mod discogs;
pub mod dom;
mod google;
mod spotify;

pub use allmusic::AllMusic;
pub use bing::Bing;
pub use discogs::Discogs;
pub use google::Google;
pub use spotify::Spotify;

/// Snapshot of a rendered page: where it lives and what it contains.
pub struct Page {
    pub url: Url,
    pub html: Html,
}

impl Page {
    pub fn new(url: Url, html: &str) -> Self {
        Self { url, html: Html::parse_document(html) }
    }

    pub fn path(&self) -> &str { self.url.path() }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Site { Bing, AllMusic, Google, Discogs, Spotify }

static BING_HOST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:www\.)?bing\.com").unwrap());
static ALLMUSIC_HOST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:www\.)?allmusic\.com").unwrap());
static GOOGLE_HOST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:www\.)?google\.com").unwrap());
static DISCOGS_HOST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:www\.)?discogs\.com").unwrap());

impl Site {
    pub fn detect(host: &str) -> Option<Site> {
        if BING_HOST.is_match(host) { Some(Site::Bing) }
        else if ALLMUSIC_HOST.is_match(host) { Some(Site::AllMusic) }
        else if GOOGLE_HOST.is_match(host) { Some(Site::Google) }
        else if DISCOGS_HOST.is_match(host) { Some(Site::Discogs) }
        else if host == "open.spotify.com" { Some(Site::Spotify) }
        else { None }
    }

    pub fn from_url(url: &Url) -> Option<Site> {
        url.host_str().and_then(Site::detect)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Site::Bing => "Bing",
            Site::AllMusic => "AllMusic",
            Site::Google => "Google",
            Site::Discogs => "Discogs",
            Site::Spotify => "Spotify",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

/// One extraction routine per site.
// scraper::Html is not Sync, so extraction futures stay on the current thread.
#[async_trait(?Send)]
pub trait Extractor {
    fn site(&self) -> Site;
    async fn extract(&self, page: &Page) -> Result<Vec<SongMeta>>;
}

/// Pick the routine for a site. `tracks` is only called for Spotify.
pub fn extractor_for<F>(site: Site, tracks: F) -> Result<Box<dyn Extractor>>
where
    F: FnOnce() -> Result<Arc<dyn TrackSource>>,
{
    let ex: Box<dyn Extractor> = match site {
        Site::Bing => Box::new(Bing),
        Site::AllMusic => Box::new(AllMusic),
        Site::Google => Box::new(Google),
        Site::Discogs => Box::new(Discogs),
        Site::Spotify => Box::new(Spotify::new(tracks()?)),
    };
    Ok(ex)
}

/// Run an extractor and keep only records with every required field.
pub async fn rip(extractor: &dyn Extractor, page: &Page) -> Result<Vec<SongMeta>> {
    let songs = extractor.extract(page).await?;
    Ok(keep_complete(extractor.site(), songs))
}

pub fn keep_complete(site: Site, songs: Vec<SongMeta>) -> Vec<SongMeta> {
    songs
        .into_iter()
        .filter(|s| {
            if s.is_complete() { return true; }
            warn!(site = %site, title = %s.song_title, missing = %s.missing_fields().join(","), "dropping incomplete record");
            false
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn page(url: &str, html: &str) -> Page {
    Page::new(Url::parse(url).unwrap(), html)
}
