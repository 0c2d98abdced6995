use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use url::Url;

use crate::extractor::{self, Page, Site};
use crate::output::{Emitter, OutputConfig};
use crate::spotify::{SpotifyClient, SpotifyClientConfig, TrackSource};
use crate::telemetry::{self};
use crate::telemetry::ops::rip::Phase as RipPhase;

mod fetch;

pub const NO_EXTRACTOR: &str = "no extractor for host";
const NO_METADATA: &str = "no music metadata found on page";

/// mms rip: scrape music metadata from a page
#[derive(Args)]
pub struct RipCmd {
    /// Page URL; its host selects the extractor
    pub url: String,
    /// Read the rendered page from a file ("-" for stdin) instead of fetching the URL
    #[arg(long)]
    pub html: Option<PathBuf>,
    /// Write the result to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub async fn run(args: RipCmd, output: OutputConfig) -> Result<()> {
    let log = telemetry::rip();
    let _g = log.root_span_kv([
        ("url", args.url.clone()),
        ("html", format!("{:?}", args.html)),
        ("out", format!("{:?}", args.out)),
        ("json", output.prefers_json().to_string()),
    ]).entered();

    let url = Url::parse(&args.url).with_context(|| format!("Invalid URL: {}", args.url))?;

    let site = { let _s = log.span(&RipPhase::Detect).entered(); Site::from_url(&url) };
    let Some(site) = site else {
        log.warn_kv(NO_EXTRACTOR, [("host", url.host_str().unwrap_or("").to_string())]);
        return Ok(());
    };

    let html = {
        let _s = log.span_kv(&RipPhase::Load, [("source", source_label(args.html.as_deref()))]).entered();
        load_html(args.html.as_deref(), &url).await?
    };
    let page = Page::new(url, &html);

    let songs = {
        let _s = log.span_kv(&RipPhase::Extract, [("site", site.name().to_string())]).entered();
        let ex = extractor::extractor_for(site, spotify_source)?;
        extractor::rip(ex.as_ref(), &page).await?
    };

    if songs.is_empty() {
        log.warn_kv(NO_METADATA, [("site", site.name().to_string())]);
        return Ok(());
    }
    log.ripped(site, songs.len());

    let _s = log.span(&RipPhase::Output).entered();
    let emitter = Emitter::from_config(output);
    match &args.out {
        Some(path) => {
            let mut file = std::fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
            emitter.emit_to(&songs, &mut file)?;
            log.info(format!("📝 Wrote {}", path.display()));
        }
        None => emitter.emit(&songs)?,
    }
    Ok(())
}

fn spotify_source() -> Result<Arc<dyn TrackSource>> {
    Ok(Arc::new(SpotifyClient::new(SpotifyClientConfig::from_env())?))
}

async fn load_html(source: Option<&Path>, url: &Url) -> Result<String> {
    match source {
        Some(p) if p == Path::new("-") => fetch::read_stdin().await,
        Some(p) => fetch::read_file(p).await,
        None => {
            let client = fetch::client()?;
            fetch::fetch_page(&client, url).await.with_context(|| format!("fetch {}", url))
        }
    }
}

fn source_label(source: Option<&Path>) -> String {
    match source {
        Some(p) if p == Path::new("-") => "stdin".to_string(),
        Some(p) => p.display().to_string(),
        None => "http".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::config::OutputFormat;
    use std::io;
    use std::sync::Mutex;

    #[test]
    fn labels_sources() {
        assert_eq!(source_label(None), "http");
        assert_eq!(source_label(Some(Path::new("-"))), "stdin");
        assert_eq!(source_label(Some(Path::new("page.html"))), "page.html");
    }

    #[tokio::test]
    async fn reads_saved_page_from_file() {
        let path = std::env::temp_dir().join(format!("mms-page-{}.html", std::process::id()));
        std::fs::write(&path, "<h1 class=\"album-title\">Post</h1>").unwrap();
        let url = Url::parse("https://www.allmusic.com/album/post").unwrap();
        let html = load_html(Some(&path), &url).await.unwrap();
        assert!(html.contains("Post"));
        std::fs::remove_file(&path).unwrap();
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    impl Captured {
        fn text(&self) -> String { String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned() }
    }

    // thread-local subscriber; #[tokio::test] runs on the current thread
    fn capture_logs() -> (Captured, tracing::subscriber::DefaultGuard) {
        let logs = Captured::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        (logs, tracing::subscriber::set_default(subscriber))
    }

    #[tokio::test]
    async fn unknown_site_warns_and_is_not_an_error() {
        let (logs, _guard) = capture_logs();
        let args = RipCmd { url: "https://example.org/".into(), html: None, out: None };
        run(args, OutputConfig { format: OutputFormat::Tsv }).await.unwrap();
        let text = logs.text();
        assert!(text.contains("WARN"));
        assert!(text.contains("no extractor for host"));
        assert!(text.contains("host=example.org"));
    }

    #[tokio::test]
    async fn page_without_records_warns_and_writes_nothing() {
        let dir = std::env::temp_dir();
        let page = dir.join(format!("mms-empty-{}.html", std::process::id()));
        let out = dir.join(format!("mms-empty-{}.tsv", std::process::id()));
        std::fs::write(&page, "<html><body><p>Nothing here</p></body></html>").unwrap();

        let (logs, _guard) = capture_logs();
        let args = RipCmd {
            url: "https://www.allmusic.com/album/none".into(),
            html: Some(page.clone()),
            out: Some(out.clone()),
        };
        run(args, OutputConfig { format: OutputFormat::Tsv }).await.unwrap();
        let text = logs.text();
        assert!(text.contains("no music metadata found on page"));
        assert!(text.contains("site=AllMusic"));
        assert!(!out.exists());

        std::fs::remove_file(&page).unwrap();
    }

    #[tokio::test]
    async fn writes_records_to_out_file() {
        let dir = std::env::temp_dir();
        let page = dir.join(format!("mms-rip-{}.html", std::process::id()));
        let out = dir.join(format!("mms-rip-{}.tsv", std::process::id()));
        std::fs::write(&page, r#"<h1 class="album-title">Post</h1>
            <table><tr class="track"><td class="title">Hyperballad</td><td class="composer">Björk</td></tr></table>"#).unwrap();

        let args = RipCmd {
            url: "https://www.allmusic.com/album/post".into(),
            html: Some(page.clone()),
            out: Some(out.clone()),
        };
        run(args, OutputConfig { format: OutputFormat::Tsv }).await.unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "Hyperballad\tBjörk\tPost\n");

        std::fs::remove_file(&page).unwrap();
        std::fs::remove_file(&out).unwrap();
    }
}
