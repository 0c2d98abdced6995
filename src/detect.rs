use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use url::Url;

use crate::extractor::Site;
use crate::rip::NO_EXTRACTOR;
use crate::telemetry::{self};
use crate::telemetry::ops::detect::Phase as DetectPhase;

/// mms detect: report which extractor handles a URL
#[derive(Args)]
pub struct DetectCmd {
    pub url: String,
}

#[derive(Serialize)]
pub struct DetectResult {
    pub host: String,
    pub site: Option<&'static str>,
}

pub fn run(args: DetectCmd) -> Result<()> {
    let log = telemetry::detect();
    let _g = log.root_span_kv([("url", args.url.clone())]).entered();

    let url = Url::parse(&args.url).with_context(|| format!("Invalid URL: {}", args.url))?;
    let result = {
        let _s = log.span(&DetectPhase::Match).entered();
        detect(&url)
    };

    if telemetry::config::json_mode() {
        println!("{}", serde_json::to_string(&result)?);
    } else if let Some(site) = result.site {
        println!("{}", site);
    }
    if result.site.is_none() {
        log.warn_kv(NO_EXTRACTOR, [("host", result.host)]);
    }
    Ok(())
}

fn detect(url: &Url) -> DetectResult {
    DetectResult {
        host: url.host_str().unwrap_or("").to_string(),
        site: Site::from_url(url).map(|s| s.name()),
    }
}
