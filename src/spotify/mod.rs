#[cfg(test)]
use std::collections::VecDeque;
#[cfg(test)]
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::meta::SongMeta;

mod types;

use types::{AccessTokenResponse, TracksResponse};

const DEFAULT_WEB_BASE: &str = "https://open.spotify.com";
const DEFAULT_API_BASE: &str = "https://api.spotify.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct SpotifyClientConfig {
    /// Pre-issued bearer token; skips the web player token endpoint.
    pub access_token: Option<String>,
    /// `sp_dc` session cookie sent to the token endpoint.
    pub sp_dc: Option<String>,
    pub web_base: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl Default for SpotifyClientConfig {
    fn default() -> Self {
        Self {
            access_token: std::env::var("SPOTIFY_ACCESS_TOKEN").ok().filter(|t| !t.is_empty()),
            sp_dc: std::env::var("SPOTIFY_SP_DC").ok().filter(|c| !c.is_empty()),
            web_base: DEFAULT_WEB_BASE.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl SpotifyClientConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(base) = std::env::var("SPOTIFY_WEB_BASE") {
            cfg.web_base = base;
        }
        if let Ok(base) = std::env::var("SPOTIFY_API_BASE") {
            cfg.api_base = base;
        }
        if let Ok(timeout) = std::env::var("MMS_HTTP_TIMEOUT_SECS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                cfg.timeout = Duration::from_secs(parsed);
            }
        }
        cfg
    }
}

/// Looks up track metadata by Spotify track id.
#[async_trait]
pub trait TrackSource: Send + Sync {
    async fn tracks_by_id(&self, ids: &[String]) -> Result<Vec<SongMeta>, SpotifyError>;

    async fn track_by_id(&self, id: &str) -> Result<Option<SongMeta>, SpotifyError> {
        let tracks = self.tracks_by_id(&[id.to_string()]).await?;
        Ok(tracks.into_iter().next())
    }
}

pub struct SpotifyClient {
    http: HttpClient,
    cfg: SpotifyClientConfig,
    token: OnceCell<String>,
}

impl SpotifyClient {
    pub fn new(cfg: SpotifyClientConfig) -> Result<Self, SpotifyError> {
        let http = HttpClient::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(SpotifyError::http)?;
        Ok(Self { http, cfg, token: OnceCell::new() })
    }

    /// Bearer token, fetched at most once per client.
    pub async fn token(&self) -> Result<&str, SpotifyError> {
        let token = self
            .token
            .get_or_try_init(|| async move {
                match &self.cfg.access_token {
                    Some(t) => Ok(t.clone()),
                    None => self.fetch_token().await,
                }
            })
            .await?;
        Ok(token.as_str())
    }

    async fn fetch_token(&self) -> Result<String, SpotifyError> {
        let mut req = self.http.get(self.token_url());
        if let Some(sp_dc) = &self.cfg.sp_dc {
            req = req.header(reqwest::header::COOKIE, format!("sp_dc={sp_dc}"));
        }
        let response = req.send().await.map_err(SpotifyError::http)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(SpotifyError::http)?;
        if !status.is_success() {
            return Err(SpotifyError::Api { status });
        }
        let parsed: AccessTokenResponse = serde_json::from_slice(&bytes).map_err(SpotifyError::Decode)?;
        parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(SpotifyError::MissingToken)
    }

    fn token_url(&self) -> String {
        format!(
            "{}/get_access_token?reason=transport&productType=web_player",
            self.cfg.web_base.trim_end_matches('/')
        )
    }

    fn tracks_url(&self, ids: &[String]) -> String {
        format!(
            "{}/v1/tracks?ids={}&market=from_token",
            self.cfg.api_base.trim_end_matches('/'),
            ids.join(",")
        )
    }
}

#[async_trait]
impl TrackSource for SpotifyClient {
    async fn tracks_by_id(&self, ids: &[String]) -> Result<Vec<SongMeta>, SpotifyError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let token = self.token().await?;
        let endpoint = self.tracks_url(ids);
        debug!(endpoint = %endpoint, "fetching spotify tracks");

        let response = self
            .http
            .get(endpoint)
            .bearer_auth(token)
            .send()
            .await
            .map_err(SpotifyError::http)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(SpotifyError::http)?;
        if !status.is_success() {
            return Err(SpotifyError::Api { status });
        }

        let parsed: TracksResponse = serde_json::from_slice(&bytes).map_err(SpotifyError::Decode)?;
        // unknown ids come back as null entries
        Ok(parsed.tracks.into_iter().flatten().map(SongMeta::from).collect())
    }
}

#[derive(Debug)]
pub enum SpotifyError {
    MissingToken,
    Http(reqwest::Error),
    Timeout,
    Api { status: StatusCode },
    Decode(serde_json::Error),
    #[cfg(test)]
    MockQueueEmpty,
}

impl SpotifyError {
    fn http(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SpotifyError::Timeout
        } else {
            SpotifyError::Http(err)
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            SpotifyError::Timeout => true,
            SpotifyError::Http(_) => true,
            SpotifyError::Api { status } => status.is_server_error(),
            SpotifyError::MissingToken | SpotifyError::Decode(_) => false,
            #[cfg(test)]
            SpotifyError::MockQueueEmpty => false,
        }
    }
}

impl std::fmt::Display for SpotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpotifyError::MissingToken => write!(f, "could not get a spotify access token"),
            SpotifyError::Http(err) => write!(f, "http error: {err}"),
            SpotifyError::Timeout => write!(f, "request timed out"),
            SpotifyError::Api { status } => write!(f, "spotify api error {status}"),
            SpotifyError::Decode(err) => write!(f, "decode error: {err}"),
            #[cfg(test)]
            SpotifyError::MockQueueEmpty => write!(f, "mock track source response queue is empty"),
        }
    }
}

impl std::error::Error for SpotifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SpotifyError::Http(err) => Some(err),
            SpotifyError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockTrackSource {
    responses: Mutex<VecDeque<Result<Vec<SongMeta>, SpotifyError>>>,
    calls: Mutex<Vec<Vec<String>>>,
}

#[cfg(test)]
impl MockTrackSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, resp: Result<Vec<SongMeta>, SpotifyError>) {
        self.responses.lock().unwrap().push_back(resp);
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl TrackSource for MockTrackSource {
    async fn tracks_by_id(&self, ids: &[String]) -> Result<Vec<SongMeta>, SpotifyError> {
        self.calls.lock().unwrap().push(ids.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(SpotifyError::MockQueueEmpty))
    }
}
