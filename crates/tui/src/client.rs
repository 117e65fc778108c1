use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use escape_admin_core::{GameRecord, GamesListing, PublishKey};
use serde::Deserialize;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Reply envelope shared by both admin endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Envelope {
    ok: bool,
    error: Option<String>,
    games: Vec<GameRecord>,
    base_dirs: Vec<String>,
}

impl Envelope {
    fn into_result(self) -> Result<GamesListing> {
        if self.ok {
            Ok(GamesListing {
                base_dirs: self.base_dirs,
                games: self.games,
            })
        } else {
            Err(anyhow!(self
                .error
                .unwrap_or_else(|| "server reported failure".to_string())))
        }
    }
}

/// HTTP client for the admin API server.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /api/games/list`
    pub async fn list_games(&self) -> Result<GamesListing> {
        let url = self.url("/api/games/list");
        debug!(%url, "Fetching games");
        let envelope: Envelope = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?
            .json()
            .await
            .context("failed to decode games listing")?;
        envelope.into_result()
    }

    /// `POST /api/games/publish`
    pub async fn publish(&self, key: &PublishKey) -> Result<()> {
        let url = self.url("/api/games/publish");
        debug!(%url, ?key, "Publishing game");
        let resp = self
            .http
            .post(&url)
            .json(key)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;
        let status = resp.status();
        let text = resp.text().await.context("failed to read publish reply")?;
        let envelope: Envelope = serde_json::from_str(&text).map_err(|err| {
            anyhow!(
                "HTTP {status}: unexpected reply ({err}): {}",
                text.chars().take(200).collect::<String>()
            )
        })?;
        if !status.is_success() && envelope.ok {
            return Err(anyhow!("HTTP {status}"));
        }
        envelope.into_result().map(|_| ())
    }
}
