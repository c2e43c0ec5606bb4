//! Async HTTP client wrapping the stargaze JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response};
use serde::{Serialize, de::DeserializeOwned};
use stargaze_core::{
  participation::NewParticipation,
  stats::{SkySnapshot, SkyStats},
};
use stargaze_field::SnapshotSource;

/// Connection settings for the stargaze API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the stargaze JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

#[derive(Serialize)]
struct RecordBody<'a> {
  action_key: &'a str,
  name:       Option<&'a str>,
  email:      Option<&'a str>,
  comment:    Option<&'a str>,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(10))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Decode a success body, or turn the API's `{"error": …}` into an error.
  async fn decode<T: DeserializeOwned>(what: &str, resp: Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
      let message = resp
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_owned))
        .unwrap_or_default();
      return Err(anyhow!("{what} → {status} {message}"));
    }
    resp.json().await.with_context(|| format!("deserialising {what}"))
  }

  // ── Aggregates ────────────────────────────────────────────────────────────

  /// `GET /api/skies/{sky}/stats`
  pub async fn stats(&self, sky_id: &str) -> Result<SkyStats> {
    let what = format!("GET /skies/{sky_id}/stats");
    let resp = self
      .client
      .get(self.url(&format!("/skies/{sky_id}/stats")))
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    Self::decode(&what, resp).await
  }

  /// `GET /api/skies/{sky}/snapshot`
  pub async fn snapshot(&self, sky_id: &str) -> Result<SkySnapshot> {
    let what = format!("GET /skies/{sky_id}/snapshot");
    let resp = self
      .client
      .get(self.url(&format!("/skies/{sky_id}/snapshot")))
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    Self::decode(&what, resp).await
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// `POST /api/skies/{sky}/participations`
  pub async fn record(&self, input: &NewParticipation) -> Result<SkyStats> {
    let what = format!("POST /skies/{}/participations", input.sky_id);
    let body = RecordBody {
      action_key: &input.action_key,
      name:       input.name.as_deref(),
      email:      input.email.as_deref(),
      comment:    input.comment.as_deref(),
    };
    let resp = self
      .client
      .post(self.url(&format!("/skies/{}/participations", input.sky_id)))
      .json(&body)
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    Self::decode(&what, resp).await
  }
}

impl SnapshotSource for ApiClient {
  type Error = anyhow::Error;

  async fn fetch(&self, sky_id: &str) -> Result<SkySnapshot> { self.snapshot(sky_id).await }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn urls_are_prefixed_once() {
    let client = ApiClient::new(ApiConfig { base_url: "http://localhost:8420/".into() }).unwrap();
    assert_eq!(client.url("/skies/demo/stats"), "http://localhost:8420/api/skies/demo/stats");
  }
}
