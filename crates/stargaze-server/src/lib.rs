//! HTTP server for Stargaze.
//!
//! Mounts the JSON API from `stargaze-api` under `/api` over a SQLite-backed
//! [`Aggregator`], with request tracing and a liveness probe.

use std::path::PathBuf;

use axum::{Router, routing::get};
use serde::Deserialize;
use stargaze_core::{
  engine::{Aggregator, AggregatorConfig, DEFAULT_MAX_COMMENT_LEN},
  store::SkyStore,
};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `stargaze.toml` and
/// `STARGAZE_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  /// Longest accepted participation comment, in characters.
  pub max_comment_len: usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            "127.0.0.1".to_string(),
      port:            8420,
      store_path:      PathBuf::from("~/.local/share/stargaze/stargaze.db"),
      max_comment_len: DEFAULT_MAX_COMMENT_LEN,
    }
  }
}

impl ServerConfig {
  pub fn aggregator_config(&self) -> AggregatorConfig {
    AggregatorConfig { max_comment_len: self.max_comment_len }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(aggregator: Aggregator<S>) -> Router
where
  S: SkyStore + 'static,
{
  Router::new()
    .route("/healthz", get(|| async { "ok" }))
    .nest("/api", stargaze_api::api_router(aggregator))
    .layer(TraceLayer::new_for_http())
}
