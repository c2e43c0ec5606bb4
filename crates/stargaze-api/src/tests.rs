//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::{Body, to_bytes},
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use stargaze_core::{
  action::{ActionDef, Phase},
  engine::{Aggregator, AggregatorConfig},
  store::SkyStore,
};
use stargaze_store_sqlite::SqliteStore;
use tower::ServiceExt as _;

use crate::api_router;

/// Sky `demo` with actions `flyer` (weight 1) and `march` (weight 2).
async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store.create_sky("demo".into(), "Demo Day".into()).await.unwrap();
  store
    .define_action(ActionDef::new("demo", "flyer", "Hand out flyers", Phase::Before))
    .await
    .unwrap();
  store
    .define_action(ActionDef::new("demo", "march", "Join the march", Phase::Day).with_weight(2))
    .await
    .unwrap();
  let config = AggregatorConfig { max_comment_len: 20 };
  api_router(Aggregator::with_config(Arc::new(store), config))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

// ── Skies ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_list_and_get_skies() {
  let app = app().await;
  let (status, sky) =
    send(&app, "POST", "/skies", Some(json!({"sky_id": "week", "title": "Climate Week"}))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(sky["title"], "Climate Week");

  let (status, skies) = send(&app, "GET", "/skies", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(skies.as_array().unwrap().len(), 2);

  let (status, sky) = send(&app, "GET", "/skies/week", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(sky["sky_id"], "week");
}

#[tokio::test]
async fn unknown_sky_is_404() {
  let app = app().await;
  let (status, body) = send(&app, "GET", "/skies/nowhere", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("nowhere"));
  let (status, _) = send(&app, "GET", "/skies/nowhere/actions", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_or_invalid_sky_is_rejected() {
  let app = app().await;
  let (status, _) =
    send(&app, "POST", "/skies", Some(json!({"sky_id": "demo", "title": "Again"}))).await;
  assert_eq!(status, StatusCode::CONFLICT);
  let (status, _) =
    send(&app, "POST", "/skies", Some(json!({"sky_id": "Not A Slug", "title": "x"}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Actions ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn define_and_list_actions() {
  let app = app().await;
  let body = json!({"key": "host", "label": "Host a meetup", "phase": "before", "weight": 5, "kind": "online"});
  let (status, def) = send(&app, "POST", "/skies/demo/actions", Some(body)).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(def["weight"], 5);

  let (_, actions) = send(&app, "GET", "/skies/demo/actions", None).await;
  assert_eq!(actions.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn action_definitions_are_validated() {
  let app = app().await;
  let zero = json!({"key": "idle", "label": "Idle", "phase": "day", "weight": 0});
  let (status, _) = send(&app, "POST", "/skies/demo/actions", Some(zero)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let dup = json!({"key": "flyer", "label": "Again", "phase": "day"});
  let (status, _) = send(&app, "POST", "/skies/demo/actions", Some(dup)).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let orphan = json!({"key": "flyer", "label": "Flyers", "phase": "day"});
  let (status, _) = send(&app, "POST", "/skies/nowhere/actions", Some(orphan)).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Aggregates ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_sky_reads_zero() {
  let app = app().await;
  let (status, stats) = send(&app, "GET", "/skies/demo/stats", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(stats["total_stars"], 0);
  assert_eq!(stats["total_actions"], 0);

  let (status, stats) = send(&app, "GET", "/skies/nowhere/stats", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(stats["total_stars"], 0);
}

#[tokio::test]
async fn recording_updates_stats_by_weight() {
  let app = app().await;
  for key in ["flyer", "march", "flyer"] {
    let (status, _) = send(
      &app,
      "POST",
      "/skies/demo/participations",
      Some(json!({"action_key": key, "name": "Ada"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
  }
  let (_, stats) = send(&app, "GET", "/skies/demo/stats", None).await;
  assert_eq!(stats["total_stars"], 4);
  assert_eq!(stats["total_actions"], 3);

  let (status, stats) = send(
    &app,
    "POST",
    "/skies/demo/participations",
    Some(json!({"action_key": "march"})),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(stats["total_stars"], 6);
}

#[tokio::test]
async fn rejected_participations_are_422_and_write_nothing() {
  let app = app().await;
  let unknown = json!({"action_key": "teleport"});
  let (status, body) = send(&app, "POST", "/skies/demo/participations", Some(unknown)).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["error"].is_string());

  let long = json!({"action_key": "flyer", "comment": "x".repeat(21)});
  let (status, _) = send(&app, "POST", "/skies/demo/participations", Some(long)).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

  let (_, stats) = send(&app, "GET", "/skies/demo/stats", None).await;
  assert_eq!(stats["total_actions"], 0);
}

#[tokio::test]
async fn participants_and_snapshot_carry_metadata() {
  let app = app().await;
  for (key, name) in [("march", Some("Ada")), ("flyer", None)] {
    let body = json!({"action_key": key, "name": name});
    send(&app, "POST", "/skies/demo/participations", Some(body)).await;
  }

  let (_, people) = send(&app, "GET", "/skies/demo/participants", None).await;
  let people = people.as_array().unwrap();
  assert_eq!(people.len(), 2);
  assert_eq!(people[0]["name"], "Ada");
  assert_eq!(people[0]["phase"], "day");
  assert_eq!(people[1]["name"], Value::Null);

  let (_, limited) = send(&app, "GET", "/skies/demo/participants?limit=1", None).await;
  assert_eq!(limited.as_array().unwrap().len(), 1);

  let (status, snap) = send(&app, "GET", "/skies/demo/snapshot", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(snap["stats"]["total_stars"], 3);
  assert_eq!(snap["participants"].as_array().unwrap().len(), 2);
}
