//! JSON REST API for Stargaze.
//!
//! Exposes an axum [`Router`] backed by an [`Aggregator`] over any
//! [`stargaze_core::store::SkyStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", stargaze_api::api_router(aggregator.clone()))
//! ```

pub mod actions;
pub mod error;
pub mod participations;
pub mod skies;
pub mod stats;

#[cfg(test)]
mod tests;

use axum::{
  Router,
  routing::{get, post},
};
use stargaze_core::{engine::Aggregator, store::SkyStore};

pub use error::ApiError;

/// Default and maximum number of participants returned for visualisation.
/// Matches the participation-star cap of the field generator.
pub const PARTICIPANT_LIMIT: usize = 500;

/// Build a fully-materialised API router for `aggregator`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(aggregator: Aggregator<S>) -> Router<()>
where
  S: SkyStore + 'static,
{
  Router::new()
    // Skies
    .route("/skies", get(skies::list::<S>).post(skies::create::<S>))
    .route("/skies/{sky}", get(skies::get_one::<S>))
    // Action registry
    .route("/skies/{sky}/actions", get(actions::list::<S>).post(actions::define::<S>))
    // Aggregates
    .route("/skies/{sky}/stats", get(stats::stats::<S>))
    .route("/skies/{sky}/participants", get(stats::participants::<S>))
    .route("/skies/{sky}/snapshot", get(stats::snapshot::<S>))
    // Writes
    .route("/skies/{sky}/participations", post(participations::record::<S>))
    .with_state(aggregator)
}
