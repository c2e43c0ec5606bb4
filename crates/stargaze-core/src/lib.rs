//! Core types and trait definitions for the Stargaze participation sky.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the domain model, the [`store::SkyStore`] abstraction over durable storage,
//! and the aggregation engine that turns participations into a score.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod action;
pub mod engine;
pub mod error;
pub mod participation;
pub mod sky;
pub mod stats;
pub mod store;

pub use error::{Error, Result};
