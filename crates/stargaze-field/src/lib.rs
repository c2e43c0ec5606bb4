//! The procedural star field behind a Stargaze sky.
//!
//! A sky's weighted score is turned into a layered field of points of light
//! ([`generate`]), animated frame by frame onto any [`animate::Painter`]
//! ([`animate`]), hit-tested against the pointer ([`interact`]) and kept
//! fresh by a cancellable polling task ([`refresh`]) feeding an owned
//! [`state::SkyState`].
//!
//! Nothing here can fail in the error sense. Every input, including a zero
//! score and missing participant metadata, has a defined rendering.

#![allow(async_fn_in_trait)]

pub mod animate;
pub mod generate;
pub mod geometry;
pub mod interact;
pub mod palette;
pub mod refresh;
pub mod state;
pub mod templates;

pub use animate::{Animator, AnimatorConfig, Painter};
pub use generate::{
  Constellation, Field, FieldConfig, StarKind, StarPoint, reseed_preserving, seed, seed_with,
};
pub use geometry::{Vec2, Viewport};
pub use interact::{DEFAULT_HIT_FACTOR, PointerTracker, Tooltip, hit_test};
pub use palette::Rgb;
pub use refresh::{EngineSource, RefreshHandle, RefreshLoop, SnapshotSource};
pub use state::{ReseedPolicy, SkyState};
