//! Verdant testing infrastructure.
//!
//! Shared fixtures for the workspace's test suites: entity factories, a
//! scripted in-memory [`verdant_app::Api`] with failure injection, and a
//! recording [`verdant_app::Stage`] for effect assertions. Add it to a
//! crate's dev-dependencies; never ship it.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod api;
pub mod factories;
pub mod stage;

pub use api::ScriptApi;
pub use stage::RecordingStage;
