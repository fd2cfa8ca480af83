//! Rating computation and match orchestration
//!
//! `elo` holds the pure expected-score and delta math; `engine` wires it to
//! a rating store and handles registration and match recording.

pub mod elo;
pub mod engine;

pub use engine::RatingEngine;
