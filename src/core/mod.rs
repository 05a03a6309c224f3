//! Core types: cards, configuration, errors, RNG.
//!
//! These are the building blocks shared by the round controller, the
//! session layer and the driver.

pub mod card;
pub mod config;
pub mod error;
pub mod rng;

pub use card::{Card, CardFace, CardId, PairingKey};
pub use config::{Difficulty, GameConfig, GridSize, Timings, DEFAULT_FACE_POOL, MAX_CARDS, MAX_FACE_POOL};
pub use error::ConfigError;
pub use rng::GameRng;
