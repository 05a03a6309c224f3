//! # flip-match
//!
//! A memory-matching card game engine: a grid of face-down cards, two
//! flips per turn, matched pairs leave the table.
//!
//! ## Design Principles
//!
//! 1. **Pure Transitions**: The round controller is a function
//!    `apply(state, event, now) -> (state', effects)`. It never sleeps,
//!    draws or reads a clock.
//!
//! 2. **Effects Out, Events In**: Flips, vanishes and delays are effects
//!    for the host; completions and timer expiries come back as events.
//!
//! 3. **One Timer Per Round**: A round waits on at most one timer token.
//!    Restarting bumps the round generation, so late timers are inert.
//!
//! ## Modules
//!
//! - `core`: Cards, configuration, errors, RNG
//! - `round`: Dealing, round state, the transition function
//! - `session`: Difficulty, restart, counters and clock
//! - `driver`: Card widgets and a virtual-time host
//! - `strategy`: Card-picking policies for self-play

pub mod core;
pub mod driver;
pub mod round;
pub mod session;
pub mod strategy;

// Re-export commonly used types
pub use crate::core::{
    Card, CardFace, CardId, ConfigError, Difficulty, GameConfig, GameRng, GridSize, PairingKey,
    Timings, DEFAULT_FACE_POOL, MAX_CARDS, MAX_FACE_POOL,
};

pub use crate::round::{
    apply, deal, format_clock, Effect, Effects, Event, IgnoreReason, Outcome, Phase, RoundState,
    RoundSummary, Selection, TimerToken, Transition,
};

pub use crate::session::{Scoreboard, Session};

pub use crate::driver::{Animation, CardWidget, Driver};

pub use crate::strategy::{play_round, PerfectRecall, Picker, RandomPicker};
