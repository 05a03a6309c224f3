//! The match round: dealing, state and the transition function.
//!
//! A round is driven entirely through `controller::apply`. The host feeds
//! clicks, timer expiries and transition completions in, and executes the
//! returned effects.

pub mod controller;
pub mod deck;
pub mod event;
pub mod state;

pub use controller::{apply, Transition};
pub use deck::{deal, pair_counts};
pub use event::{format_clock, Effect, Effects, Event, IgnoreReason, Outcome, RoundSummary, TimerToken};
pub use state::{Phase, RoundState, Selection};
