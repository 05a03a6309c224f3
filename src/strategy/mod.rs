//! Self-play: card-picking policies and a round runner.

mod policy;

pub use policy::{play_round, PerfectRecall, Picker, RandomPicker};
