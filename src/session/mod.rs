//! Game session: difficulty, restart, counters and clock around a round.

mod game;
mod scoreboard;

pub use game::Session;
pub use scoreboard::Scoreboard;
