//! Counter and clock readout.

use serde::{Deserialize, Serialize};

use crate::round::format_clock;

/// Snapshot of the on-screen counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    /// Accepted clicks this round.
    pub clicks: u32,
    /// Milliseconds since the round started, frozen at round end.
    pub elapsed_ms: u64,
    /// Pairs matched so far.
    pub matched_pairs: u32,
    /// Pairs in the grid.
    pub total_pairs: u32,
}

impl Scoreboard {
    /// Elapsed time as `MM:SS`.
    #[must_use]
    pub fn clock(&self) -> String {
        format_clock(self.elapsed_ms)
    }
}

impl std::fmt::Display for Scoreboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Clicks: {}  Time: {}  Pairs: {}/{}",
            self.clicks,
            self.clock(),
            self.matched_pairs,
            self.total_pairs
        )
    }
}
