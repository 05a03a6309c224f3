//! Events consumed and effects produced by the round controller.
//!
//! The controller never touches the screen or a clock. Input arrives as an
//! `Event`; every visual command or wait it needs comes back as an `Effect`
//! for the host to execute. Waits are expressed as timers identified by a
//! `TimerToken`, and the host reports expiry with `Event::TimerFired`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::CardId;

/// Identifies one scheduled timer.
///
/// `round` is the round generation; `seq` counts timers within the round.
/// A round holds at most one pending token, so a fired token that does not
/// match it is stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerToken {
    /// Round generation that scheduled the timer.
    pub round: u64,
    /// Sequence number within the round.
    pub seq: u32,
}

impl std::fmt::Display for TimerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Timer({}.{})", self.round, self.seq)
    }
}

/// Input to the round controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// The player tapped a card.
    CardClicked(CardId),
    /// A flip or flip-back of this card finished.
    FlipCompleted(CardId),
    /// The vanish of this card finished.
    VanishCompleted(CardId),
    /// A timer scheduled by the controller expired.
    TimerFired(TimerToken),
}

/// Summary reported when the last pair is matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    /// Accepted clicks during the round.
    pub clicks: u32,
    /// Milliseconds from round start to the final match.
    pub elapsed_ms: u64,
    /// Pairs matched (all of them).
    pub pairs: u32,
}

impl std::fmt::Display for RoundSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "All {} pairs matched! Clicks: {}, time: {}",
            self.pairs,
            self.clicks,
            format_clock(self.elapsed_ms)
        )
    }
}

/// Format milliseconds as `MM:SS`, truncating partial seconds.
#[must_use]
pub fn format_clock(elapsed_ms: u64) -> String {
    let seconds = elapsed_ms / 1000;
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Command for the host, produced by a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Turn the card front-side up.
    Flip(CardId),
    /// Turn the card back-side up.
    FlipBack(CardId),
    /// Play the vanish transition and hide the card.
    Vanish(CardId),
    /// Fire `Event::TimerFired(token)` after `delay_ms`.
    Schedule {
        /// Token to report back.
        token: TimerToken,
        /// Delay in milliseconds.
        delay_ms: u64,
    },
    /// Drop a previously scheduled timer.
    CancelTimer(TimerToken),
    /// The click counter changed.
    ClicksChanged(u32),
    /// The round ended.
    RoundFinished(RoundSummary),
}

/// Effects of one transition. Most transitions emit at most four.
pub type Effects = SmallVec<[Effect; 4]>;

/// Why an event left the round unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreReason {
    /// A comparison or reveal is in flight.
    Busy,
    /// The card is face-up or matched.
    AlreadyRevealed,
    /// The card's last transition has not completed.
    InTransition,
    /// No such card in this round.
    UnknownCard,
    /// All pairs are matched.
    RoundOver,
    /// The timer is not the pending one.
    StaleTimer,
    /// A completion for a card that was not transitioning.
    NotTransitioning,
}

/// Whether an event changed the round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// State advanced.
    Applied,
    /// State untouched.
    Ignored(IgnoreReason),
}

impl Outcome {
    /// Did the event change the round?
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Outcome::Applied)
    }
}
