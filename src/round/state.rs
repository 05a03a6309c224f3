//! Round state: the cards, the pending selection and the phase.
//!
//! ## Phases
//!
//! ```text
//! AwaitingFirst --click--> RevealingFirst --timer--> AwaitingSecond
//!       ^                                                  |
//!       |                                                click
//!       |                                                  v
//!    Settling <--------------timer (no win)------------ Comparing
//!                                                          |
//!                                               timer (last pair)
//!                                                          v
//!                                                      Finished
//! ```
//!
//! The busy flag is derived from the phase: clicks are refused while a
//! reveal, comparison or settle delay is running.
//!
//! Uses `im::Vector` for the cards so the transition function can return a
//! new state without copying the grid.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::deck;
use super::event::{RoundSummary, TimerToken};
use crate::core::{Card, CardFace, CardId, ConfigError, GameRng, GridSize, Timings};

/// Position of a round in its flip/compare/resolve cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// No card selected; clicks accepted.
    #[default]
    AwaitingFirst,
    /// First card flipping up; clicks refused until the reveal timer fires.
    RevealingFirst,
    /// First card up; clicks accepted.
    AwaitingSecond,
    /// Both cards up; waiting for the verify timer.
    Comparing,
    /// Pair resolved; waiting for the settle timer.
    Settling,
    /// All pairs matched. Terminal.
    Finished,
}

impl Phase {
    /// Are clicks refused in this phase?
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(self, Phase::RevealingFirst | Phase::Comparing | Phase::Settling)
    }
}

/// Cards currently face-up pending comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    /// First card of the pair.
    pub first: Option<CardId>,
    /// Second card of the pair.
    pub second: Option<CardId>,
}

impl Selection {
    /// Nothing selected?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.second.is_none()
    }

    /// Forget both cards.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Complete state of one round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    pub(crate) generation: u64,
    pub(crate) grid: GridSize,
    pub(crate) timings: Timings,
    pub(crate) cards: Vector<Card>,
    pub(crate) selection: Selection,
    pub(crate) phase: Phase,
    pub(crate) clicks: u32,
    pub(crate) matched_pairs: u32,
    pub(crate) pending: Option<TimerToken>,
    pub(crate) next_seq: u32,
    pub(crate) started_at_ms: u64,
    pub(crate) summary: Option<RoundSummary>,
}

impl RoundState {
    /// Create a round from already dealt cards.
    ///
    /// `cards` must hold `grid.total()` cards with ids `0..total` in order.
    #[must_use]
    pub fn new(
        generation: u64,
        grid: GridSize,
        timings: Timings,
        cards: Vector<Card>,
        started_at_ms: u64,
    ) -> Self {
        debug_assert_eq!(cards.len(), grid.total(), "card count must match the grid");
        debug_assert!(
            cards.iter().enumerate().all(|(i, c)| c.id.index() == i),
            "cards must be in grid order"
        );

        Self {
            generation,
            grid,
            timings,
            cards,
            selection: Selection::default(),
            phase: Phase::AwaitingFirst,
            clicks: 0,
            matched_pairs: 0,
            pending: None,
            next_seq: 0,
            started_at_ms,
            summary: None,
        }
    }

    /// Deal a fresh round.
    pub fn deal(
        generation: u64,
        grid: GridSize,
        timings: Timings,
        face_pool: usize,
        rng: &GameRng,
        started_at_ms: u64,
    ) -> Result<Self, ConfigError> {
        let cards = deck::deal(grid, face_pool, rng)?;
        Ok(Self::new(generation, grid, timings, cards, started_at_ms))
    }

    // === Queries ===

    /// Round generation; increments on every restart within a session.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Grid dimensions.
    #[must_use]
    pub fn grid(&self) -> GridSize {
        self.grid
    }

    /// Delays used by this round.
    #[must_use]
    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    /// All cards in grid order.
    #[must_use]
    pub fn cards(&self) -> &Vector<Card> {
        &self.cards
    }

    /// Look up a card.
    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id.index())
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Cards pending comparison.
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Are clicks currently refused?
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    /// Accepted clicks so far.
    #[must_use]
    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    /// Pairs matched so far.
    #[must_use]
    pub fn matched_pairs(&self) -> u32 {
        self.matched_pairs
    }

    /// Pairs in the full grid.
    #[must_use]
    pub fn total_pairs(&self) -> u32 {
        self.grid.pairs() as u32
    }

    /// The one timer this round is waiting for, if any.
    #[must_use]
    pub fn pending_timer(&self) -> Option<TimerToken> {
        self.pending
    }

    /// Have all pairs been matched?
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// End-of-round summary, once finished.
    #[must_use]
    pub fn summary(&self) -> Option<RoundSummary> {
        self.summary
    }

    /// Clock time the round started at.
    #[must_use]
    pub fn started_at_ms(&self) -> u64 {
        self.started_at_ms
    }

    /// Milliseconds since the round started; frozen once finished.
    #[must_use]
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match self.summary {
            Some(summary) => summary.elapsed_ms,
            None => now_ms.saturating_sub(self.started_at_ms),
        }
    }

    /// Number of cards showing their front and not yet matched.
    #[must_use]
    pub fn face_up_count(&self) -> usize {
        self.cards.iter().filter(|c| c.face == CardFace::FaceUp).count()
    }

    /// Ids of cards that can still be clicked at some point.
    pub fn unmatched(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(|c| !c.is_matched())
    }

    // === Internal helpers for the controller ===

    pub(crate) fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.get_mut(id.index())
    }

    pub(crate) fn issue_timer(&mut self) -> TimerToken {
        let token = TimerToken {
            round: self.generation,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.pending = Some(token);
        token
    }
}
