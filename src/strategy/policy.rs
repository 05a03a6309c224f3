//! Card-picking policies for self-play.
//!
//! Policies are trait-based so self-play, benchmarks and property tests can
//! swap them:
//! - `RandomPicker`: any selectable card, uniformly
//! - `PerfectRecall`: remembers every revealed card and completes known
//!   pairs as soon as possible

use rustc_hash::FxHashMap;

use crate::core::{CardId, GameRng, PairingKey};
use crate::driver::Driver;
use crate::round::{Outcome, RoundState, RoundSummary};

/// Chooses the next card to click.
pub trait Picker {
    /// Pick a card, or `None` if nothing is selectable right now.
    fn pick(&mut self, round: &RoundState) -> Option<CardId>;

    /// Called after an accepted click, with the key the card revealed.
    fn observe(&mut self, _card: CardId, _key: PairingKey) {}

    /// Forget everything; called when a new round starts.
    fn reset(&mut self) {}
}

impl<P: Picker + ?Sized> Picker for Box<P> {
    fn pick(&mut self, round: &RoundState) -> Option<CardId> {
        (**self).pick(round)
    }

    fn observe(&mut self, card: CardId, key: PairingKey) {
        (**self).observe(card, key);
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

/// Picks uniformly among selectable cards.
#[derive(Clone, Debug)]
pub struct RandomPicker {
    rng: GameRng,
}

impl RandomPicker {
    /// Create a picker with its own RNG stream.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed).for_context("picker"),
        }
    }
}

impl Picker for RandomPicker {
    fn pick(&mut self, round: &RoundState) -> Option<CardId> {
        let candidates: Vec<CardId> = round
            .cards()
            .iter()
            .filter(|c| c.is_selectable())
            .map(|c| c.id)
            .collect();
        self.rng.choose(&candidates).copied()
    }
}

/// Never forgets a revealed card.
#[derive(Clone, Debug, Default)]
pub struct PerfectRecall {
    seen: FxHashMap<CardId, PairingKey>,
}

impl PerfectRecall {
    /// Create a picker with empty memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct cards remembered.
    #[must_use]
    pub fn remembered(&self) -> usize {
        self.seen.len()
    }

    fn known_partner(&self, round: &RoundState, card: CardId, key: PairingKey) -> Option<CardId> {
        round
            .cards()
            .iter()
            .find(|c| c.id != card && c.is_selectable() && self.seen.get(&c.id) == Some(&key))
            .map(|c| c.id)
    }

    fn known_pair(&self, round: &RoundState) -> Option<CardId> {
        round
            .cards()
            .iter()
            .filter(|c| c.is_selectable())
            .find_map(|c| {
                let key = self.seen.get(&c.id)?;
                self.known_partner(round, c.id, *key).map(|_| c.id)
            })
    }

    fn unseen(&self, round: &RoundState) -> Option<CardId> {
        round
            .cards()
            .iter()
            .find(|c| c.is_selectable() && !self.seen.contains_key(&c.id))
            .map(|c| c.id)
    }
}

impl Picker for PerfectRecall {
    fn pick(&mut self, round: &RoundState) -> Option<CardId> {
        if let Some(first) = round.selection().first {
            if let Some(partner) = self
                .seen
                .get(&first)
                .and_then(|&key| self.known_partner(round, first, key))
            {
                return Some(partner);
            }
        } else if let Some(card) = self.known_pair(round) {
            return Some(card);
        }

        self.unseen(round)
            .or_else(|| round.cards().iter().find(|c| c.is_selectable()).map(|c| c.id))
    }

    fn observe(&mut self, card: CardId, key: PairingKey) {
        self.seen.insert(card, key);
    }

    fn reset(&mut self) {
        self.seen.clear();
    }
}

/// Play the driver's current round to the end with `picker`.
///
/// Gives up and returns `None` after `max_clicks` accepted clicks or if the
/// round stalls with nothing queued.
pub fn play_round(driver: &mut Driver, picker: &mut impl Picker, max_clicks: u32) -> Option<RoundSummary> {
    loop {
        let round = driver.session().round();
        if let Some(summary) = round.summary() {
            return Some(summary);
        }
        if round.clicks() >= max_clicks {
            return None;
        }
        if round.is_busy() {
            if !driver.step() {
                return None;
            }
            continue;
        }

        let Some(card) = picker.pick(round) else {
            if !driver.step() {
                return None;
            }
            continue;
        };

        match driver.click(card) {
            Outcome::Applied => {
                if let Some(c) = driver.session().round().card(card) {
                    picker.observe(card, c.key);
                }
            }
            Outcome::Ignored(_) => {
                if !driver.step() {
                    return None;
                }
            }
        }
    }
}
