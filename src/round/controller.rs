//! The match round controller.
//!
//! `apply` is a pure transition function: it takes the current round, one
//! event and the current clock reading, and returns the next round plus
//! the effects the host must execute. Ignored events return the input state
//! unchanged and no effects.
//!
//! ## Timed Chain
//!
//! | Trigger                  | Transition                       | Timer            |
//! |--------------------------|----------------------------------|------------------|
//! | click, nothing selected  | reveal first                     | `first_reveal_ms`|
//! | reveal timer             | accept second click              |                  |
//! | click, first selected    | reveal second                    | `compare_delay_ms`|
//! | verify timer, match      | vanish pair (or finish round)    | `settle_ms`      |
//! | verify timer, mismatch   | flip pair back                   | `settle_ms`      |
//! | settle timer             | clear selection                  |                  |

use tracing::{debug, info, trace};

use super::event::{Effect, Effects, Event, IgnoreReason, Outcome, RoundSummary};
use super::state::{Phase, RoundState};
use crate::core::{CardFace, CardId};

/// Result of applying one event.
#[derive(Clone, Debug)]
pub struct Transition {
    /// Round after the event.
    pub state: RoundState,
    /// Commands for the host, in order.
    pub effects: Effects,
    /// Whether the event changed anything.
    pub outcome: Outcome,
}

/// Apply an event to a round.
#[must_use]
pub fn apply(state: &RoundState, event: Event, now_ms: u64) -> Transition {
    let mut next = state.clone();
    let mut effects = Effects::new();

    let result = match event {
        Event::CardClicked(card) => click(&mut next, card, &mut effects),
        Event::FlipCompleted(card) => complete(&mut next, card, false),
        Event::VanishCompleted(card) => complete(&mut next, card, true),
        Event::TimerFired(token) => {
            if next.pending != Some(token) {
                Err(IgnoreReason::StaleTimer)
            } else {
                next.pending = None;
                timer(&mut next, now_ms, &mut effects)
            }
        }
    };

    match result {
        Ok(()) => Transition {
            state: next,
            effects,
            outcome: Outcome::Applied,
        },
        Err(reason) => {
            trace!(round = state.generation, ?event, ?reason, "event ignored");
            Transition {
                state: state.clone(),
                effects: Effects::new(),
                outcome: Outcome::Ignored(reason),
            }
        }
    }
}

fn click(state: &mut RoundState, id: CardId, effects: &mut Effects) -> Result<(), IgnoreReason> {
    if state.phase == Phase::Finished {
        return Err(IgnoreReason::RoundOver);
    }
    let card = state.card(id).ok_or(IgnoreReason::UnknownCard)?;
    if state.is_busy() {
        return Err(IgnoreReason::Busy);
    }
    if card.face != CardFace::FaceDown {
        return Err(IgnoreReason::AlreadyRevealed);
    }
    if card.in_transition {
        return Err(IgnoreReason::InTransition);
    }

    let (next_phase, delay_ms) = match state.phase {
        Phase::AwaitingFirst => (Phase::RevealingFirst, state.timings.first_reveal_ms),
        Phase::AwaitingSecond => (Phase::Comparing, state.timings.compare_delay_ms),
        _ => return Err(IgnoreReason::Busy),
    };

    if let Some(card) = state.card_mut(id) {
        card.reveal();
    }
    state.clicks += 1;
    if next_phase == Phase::RevealingFirst {
        state.selection.first = Some(id);
    } else {
        state.selection.second = Some(id);
    }
    state.phase = next_phase;
    let token = state.issue_timer();

    debug!(round = state.generation, card = id.0, clicks = state.clicks, phase = ?next_phase, "card revealed");

    effects.push(Effect::Flip(id));
    effects.push(Effect::ClicksChanged(state.clicks));
    effects.push(Effect::Schedule { token, delay_ms });
    Ok(())
}

fn timer(state: &mut RoundState, now_ms: u64, effects: &mut Effects) -> Result<(), IgnoreReason> {
    match state.phase {
        Phase::RevealingFirst => {
            state.phase = Phase::AwaitingSecond;
            Ok(())
        }
        Phase::Comparing => verify(state, now_ms, effects),
        Phase::Settling => {
            state.selection.clear();
            state.phase = Phase::AwaitingFirst;
            Ok(())
        }
        Phase::AwaitingFirst | Phase::AwaitingSecond | Phase::Finished => Err(IgnoreReason::StaleTimer),
    }
}

fn verify(state: &mut RoundState, now_ms: u64, effects: &mut Effects) -> Result<(), IgnoreReason> {
    let (Some(first), Some(second)) = (state.selection.first, state.selection.second) else {
        return Err(IgnoreReason::StaleTimer);
    };
    let first_key = state.card(first).map(|c| c.key);
    let second_key = state.card(second).map(|c| c.key);

    if first_key.is_some() && first_key == second_key {
        for id in [first, second] {
            if let Some(card) = state.card_mut(id) {
                card.remove();
            }
            effects.push(Effect::Vanish(id));
        }
        state.matched_pairs += 1;
        debug!(round = state.generation, first = first.0, second = second.0, pairs = state.matched_pairs, "pair matched");

        if state.matched_pairs * 2 == state.grid.total() as u32 {
            let summary = RoundSummary {
                clicks: state.clicks,
                elapsed_ms: now_ms.saturating_sub(state.started_at_ms),
                pairs: state.matched_pairs,
            };
            state.summary = Some(summary);
            state.selection.clear();
            state.phase = Phase::Finished;
            info!(round = state.generation, clicks = summary.clicks, elapsed_ms = summary.elapsed_ms, "round finished");
            effects.push(Effect::RoundFinished(summary));
            return Ok(());
        }
    } else {
        for id in [first, second] {
            if let Some(card) = state.card_mut(id) {
                card.hide();
            }
            effects.push(Effect::FlipBack(id));
        }
        debug!(round = state.generation, first = first.0, second = second.0, "no match, flipping back");
    }

    state.phase = Phase::Settling;
    let token = state.issue_timer();
    effects.push(Effect::Schedule {
        token,
        delay_ms: state.timings.settle_ms,
    });
    Ok(())
}

fn complete(state: &mut RoundState, id: CardId, vanish: bool) -> Result<(), IgnoreReason> {
    let card = state.card_mut(id).ok_or(IgnoreReason::UnknownCard)?;
    if !card.in_transition || card.is_matched() != vanish {
        return Err(IgnoreReason::NotTransitioning);
    }
    card.in_transition = false;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Card, GridSize, PairingKey, Timings};
    use crate::round::event::TimerToken;
    use im::Vector;

    /// 3x2 grid laid out as keys [0, 1, 0, 2, 1, 2].
    fn round() -> RoundState {
        let keys = [0, 1, 0, 2, 1, 2];
        let cards: Vector<Card> = keys
            .iter()
            .enumerate()
            .map(|(i, &k)| Card::new(CardId::new(i as u16), PairingKey::new(k)))
            .collect();
        RoundState::new(1, GridSize::new(3, 2), Timings::default(), cards, 0)
    }

    fn pending(state: &RoundState) -> TimerToken {
        state.pending_timer().expect("a timer should be pending")
    }

    /// Click and let every timer and flip run to completion.
    fn click_through(state: RoundState, id: u16, now: &mut u64) -> RoundState {
        let mut state = apply(&state, Event::CardClicked(CardId::new(id)), *now).state;
        state = apply(&state, Event::FlipCompleted(CardId::new(id)), *now).state;
        while let Some(token) = state.pending_timer() {
            *now += 1000;
            state = apply(&state, Event::TimerFired(token), *now).state;
            for card in state.cards().clone().iter().filter(|c| c.in_transition) {
                let event = if card.is_matched() {
                    Event::VanishCompleted(card.id)
                } else {
                    Event::FlipCompleted(card.id)
                };
                state = apply(&state, event, *now).state;
            }
            if state.phase() == Phase::AwaitingSecond {
                break;
            }
        }
        state
    }

    #[test]
    fn test_first_click_reveals_and_blocks() {
        let state = round();
        let t = apply(&state, Event::CardClicked(CardId::new(0)), 10);

        assert!(t.outcome.is_applied());
        assert_eq!(t.state.phase(), Phase::RevealingFirst);
        assert!(t.state.is_busy());
        assert_eq!(t.state.clicks(), 1);
        assert_eq!(t.state.selection().first, Some(CardId::new(0)));
        assert_eq!(t.state.card(CardId::new(0)).unwrap().face, CardFace::FaceUp);
        assert_eq!(
            t.effects.as_slice(),
            &[
                Effect::Flip(CardId::new(0)),
                Effect::ClicksChanged(1),
                Effect::Schedule { token: TimerToken { round: 1, seq: 0 }, delay_ms: 1000 },
            ]
        );
    }

    #[test]
    fn test_click_while_revealing_is_ignored() {
        let state = apply(&round(), Event::CardClicked(CardId::new(0)), 0).state;
        let t = apply(&state, Event::CardClicked(CardId::new(1)), 100);

        assert_eq!(t.outcome, Outcome::Ignored(IgnoreReason::Busy));
        assert!(t.effects.is_empty());
        assert_eq!(t.state, state);
    }

    #[test]
    fn test_second_click_schedules_verify() {
        let mut state = apply(&round(), Event::CardClicked(CardId::new(0)), 0).state;
        state = apply(&state, Event::TimerFired(pending(&state)), 1000).state;
        assert_eq!(state.phase(), Phase::AwaitingSecond);

        let t = apply(&state, Event::CardClicked(CardId::new(2)), 1200);
        assert_eq!(t.state.phase(), Phase::Comparing);
        assert_eq!(t.state.selection().second, Some(CardId::new(2)));
        assert_eq!(t.state.face_up_count(), 2);
        assert!(matches!(
            t.effects.last(),
            Some(Effect::Schedule { delay_ms: 800, .. })
        ));
    }

    #[test]
    fn test_clicking_first_card_again_is_ignored() {
        let mut state = apply(&round(), Event::CardClicked(CardId::new(0)), 0).state;
        state = apply(&state, Event::TimerFired(pending(&state)), 1000).state;

        let t = apply(&state, Event::CardClicked(CardId::new(0)), 1100);
        assert_eq!(t.outcome, Outcome::Ignored(IgnoreReason::AlreadyRevealed));
        assert_eq!(t.state.clicks(), 1);
    }

    #[test]
    fn test_match_vanishes_pair() {
        let mut now = 0;
        let mut state = click_through(round(), 0, &mut now);
        state = apply(&state, Event::CardClicked(CardId::new(2)), now).state;

        now += 800;
        let t = apply(&state, Event::TimerFired(pending(&state)), now);
        assert!(t.effects.contains(&Effect::Vanish(CardId::new(0))));
        assert!(t.effects.contains(&Effect::Vanish(CardId::new(2))));
        assert_eq!(t.state.matched_pairs(), 1);
        assert_eq!(t.state.phase(), Phase::Settling);
        assert!(t.state.card(CardId::new(0)).unwrap().is_matched());

        now += 1000;
        let settled = apply(&t.state, Event::TimerFired(pending(&t.state)), now).state;
        assert_eq!(settled.phase(), Phase::AwaitingFirst);
        assert!(settled.selection().is_empty());
    }

    #[test]
    fn test_mismatch_flips_back() {
        let mut now = 0;
        let mut state = click_through(round(), 0, &mut now);
        state = apply(&state, Event::CardClicked(CardId::new(1)), now).state;

        let t = apply(&state, Event::TimerFired(pending(&state)), now + 800);
        assert!(t.effects.contains(&Effect::FlipBack(CardId::new(0))));
        assert!(t.effects.contains(&Effect::FlipBack(CardId::new(1))));
        assert_eq!(t.state.matched_pairs(), 0);
        assert_eq!(t.state.face_up_count(), 0);
        assert_eq!(t.state.clicks(), 2);

        // Still busy until the settle timer fires.
        let blocked = apply(&t.state, Event::CardClicked(CardId::new(3)), now + 900);
        assert_eq!(blocked.outcome, Outcome::Ignored(IgnoreReason::Busy));
    }

    #[test]
    fn test_full_round_reports_summary() {
        let mut now = 0;
        let mut state = round();
        for id in [0, 2, 1, 4, 3] {
            state = click_through(state, id, &mut now);
        }
        let state = apply(&state, Event::CardClicked(CardId::new(5)), now).state;
        let t = apply(&state, Event::TimerFired(pending(&state)), now + 800);

        assert!(t.state.is_finished());
        assert_eq!(t.state.pending_timer(), None);
        let summary = t.state.summary().unwrap();
        assert_eq!(summary.clicks, 6);
        assert_eq!(summary.pairs, 3);
        assert_eq!(summary.elapsed_ms, now + 800);
        assert_eq!(t.effects.last(), Some(&Effect::RoundFinished(summary)));

        let after = apply(&t.state, Event::CardClicked(CardId::new(0)), now + 900);
        assert_eq!(after.outcome, Outcome::Ignored(IgnoreReason::RoundOver));
    }

    #[test]
    fn test_stale_timer_ignored() {
        let state = apply(&round(), Event::CardClicked(CardId::new(0)), 0).state;
        let stale = TimerToken { round: 0, seq: 0 };

        let t = apply(&state, Event::TimerFired(stale), 1000);
        assert_eq!(t.outcome, Outcome::Ignored(IgnoreReason::StaleTimer));
        assert_eq!(t.state.phase(), Phase::RevealingFirst);
    }

    #[test]
    fn test_unknown_card_ignored() {
        let t = apply(&round(), Event::CardClicked(CardId::new(6)), 0);
        assert_eq!(t.outcome, Outcome::Ignored(IgnoreReason::UnknownCard));
    }

    #[test]
    fn test_card_in_transition_not_clickable() {
        let mut now = 0;
        let mut state = click_through(round(), 0, &mut now);
        state = apply(&state, Event::CardClicked(CardId::new(1)), now).state;
        now += 800;
        state = apply(&state, Event::TimerFired(pending(&state)), now).state;
        now += 1000;
        state = apply(&state, Event::TimerFired(pending(&state)), now).state;

        // Flip-back of card 1 never reported completion.
        let t = apply(&state, Event::CardClicked(CardId::new(1)), now);
        assert_eq!(t.outcome, Outcome::Ignored(IgnoreReason::InTransition));

        let state = apply(&state, Event::FlipCompleted(CardId::new(1)), now).state;
        assert!(apply(&state, Event::CardClicked(CardId::new(1)), now).outcome.is_applied());
    }

    #[test]
    fn test_completion_without_transition_ignored() {
        let t = apply(&round(), Event::FlipCompleted(CardId::new(0)), 0);
        assert_eq!(t.outcome, Outcome::Ignored(IgnoreReason::NotTransitioning));

        let state = apply(&round(), Event::CardClicked(CardId::new(0)), 0).state;
        let t = apply(&state, Event::VanishCompleted(CardId::new(0)), 0);
        assert_eq!(t.outcome, Outcome::Ignored(IgnoreReason::NotTransitioning));
    }
}
