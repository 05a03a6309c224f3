//! Virtual-time host for a session.
//!
//! The driver executes the effects a session emits: it runs card widget
//! transitions, keeps a queue of timers and completions ordered by due
//! time, and feeds them back as events when the clock reaches them.
//! Entries due at the same instant fire in the order they were queued.
//!
//! Time only moves when the caller advances it, which makes rounds fully
//! reproducible in tests and self-play.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::{debug, warn};

use super::widget::{Animation, CardWidget};
use crate::core::{CardId, ConfigError, Difficulty, GameConfig, GridSize};
use crate::round::{Effect, Effects, Event, Outcome, RoundSummary, TimerToken};
use crate::session::{Scoreboard, Session};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Job {
    Timer(TimerToken),
    Completion { generation: u64, card: CardId },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Scheduled {
    due_ms: u64,
    seq: u64,
    job: Job,
}

/// Runs a session against a virtual clock.
#[derive(Clone, Debug)]
pub struct Driver {
    session: Session,
    widgets: Vec<CardWidget>,
    now_ms: u64,
    queue: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
    deferred: Vec<(CardId, Animation)>,
    notices: Vec<Effect>,
}

impl Driver {
    /// Start a session at time zero.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let session = Session::start(config, 0)?;
        let widgets = vec![CardWidget::new(); session.grid().total()];
        Ok(Self {
            session,
            widgets,
            now_ms: 0,
            queue: BinaryHeap::new(),
            next_seq: 0,
            deferred: Vec::new(),
            notices: Vec::new(),
        })
    }

    // === Queries ===

    /// The hosted session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current virtual time.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Widget of a card.
    #[must_use]
    pub fn widget(&self, card: CardId) -> Option<&CardWidget> {
        self.widgets.get(card.index())
    }

    /// All widgets in grid order.
    #[must_use]
    pub fn widgets(&self) -> &[CardWidget] {
        &self.widgets
    }

    /// Counters at the current time.
    #[must_use]
    pub fn scoreboard(&self) -> Scoreboard {
        self.session.scoreboard(self.now_ms)
    }

    /// Nothing queued?
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of queued timers and completions.
    #[must_use]
    pub fn pending_jobs(&self) -> usize {
        self.queue.len()
    }

    /// Milliseconds until the last queued entry is due.
    #[must_use]
    pub fn time_to_idle(&self) -> u64 {
        self.queue
            .iter()
            .map(|Reverse(s)| s.due_ms)
            .max()
            .map_or(0, |due| due.saturating_sub(self.now_ms))
    }

    /// Summary of the current round, once finished.
    #[must_use]
    pub fn summary(&self) -> Option<RoundSummary> {
        self.session.round().summary()
    }

    /// Take the presenter notices (`ClicksChanged`, `RoundFinished`)
    /// emitted since the last call.
    pub fn drain_notices(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.notices)
    }

    // === Input ===

    /// Click a card at the current time.
    pub fn click(&mut self, card: CardId) -> Outcome {
        self.dispatch(Event::CardClicked(card))
    }

    /// Restart with the same grid.
    pub fn restart(&mut self) -> Result<(), ConfigError> {
        let effects = self.session.restart(self.now_ms)?;
        self.reset_widgets();
        self.execute(effects);
        Ok(())
    }

    /// Change the grid. A rejected grid leaves everything as it was.
    pub fn apply_grid(&mut self, grid: GridSize) -> Result<(), ConfigError> {
        let effects = self.session.apply_grid(grid, self.now_ms)?;
        self.reset_widgets();
        self.execute(effects);
        Ok(())
    }

    /// Change to a difficulty preset.
    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> Result<(), ConfigError> {
        self.apply_grid(difficulty.grid())
    }

    /// Host went to background.
    pub fn pause(&mut self) {
        self.session.pause();
    }

    /// Host came back.
    pub fn resume(&mut self) {
        self.session.resume();
    }

    // === Time ===

    /// Move the clock forward by `ms`, firing everything that comes due.
    pub fn advance(&mut self, ms: u64) {
        self.advance_to(self.now_ms.saturating_add(ms));
    }

    /// Move the clock to `target_ms`, firing everything due up to it.
    /// Never moves the clock backwards.
    pub fn advance_to(&mut self, target_ms: u64) {
        while self.queue.peek().is_some_and(|Reverse(s)| s.due_ms <= target_ms) {
            if let Some(Reverse(entry)) = self.queue.pop() {
                self.now_ms = self.now_ms.max(entry.due_ms);
                self.run(entry.job);
            }
        }
        self.now_ms = self.now_ms.max(target_ms);
    }

    /// Fire the next queued entry. Returns false if nothing was queued.
    pub fn step(&mut self) -> bool {
        match self.queue.pop() {
            Some(Reverse(entry)) => {
                self.now_ms = self.now_ms.max(entry.due_ms);
                self.run(entry.job);
                true
            }
            None => false,
        }
    }

    /// Fire everything queued, including entries queued along the way.
    pub fn run_until_idle(&mut self) {
        while self.step() {}
    }

    // === Internals ===

    fn dispatch(&mut self, event: Event) -> Outcome {
        let (outcome, effects) = self.session.handle(event, self.now_ms);
        self.execute(effects);
        outcome
    }

    fn execute(&mut self, effects: Effects) {
        for effect in effects {
            match effect {
                Effect::Flip(card) | Effect::FlipBack(card) => {
                    self.animate(card, Animation::Flip);
                }
                Effect::Vanish(card) => {
                    self.animate(card, Animation::Vanish);
                }
                Effect::Schedule { token, delay_ms } => self.enqueue(delay_ms, Job::Timer(token)),
                Effect::CancelTimer(token) => {
                    self.queue.retain(|Reverse(s)| s.job != Job::Timer(token));
                    debug!(%token, "timer cancelled");
                }
                Effect::ClicksChanged(_) | Effect::RoundFinished(_) => self.notices.push(effect),
            }
        }
    }

    /// Start or defer a widget transition. Returns false if the widget
    /// refused it.
    fn animate(&mut self, card: CardId, animation: Animation) -> bool {
        let Some(widget) = self.widgets.get_mut(card.index()) else {
            warn!(card = card.0, "effect for a card with no widget");
            return false;
        };
        if widget.is_animating() {
            self.deferred.push((card, animation));
            return true;
        }

        let started = match animation {
            Animation::Flip => widget.flip(),
            Animation::Vanish => widget.vanish(),
        };
        if !started {
            warn!(card = card.0, ?animation, "widget refused transition");
            return false;
        }

        let timings = self.session.round().timings();
        let duration = match animation {
            Animation::Flip => timings.flip_ms(),
            Animation::Vanish => timings.vanish_ms,
        };
        let generation = self.session.round().generation();
        self.enqueue(duration, Job::Completion { generation, card });
        true
    }

    fn enqueue(&mut self, delay_ms: u64, job: Job) {
        let entry = Scheduled {
            due_ms: self.now_ms.saturating_add(delay_ms),
            seq: self.next_seq,
            job,
        };
        self.next_seq += 1;
        self.queue.push(Reverse(entry));
    }

    fn run(&mut self, job: Job) {
        match job {
            Job::Timer(token) => {
                self.dispatch(Event::TimerFired(token));
            }
            Job::Completion { generation, card } => {
                if generation != self.session.round().generation() {
                    return;
                }
                let finished = self.widgets.get_mut(card.index()).and_then(CardWidget::complete);
                let event = match finished {
                    Some(Animation::Flip) => Event::FlipCompleted(card),
                    Some(Animation::Vanish) => Event::VanishCompleted(card),
                    None => return,
                };

                // The controller still waits on the deferred transition;
                // only its completion is reported.
                if let Some(pos) = self.deferred.iter().position(|(c, _)| *c == card) {
                    let (_, animation) = self.deferred.remove(pos);
                    if self.animate(card, animation) {
                        return;
                    }
                }
                self.dispatch(event);
            }
        }
    }

    fn reset_widgets(&mut self) {
        let generation = self.session.round().generation();
        self.widgets = vec![CardWidget::new(); self.session.grid().total()];
        self.deferred.clear();
        self.queue.retain(|Reverse(s)| match s.job {
            Job::Completion { generation: g, .. } => g == generation,
            Job::Timer(_) => true,
        });
    }
}
