//! A game session: the current round plus difficulty, restart and clock.
//!
//! The session owns the only mutable game state. Each restart deals from a
//! fresh fork of the session RNG and bumps the round generation, so timers
//! scheduled by an earlier round can never act on the new one.

use tracing::{info, warn};

use super::scoreboard::Scoreboard;
use crate::core::{ConfigError, Difficulty, GameConfig, GameRng, GridSize};
use crate::round::{self, Effect, Effects, Event, Outcome, RoundState};

/// A running game.
#[derive(Clone, Debug)]
pub struct Session {
    config: GameConfig,
    rng: GameRng,
    round: RoundState,
    paused: bool,
}

impl Session {
    /// Validate the configuration and deal the first round.
    pub fn start(config: GameConfig, now_ms: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => GameRng::new(seed),
            None => GameRng::from_entropy(),
        };
        let round = deal_round(&config, &mut rng, 0, config.grid, now_ms)?;

        Ok(Self {
            config,
            rng,
            round,
            paused: false,
        })
    }

    // === Queries ===

    /// Active configuration. `grid` is the last accepted grid.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current grid.
    #[must_use]
    pub fn grid(&self) -> GridSize {
        self.config.grid
    }

    /// Preset matching the current grid, if any.
    #[must_use]
    pub fn difficulty(&self) -> Option<Difficulty> {
        Difficulty::from_grid(self.config.grid)
    }

    /// Current round.
    #[must_use]
    pub fn round(&self) -> &RoundState {
        &self.round
    }

    /// Counters as displayed.
    #[must_use]
    pub fn scoreboard(&self, now_ms: u64) -> Scoreboard {
        Scoreboard {
            clicks: self.round.clicks(),
            elapsed_ms: self.round.elapsed_ms(now_ms),
            matched_pairs: self.round.matched_pairs(),
            total_pairs: self.round.total_pairs(),
        }
    }

    /// Should the on-screen clock keep ticking?
    #[must_use]
    pub fn clock_running(&self) -> bool {
        !self.paused && !self.round.is_finished()
    }

    // === Commands ===

    /// Feed an event to the current round.
    pub fn handle(&mut self, event: Event, now_ms: u64) -> (Outcome, Effects) {
        let transition = round::apply(&self.round, event, now_ms);
        self.round = transition.state;
        (transition.outcome, transition.effects)
    }

    /// Deal a new round with the same grid.
    pub fn restart(&mut self, now_ms: u64) -> Result<Effects, ConfigError> {
        self.replace_round(self.config.grid, now_ms)
    }

    /// Switch to a new grid and restart.
    ///
    /// An invalid grid is refused and the current settings and round stay
    /// as they were; the error's message is meant for the player.
    pub fn apply_grid(&mut self, grid: GridSize, now_ms: u64) -> Result<Effects, ConfigError> {
        if let Err(err) = grid.validate(self.config.face_pool) {
            warn!(%grid, current = %self.config.grid, error = %err, "grid change rejected");
            return Err(err);
        }
        let effects = self.replace_round(grid, now_ms)?;
        self.config.grid = grid;
        Ok(effects)
    }

    /// Switch to a difficulty preset and restart.
    pub fn select_difficulty(&mut self, difficulty: Difficulty, now_ms: u64) -> Result<Effects, ConfigError> {
        self.apply_grid(difficulty.grid(), now_ms)
    }

    /// Stop the on-screen clock (host went to background).
    ///
    /// Elapsed time keeps counting from round start.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Restart the on-screen clock.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    fn replace_round(&mut self, grid: GridSize, now_ms: u64) -> Result<Effects, ConfigError> {
        let generation = self.round.generation() + 1;
        let next = deal_round(&self.config, &mut self.rng, generation, grid, now_ms)?;

        let mut effects = Effects::new();
        if let Some(token) = self.round.pending_timer() {
            effects.push(Effect::CancelTimer(token));
        }
        effects.push(Effect::ClicksChanged(0));

        self.round = next;
        Ok(effects)
    }
}

fn deal_round(
    config: &GameConfig,
    rng: &mut GameRng,
    generation: u64,
    grid: GridSize,
    now_ms: u64,
) -> Result<RoundState, ConfigError> {
    let round_rng = rng.fork();
    let round = RoundState::deal(generation, grid, config.timings, config.face_pool, &round_rng, now_ms)?;
    info!(generation, %grid, seed = round_rng.seed(), "round dealt");
    Ok(round)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardId, Timings};
    use crate::round::{IgnoreReason, Phase};

    fn session() -> Session {
        Session::start(GameConfig::new().with_seed(8), 0).unwrap()
    }

    #[test]
    fn test_start_deals_easy_round() {
        let session = session();
        assert_eq!(session.grid(), GridSize::new(3, 2));
        assert_eq!(session.difficulty(), Some(Difficulty::Easy));
        assert_eq!(session.round().cards().len(), 6);
        assert_eq!(session.round().generation(), 0);
        assert!(session.clock_running());
    }

    #[test]
    fn test_start_rejects_odd_grid() {
        let err = Session::start(GameConfig::new().with_grid(GridSize::new(3, 3)), 0).unwrap_err();
        assert!(matches!(err, ConfigError::OddCardCount { total: 9, .. }));
    }

    #[test]
    fn test_same_seed_same_deal() {
        assert_eq!(session().round().cards(), session().round().cards());
    }

    #[test]
    fn test_restart_resets_counters_and_cancels_timer() {
        let mut session = session();
        let (outcome, _) = session.handle(Event::CardClicked(CardId::new(0)), 100);
        assert!(outcome.is_applied());
        let token = session.round().pending_timer().unwrap();

        let effects = session.restart(500).unwrap();
        assert_eq!(effects.as_slice(), &[Effect::CancelTimer(token), Effect::ClicksChanged(0)]);
        assert_eq!(session.round().generation(), 1);
        assert_eq!(session.round().clicks(), 0);
        assert_eq!(session.round().phase(), Phase::AwaitingFirst);

        // The old round's timer no longer applies.
        let (outcome, effects) = session.handle(Event::TimerFired(token), 1100);
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::StaleTimer));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_restart_deals_new_layout() {
        let mut session = session();
        let before = session.round().cards().clone();
        session.restart(0).unwrap();
        assert_ne!(&before, session.round().cards());
    }

    #[test]
    fn test_select_difficulty() {
        let mut session = session();
        session.select_difficulty(Difficulty::Expert, 0).unwrap();
        assert_eq!(session.grid(), GridSize::new(6, 5));
        assert_eq!(session.round().cards().len(), 30);
        assert_eq!(session.scoreboard(0).total_pairs, 15);
    }

    #[test]
    fn test_odd_grid_keeps_prior_settings() {
        let mut session = session();
        session.select_difficulty(Difficulty::Medium, 0).unwrap();
        session.handle(Event::CardClicked(CardId::new(3)), 10);
        let round_before = session.round().clone();

        let err = session.apply_grid(GridSize::new(3, 3), 20).unwrap_err();
        assert_eq!(err.to_string(), "total card count must be even (3x3 = 9)");
        assert_eq!(session.difficulty(), Some(Difficulty::Medium));
        assert_eq!(session.round(), &round_before);
    }

    #[test]
    fn test_scoreboard_tracks_clock() {
        let mut session = session();
        session.restart(1_000).unwrap();
        let board = session.scoreboard(66_000);
        assert_eq!(board.clicks, 0);
        assert_eq!(board.clock(), "01:05");
    }

    #[test]
    fn test_pause_and_resume() {
        let mut session = Session::start(
            GameConfig::new().with_seed(1).with_timings(Timings::instant()),
            0,
        )
        .unwrap();
        session.pause();
        assert!(!session.clock_running());
        assert_eq!(session.scoreboard(5_000).elapsed_ms, 5_000);
        session.resume();
        assert!(session.clock_running());
    }
}
