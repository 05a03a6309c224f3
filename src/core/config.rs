//! Game configuration types.
//!
//! - `GridSize`: columns x rows of the card grid
//! - `Difficulty`: the four grid presets offered in settings
//! - `Timings`: fixed durations of the visual transitions and delays
//! - `GameConfig`: combines all configuration
//!
//! Grids are validated before a round is dealt; an invalid grid never
//! reaches the round controller.

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Number of distinct card faces in the default deck artwork.
pub const DEFAULT_FACE_POOL: usize = 18;

/// Most cards a grid may hold; card ids are `u16`.
pub const MAX_CARDS: usize = u16::MAX as usize + 1;

/// Largest face pool; pairing keys are `u16`.
pub const MAX_FACE_POOL: usize = u16::MAX as usize + 1;

/// Card grid dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    /// Cards per row.
    pub columns: u16,
    /// Number of rows.
    pub rows: u16,
}

impl GridSize {
    /// Create a grid size. Call `validate` before dealing.
    #[must_use]
    pub const fn new(columns: u16, rows: u16) -> Self {
        Self { columns, rows }
    }

    /// Total number of cards.
    #[must_use]
    pub const fn total(self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Number of pairs in a full grid.
    #[must_use]
    pub const fn pairs(self) -> usize {
        self.total() / 2
    }

    /// Check the grid can be dealt from a pool of `face_pool` faces.
    pub fn validate(self, face_pool: usize) -> Result<(), ConfigError> {
        let total = self.total();
        if total == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if total % 2 != 0 {
            return Err(ConfigError::OddCardCount {
                columns: self.columns,
                rows: self.rows,
                total: total as u32,
            });
        }
        if total > MAX_CARDS {
            return Err(ConfigError::TooManyCards { total, max: MAX_CARDS });
        }
        if face_pool > MAX_FACE_POOL {
            return Err(ConfigError::FacePoolTooLarge {
                available: face_pool,
                max: MAX_FACE_POOL,
            });
        }
        if self.pairs() > face_pool {
            return Err(ConfigError::NotEnoughFaces {
                needed: self.pairs(),
                available: face_pool,
            });
        }
        Ok(())
    }

    /// Grid index of the card at (`row`, `column`), if inside the grid.
    #[must_use]
    pub fn index_of(self, row: u16, column: u16) -> Option<usize> {
        (row < self.rows && column < self.columns)
            .then(|| row as usize * self.columns as usize + column as usize)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Difficulty::Easy.grid()
    }
}

impl std::fmt::Display for GridSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.columns, self.rows)
    }
}

impl std::str::FromStr for GridSize {
    type Err = ConfigError;

    /// Parse `COLSxROWS`, e.g. `4x3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ConfigError::UnknownDifficulty(s.to_string());
        let (columns, rows) = s.trim().split_once(['x', 'X']).ok_or_else(unknown)?;
        let columns = columns.trim().parse().map_err(|_| unknown())?;
        let rows = rows.trim().parse().map_err(|_| unknown())?;
        Ok(Self::new(columns, rows))
    }
}

/// Grid presets offered in the settings dialog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// 3x2, three pairs.
    #[default]
    Easy,
    /// 4x3, six pairs.
    Medium,
    /// 5x4, ten pairs.
    Hard,
    /// 6x5, fifteen pairs.
    Expert,
}

impl Difficulty {
    /// All presets, easiest first.
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    /// Grid for this preset.
    #[must_use]
    pub const fn grid(self) -> GridSize {
        match self {
            Difficulty::Easy => GridSize::new(3, 2),
            Difficulty::Medium => GridSize::new(4, 3),
            Difficulty::Hard => GridSize::new(5, 4),
            Difficulty::Expert => GridSize::new(6, 5),
        }
    }

    /// Preset matching a grid, if any.
    #[must_use]
    pub fn from_grid(grid: GridSize) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.grid() == grid)
    }

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownDifficulty(s.to_string()))
    }
}

/// Fixed durations of the round, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// One half of a flip (edge-on and back). A full flip takes twice this.
    pub flip_half_ms: u64,

    /// Clicks stay blocked this long after the first card of a pair is
    /// revealed.
    pub first_reveal_ms: u64,

    /// Delay between revealing the second card and comparing the pair.
    pub compare_delay_ms: u64,

    /// Delay after a comparison before clicks are accepted again.
    pub settle_ms: u64,

    /// Duration of the vanish transition of a matched card.
    pub vanish_ms: u64,
}

impl Timings {
    /// Duration of a complete flip.
    #[must_use]
    pub const fn flip_ms(&self) -> u64 {
        self.flip_half_ms * 2
    }

    /// All delays zero. Useful for driving a round synchronously.
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            flip_half_ms: 0,
            first_reveal_ms: 0,
            compare_delay_ms: 0,
            settle_ms: 0,
            vanish_ms: 0,
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            flip_half_ms: 200,
            first_reveal_ms: 1000,
            compare_delay_ms: 800,
            settle_ms: 1000,
            vanish_ms: 1000,
        }
    }
}

/// Complete game configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Grid dealt at start and on restart.
    pub grid: GridSize,

    /// Transition and delay durations.
    pub timings: Timings,

    /// Number of distinct faces available for dealing.
    pub face_pool: usize,

    /// RNG seed. `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid: GridSize::default(),
            timings: Timings::default(),
            face_pool: DEFAULT_FACE_POOL,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grid.
    #[must_use]
    pub fn with_grid(mut self, grid: GridSize) -> Self {
        self.grid = grid;
        self
    }

    /// Set the grid from a preset.
    #[must_use]
    pub fn with_difficulty(self, difficulty: Difficulty) -> Self {
        self.with_grid(difficulty.grid())
    }

    /// Set the timings.
    #[must_use]
    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Set the face pool size.
    #[must_use]
    pub fn with_face_pool(mut self, face_pool: usize) -> Self {
        self.face_pool = face_pool;
        self
    }

    /// Set a fixed RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configured grid against the face pool.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate(self.face_pool)
    }
}
