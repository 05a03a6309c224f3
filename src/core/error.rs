//! Configuration errors.
//!
//! The only validated condition in a game is the grid shape. The `Display`
//! text of each variant is the notice shown to the player when a settings
//! change is refused.

use thiserror::Error;

/// Errors raised when a grid or configuration is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Total card count is odd, so cards cannot be paired.
    #[error("total card count must be even ({columns}x{rows} = {total})")]
    OddCardCount {
        /// Columns requested
        columns: u16,
        /// Rows requested
        rows: u16,
        /// columns * rows
        total: u32,
    },

    /// A grid with no cards.
    #[error("grid must contain at least one pair of cards")]
    EmptyGrid,

    /// Grid holds more cards than can be given distinct ids.
    #[error("grid has {total} cards but at most {max} are supported")]
    TooManyCards {
        /// columns * rows
        total: usize,
        /// Largest supported card count
        max: usize,
    },

    /// Face pool holds more faces than can be given distinct keys.
    #[error("face pool of {available} exceeds the maximum of {max}")]
    FacePoolTooLarge {
        /// Configured face pool
        available: usize,
        /// Largest supported face pool
        max: usize,
    },

    /// Grid needs more distinct faces than the face pool holds.
    #[error("grid needs {needed} distinct faces but only {available} are available")]
    NotEnoughFaces {
        /// Distinct faces the grid needs (pairs)
        needed: usize,
        /// Size of the face pool
        available: usize,
    },

    /// Difficulty or grid string not recognized.
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odd_count_message() {
        let err = ConfigError::OddCardCount { columns: 3, rows: 3, total: 9 };
        assert_eq!(err.to_string(), "total card count must be even (3x3 = 9)");
    }

    #[test]
    fn test_not_enough_faces_message() {
        let err = ConfigError::NotEnoughFaces { needed: 20, available: 18 };
        assert_eq!(
            err.to_string(),
            "grid needs 20 distinct faces but only 18 are available"
        );
    }
}
