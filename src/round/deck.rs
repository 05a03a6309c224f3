//! Dealing a round.
//!
//! A deal picks `pairs` distinct faces uniformly from the face pool, adds
//! each face twice and shuffles the positions. Face selection and layout
//! use separate RNG context streams.

use im::Vector;
use rustc_hash::FxHashMap;

use crate::core::{Card, CardId, ConfigError, GameRng, GridSize, PairingKey, MAX_CARDS, MAX_FACE_POOL};

/// Deal a shuffled grid of face-down cards.
///
/// Fails if the grid is empty, has an odd card count, or needs more
/// distinct faces than `face_pool` provides, or if the card count or pool
/// size exceeds the `u16` id space.
pub fn deal(grid: GridSize, face_pool: usize, rng: &GameRng) -> Result<Vector<Card>, ConfigError> {
    grid.validate(face_pool)?;

    let mut faces = rng.for_context("faces");
    let mut layout = rng.for_context("layout");

    let mut pool = (0..face_pool)
        .map(|k| u16::try_from(k).map(PairingKey::new))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ConfigError::FacePoolTooLarge {
            available: face_pool,
            max: MAX_FACE_POOL,
        })?;
    faces.shuffle(&mut pool);

    let mut keys: Vec<PairingKey> = pool
        .iter()
        .take(grid.pairs())
        .flat_map(|&key| [key, key])
        .collect();
    layout.shuffle(&mut keys);

    let total = keys.len();
    keys.into_iter()
        .enumerate()
        .map(|(i, key)| u16::try_from(i).map(|id| Card::new(CardId::new(id), key)))
        .collect::<Result<Vector<_>, _>>()
        .map_err(|_| ConfigError::TooManyCards { total, max: MAX_CARDS })
}

/// Count how many cards carry each pairing key.
#[must_use]
pub fn pair_counts<'a>(cards: impl IntoIterator<Item = &'a Card>) -> FxHashMap<PairingKey, usize> {
    let mut counts = FxHashMap::default();
    for card in cards {
        *counts.entry(card.key).or_insert(0) += 1;
    }
    counts
}
