//! Cards on the table: grid position, pairing key and face state.
//!
//! ## Face State Machine
//!
//! ```text
//! FaceDown --flip--> FaceUp --match--> Matched (terminal)
//!                    FaceUp --mismatch--> FaceDown
//! ```
//!
//! Transitions that do not follow these edges are refused and leave the
//! card untouched.

use serde::{Deserialize, Serialize};

/// Position of a card in the grid, row-major from the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u16);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the grid index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Face identity shared by exactly two cards in a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairingKey(pub u16);

impl PairingKey {
    /// Create a new pairing key.
    #[must_use]
    pub const fn new(key: u16) -> Self {
        Self(key)
    }

    /// Get the raw key value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for PairingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Key({})", self.0)
    }
}

/// Which side of a card the player sees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardFace {
    /// Back showing. Every card starts here.
    #[default]
    FaceDown,
    /// Front showing, pending comparison.
    FaceUp,
    /// Paired and removed from play.
    Matched,
}

/// A card in a round.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// Grid position.
    pub id: CardId,

    /// Face identity used to decide a match.
    pub key: PairingKey,

    /// Current face state.
    pub face: CardFace,

    /// A commanded flip/vanish has not reported completion yet.
    pub in_transition: bool,
}

impl Card {
    /// Create a face-down card.
    #[must_use]
    pub fn new(id: CardId, key: PairingKey) -> Self {
        Self {
            id,
            key,
            face: CardFace::FaceDown,
            in_transition: false,
        }
    }

    /// Is the card face-down and idle, i.e. a legal click target?
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        self.face == CardFace::FaceDown && !self.in_transition
    }

    /// Has the card been paired?
    #[must_use]
    pub fn is_matched(&self) -> bool {
        self.face == CardFace::Matched
    }

    /// FaceDown -> FaceUp. Returns false if the card was not face-down.
    pub fn reveal(&mut self) -> bool {
        self.transition(CardFace::FaceDown, CardFace::FaceUp)
    }

    /// FaceUp -> FaceDown. Returns false if the card was not face-up.
    pub fn hide(&mut self) -> bool {
        self.transition(CardFace::FaceUp, CardFace::FaceDown)
    }

    /// FaceUp -> Matched. Returns false if the card was not face-up.
    pub fn remove(&mut self) -> bool {
        self.transition(CardFace::FaceUp, CardFace::Matched)
    }

    fn transition(&mut self, from: CardFace, to: CardFace) -> bool {
        if self.face != from {
            return false;
        }
        self.face = to;
        self.in_transition = true;
        true
    }
}
