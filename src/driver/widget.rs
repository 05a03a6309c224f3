//! Logical model of a card widget.
//!
//! Tracks which side shows, whether a transition is running and whether
//! the card is still on the table. Durations and drawing belong to the
//! host; the widget only knows that a transition started and, later, that
//! it completed.

use serde::{Deserialize, Serialize};

/// Kind of transition a widget runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Animation {
    /// Turn over (either direction).
    Flip,
    /// Spin, shrink and fade out.
    Vanish,
}

/// Visual state of one card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardWidget {
    front_showing: bool,
    running: Option<Animation>,
    visible: bool,
}

impl Default for CardWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl CardWidget {
    /// A visible card showing its back.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            front_showing: false,
            running: None,
            visible: true,
        }
    }

    /// Start turning the card over. Refused while a transition runs or
    /// after the card vanished.
    pub fn flip(&mut self) -> bool {
        self.start(Animation::Flip)
    }

    /// Turn the card back over; the same transition as `flip`.
    pub fn flip_back(&mut self) -> bool {
        self.flip()
    }

    /// Start the vanish transition. Refused while another transition runs.
    pub fn vanish(&mut self) -> bool {
        self.start(Animation::Vanish)
    }

    /// Finish the running transition and report which one it was.
    pub fn complete(&mut self) -> Option<Animation> {
        let finished = self.running.take()?;
        match finished {
            Animation::Flip => self.front_showing = !self.front_showing,
            Animation::Vanish => self.visible = false,
        }
        Some(finished)
    }

    /// Is the front side showing?
    #[must_use]
    pub fn is_front(&self) -> bool {
        self.front_showing
    }

    /// Is a transition running?
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.running.is_some()
    }

    /// Transition currently running.
    #[must_use]
    pub fn running(&self) -> Option<Animation> {
        self.running
    }

    /// Is the card still on the table?
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn start(&mut self, animation: Animation) -> bool {
        if self.running.is_some() || !self.visible {
            return false;
        }
        self.running = Some(animation);
        true
    }
}
