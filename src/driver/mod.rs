//! Host side of a session: card widgets and a virtual clock.
//!
//! - `CardWidget`: logical visual state of a card
//! - `Driver`: executes session effects and fires timers/completions

mod scheduler;
mod widget;

pub use scheduler::Driver;
pub use widget::{Animation, CardWidget};
