//! Minesweeper board engine and the competitive ranking state machine around it.
//!
//! [`Board`] owns the grid and the reveal rules. [`Reducer`] turns a [`GameState`] and an [`Action`] into the next
//! state, and [`GameStore`] keeps the live state and notifies subscribers, such as [`session_saver`], after every
//! change.

pub use action::*;
pub use board::*;
pub use difficulty::*;
pub use error::*;
pub use field::*;
pub use generator::*;
pub use persistence::*;
pub use ranking::*;
pub use reducer::*;
pub use rules::*;
pub use state::*;
pub use store::*;
pub use timer::*;
pub use types::*;

mod action;
mod board;
mod difficulty;
mod error;
mod field;
mod generator;
mod persistence;
mod ranking;
mod reducer;
mod rules;
mod state;
mod store;
mod timer;
mod types;
