//! Rules engine for Shadow City, a hidden-role party game in the
//! Mafia/Werewolf family.
//!
//! Everything in `rules` is a pure function over a snapshot of the table.
//! [`Session`] is the controller that owns the table, applies the outcomes
//! and drives the [`phase`] state machine. No I/O happens in this crate.

pub mod error;
pub mod models;
pub mod phase;
pub mod rules;
pub mod session;

pub use error::GameError;
pub use models::*;
pub use phase::{advance, NightStep, Phase, PhaseError, PhaseEvent};
pub use rules::*;
pub use session::{PhaseReport, Session};
