//! Desktop input mapped to shared actions.
//!
//! # Invariants
//! - The app consumes actions, never raw window events.
//! - Pointer deltas are only produced while a button is held.

pub mod action;
mod pointer;

pub use action::{Action, key_action};
pub use pointer::{PointerButton, PointerTracker};
