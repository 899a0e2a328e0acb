//! Shared types for the haunted house workspace.
//!
//! Kept free of rendering and windowing dependencies so that every crate,
//! including headless tools and tests, can depend on it.

pub mod color;
pub mod types;

pub use color::{Color, ColorError};
pub use types::{NodeId, Transform};
