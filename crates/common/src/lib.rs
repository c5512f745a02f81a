//! Shared types used across the orbitscene crates.

mod types;

pub use types::{Color, Transform};
