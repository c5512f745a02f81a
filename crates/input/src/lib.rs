//! Pointer input mapped to host-independent control events.
//!
//! # Invariants
//! - Controls consume `ControlEvent`s, never raw windowing events.
//! - Positions are in logical pixels relative to the interactive element.

pub mod event;

pub use event::{ControlEvent, PointerButton};
