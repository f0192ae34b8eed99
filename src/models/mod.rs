//! Domain models for MonteSuivi.
//!
//! # Core Concepts
//!
//! - [`Kid`]: A child whose progress through the workshops is tracked.
//! - [`Workshop`]: An activity a kid can be presented with, then validated on.
//! - [`Progress`]: The link between one kid and one workshop. Carries the
//!   optional bookmarked, presented and validated timestamps. At most one
//!   record exists per (kid, workshop) pair.

mod kid;
mod progress;
mod workshop;

pub use kid::*;
pub use progress::*;
pub use workshop::*;
