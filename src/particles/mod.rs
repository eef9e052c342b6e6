//! Particle systems for the portal overlay
//!
//! Two independent engines with the same emit / update / render lifecycle:
//! embers are short-lived sparks pulled down by gravity, spores are
//! long-lived ambient motes that wander on a random walk.

mod ember;
mod spore;

pub use ember::{Ember, EmberEngine, EMBER_COLOR};
pub use spore::{Spore, SporeEngine};
