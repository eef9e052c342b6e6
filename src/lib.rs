//! riftgate: a gesture-driven portal overlay composited onto live video
//!
//! The heart of the crate is [`portal::Portal`], a small open/close state
//! machine that renders a glowing, distorted rift over each camera frame using
//! the transforms in [`effects`] and the particle systems in [`particles`].
//! [`gesture::PortalController`] turns hand-tracking signals into portal
//! commands.

pub mod config;
pub mod control;
pub mod effects;
pub mod error;
pub mod frame;
pub mod gesture;
pub mod math;
pub mod particles;
pub mod portal;
pub mod source;
pub mod util;

pub use error::{Error, Result};
