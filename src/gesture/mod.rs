//! Gesture input and the glue that turns it into portal commands
//!
//! Hand tracking happens elsewhere. What arrives here is one small
//! fixed-shape record per frame, either from the MQTT feed or built by hand.

mod controller;
mod feed;

pub use controller::PortalController;
pub use feed::{decode_gesture, GestureFeed};

use serde::{Deserialize, Serialize};

/// Per-frame gesture signals for up to two hands
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureState {
    /// Number of hands currently tracked
    pub hands: u8,
    pub pinch: [bool; 2],
    /// Pinch points in normalized [0, 1] frame coordinates
    pub pinch_pos: [Option<[f32; 2]>; 2],
    /// Normalized distance between the two hands, 0 with fewer than two
    pub two_hand_distance: f32,
    /// Hand roll in radians
    pub rotation: f32,
    pub pushing: bool,
}

impl GestureState {
    /// No hands in view
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_hands(&self) -> bool {
        self.hands > 0
    }

    /// Pinch point of the primary hand while it is pinching
    pub fn primary_pinch(&self) -> Option<[f32; 2]> {
        if self.pinch[0] {
            self.pinch_pos[0]
        } else {
            None
        }
    }
}
