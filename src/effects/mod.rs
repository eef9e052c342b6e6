//! Image transforms used by the portal compositor
//!
//! Every function here takes its input by reference and returns a new frame
//! (or draws into a layer it is handed), so stages can be chained freely and
//! the caller's camera frame is never touched.

mod displacement;
mod glow;
mod grade;
mod lightning;

pub use displacement::{displacement_map, heat_distort};
pub use glow::glow_effect;
pub use grade::{
    chromatic_aberration, color_grade_upside_down, crt_filter, desaturate_dark, flicker_factor,
    GRADE_WASH,
};
pub use lightning::{draw_lightning, draw_rim_cracks};
