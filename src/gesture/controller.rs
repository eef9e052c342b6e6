use tracing::{debug, info};

use super::GestureState;
use crate::config::ControlConfig;
use crate::math::Vec2;
use crate::portal::Portal;

/// Maps gesture signals onto portal commands and owns the view mode.
///
/// The view ("upside down" effect on or off) follows hand presence: it turns
/// off and closes the portal after the hands have been gone for a while, and
/// turns back on as soon as a hand reappears.
pub struct PortalController {
    config: ControlConfig,
    enabled: bool,
    demo: bool,
    demo_timer: f32,
    clock: f32,
    last_hand_seen: f32,
    /// Portal center minus pinch point, captured when a drag starts
    drag_offset: Option<Vec2>,
}

impl PortalController {
    pub fn new(config: ControlConfig) -> Self {
        Self {
            config,
            enabled: true,
            demo: false,
            demo_timer: 0.0,
            clock: 0.0,
            last_hand_seen: 0.0,
            drag_offset: None,
        }
    }

    /// Apply one frame of gestures. Call before `Portal::update`.
    pub fn apply(&mut self, portal: &mut Portal, gesture: &GestureState, dt: f32) {
        let dt = dt.max(0.0);
        self.clock += dt;

        if gesture.has_hands() {
            self.last_hand_seen = self.clock;
            if !self.enabled {
                self.enabled = true;
                info!("hands back, effect on");
            }
        } else if self.clock - self.last_hand_seen > self.config.hand_absence_timeout
            && self.enabled
        {
            self.enabled = false;
            portal.close();
            info!("no hands, effect off");
        }

        if gesture.two_hand_distance > self.config.open_distance
            && portal.state().is_closing_or_closed()
        {
            portal.open();
        }

        if gesture.has_hands() {
            match gesture.primary_pinch() {
                Some(pos) => self.drag(portal, pos),
                None => self.drag_offset = None,
            }
        }

        if gesture.rotation.abs() > self.config.twist_threshold {
            portal.apply_twist(gesture.rotation * self.config.twist_gain);
        }

        if gesture.pushing {
            portal.close();
        }

        self.advance_demo(portal, dt);
    }

    /// Advance without gesture input, for runs driven only by keys or the
    /// control socket. Demo cycling still runs; hand presence is not tracked.
    pub fn tick(&mut self, portal: &mut Portal, dt: f32) {
        let dt = dt.max(0.0);
        self.clock += dt;
        self.last_hand_seen = self.clock;
        self.advance_demo(portal, dt);
    }

    fn advance_demo(&mut self, portal: &mut Portal, dt: f32) {
        if !self.demo {
            return;
        }
        self.demo_timer += dt;
        if self.demo_timer > self.config.demo_interval {
            self.demo_timer = 0.0;
            if portal.state().is_closing_or_closed() {
                portal.open();
            } else {
                portal.close();
            }
        }
    }

    fn drag(&mut self, portal: &mut Portal, pos: [f32; 2]) {
        let (w, h) = portal.size();
        let pinch = Vec2::new(pos[0] * w as f32, pos[1] * h as f32);
        let offset = *self.drag_offset.get_or_insert_with(|| {
            debug!(x = pinch.x, y = pinch.y, "drag start");
            portal.center() - pinch
        });
        let target = pinch + offset;
        portal.set_position(target.x, target.y);
    }

    /// Flip the effect on or off. The portal grows to `min(w, h) / 5` while
    /// the effect is on and shrinks back to `/ 6` when it is off.
    pub fn toggle_view(&mut self, portal: &mut Portal) {
        self.enabled = !self.enabled;
        let (w, h) = portal.size();
        let divisor = if self.enabled {
            self.config.upside_down_radius_divisor
        } else {
            self.config.normal_radius_divisor
        };
        portal.set_radius((w.min(h) / divisor.max(1)) as f32);
        info!(enabled = self.enabled, "view toggled");
    }

    pub fn toggle_demo(&mut self) {
        self.demo = !self.demo;
        info!(demo = self.demo, "demo mode toggled");
    }

    /// Whether the portal effect should be rendered
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn demo(&self) -> bool {
        self.demo
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_offset.is_some()
    }
}
