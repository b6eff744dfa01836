//! Draggable 3D token: pointer drag rotates it, release springs it back to its rest pose.

use serde::{Deserialize, Serialize};

use crate::foundation::core::Vec2;

const SUBSTEP: f64 = 1.0 / 240.0;

/// Motion while nobody interacts with the token.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdleBehavior {
    /// Continuous Y rotation.
    Spin {
        /// Degrees per second.
        deg_per_sec: f64,
    },
    /// Slow scale pulse.
    Breathe {
        /// Scale amplitude around 1.
        amp: f64,
        /// Seconds per cycle.
        period_secs: f64,
    },
    /// No idle motion.
    Still,
}

/// Tuning of a token.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenParams {
    /// Idle motion.
    pub idle: IdleBehavior,
    /// Flip 180 degrees around Y while hovered.
    pub force_flip: bool,
    /// Spring stiffness pulling back to rest.
    pub stiffness: f64,
    /// Spring damping.
    pub damping: f64,
    /// Degrees of rotation per dragged pixel.
    pub drag_sensitivity: f64,
    /// Maximum tilt around X, in degrees.
    pub max_tilt: f64,
    /// Scale while hovered.
    pub hover_scale: f64,
}

impl Default for TokenParams {
    fn default() -> Self {
        Self {
            idle: IdleBehavior::Spin { deg_per_sec: 20.0 },
            force_flip: false,
            stiffness: 120.0,
            damping: 14.0,
            drag_sensitivity: 0.5,
            max_tilt: 45.0,
            hover_scale: 1.08,
        }
    }
}

/// Rendered orientation of a token.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Pose {
    /// Rotation around X in degrees.
    pub rotate_x: f64,
    /// Rotation around Y in degrees.
    pub rotate_y: f64,
    /// Uniform scale.
    pub scale: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Spring {
    pos: f64,
    vel: f64,
}

impl Spring {
    fn step(&mut self, target: f64, k: f64, c: f64, h: f64) {
        let acc = -k * (self.pos - target) - c * self.vel;
        self.vel += acc * h;
        self.pos += self.vel * h;
    }
}

/// Interactive token state.
#[derive(Clone, Debug)]
pub struct Rotatable3DToken {
    params: TokenParams,
    rot_x: Spring,
    rot_y: Spring,
    scale: Spring,
    idle_angle: f64,
    clock: f64,
    carry: f64,
    drag_from: Option<Vec2>,
    hovered: bool,
}

impl Rotatable3DToken {
    /// Token at rest.
    pub fn new(params: TokenParams) -> Self {
        Self {
            params,
            rot_x: Spring::default(),
            rot_y: Spring::default(),
            scale: Spring { pos: 1.0, vel: 0.0 },
            idle_angle: 0.0,
            clock: 0.0,
            carry: 0.0,
            drag_from: None,
            hovered: false,
        }
    }

    /// Current tuning.
    pub fn params(&self) -> &TokenParams {
        &self.params
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag_from.is_some()
    }

    /// Begin a drag at pointer position `at`.
    pub fn pointer_down(&mut self, at: Vec2) {
        self.drag_from = Some(at);
        self.rot_x.vel = 0.0;
        self.rot_y.vel = 0.0;
    }

    /// Rotate by the pointer delta since the last event.
    pub fn pointer_move(&mut self, at: Vec2) {
        let Some(from) = self.drag_from else {
            return;
        };
        let d = at - from;
        let s = self.params.drag_sensitivity;
        self.rot_y.pos += d.x * s;
        self.rot_x.pos = (self.rot_x.pos - d.y * s).clamp(-self.params.max_tilt, self.params.max_tilt);
        self.drag_from = Some(at);
    }

    /// End the drag; the spring takes over.
    pub fn pointer_up(&mut self) {
        if self.drag_from.take().is_some() {
            let base = self.rest_y();
            // Unwind whole turns so the spring takes the short way back.
            self.rot_y.pos = base + (self.rot_y.pos - base + 180.0).rem_euclid(360.0) - 180.0;
        }
    }

    /// Pointer entered (`true`) or left (`false`) the token.
    pub fn hover(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    /// Advance by `dt` seconds in fixed substeps.
    pub fn step(&mut self, dt: f64) {
        self.carry += dt.max(0.0);
        while self.carry >= SUBSTEP {
            self.carry -= SUBSTEP;
            self.substep();
        }
    }

    fn rest_y(&self) -> f64 {
        let flip = if self.hovered && self.params.force_flip {
            180.0
        } else {
            0.0
        };
        self.idle_angle + flip
    }

    fn rest_scale(&self) -> f64 {
        let breathe = match self.params.idle {
            IdleBehavior::Breathe { amp, period_secs } if period_secs > 0.0 => {
                amp * (std::f64::consts::TAU * self.clock / period_secs).sin()
            }
            _ => 0.0,
        };
        if self.hovered {
            self.params.hover_scale
        } else {
            1.0 + breathe
        }
    }

    fn substep(&mut self) {
        let h = SUBSTEP;
        self.clock += h;
        let interacting = self.drag_from.is_some() || self.hovered;
        if let IdleBehavior::Spin { deg_per_sec } = self.params.idle {
            if !interacting {
                self.idle_angle += deg_per_sec * h;
            }
        }

        let (k, c) = (self.params.stiffness, self.params.damping);
        if self.drag_from.is_none() {
            let rest_y = self.rest_y();
            self.rot_x.step(0.0, k, c, h);
            self.rot_y.step(rest_y, k, c, h);
        }
        let rest_scale = self.rest_scale();
        self.scale.step(rest_scale, k, c, h);
    }

    /// Current orientation, rotation in `(-180, 180]` around Y.
    pub fn pose(&self) -> Pose {
        let y = self.rot_y.pos.rem_euclid(360.0);
        Pose {
            rotate_x: self.rot_x.pos,
            rotate_y: if y > 180.0 { y - 360.0 } else { y },
            scale: self.scale.pos,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/rotatable/token.rs"]
mod tests;
