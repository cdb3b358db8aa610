//! Owned simulation entities: the agent, the circular world and the camera.

use crate::constants::{AGENT_RESET_RADIUS, WORLD_SCALE};
use glam::Vec2;

/// The moving mark whose trail is the drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Agent {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub ink_radius: f32,
    /// Distance travelled since the last reset, used to phase band offsets.
    pub trace_offset: f32,
}

impl Agent {
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: AGENT_RESET_RADIUS,
            ink_radius: AGENT_RESET_RADIUS,
            trace_offset: 0.0,
        }
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Hit test used by the gesture recognizer.
    pub fn contains(&self, p: Vec2, radius_sq_factor: f32) -> bool {
        p.distance_squared(self.pos) <= self.radius * self.radius * radius_sq_factor
    }
}

/// Circular domain boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct World {
    pub radius: f32,
    pub center: Vec2,
}

impl World {
    /// World sized from the viewport, centered on the origin.
    pub fn for_view(view: Vec2) -> Self {
        Self::scaled(view, WORLD_SCALE)
    }

    pub fn scaled(view: Vec2, scale: f32) -> Self {
        Self {
            radius: view.x.min(view.y).max(1.0) * scale,
            center: Vec2::ZERO,
        }
    }

    /// Largest center distance an object of `radius` may have.
    pub fn limit_for(&self, radius: f32) -> f32 {
        (self.radius - radius).max(0.0)
    }
}

/// World-to-screen offset (top-left corner of the view in world units).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Camera {
    pub offset: Vec2,
}

impl Camera {
    /// Camera that puts `focus` in the middle of a `view` sized window.
    pub fn centered_on(focus: Vec2, view: Vec2) -> Self {
        Self {
            offset: focus - view * 0.5,
        }
    }

    pub fn screen_to_world(&self, p: Vec2) -> Vec2 {
        p + self.offset
    }

    pub fn world_to_screen(&self, p: Vec2) -> Vec2 {
        p - self.offset
    }
}

/// UI-selected gain on audio-driven forces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Expressivity {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Expressivity {
    pub const ALL: [Expressivity; 4] = [
        Expressivity::Low,
        Expressivity::Medium,
        Expressivity::High,
        Expressivity::VeryHigh,
    ];

    pub fn gain(self) -> f32 {
        match self {
            Expressivity::Low => 0.7,
            Expressivity::Medium => 1.0,
            Expressivity::High => 1.25,
            Expressivity::VeryHigh => 1.55,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Expressivity::Low => "Faible",
            Expressivity::Medium => "Moyen",
            Expressivity::High => "Fort",
            Expressivity::VeryHigh => "Très fort",
        }
    }

    /// Next level up or down, saturating at the ends.
    pub fn step(self, up: bool) -> Self {
        let i = Self::ALL.iter().position(|&e| e == self).unwrap_or(1);
        let j = if up {
            (i + 1).min(Self::ALL.len() - 1)
        } else {
            i.saturating_sub(1)
        };
        Self::ALL[j]
    }
}

impl Default for Expressivity {
    fn default() -> Self {
        Expressivity::Medium
    }
}
