//! Mode profiles: immutable bundles of physics and visual constants.
//!
//! The built-in table carries the three shipped modes. Front-ends may build
//! their own [`ProfileTable`] and inject it; profiles are never mutated in
//! place, switching mode swaps the whole bundle and resets the world.

use crate::error::CoreError;
use crate::surface::{InkStops, Rgba};
use fnv::FnvHashMap;
use glam::Vec2;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    Sumi,
    Firework,
    Generatif,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 3] = [
        ProfileKind::Sumi,
        ProfileKind::Firework,
        ProfileKind::Generatif,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProfileKind::Sumi => "sumi",
            ProfileKind::Firework => "firework",
            ProfileKind::Generatif => "generatif",
        }
    }
}

impl FromStr for ProfileKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProfileKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownProfile(s.to_string()))
    }
}

/// `base + energy^power × scale`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadiusCurve {
    pub base: f32,
    pub scale: f32,
    pub power: f32,
}

impl RadiusCurve {
    pub fn at(&self, energy: f32) -> f32 {
        self.base + energy.clamp(0.0, 1.0).powf(self.power) * self.scale
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsProfile {
    /// Velocity multiplier applied every tick.
    pub friction: f32,
    pub drift: f32,
    pub push: f32,
    pub wobble_force: f32,
    pub wobble_decay: f32,
    pub restitution: f32,
    pub spin: f32,
    pub max_speed: f32,
    pub wander_force: f32,
    pub tilt_force: f32,
    /// Inward velocity added on every boundary hit, plus its audio-scaled part.
    pub edge_push: f32,
    pub edge_push_audio: f32,
    /// Fraction of tangential velocity removed on a boundary hit.
    pub tangential_damping: f32,
    pub free_roam_speed_boost: f32,
    pub energy_speed_boost: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatercolorProfile {
    pub base_radius: f32,
    pub jitter: f32,
    pub ring_min: u32,
    pub ring_max: u32,
}

/// One of three concentric audio-tracking ink rings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InkBand {
    pub stops: InkStops,
    /// Radius relative to the agent's ink radius at rest.
    pub radius_factor: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentStyle {
    pub fill: Rgba,
    pub stroke: Rgba,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    pub kind: ProfileKind,
    pub label: &'static str,
    pub background: Rgba,
    pub border: Rgba,
    pub ink_stops: Vec<InkStops>,
    /// Outer (low), middle (mid), inner (high).
    pub ink_bands: Option<[InkBand; 3]>,
    pub agent: AgentStyle,
    pub tone_low: Rgba,
    pub tone_high: Rgba,
    pub physics: PhysicsProfile,
    pub ink_radius: RadiusCurve,
    pub agent_radius: RadiusCurve,
    pub watercolor: WatercolorProfile,
    pub watercolor_palette: Vec<InkStops>,
    pub droplet_palette: Vec<InkStops>,
    pub droplet_base_radius: f32,
}

/// `floor(((sin(seed) + 1) / 2) × len)`, kept in range.
pub fn palette_index(len: usize, seed: f64) -> usize {
    if len == 0 {
        return 0;
    }
    let t = (seed.sin() + 1.0) * 0.5;
    ((t * len as f64).floor() as usize).min(len - 1)
}

fn pick(palette: &[InkStops], fallback: &[InkStops], seed: f64) -> InkStops {
    let palette = if palette.is_empty() { fallback } else { palette };
    palette
        .get(palette_index(palette.len(), seed))
        .copied()
        .unwrap_or(InkStops::fading(Rgba::new(10, 10, 12, 0.22)))
}

impl Profile {
    pub fn ink_stops_at(&self, p: Vec2, now_sec: f64) -> InkStops {
        let seed = p.x as f64 * 0.01 + p.y as f64 * 0.012 + now_sec * 0.4;
        pick(&self.ink_stops, &[], seed)
    }

    pub fn watercolor_at(&self, p: Vec2, now_sec: f64) -> InkStops {
        let seed = p.x as f64 * 0.02 + p.y as f64 * 0.017 + now_sec * 0.7;
        pick(&self.watercolor_palette, &self.ink_stops, seed)
    }

    pub fn droplet_at(&self, p: Vec2, now_sec: f64) -> InkStops {
        let seed = p.x as f64 * 0.015 + p.y as f64 * 0.018 + now_sec * 0.6;
        pick(&self.droplet_palette, &self.watercolor_palette, seed)
    }

    /// Overlay color for a resonance tone in [0, 1].
    pub fn tone_color(&self, tone: f32) -> Rgba {
        self.tone_low.lerp(self.tone_high, tone)
    }
}

fn stops(r: u8, g: u8, b: u8, a: f32) -> InkStops {
    InkStops::fading(Rgba::new(r, g, b, a))
}

fn band(r: u8, g: u8, b: u8, a: f32, radius_factor: f32) -> InkBand {
    InkBand {
        stops: stops(r, g, b, a),
        radius_factor,
    }
}

pub fn sumi() -> Profile {
    Profile {
        kind: ProfileKind::Sumi,
        label: "Sumi.e",
        background: Rgba::opaque(244, 241, 234),
        border: Rgba::new(0, 0, 0, 0.06),
        ink_stops: vec![stops(20, 18, 16, 0.26), stops(32, 28, 24, 0.2)],
        ink_bands: Some([
            band(18, 16, 14, 0.42, 1.0),
            band(34, 30, 26, 0.32, 0.7),
            band(52, 46, 40, 0.26, 0.42),
        ]),
        agent: AgentStyle {
            fill: Rgba::opaque(59, 35, 32),
            stroke: Rgba::new(0, 0, 0, 0.25),
        },
        tone_low: Rgba::opaque(60, 52, 44),
        tone_high: Rgba::opaque(168, 132, 88),
        physics: PhysicsProfile {
            friction: 0.987,
            drift: 14.0,
            push: 95.0,
            wobble_force: 26.0,
            wobble_decay: 2.4,
            restitution: 0.8,
            spin: 12.0,
            max_speed: 700.0,
            wander_force: 22.0,
            tilt_force: 180.0,
            edge_push: 24.0,
            edge_push_audio: 90.0,
            tangential_damping: 0.2,
            free_roam_speed_boost: 0.15,
            energy_speed_boost: 0.5,
        },
        ink_radius: RadiusCurve {
            base: 6.0,
            scale: 20.0,
            power: 1.5,
        },
        agent_radius: RadiusCurve {
            base: 8.0,
            scale: 6.0,
            power: 1.1,
        },
        watercolor: WatercolorProfile {
            base_radius: 26.0,
            jitter: 14.0,
            ring_min: 2,
            ring_max: 4,
        },
        watercolor_palette: vec![
            stops(120, 94, 72, 0.35),
            stops(168, 132, 88, 0.3),
            stops(200, 162, 116, 0.28),
        ],
        droplet_palette: vec![stops(140, 110, 82, 0.55), stops(176, 132, 96, 0.5)],
        droplet_base_radius: 20.0,
    }
}

pub fn firework() -> Profile {
    Profile {
        kind: ProfileKind::Firework,
        label: "Firework",
        background: Rgba::opaque(17, 18, 26),
        border: Rgba::new(255, 255, 255, 0.08),
        ink_stops: vec![
            stops(255, 106, 61, 0.28),
            stops(255, 214, 90, 0.26),
            stops(255, 72, 170, 0.24),
        ],
        ink_bands: None,
        agent: AgentStyle {
            fill: Rgba::opaque(255, 77, 58),
            stroke: Rgba::new(255, 255, 255, 0.25),
        },
        tone_low: Rgba::opaque(255, 106, 61),
        tone_high: Rgba::opaque(120, 190, 255),
        physics: PhysicsProfile {
            friction: 0.97,
            drift: 40.0,
            push: 220.0,
            wobble_force: 60.0,
            wobble_decay: 1.8,
            restitution: 0.86,
            spin: 24.0,
            max_speed: 1200.0,
            wander_force: 60.0,
            tilt_force: 320.0,
            edge_push: 40.0,
            edge_push_audio: 160.0,
            tangential_damping: 0.12,
            free_roam_speed_boost: 0.2,
            energy_speed_boost: 0.6,
        },
        ink_radius: RadiusCurve {
            base: 8.0,
            scale: 34.0,
            power: 1.7,
        },
        agent_radius: RadiusCurve {
            base: 10.0,
            scale: 10.0,
            power: 1.25,
        },
        watercolor: WatercolorProfile {
            base_radius: 34.0,
            jitter: 18.0,
            ring_min: 3,
            ring_max: 6,
        },
        watercolor_palette: vec![
            stops(255, 94, 98, 0.65),
            stops(255, 180, 72, 0.6),
            stops(255, 80, 190, 0.55),
            stops(120, 190, 255, 0.55),
        ],
        droplet_palette: vec![
            stops(255, 124, 60, 0.75),
            stops(255, 212, 98, 0.7),
            stops(255, 98, 200, 0.7),
        ],
        droplet_base_radius: 26.0,
    }
}

pub fn generatif() -> Profile {
    Profile {
        kind: ProfileKind::Generatif,
        label: "Art génératif",
        background: Rgba::opaque(243, 246, 255),
        border: Rgba::new(0, 0, 0, 0.06),
        ink_stops: vec![
            stops(64, 110, 255, 0.24),
            stops(56, 210, 160, 0.2),
            stops(255, 120, 210, 0.22),
        ],
        ink_bands: None,
        agent: AgentStyle {
            fill: Rgba::opaque(78, 60, 255),
            stroke: Rgba::new(0, 0, 0, 0.2),
        },
        tone_low: Rgba::opaque(64, 110, 255),
        tone_high: Rgba::opaque(255, 120, 210),
        physics: PhysicsProfile {
            friction: 0.982,
            drift: 28.0,
            push: 150.0,
            wobble_force: 38.0,
            wobble_decay: 2.1,
            restitution: 0.82,
            spin: 18.0,
            max_speed: 900.0,
            wander_force: 40.0,
            tilt_force: 240.0,
            edge_push: 30.0,
            edge_push_audio: 120.0,
            tangential_damping: 0.16,
            free_roam_speed_boost: 0.18,
            energy_speed_boost: 0.55,
        },
        ink_radius: RadiusCurve {
            base: 7.0,
            scale: 26.0,
            power: 1.6,
        },
        agent_radius: RadiusCurve {
            base: 9.0,
            scale: 8.0,
            power: 1.2,
        },
        watercolor: WatercolorProfile {
            base_radius: 30.0,
            jitter: 16.0,
            ring_min: 3,
            ring_max: 5,
        },
        watercolor_palette: vec![
            stops(94, 176, 255, 0.55),
            stops(120, 255, 204, 0.5),
            stops(255, 140, 232, 0.48),
            stops(255, 206, 120, 0.45),
        ],
        droplet_palette: vec![stops(84, 156, 255, 0.65), stops(255, 144, 222, 0.6)],
        droplet_base_radius: 24.0,
    }
}

/// Profiles keyed by mode.
#[derive(Clone, Debug)]
pub struct ProfileTable {
    profiles: FnvHashMap<ProfileKind, Profile>,
}

impl ProfileTable {
    pub fn empty() -> Self {
        Self {
            profiles: FnvHashMap::default(),
        }
    }

    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for profile in [sumi(), firework(), generatif()] {
            table.insert(profile);
        }
        table
    }

    pub fn insert(&mut self, profile: Profile) {
        self.profiles.insert(profile.kind, profile);
    }

    pub fn get(&self, kind: ProfileKind) -> Option<&Profile> {
        self.profiles.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}
