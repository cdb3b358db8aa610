//! Time-limited visual resonance events and their pool.

use crate::constants::CRYSTALLIZE_AT;
use glam::Vec2;
use rand::Rng;
use smallvec::SmallVec;
use std::f32::consts::{PI, TAU};

/// One ellipse of a splash burst, relative to the event origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Splash {
    pub angle: f32,
    pub distance: f32,
    pub rx: f32,
    pub ry: f32,
    pub rotation: f32,
}

pub type Splashes = SmallVec<[Splash; 16]>;

/// Ranges a splash burst is drawn from.
#[derive(Clone, Copy, Debug)]
pub struct SplashSpec {
    pub distance: (f32, f32),
    pub rx: (f32, f32),
    pub ry: (f32, f32),
}

pub const BALL_SPLASH: SplashSpec = SplashSpec {
    distance: (22.0, 48.0),
    rx: (10.0, 28.0),
    ry: (6.0, 20.0),
};

pub const VOICE_BURST: SplashSpec = SplashSpec {
    distance: (18.0, 48.0),
    rx: (6.0, 18.0),
    ry: (4.0, 12.0),
};

/// `count` independently randomized splash particles.
pub fn splash_burst<R: Rng + ?Sized>(rng: &mut R, count: usize, spec: SplashSpec) -> Splashes {
    (0..count)
        .map(|_| Splash {
            angle: rng.gen_range(0.0..TAU),
            distance: rng.gen_range(spec.distance.0..spec.distance.1),
            rx: rng.gen_range(spec.rx.0..spec.rx.1),
            ry: rng.gen_range(spec.ry.0..spec.ry.1),
            rotation: rng.gen_range(0.0..PI),
        })
        .collect()
}

/// Closed set of resonance event variants with their payloads.
#[derive(Clone, Debug, PartialEq)]
pub enum ResonanceKind {
    PressPulse,
    DoubleTapPulse,
    /// `phase` delays the ring, used by the audio-tinted echo wave.
    TapWave { phase: f32 },
    DragTrace,
    /// `persisted` flips once the stroke has been written to the ink buffer.
    DragVibrato { persisted: bool },
    BallSplash { splashes: Splashes },
    LongPressInk,
    VoiceHalo,
    VoiceAttack { splashes: Splashes },
}

impl ResonanceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ResonanceKind::PressPulse => "pressPulse",
            ResonanceKind::DoubleTapPulse => "doubleTapPulse",
            ResonanceKind::TapWave { .. } => "tapWave",
            ResonanceKind::DragTrace => "dragTrace",
            ResonanceKind::DragVibrato { .. } => "dragVibrato",
            ResonanceKind::BallSplash { .. } => "ballSplash",
            ResonanceKind::LongPressInk => "longPressInk",
            ResonanceKind::VoiceHalo => "voiceHalo",
            ResonanceKind::VoiceAttack { .. } => "voiceAttack",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResonanceEvent {
    pub kind: ResonanceKind,
    pub origin: Vec2,
    pub target: Option<Vec2>,
    pub intensity: f32,
    pub tone: f32,
    pub ttl: f32,
    pub age: f32,
}

impl ResonanceEvent {
    pub fn new(kind: ResonanceKind, origin: Vec2, intensity: f32, tone: f32, ttl: f32) -> Self {
        Self {
            kind,
            origin,
            target: None,
            intensity: intensity.clamp(0.0, 1.0),
            tone: tone.clamp(0.0, 1.0),
            ttl,
            age: 0.0,
        }
    }

    pub fn with_target(mut self, target: Vec2) -> Self {
        self.target = Some(target);
        self
    }

    /// Fraction of life elapsed, in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.ttl <= 0.0 {
            1.0
        } else {
            (self.age / self.ttl).clamp(0.0, 1.0)
        }
    }

    pub fn fade(&self) -> f32 {
        1.0 - self.progress()
    }

    pub fn expired(&self) -> bool {
        self.age >= self.ttl
    }
}

/// A drag-vibrato stroke that just crossed its crystallization point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crystallization {
    pub from: Vec2,
    pub to: Vec2,
    pub stamps: u32,
}

/// Insertion-ordered pool of live events.
#[derive(Clone, Debug, Default)]
pub struct ResonanceBus {
    events: Vec<ResonanceEvent>,
}

impl ResonanceBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, mut event: ResonanceEvent) {
        event.age = 0.0;
        self.events.push(event);
    }

    pub fn events(&self) -> &[ResonanceEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Age every event, collect vibrato strokes reaching their
    /// crystallization point, then drop expired events.
    pub fn update(&mut self, dt: f32, out: &mut Vec<Crystallization>) {
        for event in &mut self.events {
            event.age += dt;
            let ripe = event.age >= event.ttl * CRYSTALLIZE_AT;
            let intensity = event.intensity;
            if let ResonanceKind::DragVibrato { persisted } = &mut event.kind {
                if ripe && !*persisted {
                    *persisted = true;
                    out.push(Crystallization {
                        from: event.origin,
                        to: event.target.unwrap_or(event.origin),
                        stamps: (2.0 + intensity * 4.0).round() as u32,
                    });
                }
            }
        }
        self.events.retain(|e| !e.expired());
    }
}
