//! Persistent ink buffer and the per-frame render pass.
//!
//! The buffer is a square raster keyed to world coordinates by
//! `buffer = world - center + side / 2`. Stamps only ever add ink; the single
//! operation that discards it is [`InkCompositor::reset`].

use crate::audio::AudioFeatures;
use crate::constants::*;
use crate::error::CoreError;
use crate::profile::{Profile, WatercolorProfile};
use crate::resonance::{ResonanceEvent, ResonanceKind, Splash};
use crate::state::{Agent, Camera, World};
use crate::surface::{DrawSurface, Ellipse, InkStops, RadialGradient, Rgba};
use glam::Vec2;
use rand::Rng;
use std::f32::consts::PI;
use std::io::Cursor;

/// Everything the render pass reads besides the buffer.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    pub view: Vec2,
    pub camera: Camera,
    pub world: &'a World,
    pub agent: &'a Agent,
    pub events: &'a [ResonanceEvent],
    pub profile: &'a Profile,
}

pub struct InkCompositor<S: DrawSurface> {
    buffer: S,
    world: World,
    margin: f32,
    last_stamp: Vec2,
}

/// Buffer side length for a world: `ceil(2R + margin)`.
pub fn buffer_side(world: &World, margin: f32) -> u32 {
    (world.radius * 2.0 + margin).ceil().max(1.0) as u32
}

impl<S: DrawSurface> InkCompositor<S> {
    pub fn new(buffer: S, world: World, margin: f32, background: Rgba) -> Self {
        let mut ink = Self {
            buffer,
            world,
            margin,
            last_stamp: world.center,
        };
        ink.reset(world, background, world.center);
        ink
    }

    /// Reallocate and clear the buffer. Discards all ink.
    pub fn reset(&mut self, world: World, background: Rgba, start: Vec2) {
        self.world = world;
        let side = buffer_side(&world, self.margin);
        self.buffer.resize(side, side);
        self.buffer.fill_rect(
            Vec2::ZERO,
            Vec2::splat(side as f32),
            background.with_alpha(1.0),
        );
        self.last_stamp = start;
    }

    pub fn buffer(&self) -> &S {
        &self.buffer
    }

    pub fn side(&self) -> u32 {
        self.buffer.width()
    }

    pub fn last_stamp(&self) -> Vec2 {
        self.last_stamp
    }

    pub fn world_to_buffer(&self, p: Vec2) -> Vec2 {
        p - self.world.center + Vec2::splat(self.side() as f32 * 0.5)
    }

    fn clip_to_world(&mut self) {
        let center = Vec2::splat(self.side() as f32 * 0.5);
        self.buffer.save();
        self.buffer.clip_circle(center, self.world.radius);
    }

    /// Lay ink along the segment from the previous stamp to `to`.
    pub fn stamp(&mut self, to: Vec2, agent: &Agent, profile: &Profile, audio: &AudioFeatures, now: f64) {
        let from = self.last_stamp;
        let delta = to - from;
        let step = (agent.ink_radius * STAMP_STEP_FACTOR).max(1.0);
        let count = ((delta.length() / step).ceil() as u32).max(1);

        self.clip_to_world();
        for i in 1..=count {
            let p = from + delta * (i as f32 / count as f32);
            self.stamp_at(p, agent, profile, audio, now);
        }
        self.buffer.restore();
        self.last_stamp = to;
    }

    fn stamp_at(&mut self, p: Vec2, agent: &Agent, profile: &Profile, audio: &AudioFeatures, now: f64) {
        let b = self.world_to_buffer(p);
        let r = agent.ink_radius.max(0.5);

        let Some(bands) = &profile.ink_bands else {
            let stops = profile.ink_stops_at(p, now);
            self.buffer.fill_radial(
                Ellipse::circle(b, r),
                RadialGradient {
                    center: b,
                    r0: 0.0,
                    r1: r,
                    stops,
                },
            );
            return;
        };

        let levels = [audio.low, audio.mid, audio.high];
        for (i, (band, level)) in bands.iter().zip(levels).enumerate() {
            let phase = (now * BAND_PHASE_RATE + i as f64 * 2.1 + agent.trace_offset as f64 * 0.01)
                .sin() as f32;
            let level = level.clamp(0.0, 1.0);
            let radius =
                r * band.radius_factor * (1.0 + level * 0.6 + phase * BAND_PHASE_AMPLITUDE);
            let alpha = 0.55 + level * 0.45;
            let stops = InkStops::new(
                band.stops.core.with_alpha(band.stops.core.a * alpha),
                band.stops.edge,
            );
            self.buffer.fill_radial(
                Ellipse::circle(b, radius.max(0.5)),
                RadialGradient {
                    center: b,
                    r0: 0.0,
                    r1: radius.max(0.5),
                    stops,
                },
            );
        }
    }

    /// Overlapping rotated elliptical washes around `at`.
    pub fn stamp_watercolor<R: Rng + ?Sized>(
        &mut self,
        at: Vec2,
        stops: InkStops,
        base_radius: f32,
        wc: &WatercolorProfile,
        rng: &mut R,
    ) {
        let b = self.world_to_buffer(at);
        let base = base_radius + rng.gen::<f32>() * wc.jitter;
        let rings = rng.gen_range(wc.ring_min..=wc.ring_max.max(wc.ring_min));

        self.clip_to_world();
        for _ in 0..rings {
            let spread = base * (0.8 + rng.gen::<f32>() * 0.7);
            let rx = spread * (0.8 + rng.gen::<f32>() * 0.35);
            let ry = spread * (0.7 + rng.gen::<f32>() * 0.4);
            let rotation = rng.gen::<f32>() * PI;
            self.buffer.fill_radial(
                Ellipse {
                    center: b,
                    rx,
                    ry,
                    rotation,
                },
                RadialGradient {
                    center: b,
                    r0: spread * 0.1,
                    r1: spread,
                    stops,
                },
            );
        }
        self.buffer.restore();
    }

    /// `count` watercolor stamps spread evenly along a segment.
    pub fn stamp_watercolor_line<R: Rng + ?Sized>(
        &mut self,
        from: Vec2,
        to: Vec2,
        count: u32,
        profile: &Profile,
        now: f64,
        rng: &mut R,
    ) {
        let count = count.max(1);
        for i in 0..count {
            let t = if count == 1 {
                0.5
            } else {
                i as f32 / (count - 1) as f32
            };
            let p = from.lerp(to, t);
            let stops = profile.watercolor_at(p, now);
            let base = profile.watercolor.base_radius * 0.5;
            self.stamp_watercolor(p, stops, base, &profile.watercolor, rng);
        }
    }

    /// Compose one frame onto `screen`. Never writes to the ink buffer.
    pub fn render(&self, screen: &mut S, scene: &Scene<'_>) {
        let view = scene.view;
        let cam = scene.camera;
        let profile = scene.profile;

        screen.fill_rect(Vec2::ZERO, view, profile.background.with_alpha(1.0));
        screen.blit(
            &self.buffer,
            self.world_to_buffer(cam.offset),
            view,
            Vec2::ZERO,
        );
        screen.stroke_circle(
            cam.world_to_screen(scene.world.center),
            scene.world.radius,
            2.0,
            profile.border,
        );

        for event in scene.events {
            draw_event(screen, event, scene);
        }

        let p = cam.world_to_screen(scene.agent.pos);
        screen.fill_circle(p, scene.agent.radius, profile.agent.fill);
        screen.stroke_circle(p, scene.agent.radius, 2.0, profile.agent.stroke);
    }

    /// PNG encoding of the whole ink buffer.
    pub fn export_png(&self) -> Result<Vec<u8>, CoreError> {
        let (w, h) = (self.buffer.width(), self.buffer.height());
        if w == 0 || h == 0 {
            return Err(CoreError::EmptyBuffer);
        }
        let rgba = self.buffer.read_rgba();
        let expected = w as usize * h as usize * 4;
        if rgba.len() != expected {
            return Err(CoreError::Readback {
                expected,
                got: rgba.len(),
            });
        }
        let got = rgba.len();
        let image = image::RgbaImage::from_raw(w, h, rgba)
            .ok_or(CoreError::Readback { expected, got })?;
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        log::info!("[ink] exported {}x{} png ({} bytes)", w, h, bytes.len());
        Ok(bytes)
    }
}

fn draw_splashes<S: DrawSurface>(
    screen: &mut S,
    center: Vec2,
    splashes: &[Splash],
    spread: f32,
    color: Rgba,
) {
    for s in splashes {
        let c = center + Vec2::from_angle(s.angle) * s.distance * spread;
        screen.fill_radial(
            Ellipse {
                center: c,
                rx: s.rx,
                ry: s.ry,
                rotation: s.rotation,
            },
            RadialGradient {
                center: c,
                r0: 0.0,
                r1: s.rx.max(s.ry),
                stops: InkStops::fading(color),
            },
        );
    }
}

fn draw_event<S: DrawSurface>(screen: &mut S, event: &ResonanceEvent, scene: &Scene<'_>) {
    let cam = scene.camera;
    let origin = cam.world_to_screen(event.origin);
    let target = event.target.map(|t| cam.world_to_screen(t));
    let p = event.progress();
    let fade = event.fade();
    let color = scene.profile.tone_color(event.tone);
    let alpha = event.intensity * fade;

    match &event.kind {
        ResonanceKind::PressPulse => {
            screen.stroke_circle(origin, 12.0 + p * 28.0, 2.0, color.with_alpha(alpha * 0.6));
        }
        ResonanceKind::DoubleTapPulse => {
            screen.stroke_circle(origin, 20.0 + p * 70.0, 3.0, color.with_alpha(alpha * 0.7));
            screen.stroke_circle(origin, 10.0 + p * 40.0, 2.0, color.with_alpha(alpha * 0.5));
        }
        ResonanceKind::TapWave { phase } => {
            if p < *phase {
                return;
            }
            let local = (p - phase) / (1.0 - phase).max(f32::EPSILON);
            let fade = 1.0 - local;
            screen.stroke_circle(
                origin,
                16.0 + local * 110.0,
                1.0 + event.intensity * 2.0,
                color.with_alpha(event.intensity * fade * 0.6),
            );
        }
        ResonanceKind::DragTrace => {
            let to = target.unwrap_or(origin);
            screen.stroke_line(
                origin,
                to,
                1.0 + event.intensity * 3.0,
                color.with_alpha(alpha * 0.35),
            );
        }
        ResonanceKind::DragVibrato { persisted } => {
            let to = target.unwrap_or(origin);
            let normal = (to - origin).perp().normalize_or_zero();
            let width = if *persisted { 1.5 } else { 1.0 + event.intensity * 3.0 };
            const SEGMENTS: u32 = 6;
            let mut prev = origin;
            for i in 1..=SEGMENTS {
                let t = i as f32 / SEGMENTS as f32;
                let wave = ((t * 2.0 + p) * PI * 2.0).sin() * 3.0 * event.intensity * fade;
                let next = origin.lerp(to, t) + normal * wave;
                screen.stroke_line(prev, next, width, color.with_alpha(alpha * 0.5));
                prev = next;
            }
        }
        ResonanceKind::BallSplash { splashes } => {
            draw_splashes(screen, origin, splashes, 0.6 + p * 0.6, color.with_alpha(alpha * 0.55));
        }
        ResonanceKind::VoiceAttack { splashes } => {
            draw_splashes(screen, origin, splashes, 0.5 + p * 0.8, color.with_alpha(alpha * 0.45));
        }
        ResonanceKind::LongPressInk => {
            screen.fill_circle(
                origin,
                10.0 + event.intensity * 16.0 * (1.0 + p * 0.5),
                color.with_alpha(alpha * 0.25),
            );
        }
        ResonanceKind::VoiceHalo => {
            screen.stroke_circle(
                origin,
                scene.agent.radius + 8.0 + event.intensity * 24.0 + p * 6.0,
                2.0,
                color.with_alpha(alpha * 0.5),
            );
        }
    }
}
