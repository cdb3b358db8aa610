//! Pointer gesture recognition.
//!
//! A single pointer identity is tracked at a time and walks
//! `Idle → Pressed → {Dragging | LongPress} → Idle`. Recognized gestures
//! emit resonance events into the owned [`ResonanceBus`] and queue
//! [`GestureAction`]s (impulses, wobble kicks, permanent stamps) that the
//! simulation drains once per frame.

use crate::audio::AudioFeatures;
use crate::constants::*;
use crate::resonance::{
    splash_burst, Crystallization, ResonanceBus, ResonanceEvent, ResonanceKind, BALL_SPLASH,
    VOICE_BURST,
};
use crate::state::{Agent, Camera};
use glam::Vec2;
use rand::Rng;

/// Raw pointer input in screen coordinates; `time` in seconds.
/// `pressure` is accepted from pens and touch but does not shape any effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub id: i32,
    pub pos: Vec2,
    pub pressure: Option<f32>,
    pub time: f64,
}

impl PointerSample {
    pub fn new(id: i32, pos: Vec2, time: f64) -> Self {
        Self {
            id,
            pos,
            pressure: None,
            time,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PressTarget {
    Agent,
    World,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PointerPhase {
    #[default]
    Idle,
    Pressed,
    Dragging,
    LongPress,
}

/// Side effects a gesture requests from physics or the ink buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureAction {
    Impulse(Vec2),
    Wobble,
    /// Long-press watercolor droplet at a world position.
    Droplet(Vec2),
    /// Double-tap watercolor burst at a world position.
    Burst(Vec2),
    Crystallize(Crystallization),
}

#[derive(Clone, Copy, Debug)]
struct ActivePointer {
    id: i32,
    pos: Vec2,
    last_delta: Vec2,
    travelled: f32,
    down_at: f64,
    target: PressTarget,
    phase: PointerPhase,
    double_tap: bool,
}

impl ActivePointer {
    fn moved(&self) -> bool {
        self.travelled > MOVE_THRESHOLD_PX
    }
}

#[derive(Clone, Debug, Default)]
pub struct GestureRecognizer {
    active: Option<ActivePointer>,
    tap_anchor: Option<Vec2>,
    last_tap: Option<(f64, Vec2)>,
    last_tap_impulse: Option<f64>,
    combo: u32,
    echo_boost_until: f64,
    last_audio: AudioFeatures,
    bus: ResonanceBus,
    actions: Vec<GestureAction>,
    crystals: Vec<Crystallization>,
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the pointer, tap history, boost window and all live events.
    pub fn reset(&mut self) {
        *self = GestureRecognizer::default();
    }

    pub fn events(&self) -> &[ResonanceEvent] {
        self.bus.events()
    }

    pub fn phase(&self) -> PointerPhase {
        self.active.map(|a| a.phase).unwrap_or_default()
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn echo_boost_active(&self, now: f64) -> bool {
        now < self.echo_boost_until
    }

    /// True while a pressed pointer holds the agent.
    pub fn engaging_agent(&self) -> bool {
        matches!(self.active, Some(a) if a.target == PressTarget::Agent)
    }

    /// World position the agent should be pulled toward while dragged.
    pub fn grab_point(&self, camera: &Camera) -> Option<Vec2> {
        self.active
            .filter(|a| a.target == PressTarget::Agent && a.phase == PointerPhase::Dragging)
            .map(|a| camera.screen_to_world(a.pos))
    }

    pub fn drain_actions(&mut self) -> std::vec::Drain<'_, GestureAction> {
        self.actions.drain(..)
    }

    fn emit(&mut self, event: ResonanceEvent) {
        self.bus.emit(event);
    }

    fn boost(&self, now: f64) -> f32 {
        if self.echo_boost_active(now) {
            ECHO_BOOST_GAIN
        } else {
            1.0
        }
    }

    /// Returns false when the press was ignored (another pointer is active).
    pub fn pointer_down(&mut self, s: PointerSample, agent: &Agent, camera: &Camera) -> bool {
        if self.active.is_some() {
            return false;
        }
        let now = s.time;
        let world = camera.screen_to_world(s.pos);
        let target = if agent.contains(world, ON_AGENT_RADIUS_SQ_FACTOR) {
            PressTarget::Agent
        } else {
            PressTarget::World
        };

        let double_tap = matches!(
            self.last_tap,
            Some((t, p)) if now - t < TAP_WINDOW_SEC && p.distance(s.pos) < TAP_DISTANCE_PX
        );

        self.active = Some(ActivePointer {
            id: s.id,
            pos: s.pos,
            last_delta: Vec2::ZERO,
            travelled: 0.0,
            down_at: now,
            target,
            phase: PointerPhase::Pressed,
            double_tap,
        });

        if double_tap {
            log::debug!("[gesture] double-tap at ({:.0},{:.0})", s.pos.x, s.pos.y);
            self.last_tap = None;
            self.tap_anchor = None;
            self.echo_boost_until = self.echo_boost_until.max(now + ECHO_BOOST_SEC);
            self.emit(ResonanceEvent::new(
                ResonanceKind::DoubleTapPulse,
                agent.pos,
                0.9,
                0.5,
                0.7,
            ));
            self.actions.push(GestureAction::Burst(agent.pos));
            return true;
        }

        self.tap_anchor = Some(s.pos);
        self.emit(
            ResonanceEvent::new(ResonanceKind::PressPulse, world, 0.4, 0.4, 0.35)
                .with_target(agent.pos),
        );
        true
    }

    pub fn pointer_move(&mut self, s: PointerSample, camera: &Camera) {
        let Some(mut a) = self.active.filter(|a| a.id == s.id) else {
            return;
        };
        let delta = s.pos - a.pos;
        let speed = delta.length();
        let from = a.pos;

        a.travelled += speed;
        a.last_delta = delta;
        a.pos = s.pos;
        if a.phase == PointerPhase::Pressed && a.moved() {
            a.phase = PointerPhase::Dragging;
        }
        self.active = Some(a);

        if speed > DRAG_EMIT_THRESHOLD_PX {
            let audio = self.last_audio;
            let kind = if audio.on && audio.centroid > VIBRATO_CENTROID_MIN {
                ResonanceKind::DragVibrato { persisted: false }
            } else {
                ResonanceKind::DragTrace
            };
            let tone = if audio.on { audio.centroid } else { CENTROID_REST };
            self.emit(
                ResonanceEvent::new(
                    kind,
                    camera.screen_to_world(from),
                    (speed / 30.0).clamp(0.2, 1.0),
                    tone,
                    0.25,
                )
                .with_target(camera.screen_to_world(s.pos)),
            );
        }
    }

    pub fn pointer_up<R: Rng + ?Sized>(
        &mut self,
        s: PointerSample,
        agent: &Agent,
        camera: &Camera,
        rng: &mut R,
    ) {
        let Some(a) = self.active.filter(|a| a.id == s.id) else {
            return;
        };
        self.active = None;

        let now = s.time;
        let held = now - a.down_at;
        let world = camera.screen_to_world(a.pos);
        let anchor = self.tap_anchor.take();

        if a.double_tap || a.phase == PointerPhase::LongPress {
            return;
        }

        if !a.moved() {
            if held >= LONG_PRESS_SEC {
                // released before any frame saw the threshold
                self.fire_long_press(world, held, self.last_audio.low);
                return;
            }
            self.last_tap = anchor.map(|p| (now, p));
            match a.target {
                PressTarget::Agent => self.ball_splash(agent, rng),
                PressTarget::World => self.tap_wave(world, agent, now),
            }
            return;
        }

        self.last_tap = None;
        let exit_speed = a.last_delta.length();
        if exit_speed > FLING_MIN_SPEED_PX {
            let scale = (exit_speed / FLING_REF_SPEED_PX).clamp(FLING_SCALE_MIN, FLING_SCALE_MAX);
            let impulse = a.last_delta * FLING_GAIN * scale;
            log::debug!("[gesture] fling speed={:.1}px", exit_speed);
            self.actions.push(GestureAction::Impulse(impulse));
        }
    }

    fn ball_splash<R: Rng + ?Sized>(&mut self, agent: &Agent, rng: &mut R) {
        let count = rng.gen_range(6..=12);
        let ttl = 0.45 + rng.gen::<f32>() * 0.15;
        self.emit(ResonanceEvent::new(
            ResonanceKind::BallSplash {
                splashes: splash_burst(rng, count, BALL_SPLASH),
            },
            agent.pos,
            0.9,
            0.25,
            ttl,
        ));
    }

    fn tap_wave(&mut self, world: Vec2, agent: &Agent, now: f64) {
        let audio = self.last_audio;
        self.emit(
            ResonanceEvent::new(ResonanceKind::TapWave { phase: 0.0 }, world, 0.7, 0.35, 0.6)
                .with_target(agent.pos),
        );
        if audio.voice_active() {
            let intensity = (0.5 + audio.energy * self.boost(now)).clamp(0.5, 1.0);
            self.emit(
                ResonanceEvent::new(
                    ResonanceKind::TapWave { phase: 0.35 },
                    world,
                    intensity,
                    audio.centroid,
                    0.55,
                )
                .with_target(agent.pos),
            );
        }

        self.combo = match self.last_tap_impulse {
            Some(t) if now - t <= COMBO_WINDOW_SEC => self.combo + 1,
            _ => 1,
        };
        self.last_tap_impulse = Some(now);

        let away = agent.pos - world;
        let len = away.length();
        let dir = away / if len == 0.0 { 1.0 } else { len };
        let tone_gain = 0.7 + 0.8 * (audio.centroid + 0.1).clamp(0.0, 1.0);
        let magnitude = TAP_IMPULSE * (1.0 + self.combo as f32 * COMBO_STEP) * tone_gain;
        log::debug!("[gesture] tap combo={} impulse={:.0}", self.combo, magnitude);
        self.actions.push(GestureAction::Impulse(dir * magnitude));
    }

    fn fire_long_press(&mut self, world: Vec2, held: f64, tone: f32) {
        log::debug!("[gesture] long-press at ({:.0},{:.0})", world.x, world.y);
        self.actions.push(GestureAction::Wobble);
        self.actions.push(GestureAction::Droplet(world));
        self.emit_long_press_ink(world, held, tone);
    }

    fn emit_long_press_ink(&mut self, world: Vec2, held: f64, tone: f32) {
        let intensity = (0.6 + held as f32 * 0.15).clamp(0.6, 1.0);
        self.emit(ResonanceEvent::new(
            ResonanceKind::LongPressInk,
            world,
            intensity,
            tone,
            0.22,
        ));
    }

    /// Per-frame step: age events, crystallize vibrato strokes, emit the
    /// continuous voice events and drive the held-press state. A still press
    /// pulses every frame until it becomes a long press.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        now: f64,
        audio: &AudioFeatures,
        agent: &Agent,
        camera: &Camera,
        rng: &mut R,
    ) {
        self.bus.update(dt, &mut self.crystals);
        for c in self.crystals.drain(..) {
            log::debug!("[gesture] crystallize {} stamps", c.stamps);
            self.actions.push(GestureAction::Crystallize(c));
        }
        self.last_audio = *audio;

        let boost = self.boost(now);
        if audio.voice_active() {
            self.emit(ResonanceEvent::new(
                ResonanceKind::VoiceHalo,
                agent.pos,
                audio.energy * boost,
                audio.centroid,
                0.25,
            ));
            if audio.attack > ATTACK_BURST_MIN {
                let count = (6 + (audio.attack * 10.0).floor() as usize).min(16);
                self.emit(ResonanceEvent::new(
                    ResonanceKind::VoiceAttack {
                        splashes: splash_burst(rng, count, VOICE_BURST),
                    },
                    agent.pos,
                    (audio.attack * boost * 2.0).clamp(0.3, 1.0),
                    audio.centroid,
                    0.3,
                ));
            }
        }

        let Some(mut a) = self.active else {
            return;
        };
        let held = now - a.down_at;
        if a.double_tap || a.moved() {
            return;
        }
        let world = camera.screen_to_world(a.pos);
        if held < LONG_PRESS_SEC {
            self.emit(
                ResonanceEvent::new(ResonanceKind::PressPulse, world, 0.3, 0.4, 0.2)
                    .with_target(agent.pos),
            );
            return;
        }
        if a.phase == PointerPhase::Pressed {
            a.phase = PointerPhase::LongPress;
            self.active = Some(a);
            self.fire_long_press(world, held, audio.low);
        } else {
            self.emit_long_press_ink(world, held, audio.low);
        }
    }
}
