// Host-side tests for the pointer gesture state machine and resonance events.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sgraffito_core::{
    Agent, AudioFeatures, Camera, GestureAction, GestureRecognizer, PointerPhase, PointerSample,
    ResonanceKind,
};

const VIEW: Vec2 = Vec2::new(800.0, 600.0);
const FRAME: f32 = 1.0 / 60.0;

struct Rig {
    rec: GestureRecognizer,
    agent: Agent,
    camera: Camera,
    rng: StdRng,
    actions: Vec<GestureAction>,
}

impl Rig {
    fn new() -> Self {
        let agent = Agent::at(Vec2::ZERO);
        Self {
            rec: GestureRecognizer::new(),
            camera: Camera::centered_on(agent.pos, VIEW),
            agent,
            rng: StdRng::seed_from_u64(11),
            actions: Vec::new(),
        }
    }

    fn screen(&self, world: Vec2) -> Vec2 {
        self.camera.world_to_screen(world)
    }

    fn down(&mut self, world: Vec2, t: f64) -> bool {
        let s = PointerSample::new(1, self.screen(world), t);
        let accepted = self.rec.pointer_down(s, &self.agent, &self.camera);
        self.collect();
        accepted
    }

    fn move_to(&mut self, world: Vec2, t: f64) {
        let s = PointerSample::new(1, self.screen(world), t);
        self.rec.pointer_move(s, &self.camera);
        self.collect();
    }

    fn up(&mut self, world: Vec2, t: f64) {
        let s = PointerSample::new(1, self.screen(world), t);
        self.rec
            .pointer_up(s, &self.agent, &self.camera, &mut self.rng);
        self.collect();
    }

    fn tick(&mut self, dt: f32, now: f64, audio: &AudioFeatures) {
        self.rec
            .update(dt, now, audio, &self.agent, &self.camera, &mut self.rng);
        self.collect();
    }

    fn collect(&mut self) {
        let drained: Vec<_> = self.rec.drain_actions().collect();
        self.actions.extend(drained);
    }

    fn count(&self, name: &str) -> usize {
        self.rec
            .events()
            .iter()
            .filter(|e| e.kind.name() == name)
            .count()
    }

    fn impulses(&self) -> Vec<Vec2> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                GestureAction::Impulse(v) => Some(*v),
                _ => None,
            })
            .collect()
    }
}

fn voice(energy: f32, centroid: f32) -> AudioFeatures {
    AudioFeatures {
        on: true,
        energy,
        low: energy,
        mid: energy,
        high: energy,
        centroid,
        attack: 0.0,
    }
}

fn expected_tap_impulse(combo: u32, centroid: f32) -> f32 {
    220.0 * (1.0 + combo as f32 * 0.22) * (0.7 + 0.8 * (centroid + 0.1).clamp(0.0, 1.0))
}

#[test]
fn double_tap_emits_one_pulse_without_duplicates() {
    let mut rig = Rig::new();
    let p = Vec2::new(100.0, 0.0);
    rig.down(p, 0.0);
    rig.up(p, 0.08);
    rig.down(p + Vec2::new(5.0, 0.0), 0.2);
    rig.up(p + Vec2::new(5.0, 0.0), 0.26);

    assert_eq!(rig.count("doubleTapPulse"), 1);
    assert_eq!(rig.count("pressPulse"), 1);
    assert_eq!(rig.count("tapWave"), 1);
    assert_eq!(rig.count("ballSplash"), 0);
    assert_eq!(rig.impulses().len(), 1);
    let bursts = rig
        .actions
        .iter()
        .filter(|a| matches!(a, GestureAction::Burst(_)))
        .count();
    assert_eq!(bursts, 1);
    assert!(rig.rec.echo_boost_active(1.2));
    assert!(!rig.rec.echo_boost_active(1.4));
}

#[test]
fn slow_second_tap_is_not_a_double_tap() {
    let mut rig = Rig::new();
    let p = Vec2::new(100.0, 0.0);
    rig.down(p, 0.0);
    rig.up(p, 0.05);
    rig.down(p, 0.5);
    rig.up(p, 0.55);
    assert_eq!(rig.count("doubleTapPulse"), 0);
    assert_eq!(rig.count("tapWave"), 2);
}

#[test]
fn double_tap_during_boost_extends_window() {
    let mut rig = Rig::new();
    let p = Vec2::new(100.0, 0.0);
    for (i, t0) in [0.0, 1.0].into_iter().enumerate() {
        rig.down(p, t0);
        rig.up(p, t0 + 0.05);
        rig.down(p, t0 + 0.15);
        rig.up(p, t0 + 0.2);
        assert_eq!(rig.count("doubleTapPulse"), i + 1);
    }
    assert!(rig.rec.echo_boost_active(2.2));
    assert!(!rig.rec.echo_boost_active(2.3));
}

#[test]
fn quick_tap_off_agent_emits_single_wave() {
    let mut rig = Rig::new();
    let p = Vec2::new(100.0, 0.0);
    rig.down(p, 0.0);
    rig.up(p, 0.1);
    assert_eq!(rig.count("tapWave"), 1);
    assert_eq!(rig.rec.phase(), PointerPhase::Idle);
}

#[test]
fn quick_tap_with_voice_adds_tinted_wave() {
    let mut rig = Rig::new();
    let audio = voice(0.3, 0.62);
    rig.tick(FRAME, 0.0, &audio);
    let p = Vec2::new(100.0, 0.0);
    rig.down(p, 0.01);
    rig.up(p, 0.1);
    assert_eq!(rig.count("tapWave"), 2);
    let tinted = rig
        .rec
        .events()
        .iter()
        .find(|e| matches!(e.kind, ResonanceKind::TapWave { phase } if phase > 0.0))
        .expect("tinted wave");
    assert!((tinted.tone - 0.62).abs() < 1e-6);
    assert!((tinted.intensity - 0.8).abs() < 1e-6);
}

#[test]
fn tap_impulse_points_from_tap_to_agent() {
    let mut rig = Rig::new();
    let p = Vec2::new(100.0, 0.0);
    rig.down(p, 0.0);
    rig.up(p, 0.05);
    assert_eq!(rig.rec.combo(), 1);
    let imp = rig.impulses();
    assert_eq!(imp.len(), 1);
    let expected = expected_tap_impulse(1, 0.5);
    assert!((imp[0].x + expected).abs() < 1e-3, "{:?}", imp[0]);
    assert!(imp[0].y.abs() < 1e-4);
}

#[test]
fn combo_builds_then_resets_after_window() {
    let mut rig = Rig::new();
    let a = Vec2::new(100.0, 0.0);
    let b = Vec2::new(0.0, 100.0);
    rig.down(a, 0.0);
    rig.up(a, 0.05);
    rig.down(b, 0.3);
    rig.up(b, 0.45);
    assert_eq!(rig.rec.combo(), 2);
    rig.down(a, 1.1);
    rig.up(a, 1.15);
    assert_eq!(rig.rec.combo(), 1);

    let imp = rig.impulses();
    assert_eq!(imp.len(), 3);
    assert!((imp[1].length() - expected_tap_impulse(2, 0.5)).abs() < 1e-3);
    assert!((imp[2].length() - expected_tap_impulse(1, 0.5)).abs() < 1e-3);
}

#[test]
fn tap_on_agent_splashes_without_impulse() {
    let mut rig = Rig::new();
    rig.down(Vec2::new(3.0, 2.0), 0.0);
    rig.up(Vec2::new(3.0, 2.0), 0.1);
    assert_eq!(rig.count("ballSplash"), 1);
    assert!(rig.impulses().is_empty());
    let splash = &rig.rec.events().last().expect("splash").kind;
    match splash {
        ResonanceKind::BallSplash { splashes } => {
            assert!((6..=12).contains(&splashes.len()));
            for s in splashes {
                assert!((22.0..48.0).contains(&s.distance));
            }
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn long_press_kicks_once_and_inks_every_frame() {
    let mut rig = Rig::new();
    let p = Vec2::new(100.0, 0.0);
    let silent = AudioFeatures::default();
    rig.down(p, 0.0);
    let mut ink_frames = 0;
    for k in 1..=36 {
        let now = k as f64 / 60.0;
        let before = rig.count("longPressInk");
        rig.tick(FRAME, now, &silent);
        if rig.count("longPressInk") > before {
            ink_frames += 1;
            assert!(now >= 0.5, "inked at {now}");
        }
    }
    rig.up(p, 0.6);

    assert_eq!(ink_frames, 7);
    let wobbles = rig
        .actions
        .iter()
        .filter(|a| matches!(a, GestureAction::Wobble))
        .count();
    let droplets: Vec<_> = rig
        .actions
        .iter()
        .filter_map(|a| match a {
            GestureAction::Droplet(at) => Some(*at),
            _ => None,
        })
        .collect();
    assert_eq!(wobbles, 1);
    assert_eq!(droplets.len(), 1);
    assert!((droplets[0] - p).length() < 1e-3);
    assert!(rig.impulses().is_empty());
    assert_eq!(rig.count("tapWave"), 0);
}

#[test]
fn double_tap_hold_does_not_long_press() {
    let mut rig = Rig::new();
    let p = Vec2::new(100.0, 0.0);
    let silent = AudioFeatures::default();
    rig.down(p, 0.0);
    rig.up(p, 0.08);
    rig.down(p, 0.2);
    for k in 13..=51 {
        rig.tick(FRAME, k as f64 / 60.0, &silent);
    }
    rig.up(p, 0.86);

    assert_eq!(rig.count("longPressInk"), 0);
    // the first tap's pulse has expired and the held double-tap adds none
    assert_eq!(rig.count("pressPulse"), 0);
    let kicks = rig
        .actions
        .iter()
        .filter(|a| matches!(a, GestureAction::Wobble | GestureAction::Droplet(_)))
        .count();
    assert_eq!(kicks, 0);
    let bursts = rig
        .actions
        .iter()
        .filter(|a| matches!(a, GestureAction::Burst(_)))
        .count();
    assert_eq!(bursts, 1);
}

#[test]
fn press_pulse_ignores_pen_pressure() {
    let mut rig = Rig::new();
    let p = Vec2::new(100.0, 0.0);
    let mut s = PointerSample::new(1, rig.screen(p), 0.0);
    s.pressure = Some(1.0);
    assert!(rig.rec.pointer_down(s, &rig.agent, &rig.camera));
    let pulse = rig
        .rec
        .events()
        .iter()
        .find(|e| e.kind == ResonanceKind::PressPulse)
        .expect("press pulse");
    assert!((pulse.intensity - 0.4).abs() < 1e-6);
    assert!((pulse.tone - 0.4).abs() < 1e-6);
    assert!((pulse.ttl - 0.35).abs() < 1e-6);
}

#[test]
fn held_press_pulses_each_frame_until_long_press() {
    let mut rig = Rig::new();
    let p = Vec2::new(100.0, 0.0);
    let silent = AudioFeatures::default();
    rig.down(p, 0.0);
    for k in 1..=10 {
        rig.tick(FRAME, k as f64 / 60.0, &silent);
    }
    // 10 held frames plus the press itself
    assert_eq!(rig.count("pressPulse"), 11);
    let held: Vec<_> = rig
        .rec
        .events()
        .iter()
        .filter(|e| e.kind == ResonanceKind::PressPulse && e.ttl <= 0.2 + 1e-6)
        .collect();
    assert_eq!(held.len(), 10);
    for e in &held {
        assert!((e.intensity - 0.3).abs() < 1e-6);
        assert!((e.origin - p).length() < 1e-3);
        assert_eq!(e.target, Some(rig.agent.pos));
    }

    let before = rig.count("pressPulse");
    for k in 30..=33 {
        rig.tick(FRAME, k as f64 / 60.0, &silent);
    }
    assert!(rig.count("longPressInk") > 0);
    assert!(rig.count("pressPulse") <= before);
}

#[test]
fn dragging_press_does_not_pulse() {
    let mut rig = Rig::new();
    let silent = AudioFeatures::default();
    rig.down(Vec2::new(100.0, 0.0), 0.0);
    rig.move_to(Vec2::new(140.0, 0.0), 0.02);
    for k in 2..=6 {
        rig.tick(FRAME, k as f64 / 60.0, &silent);
    }
    assert_eq!(rig.count("pressPulse"), 1);
}

#[test]
fn second_pointer_is_ignored() {
    let mut rig = Rig::new();
    let p = Vec2::new(100.0, 0.0);
    assert!(rig.down(p, 0.0));
    let other = PointerSample::new(2, rig.screen(Vec2::new(-100.0, 0.0)), 0.01);
    assert!(!rig.rec.pointer_down(other, &rig.agent, &rig.camera));
    let drag = PointerSample::new(2, rig.screen(Vec2::new(-50.0, 0.0)), 0.02);
    rig.rec.pointer_move(drag, &rig.camera);
    rig.rec
        .pointer_up(other, &rig.agent, &rig.camera, &mut rig.rng);
    assert_eq!(rig.count("dragTrace"), 0);
    assert_eq!(rig.rec.phase(), PointerPhase::Pressed);
    rig.up(p, 0.05);
    assert_eq!(rig.rec.phase(), PointerPhase::Idle);
}

#[test]
fn drag_without_voice_leaves_traces() {
    let mut rig = Rig::new();
    let p = Vec2::new(100.0, 0.0);
    rig.down(p, 0.0);
    rig.move_to(p + Vec2::new(0.3, 0.0), 0.01);
    assert_eq!(rig.count("dragTrace"), 0);
    rig.move_to(p + Vec2::new(10.0, 0.0), 0.02);
    assert_eq!(rig.rec.phase(), PointerPhase::Dragging);
    assert_eq!(rig.count("dragTrace"), 1);
    let trace = rig.rec.events().last().expect("trace");
    assert_eq!(trace.tone, 0.5);
    assert!(trace.target.is_some());
}

#[test]
fn vibrato_crystallizes_exactly_once() {
    let mut rig = Rig::new();
    let audio = voice(0.3, 0.7);
    rig.tick(FRAME, 0.0, &audio);
    let p = Vec2::new(100.0, 0.0);
    rig.down(p, 0.01);
    rig.move_to(p + Vec2::new(10.0, 0.0), 0.02);
    assert_eq!(rig.count("dragVibrato"), 1);

    for k in 0..10 {
        rig.tick(0.05, 0.05 + k as f64 * 0.05, &audio);
    }
    let crystals: Vec<_> = rig
        .actions
        .iter()
        .filter_map(|a| match a {
            GestureAction::Crystallize(c) => Some(*c),
            _ => None,
        })
        .collect();
    assert_eq!(crystals.len(), 1);
    assert_eq!(crystals[0].stamps, 3);
    assert!((crystals[0].from - p).length() < 1e-3);
    assert_eq!(rig.count("dragVibrato"), 0);
}

#[test]
fn fling_scales_exit_velocity() {
    let mut rig = Rig::new();
    let mut p = Vec2::new(100.0, 0.0);
    rig.down(p, 0.0);
    for i in 1..=5 {
        p += Vec2::new(10.0, 0.0);
        rig.move_to(p, i as f64 * 0.016);
    }
    rig.up(p, 0.1);
    let imp = rig.impulses();
    assert_eq!(imp.len(), 1);
    assert!((imp[0] - Vec2::new(90.0, 0.0)).length() < 1e-3, "{:?}", imp[0]);
}

#[test]
fn dragging_agent_exposes_grab_point() {
    let mut rig = Rig::new();
    rig.down(Vec2::ZERO, 0.0);
    assert!(rig.rec.engaging_agent());
    assert!(rig.rec.grab_point(&rig.camera).is_none());
    rig.move_to(Vec2::new(30.0, 0.0), 0.02);
    let grab = rig.rec.grab_point(&rig.camera).expect("grab");
    assert!((grab - Vec2::new(30.0, 0.0)).length() < 1e-3);
    rig.up(Vec2::new(30.0, 0.0), 0.05);
    assert!(!rig.rec.engaging_agent());
}

#[test]
fn voice_emits_halo_and_attack_bursts() {
    let mut rig = Rig::new();
    let mut audio = voice(0.4, 0.5);
    rig.tick(FRAME, 0.0, &audio);
    assert_eq!(rig.count("voiceHalo"), 1);
    assert_eq!(rig.count("voiceAttack"), 0);

    audio.attack = 0.5;
    rig.tick(FRAME, FRAME as f64, &audio);
    assert_eq!(rig.count("voiceAttack"), 1);
    let burst = rig
        .rec
        .events()
        .iter()
        .find_map(|e| match &e.kind {
            ResonanceKind::VoiceAttack { splashes } => Some(splashes.len()),
            _ => None,
        })
        .expect("burst");
    assert_eq!(burst, 11);

    let quiet = voice(0.01, 0.5);
    let before = rig.count("voiceHalo");
    rig.tick(FRAME, 2.0 * FRAME as f64, &quiet);
    assert!(rig.count("voiceHalo") <= before);
}

#[test]
fn events_expire_after_ttl() {
    let mut rig = Rig::new();
    let p = Vec2::new(100.0, 0.0);
    rig.down(p, 0.0);
    rig.up(p, 0.05);
    assert!(!rig.rec.events().is_empty());
    let silent = AudioFeatures::default();
    for k in 0..60 {
        rig.tick(FRAME, 0.1 + k as f64 * FRAME as f64, &silent);
    }
    assert!(rig.rec.events().is_empty());
}

#[test]
fn reset_forgets_pointer_and_events() {
    let mut rig = Rig::new();
    rig.down(Vec2::new(100.0, 0.0), 0.0);
    rig.rec.reset();
    assert_eq!(rig.rec.phase(), PointerPhase::Idle);
    assert!(rig.rec.events().is_empty());
    assert!(rig.down(Vec2::new(100.0, 0.0), 0.1));
    // the pre-reset press is no tap anchor
    assert_eq!(rig.count("doubleTapPulse"), 0);
}
