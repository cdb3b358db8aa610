// Host-side tests for the full frame pipeline on a software surface.

use glam::Vec2;
use sgraffito_core::profile::sumi;
use sgraffito_core::{
    vmax, CoreError, DrawSurface, PixelCanvas, PointerSample, ProfileKind, ProfileTable,
    SimConfig, Simulation, SoftwareSimulation,
};

const VIEW: Vec2 = Vec2::new(400.0, 300.0);
const DT: f32 = 1.0 / 60.0;

fn sim_with(config: SimConfig) -> SoftwareSimulation {
    Simulation::new(PixelCanvas::new(1, 1), VIEW, config).expect("simulation")
}

fn sim() -> SoftwareSimulation {
    sim_with(SimConfig::default())
}

fn voice_spectrum(t: f64) -> Vec<u8> {
    let level = (128.0 + 100.0 * (t * 3.0).sin()) as u8;
    let mut s = vec![0u8; 512];
    for m in &mut s[2..40] {
        *m = level;
    }
    for m in &mut s[150..260] {
        *m = level / 2;
    }
    s
}

/// Screen position of a world point under the current camera.
fn screen_of(sim: &SoftwareSimulation, world: Vec2) -> Vec2 {
    sim.camera().world_to_screen(world)
}

fn tap(sim: &mut SoftwareSimulation, world: Vec2, t: f64) {
    let at = screen_of(sim, world);
    sim.pointer_down(PointerSample::new(1, at, t));
    sim.pointer_up(PointerSample::new(1, at, t + 0.05));
}

#[test]
fn new_simulation_starts_centered_and_blank() {
    let sim = sim();
    assert_eq!(sim.profile().kind, ProfileKind::Sumi);
    assert_eq!(sim.agent().pos, sim.world().center);
    assert!((sim.world().radius - 300.0 * 1.35).abs() < 1e-3);
    assert!(sim.events().is_empty());
    let bg = sim.profile().background;
    let mid = sim.ink().side() / 2;
    assert_eq!(
        sim.ink().buffer().pixel(mid, mid),
        Some([bg.r, bg.g, bg.b, 255])
    );
}

#[test]
fn reset_is_idempotent() {
    let mut sim = sim();
    for k in 0..90 {
        let t = k as f64 * DT as f64;
        sim.frame(DT, t, Some(&voice_spectrum(t)), None);
    }
    tap(&mut sim, Vec2::new(60.0, 0.0), 1.6);

    sim.reset_world();
    let once = (*sim.agent(), *sim.world(), sim.ink().buffer().as_rgba().to_vec());
    sim.reset_world();
    let twice = (*sim.agent(), *sim.world(), sim.ink().buffer().as_rgba().to_vec());
    assert_eq!(once, twice);
    assert!(sim.events().is_empty());
    assert!(sim.physics().pending_impulses().is_empty());
    assert_eq!(sim.agent().vel, Vec2::ZERO);
}

#[test]
fn clear_keeps_audio_smoothing() {
    let mut sim = sim();
    for k in 0..30 {
        let t = k as f64 * DT as f64;
        sim.frame(DT, t, Some(&voice_spectrum(t)), None);
    }
    let before = sim.features();
    assert!(before.energy > 0.0);
    sim.clear();
    assert_eq!(sim.features(), before);
}

#[test]
fn switching_profile_resets_the_world() {
    let mut sim = sim();
    for k in 0..20 {
        sim.frame(DT, k as f64 * DT as f64, None, None);
    }
    sim.set_profile(ProfileKind::Firework).expect("firework");
    assert_eq!(sim.profile().kind, ProfileKind::Firework);
    assert_eq!(sim.agent().pos, sim.world().center);
    let bg = sim.profile().background;
    let mid = sim.ink().side() / 2;
    assert_eq!(
        sim.ink().buffer().pixel(mid, mid),
        Some([bg.r, bg.g, bg.b, 255])
    );
}

#[test]
fn missing_profiles_are_errors() {
    let empty = Simulation::with_profiles(
        PixelCanvas::new(1, 1),
        VIEW,
        SimConfig::default(),
        ProfileTable::empty(),
    );
    assert!(matches!(empty, Err(CoreError::UnknownProfile(_))));

    let mut only_sumi = ProfileTable::empty();
    only_sumi.insert(sumi());
    let mut sim =
        Simulation::with_profiles(PixelCanvas::new(1, 1), VIEW, SimConfig::default(), only_sumi)
            .expect("sumi only");
    assert!(matches!(
        sim.set_profile(ProfileKind::Generatif),
        Err(CoreError::UnknownProfile(_))
    ));
    assert_eq!(sim.profile().kind, ProfileKind::Sumi);
}

#[test]
fn profile_kind_parses_case_insensitively() {
    assert_eq!("FIREWORK".parse::<ProfileKind>().ok(), Some(ProfileKind::Firework));
    assert_eq!("generatif".parse::<ProfileKind>().ok(), Some(ProfileKind::Generatif));
    assert!("watercolour".parse::<ProfileKind>().is_err());
}

#[test]
fn same_seed_same_drawing() {
    let run = || {
        let mut sim = sim_with(SimConfig {
            seed: 42,
            ..SimConfig::default()
        });
        for k in 0..240 {
            let t = k as f64 * DT as f64;
            if k % 60 == 10 {
                tap(&mut sim, Vec2::new(40.0, -30.0), t);
            }
            sim.frame(DT, t, Some(&voice_spectrum(t)), None);
        }
        (*sim.agent(), sim.export_png().expect("png"))
    };
    let (agent_a, png_a) = run();
    let (agent_b, png_b) = run();
    assert_eq!(agent_a, agent_b);
    assert_eq!(png_a, png_b);
}

#[test]
fn resize_rebuilds_world_and_buffer() {
    let mut sim = sim();
    sim.resize(Vec2::new(1000.0, 500.0));
    assert!((sim.world().radius - 675.0).abs() < 1e-3);
    assert_eq!(sim.ink().side(), 1550);
    assert_eq!(sim.ink().buffer().width(), 1550);
    assert_eq!(sim.view(), Vec2::new(1000.0, 500.0));
}

#[test]
fn tap_pushes_agent_away_on_next_frame() {
    let mut sim = sim();
    tap(&mut sim, Vec2::new(100.0, 0.0), 0.0);
    sim.frame(DT, 0.06, None, None);
    assert!(sim.agent().vel.x < -250.0, "{:?}", sim.agent().vel);
    assert!(sim.physics().pending_impulses().is_empty());
}

#[test]
fn oversized_dt_is_clamped() {
    let mut sim = sim();
    tap(&mut sim, Vec2::new(100.0, 0.0), 0.0);
    sim.frame(5.0, 0.06, None, None);
    let agent = sim.agent();
    assert!((agent.trace_offset - agent.speed() * 0.033).abs() < 1e-3);
}

#[test]
fn tilt_accelerates_agent() {
    let config = SimConfig {
        seed: 8,
        ..SimConfig::default()
    };
    let mut flat = sim_with(config);
    let mut tilted = sim_with(config);
    flat.frame(DT, 0.0, None, None);
    tilted.frame(DT, 0.0, None, Some(Vec2::new(1.0, 0.0)));
    assert!(tilted.agent().vel.x - flat.agent().vel.x > 2.0);
}

#[test]
fn long_press_through_simulation_kicks_wobble() {
    let mut sim = sim();
    let at = screen_of(&sim, Vec2::new(100.0, 0.0));
    sim.pointer_down(PointerSample::new(1, at, 0.0));
    for k in 1..=36 {
        sim.frame(DT, k as f64 / 60.0, None, None);
    }
    let wobble = sim.physics().wobble();
    assert!(wobble.strength > 0.0 && wobble.strength < 1.0, "{wobble:?}");
    sim.pointer_up(PointerSample::new(1, at, 0.6));
    assert!(sim.physics().pending_impulses().is_empty());
}

#[test]
fn loud_session_respects_bounds() {
    for kind in ProfileKind::ALL {
        let mut sim = sim_with(SimConfig {
            initial_profile: kind,
            ..SimConfig::default()
        });
        for k in 0..600 {
            let t = k as f64 * DT as f64;
            if k % 45 == 0 {
                let near = sim.agent().pos + Vec2::new(20.0, 30.0);
                tap(&mut sim, near, t);
            }
            let features = sim.frame(DT, t, Some(&voice_spectrum(t)), None);
            let agent = sim.agent();
            let world = sim.world();
            assert!(agent.pos.distance(world.center) <= world.limit_for(agent.radius) + 1e-2);
            let free_roam = !sim.gestures().engaging_agent();
            let limit = vmax(&sim.profile().physics, features.energy, free_roam);
            assert!(agent.speed() <= limit * (1.0 + 1e-5));
        }
    }
}

#[test]
fn render_does_not_touch_the_ink_buffer() {
    let mut sim = sim();
    for k in 0..30 {
        sim.frame(DT, k as f64 * DT as f64, None, None);
    }
    let before = sim.ink().buffer().as_rgba().to_vec();
    let mut screen = PixelCanvas::new(VIEW.x as u32, VIEW.y as u32);
    sim.render(&mut screen);
    assert_eq!(sim.ink().buffer().as_rgba(), before.as_slice());
}
