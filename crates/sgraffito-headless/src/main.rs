use anyhow::Context;
use clap::Parser;
use glam::Vec2;
use sgraffito_core::{
    Expressivity, PixelCanvas, PointerSample, ProfileKind, SimConfig, Simulation, SpectrumSource,
};
use std::path::PathBuf;

const SPECTRUM_BINS: usize = 512;
const FRAME_DT: f32 = 1.0 / 60.0;

#[derive(Parser, Debug)]
#[command(about = "Run the ink simulation off-screen and write the drawing as PNG")]
struct Args {
    /// Mode profile: sumi, firework or generatif
    #[arg(long, default_value = "sumi")]
    profile: String,
    /// Number of 60 Hz frames to simulate
    #[arg(long, default_value_t = 1200)]
    frames: u32,
    #[arg(long, default_value_t = 7)]
    seed: u64,
    #[arg(long, default_value = "sgraffito.png")]
    out: PathBuf,
    #[arg(long, default_value_t = 960)]
    width: u32,
    #[arg(long, default_value_t = 640)]
    height: u32,
    /// Disable the synthetic voice
    #[arg(long)]
    silent: bool,
    /// Expressivity level 0-3
    #[arg(long, default_value_t = 1)]
    expressivity: usize,
}

/// Phrase-shaped synthetic voice: a low formant and a sweeping upper partial.
struct SyntheticVoice {
    bins: Vec<u8>,
    time: f32,
    active: bool,
}

impl SyntheticVoice {
    fn new(active: bool) -> Self {
        Self {
            bins: vec![0; SPECTRUM_BINS],
            time: 0.0,
            active,
        }
    }

    fn advance(&mut self, dt: f32) {
        self.time += dt;
        let t = self.time;
        // four seconds of phrase, one of rest
        let phrase = (t % 5.0) / 4.0;
        let envelope = if phrase < 1.0 {
            (phrase * std::f32::consts::PI).sin().powf(0.6)
        } else {
            0.0
        };
        let sweep = 160.0 + 60.0 * (t * 0.7).sin();
        for (i, bin) in self.bins.iter_mut().enumerate() {
            let x = i as f32;
            let formant = (-((x - 18.0) / 10.0).powi(2)).exp();
            let partial = (-((x - sweep) / 24.0).powi(2)).exp() * 0.6;
            let level = (formant + partial) * envelope * 230.0;
            *bin = level.clamp(0.0, 255.0) as u8;
        }
    }
}

impl SpectrumSource for SyntheticVoice {
    fn is_active(&self) -> bool {
        self.active
    }

    fn latest_spectrum(&mut self) -> Option<&[u8]> {
        if self.active {
            Some(&self.bins)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Cue {
    Down(Vec2),
    Move(Vec2),
    Up(Vec2),
}

/// Scripted pointer track relative to the view center: a tap, a double-tap,
/// a long press, and a sweeping drag.
fn gesture_script(view: Vec2) -> Vec<(f64, Cue)> {
    let c = view * 0.5;
    let mut cues = vec![
        (1.0, Cue::Down(c + Vec2::new(120.0, 40.0))),
        (1.08, Cue::Up(c + Vec2::new(120.0, 40.0))),
        (3.0, Cue::Down(c)),
        (3.06, Cue::Up(c)),
        (3.18, Cue::Down(c)),
        (3.24, Cue::Up(c)),
        (6.0, Cue::Down(c + Vec2::new(-80.0, 60.0))),
        (6.9, Cue::Up(c + Vec2::new(-80.0, 60.0))),
        (9.0, Cue::Down(c + Vec2::new(-200.0, -100.0))),
    ];
    for i in 1..=30 {
        let t = i as f32 / 30.0;
        let p = c + Vec2::new(-200.0 + 400.0 * t, -100.0 + 80.0 * (t * 6.0).sin());
        cues.push((9.0 + i as f64 * 0.03, Cue::Move(p)));
    }
    cues.push((10.0, Cue::Up(c + Vec2::new(200.0, -100.0))));
    cues
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let profile: ProfileKind = args.profile.parse()?;
    let expressivity = Expressivity::ALL
        .get(args.expressivity)
        .copied()
        .unwrap_or_default();
    let view = Vec2::new(args.width.max(1) as f32, args.height.max(1) as f32);
    let config = SimConfig {
        seed: args.seed,
        expressivity,
        initial_profile: profile,
        ..SimConfig::default()
    };

    let mut sim = Simulation::new(PixelCanvas::new(1, 1), view, config)?;
    let mut voice = SyntheticVoice::new(!args.silent);
    let script = gesture_script(view);
    let mut next_cue = 0;

    log::info!(
        "[headless] {} frames, mode={}, expressivity={}",
        args.frames,
        profile.name(),
        expressivity.label()
    );

    for frame in 0..args.frames {
        let now = frame as f64 * FRAME_DT as f64;
        while let Some(&(at, cue)) = script.get(next_cue) {
            if at > now {
                break;
            }
            match cue {
                Cue::Down(p) => {
                    sim.pointer_down(PointerSample::new(1, p, at));
                }
                Cue::Move(p) => sim.pointer_move(PointerSample::new(1, p, at)),
                Cue::Up(p) => sim.pointer_up(PointerSample::new(1, p, at)),
            }
            next_cue += 1;
        }

        voice.advance(FRAME_DT);
        let spectrum = voice.latest_spectrum();
        sim.frame(FRAME_DT, now, spectrum, None);
    }

    let png = sim.export_png().context("encoding ink buffer")?;
    std::fs::write(&args.out, &png)
        .with_context(|| format!("writing {}", args.out.display()))?;
    let agent = sim.agent();
    log::info!(
        "[headless] wrote {} ({} bytes), agent at ({:.1},{:.1}) R={:.1}",
        args.out.display(),
        png.len(),
        agent.pos.x,
        agent.pos.y,
        sim.world().radius
    );
    Ok(())
}
