//! The owned simulation state and its per-frame tick.
//!
//! `Simulation` is the one place that sequences the components:
//! audio → gestures → physics → camera → ink. Front-ends feed pointer
//! samples between frames, call [`Simulation::frame`] once per refresh and
//! then [`Simulation::render`].

use crate::audio::{AudioFeatureExtractor, AudioFeatures};
use crate::constants::*;
use crate::error::CoreError;
use crate::gesture::{GestureAction, GestureRecognizer, PointerSample};
use crate::ink::{InkCompositor, Scene};
use crate::physics::{ForceContext, ForceIntegrator, RescueConfig, WanderConfig};
use crate::profile::{Profile, ProfileKind, ProfileTable};
use crate::resonance::ResonanceEvent;
use crate::state::{Agent, Camera, Expressivity, World};
use crate::surface::DrawSurface;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Clone, Copy, Debug)]
pub struct SimConfig {
    pub seed: u64,
    pub expressivity: Expressivity,
    /// World radius as a multiple of the shorter view side.
    pub world_scale: f32,
    pub buffer_margin: f32,
    pub max_dt: f32,
    pub initial_profile: ProfileKind,
    pub wander: WanderConfig,
    pub rescue: RescueConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            expressivity: Expressivity::default(),
            world_scale: WORLD_SCALE,
            buffer_margin: BUFFER_MARGIN,
            max_dt: MAX_FRAME_DT,
            initial_profile: ProfileKind::Sumi,
            wander: WanderConfig::default(),
            rescue: RescueConfig::default(),
        }
    }
}

pub struct Simulation<S: DrawSurface> {
    config: SimConfig,
    profiles: ProfileTable,
    profile: Profile,
    view: Vec2,
    world: World,
    agent: Agent,
    camera: Camera,
    audio: AudioFeatureExtractor,
    gestures: GestureRecognizer,
    physics: ForceIntegrator,
    ink: InkCompositor<S>,
    rng: StdRng,
    expressivity: Expressivity,
    now: f64,
}

impl<S: DrawSurface> Simulation<S> {
    /// Simulation over the built-in profile table.
    pub fn new(buffer: S, view: Vec2, config: SimConfig) -> Result<Self, CoreError> {
        Self::with_profiles(buffer, view, config, ProfileTable::builtin())
    }

    pub fn with_profiles(
        buffer: S,
        view: Vec2,
        config: SimConfig,
        profiles: ProfileTable,
    ) -> Result<Self, CoreError> {
        let profile = profiles
            .get(config.initial_profile)
            .cloned()
            .ok_or_else(|| CoreError::UnknownProfile(config.initial_profile.name().to_string()))?;
        let world = World::scaled(view, config.world_scale);
        let ink = InkCompositor::new(buffer, world, config.buffer_margin, profile.background);
        let mut sim = Self {
            config,
            profiles,
            profile,
            view,
            world,
            agent: Agent::at(world.center),
            camera: Camera::centered_on(world.center, view),
            audio: AudioFeatureExtractor::new(),
            gestures: GestureRecognizer::new(),
            physics: ForceIntegrator::with_config(config.wander, config.rescue),
            ink,
            rng: StdRng::seed_from_u64(config.seed),
            expressivity: config.expressivity,
            now: 0.0,
        };
        sim.reset_world();
        Ok(sim)
    }

    /// Reinitialize the world, agent, ink buffer, pointer and physics state.
    /// Audio smoothing carries over so features stay continuous.
    pub fn reset_world(&mut self) {
        self.world = World::scaled(self.view, self.config.world_scale);
        self.agent = Agent::at(self.world.center);
        self.camera = Camera::centered_on(self.agent.pos, self.view);
        self.ink
            .reset(self.world, self.profile.background, self.agent.pos);
        self.gestures.reset();
        self.physics.reset();
        log::info!(
            "[world] reset mode={} R={:.1} buffer={}px",
            self.profile.kind.name(),
            self.world.radius,
            self.ink.side()
        );
    }

    /// Swap the mode profile; always a full reset.
    pub fn set_profile(&mut self, kind: ProfileKind) -> Result<(), CoreError> {
        let profile = self
            .profiles
            .get(kind)
            .cloned()
            .ok_or_else(|| CoreError::UnknownProfile(kind.name().to_string()))?;
        log::info!("[world] mode {} -> {}", self.profile.kind.name(), kind.name());
        self.profile = profile;
        self.reset_world();
        Ok(())
    }

    /// Start a fresh drawing in the current mode.
    pub fn clear(&mut self) {
        self.reset_world();
    }

    pub fn resize(&mut self, view: Vec2) {
        if view == self.view {
            return;
        }
        self.view = view.max(Vec2::ONE);
        self.reset_world();
    }

    pub fn set_expressivity(&mut self, level: Expressivity) {
        self.expressivity = level;
    }

    pub fn pointer_down(&mut self, sample: PointerSample) -> bool {
        self.gestures
            .pointer_down(sample, &self.agent, &self.camera)
    }

    pub fn pointer_move(&mut self, sample: PointerSample) {
        self.gestures.pointer_move(sample, &self.camera);
    }

    pub fn pointer_up(&mut self, sample: PointerSample) {
        self.gestures
            .pointer_up(sample, &self.agent, &self.camera, &mut self.rng);
    }

    /// Advance one tick. `spectrum` is `None` when the microphone is off,
    /// `tilt` is `None` when the orientation sensor is off.
    pub fn frame(
        &mut self,
        dt: f32,
        now: f64,
        spectrum: Option<&[u8]>,
        tilt: Option<Vec2>,
    ) -> AudioFeatures {
        let dt = dt.clamp(0.0, self.config.max_dt);
        self.now = now;

        let features = self.audio.update(spectrum);
        self.gestures.update(
            dt,
            now,
            &features,
            &self.agent,
            &self.camera,
            &mut self.rng,
        );
        self.apply_gesture_actions();

        let ctx = ForceContext {
            now,
            audio: features,
            expressivity: self.expressivity.gain(),
            tilt,
            grab: self.gestures.grab_point(&self.camera),
            free_roam: !self.gestures.engaging_agent(),
        };
        self.physics.step(
            dt,
            &mut self.agent,
            &self.world,
            &self.profile,
            &ctx,
            &mut self.rng,
        );
        self.camera = Camera::centered_on(self.agent.pos, self.view);
        self.ink
            .stamp(self.agent.pos, &self.agent, &self.profile, &features, now);
        features
    }

    fn apply_gesture_actions(&mut self) {
        let now = self.now;
        for action in self.gestures.drain_actions() {
            match action {
                GestureAction::Impulse(v) => self.physics.queue_impulse(v),
                GestureAction::Wobble => self.physics.kick_wobble(),
                GestureAction::Droplet(at) => {
                    let stops = self.profile.droplet_at(at, now);
                    self.ink.stamp_watercolor(
                        at,
                        stops,
                        self.profile.droplet_base_radius,
                        &self.profile.watercolor,
                        &mut self.rng,
                    );
                }
                GestureAction::Burst(at) => {
                    let stops = self.profile.watercolor_at(at, now);
                    self.ink.stamp_watercolor(
                        at,
                        stops,
                        self.profile.watercolor.base_radius,
                        &self.profile.watercolor,
                        &mut self.rng,
                    );
                }
                GestureAction::Crystallize(c) => {
                    self.ink.stamp_watercolor_line(
                        c.from,
                        c.to,
                        c.stamps,
                        &self.profile,
                        now,
                        &mut self.rng,
                    );
                }
            }
        }
    }

    /// Draw the visible window; read-only on the ink buffer.
    pub fn render(&self, screen: &mut S) {
        let scene = Scene {
            view: self.view,
            camera: self.camera,
            world: &self.world,
            agent: &self.agent,
            events: self.gestures.events(),
            profile: &self.profile,
        };
        self.ink.render(screen, &scene);
    }

    pub fn export_png(&self) -> Result<Vec<u8>, CoreError> {
        self.ink.export_png()
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Mutable agent access for scripted setups.
    pub fn agent_mut(&mut self) -> &mut Agent {
        &mut self.agent
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn view(&self) -> Vec2 {
        self.view
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn features(&self) -> AudioFeatures {
        self.audio.features()
    }

    pub fn events(&self) -> &[ResonanceEvent] {
        self.gestures.events()
    }

    pub fn gestures(&self) -> &GestureRecognizer {
        &self.gestures
    }

    pub fn physics(&self) -> &ForceIntegrator {
        &self.physics
    }

    pub fn ink(&self) -> &InkCompositor<S> {
        &self.ink
    }

    pub fn expressivity(&self) -> Expressivity {
        self.expressivity
    }

    pub fn now(&self) -> f64 {
        self.now
    }
}
