//! Force composition and bounded integration of the agent.
//!
//! One [`ForceIntegrator::step`] per frame: compose forces into the agent
//! velocity, integrate, resolve the circular boundary, then run the
//! anti-stall rescue. After every step the agent lies inside the world and
//! its speed is at most [`vmax`].

use crate::audio::AudioFeatures;
use crate::constants::*;
use crate::profile::{PhysicsProfile, Profile};
use crate::state::{Agent, World};
use glam::Vec2;
use rand::Rng;
use smallvec::SmallVec;
use std::f32::consts::{PI, TAU};

/// Smoothed random walk applied while the agent roams freely.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WanderConfig {
    /// Seconds between retargets, drawn uniformly.
    pub retarget_min: f32,
    pub retarget_max: f32,
    /// Target speed factor range in [0, 1].
    pub speed_min: f32,
    pub speed_max: f32,
    /// Per-second convergence rates of heading and speed.
    pub heading_rate: f32,
    pub speed_rate: f32,
    pub energy_gain: f32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            retarget_min: 1.4,
            retarget_max: 3.6,
            speed_min: 0.35,
            speed_max: 1.0,
            heading_rate: 1.6,
            speed_rate: 1.2,
            energy_gain: 1.5,
        }
    }
}

/// Anti-stall thresholds. Tuned by hand; kept as data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RescueConfig {
    pub min_speed: f32,
    pub edge_gap: f32,
    pub center_min: f32,
    pub center_fraction: f32,
    pub outer_fraction: f32,
    pub cooldown: (f32, f32),
    pub strength: (f32, f32),
    pub energy_gain: f32,
}

impl Default for RescueConfig {
    fn default() -> Self {
        Self {
            min_speed: 18.0,
            edge_gap: 26.0,
            center_min: 40.0,
            center_fraction: 0.06,
            outer_fraction: 0.35,
            cooldown: (0.45, 0.9),
            strength: (160.0, 240.0),
            energy_gain: 140.0,
        }
    }
}

impl RescueConfig {
    fn center_radius(&self, world: &World) -> f32 {
        self.center_min.max(world.radius * self.center_fraction)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Wander {
    heading: f32,
    target_heading: f32,
    speed: f32,
    target_speed: f32,
    retarget_in: f32,
}

/// Decaying oscillation kicked by a long press.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Wobble {
    pub time: f32,
    pub strength: f32,
}

/// Per-tick inputs the integrator reads but does not own.
#[derive(Clone, Copy, Debug)]
pub struct ForceContext {
    pub now: f64,
    pub audio: AudioFeatures,
    pub expressivity: f32,
    /// Smoothed tilt in [-1, 1]², `None` when the sensor is off.
    pub tilt: Option<Vec2>,
    /// World point the agent is being dragged to.
    pub grab: Option<Vec2>,
    pub free_roam: bool,
}

impl ForceContext {
    pub fn idle(now: f64) -> Self {
        Self {
            now,
            audio: AudioFeatures::default(),
            expressivity: 1.0,
            tilt: None,
            grab: None,
            free_roam: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub bounced: bool,
    pub rescued: bool,
}

/// Speed ceiling for the current profile, energy and roam state.
pub fn vmax(physics: &PhysicsProfile, energy: f32, free_roam: bool) -> f32 {
    let roam = if free_roam {
        1.0 + physics.free_roam_speed_boost
    } else {
        1.0
    };
    physics.max_speed * roam * (1.0 + energy.clamp(0.0, 1.0) * physics.energy_speed_boost)
}

fn clamp_speed(agent: &mut Agent, limit: f32) {
    let speed = agent.vel.length();
    if speed > limit && speed > 0.0 {
        agent.vel *= limit / speed;
    }
}

/// Unit vector of `v`, dividing by 1 when `v` is zero.
fn direction(v: Vec2) -> Vec2 {
    let len = v.length();
    v / if len == 0.0 { 1.0 } else { len }
}

fn wrap_angle(a: f32) -> f32 {
    (a + PI).rem_euclid(TAU) - PI
}

#[derive(Clone, Debug, Default)]
pub struct ForceIntegrator {
    wander_config: WanderConfig,
    rescue_config: RescueConfig,
    wander: Wander,
    wobble: Wobble,
    impulses: SmallVec<[Vec2; 4]>,
    rescue_cooldown: f32,
}

impl ForceIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(wander: WanderConfig, rescue: RescueConfig) -> Self {
        Self {
            wander_config: wander,
            rescue_config: rescue,
            ..Self::default()
        }
    }

    pub fn reset(&mut self) {
        *self = Self::with_config(self.wander_config, self.rescue_config);
    }

    /// One-shot velocity change consumed on the next tick.
    pub fn queue_impulse(&mut self, impulse: Vec2) {
        self.impulses.push(impulse);
    }

    pub fn pending_impulses(&self) -> &[Vec2] {
        &self.impulses
    }

    pub fn kick_wobble(&mut self) {
        self.wobble = Wobble {
            time: 0.0,
            strength: 1.0,
        };
    }

    pub fn wobble(&self) -> Wobble {
        self.wobble
    }

    fn wander_force<R: Rng + ?Sized>(&mut self, dt: f32, energy: f32, rng: &mut R) -> Vec2 {
        let cfg = self.wander_config;
        let w = &mut self.wander;
        w.retarget_in -= dt;
        if w.retarget_in <= 0.0 {
            w.retarget_in = rng.gen_range(cfg.retarget_min..=cfg.retarget_max);
            w.target_heading = rng.gen_range(-PI..PI);
            w.target_speed = rng.gen_range(cfg.speed_min..=cfg.speed_max);
        }
        let heading_k = 1.0 - (-dt * cfg.heading_rate).exp();
        let speed_k = 1.0 - (-dt * cfg.speed_rate).exp();
        w.heading = wrap_angle(w.heading + wrap_angle(w.target_heading - w.heading) * heading_k);
        w.speed += (w.target_speed - w.speed) * speed_k;
        Vec2::from_angle(w.heading) * w.speed * (1.0 + energy * cfg.energy_gain)
    }

    /// Compose all forces into the agent velocity and update its radii.
    pub fn apply_forces<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        agent: &mut Agent,
        profile: &Profile,
        ctx: &ForceContext,
        rng: &mut R,
    ) {
        let phys = &profile.physics;
        let audio = &ctx.audio;
        let energy = audio.energy.clamp(0.0, 1.0);

        agent.vel *= phys.friction;

        let t = ctx.now * DRIFT_TIME_SCALE;
        let drift = Vec2::new(
            (t.cos() * 0.6 + (t * 0.73).sin() * 0.4) as f32,
            (t.sin() * 0.6 + (t * 0.91).cos() * 0.4) as f32,
        );
        let roam_boost = if ctx.free_roam {
            FREE_ROAM_DRIFT_BOOST
        } else {
            1.0
        };
        agent.vel += drift * phys.drift * roam_boost * dt;

        let expr = ctx.expressivity;
        let push = phys.push * energy * expr * (1.0 + energy * AUDIO_BOOST_GAIN * expr);
        agent.vel.x += (audio.high - audio.low) * push * dt;
        agent.vel.y += (ctx.now * AUDIO_SWAY_RATE).sin() as f32 * AUDIO_SWAY_GAIN * push * dt;

        if ctx.free_roam {
            agent.vel += self.wander_force(dt, energy, rng) * phys.wander_force * dt;
        }

        if let Some(tilt) = ctx.tilt {
            agent.vel += tilt.clamp(Vec2::NEG_ONE, Vec2::ONE) * phys.tilt_force * dt;
        }

        if let Some(grab) = ctx.grab {
            agent.pos += (grab - agent.pos) * GRAB_LERP;
            agent.vel = Vec2::ZERO;
            self.impulses.clear();
        } else {
            for impulse in self.impulses.drain(..) {
                agent.vel += impulse;
            }
            if self.wobble.strength > WOBBLE_EPSILON {
                let w = &mut self.wobble;
                w.time += dt * WOBBLE_RATE;
                w.strength *= (-dt * phys.wobble_decay).exp();
                agent.vel += Vec2::from_angle(w.time) * phys.wobble_force * w.strength * dt;
            }
        }

        agent.ink_radius = profile.ink_radius.at(energy);
        agent.radius = profile.agent_radius.at(energy);
        clamp_speed(agent, vmax(phys, energy, ctx.free_roam));
    }

    pub fn integrate(&self, agent: &mut Agent, dt: f32) {
        agent.pos += agent.vel * dt;
    }

    /// Reflect off the world boundary. Returns true on contact.
    pub fn bounce_in_circle(
        &self,
        agent: &mut Agent,
        world: &World,
        phys: &PhysicsProfile,
        energy: f32,
    ) -> bool {
        let offset = agent.pos - world.center;
        let d = offset.length();
        let limit = world.limit_for(agent.radius);
        if d <= limit {
            return false;
        }
        let n = direction(offset);
        let tangent = n.perp();
        agent.pos = world.center + n * limit;

        let v = agent.vel;
        agent.vel = (v - 2.0 * v.dot(n) * n) * phys.restitution;
        let vt = agent.vel.dot(tangent);
        agent.vel -= tangent * vt * phys.tangential_damping;
        agent.vel += tangent * phys.spin;
        agent.vel -= n * (phys.edge_push + energy.clamp(0.0, 1.0) * phys.edge_push_audio);
        true
    }

    /// Kick a stalled agent back into motion. Returns true when fired.
    pub fn rescue<R: Rng + ?Sized>(
        &mut self,
        agent: &mut Agent,
        world: &World,
        energy: f32,
        dt: f32,
        rng: &mut R,
    ) -> bool {
        let cfg = self.rescue_config;
        self.cool_down(dt);
        if self.rescue_cooldown > 0.0 || agent.speed() >= cfg.min_speed {
            return false;
        }

        let offset = agent.pos - world.center;
        let d = offset.length();
        let gap = world.limit_for(agent.radius) - d;
        let near_center = d < cfg.center_radius(world);
        let stalled = gap < cfg.edge_gap || near_center || d > world.radius * cfg.outer_fraction;
        if !stalled {
            return false;
        }

        let dir = if near_center {
            Vec2::from_angle(rng.gen_range(0.0..TAU))
        } else {
            -direction(offset)
        };
        let strength = rng.gen_range(cfg.strength.0..=cfg.strength.1) + energy * cfg.energy_gain;
        agent.vel += dir * strength;
        self.rescue_cooldown = rng.gen_range(cfg.cooldown.0..=cfg.cooldown.1);
        log::debug!("[physics] rescue strength={:.0} d={:.0}", strength, d);
        true
    }

    fn cool_down(&mut self, dt: f32) {
        self.rescue_cooldown = (self.rescue_cooldown - dt).max(0.0);
    }

    /// Full tick: forces, integration, boundary, rescue.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        agent: &mut Agent,
        world: &World,
        profile: &Profile,
        ctx: &ForceContext,
        rng: &mut R,
    ) -> StepReport {
        let energy = ctx.audio.energy.clamp(0.0, 1.0);
        self.apply_forces(dt, agent, profile, ctx, rng);
        self.integrate(agent, dt);
        let bounced = self.bounce_in_circle(agent, world, &profile.physics, energy);
        // a held agent never rescues, but the cooldown keeps running
        let rescued = if ctx.grab.is_some() {
            self.cool_down(dt);
            false
        } else {
            self.rescue(agent, world, energy, dt, rng)
        };
        clamp_speed(agent, vmax(&profile.physics, energy, ctx.free_roam));
        agent.trace_offset += agent.speed() * dt;
        StepReport { bounced, rescued }
    }
}
