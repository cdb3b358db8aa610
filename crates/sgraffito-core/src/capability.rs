//! Boundary with permission-gated sensors.
//!
//! Front-ends perform the (possibly asynchronous) permission request and
//! report the outcome as `Result<Granted, CapabilityError>`. The simulation
//! itself only ever sees the resulting data, polled once per frame.

use crate::error::{Capability, CapabilityError};
use glam::Vec2;

/// Proof that a capability request succeeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Granted(pub Capability);

/// Lifecycle of a sensor as seen by the frame loop.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CapabilityState {
    #[default]
    Off,
    Pending,
    Active,
    Failed(CapabilityError),
}

impl CapabilityState {
    pub fn from_request(result: Result<Granted, CapabilityError>) -> Self {
        match result {
            Ok(Granted(cap)) => {
                log::info!("[capability] {} granted", cap);
                CapabilityState::Active
            }
            Err(e) => {
                log::warn!("[capability] {}", e);
                CapabilityState::Failed(e)
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, CapabilityState::Active)
    }
}

/// Non-blocking access to the latest magnitude spectrum.
pub trait SpectrumSource {
    fn is_active(&self) -> bool;
    /// Latest byte spectrum, or `None` when the source has nothing this frame.
    fn latest_spectrum(&mut self) -> Option<&[u8]>;
}

/// Non-blocking access to a normalized device tilt.
pub trait TiltSource {
    fn is_active(&self) -> bool;
    /// Tilt pair, each axis in [-1, 1].
    fn tilt(&self) -> Vec2;
}

/// Degrees of gamma/beta that map to full tilt.
pub const TILT_GAMMA_RANGE_DEG: f32 = 35.0;
pub const TILT_BETA_RANGE_DEG: f32 = 45.0;
pub const TILT_SMOOTHING: f32 = 0.08;

/// Normalizes raw orientation angles and smooths them per frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct TiltFilter {
    raw: Vec2,
    smooth: Vec2,
}

impl TiltFilter {
    /// Feed a raw orientation reading (degrees); missing axes count as 0.
    pub fn set_orientation(&mut self, beta_deg: Option<f32>, gamma_deg: Option<f32>) {
        self.raw = Vec2::new(
            (gamma_deg.unwrap_or(0.0) / TILT_GAMMA_RANGE_DEG).clamp(-1.0, 1.0),
            (beta_deg.unwrap_or(0.0) / TILT_BETA_RANGE_DEG).clamp(-1.0, 1.0),
        );
    }

    /// Advance the smoothing by one frame and return the smoothed tilt.
    pub fn tick(&mut self) -> Vec2 {
        self.smooth += (self.raw - self.smooth) * TILT_SMOOTHING;
        self.smooth
    }

    pub fn reset(&mut self) {
        *self = TiltFilter::default();
    }
}
