//! Platform-free core of the sgraffito ink simulation.
//!
//! Everything here runs on the host: the web front-end and the headless
//! renderer both drive a [`Simulation`] over their own [`DrawSurface`].

pub mod audio;
pub mod capability;
pub mod constants;
pub mod error;
pub mod gesture;
pub mod ink;
pub mod physics;
pub mod profile;
pub mod raster;
pub mod resonance;
pub mod sim;
pub mod state;
pub mod surface;

pub use audio::{analyze, AudioFeatureExtractor, AudioFeatures};
pub use capability::{CapabilityState, Granted, SpectrumSource, TiltFilter, TiltSource};
pub use error::{Capability, CapabilityError, CoreError};
pub use gesture::{GestureAction, GestureRecognizer, PointerPhase, PointerSample, PressTarget};
pub use ink::{buffer_side, InkCompositor, Scene};
pub use physics::{vmax, ForceContext, ForceIntegrator, RescueConfig, StepReport, WanderConfig};
pub use profile::{Profile, ProfileKind, ProfileTable};
pub use raster::PixelCanvas;
pub use resonance::{Crystallization, ResonanceBus, ResonanceEvent, ResonanceKind};
pub use sim::{SimConfig, Simulation};
pub use state::{Agent, Camera, Expressivity, World};
pub use surface::{DrawSurface, Ellipse, InkStops, RadialGradient, Rgba};

/// Simulation rendered in software, as used by tests and the headless binary.
pub type SoftwareSimulation = Simulation<PixelCanvas>;
