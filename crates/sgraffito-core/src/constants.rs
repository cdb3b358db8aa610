//! Simulation tuning constants.
//!
//! Gesture timings are in seconds, distances in CSS pixels (screen) or world
//! units (which share the same scale), smoothing coefficients are per tick.

// ---------------- Audio features ----------------

// Spectrum index bands (half-open)
pub const LOW_BAND: (usize, usize) = (2, 40);
pub const MID_BAND: (usize, usize) = (40, 120);
pub const HIGH_BAND: (usize, usize) = (150, 260);
pub const MAGNITUDE_MAX: f32 = 255.0;

// Shortest snapshot that still reaches the low band
pub const MIN_SPECTRUM_BINS: usize = LOW_BAND.0 + 1;

pub const ENERGY_LOW_WEIGHT: f32 = 0.75;
pub const ENERGY_HIGH_WEIGHT: f32 = 0.35;

pub const FEATURE_SMOOTHING: f32 = 0.12;
pub const ATTACK_SMOOTHING: f32 = 0.4;
pub const INACTIVE_DECAY: f32 = 0.1;
pub const CENTROID_REST: f32 = 0.5;

// ---------------- Gestures ----------------

pub const TAP_WINDOW_SEC: f64 = 0.32;
pub const TAP_DISTANCE_PX: f32 = 36.0;
pub const LONG_PRESS_SEC: f64 = 0.5;
pub const MOVE_THRESHOLD_PX: f32 = 2.0;
pub const DRAG_EMIT_THRESHOLD_PX: f32 = 0.5;
pub const ON_AGENT_RADIUS_SQ_FACTOR: f32 = 3.2;

pub const ECHO_BOOST_SEC: f64 = 1.1;
pub const ECHO_BOOST_GAIN: f32 = 1.35;

pub const COMBO_WINDOW_SEC: f64 = 0.5;
pub const COMBO_STEP: f32 = 0.22;
pub const TAP_IMPULSE: f32 = 220.0;

pub const FLING_MIN_SPEED_PX: f32 = 2.0;
pub const FLING_GAIN: f32 = 18.0;
pub const FLING_REF_SPEED_PX: f32 = 20.0;
pub const FLING_SCALE_MIN: f32 = 0.4;
pub const FLING_SCALE_MAX: f32 = 1.2;

pub const VOICE_ENERGY_MIN: f32 = 0.02;
pub const ATTACK_BURST_MIN: f32 = 0.08;
pub const VIBRATO_CENTROID_MIN: f32 = 0.55;

// Fraction of a vibrato's ttl after which it is written to the ink buffer
pub const CRYSTALLIZE_AT: f32 = 0.85;

// ---------------- Physics ----------------

pub const DRIFT_TIME_SCALE: f64 = 0.6;
pub const FREE_ROAM_DRIFT_BOOST: f32 = 1.25;
pub const AUDIO_BOOST_GAIN: f32 = 1.6;
pub const AUDIO_SWAY_RATE: f64 = 1.4;
pub const AUDIO_SWAY_GAIN: f32 = 0.2;
pub const GRAB_LERP: f32 = 0.35;
pub const WOBBLE_RATE: f32 = 6.0;
pub const WOBBLE_EPSILON: f32 = 0.001;

// ---------------- Ink ----------------

pub const STAMP_STEP_FACTOR: f32 = 0.35;
pub const BAND_PHASE_RATE: f64 = 1.7;
pub const BAND_PHASE_AMPLITUDE: f32 = 0.06;

// ---------------- World ----------------

pub const WORLD_SCALE: f32 = 1.35;
pub const BUFFER_MARGIN: f32 = 200.0;
pub const AGENT_RESET_RADIUS: f32 = 10.0;
pub const MAX_FRAME_DT: f32 = 0.033;
